//! JSON-RPC request dispatch (spec §4.1, §4.11): `initialize`, `tools/list`,
//! and `tools/call`, the latter routed through the [`crate::tools::ToolRegistry`]
//! under a per-call [`crate::request_id::RequestId`] scope.

use std::sync::Arc;

use mcp_types::CallToolRequestParams;
use mcp_types::CallToolResult;
use mcp_types::ClientRequest as McpClientRequest;
use mcp_types::ContentBlock;
use mcp_types::JSONRPCErrorError;
use mcp_types::JSONRPCRequest;
use mcp_types::ModelContextProtocolRequest;
use mcp_types::RequestId;
use mcp_types::ServerCapabilitiesTools;
use mcp_types::TextContent;

use crate::context::AppContext;
use crate::error_code;
use crate::error_code::INVALID_REQUEST_ERROR_CODE;
use crate::outgoing_message_sender::OutgoingMessageSender;
use crate::request_id::RequestId as CheckmkRequestId;
use crate::tools::ToolRegistry;
use crate::util::metrics::RequestTimer;

pub(crate) struct MessageProcessor {
    initialized: bool,
    outgoing: Arc<OutgoingMessageSender>,
    context: Arc<AppContext>,
    registry: Arc<ToolRegistry>,
}

impl std::fmt::Debug for MessageProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageProcessor")
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl MessageProcessor {
    pub(crate) fn new(outgoing: OutgoingMessageSender, context: Arc<AppContext>) -> Self {
        Self {
            initialized: false,
            outgoing: Arc::new(outgoing),
            context,
            registry: Arc::new(ToolRegistry::build()),
        }
    }

    pub(crate) async fn process_request(&mut self, request: JSONRPCRequest) {
        let request_id = request.id.clone();
        let client_request = match McpClientRequest::try_from(request) {
            Ok(client_request) => client_request,
            Err(e) => {
                self.outgoing
                    .send_error(
                        request_id,
                        JSONRPCErrorError {
                            code: error_code::INVALID_REQUEST_ERROR_CODE,
                            message: format!("Invalid request: {e}"),
                            data: None,
                        },
                    )
                    .await;
                return;
            }
        };

        match client_request {
            McpClientRequest::InitializeRequest(params) => {
                self.handle_initialize(request_id, params).await;
            }
            McpClientRequest::ListToolsRequest(params) => {
                self.handle_list_tools(request_id, params).await;
            }
            McpClientRequest::CallToolRequest(params) => {
                self.handle_call_tool(request_id, params).await;
            }
            _ => {
                tracing::warn!("Unhandled client request: {client_request:?}");
            }
        }
    }

    async fn handle_initialize(
        &mut self,
        id: RequestId,
        params: <mcp_types::InitializeRequest as ModelContextProtocolRequest>::Params,
    ) {
        tracing::info!("initialize -> params: {:?}", params);

        if self.initialized {
            let error = JSONRPCErrorError {
                code: INVALID_REQUEST_ERROR_CODE,
                message: "initialize called more than once".to_string(),
                data: None,
            };
            self.outgoing.send_error(id, error).await;
            return;
        }

        self.initialized = true;

        let result = mcp_types::InitializeResult {
            capabilities: mcp_types::ServerCapabilities {
                completions: None,
                experimental: None,
                logging: None,
                prompts: None,
                resources: None,
                tools: Some(ServerCapabilitiesTools {
                    list_changed: Some(true),
                }),
            },
            instructions: None,
            protocol_version: params.protocol_version.clone(),
            server_info: mcp_types::Implementation {
                name: "checkmk-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Checkmk MCP Server".to_string()),
            },
        };

        self.send_response::<mcp_types::InitializeRequest>(id, result)
            .await;
    }

    async fn handle_list_tools(
        &self,
        request_id: RequestId,
        params: <mcp_types::ListToolsRequest as mcp_types::ModelContextProtocolRequest>::Params,
    ) {
        tracing::trace!("tools/list ({request_id:?}) -> {params:?}");

        let result = mcp_types::ListToolsResult {
            tools: self.registry.to_mcp_tools(),
            next_cursor: None,
        };

        self.send_response::<mcp_types::ListToolsRequest>(request_id, result)
            .await;
    }

    async fn handle_call_tool(
        &self,
        request_id: RequestId,
        params: <mcp_types::CallToolRequest as mcp_types::ModelContextProtocolRequest>::Params,
    ) {
        tracing::info!("tools/call -> params: {params:?}");
        let CallToolRequestParams { name, arguments } = params;

        let Some(definition) = self.registry.get(&name) else {
            let result = error_tool_result(format!("Unknown tool '{name}'"));
            self.send_response::<mcp_types::CallToolRequest>(request_id, result)
                .await;
            return;
        };

        let context = self.context.clone();
        let outgoing = self.outgoing.clone();
        let metrics = context.metrics.clone();
        let handler = definition.handler;
        let tool_name = definition.name;
        let call_timeout = context.config.recovery.call_timeout;
        let args = arguments.unwrap_or_else(|| serde_json::json!({}));

        tokio::spawn(async move {
            let call_id = CheckmkRequestId::generate();
            call_id
                .scope(async move {
                    let timer = RequestTimer::start(&metrics, tool_name);
                    let outcome = tokio::time::timeout(call_timeout, (handler)(args, &context)).await;
                    let result = match outcome {
                        Ok(Ok(value)) => ok_tool_result(value),
                        Ok(Err(err)) => {
                            timer.mark_error();
                            error_tool_result(err.message)
                        }
                        Err(_elapsed) => {
                            timer.mark_error();
                            let err = crate::tools::ToolError::timeout(format!(
                                "tool '{tool_name}' exceeded its per-call deadline of {call_timeout:?}"
                            ));
                            error_tool_result(err.message)
                        }
                    };
                    outgoing.send_response(request_id, result).await;
                })
                .await;
        });
    }

    async fn send_response<T>(&self, id: RequestId, result: T::Result)
    where
        T: ModelContextProtocolRequest,
    {
        self.outgoing.send_response(id, result).await;
    }
}

fn ok_tool_result(value: serde_json::Value) -> CallToolResult {
    let text = serde_json::to_string(&value).unwrap_or_else(|_| value.to_string());
    CallToolResult {
        content: vec![ContentBlock::TextContent(TextContent {
            r#type: "text".to_string(),
            text,
            annotations: None,
        })],
        is_error: Some(false),
        structured_content: Some(value),
    }
}

fn error_tool_result(message: String) -> CallToolResult {
    CallToolResult {
        content: vec![ContentBlock::TextContent(TextContent {
            r#type: "text".to_string(),
            text: message,
            annotations: None,
        })],
        is_error: Some(true),
        structured_content: None,
    }
}
