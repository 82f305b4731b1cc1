//! Wire types for JSON-RPC 2.0 framed over stdio and the subset of the
//! Model Context Protocol (`initialize`, `tools/list`, `tools/call`) that
//! this server implements. Hand-written from the MCP JSON schema rather
//! than code-generated, but intentionally narrow: only what a tool server
//! needs to speak the protocol, not the full client-side surface (no
//! resources, prompts, sampling, or roots).

use std::fmt;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON value standing in for a method's untyped result payload once it
/// has been serialized. Individual methods still have strongly typed
/// `Result` associated types; this is only the wire representation after
/// `serde_json::to_value`.
pub type Result = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Integer(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{s}"),
            RequestId::Integer(i) => write!(f, "{i}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCRequest {
    pub jsonrpc: String,
    pub id: RequestId,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    pub result: Result,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCErrorError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JSONRPCError {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: JSONRPCErrorError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JSONRPCMessage {
    Request(JSONRPCRequest),
    Notification(JSONRPCNotification),
    Response(JSONRPCResponse),
    Error(JSONRPCError),
}

/// Implemented by the zero-sized marker types below (`InitializeRequest`,
/// `ListToolsRequest`, `CallToolRequest`) so handlers can be generic over
/// "the typed params/result pair for method X" the way
/// `OutgoingMessageSender::send_response::<T>` needs to be.
pub trait ModelContextProtocolRequest {
    const METHOD: &'static str;
    type Params: Serialize + for<'de> Deserialize<'de>;
    type Result: Serialize + for<'de> Deserialize<'de>;
}

macro_rules! protocol_request {
    ($name:ident, $method:literal, $params:ty, $result:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl ModelContextProtocolRequest for $name {
            const METHOD: &'static str = $method;
            type Params = $params;
            type Result = $result;
        }
    };
}

protocol_request!(
    InitializeRequest,
    "initialize",
    InitializeRequestParams,
    InitializeResult
);
protocol_request!(
    ListToolsRequest,
    "tools/list",
    ListToolsRequestParams,
    ListToolsResult
);
protocol_request!(
    CallToolRequest,
    "tools/call",
    CallToolRequestParams,
    CallToolResult
);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InitializeRequestParams {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: ClientCapabilities,
    #[serde(rename = "clientInfo")]
    pub client_info: Implementation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitializeResult {
    pub capabilities: ServerCapabilities,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(rename = "serverInfo")]
    pub server_info: Implementation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompts: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<ServerCapabilitiesTools>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilitiesTools {
    #[serde(rename = "listChanged", default, skip_serializing_if = "Option::is_none")]
    pub list_changed: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListToolsRequestParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
    #[serde(rename = "nextCursor", default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: ToolInputSchema,
    #[serde(rename = "outputSchema", default, skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolInputSchema {
    #[serde(rename = "type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolRequestParams {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError", default, skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
    #[serde(rename = "structuredContent", default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    TextContent(TextContent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    #[serde(rename = "type")]
    pub r#type: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<serde_json::Value>,
}

/// The subset of requests a client may send that this server understands.
#[derive(Debug, Clone)]
pub enum ClientRequest {
    InitializeRequest(InitializeRequestParams),
    ListToolsRequest(ListToolsRequestParams),
    CallToolRequest(CallToolRequestParams),
    Other { method: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ClientRequestConversionError {
    #[error("missing params for method {method}")]
    MissingParams { method: String },
    #[error("failed to parse params for method {method}: {source}")]
    InvalidParams {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TryFrom<JSONRPCRequest> for ClientRequest {
    type Error = ClientRequestConversionError;

    fn try_from(request: JSONRPCRequest) -> std::result::Result<Self, Self::Error> {
        let JSONRPCRequest { method, params, .. } = request;

        fn parse<T: for<'de> Deserialize<'de>>(
            method: &str,
            params: Option<serde_json::Value>,
        ) -> std::result::Result<T, ClientRequestConversionError> {
            let value = params.ok_or_else(|| ClientRequestConversionError::MissingParams {
                method: method.to_string(),
            })?;
            serde_json::from_value(value).map_err(|source| {
                ClientRequestConversionError::InvalidParams {
                    method: method.to_string(),
                    source,
                }
            })
        }

        match method.as_str() {
            InitializeRequest::METHOD => Ok(ClientRequest::InitializeRequest(parse(
                &method, params,
            )?)),
            ListToolsRequest::METHOD => {
                // `tools/list` params are optional (empty object, or absent).
                let params = params.unwrap_or_else(|| serde_json::json!({}));
                let params = serde_json::from_value(params).map_err(|source| {
                    ClientRequestConversionError::InvalidParams {
                        method: method.clone(),
                        source,
                    }
                })?;
                Ok(ClientRequest::ListToolsRequest(params))
            }
            CallToolRequest::METHOD => Ok(ClientRequest::CallToolRequest(parse(&method, params)?)),
            other => Ok(ClientRequest::Other {
                method: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_round_trips_through_json() {
        let id = RequestId::String("req_abc123".to_string());
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"req_abc123\"");
        let back: RequestId = serde_json::from_str(&json).unwrap_or(RequestId::Integer(-1));
        assert_eq!(back, id);
    }

    #[test]
    fn unknown_method_becomes_other() {
        let request = JSONRPCRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Integer(1),
            method: "resources/list".to_string(),
            params: None,
        };
        let client_request = ClientRequest::try_from(request).expect("conversion succeeds");
        match client_request {
            ClientRequest::Other { method } => assert_eq!(method, "resources/list"),
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn call_tool_request_requires_params() {
        let request = JSONRPCRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RequestId::Integer(2),
            method: "tools/call".to_string(),
            params: None,
        };
        let err = ClientRequest::try_from(request).expect_err("missing params should fail");
        assert!(matches!(
            err,
            ClientRequestConversionError::MissingParams { .. }
        ));
    }
}
