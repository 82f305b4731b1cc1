//! Advanced category (spec §6): 5 tools exercising cross-cutting
//! infrastructure directly — streaming pagination, the batch executor,
//! in-process metrics, and cache lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::StreamExt;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::rest::models::Host;
use crate::services::from_result;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;
use crate::util::streaming::stream_paginated;

#[derive(Debug, Deserialize, JsonSchema)]
struct GetSystemInfoParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct StreamHostsParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default = "default_batch_size")]
    batch_size: usize,
}

fn default_batch_size() -> usize {
    50
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateHostItem {
    host_name: String,
    #[serde(default = "default_folder")]
    folder: String,
    #[serde(default)]
    attributes: HashMap<String, Value>,
}

fn default_folder() -> String {
    "/".to_string()
}

#[derive(Debug, Deserialize, JsonSchema)]
struct BatchCreateHostsParams {
    hosts: Vec<CreateHostItem>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetServerMetricsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct ClearCacheParams {}

fn get_system_info(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetSystemInfoParams = parse_args(args)?;
        let result = ctx.client.system_info().await;
        Ok(json!(from_result(result)))
    })
}

fn stream_hosts(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: StreamHostsParams = parse_args(args)?;
        let fetched = ctx.client.list_hosts(params.search.as_deref(), params.folder.as_deref()).await;
        let hosts = match fetched {
            Ok(hosts) => hosts,
            Err(err) => return Ok(json!(from_result::<Vec<Host>>(Err(err)))),
        };
        let pages: Arc<Vec<Value>> = Arc::new(hosts.iter().map(|h| json!(h)).collect());
        let batch_size = params.batch_size.max(1);

        let mut stream = stream_paginated(
            move |offset, batch_size| {
                let pages = pages.clone();
                async move {
                    if offset >= pages.len() {
                        return Ok(Vec::new());
                    }
                    let end = (offset + batch_size).min(pages.len());
                    Ok(pages[offset..end].to_vec())
                }
            },
            batch_size,
        );

        let mut items = Vec::new();
        let mut batch_count = 0u64;
        while let Some(batch) = stream.next().await {
            match batch {
                Ok(batch) => {
                    batch_count += 1;
                    items.extend(batch.items);
                }
                Err(err) => return Ok(json!(from_result::<Value>(Err(err)))),
            }
        }

        Ok(json!(crate::services::ServiceResult::ok(json!({
            "hosts": items,
            "batch_count": batch_count,
        }))))
    })
}

fn batch_create_hosts(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: BatchCreateHostsParams = parse_args(args)?;
        let client = ctx.client.clone();
        let result = ctx
            .batch
            .run(
                params.hosts,
                |err: &crate::rest::CheckmkClientError| err.is_retryable(),
                move |item: CreateHostItem| {
                    let client = client.clone();
                    async move {
                        let host = Host {
                            name: item.host_name,
                            folder: Host::normalize_folder(&item.folder),
                            attributes: item.attributes,
                            effective_attributes: None,
                        };
                        client.create_host(&host).await
                    }
                },
            )
            .await;
        ctx.cache.invalidate_pattern("hosts:list:*").await;

        let items: Vec<Value> = result
            .items
            .into_iter()
            .map(|item| match item.outcome {
                Ok(host) => json!({ "index": item.index, "success": true, "host": host }),
                Err(err) => json!({ "index": item.index, "success": false, "error": err.sanitized_message() }),
            })
            .collect();

        Ok(json!(crate::services::ServiceResult::ok(json!({
            "items": items,
            "progress": result.progress,
        }))))
    })
}

fn get_server_metrics(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetServerMetricsParams = parse_args(args)?;
        let cache_stats = ctx.cache.stats().await;
        let snapshot = ctx.metrics.snapshot(Some(cache_stats));
        Ok(json!(crate::services::ServiceResult::ok(json!({
            "uptime_seconds": snapshot.uptime_seconds,
            "tools": snapshot.tools.iter().map(|t| json!({
                "tool": t.tool,
                "calls": t.calls,
                "errors": t.errors,
                "avg_latency_ms": t.avg_latency_ms,
            })).collect::<Vec<_>>(),
            "cache": snapshot.cache,
        }))))
    })
}

fn clear_cache(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: ClearCacheParams = parse_args(args)?;
        ctx.cache.clear().await;
        Ok(json!(crate::services::ServiceResult::ok(json!({ "cleared": true }))))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_system_info",
            category: ToolCategory::Advanced,
            description: "Report the Checkmk server's version, edition, and site name.",
            input_schema: schema_for::<GetSystemInfoParams>(),
            handler: get_system_info,
        },
        ToolDefinition {
            name: "stream_hosts",
            category: ToolCategory::Advanced,
            description: "Fetch the host list in batches via the streaming pagination utility, returning the assembled result.",
            input_schema: schema_for::<StreamHostsParams>(),
            handler: stream_hosts,
        },
        ToolDefinition {
            name: "batch_create_hosts",
            category: ToolCategory::Advanced,
            description: "Create many hosts concurrently with bounded parallelism, rate limiting, and per-item retry.",
            input_schema: schema_for::<BatchCreateHostsParams>(),
            handler: batch_create_hosts,
        },
        ToolDefinition {
            name: "get_server_metrics",
            category: ToolCategory::Advanced,
            description: "Report per-tool call counts, error counts, average latency, and cache statistics.",
            input_schema: schema_for::<GetServerMetricsParams>(),
            handler: get_server_metrics,
        },
        ToolDefinition {
            name: "clear_cache",
            category: ToolCategory::Advanced,
            description: "Clear the in-process response cache; the next read for any key refetches from Checkmk.",
            input_schema: schema_for::<ClearCacheParams>(),
            handler: clear_cache,
        },
    ]
}
