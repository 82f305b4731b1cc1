//! Host category (spec §6): 6 tools.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::rest::models::Host;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;

#[derive(Debug, Deserialize, JsonSchema)]
struct ListHostsParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default)]
    offset: Option<usize>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetHostParams {
    host_name: String,
    #[serde(default)]
    effective_attributes: bool,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateHostParams {
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
struct UpdateHostParams {
    host_name: String,
    attributes: Value,
    etag: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DeleteHostParams {
    host_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListHostServicesParams {
    host_name: String,
}

fn list_hosts(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ListHostsParams = parse_args(args)?;
        let result = ctx
            .hosts
            .list(params.search.as_deref(), params.folder.as_deref(), params.limit, params.offset)
            .await;
        Ok(json!(result))
    })
}

fn get_host(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetHostParams = parse_args(args)?;
        let result = ctx.hosts.get(&params.host_name, params.effective_attributes).await;
        Ok(json!(result))
    })
}

fn create_host(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: CreateHostParams = parse_args(args)?;
        let host = Host {
            name: params.host_name,
            folder: Host::normalize_folder(&params.folder),
            attributes: params.attributes,
            effective_attributes: None,
        };
        let result = ctx.hosts.create(host).await;
        Ok(json!(result))
    })
}

fn update_host(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: UpdateHostParams = parse_args(args)?;
        let result = ctx.hosts.update(&params.host_name, params.attributes, &params.etag).await;
        Ok(json!(result))
    })
}

fn delete_host(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: DeleteHostParams = parse_args(args)?;
        let result = ctx.hosts.delete(&params.host_name).await;
        Ok(json!(result))
    })
}

fn list_host_services(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ListHostServicesParams = parse_args(args)?;
        let result = ctx.hosts.list_services(&params.host_name).await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_hosts",
            category: ToolCategory::Host,
            description: "List configured hosts, optionally filtered by search term or folder, with pagination.",
            input_schema: schema_for::<ListHostsParams>(),
            handler: list_hosts,
        },
        ToolDefinition {
            name: "create_host",
            category: ToolCategory::Host,
            description: "Create a new host in the given folder with the supplied attributes.",
            input_schema: schema_for::<CreateHostParams>(),
            handler: create_host,
        },
        ToolDefinition {
            name: "get_host",
            category: ToolCategory::Host,
            description: "Fetch a single host, optionally including Checkmk's computed effective attributes.",
            input_schema: schema_for::<GetHostParams>(),
            handler: get_host,
        },
        ToolDefinition {
            name: "update_host",
            category: ToolCategory::Host,
            description: "Update a host's attributes under etag-based optimistic concurrency.",
            input_schema: schema_for::<UpdateHostParams>(),
            handler: update_host,
        },
        ToolDefinition {
            name: "delete_host",
            category: ToolCategory::Host,
            description: "Delete a host by name.",
            input_schema: schema_for::<DeleteHostParams>(),
            handler: delete_host,
        },
        ToolDefinition {
            name: "list_host_services",
            category: ToolCategory::Host,
            description: "List the monitored services configured for a host.",
            input_schema: schema_for::<ListHostServicesParams>(),
            handler: list_host_services,
        },
    ]
}
