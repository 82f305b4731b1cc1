//! Service category (spec §6): 3 tools.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::rest::models::AcknowledgeRequest;
use crate::rest::models::DowntimeRequest;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;

#[derive(Debug, Deserialize, JsonSchema)]
struct ListAllServicesParams {
    #[serde(default)]
    search: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct AcknowledgeServiceProblemParams {
    host_name: String,
    #[serde(default)]
    service_description: Option<String>,
    comment: String,
    #[serde(default)]
    sticky: bool,
    #[serde(default)]
    persistent: bool,
    #[serde(default = "default_true")]
    notify: bool,
    #[serde(default)]
    expire_on: Option<chrono::DateTime<chrono::Utc>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CreateServiceDowntimeParams {
    host_name: String,
    #[serde(default)]
    service_description: Option<String>,
    start_time: chrono::DateTime<chrono::Utc>,
    end_time: chrono::DateTime<chrono::Utc>,
    comment: String,
}

fn list_all_services(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ListAllServicesParams = parse_args(args)?;
        let result = ctx.services.list_all(params.search.as_deref()).await;
        Ok(json!(result))
    })
}

fn acknowledge_service_problem(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: AcknowledgeServiceProblemParams = parse_args(args)?;
        let request = AcknowledgeRequest {
            comment: params.comment,
            sticky: params.sticky,
            persistent: params.persistent,
            notify: params.notify,
            expire_on: params.expire_on,
        };
        let result = ctx
            .services
            .acknowledge(&params.host_name, params.service_description.as_deref(), request)
            .await;
        Ok(json!(result))
    })
}

fn create_service_downtime(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: CreateServiceDowntimeParams = parse_args(args)?;
        let request = DowntimeRequest {
            host_name: params.host_name,
            service_description: params.service_description,
            start_time: params.start_time,
            end_time: params.end_time,
            comment: params.comment,
        };
        let result = ctx.services.create_downtime(request).await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_all_services",
            category: ToolCategory::Service,
            description: "List all monitored services across hosts, optionally filtered by description search.",
            input_schema: schema_for::<ListAllServicesParams>(),
            handler: list_all_services,
        },
        ToolDefinition {
            name: "acknowledge_service_problem",
            category: ToolCategory::Service,
            description: "Acknowledge a service problem with a comment, optionally sticky/persistent/notify and an expiry.",
            input_schema: schema_for::<AcknowledgeServiceProblemParams>(),
            handler: acknowledge_service_problem,
        },
        ToolDefinition {
            name: "create_service_downtime",
            category: ToolCategory::Service,
            description: "Schedule a downtime window for a service (or host, if no service is given).",
            input_schema: schema_for::<CreateServiceDowntimeParams>(),
            handler: create_service_downtime,
        },
    ]
}
