//! Business category (spec §6): 2 tools over BI aggregation status.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;

#[derive(Debug, Deserialize, JsonSchema)]
struct GetBusinessStatusSummaryParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetCriticalBusinessServicesParams {}

fn get_business_status_summary(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetBusinessStatusSummaryParams = parse_args(args)?;
        let result = ctx.bi.status_summary().await;
        Ok(json!(result))
    })
}

fn get_critical_business_services(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetCriticalBusinessServicesParams = parse_args(args)?;
        let result = ctx.bi.critical_aggregations().await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_business_status_summary",
            category: ToolCategory::Business,
            description: "Summarize the status of every configured BI aggregation.",
            input_schema: schema_for::<GetBusinessStatusSummaryParams>(),
            handler: get_business_status_summary,
        },
        ToolDefinition {
            name: "get_critical_business_services",
            category: ToolCategory::Business,
            description: "List BI aggregations currently at critical state.",
            input_schema: schema_for::<GetCriticalBusinessServicesParams>(),
            handler: get_critical_business_services,
        },
    ]
}
