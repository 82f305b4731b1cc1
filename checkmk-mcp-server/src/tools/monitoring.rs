//! Monitoring category (spec §6, §4.10): 3 tools over the status service's
//! aggregate health views.

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
struct GetHealthDashboardParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetCriticalProblemsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct AnalyzeHostHealthParams {
    host_name: String,
}

fn get_health_dashboard(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetHealthDashboardParams = parse_args(args)?;
        let result = ctx.status.health_dashboard().await;
        Ok(json!(result))
    })
}

fn get_critical_problems(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetCriticalProblemsParams = parse_args(args)?;
        let result = ctx.status.critical_problems().await;
        Ok(json!(result))
    })
}

fn analyze_host_health(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: AnalyzeHostHealthParams = parse_args(args)?;
        let result = ctx.status.analyze_host_health(&params.host_name).await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_health_dashboard",
            category: ToolCategory::Monitoring,
            description: "Summarize overall service health (OK/WARN/CRIT/UNKNOWN counts and a letter grade).",
            input_schema: schema_for::<GetHealthDashboardParams>(),
            handler: get_health_dashboard,
        },
        ToolDefinition {
            name: "get_critical_problems",
            category: ToolCategory::Monitoring,
            description: "List warn/crit services grouped into problem categories (network, disk, performance, connectivity, monitoring).",
            input_schema: schema_for::<GetCriticalProblemsParams>(),
            handler: get_critical_problems,
        },
        ToolDefinition {
            name: "analyze_host_health",
            category: ToolCategory::Monitoring,
            description: "Summarize the health of a single host's services with a letter grade.",
            input_schema: schema_for::<AnalyzeHostHealthParams>(),
            handler: analyze_host_health,
        },
    ]
}
