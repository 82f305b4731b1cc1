//! Metrics category (spec §6): 2 tools over service performance data.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::rest::models::MetricReduce;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;

#[derive(Debug, Deserialize, JsonSchema)]
struct GetServiceMetricsParams {
    host_name: String,
    service_description: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
enum ReduceParam {
    Average,
    Max,
    Min,
}

impl From<ReduceParam> for MetricReduce {
    fn from(value: ReduceParam) -> Self {
        match value {
            ReduceParam::Average => MetricReduce::Average,
            ReduceParam::Max => MetricReduce::Max,
            ReduceParam::Min => MetricReduce::Min,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetMetricHistoryParams {
    host_name: String,
    service_description: String,
    metric_id: String,
    #[serde(default = "default_reduce")]
    reduce: ReduceParam,
}

fn default_reduce() -> ReduceParam {
    ReduceParam::Average
}

fn get_service_metrics(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetServiceMetricsParams = parse_args(args)?;
        let result = ctx.metric.get_service_metrics(&params.host_name, &params.service_description).await;
        Ok(json!(result))
    })
}

fn get_metric_history(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetMetricHistoryParams = parse_args(args)?;
        let result = ctx
            .metric
            .get_metric_history(&params.host_name, &params.service_description, &params.metric_id, params.reduce.into())
            .await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_service_metrics",
            category: ToolCategory::Metrics,
            description: "Fetch the current performance graph data for a service.",
            input_schema: schema_for::<GetServiceMetricsParams>(),
            handler: get_service_metrics,
        },
        ToolDefinition {
            name: "get_metric_history",
            category: ToolCategory::Metrics,
            description: "Fetch historical values for a single metric, reduced by average/max/min.",
            input_schema: schema_for::<GetMetricHistoryParams>(),
            handler: get_metric_history,
        },
    ]
}
