//! Events category (spec §6): 5 tools over the Event Console.

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
struct ListServiceEventsParams {
    host_name: String,
    service_description: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ListHostEventsParams {
    host_name: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetRecentCriticalEventsParams {}

#[derive(Debug, Deserialize, JsonSchema)]
struct AcknowledgeEventParams {
    event_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchEventsParams {
    search: String,
}

fn list_service_events(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ListServiceEventsParams = parse_args(args)?;
        let result = ctx.events.list_service_events(&params.host_name, &params.service_description).await;
        Ok(json!(result))
    })
}

fn list_host_events(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ListHostEventsParams = parse_args(args)?;
        let result = ctx.events.list_host_events(&params.host_name).await;
        Ok(json!(result))
    })
}

fn get_recent_critical_events(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let _params: GetRecentCriticalEventsParams = parse_args(args)?;
        let result = ctx.events.recent_critical().await;
        Ok(json!(result))
    })
}

fn acknowledge_event(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: AcknowledgeEventParams = parse_args(args)?;
        let result = ctx.events.acknowledge_event(&params.event_id).await;
        Ok(json!(result))
    })
}

fn search_events(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: SearchEventsParams = parse_args(args)?;
        let result = ctx.events.search_events(&params.search).await;
        Ok(json!(result))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_service_events",
            category: ToolCategory::Events,
            description: "List Event Console events for a specific host/service. An empty result is a success, not an error.",
            input_schema: schema_for::<ListServiceEventsParams>(),
            handler: list_service_events,
        },
        ToolDefinition {
            name: "list_host_events",
            category: ToolCategory::Events,
            description: "List Event Console events for a host across all its services.",
            input_schema: schema_for::<ListHostEventsParams>(),
            handler: list_host_events,
        },
        ToolDefinition {
            name: "get_recent_critical_events",
            category: ToolCategory::Events,
            description: "List recent events at critical severity or above, across all hosts.",
            input_schema: schema_for::<GetRecentCriticalEventsParams>(),
            handler: get_recent_critical_events,
        },
        ToolDefinition {
            name: "acknowledge_event",
            category: ToolCategory::Events,
            description: "Acknowledge a single Event Console event by id.",
            input_schema: schema_for::<AcknowledgeEventParams>(),
            handler: acknowledge_event,
        },
        ToolDefinition {
            name: "search_events",
            category: ToolCategory::Events,
            description: "Search Event Console events by free-text match against the event text.",
            input_schema: schema_for::<SearchEventsParams>(),
            handler: search_events,
        },
    ]
}
