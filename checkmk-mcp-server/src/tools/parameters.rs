//! Parameters category (spec §6, §4.7, §4.8): 11 tools spanning the
//! parameter engine's read/write paths and the handler registry.

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use crate::context::AppContext;
use crate::parameters::HandlerContext;
use crate::parameters::engine::DiscoveredService;
use crate::services::from_result;
use crate::tools::HandlerFuture;
use crate::tools::ToolCategory;
use crate::tools::ToolDefinition;
use crate::tools::ToolOutcome;
use crate::tools::parse_args;
use crate::tools::schema_for;

#[derive(Debug, Deserialize, JsonSchema)]
struct DiscoveredServiceParam {
    service_description: String,
    check_plugin: String,
    #[serde(default)]
    parameters: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetEffectiveParametersParams {
    host_name: String,
    service_description: String,
    #[serde(default)]
    discovered: Vec<DiscoveredServiceParam>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SetServiceParametersParams {
    host_name: String,
    service_description: String,
    parameters: Value,
    #[serde(default)]
    folder: Option<String>,
    #[serde(default)]
    ruleset: Option<String>,
    #[serde(default)]
    context: HandlerContext,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DiscoverServiceRulesetParams {
    service_description: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetParameterSchemaParams {
    ruleset: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ValidateServiceParametersParams {
    service_description: String,
    #[serde(default)]
    ruleset: Option<String>,
    parameters: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct UpdateParameterRuleParams {
    rule_id: String,
    value: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetServiceHandlerInfoParams {
    service_description: String,
    #[serde(default)]
    ruleset: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetSpecializedDefaultsParams {
    service_description: String,
    #[serde(default)]
    ruleset: Option<String>,
    #[serde(default)]
    context: HandlerContext,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ValidateWithHandlerParams {
    handler_name: String,
    parameters: Value,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GetParameterSuggestionsParams {
    service_description: String,
    #[serde(default)]
    ruleset: Option<String>,
    current: Value,
    #[serde(default)]
    context: HandlerContext,
}

fn get_effective_parameters(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetEffectiveParametersParams = parse_args(args)?;
        let discovered: Vec<DiscoveredService> = params
            .discovered
            .into_iter()
            .map(|d| DiscoveredService {
                service_description: d.service_description,
                check_plugin: d.check_plugin,
                parameters: d.parameters,
            })
            .collect();
        let discovered_slice = if discovered.is_empty() { None } else { Some(discovered.as_slice()) };
        let result = ctx
            .parameters
            .get_effective_parameters(&params.host_name, &params.service_description, discovered_slice)
            .await;
        match result {
            Ok((parameters, warnings)) => Ok(json!(crate::services::ServiceResult::ok_with_warnings(parameters, warnings))),
            Err(err) => Ok(json!(from_result::<Value>(Err(err)))),
        }
    })
}

fn set_service_parameters(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: SetServiceParametersParams = parse_args(args)?;
        let result = ctx
            .parameters
            .set_service_parameters(
                &params.host_name,
                &params.service_description,
                params.parameters,
                params.folder.as_deref(),
                params.ruleset.as_deref(),
                &params.context,
            )
            .await;
        match result {
            Ok((rule, warnings)) => Ok(json!(crate::services::ServiceResult::ok_with_warnings(rule, warnings))),
            Err(err) => Ok(json!(from_result::<Value>(Err(err)))),
        }
    })
}

fn discover_service_ruleset(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: DiscoverServiceRulesetParams = parse_args(args)?;
        let result = ctx.parameters.resolve_ruleset(&params.service_description).await;
        Ok(json!(from_result(result)))
    })
}

fn get_parameter_schema(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetParameterSchemaParams = parse_args(args)?;
        let result = ctx.client.get_ruleset_info(&params.ruleset).await;
        Ok(json!(from_result(result)))
    })
}

fn validate_service_parameters(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ValidateServiceParametersParams = parse_args(args)?;
        let handler = ctx.handlers.resolve(&params.service_description, params.ruleset.as_deref());
        match handler {
            Some(handler) => {
                let issues = handler.validate(&params.parameters);
                Ok(json!(crate::services::ServiceResult::ok(issues)))
            }
            None => Ok(json!(crate::services::ServiceResult::<Vec<crate::parameters::ValidationIssue>>::err(
                "not_found",
                format!("no handler resolves for service '{}'", params.service_description),
            ))),
        }
    })
}

fn update_parameter_rule(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: UpdateParameterRuleParams = parse_args(args)?;
        let result = ctx.parameters.update_parameter_rule(&params.rule_id, &params.value).await;
        Ok(json!(from_result(result)))
    })
}

fn get_service_handler_info(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetServiceHandlerInfoParams = parse_args(args)?;
        let handler = ctx.handlers.resolve(&params.service_description, params.ruleset.as_deref());
        match handler {
            Some(handler) => Ok(json!(crate::services::ServiceResult::ok(json!({
                "name": handler.name(),
                "priority": handler.priority(),
            })))),
            None => Ok(json!(crate::services::ServiceResult::<Value>::ok(Value::Null))),
        }
    })
}

fn get_specialized_defaults(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetSpecializedDefaultsParams = parse_args(args)?;
        let handler = ctx.handlers.resolve(&params.service_description, params.ruleset.as_deref());
        match handler {
            Some(handler) => {
                let defaults = handler.defaults(&params.service_description, &params.context);
                Ok(json!(crate::services::ServiceResult::ok(defaults)))
            }
            None => Ok(json!(crate::services::ServiceResult::<Value>::err(
                "not_found",
                format!("no handler resolves for service '{}'", params.service_description),
            ))),
        }
    })
}

fn validate_with_handler(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: ValidateWithHandlerParams = parse_args(args)?;
        match ctx.handlers.by_name(&params.handler_name) {
            Some(handler) => {
                let issues = handler.validate(&params.parameters);
                Ok(json!(crate::services::ServiceResult::ok(issues)))
            }
            None => Ok(json!(crate::services::ServiceResult::<Value>::err(
                "not_found",
                format!("no handler named '{}'", params.handler_name),
            ))),
        }
    })
}

fn get_parameter_suggestions(args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let params: GetParameterSuggestionsParams = parse_args(args)?;
        let handler = ctx.handlers.resolve(&params.service_description, params.ruleset.as_deref());
        match handler {
            Some(handler) => {
                let suggestions = handler.suggest(&params.current, &params.context);
                Ok(json!(crate::services::ServiceResult::ok(suggestions)))
            }
            None => Ok(json!(crate::services::ServiceResult::<Value>::ok(json!([])))),
        }
    })
}

fn list_parameter_handlers(_args: Value, ctx: &AppContext) -> HandlerFuture<'_> {
    Box::pin(async move {
        let handlers: Vec<Value> = ctx
            .handlers
            .list()
            .map(|h| json!({ "name": h.name(), "priority": h.priority() }))
            .collect();
        Ok(json!(crate::services::ServiceResult::ok(handlers)))
    })
}

pub fn definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_effective_parameters",
            category: ToolCategory::Parameters,
            description: "Resolve the parameters currently in effect for a host/service, preferring service discovery and falling back to folder-precedence rule evaluation.",
            input_schema: schema_for::<GetEffectiveParametersParams>(),
            handler: get_effective_parameters,
        },
        ToolDefinition {
            name: "set_service_parameters",
            category: ToolCategory::Parameters,
            description: "Create a new parameter rule for a host/service, normalized and validated by the resolved handler.",
            input_schema: schema_for::<SetServiceParametersParams>(),
            handler: set_service_parameters,
        },
        ToolDefinition {
            name: "discover_service_ruleset",
            category: ToolCategory::Parameters,
            description: "Resolve the ruleset governing a service description, using the seed table first and Checkmk's own discovery as fallback.",
            input_schema: schema_for::<DiscoverServiceRulesetParams>(),
            handler: discover_service_ruleset,
        },
        ToolDefinition {
            name: "get_parameter_schema",
            category: ToolCategory::Parameters,
            description: "Fetch the valuespec schema for a ruleset.",
            input_schema: schema_for::<GetParameterSchemaParams>(),
            handler: get_parameter_schema,
        },
        ToolDefinition {
            name: "validate_service_parameters",
            category: ToolCategory::Parameters,
            description: "Validate candidate parameters against the handler resolved for a service.",
            input_schema: schema_for::<ValidateServiceParametersParams>(),
            handler: validate_service_parameters,
        },
        ToolDefinition {
            name: "update_parameter_rule",
            category: ToolCategory::Parameters,
            description: "Update an existing parameter rule by id, under etag-based optimistic concurrency.",
            input_schema: schema_for::<UpdateParameterRuleParams>(),
            handler: update_parameter_rule,
        },
        ToolDefinition {
            name: "get_service_handler_info",
            category: ToolCategory::Parameters,
            description: "Report which specialized parameter handler (if any) resolves for a service.",
            input_schema: schema_for::<GetServiceHandlerInfoParams>(),
            handler: get_service_handler_info,
        },
        ToolDefinition {
            name: "get_specialized_defaults",
            category: ToolCategory::Parameters,
            description: "Return the resolved handler's recommended default parameters for a service.",
            input_schema: schema_for::<GetSpecializedDefaultsParams>(),
            handler: get_specialized_defaults,
        },
        ToolDefinition {
            name: "validate_with_handler",
            category: ToolCategory::Parameters,
            description: "Validate parameters against a named handler directly, bypassing resolution.",
            input_schema: schema_for::<ValidateWithHandlerParams>(),
            handler: validate_with_handler,
        },
        ToolDefinition {
            name: "get_parameter_suggestions",
            category: ToolCategory::Parameters,
            description: "Ask the resolved handler for improvement suggestions on the current parameters.",
            input_schema: schema_for::<GetParameterSuggestionsParams>(),
            handler: get_parameter_suggestions,
        },
        ToolDefinition {
            name: "list_parameter_handlers",
            category: ToolCategory::Parameters,
            description: "List every registered parameter handler with its priority.",
            input_schema: schema_for::<Value>(),
            handler: list_parameter_handlers,
        },
    ]
}
