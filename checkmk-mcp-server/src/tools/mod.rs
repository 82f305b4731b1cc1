//! Tool registry + dispatcher (spec §4.11, §6): 37 tools across 8
//! categories, each keyed by a stable name and backed by a pure adapter
//! function translating JSON args into a service-layer call and back.

pub mod advanced;
pub mod business;
pub mod events;
pub mod host;
pub mod metrics;
pub mod monitoring;
pub mod parameters;
pub mod service;

use std::future::Future;
use std::pin::Pin;

use mcp_types::Tool;
use mcp_types::ToolInputSchema;
use schemars::JsonSchema;
use schemars::r#gen::SchemaSettings;
use serde_json::Value;

use crate::context::AppContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Host,
    Service,
    Monitoring,
    Parameters,
    Events,
    Metrics,
    Business,
    Advanced,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolCategory::Host => "host",
            ToolCategory::Service => "service",
            ToolCategory::Monitoring => "monitoring",
            ToolCategory::Parameters => "parameters",
            ToolCategory::Events => "events",
            ToolCategory::Metrics => "metrics",
            ToolCategory::Business => "business",
            ToolCategory::Advanced => "advanced",
        }
    }
}

pub type ToolOutcome = Result<Value, ToolError>;

#[derive(Debug, Clone)]
pub struct ToolError {
    pub kind: String,
    pub message: String,
}

impl ToolError {
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self { kind: "invalid_arguments".to_string(), message: message.into() }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self { kind: "timeout".to_string(), message: message.into() }
    }
}

pub(crate) type HandlerFuture<'a> = Pin<Box<dyn Future<Output = ToolOutcome> + Send + 'a>>;
pub(crate) type HandlerFn = for<'a> fn(Value, &'a AppContext) -> HandlerFuture<'a>;

pub struct ToolDefinition {
    pub name: &'static str,
    pub category: ToolCategory,
    pub description: &'static str,
    pub input_schema: ToolInputSchema,
    pub handler: HandlerFn,
}

/// Builds a [`ToolInputSchema`] from a schemars-derived type, matching the
/// generator settings `message_processor` used for the teacher's two tools.
pub fn schema_for<T: JsonSchema>() -> ToolInputSchema {
    let generator = SchemaSettings::draft2019_09()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>();
    #[allow(clippy::unwrap_used)]
    let schema_json = serde_json::to_value(&schema).unwrap();
    #[allow(clippy::unwrap_used)]
    serde_json::from_value(schema_json).unwrap()
}

pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    pub fn build() -> Self {
        let mut definitions = Vec::new();
        definitions.extend(host::definitions());
        definitions.extend(service::definitions());
        definitions.extend(monitoring::definitions());
        definitions.extend(parameters::definitions());
        definitions.extend(events::definitions());
        definitions.extend(metrics::definitions());
        definitions.extend(business::definitions());
        definitions.extend(advanced::definitions());
        Self { definitions }
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn list(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.definitions.iter()
    }

    pub fn to_mcp_tools(&self) -> Vec<Tool> {
        self.definitions
            .iter()
            .map(|d| Tool {
                name: d.name.to_string(),
                title: None,
                description: Some(d.description.to_string()),
                input_schema: d.input_schema.clone(),
                output_schema: None,
                annotations: None,
            })
            .collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::build()
    }
}

/// Parses `args` as `T`, surfacing schema/shape mismatches as
/// `invalid_arguments` with a path+reason message (spec §4.1).
pub(crate) fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::invalid_arguments(e.to_string()))
}
