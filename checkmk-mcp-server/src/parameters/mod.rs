pub mod engine;
pub mod handlers;
pub mod policy;
pub mod ruleset_table;

use schemars::JsonSchema;
use serde::Deserialize;
use serde::Serialize;

/// Context handlers and policies may use to tighten or relax defaults
/// (spec §4.8).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HandlerContext {
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub criticality: Option<String>,
    #[serde(default)]
    pub hardware_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Strategy override consumed by [`policy::TrendingParameterFilter`].
    #[serde(default)]
    pub include_trending: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSuggestion {
    pub path: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<serde_json::Value>,
}
