//! Database ruleset handler (spec §4.8): per-engine defaults and
//! connection-parameter validation (hostname, port range, SSL).

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::parameters::HandlerContext;
use crate::parameters::IssueSeverity;
use crate::parameters::ParameterSuggestion;
use crate::parameters::ValidationIssue;
use crate::parameters::handlers::ParameterHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Engine {
    Oracle,
    MySql,
    PostgreSql,
    SqlServer,
    MongoDb,
    Redis,
    Generic,
}

impl Engine {
    fn from_service_name(service: &str) -> Self {
        let lower = service.to_lowercase();
        if lower.contains("oracle") {
            Engine::Oracle
        } else if lower.contains("mysql") || lower.contains("mariadb") {
            Engine::MySql
        } else if lower.contains("postgres") {
            Engine::PostgreSql
        } else if lower.contains("mssql") || lower.contains("sql server") {
            Engine::SqlServer
        } else if lower.contains("mongo") {
            Engine::MongoDb
        } else if lower.contains("redis") {
            Engine::Redis
        } else {
            Engine::Generic
        }
    }

    fn defaults(self) -> Value {
        match self {
            Engine::Oracle => json!({
                "tablespace_usage": [85.0, 95.0],
                "connection_usage": [80.0, 90.0],
            }),
            Engine::MySql | Engine::PostgreSql | Engine::SqlServer => json!({
                "connection_usage": [80.0, 90.0],
                "lock_count": [10, 25],
                "buffer_pool_hit_rate": [95.0, 90.0],
            }),
            Engine::MongoDb => json!({
                "connection_usage": [80.0, 90.0],
                "replication_lag_seconds": [30, 120],
            }),
            Engine::Redis => json!({
                "connection_usage": [80.0, 90.0],
                "replication_lag_seconds": [5, 30],
            }),
            Engine::Generic => json!({
                "connection_usage": [80.0, 90.0],
            }),
        }
    }
}

pub struct DatabaseHandler {
    service_patterns: Vec<Regex>,
    ruleset_patterns: Vec<Regex>,
}

impl DatabaseHandler {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self {
            service_patterns: vec![Regex::new(
                r"(?i)(oracle|mysql|mariadb|postgres|mssql|sql server|mongo|redis|tablespace|database)",
            )
            .unwrap()],
            ruleset_patterns: vec![Regex::new(r"(?i)^checkgroup_parameters:(oracle|mysql|postgres|mssql|mongodb|redis)").unwrap()],
        }
    }
}

impl Default for DatabaseHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHandler for DatabaseHandler {
    fn name(&self) -> &'static str {
        "database"
    }

    fn service_name_patterns(&self) -> &[Regex] {
        &self.service_patterns
    }

    fn ruleset_patterns(&self) -> &[Regex] {
        &self.ruleset_patterns
    }

    fn priority(&self) -> i32 {
        90
    }

    fn defaults(&self, service: &str, _context: &HandlerContext) -> Value {
        Engine::from_service_name(service).defaults()
    }

    fn validate(&self, params: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Some(port) = params.get("port").and_then(Value::as_i64) {
            if !(1..=65535).contains(&port) {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    path: "port".to_string(),
                    message: format!("port {port} is outside the valid 1-65535 range"),
                    suggested_fix: None,
                });
            }
        }
        if let Some(hostname) = params.get("hostname").and_then(Value::as_str) {
            if hostname.trim().is_empty() {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    path: "hostname".to_string(),
                    message: "hostname must not be empty".to_string(),
                    suggested_fix: None,
                });
            }
        }
        issues
    }

    fn suggest(&self, current: &Value, _context: &HandlerContext) -> Vec<ParameterSuggestion> {
        let mut suggestions = Vec::new();
        if current.get("ssl").and_then(Value::as_bool) != Some(true) {
            suggestions.push(ParameterSuggestion {
                path: "ssl".to_string(),
                message: "connection is not configured to require SSL".to_string(),
                suggested_value: Some(json!(true)),
            });
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oracle_defaults_include_tablespace_usage() {
        let handler = DatabaseHandler::new();
        let defaults = handler.defaults("Oracle Tablespace USERS", &HandlerContext::default());
        assert!(defaults.get("tablespace_usage").is_some());
    }

    #[test]
    fn rejects_out_of_range_port() {
        let handler = DatabaseHandler::new();
        let issues = handler.validate(&json!({ "port": 99999 }));
        assert_eq!(issues.len(), 1);
    }
}
