//! Network ruleset handler (spec §4.8): HTTP/HTTPS, TCP/UDP, DNS, and
//! basic-availability checks (SSH/FTP/SMTP/IMAP/POP3), with URL and
//! hostname validators.

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::parameters::HandlerContext;
use crate::parameters::IssueSeverity;
use crate::parameters::ParameterSuggestion;
use crate::parameters::ValidationIssue;
use crate::parameters::handlers::ParameterHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    Http,
    Tcp,
    Dns,
    BasicAvailability,
}

impl CheckKind {
    fn from_service_name(service: &str) -> Self {
        let lower = service.to_lowercase();
        if lower.contains("http") {
            CheckKind::Http
        } else if lower.contains("dns") {
            CheckKind::Dns
        } else if lower.contains("tcp") || lower.contains("udp") {
            CheckKind::Tcp
        } else {
            CheckKind::BasicAvailability
        }
    }

    fn defaults(self) -> Value {
        match self {
            CheckKind::Http => json!({
                "response_time": [1.0, 3.0],
                "expected_status": 200,
                "cert_age_days": [30, 7],
                "verify_cert": true,
            }),
            CheckKind::Tcp => json!({
                "connect_time": [1.0, 3.0],
                "timeout": 10.0,
            }),
            CheckKind::Dns => json!({
                "resolve_time": [1.0, 3.0],
                "record_type": "A",
            }),
            CheckKind::BasicAvailability => json!({
                "timeout": 10.0,
            }),
        }
    }
}

fn is_valid_hostname(hostname: &str) -> bool {
    !hostname.is_empty()
        && hostname.len() <= 253
        && hostname
            .split('.')
            .all(|label| !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'))
}

fn is_valid_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

pub struct NetworkHandler {
    service_patterns: Vec<Regex>,
    ruleset_patterns: Vec<Regex>,
}

impl NetworkHandler {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self {
            service_patterns: vec![Regex::new(
                r"(?i)(http|https|tcp|udp|dns|ssh|ftp|smtp|imap|pop3)",
            )
            .unwrap()],
            ruleset_patterns: vec![Regex::new(r"(?i)^checkgroup_parameters:(http|tcp|dns)").unwrap()],
        }
    }
}

impl Default for NetworkHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHandler for NetworkHandler {
    fn name(&self) -> &'static str {
        "network"
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
        CheckKind::from_service_name(service).defaults()
    }

    fn validate(&self, params: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Some(url) = params.get("url").and_then(Value::as_str) {
            if !is_valid_url(url) {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    path: "url".to_string(),
                    message: format!("'{url}' is not a valid http(s) URL"),
                    suggested_fix: Some(format!("https://{url}")),
                });
            }
        }
        if let Some(hostname) = params.get("hostname").and_then(Value::as_str) {
            if !is_valid_hostname(hostname) {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    path: "hostname".to_string(),
                    message: format!("'{hostname}' is not a valid hostname"),
                    suggested_fix: None,
                });
            }
        }
        issues
    }

    fn suggest(&self, current: &Value, _context: &HandlerContext) -> Vec<ParameterSuggestion> {
        let mut suggestions = Vec::new();
        if current.get("verify_cert").and_then(Value::as_bool) == Some(false) {
            suggestions.push(ParameterSuggestion {
                path: "verify_cert".to_string(),
                message: "certificate verification is disabled".to_string(),
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
    fn rejects_malformed_url() {
        let handler = NetworkHandler::new();
        let issues = handler.validate(&json!({ "url": "not-a-url" }));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn rejects_malformed_hostname() {
        let handler = NetworkHandler::new();
        let issues = handler.validate(&json!({ "hostname": "bad..host" }));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn accepts_well_formed_inputs() {
        let handler = NetworkHandler::new();
        let issues = handler.validate(&json!({ "url": "https://example.com", "hostname": "example.com" }));
        assert!(issues.is_empty());
    }
}
