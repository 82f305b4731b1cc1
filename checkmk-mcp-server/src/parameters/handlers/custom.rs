//! Custom-check handler (spec §4.8): MRPE, local checks, Nagios plugins,
//! active checks, scripts. Validates Nagios threshold syntax and flags
//! shell-injection risk patterns as warnings (not errors — these checks
//! are often legitimately shell-backed).

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::parameters::HandlerContext;
use crate::parameters::IssueSeverity;
use crate::parameters::ParameterSuggestion;
use crate::parameters::ValidationIssue;
use crate::parameters::handlers::ParameterHandler;

/// Nagios-style threshold syntax: `10`, `10:`, `~:10`, `10:20`, `@10:20`,
/// decimals. See the Nagios plugin developer guidelines.
fn is_valid_nagios_threshold(input: &str) -> bool {
    let body = input.strip_prefix('@').unwrap_or(input);
    // A bound is either a bare `~` (negative infinity) or a signed number.
    let bound = r"(?:~|-?\d+(?:\.\d+)?)";
    let pattern = format!(r"^({bound})?(:({bound})?)?$");
    #[allow(clippy::unwrap_used)]
    let re = Regex::new(&pattern).unwrap();
    !body.is_empty() && re.is_match(body)
}

const SHELL_INJECTION_MARKERS: &[&str] = &["`", "$(", ";", "&&", "||", "|", ">", "<"];

fn shell_injection_risk(command: &str) -> Vec<&'static str> {
    SHELL_INJECTION_MARKERS
        .iter()
        .filter(|marker| command.contains(*marker))
        .copied()
        .collect()
}

pub struct CustomCheckHandler {
    service_patterns: Vec<Regex>,
    ruleset_patterns: Vec<Regex>,
}

impl CustomCheckHandler {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self {
            service_patterns: vec![Regex::new(r"(?i)(mrpe|local|nagios|active check|script)").unwrap()],
            ruleset_patterns: vec![Regex::new(r"(?i)^checkgroup_parameters:(mrpe|custom_checks)").unwrap()],
        }
    }
}

impl Default for CustomCheckHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHandler for CustomCheckHandler {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn service_name_patterns(&self) -> &[Regex] {
        &self.service_patterns
    }

    fn ruleset_patterns(&self) -> &[Regex] {
        &self.ruleset_patterns
    }

    fn priority(&self) -> i32 {
        10
    }

    fn defaults(&self, _service: &str, _context: &HandlerContext) -> Value {
        json!({ "warn": "10:", "crit": "20:" })
    }

    fn validate(&self, params: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for key in ["warn", "crit"] {
            if let Some(threshold) = params.get(key).and_then(Value::as_str) {
                if !is_valid_nagios_threshold(threshold) {
                    issues.push(ValidationIssue {
                        severity: IssueSeverity::Error,
                        path: key.to_string(),
                        message: format!("'{threshold}' is not a valid Nagios threshold expression"),
                        suggested_fix: Some("e.g. 10, 10:, ~:10, 10:20, @10:20".to_string()),
                    });
                }
            }
        }
        if let Some(command) = params.get("command_line").and_then(Value::as_str) {
            for marker in shell_injection_risk(command) {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Warning,
                    path: "command_line".to_string(),
                    message: format!("command contains shell metacharacter '{marker}'; review for injection risk"),
                    suggested_fix: None,
                });
            }
        }
        issues
    }

    fn suggest(&self, _current: &Value, _context: &HandlerContext) -> Vec<ParameterSuggestion> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_standard_nagios_threshold_forms() {
        for valid in ["10", "10:", "~:10", "10:20", "@10:20", "3.5:7.2"] {
            assert!(is_valid_nagios_threshold(valid), "{valid} should be valid");
        }
    }

    #[test]
    fn rejects_garbage_threshold() {
        assert!(!is_valid_nagios_threshold("not-a-threshold"));
    }

    #[test]
    fn flags_shell_metacharacters_as_warnings_not_errors() {
        let handler = CustomCheckHandler::new();
        let issues = handler.validate(&json!({ "command_line": "/usr/bin/check.sh; rm -rf /" }));
        assert!(issues.iter().all(|i| i.severity == IssueSeverity::Warning));
        assert!(!issues.is_empty());
    }
}
