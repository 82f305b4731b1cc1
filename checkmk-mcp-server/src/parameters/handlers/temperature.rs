//! Temperature ruleset handler (spec §4.8). Profiles per hardware class
//! with symmetric warn/crit levels; accepts °C/°F/K and normalizes to °C;
//! coerces integral thresholds to floats (Checkmk stores them as floats).

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::parameters::HandlerContext;
use crate::parameters::IssueSeverity;
use crate::parameters::ParameterSuggestion;
use crate::parameters::ValidationIssue;
use crate::parameters::handlers::ParameterHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HardwareClass {
    Cpu,
    Ambient,
    Storage,
    Chassis,
    Psu,
    Nic,
    Gpu,
}

impl HardwareClass {
    fn from_service_name(service: &str) -> Self {
        let lower = service.to_lowercase();
        if lower.contains("cpu") {
            HardwareClass::Cpu
        } else if lower.contains("disk") || lower.contains("storage") || lower.contains("drive") {
            HardwareClass::Storage
        } else if lower.contains("chassis") || lower.contains("system") {
            HardwareClass::Chassis
        } else if lower.contains("psu") || lower.contains("power supply") {
            HardwareClass::Psu
        } else if lower.contains("nic") || lower.contains("ethernet") || lower.contains("interface") {
            HardwareClass::Nic
        } else if lower.contains("gpu") {
            HardwareClass::Gpu
        } else {
            HardwareClass::Ambient
        }
    }

    /// (warn, crit) °C pairs.
    fn default_levels(self) -> (f64, f64) {
        match self {
            HardwareClass::Cpu => (75.0, 85.0),
            HardwareClass::Ambient => (30.0, 35.0),
            HardwareClass::Storage => (50.0, 60.0),
            HardwareClass::Chassis => (40.0, 45.0),
            HardwareClass::Psu => (60.0, 70.0),
            HardwareClass::Nic => (65.0, 75.0),
            HardwareClass::Gpu => (80.0, 90.0),
        }
    }
}

/// Converts a temperature expressed in `unit` (`c`, `f`, `k`) to Celsius.
fn to_celsius(value: f64, unit: &str) -> f64 {
    match unit.to_lowercase().as_str() {
        "f" => (value - 32.0) * 5.0 / 9.0,
        "k" => value - 273.15,
        _ => value,
    }
}

pub struct TemperatureHandler {
    service_patterns: Vec<Regex>,
    ruleset_patterns: Vec<Regex>,
}

impl TemperatureHandler {
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        Self {
            service_patterns: vec![Regex::new(r"(?i)temp(erature)?").unwrap()],
            ruleset_patterns: vec![Regex::new(r"(?i)^(checkgroup_parameters:)?temperature").unwrap()],
        }
    }
}

impl Default for TemperatureHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHandler for TemperatureHandler {
    fn name(&self) -> &'static str {
        "temperature"
    }

    fn service_name_patterns(&self) -> &[Regex] {
        &self.service_patterns
    }

    fn ruleset_patterns(&self) -> &[Regex] {
        &self.ruleset_patterns
    }

    fn priority(&self) -> i32 {
        100
    }

    fn defaults(&self, service: &str, _context: &HandlerContext) -> Value {
        let (warn, crit) = HardwareClass::from_service_name(service).default_levels();
        json!({
            "levels": [warn, crit],
            "levels_lower": [warn - 40.0, crit - 50.0],
            "output_unit": "c",
        })
    }

    fn validate(&self, params: &Value) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if let Some(levels) = params.get("levels").and_then(Value::as_array) {
            if levels.len() != 2 {
                issues.push(ValidationIssue {
                    severity: IssueSeverity::Error,
                    path: "levels".to_string(),
                    message: "expected exactly [warn, crit]".to_string(),
                    suggested_fix: None,
                });
            } else if let (Some(warn), Some(crit)) = (levels[0].as_f64(), levels[1].as_f64()) {
                if warn > crit {
                    issues.push(ValidationIssue {
                        severity: IssueSeverity::Error,
                        path: "levels".to_string(),
                        message: format!("warn ({warn}) must not exceed crit ({crit})"),
                        suggested_fix: Some(format!("[{crit}, {warn}]")),
                    });
                }
            }
        }
        issues
    }

    fn suggest(&self, current: &Value, _context: &HandlerContext) -> Vec<ParameterSuggestion> {
        let mut suggestions = Vec::new();
        if current.get("output_unit").is_none() {
            suggestions.push(ParameterSuggestion {
                path: "output_unit".to_string(),
                message: "no output_unit set; defaulting display to Celsius".to_string(),
                suggested_value: Some(json!("c")),
            });
        }
        suggestions
    }

    fn normalize(&self, params: Value, _context: &HandlerContext) -> Value {
        let unit = params.get("input_unit").and_then(Value::as_str).unwrap_or("c").to_string();
        let mut params = params;
        for key in ["levels", "levels_lower"] {
            if let Some(Value::Array(levels)) = params.get(key).cloned() {
                let converted: Vec<Value> = levels
                    .into_iter()
                    .map(|v| {
                        let as_f64 = v.as_f64().unwrap_or(0.0);
                        json!(to_celsius(as_f64, &unit))
                    })
                    .collect();
                if let Some(obj) = params.as_object_mut() {
                    obj.insert(key.to_string(), Value::Array(converted));
                }
            }
        }
        if let Some(obj) = params.as_object_mut() {
            obj.remove("input_unit");
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_integer_thresholds_to_float() {
        let handler = TemperatureHandler::new();
        let normalized = handler.normalize(json!({ "levels": [75, 85] }), &HandlerContext::default());
        assert_eq!(normalized["levels"][0], json!(75.0));
        assert!(normalized["levels"][0].is_f64());
    }

    #[test]
    fn converts_fahrenheit_input_to_celsius() {
        let handler = TemperatureHandler::new();
        let normalized = handler.normalize(
            json!({ "levels": [167, 185], "input_unit": "f" }),
            &HandlerContext::default(),
        );
        let warn = normalized["levels"][0].as_f64().expect("f64");
        assert!((warn - 75.0).abs() < 0.01);
    }

    #[test]
    fn rejects_warn_above_crit() {
        let handler = TemperatureHandler::new();
        let issues = handler.validate(&json!({ "levels": [90.0, 80.0] }));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Error);
    }
}
