//! Data model (spec §3). These types are the shapes exchanged with the
//! Checkmk REST API and returned, lightly reshaped, to MCP clients.

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Host {
    pub name: String,
    pub folder: String,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_attributes: Option<HashMap<String, Value>>,
}

impl Host {
    /// Folder paths are canonical: begin and end with `/`, root is `/`.
    pub fn normalize_folder(folder: &str) -> String {
        if folder.is_empty() || folder == "/" {
            return "/".to_string();
        }
        let mut normalized = folder.to_string();
        if !normalized.starts_with('/') {
            normalized.insert(0, '/');
        }
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        normalized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceState {
    Ok = 0,
    Warn = 1,
    Crit = 2,
    Unknown = 3,
}

impl ServiceState {
    /// Decodes a raw Checkmk state code. `0` is a legitimate OK state, so
    /// this must not be implemented via truthiness (spec §4.3, §8).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ServiceState::Ok),
            1 => Some(ServiceState::Warn),
            2 => Some(ServiceState::Crit),
            3 => Some(ServiceState::Unknown),
            _ => None,
        }
    }

    pub fn as_symbolic(self) -> &'static str {
        match self {
            ServiceState::Ok => "OK",
            ServiceState::Warn => "WARN",
            ServiceState::Crit => "CRIT",
            ServiceState::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateType {
    Soft,
    Hard,
}

impl StateType {
    pub fn from_code(code: i64) -> Self {
        if code == 1 {
            StateType::Hard
        } else {
            StateType::Soft
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StateType::Soft => "soft",
            StateType::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub host_name: String,
    pub description: String,
    pub state: ServiceState,
    pub state_type: StateType,
    pub acknowledged: bool,
    pub in_downtime: bool,
    #[serde(default)]
    pub last_check: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub ruleset: String,
    pub folder: String,
    pub value: Value,
    #[serde(default)]
    pub conditions: RuleConditions,
    pub etag: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(default)]
    pub host_name: Option<Vec<String>>,
    #[serde(default)]
    pub service_description: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesetInfo {
    pub name: String,
    pub valuespec: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectiveParametersSource {
    ServiceDiscovery,
    RuleEval,
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveParameters {
    pub host: String,
    pub service: String,
    pub parameters: Value,
    pub source: EffectiveParametersSource,
    #[serde(default)]
    pub check_plugin: Option<String>,
    #[serde(default)]
    pub rule_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DowntimeRequest {
    pub host_name: String,
    pub service_description: Option<String>,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub comment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcknowledgeRequest {
    pub comment: String,
    pub sticky: bool,
    pub persistent: bool,
    pub notify: bool,
    #[serde(default)]
    pub expire_on: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub host_name: String,
    #[serde(default)]
    pub service_description: Option<String>,
    pub text: String,
    pub state: i64,
    pub time: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricReduce {
    Average,
    Max,
    Min,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricHistoryPoint {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiAggregationStatus {
    pub name: String,
    pub state: i64,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub version: String,
    pub edition: String,
    pub site: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_zero_is_ok_not_unknown() {
        assert_eq!(ServiceState::from_code(0), Some(ServiceState::Ok));
        assert_eq!(ServiceState::from_code(0).unwrap().as_symbolic(), "OK");
    }

    #[test]
    fn state_type_codes_map_to_symbolic_strings() {
        assert_eq!(StateType::from_code(0).as_str(), "soft");
        assert_eq!(StateType::from_code(1).as_str(), "hard");
    }

    #[test]
    fn folder_normalization_is_canonical() {
        assert_eq!(Host::normalize_folder(""), "/");
        assert_eq!(Host::normalize_folder("/"), "/");
        assert_eq!(Host::normalize_folder("network"), "/network/");
        assert_eq!(Host::normalize_folder("/network"), "/network/");
        assert_eq!(Host::normalize_folder("/network/"), "/network/");
    }
}
