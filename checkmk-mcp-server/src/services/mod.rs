//! Service facade (spec §4.10): the uniform boundary between tool
//! adapters and the REST client / parameter engine. Every operation
//! returns a [`ServiceResult`] instead of propagating typed errors
//! directly, so tool adapters have one shape to translate into MCP
//! responses.

pub mod bi;
pub mod event;
pub mod host;
pub mod metric;
pub mod service;
pub mod status;

use serde::Serialize;

use crate::rest::CheckmkClientError;

#[derive(Debug, Clone, Serialize)]
pub struct ServiceError {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceResult<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T: Serialize> ServiceResult<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), error: None, warnings: Vec::new() }
    }

    pub fn ok_with_warnings(data: T, warnings: Vec<String>) -> Self {
        Self { success: true, data: Some(data), error: None, warnings }
    }

    pub fn err(kind: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ServiceError { kind: kind.to_string(), message: message.into() }),
            warnings: Vec::new(),
        }
    }
}

/// Classifies a typed REST error into the §7 taxonomy and sanitizes the
/// message before it can reach an MCP client.
pub(crate) fn classify_error(err: &CheckmkClientError) -> ServiceError {
    let kind = match err {
        CheckmkClientError::Validation(_) => "invalid_arguments",
        CheckmkClientError::NotFound(_) => "not_found",
        CheckmkClientError::Auth(_) => "upstream_error",
        CheckmkClientError::Conflict(_) => "conflict",
        CheckmkClientError::Timeout(_) => "timeout",
        CheckmkClientError::Network(_) | CheckmkClientError::Server { .. } | CheckmkClientError::CircuitOpen { .. } => {
            "upstream_error"
        }
    };
    ServiceError { kind: kind.to_string(), message: err.sanitized_message() }
}

pub(crate) fn from_result<T: Serialize>(result: Result<T, CheckmkClientError>) -> ServiceResult<T> {
    match result {
        Ok(value) => ServiceResult::ok(value),
        Err(err) => {
            let classified = classify_error(&err);
            ServiceResult { success: false, data: None, error: Some(classified), warnings: Vec::new() }
        }
    }
}
