//! Typed errors raised by the Checkmk REST client (spec §4.3, §7).

#[derive(Debug, thiserror::Error)]
pub enum CheckmkClientError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict (etag mismatch): {0}")]
    Conflict(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("circuit open for {endpoint_family}; short-circuited without contacting upstream")]
    CircuitOpen { endpoint_family: String },
}

impl CheckmkClientError {
    /// spec §4.3: "retryable = network I/O errors and HTTP 5xx and 429;
    /// non-retryable = 4xx except 429."
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckmkClientError::Network(_)
                | CheckmkClientError::Timeout(_)
                | CheckmkClientError::Server { .. }
        )
    }

    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => CheckmkClientError::Auth(body),
            404 => CheckmkClientError::NotFound(body),
            412 => CheckmkClientError::Conflict(body),
            400 | 422 => CheckmkClientError::Validation(body),
            429 => CheckmkClientError::Server {
                status: status.as_u16(),
                message: body,
            },
            s if (500..600).contains(&s) => CheckmkClientError::Server {
                status: s,
                message: body,
            },
            _ => CheckmkClientError::Server {
                status: status.as_u16(),
                message: body,
            },
        }
    }

    /// Scrubs home-directory paths and truncates, per spec §7 sanitization
    /// rules, before the message is allowed to reach an MCP client.
    pub fn sanitized_message(&self) -> String {
        sanitize(&self.to_string())
    }
}

pub(crate) fn sanitize(message: &str) -> String {
    let home_scrubbed = match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => message.replace(&home, "~"),
        _ => message.to_string(),
    };
    const MAX_LEN: usize = 500;
    if home_scrubbed.len() > MAX_LEN {
        let mut truncated = home_scrubbed[..MAX_LEN].to_string();
        truncated.push_str("... (truncated)");
        truncated
    } else {
        home_scrubbed
    }
}

pub type Result<T> = std::result::Result<T, CheckmkClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_home_directory_paths() {
        // SAFETY: test-only, single-threaded mutation of process env.
        unsafe {
            std::env::set_var("HOME", "/home/operator");
        }
        let msg = sanitize("failed to read /home/operator/.checkmk/secret");
        assert!(!msg.contains("/home/operator"));
        assert!(msg.contains("~/.checkmk/secret"));
    }

    #[test]
    fn truncates_long_messages() {
        let long = "x".repeat(1000);
        let msg = sanitize(&long);
        assert!(msg.len() < 1000);
        assert!(msg.ends_with("... (truncated)"));
    }

    #[test]
    fn server_5xx_and_429_are_retryable() {
        assert!(
            CheckmkClientError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new())
                .is_retryable()
        );
        assert!(CheckmkClientError::from_status(
            reqwest::StatusCode::BAD_GATEWAY,
            String::new()
        )
        .is_retryable());
    }

    #[test]
    fn client_4xx_other_than_429_is_not_retryable() {
        assert!(!CheckmkClientError::from_status(
            reqwest::StatusCode::NOT_FOUND,
            String::new()
        )
        .is_retryable());
        assert!(matches!(
            CheckmkClientError::from_status(reqwest::StatusCode::NOT_FOUND, String::new()),
            CheckmkClientError::NotFound(_)
        ));
    }
}
