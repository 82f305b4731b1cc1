//! Request-ID middleware (spec §4.2).
//!
//! Every inbound `tools/call` is assigned a 6-hex-digit `req_` token. The
//! token is bound into a `tokio::task_local!` for the lifetime of the
//! spawned task that services the call, so downstream code (the REST
//! client, cache, tracing) can read it back without it being threaded
//! through every function signature. It is never persisted and never
//! reused across calls.

use std::fmt;

use mcp_types::RequestId as JsonRpcRequestId;
use rand::Rng;

tokio::task_local! {
    static CURRENT: RequestId;
}

/// A 6-hex-digit request identifier, `req_xxxxxx`. Distinct from the
/// JSON-RPC `id` field on the envelope (which the client chooses and may
/// reuse); this one is server-generated and unique per logical call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..6)
            .map(|_| {
                let n: u8 = rng.gen_range(0..16);
                std::char::from_digit(u32::from(n), 16).unwrap_or('0')
            })
            .collect();
        Self(format!("req_{suffix}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Runs `fut` with `self` bound as the current request-scoped id,
    /// readable via [`RequestId::current`] anywhere in `fut`'s call graph.
    pub async fn scope<F, T>(self, fut: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        CURRENT.scope(self, fut).await
    }

    /// Reads the request-id bound by the nearest enclosing [`RequestId::scope`].
    /// Returns `None` outside of a scoped call (e.g. in a unit test that
    /// doesn't set one up).
    pub fn current() -> Option<RequestId> {
        CURRENT.try_with(Clone::clone).ok()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Utility to convert an MCP `RequestId` (the JSON-RPC envelope id) into a
/// `String`, e.g. for inclusion in log lines that correlate a response to
/// its request.
pub(crate) fn json_rpc_request_id_to_string(id: &JsonRpcRequestId) -> String {
    match id {
        JsonRpcRequestId::String(s) => s.clone(),
        JsonRpcRequestId::Integer(i) => i.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_six_hex_digits_with_prefix() {
        let id = RequestId::generate();
        let s = id.as_str();
        assert!(s.starts_with("req_"), "{s} should start with req_");
        let suffix = &s["req_".len()..];
        assert_eq!(suffix.len(), 6);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn scope_makes_id_readable_downstream() {
        let id = RequestId::generate();
        let expected = id.clone();
        id.scope(async move {
            let current = RequestId::current().expect("id bound in scope");
            assert_eq!(current, expected);
        })
        .await;
        assert!(RequestId::current().is_none());
    }
}
