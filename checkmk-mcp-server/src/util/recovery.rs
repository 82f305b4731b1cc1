//! Retry policy + circuit breaker (spec §4.3, §8). One [`CircuitBreaker`]
//! per "endpoint-family" (e.g. `hosts`, `services`, `rules`); the REST
//! client owns a small registry of these keyed by family name.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;
use rand::Rng;

use crate::rest::errors::CheckmkClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug)]
struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    open_until: Option<Instant>,
}

/// One circuit breaker per logical external dependency (spec §3). CLOSED
/// permits calls; after `failure_threshold` consecutive failures it opens
/// for `recovery_timeout`, then allows exactly one HALF_OPEN trial call.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery_timeout: Duration,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                open_until: None,
            }),
        }
    }

    /// Returns `true` if a call may proceed. Transitions OPEN -> HALF_OPEN
    /// once `recovery_timeout` has elapsed, consuming the single trial slot.
    #[allow(clippy::unwrap_used)]
    pub fn permits_call(&self) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        match inner.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => false,
            BreakerState::Open => {
                let ready = inner.open_until.is_none_or(|until| Instant::now() >= until);
                if ready {
                    inner.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn record_success(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        inner.state = BreakerState::Closed;
        inner.consecutive_failures = 0;
        inner.open_until = None;
    }

    #[allow(clippy::unwrap_used)]
    pub fn record_failure(&self) {
        let mut inner = self.inner.lock().unwrap_or_else(|poison| poison.into_inner());
        match inner.state {
            BreakerState::HalfOpen => {
                inner.state = BreakerState::Open;
                inner.open_until = Some(Instant::now() + self.recovery_timeout);
            }
            _ => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    inner.state = BreakerState::Open;
                    inner.open_until = Some(Instant::now() + self.recovery_timeout);
                }
            }
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn state(&self) -> BreakerState {
        self.inner.lock().unwrap_or_else(|poison| poison.into_inner()).state
    }
}

/// Keyed registry of circuit breakers, one per endpoint family, built once
/// at startup and shared process-wide (spec §5).
#[derive(Debug)]
pub struct CircuitBreakerRegistry {
    failure_threshold: u32,
    recovery_timeout: Duration,
    breakers: Mutex<HashMap<String, std::sync::Arc<CircuitBreaker>>>,
}

impl CircuitBreakerRegistry {
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            breakers: Mutex::new(HashMap::new()),
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn get(&self, endpoint_family: &str) -> std::sync::Arc<CircuitBreaker> {
        let mut breakers = self.breakers.lock().unwrap_or_else(|poison| poison.into_inner());
        breakers
            .entry(endpoint_family.to_string())
            .or_insert_with(|| {
                std::sync::Arc::new(CircuitBreaker::new(
                    self.failure_threshold,
                    self.recovery_timeout,
                ))
            })
            .clone()
    }
}

/// Runs `operation` under the retry + circuit-breaker composition described
/// in spec §4.3: the breaker gates the call; on failure, retryable errors
/// are retried with exponential backoff and jitter up to `max_retries`.
pub async fn call_with_recovery<T, F, Fut>(
    breaker: &CircuitBreaker,
    max_retries: u32,
    base_delay: Duration,
    endpoint_family: &str,
    mut operation: F,
) -> Result<T, CheckmkClientError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, CheckmkClientError>>,
{
    if !breaker.permits_call() {
        return Err(CheckmkClientError::CircuitOpen {
            endpoint_family: endpoint_family.to_string(),
        });
    }

    let mut backoff = ExponentialBackoff {
        initial_interval: base_delay,
        max_elapsed_time: None,
        ..ExponentialBackoff::default()
    };

    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(err) => {
                if !err.is_retryable() || attempt >= max_retries {
                    breaker.record_failure();
                    return Err(err);
                }
                attempt += 1;
                let delay = backoff.next_backoff().unwrap_or(base_delay);
                let jitter_ms = rand::thread_rng().gen_range(0..=25);
                tokio::time::sleep(delay + Duration::from_millis(jitter_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_after_threshold_consecutive_failures() {
        let breaker = CircuitBreaker::new(3, Duration::from_secs(30));
        assert!(breaker.permits_call());
        breaker.record_failure();
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Closed);
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(!breaker.permits_call());
    }

    #[test]
    fn half_open_permits_exactly_one_trial() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(0));
        breaker.record_failure();
        assert_eq!(breaker.state(), BreakerState::Open);
        assert!(breaker.permits_call());
        assert_eq!(breaker.state(), BreakerState::HalfOpen);
        assert!(!breaker.permits_call());
    }

    #[test]
    fn success_in_half_open_closes_breaker() {
        let breaker = CircuitBreaker::new(1, Duration::from_millis(0));
        breaker.record_failure();
        assert!(breaker.permits_call());
        breaker.record_success();
        assert_eq!(breaker.state(), BreakerState::Closed);
    }

    #[tokio::test]
    async fn circuit_open_short_circuits_without_calling_operation() {
        let breaker = CircuitBreaker::new(1, Duration::from_secs(60));
        breaker.record_failure();
        let calls = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result = call_with_recovery(
            &breaker,
            3,
            Duration::from_millis(1),
            "hosts",
            move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok::<_, CheckmkClientError>(())
                }
            },
        )
        .await;
        assert!(matches!(result, Err(CheckmkClientError::CircuitOpen { .. })));
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }
}
