//! Batch executor: bounded concurrency, rate limiting, per-item retry,
//! and observable progress counters (spec §4.6).

use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use governor::Quota;
use governor::RateLimiter;
use governor::clock::DefaultClock;
use governor::state::InMemoryState;
use governor::state::NotKeyed;
use rand::Rng;
use tokio::sync::Semaphore;

#[derive(Debug, Clone)]
pub struct BatchExecutorConfig {
    pub max_concurrent: usize,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub rate_limit_per_sec: u32,
    /// Abort remaining items as soon as one fails (after exhausting its
    /// own retries). When false, every item runs to its own conclusion.
    pub fail_fast: bool,
}

impl Default for BatchExecutorConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
            rate_limit_per_sec: 10,
            fail_fast: false,
        }
    }
}

#[derive(Debug, Default)]
struct Progress {
    attempted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
    retried: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ProgressSnapshot {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub retried: u64,
}

impl Progress {
    fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            attempted: self.attempted.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
            retried: self.retried.load(Ordering::SeqCst),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ItemResult<T, E> {
    pub index: usize,
    pub outcome: Result<T, E>,
}

#[derive(Debug, Clone)]
pub struct BatchResult<T, E> {
    pub items: Vec<ItemResult<T, E>>,
    pub progress: ProgressSnapshot,
}

pub struct BatchExecutor {
    config: BatchExecutorConfig,
}

impl BatchExecutor {
    pub fn new(config: BatchExecutorConfig) -> Self {
        Self { config }
    }

    /// Applies `operation` to every item in `items`, bounded to
    /// `max_concurrent` in-flight operations and throttled to
    /// `rate_limit_per_sec` starts per second. Each item is retried on a
    /// retryable failure with jittered exponential backoff
    /// (`base_delay * 2^attempt`, +/-20% jitter) up to `max_retries`
    /// times. Results preserve the caller's input order regardless of
    /// completion order.
    pub async fn run<I, T, E, F, Fut>(
        &self,
        items: Vec<I>,
        is_retryable: impl Fn(&E) -> bool + Send + Sync + 'static,
        operation: F,
    ) -> BatchResult<T, E>
    where
        I: Clone + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<T, E>> + Send,
    {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent.max(1)));
        let quota = Quota::per_second(
            NonZeroU32::new(self.config.rate_limit_per_sec.max(1)).unwrap_or(NonZeroU32::MIN),
        );
        let limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>> =
            Arc::new(RateLimiter::direct(quota));
        let progress = Arc::new(Progress::default());
        let operation = Arc::new(operation);
        let is_retryable = Arc::new(is_retryable);
        let max_retries = self.config.max_retries;
        let base_delay = self.config.retry_base_delay;
        let cancelled = Arc::new(AtomicBool::new(false));
        let fail_fast = self.config.fail_fast;

        let mut handles = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let semaphore = semaphore.clone();
            let limiter = limiter.clone();
            let progress = progress.clone();
            let operation = operation.clone();
            let is_retryable = is_retryable.clone();
            let cancelled = cancelled.clone();

            handles.push(tokio::spawn(async move {
                if fail_fast && cancelled.load(Ordering::SeqCst) {
                    return None;
                }
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };

                let mut attempt = 0u32;
                loop {
                    limiter.until_ready().await;
                    progress.attempted.fetch_add(1, Ordering::SeqCst);
                    match operation(item.clone()).await {
                        Ok(value) => {
                            progress.succeeded.fetch_add(1, Ordering::SeqCst);
                            return Some(ItemResult {
                                index,
                                outcome: Ok(value),
                            });
                        }
                        Err(err) => {
                            if attempt < max_retries && is_retryable(&err) {
                                progress.retried.fetch_add(1, Ordering::SeqCst);
                                let jitter = rand::thread_rng().gen_range(0.8..1.2);
                                let delay = base_delay.mul_f64(2f64.powi(attempt as i32) * jitter);
                                tokio::time::sleep(delay).await;
                                attempt += 1;
                                continue;
                            }
                            progress.failed.fetch_add(1, Ordering::SeqCst);
                            if fail_fast {
                                cancelled.store(true, Ordering::SeqCst);
                            }
                            return Some(ItemResult {
                                index,
                                outcome: Err(err),
                            });
                        }
                    }
                }
            }));
        }

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(Some(item_result)) = handle.await {
                results.push(item_result);
            }
        }
        results.sort_by_key(|r| r.index);

        BatchResult {
            items: results,
            progress: progress.snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Boom;

    #[tokio::test]
    async fn all_succeed_preserves_order() {
        let executor = BatchExecutor::new(BatchExecutorConfig {
            max_concurrent: 3,
            rate_limit_per_sec: 1000,
            ..Default::default()
        });
        let items: Vec<u32> = (0..10).collect();
        let result = executor
            .run(items, |_: &Boom| false, |n: u32| async move {
                Ok::<_, Boom>(n * 2)
            })
            .await;
        let doubled: Vec<u32> = result.items.iter().map(|r| *r.outcome.as_ref().unwrap()).collect();
        assert_eq!(doubled, (0..10).map(|n| n * 2).collect::<Vec<_>>());
        assert_eq!(result.progress.succeeded, 10);
        assert_eq!(result.progress.failed, 0);
    }

    #[tokio::test]
    async fn retries_retryable_failures_until_success() {
        let attempts = Arc::new(AtomicU32::new(0));
        let executor = BatchExecutor::new(BatchExecutorConfig {
            max_concurrent: 1,
            max_retries: 5,
            retry_base_delay: Duration::from_millis(1),
            rate_limit_per_sec: 1000,
            fail_fast: false,
        });
        let attempts_clone = attempts.clone();
        let result = executor
            .run(
                vec![()],
                |_: &Boom| true,
                move |_| {
                    let attempts = attempts_clone.clone();
                    async move {
                        let n = attempts.fetch_add(1, Ordering::SeqCst);
                        if n < 2 { Err(Boom) } else { Ok(()) }
                    }
                },
            )
            .await;
        assert!(result.items[0].outcome.is_ok());
        assert_eq!(result.progress.retried, 2);
    }

    #[tokio::test]
    async fn non_retryable_failure_fails_immediately() {
        let executor = BatchExecutor::new(BatchExecutorConfig {
            max_concurrent: 1,
            max_retries: 5,
            retry_base_delay: Duration::from_millis(1),
            rate_limit_per_sec: 1000,
            fail_fast: false,
        });
        let result = executor
            .run(vec![()], |_: &Boom| false, |_| async move { Err::<(), _>(Boom) })
            .await;
        assert!(result.items[0].outcome.is_err());
        assert_eq!(result.progress.retried, 0);
        assert_eq!(result.progress.failed, 1);
    }

    #[tokio::test]
    async fn fail_fast_skips_unstarted_items() {
        let executor = BatchExecutor::new(BatchExecutorConfig {
            max_concurrent: 1,
            max_retries: 0,
            retry_base_delay: Duration::from_millis(1),
            rate_limit_per_sec: 1000,
            fail_fast: true,
        });
        let result = executor
            .run(vec![1u32, 2, 3], |_: &Boom| false, |n| async move {
                if n == 1 { Err(Boom) } else { Ok(n) }
            })
            .await;
        assert!(result.progress.attempted <= 3);
        assert!(result.items.iter().any(|r| r.outcome.is_err()));
    }
}
