//! In-process metrics collector backing the `get_server_metrics` tool.
//! No external metrics sink is wired up (spec Non-goals exclude a metrics
//! *export* surface); this just aggregates counters the rest of the crate
//! can report back over MCP.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crate::util::cache::CacheStats;

#[derive(Debug, Default)]
struct RequestCounters {
    total: AtomicU64,
    errors: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug)]
pub struct Metrics {
    started_at: Instant,
    by_tool: Mutex<HashMap<String, RequestCounters>>,
}

#[derive(Debug, Clone)]
pub struct ToolMetrics {
    pub tool: String,
    pub calls: u64,
    pub errors: u64,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub uptime_seconds: u64,
    pub tools: Vec<ToolMetrics>,
    pub cache: Option<CacheStats>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            by_tool: Mutex::new(HashMap::new()),
        }
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::unwrap_used)]
    pub fn record(&self, tool: &str, latency: Duration, is_error: bool) {
        let mut by_tool = self.by_tool.lock().unwrap_or_else(|poison| poison.into_inner());
        let counters = by_tool.entry(tool.to_string()).or_default();
        counters.total.fetch_add(1, Ordering::SeqCst);
        counters
            .total_latency_micros
            .fetch_add(latency.as_micros() as u64, Ordering::SeqCst);
        if is_error {
            counters.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[allow(clippy::unwrap_used)]
    pub fn snapshot(&self, cache: Option<CacheStats>) -> MetricsSnapshot {
        let by_tool = self.by_tool.lock().unwrap_or_else(|poison| poison.into_inner());
        let mut tools: Vec<ToolMetrics> = by_tool
            .iter()
            .map(|(tool, counters)| {
                let calls = counters.total.load(Ordering::SeqCst);
                let errors = counters.errors.load(Ordering::SeqCst);
                let total_micros = counters.total_latency_micros.load(Ordering::SeqCst);
                let avg_latency_ms = if calls > 0 {
                    (total_micros as f64 / calls as f64) / 1000.0
                } else {
                    0.0
                };
                ToolMetrics {
                    tool: tool.clone(),
                    calls,
                    errors,
                    avg_latency_ms,
                }
            })
            .collect();
        tools.sort_by(|a, b| a.tool.cmp(&b.tool));

        MetricsSnapshot {
            uptime_seconds: self.started_at.elapsed().as_secs(),
            tools,
            cache,
        }
    }
}

/// RAII latency timer: `let _timer = RequestTimer::start(&metrics, "list_hosts");`
/// records on drop so early `?`-returns are still measured.
pub struct RequestTimer<'a> {
    metrics: &'a Metrics,
    tool: String,
    start: Instant,
    is_error: std::cell::Cell<bool>,
}

impl<'a> RequestTimer<'a> {
    pub fn start(metrics: &'a Metrics, tool: impl Into<String>) -> Self {
        Self {
            metrics,
            tool: tool.into(),
            start: Instant::now(),
            is_error: std::cell::Cell::new(false),
        }
    }

    pub fn mark_error(&self) {
        self.is_error.set(true);
    }
}

impl Drop for RequestTimer<'_> {
    fn drop(&mut self) {
        self.metrics
            .record(&self.tool, self.start.elapsed(), self.is_error.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_and_errors_per_tool() {
        let metrics = Metrics::new();
        metrics.record("list_hosts", Duration::from_millis(10), false);
        metrics.record("list_hosts", Duration::from_millis(20), true);
        metrics.record("get_host", Duration::from_millis(5), false);

        let snapshot = metrics.snapshot(None);
        let list_hosts = snapshot.tools.iter().find(|t| t.tool == "list_hosts").expect("present");
        assert_eq!(list_hosts.calls, 2);
        assert_eq!(list_hosts.errors, 1);
        assert!((list_hosts.avg_latency_ms - 15.0).abs() < 0.5);
    }

    #[test]
    fn timer_records_on_drop_even_with_early_return() {
        let metrics = Metrics::new();
        fn do_work(metrics: &Metrics) -> Result<(), ()> {
            let timer = RequestTimer::start(metrics, "acknowledge_problem");
            timer.mark_error();
            Err(())
        }
        let _ = do_work(&metrics);
        let snapshot = metrics.snapshot(None);
        assert_eq!(snapshot.tools[0].calls, 1);
        assert_eq!(snapshot.tools[0].errors, 1);
    }
}
