//! Static configuration surface consumed by the core (spec §6). Loading
//! this from YAML/env files is out of scope — elsewhere in a full
//! deployment a loader produces a `Config` and hands it to [`crate::run_main`].
//! [`Config::from_env`] is a minimal convenience constructor so the binary
//! is runnable standalone; it is not the configuration system.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub checkmk: CheckmkConfig,
    pub cache: CacheConfig,
    pub batch: BatchConfig,
    pub streaming: StreamingConfig,
    pub recovery: RecoveryConfig,
    pub historical: HistoricalConfig,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone)]
pub struct CheckmkConfig {
    pub server_url: String,
    pub username: String,
    pub password: String,
    pub site: String,
    pub verify_ssl: bool,
    pub ca_cert_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_size: usize,
    pub default_ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 1_000,
            default_ttl: Duration::from_secs(300),
            cleanup_interval: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_concurrent: usize,
    pub rate_limit: u32,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 8,
            rate_limit: 20,
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamingConfig {
    pub default_batch_size: usize,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            default_batch_size: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub max_retries: u32,
    pub base_delay: Duration,
    pub jitter: bool,
    /// Per-call deadline (spec §4.1, §5): bounds both the outbound HTTP
    /// client's own request timeout and the tool-call handler invocation
    /// in `message_processor`.
    pub call_timeout: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(30),
            max_retries: 3,
            base_delay: Duration::from_millis(250),
            jitter: true,
            call_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoricalSource {
    RestApi,
    /// Accepted so configuration from a deployment that also runs the
    /// scraper-based core doesn't fail to parse here; no code path in
    /// this crate acts on it (spec.md §9 Open Question).
    Scraper,
}

#[derive(Debug, Clone)]
pub struct HistoricalConfig {
    pub source: HistoricalSource,
    pub cache_ttl: Duration,
    pub scraper_timeout: Duration,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self {
            source: HistoricalSource::RestApi,
            cache_ttl: Duration::from_secs(300),
            scraper_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFlags {
    pub event_console: bool,
    pub metrics_api: bool,
    pub business_intelligence: bool,
}

impl Config {
    /// Reads the handful of required Checkmk connection settings from the
    /// environment and defaults everything else. A real deployment's
    /// YAML/env loader (out of scope here) would populate the full struct
    /// instead of calling this.
    pub fn from_env() -> anyhow::Result<Self> {
        let checkmk = CheckmkConfig {
            server_url: std::env::var("CHECKMK_SERVER_URL")
                .map_err(|_| anyhow::anyhow!("CHECKMK_SERVER_URL is required"))?,
            username: std::env::var("CHECKMK_USERNAME")
                .map_err(|_| anyhow::anyhow!("CHECKMK_USERNAME is required"))?,
            password: std::env::var("CHECKMK_PASSWORD")
                .map_err(|_| anyhow::anyhow!("CHECKMK_PASSWORD is required"))?,
            site: std::env::var("CHECKMK_SITE")
                .map_err(|_| anyhow::anyhow!("CHECKMK_SITE is required"))?,
            verify_ssl: std::env::var("CHECKMK_VERIFY_SSL")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
            ca_cert_path: std::env::var("CHECKMK_CA_CERT_PATH").ok(),
        };

        Ok(Self {
            checkmk,
            cache: CacheConfig::default(),
            batch: BatchConfig::default(),
            streaming: StreamingConfig::default(),
            recovery: RecoveryConfig::default(),
            historical: HistoricalConfig::default(),
            features: FeatureFlags {
                event_console: true,
                metrics_api: true,
                business_intelligence: true,
            },
        })
    }
}
