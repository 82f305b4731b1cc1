//! Shared scaffolding for the integration suite: a [`Config`] pointed at a
//! [`wiremock::MockServer`] instead of a real Checkmk site.

use std::sync::Arc;
use std::time::Duration;

use checkmk_mcp_server::config::BatchConfig;
use checkmk_mcp_server::config::CacheConfig;
use checkmk_mcp_server::config::CheckmkConfig;
use checkmk_mcp_server::config::Config;
use checkmk_mcp_server::config::FeatureFlags;
use checkmk_mcp_server::config::HistoricalConfig;
use checkmk_mcp_server::config::RecoveryConfig;
use checkmk_mcp_server::config::StreamingConfig;
use checkmk_mcp_server::context::AppContext;

pub fn config_for(server_url: &str) -> Config {
    Config {
        checkmk: CheckmkConfig {
            server_url: server_url.to_string(),
            username: "automation".to_string(),
            password: "secret".to_string(),
            site: "cmk".to_string(),
            verify_ssl: false,
            ca_cert_path: None,
        },
        cache: CacheConfig::default(),
        batch: BatchConfig::default(),
        streaming: StreamingConfig::default(),
        recovery: RecoveryConfig {
            failure_threshold: 3,
            recovery_timeout: Duration::from_millis(50),
            max_retries: 2,
            base_delay: Duration::from_millis(1),
            jitter: true,
            call_timeout: Duration::from_secs(5),
        },
        historical: HistoricalConfig::default(),
        features: FeatureFlags {
            event_console: true,
            metrics_api: true,
            business_intelligence: true,
        },
    }
}

#[expect(clippy::expect_used)]
pub fn context_for(server_url: &str) -> Arc<AppContext> {
    Arc::new(AppContext::new(config_for(server_url)).expect("builds AppContext against a mock server"))
}
