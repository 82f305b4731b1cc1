//! Application context: the single place process-wide state (cache,
//! breakers, metrics, handler registry) lives, with an explicit
//! construction/drain lifecycle (spec §9 Design Notes). Services take a
//! `&AppContext` rather than reaching for globals.

use std::sync::Arc;

use crate::config::Config;
use crate::parameters::engine::ParameterEngine;
use crate::parameters::handlers::HandlerRegistry;
use crate::rest::CheckmkClient;
use crate::services::bi::BiService;
use crate::services::event::EventService;
use crate::services::host::HostService;
use crate::services::metric::MetricService;
use crate::services::service::ServiceService;
use crate::services::status::StatusService;
use crate::util::batch::BatchExecutor;
use crate::util::batch::BatchExecutorConfig;
use crate::util::cache::Cache;
use crate::util::metrics::Metrics;

pub struct AppContext {
    pub config: Config,
    pub client: Arc<CheckmkClient>,
    pub cache: Arc<Cache>,
    pub metrics: Arc<Metrics>,
    pub handlers: Arc<HandlerRegistry>,
    pub parameters: ParameterEngine,
    pub batch: BatchExecutor,
    pub hosts: HostService,
    pub services: ServiceService,
    pub status: StatusService,
    pub events: EventService,
    pub metric: MetricService,
    pub bi: BiService,
}

impl AppContext {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Arc::new(CheckmkClient::new(&config.checkmk, config.recovery.clone())?);
        let cache = Arc::new(Cache::new(config.cache.max_size, config.cache.default_ttl));
        let metrics = Arc::new(Metrics::new());
        let handlers = Arc::new(HandlerRegistry::with_builtin_handlers());
        let parameters = ParameterEngine::new(client.clone(), cache.clone(), handlers.clone());
        let batch = BatchExecutor::new(BatchExecutorConfig {
            max_concurrent: config.batch.max_concurrent,
            max_retries: config.batch.max_retries,
            retry_base_delay: config.batch.retry_base_delay,
            rate_limit_per_sec: config.batch.rate_limit,
            fail_fast: false,
        });

        let hosts = HostService::new(client.clone(), cache.clone());
        let services = ServiceService::new(client.clone(), cache.clone());
        let status = StatusService::new(client.clone());
        let events = EventService::new(client.clone());
        let metric = MetricService::new(client.clone());
        let bi = BiService::new(client.clone());

        Ok(Self {
            config,
            client,
            cache,
            metrics,
            handlers,
            parameters,
            batch,
            hosts,
            services,
            status,
            events,
            metric,
            bi,
        })
    }

    /// Drops in-process state that shouldn't outlive a clean shutdown. No
    /// disk state exists to flush (spec Non-goals: no local persistence
    /// beyond the in-memory cache); this exists so the shutdown sequence in
    /// `run_main` has an explicit place to call into.
    pub async fn drain(&self) {
        self.cache.clear().await;
    }
}
