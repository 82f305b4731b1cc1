//! Metric service (spec §4.10): service metrics and metric history.

use std::sync::Arc;

use serde_json::Value;

use crate::rest::CheckmkClient;
use crate::rest::models::MetricHistoryPoint;
use crate::rest::models::MetricReduce;
use crate::services::ServiceResult;
use crate::services::from_result;

pub struct MetricService {
    client: Arc<CheckmkClient>,
}

impl MetricService {
    pub fn new(client: Arc<CheckmkClient>) -> Self {
        Self { client }
    }

    pub async fn get_service_metrics(&self, host: &str, service: &str) -> ServiceResult<Value> {
        from_result(self.client.get_graph(host, service).await)
    }

    pub async fn get_metric_history(
        &self,
        host: &str,
        service: &str,
        metric_id: &str,
        reduce: MetricReduce,
    ) -> ServiceResult<Vec<MetricHistoryPoint>> {
        from_result(self.client.get_metric_history(host, service, metric_id, reduce).await)
    }
}
