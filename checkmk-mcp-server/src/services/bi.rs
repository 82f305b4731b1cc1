//! Business-intelligence service (spec §4.10): aggregation status summary
//! and the critical subset.

use std::sync::Arc;

use crate::rest::CheckmkClient;
use crate::rest::models::BiAggregationStatus;
use crate::services::ServiceResult;
use crate::services::from_result;

pub struct BiService {
    client: Arc<CheckmkClient>,
}

impl BiService {
    pub fn new(client: Arc<CheckmkClient>) -> Self {
        Self { client }
    }

    pub async fn status_summary(&self) -> ServiceResult<Vec<BiAggregationStatus>> {
        from_result(self.client.list_aggregations().await)
    }

    pub async fn critical_aggregations(&self) -> ServiceResult<Vec<BiAggregationStatus>> {
        from_result(self.client.critical_aggregations().await)
    }
}
