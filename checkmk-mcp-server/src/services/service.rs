//! Service (the monitored-service entity, not this module's own concept)
//! facade (spec §4.10): list-all, acknowledge, create-downtime.

use std::sync::Arc;

use crate::rest::CheckmkClient;
use crate::rest::models::AcknowledgeRequest;
use crate::rest::models::DowntimeRequest;
use crate::rest::models::Service;
use crate::services::ServiceResult;
use crate::services::from_result;
use crate::util::cache::Cache;

pub struct ServiceService {
    client: Arc<CheckmkClient>,
    cache: Arc<Cache>,
}

impl ServiceService {
    pub fn new(client: Arc<CheckmkClient>, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    pub async fn list_all(&self, search: Option<&str>) -> ServiceResult<Vec<Service>> {
        from_result(self.client.list_all_services(search).await)
    }

    pub async fn acknowledge(
        &self,
        host_name: &str,
        service_description: Option<&str>,
        request: AcknowledgeRequest,
    ) -> ServiceResult<()> {
        let result = self.client.acknowledge_problem(host_name, service_description, &request).await;
        self.cache.invalidate_pattern("services:*").await;
        from_result(result)
    }

    pub async fn create_downtime(&self, request: DowntimeRequest) -> ServiceResult<()> {
        from_result(self.client.create_downtime(&request).await)
    }
}
