//! Host service (spec §4.10): list/get/create/update/delete plus
//! list-services, composed with the caching mixin.

use std::sync::Arc;

use serde_json::Value;

use crate::rest::CheckmkClient;
use crate::rest::CheckmkClientError;
use crate::rest::models::Host;
use crate::rest::models::Service;
use crate::services::ServiceResult;
use crate::services::from_result;
use crate::util::cache::Cache;
use crate::util::cache::cache_key;

pub struct HostService {
    client: Arc<CheckmkClient>,
    cache: Arc<Cache>,
}

impl HostService {
    pub fn new(client: Arc<CheckmkClient>, cache: Arc<Cache>) -> Self {
        Self { client, cache }
    }

    pub async fn list(
        &self,
        search: Option<&str>,
        folder: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> ServiceResult<Vec<Host>> {
        let key = cache_key(
            "hosts:list",
            &[
                ("search", search.unwrap_or("")),
                ("folder", folder.unwrap_or("")),
                ("limit", &limit.map(|l| l.to_string()).unwrap_or_default()),
                ("offset", &offset.map(|o| o.to_string()).unwrap_or_default()),
            ],
        );
        let client = self.client.clone();
        let search_owned = search.map(str::to_string);
        let folder_owned = folder.map(str::to_string);

        let cached = self
            .cache
            .get_or_fetch(&key, None, move || {
                let client = client.clone();
                let search_owned = search_owned.clone();
                let folder_owned = folder_owned.clone();
                async move {
                    let hosts = client.list_hosts(search_owned.as_deref(), folder_owned.as_deref()).await?;
                    serde_json::to_value(hosts).map_err(|e| CheckmkClientError::Server { status: 0, message: e.to_string() })
                }
            })
            .await;

        match cached {
            Ok(value) => {
                let mut hosts: Vec<Host> = match serde_json::from_value(value) {
                    Ok(hosts) => hosts,
                    Err(e) => return ServiceResult::err("internal_error", e.to_string()),
                };
                if let Some(offset) = offset {
                    hosts = hosts.into_iter().skip(offset).collect();
                }
                if let Some(limit) = limit {
                    hosts.truncate(limit);
                }
                ServiceResult::ok(hosts)
            }
            Err(err) => from_result::<Vec<Host>>(Err(err)),
        }
    }

    pub async fn get(&self, name: &str, effective_attributes: bool) -> ServiceResult<Host> {
        from_result(self.client.get_host(name, effective_attributes).await)
    }

    pub async fn create(&self, host: Host) -> ServiceResult<Host> {
        let result = self.client.create_host(&host).await;
        self.cache.invalidate_pattern("hosts:list:*").await;
        from_result(result)
    }

    pub async fn update(&self, name: &str, attributes: Value, etag: &str) -> ServiceResult<Host> {
        let result = self.client.update_host(name, &attributes, etag).await;
        self.cache.invalidate_pattern("hosts:list:*").await;
        from_result(result)
    }

    pub async fn delete(&self, name: &str) -> ServiceResult<()> {
        let result = self.client.delete_host(name).await;
        self.cache.invalidate_pattern("hosts:list:*").await;
        from_result(result)
    }

    pub async fn list_services(&self, host_name: &str) -> ServiceResult<Vec<Service>> {
        from_result(self.client.list_host_services(host_name).await)
    }
}
