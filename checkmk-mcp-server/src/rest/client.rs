//! Typed façade over the Checkmk REST API (spec §4.3).
//!
//! Every listing endpoint is POSTed with a JSON query body (Checkmk 2.4
//! convention — never GET with a query string). Every outbound request
//! carries `X-Request-ID` from the current [`crate::request_id::RequestId`]
//! scope, when one is bound. Retry and circuit-breaking are composed via
//! [`call_with_recovery`], keyed by endpoint family.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::StatusCode;
use serde_json::Value;
use serde_json::json;

use crate::config::CheckmkConfig;
use crate::config::RecoveryConfig;
use crate::request_id::RequestId;
use crate::rest::errors::CheckmkClientError;
use crate::rest::errors::Result;
use crate::rest::models::AcknowledgeRequest;
use crate::rest::models::BiAggregationStatus;
use crate::rest::models::DowntimeRequest;
use crate::rest::models::Event;
use crate::rest::models::Host;
use crate::rest::models::MetricHistoryPoint;
use crate::rest::models::MetricReduce;
use crate::rest::models::Rule;
use crate::rest::models::RulesetInfo;
use crate::rest::models::Service;
use crate::rest::models::SystemInfo;
use crate::util::recovery::CircuitBreakerRegistry;
use crate::util::recovery::call_with_recovery;

/// Rulesets whose thresholds Checkmk stores as floats even though operators
/// naturally type integers (spec §4.3, §8). Matched by prefix against the
/// ruleset name.
const TEMPERATURE_RULESET_PREFIXES: &[&str] = &["checkgroup_parameters:temperature", "temperature"];

pub struct CheckmkClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    breakers: Arc<CircuitBreakerRegistry>,
    recovery: RecoveryConfig,
}

impl CheckmkClient {
    pub fn new(config: &CheckmkConfig, recovery: RecoveryConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(recovery.call_timeout);
        if let Some(ca_path) = &config.ca_cert_path {
            let bytes = std::fs::read(ca_path)
                .map_err(|e| CheckmkClientError::Network(format!("reading CA cert {ca_path}: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&bytes)
                .map_err(|e| CheckmkClientError::Network(format!("parsing CA cert {ca_path}: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }
        let http = builder
            .build()
            .map_err(|e| CheckmkClientError::Network(e.to_string()))?;

        let base_url = format!(
            "{}/{}/check_mk/api/1.0",
            config.server_url.trim_end_matches('/'),
            config.site
        );

        Ok(Self {
            http,
            base_url,
            username: config.username.clone(),
            password: config.password.clone(),
            breakers: Arc::new(CircuitBreakerRegistry::new(
                recovery.failure_threshold,
                recovery.recovery_timeout,
            )),
            recovery,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .request(method, url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "application/json");
        if let Some(request_id) = RequestId::current() {
            builder = builder.header("X-Request-ID", request_id.as_str());
        }
        builder
    }

    async fn send_json(&self, builder: reqwest::RequestBuilder) -> Result<Value> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CheckmkClientError::Timeout(Duration::from_secs(0))
            } else {
                CheckmkClientError::Network(e.to_string())
            }
        })?;
        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let body = response
            .text()
            .await
            .map_err(|e| CheckmkClientError::Network(e.to_string()))?;
        if status.is_success() {
            if body.is_empty() {
                Ok(Value::Null)
            } else {
                serde_json::from_str(&body)
                    .map_err(|e| CheckmkClientError::Server { status: status.as_u16(), message: e.to_string() })
            }
        } else {
            Err(CheckmkClientError::from_status(status, body))
        }
    }

    /// Like [`Self::send_json`] but also returns the response's `ETag`
    /// header, required for optimistic-concurrency updates on rules.
    async fn send_json_with_etag(&self, builder: reqwest::RequestBuilder) -> Result<(Value, Option<String>)> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CheckmkClientError::Timeout(Duration::from_secs(0))
            } else {
                CheckmkClientError::Network(e.to_string())
            }
        })?;
        let status = response.status();
        let etag = response
            .headers()
            .get(reqwest::header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .text()
            .await
            .map_err(|e| CheckmkClientError::Network(e.to_string()))?;
        if status.is_success() {
            let value = if body.is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&body)
                    .map_err(|e| CheckmkClientError::Server { status: status.as_u16(), message: e.to_string() })?
            };
            Ok((value, etag))
        } else {
            Err(CheckmkClientError::from_status(status, body))
        }
    }

    async fn with_recovery<T, F, Fut>(&self, endpoint_family: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let breaker = self.breakers.get(endpoint_family);
        call_with_recovery(
            &breaker,
            self.recovery.max_retries,
            self.recovery.base_delay,
            endpoint_family,
            operation,
        )
        .await
    }

    // ---- Hosts ----------------------------------------------------------

    pub async fn list_hosts(&self, search: Option<&str>, folder: Option<&str>) -> Result<Vec<Host>> {
        self.with_recovery("hosts", || async {
            let mut body = json!({});
            if let Some(search) = search {
                body["search"] = json!(search);
            }
            if let Some(folder) = folder {
                body["folder"] = json!(folder);
            }
            let builder = self
                .request(Method::POST, "/domain-types/host_config/collections/all")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_host_list(value)
        })
        .await
    }

    pub async fn get_host(&self, name: &str, effective_attributes: bool) -> Result<Host> {
        self.with_recovery("hosts", || async {
            let path = format!(
                "/objects/host_config/{name}?effective_attributes={}",
                if effective_attributes { "true" } else { "false" }
            );
            let builder = self.request(Method::GET, &path);
            let value = self.send_json(builder).await?;
            parse_host(value)
        })
        .await
    }

    pub async fn create_host(&self, host: &Host) -> Result<Host> {
        self.with_recovery("hosts", || async {
            let body = json!({
                "host_name": host.name,
                "folder": host.folder,
                "attributes": host.attributes,
            });
            let builder = self
                .request(Method::POST, "/domain-types/host_config/collections/all")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_host(value)
        })
        .await
    }

    pub async fn update_host(&self, name: &str, attributes: &Value, etag: &str) -> Result<Host> {
        self.with_recovery("hosts", || async {
            let path = format!("/objects/host_config/{name}");
            let body = json!({ "attributes": attributes });
            let builder = self
                .request(Method::PUT, &path)
                .header("If-Match", etag)
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_host(value)
        })
        .await
    }

    pub async fn delete_host(&self, name: &str) -> Result<()> {
        self.with_recovery("hosts", || async {
            let path = format!("/objects/host_config/{name}");
            let builder = self.request(Method::DELETE, &path);
            self.send_json(builder).await.map(|_| ())
        })
        .await
    }

    pub async fn list_host_services(&self, host_name: &str) -> Result<Vec<Service>> {
        self.with_recovery("services", || async {
            let body = json!({
                "host_name": host_name,
                "columns": ["description", "state", "state_type", "acknowledged", "in_downtime", "last_check"],
            });
            let builder = self
                .request(Method::POST, "/domain-types/service/collections/all")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_service_list(value)
        })
        .await
    }

    // ---- Services ---------------------------------------------------------

    pub async fn list_all_services(&self, search: Option<&str>) -> Result<Vec<Service>> {
        self.with_recovery("services", || async {
            let mut body = json!({
                "columns": ["host_name", "description", "state", "state_type", "acknowledged", "in_downtime", "last_check"],
            });
            if let Some(search) = search {
                body["query"] = json!({ "op": "~", "left": "description", "right": search });
            }
            let builder = self
                .request(Method::POST, "/domain-types/service/collections/all")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_service_list(value)
        })
        .await
    }

    pub async fn acknowledge_problem(
        &self,
        host_name: &str,
        service_description: Option<&str>,
        request: &AcknowledgeRequest,
    ) -> Result<()> {
        self.with_recovery("services", || async {
            let acknowledge_type = if service_description.is_some() { "service" } else { "host" };
            let mut body = json!({
                "acknowledge_type": acknowledge_type,
                "host_name": host_name,
                "comment": request.comment,
                "sticky": request.sticky,
                "persistent": request.persistent,
                "notify": request.notify,
            });
            if let Some(service) = service_description {
                body["service_description"] = json!(service);
            }
            if let Some(expire_on) = request.expire_on {
                body["expire_on"] = json!(expire_on.to_rfc3339());
            }
            let builder = self
                .request(Method::POST, "/domain-types/acknowledge/collections/host")
                .json(&body);
            self.send_json(builder).await.map(|_| ())
        })
        .await
    }

    pub async fn create_downtime(&self, request: &DowntimeRequest) -> Result<()> {
        self.with_recovery("services", || async {
            let downtime_type = if request.service_description.is_some() { "service" } else { "host" };
            let mut body = json!({
                "downtime_type": downtime_type,
                "host_name": request.host_name,
                "start_time": request.start_time.to_rfc3339(),
                "end_time": request.end_time.to_rfc3339(),
                "comment": request.comment,
            });
            if let Some(service) = &request.service_description {
                body["service_description"] = json!(service);
            }
            let builder = self
                .request(Method::POST, "/domain-types/downtime/collections/host")
                .json(&body);
            self.send_json(builder).await.map(|_| ())
        })
        .await
    }

    // ---- Rules --------------------------------------------------------

    pub async fn list_rules_by_ruleset(&self, ruleset: &str) -> Result<Vec<Rule>> {
        self.with_recovery("rules", || async {
            let path = format!("/domain-types/rule/collections/all?ruleset_name={ruleset}");
            let builder = self.request(Method::GET, &path);
            let value = self.send_json(builder).await?;
            parse_rule_list(value)
        })
        .await
    }

    pub async fn get_rule(&self, rule_id: &str) -> Result<(Rule, String)> {
        self.with_recovery("rules", || async {
            let path = format!("/objects/rule/{rule_id}");
            let builder = self.request(Method::GET, &path);
            let (value, etag) = self.send_json_with_etag(builder).await?;
            let rule = parse_rule(value, etag.clone().unwrap_or_default())?;
            Ok((rule, etag.unwrap_or_default()))
        })
        .await
    }

    pub async fn create_rule(&self, ruleset: &str, folder: &str, value: &Value, conditions: &Value) -> Result<Rule> {
        let ruleset = ruleset.to_string();
        let folder = folder.to_string();
        let value_body = coerce_temperature_floats(&ruleset, value.clone());
        let conditions = conditions.clone();
        self.with_recovery("rules", || async {
            let body = json!({
                "ruleset": ruleset,
                "folder": folder,
                "value_raw": value_body,
                "conditions": conditions,
            });
            let builder = self
                .request(Method::POST, "/domain-types/rule/collections/all")
                .json(&body);
            let (value, etag) = self.send_json_with_etag(builder).await?;
            parse_rule(value, etag.unwrap_or_default())
        })
        .await
    }

    /// Updates a rule under etag-based optimistic concurrency, retrying once
    /// against a freshly-fetched etag on 412 Conflict (spec §4.7, §8).
    pub async fn update_rule(&self, rule_id: &str, value: &Value, etag: &str) -> Result<Rule> {
        let first = self.update_rule_once(rule_id, value, etag).await;
        match first {
            Err(CheckmkClientError::Conflict(_)) => {
                let (_, fresh_etag) = self.get_rule(rule_id).await?;
                self.update_rule_once(rule_id, value, &fresh_etag).await
            }
            other => other,
        }
    }

    async fn update_rule_once(&self, rule_id: &str, value: &Value, etag: &str) -> Result<Rule> {
        let rule_id = rule_id.to_string();
        let etag = etag.to_string();
        let value = value.clone();
        self.with_recovery("rules", || async {
            let path = format!("/objects/rule/{rule_id}");
            let body = json!({ "value_raw": value });
            let builder = self
                .request(Method::PUT, &path)
                .header("If-Match", &etag)
                .json(&body);
            let (value, response_etag) = self.send_json_with_etag(builder).await?;
            parse_rule(value, response_etag.unwrap_or(etag.clone()))
        })
        .await
    }

    pub async fn delete_rule(&self, rule_id: &str) -> Result<()> {
        self.with_recovery("rules", || async {
            let path = format!("/objects/rule/{rule_id}");
            let builder = self.request(Method::DELETE, &path);
            self.send_json(builder).await.map(|_| ())
        })
        .await
    }

    pub async fn discover_ruleset(&self, service_description: &str) -> Result<Option<String>> {
        self.with_recovery("rules", || async {
            let body = json!({ "service_description": service_description });
            let builder = self
                .request(Method::POST, "/domain-types/ruleset/actions/discover/invoke")
                .json(&body);
            let value = self.send_json(builder).await?;
            Ok(value.get("ruleset_name").and_then(Value::as_str).map(str::to_string))
        })
        .await
    }

    pub async fn get_ruleset_info(&self, ruleset: &str) -> Result<RulesetInfo> {
        self.with_recovery("rules", || async {
            let path = format!("/objects/ruleset/{ruleset}");
            let builder = self.request(Method::GET, &path);
            let value = self.send_json(builder).await?;
            Ok(RulesetInfo {
                name: ruleset.to_string(),
                valuespec: value.get("valuespec").cloned().unwrap_or(Value::Null),
            })
        })
        .await
    }

    // ---- Events -------------------------------------------------------

    pub async fn list_events(&self, host_name: Option<&str>, service_description: Option<&str>, search: Option<&str>) -> Result<Vec<Event>> {
        self.with_recovery("events", || async {
            let mut body = json!({});
            if let Some(host_name) = host_name {
                body["host_name"] = json!(host_name);
            }
            if let Some(service) = service_description {
                body["service_description"] = json!(service);
            }
            if let Some(search) = search {
                body["query"] = json!({ "op": "~", "left": "text", "right": search });
            }
            let builder = self
                .request(Method::POST, "/domain-types/event_console/collections/all")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_event_list(value)
        })
        .await
    }

    pub async fn acknowledge_event(&self, event_id: &str) -> Result<()> {
        self.with_recovery("events", || async {
            let path = "/domain-types/event_console/actions/change_state/invoke";
            let body = json!({ "event_id": event_id, "phase": "ack" });
            let builder = self.request(Method::POST, path).json(&body);
            self.send_json(builder).await.map(|_| ())
        })
        .await
    }

    // ---- Metrics --------------------------------------------------------

    pub async fn get_graph(&self, host_name: &str, service_description: &str) -> Result<Value> {
        self.with_recovery("metrics", || async {
            let body = json!({
                "host_name": host_name,
                "service_description": service_description,
            });
            let builder = self
                .request(Method::POST, "/domain-types/metric/actions/get/invoke")
                .json(&body);
            self.send_json(builder).await
        })
        .await
    }

    pub async fn get_metric_history(
        &self,
        host_name: &str,
        service_description: &str,
        metric_id: &str,
        reduce: MetricReduce,
    ) -> Result<Vec<MetricHistoryPoint>> {
        self.with_recovery("metrics", || async {
            let body = json!({
                "host_name": host_name,
                "service_description": service_description,
                "metric_id": metric_id,
                "reduce": reduce,
            });
            let builder = self
                .request(Method::POST, "/domain-types/metric/actions/get_history/invoke")
                .json(&body);
            let value = self.send_json(builder).await?;
            parse_metric_history(value)
        })
        .await
    }

    // ---- BI -------------------------------------------------------------

    pub async fn list_aggregations(&self) -> Result<Vec<BiAggregationStatus>> {
        self.with_recovery("bi", || async {
            let builder = self.request(Method::GET, "/domain-types/bi_aggregation/collections/all");
            let value = self.send_json(builder).await?;
            parse_bi_list(value)
        })
        .await
    }

    pub async fn critical_aggregations(&self) -> Result<Vec<BiAggregationStatus>> {
        let all = self.list_aggregations().await?;
        Ok(all.into_iter().filter(|a| a.state >= 2).collect())
    }

    // ---- System -----------------------------------------------------------

    pub async fn version(&self) -> Result<String> {
        self.with_recovery("system", || async {
            let builder = self.request(Method::GET, "/version");
            let value = self.send_json(builder).await?;
            Ok(value.get("versions").and_then(|v| v.get("checkmk")).and_then(Value::as_str).unwrap_or("unknown").to_string())
        })
        .await
    }

    pub async fn system_info(&self) -> Result<SystemInfo> {
        self.with_recovery("system", || async {
            let builder = self.request(Method::GET, "/version");
            let value = self.send_json(builder).await?;
            Ok(SystemInfo {
                version: value.get("versions").and_then(|v| v.get("checkmk")).and_then(Value::as_str).unwrap_or("unknown").to_string(),
                edition: value.get("edition").and_then(Value::as_str).unwrap_or("unknown").to_string(),
                site: value.get("site").and_then(Value::as_str).unwrap_or("unknown").to_string(),
            })
        })
        .await
    }
}

/// Recursively coerces integral JSON numbers to floats when `ruleset` is in
/// the temperature family allow-list (spec §4.3, §8).
pub(crate) fn coerce_temperature_floats(ruleset: &str, value: Value) -> Value {
    if !TEMPERATURE_RULESET_PREFIXES.iter().any(|p| ruleset.starts_with(p)) {
        return value;
    }
    coerce_ints_to_floats(value)
}

fn coerce_ints_to_floats(value: Value) -> Value {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!(i as f64)
            } else {
                Value::Number(n)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_ints_to_floats).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_ints_to_floats(v)))
                .collect(),
        ),
        other => other,
    }
}

fn parse_host(value: Value) -> Result<Host> {
    let id = value.get("id").and_then(Value::as_str).unwrap_or_default();
    let extensions = value.get("extensions").cloned().unwrap_or(Value::Null);
    let folder = extensions.get("folder").and_then(Value::as_str).unwrap_or("/");
    let attributes = extensions
        .get("attributes")
        .cloned()
        .unwrap_or(Value::Object(Default::default()));
    let effective_attributes = extensions.get("effective_attributes").cloned();
    Ok(Host {
        name: id.to_string(),
        folder: Host::normalize_folder(folder),
        attributes: serde_json::from_value(attributes).unwrap_or_default(),
        effective_attributes: effective_attributes.and_then(|v| serde_json::from_value(v).ok()),
    })
}

fn parse_host_list(value: Value) -> Result<Vec<Host>> {
    let entries = value.get("value").and_then(Value::as_array).cloned().unwrap_or_default();
    entries.into_iter().map(parse_host).collect()
}

fn parse_service_list(value: Value) -> Result<Vec<Service>> {
    let entries = value.get("value").and_then(Value::as_array).cloned().unwrap_or_default();
    entries
        .into_iter()
        .map(|entry| {
            let extensions = entry.get("extensions").cloned().unwrap_or(Value::Null);
            let state_code = extensions.get("state").and_then(Value::as_i64).unwrap_or(3);
            let state_type_code = extensions.get("state_type").and_then(Value::as_i64).unwrap_or(0);
            Ok(Service {
                host_name: extensions.get("host_name").and_then(Value::as_str).unwrap_or_default().to_string(),
                description: extensions.get("description").and_then(Value::as_str).unwrap_or_default().to_string(),
                state: crate::rest::models::ServiceState::from_code(state_code)
                    .unwrap_or(crate::rest::models::ServiceState::Unknown),
                state_type: crate::rest::models::StateType::from_code(state_type_code),
                acknowledged: extensions.get("acknowledged").and_then(Value::as_bool).unwrap_or(false),
                in_downtime: extensions.get("in_downtime").and_then(Value::as_bool).unwrap_or(false),
                last_check: extensions
                    .get("last_check")
                    .and_then(Value::as_i64)
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0)),
            })
        })
        .collect()
}

fn parse_rule(value: Value, etag: String) -> Result<Rule> {
    let id = value.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
    let extensions = value.get("extensions").cloned().unwrap_or(Value::Null);
    Ok(Rule {
        id,
        ruleset: extensions.get("ruleset").and_then(Value::as_str).unwrap_or_default().to_string(),
        folder: extensions.get("folder").and_then(Value::as_str).unwrap_or("/").to_string(),
        value: extensions.get("value_raw").cloned().unwrap_or(Value::Null),
        conditions: extensions
            .get("conditions")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default(),
        etag,
    })
}

fn parse_rule_list(value: Value) -> Result<Vec<Rule>> {
    let entries = value.get("value").and_then(Value::as_array).cloned().unwrap_or_default();
    entries.into_iter().map(|entry| parse_rule(entry, String::new())).collect()
}

fn parse_event_list(value: Value) -> Result<Vec<Event>> {
    let entries = value.get("value").and_then(Value::as_array).cloned().unwrap_or_default();
    entries
        .into_iter()
        .map(|entry| {
            let extensions = entry.get("extensions").cloned().unwrap_or(entry.clone());
            Ok(Event {
                id: entry.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
                host_name: extensions.get("host_name").and_then(Value::as_str).unwrap_or_default().to_string(),
                service_description: extensions.get("service_description").and_then(Value::as_str).map(str::to_string),
                text: extensions.get("text").and_then(Value::as_str).unwrap_or_default().to_string(),
                state: extensions.get("state").and_then(Value::as_i64).unwrap_or(0),
                time: extensions
                    .get("time")
                    .and_then(Value::as_i64)
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                    .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap_or_default()),
            })
        })
        .collect()
}

fn parse_metric_history(value: Value) -> Result<Vec<MetricHistoryPoint>> {
    let entries = value.get("points").and_then(Value::as_array).cloned().unwrap_or_default();
    entries
        .into_iter()
        .map(|entry| {
            Ok(MetricHistoryPoint {
                timestamp: entry
                    .get("timestamp")
                    .and_then(Value::as_i64)
                    .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
                    .unwrap_or_else(|| chrono::DateTime::from_timestamp(0, 0).unwrap_or_default()),
                value: entry.get("value").and_then(Value::as_f64).unwrap_or(0.0),
            })
        })
        .collect()
}

fn parse_bi_list(value: Value) -> Result<Vec<BiAggregationStatus>> {
    let entries = value.get("value").and_then(Value::as_array).cloned().unwrap_or_default();
    entries
        .into_iter()
        .map(|entry| {
            let extensions = entry.get("extensions").cloned().unwrap_or(entry.clone());
            Ok(BiAggregationStatus {
                name: entry.get("id").and_then(Value::as_str).unwrap_or_default().to_string(),
                state: extensions.get("state").and_then(Value::as_i64).unwrap_or(3),
                output: extensions.get("output").and_then(Value::as_str).unwrap_or_default().to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_integral_thresholds_for_temperature_ruleset() {
        let value = json!({ "levels": [75, 85] });
        let coerced = coerce_temperature_floats("checkgroup_parameters:temperature", value);
        assert_eq!(coerced["levels"][0], json!(75.0));
        assert!(coerced["levels"][0].is_f64());
    }

    #[test]
    fn leaves_non_temperature_rulesets_untouched() {
        let value = json!({ "levels": [75, 85] });
        let untouched = coerce_temperature_floats("checkgroup_parameters:filesystem", value.clone());
        assert_eq!(untouched, value);
        assert!(untouched["levels"][0].is_i64());
    }

    #[test]
    fn folder_normalized_from_extensions() {
        let parsed = parse_host(json!({
            "id": "piaware",
            "extensions": { "folder": "network/monitoring", "attributes": {} }
        }))
        .expect("parses");
        assert_eq!(parsed.folder, "/network/monitoring/");
    }
}
