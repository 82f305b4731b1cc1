//! REST client integration tests (spec §8): request-id propagation, retry
//! on 5xx, circuit-breaker short-circuiting, and etag-conflict retry on
//! rule updates — all against a `wiremock` stand-in for a Checkmk site.

mod support;

use std::time::Duration;
use std::time::Instant;

use checkmk_mcp_server::request_id::RequestId;
use checkmk_mcp_server::rest::CheckmkClient;
use checkmk_mcp_server::rest::CheckmkClientError;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_json;
use wiremock::matchers::header_regex;
use wiremock::matchers::method;
use wiremock::matchers::path;

fn client_for(server: &MockServer) -> CheckmkClient {
    let config = support::config_for(&server.uri());
    #[expect(clippy::expect_used)]
    CheckmkClient::new(&config.checkmk, config.recovery).expect("builds client against mock server")
}

#[tokio::test]
async fn every_outbound_request_carries_the_scoped_request_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/host_config/collections/all"))
        .and(header_regex("X-Request-ID", r"^req_[0-9a-f]{6}$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let id = RequestId::generate();
    let result = id
        .scope(async { client.list_hosts(None, None).await })
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn calls_without_a_bound_request_id_still_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "versions": { "checkmk": "2.4.0" },
            "edition": "cre",
            "site": "cmk",
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client.system_info().await.expect("fetches system info");
    assert_eq!(info.version, "2.4.0");
}

#[tokio::test]
async fn network_5xx_is_retried_until_a_later_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/host_config/collections/all"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/host_config/collections/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let result = client.list_hosts(None, None).await;
    assert!(result.is_ok(), "retry should have recovered after the transient 503: {result:?}");
}

#[tokio::test]
async fn circuit_opens_after_threshold_failures_and_short_circuits_without_io() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/host_config/collections/all"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // recovery.failure_threshold = 3, max_retries = 2 in `support::config_for`:
    // each call already retries through its own 503s, so each outer call
    // below consumes one consecutive circuit-breaker failure.
    let client = client_for(&server);
    for _ in 0..3 {
        let _ = client.list_hosts(None, None).await;
    }

    let started = Instant::now();
    let result = client.list_hosts(None, None).await;
    let elapsed = started.elapsed();

    assert!(matches!(result, Err(CheckmkClientError::CircuitOpen { .. })), "{result:?}");
    assert!(elapsed < Duration::from_millis(20), "short-circuited call took {elapsed:?}, expected near-instant");
}

#[tokio::test]
async fn rule_update_retries_once_against_a_fresh_etag_on_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .and(header_regex("If-Match", "^stale-etag$"))
        .respond_with(ResponseTemplate::new(412).set_body_string("etag mismatch"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "fresh-etag")
                .set_body_json(json!({
                    "id": "rule-1",
                    "extensions": {
                        "ruleset": "checkgroup_parameters:temperature",
                        "folder": "/network/monitoring/",
                        "value_raw": { "levels": [75.0, 85.0] },
                        "conditions": {},
                    }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .and(header_regex("If-Match", "^fresh-etag$"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "next-etag")
                .set_body_json(json!({
                    "id": "rule-1",
                    "extensions": {
                        "ruleset": "checkgroup_parameters:temperature",
                        "folder": "/network/monitoring/",
                        "value_raw": { "levels": [80.0, 90.0] },
                        "conditions": {},
                    }
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let updated = client
        .update_rule("rule-1", &json!({ "levels": [80.0, 90.0] }), "stale-etag")
        .await
        .expect("succeeds after one etag-conflict retry");
    assert_eq!(updated.etag, "next-etag");
}

#[tokio::test]
async fn temperature_rule_creation_sends_integral_thresholds_as_floats() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/rule/collections/all"))
        .and(body_json(json!({
            "ruleset": "checkgroup_parameters:temperature",
            "folder": "/network/monitoring/",
            "value_raw": { "levels": [75.0, 85.0] },
            "conditions": {},
        })))
        .respond_with(
            ResponseTemplate::new(200).insert_header("ETag", "etag-1").set_body_json(json!({
                "id": "rule-1",
                "extensions": {
                    "ruleset": "checkgroup_parameters:temperature",
                    "folder": "/network/monitoring/",
                    "value_raw": { "levels": [75.0, 85.0] },
                    "conditions": {},
                }
            })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let rule = client
        .create_rule(
            "checkgroup_parameters:temperature",
            "/network/monitoring/",
            &json!({ "levels": [75, 85] }),
            &json!({}),
        )
        .await
        .expect("creates rule");
    assert_eq!(rule.value["levels"][0], json!(75.0));
}
