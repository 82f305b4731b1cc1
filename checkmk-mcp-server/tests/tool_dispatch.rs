//! End-to-end tool-dispatch tests (spec §8 seed scenarios): each call goes
//! through the real [`ToolRegistry`] and [`AppContext`], against a
//! `wiremock`-backed Checkmk stand-in.

mod support;

use checkmk_mcp_server::context::AppContext;
use checkmk_mcp_server::tools::ToolRegistry;
use serde_json::Value;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::matchers::query_param;

#[expect(clippy::expect_used)]
async fn call(registry: &ToolRegistry, ctx: &AppContext, name: &str, args: Value) -> Value {
    let definition = registry.get(name).unwrap_or_else(|| panic!("tool '{name}' is registered"));
    (definition.handler)(args, ctx)
        .await
        .unwrap_or_else(|e| panic!("tool '{name}' call failed: {}", e.message))
}

fn host_response(name: &str, folder: &str) -> Value {
    json!({
        "id": name,
        "extensions": { "folder": folder, "attributes": {} },
    })
}

fn rule_response(id: &str, ruleset: &str, folder: &str, value: Value) -> Value {
    json!({
        "id": id,
        "extensions": {
            "ruleset": ruleset,
            "folder": folder,
            "value_raw": value,
            "conditions": {},
        },
    })
}

// 1. Effective parameters via discovery: discovery's own report wins over
// rule evaluation, with no HTTP call at all.
#[tokio::test]
async fn effective_parameters_prefer_service_discovery_over_rule_evaluation() {
    let server = MockServer::start().await;
    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(
        &registry,
        &ctx,
        "get_effective_parameters",
        json!({
            "host_name": "piaware",
            "service_description": "Temperature Zone 0",
            "discovered": [{
                "service_description": "Temperature Zone 0",
                "check_plugin": "temperature",
                "parameters": { "levels": [70.0, 80.0], "output_unit": "c" },
            }],
        }),
    )
    .await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["source"], json!("service_discovery"));
    assert_eq!(result["data"]["check_plugin"], json!("temperature"));
    assert_eq!(result["data"]["parameters"], json!({ "levels": [70.0, 80.0], "output_unit": "c" }));
}

// 2. Folder auto-placement on rule create: host lives deeper than the
// requested root folder, so the new rule is placed at the host's folder
// and integral thresholds travel as floats.
#[tokio::test]
async fn set_service_parameters_auto_places_rule_at_host_folder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/objects/host_config/piaware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_response("piaware", "network/monitoring")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/rule/collections/all"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("ETag", "etag-1").set_body_json(rule_response(
                "rule-1",
                "checkgroup_parameters:temperature",
                "/network/monitoring/",
                json!({ "levels": [75.0, 85.0] }),
            )),
        )
        .mount(&server)
        .await;

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(
        &registry,
        &ctx,
        "set_service_parameters",
        json!({
            "host_name": "piaware",
            "service_description": "Temperature Zone 0",
            "parameters": { "levels": [75, 85] },
            "folder": "/",
        }),
    )
    .await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["folder"], json!("/network/monitoring/"));
    assert_eq!(result["data"]["value"]["levels"][0], json!(75.0));
    assert!(result["warnings"].as_array().is_some_and(|w| !w.is_empty()));
}

// 3. Folder precedence in rule evaluation: three candidate rules at
// increasing folder depth, the host's own folder wins.
#[tokio::test]
async fn get_effective_parameters_picks_closest_folder_on_rule_evaluation() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/objects/host_config/piaware"))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_response("piaware", "network/monitoring")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/rule/collections/all"))
        .and(query_param("ruleset_name", "checkgroup_parameters:temperature"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                rule_response("root", "checkgroup_parameters:temperature", "/", json!({ "levels": [60.0, 70.0] })),
                rule_response("net", "checkgroup_parameters:temperature", "/network/", json!({ "levels": [65.0, 75.0] })),
                rule_response("exact", "checkgroup_parameters:temperature", "/network/monitoring/", json!({ "levels": [70.0, 80.0] })),
            ]
        })))
        .mount(&server)
        .await;

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(
        &registry,
        &ctx,
        "get_effective_parameters",
        json!({ "host_name": "piaware", "service_description": "Temperature Zone 0" }),
    )
    .await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["source"], json!("rule_eval"));
    assert_eq!(result["data"]["parameters"], json!({ "levels": [70.0, 80.0] }));
    assert_eq!(result["data"]["rule_count"], json!(3));
}

// 4. Etag conflict on update: the rule's current etag goes stale between
// fetch and write; the engine retries once against a freshly-fetched etag.
#[tokio::test]
async fn update_parameter_rule_retries_once_on_etag_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("ETag", "stale-etag").set_body_json(rule_response(
                "rule-1",
                "checkgroup_parameters:temperature",
                "/network/monitoring/",
                json!({ "levels": [75.0, 85.0] }),
            )),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("ETag", "fresh-etag").set_body_json(rule_response(
                "rule-1",
                "checkgroup_parameters:temperature",
                "/network/monitoring/",
                json!({ "levels": [75.0, 85.0] }),
            )),
        )
        .with_priority(2)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .respond_with(ResponseTemplate::new(412).set_body_string("etag mismatch"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/cmk/check_mk/api/1.0/objects/rule/rule-1"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("ETag", "next-etag").set_body_json(rule_response(
                "rule-1",
                "checkgroup_parameters:temperature",
                "/network/monitoring/",
                json!({ "levels": [80.0, 90.0] }),
            )),
        )
        .with_priority(2)
        .expect(1)
        .mount(&server)
        .await;

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(
        &registry,
        &ctx,
        "update_parameter_rule",
        json!({ "rule_id": "rule-1", "value": { "levels": [80.0, 90.0] } }),
    )
    .await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["etag"], json!("next-etag"));
}

// 5. Circuit breaker open state: after `failure_threshold` consecutive
// upstream failures, the next call short-circuits immediately.
#[tokio::test]
async fn list_hosts_short_circuits_once_the_breaker_opens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/host_config/collections/all"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    for _ in 0..3 {
        let _ = call(&registry, &ctx, "list_hosts", json!({})).await;
    }

    let result = call(&registry, &ctx, "list_hosts", json!({})).await;
    assert_eq!(result["success"], json!(false));
    assert_eq!(result["error"]["kind"], json!("upstream_error"));
    assert!(result["error"]["message"].as_str().is_some_and(|m| m.contains("circuit open")));
}

// 6. Empty event list is success, not an error.
#[tokio::test]
async fn empty_event_list_reports_success_with_zero_count() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cmk/check_mk/api/1.0/domain-types/event_console/collections/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(
        &registry,
        &ctx,
        "list_service_events",
        json!({ "host_name": "piaware", "service_description": "Temperature Zone 0" }),
    )
    .await;

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["count"], json!(0));
    assert_eq!(result["data"]["events"], json!([]));
    assert_eq!(result["data"]["message"], json!("no events"));
}

// Tools with no input fields must still dispatch when the MCP client omits
// `arguments` entirely (`message_processor` defaults it to `{}`, not `null`).
#[tokio::test]
async fn parameterless_tool_dispatches_with_empty_object_args() {
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

    let ctx = support::context_for(&server.uri());
    let registry = ToolRegistry::build();

    let result = call(&registry, &ctx, "get_system_info", json!({})).await;
    assert_eq!(result["success"], json!(true));
    assert_eq!(result["data"]["version"], json!("2.4.0"));
}
