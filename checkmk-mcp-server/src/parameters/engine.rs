//! Parameter engine (spec §4.7): effective-parameter resolution (read
//! path) and rule creation/update (write path).

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use serde_json::json;

use crate::parameters::HandlerContext;
use crate::parameters::handlers::HandlerRegistry;
use crate::parameters::policy;
use crate::parameters::ruleset_table;
use crate::rest::CheckmkClient;
use crate::rest::CheckmkClientError;
use crate::rest::Result;
use crate::rest::models::EffectiveParameters;
use crate::rest::models::EffectiveParametersSource;
use crate::rest::models::Host;
use crate::rest::models::Rule;
use crate::util::cache::Cache;
use crate::util::cache::cache_key;

pub struct ParameterEngine {
    client: Arc<CheckmkClient>,
    cache: Arc<Cache>,
    handlers: Arc<HandlerRegistry>,
}

/// A discovery-reported service entry, as returned by the Checkmk service
/// discovery endpoint. The REST client's discovery call is intentionally
/// not modeled beyond what this engine needs.
#[derive(Debug, Clone)]
pub struct DiscoveredService {
    pub service_description: String,
    pub check_plugin: String,
    pub parameters: Value,
}

impl ParameterEngine {
    pub fn new(client: Arc<CheckmkClient>, cache: Arc<Cache>, handlers: Arc<HandlerRegistry>) -> Self {
        Self { client, cache, handlers }
    }

    /// Read path (spec §4.7): prefer service-discovery's own computation;
    /// fall back to rule evaluation with folder-precedence resolution.
    pub async fn get_effective_parameters(
        &self,
        host: &str,
        service: &str,
        discovered: Option<&[DiscoveredService]>,
    ) -> Result<(EffectiveParameters, Vec<String>)> {
        let mut warnings = Vec::new();

        if let Some(discovered) = discovered {
            if let Some(entry) = discovered.iter().find(|d| d.service_description == service) {
                return Ok((
                    EffectiveParameters {
                        host: host.to_string(),
                        service: service.to_string(),
                        parameters: entry.parameters.clone(),
                        source: EffectiveParametersSource::ServiceDiscovery,
                        check_plugin: Some(entry.check_plugin.clone()),
                        rule_count: 0,
                    },
                    warnings,
                ));
            }
        }

        warnings.push(
            "service-discovery did not report this service; falling back to rule evaluation, which may disagree with Checkmk's own resolution in edge cases".to_string(),
        );

        let ruleset = self.resolve_ruleset(service).await?;
        let Some(ruleset) = ruleset else {
            return Ok((not_found(host, service), warnings));
        };

        let host_info = self.client.get_host(host, false).await?;
        let rules = self.list_rules_cached(&ruleset).await?;
        let matching = filter_matching_rules(&rules, host, service);
        let sorted = sort_by_folder_precedence(matching, &host_info.folder);

        match sorted.first() {
            Some(rule) => Ok((
                EffectiveParameters {
                    host: host.to_string(),
                    service: service.to_string(),
                    parameters: rule.value.clone(),
                    source: EffectiveParametersSource::RuleEval,
                    check_plugin: None,
                    rule_count: sorted.len(),
                },
                warnings,
            )),
            None => Ok((not_found(host, service), warnings)),
        }
    }

    /// Write path (spec §4.7): resolve ruleset, auto-substitute folder,
    /// normalize via handler, apply policies, validate, then create.
    pub async fn set_service_parameters(
        &self,
        host: &str,
        service: &str,
        parameters: Value,
        folder: Option<&str>,
        ruleset: Option<&str>,
        context: &HandlerContext,
    ) -> Result<(Rule, Vec<String>)> {
        let mut warnings = Vec::new();
        let ruleset_name = match ruleset {
            Some(r) => r.to_string(),
            None => self
                .resolve_ruleset(service)
                .await?
                .ok_or_else(|| CheckmkClientError::Validation(format!("no ruleset could be resolved for service '{service}'")))?,
        };

        let target_folder = match folder {
            Some(f) if f != "/" => f.to_string(),
            _ => {
                let host_info = self.client.get_host(host, false).await?;
                if folder == Some("/") {
                    warnings.push(format!(
                        "folder '/' auto-substituted with host folder '{}' so the new rule takes host-level precedence",
                        host_info.folder
                    ));
                }
                host_info.folder
            }
        };

        let handler = self.handlers.resolve(service, Some(&ruleset_name));
        let normalized = match handler {
            Some(handler) => handler.normalize(parameters, context),
            None => parameters,
        };

        let policies = policy::default_policies();
        let policed = policy::apply_all(&policies, normalized, context, None);

        if let Some(handler) = handler {
            let issues = handler.validate(&policed);
            let errors: Vec<_> = issues
                .iter()
                .filter(|i| i.severity == crate::parameters::IssueSeverity::Error)
                .collect();
            if !errors.is_empty() {
                let message = errors.iter().map(|i| format!("{}: {}", i.path, i.message)).collect::<Vec<_>>().join("; ");
                return Err(CheckmkClientError::Validation(message));
            }
        }

        let conditions = json!({
            "host_name": { "match_on": [host], "operator": "one_of" },
            "service_description": { "match_on": [service], "operator": "one_of" },
        });

        let rule = self.client.create_rule(&ruleset_name, &target_folder, &policed, &conditions).await?;
        self.cache.invalidate_pattern(&format!("rules:{ruleset_name}:*")).await;
        Ok((rule, warnings))
    }

    /// Update path (spec §4.7): fetch current rule with etag, merge the
    /// caller's `value` into the existing value, normalize via the
    /// resolved handler, apply policies with the pre-merge existing value
    /// (so Override 2 preserves trending keys already on the rule), then
    /// PUT. `CheckmkClient::update_rule` handles the etag-conflict retry.
    pub async fn update_parameter_rule(&self, rule_id: &str, value: &Value) -> Result<Rule> {
        let (existing, etag) = self.client.get_rule(rule_id).await?;
        let merged = merge_values(existing.value.clone(), value.clone());

        let service = existing
            .conditions
            .service_description
            .as_ref()
            .and_then(|patterns| patterns.first())
            .map(String::as_str)
            .unwrap_or("");
        let context = HandlerContext::default();
        let handler = self.handlers.resolve(service, Some(&existing.ruleset));
        let normalized = match handler {
            Some(handler) => handler.normalize(merged, &context),
            None => merged,
        };

        let policies = policy::default_policies();
        let policed = policy::apply_all(&policies, normalized, &context, Some(&existing.value));

        let rule = self.client.update_rule(rule_id, &policed, &etag).await?;
        self.cache.invalidate_pattern(&format!("rules:{}:*", rule.ruleset)).await;
        Ok(rule)
    }

    pub async fn resolve_ruleset(&self, service: &str) -> Result<Option<String>> {
        if let Some(seeded) = ruleset_table::lookup(service) {
            return Ok(Some(seeded.to_string()));
        }
        self.client.discover_ruleset(service).await
    }

    async fn list_rules_cached(&self, ruleset: &str) -> Result<Vec<Rule>> {
        let key = cache_key("rules", &[("ruleset", ruleset)]);
        let client = self.client.clone();
        let ruleset_owned = ruleset.to_string();
        let result = self
            .cache
            .get_or_fetch(&key, None, move || {
                let client = client.clone();
                let ruleset = ruleset_owned.clone();
                async move {
                    let rules = client.list_rules_by_ruleset(&ruleset).await?;
                    serde_json::to_value(&rules).map_err(|e| CheckmkClientError::Server {
                        status: 0,
                        message: e.to_string(),
                    })
                }
            })
            .await?;
        serde_json::from_value(result).map_err(|e| CheckmkClientError::Server { status: 0, message: e.to_string() })
    }
}

/// Shallow-merges `incoming` over `existing`: object keys present in
/// `incoming` override `existing`'s, keys only on `existing` are kept. A
/// non-object `incoming` (or non-object `existing`) replaces wholesale.
fn merge_values(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Object(mut base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                base.insert(key, value);
            }
            Value::Object(base)
        }
        (_, incoming) => incoming,
    }
}

fn not_found(host: &str, service: &str) -> EffectiveParameters {
    EffectiveParameters {
        host: host.to_string(),
        service: service.to_string(),
        parameters: Value::Null,
        source: EffectiveParametersSource::NotFound,
        check_plugin: None,
        rule_count: 0,
    }
}

fn filter_matching_rules(rules: &[Rule], host: &str, service: &str) -> Vec<Rule> {
    rules
        .iter()
        .filter(|rule| {
            let host_match = rule
                .conditions
                .host_name
                .as_ref()
                .is_none_or(|patterns| patterns.iter().any(|p| glob_or_regex_match(p, host)));
            let service_match = rule
                .conditions
                .service_description
                .as_ref()
                .is_none_or(|patterns| patterns.iter().any(|p| glob_or_regex_match(p, service)));
            host_match && service_match
        })
        .cloned()
        .collect()
}

fn glob_or_regex_match(pattern: &str, value: &str) -> bool {
    if let Ok(glob) = glob::Pattern::new(pattern) {
        if glob.matches(value) {
            return true;
        }
    }
    Regex::new(pattern).map(|re| re.is_match(value)).unwrap_or(false)
}

/// Folder-precedence distance (spec §4.7): 0 if `folder == host_folder`,
/// k if `folder` is an ancestor of `host_folder` k levels up, `+inf`
/// otherwise. `/` is the universal ancestor.
fn folder_distance(folder: &str, host_folder: &str) -> Option<u32> {
    if folder == host_folder {
        return Some(0);
    }
    let folder_parts: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    let host_parts: Vec<&str> = host_folder.split('/').filter(|s| !s.is_empty()).collect();
    if folder_parts.len() > host_parts.len() {
        return None;
    }
    if host_parts[..folder_parts.len()] == folder_parts[..] {
        Some((host_parts.len() - folder_parts.len()) as u32)
    } else {
        None
    }
}

/// Stable sort by ascending folder distance; ties preserve upstream order.
fn sort_by_folder_precedence(mut rules: Vec<Rule>, host_folder: &str) -> Vec<Rule> {
    rules.retain(|rule| folder_distance(&rule.folder, host_folder).is_some());
    rules.sort_by_key(|rule| folder_distance(&rule.folder, host_folder).unwrap_or(u32::MAX));
    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, folder: &str) -> Rule {
        Rule {
            id: id.to_string(),
            ruleset: "checkgroup_parameters:temperature".to_string(),
            folder: folder.to_string(),
            value: json!({ "id": id }),
            conditions: Default::default(),
            etag: String::new(),
        }
    }

    #[test]
    fn root_folder_is_universal_ancestor() {
        assert_eq!(folder_distance("/", "/network/monitoring/"), Some(2));
    }

    #[test]
    fn exact_folder_match_has_zero_distance() {
        assert_eq!(folder_distance("/network/monitoring/", "/network/monitoring/"), Some(0));
    }

    #[test]
    fn sibling_folder_is_not_an_ancestor() {
        assert_eq!(folder_distance("/storage/", "/network/monitoring/"), None);
    }

    #[test]
    fn sorts_closest_folder_first_preserving_ties() {
        let rules = vec![rule("root", "/"), rule("net", "/network/"), rule("exact", "/network/monitoring/")];
        let sorted = sort_by_folder_precedence(rules, "/network/monitoring/");
        let ids: Vec<&str> = sorted.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["exact", "net", "root"]);
    }

    #[test]
    fn unrelated_folders_are_dropped() {
        let rules = vec![rule("keep", "/network/"), rule("drop", "/storage/")];
        let sorted = sort_by_folder_precedence(rules, "/network/monitoring/");
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].id, "keep");
    }

    #[test]
    fn merge_overrides_only_the_caller_supplied_keys() {
        let existing = json!({ "levels": [75.0, 85.0], "trend_range": 24 });
        let incoming = json!({ "levels": [80.0, 90.0] });
        let merged = merge_values(existing, incoming);
        assert_eq!(merged, json!({ "levels": [80.0, 90.0], "trend_range": 24 }));
    }

    #[test]
    fn merge_replaces_wholesale_when_incoming_is_not_an_object() {
        let existing = json!({ "levels": [75.0, 85.0] });
        let incoming = json!([1, 2, 3]);
        let merged = merge_values(existing, incoming.clone());
        assert_eq!(merged, incoming);
    }
}
