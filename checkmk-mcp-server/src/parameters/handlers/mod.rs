//! Handler registry (spec §4.8): maps a service to the specialized
//! handler that owns its defaults, validation, and suggestions. A closed
//! tagged-variant set plus a registry keyed by name, per the §9 Design
//! Notes guidance against dynamic dispatch on handler name.

pub mod custom;
pub mod database;
pub mod network;
pub mod temperature;

use std::collections::HashMap;
use std::sync::Mutex;

use regex::Regex;
use serde_json::Value;

use crate::parameters::HandlerContext;
use crate::parameters::ParameterSuggestion;
use crate::parameters::ValidationIssue;

pub trait ParameterHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn service_name_patterns(&self) -> &[Regex];
    fn ruleset_patterns(&self) -> &[Regex];
    fn priority(&self) -> i32;

    fn defaults(&self, service: &str, context: &HandlerContext) -> Value;
    fn validate(&self, params: &Value) -> Vec<ValidationIssue>;
    fn suggest(&self, current: &Value, context: &HandlerContext) -> Vec<ParameterSuggestion>;

    /// Per-handler value normalization (e.g. temperature's int->float
    /// coercion). Default is the identity transform.
    fn normalize(&self, params: Value, _context: &HandlerContext) -> Value {
        params
    }
}

struct Candidate {
    handler: Box<dyn ParameterHandler>,
    matched_ruleset: bool,
}

/// Registry of built-in handlers plus a resolution cache keyed by
/// `(service, ruleset)` (spec §4.8: "Handlers are cached after first
/// resolution").
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn ParameterHandler>>,
    cache: Mutex<HashMap<(String, String), Option<&'static str>>>,
}

impl HandlerRegistry {
    pub fn with_builtin_handlers() -> Self {
        let handlers: Vec<Box<dyn ParameterHandler>> = vec![
            Box::new(temperature::TemperatureHandler::new()),
            Box::new(database::DatabaseHandler::new()),
            Box::new(network::NetworkHandler::new()),
            Box::new(custom::CustomCheckHandler::new()),
        ];
        Self {
            handlers,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn by_name(&self, name: &str) -> Option<&dyn ParameterHandler> {
        self.handlers.iter().find(|h| h.name() == name).map(|h| h.as_ref())
    }

    pub fn list(&self) -> impl Iterator<Item = &dyn ParameterHandler> {
        self.handlers.iter().map(|h| h.as_ref())
    }

    /// Selects the highest-priority handler matching `service` (and,
    /// optionally, `ruleset`). Ties prefer a ruleset-pattern match over a
    /// service-name-only match (spec §4.8).
    #[allow(clippy::unwrap_used)]
    pub fn resolve(&self, service: &str, ruleset: Option<&str>) -> Option<&dyn ParameterHandler> {
        let cache_key = (service.to_string(), ruleset.unwrap_or("").to_string());
        {
            let cache = self.cache.lock().unwrap_or_else(|poison| poison.into_inner());
            if let Some(cached) = cache.get(&cache_key) {
                return cached.and_then(|name| self.by_name(name));
            }
        }

        let mut candidates: Vec<Candidate> = Vec::new();
        for handler in &self.handlers {
            let service_match = handler.service_name_patterns().iter().any(|p| p.is_match(service));
            let ruleset_match = ruleset
                .map(|r| handler.ruleset_patterns().iter().any(|p| p.is_match(r)))
                .unwrap_or(false);
            if service_match || ruleset_match {
                candidates.push(Candidate {
                    handler: clone_box(handler.as_ref(), self),
                    matched_ruleset: ruleset_match,
                });
            }
        }

        candidates.sort_by(|a, b| {
            b.handler
                .priority()
                .cmp(&a.handler.priority())
                .then(b.matched_ruleset.cmp(&a.matched_ruleset))
        });

        let resolved_name = candidates.first().map(|c| c.handler.name());
        let mut cache = self.cache.lock().unwrap_or_else(|poison| poison.into_inner());
        cache.insert(cache_key, resolved_name);
        resolved_name.and_then(|name| self.by_name(name))
    }
}

// `Box<dyn ParameterHandler>` isn't `Clone`; candidates only need the name
// and priority, which are cheap to re-look-up by name instead of cloning
// the trait object.
fn clone_box<'a>(handler: &'a dyn ParameterHandler, registry: &'a HandlerRegistry) -> &'a dyn ParameterHandler {
    registry.by_name(handler.name()).unwrap_or(handler)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_temperature_handler_for_temperature_service() {
        let registry = HandlerRegistry::with_builtin_handlers();
        let handler = registry
            .resolve("Temperature Zone 0", Some("checkgroup_parameters:temperature"))
            .expect("resolves");
        assert_eq!(handler.name(), "temperature");
    }

    #[test]
    fn resolution_is_cached() {
        let registry = HandlerRegistry::with_builtin_handlers();
        let first = registry.resolve("Temperature Zone 0", None).map(|h| h.name());
        let second = registry.resolve("Temperature Zone 0", None).map(|h| h.name());
        assert_eq!(first, second);
    }

    #[test]
    fn unmatched_service_resolves_to_none() {
        let registry = HandlerRegistry::with_builtin_handlers();
        assert!(registry.resolve("completely made up thing xyz", None).is_none());
    }
}
