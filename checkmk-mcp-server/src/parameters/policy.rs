//! Parameter-policy engine (spec §4.9, Strategy pattern). Policies run
//! after handler normalization and before validation, each taking the
//! in-progress value and context and returning a (possibly) modified
//! value.

use serde_json::Value;

use crate::parameters::HandlerContext;

pub trait ParameterPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, params: Value, context: &HandlerContext, existing: Option<&Value>) -> Value;
}

const TRENDING_KEYS: &[&str] = &["trend_range", "trend_mb", "horizon", "rate_of_change_window"];

/// Omits trend-related sub-parameters by default; re-included when
/// `context.include_trending` is set, or when an existing rule being
/// updated already carries them (spec §4.9).
pub struct TrendingParameterFilter;

impl ParameterPolicy for TrendingParameterFilter {
    fn name(&self) -> &'static str {
        "trending_parameter_filter"
    }

    fn apply(&self, params: Value, context: &HandlerContext, existing: Option<&Value>) -> Value {
        if context.include_trending {
            return params;
        }
        let mut params = params;
        let Some(obj) = params.as_object_mut() else {
            return params;
        };
        for key in TRENDING_KEYS {
            let preserved_on_existing = existing
                .and_then(|e| e.get(*key))
                .is_some();
            if !preserved_on_existing {
                obj.remove(*key);
            }
        }
        params
    }
}

pub fn apply_all(
    policies: &[Box<dyn ParameterPolicy>],
    params: Value,
    context: &HandlerContext,
    existing: Option<&Value>,
) -> Value {
    policies.iter().fold(params, |acc, policy| policy.apply(acc, context, existing))
}

pub fn default_policies() -> Vec<Box<dyn ParameterPolicy>> {
    vec![Box::new(TrendingParameterFilter)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_trending_keys_by_default() {
        let policy = TrendingParameterFilter;
        let result = policy.apply(
            json!({ "levels": [1, 2], "trend_range": 24 }),
            &HandlerContext::default(),
            None,
        );
        assert!(result.get("trend_range").is_none());
        assert!(result.get("levels").is_some());
    }

    #[test]
    fn include_trending_override_keeps_keys() {
        let policy = TrendingParameterFilter;
        let context = HandlerContext {
            include_trending: true,
            ..Default::default()
        };
        let result = policy.apply(json!({ "trend_range": 24 }), &context, None);
        assert!(result.get("trend_range").is_some());
    }

    #[test]
    fn preserves_trending_keys_already_on_existing_rule() {
        let policy = TrendingParameterFilter;
        let existing = json!({ "trend_range": 12 });
        let result = policy.apply(json!({ "trend_range": 24 }), &HandlerContext::default(), Some(&existing));
        assert!(result.get("trend_range").is_some());
    }
}
