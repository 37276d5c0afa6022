//! Primary metric selection.
//!
//! A sample's `scores` container maps metric names to entries that usually
//! look like `{"value": ..., ...}`. One metric is promoted to "primary":
//! the first name on the priority list that is present, otherwise the first
//! entry in document order that carries a `value` key at all.

use serde_json::Value;

/// Metric names promoted ahead of document order.
pub const PRIMARY_METRIC_PRIORITY: [&str; 2] = ["accuracy", "harmful_tool_invoked"];

/// Picks the primary metric from a `scores` container.
///
/// Returns the metric name and its `value` field verbatim. The `value` key
/// only has to be present, a null value still selects the metric. Returns
/// `None` when the container is not an object or no entry qualifies.
pub fn extract_primary_metric(scores: &Value) -> Option<(String, Value)> {
    let map = scores.as_object()?;
    for name in PRIMARY_METRIC_PRIORITY {
        if let Some(value) = map.get(name).and_then(entry_value) {
            return Some((name.to_string(), value.clone()));
        }
    }
    map.iter()
        .find_map(|(name, entry)| entry_value(entry).map(|v| (name.clone(), v.clone())))
}

// An entry qualifies when it is an object with a "value" key.
fn entry_value(entry: &Value) -> Option<&Value> {
    entry.as_object().and_then(|m| m.get("value"))
}
