//! Deriving a normalized `[0, 1]` score from loosely-typed inputs.

use serde_json::Value;

use crate::taxonomy::Taxonomy;

/// Derives `score_bool` from the primary metric value and the raw score.
///
/// The steps run in order and the first that produces a number wins:
/// 1. the primary value, as a grade label looked up in the score map;
/// 2. the raw score, if numeric, clipped into `[0, 1]`;
/// 3. the raw score, as a grade label looked up in the score map.
///
/// Booleans count as numbers in step 2 (`true` is `1.0`), matching the
/// producers that emit pass/fail flags in the score field.
pub fn coerce_score_bool(
    taxonomy: &Taxonomy,
    primary_value: Option<&Value>,
    raw_score: Option<&Value>,
) -> Option<f64> {
    if let Some(key) = primary_value.and_then(grade_key) {
        if let Some(score) = taxonomy.score_for(&key) {
            return Some(score);
        }
    }
    if let Some(raw) = raw_score {
        if let Some(x) = as_number(raw) {
            return Some(x.clamp(0.0, 1.0));
        }
        if let Some(s) = raw.as_str() {
            if let Some(score) = taxonomy.score_for(s.trim()) {
                return Some(score);
            }
        }
    }
    None
}

// Scalars render to a lookup key; whitespace is not significant in grades.
fn grade_key(value: &Value) -> Option<String> {
    crate::json::render_scalar(value).map(|s| s.trim().to_string())
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::String(_) | Value::Array(_) | Value::Object(_) => None,
    }
}
