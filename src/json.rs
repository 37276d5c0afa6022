//! Narrowing helpers for the loosely-typed JSON documents found inside
//! eval archives. Producers disagree on field shapes (a string here, a list
//! there), so every boundary read goes through an explicit narrowing
//! function instead of assuming a shape.

use serde_json::Value;

/// First candidate that yields a value, evaluated lazily left to right.
///
/// Every fallback chain in the crate (descriptor fields, sample ids,
/// classification) goes through this macro. Candidates are expressions
/// producing `Option`s whose `None` already encodes "empty": absent
/// field, empty string, empty list.
#[macro_export]
macro_rules! first_nonempty {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $first$(.or_else(|| $rest))*
    };
}

/// Walk a chain of object keys, `None` as soon as the path breaks.
pub fn get_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = value;
    for key in path {
        cur = cur.get(key)?;
    }
    Some(cur)
}

/// Emptiness as the fallback chains define it: null, `""`, `[]` and `{}`
/// are empty. `0` and `false` are values, not absences.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// `Some(value)` unless it is empty.
pub fn nonempty(value: &Value) -> Option<&Value> {
    (!is_empty(value)).then_some(value)
}

/// Field lookup that treats empty values as absent. The building block for
/// `first_nonempty!` chains over documents.
pub fn get_nonempty<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).and_then(nonempty)
}

/// Render a scalar to its text form. Compound values and null are `None`.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Narrow to a non-empty string; scalars render to their text form.
pub fn as_nonempty_string(value: &Value) -> Option<String> {
    render_scalar(value).filter(|s| !s.is_empty())
}

/// Narrow a value that may be a bare scalar or a list into its elements.
/// A scalar becomes a one-element list; null and objects yield nothing.
pub fn value_list(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => vec![value.clone()],
        Value::Null | Value::Object(_) => Vec::new(),
    }
}

/// Narrow a string-or-list field into rendered scalar strings, dropping
/// empty entries and anything that is not a scalar.
pub fn string_list(value: &Value) -> Vec<String> {
    value_list(value)
        .iter()
        .filter_map(as_nonempty_string)
        .collect()
}

/// One searchable text fragment per value: strings verbatim, everything
/// else as compact JSON. Used to build keyword haystacks from tags.
pub fn display_fragment(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_nested() {
        let v = json!({"eval": {"task_attribs": {"category": "fraud"}}});
        let found = get_path(&v, &["eval", "task_attribs", "category"]);
        assert_eq!(found, Some(&json!("fraud")));
        assert_eq!(get_path(&v, &["eval", "missing", "category"]), None);
    }

    #[test]
    fn test_as_nonempty_string_filters_empties() {
        assert_eq!(as_nonempty_string(&json!("x")), Some("x".to_string()));
        assert_eq!(as_nonempty_string(&json!("")), None);
        assert_eq!(as_nonempty_string(&json!(7)), Some("7".to_string()));
        assert_eq!(as_nonempty_string(&json!(null)), None);
        assert_eq!(as_nonempty_string(&json!({"a": 1})), None);
    }

    #[test]
    fn test_string_list_shapes() {
        assert_eq!(string_list(&json!(["a", "b"])), vec!["a", "b"]);
        assert_eq!(string_list(&json!("solo")), vec!["solo"]);
        assert_eq!(string_list(&json!(["a", "", "b"])), vec!["a", "b"]);
        assert!(string_list(&json!(null)).is_empty());
        assert!(string_list(&json!({})).is_empty());
    }

    #[test]
    fn test_emptiness_spares_zero_and_false() {
        assert!(is_empty(&json!(null)));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
        assert!(!is_empty(&json!([""])));
    }

    #[test]
    fn test_get_nonempty_skips_empty_fields() {
        let v = json!({"id": "", "sample_id": "s1", "meta": {}});
        assert_eq!(get_nonempty(&v, "id"), None);
        assert_eq!(get_nonempty(&v, "sample_id"), Some(&json!("s1")));
        assert_eq!(get_nonempty(&v, "meta"), None);
        assert_eq!(get_nonempty(&v, "absent"), None);
    }

    #[test]
    fn test_first_nonempty_order_and_laziness() {
        let mut touched = false;
        let picked: Option<i32> = first_nonempty!(Some(1), {
            touched = true;
            Some(2)
        });
        assert_eq!(picked, Some(1));
        assert!(!touched, "later candidates must not be evaluated");

        let fallback: Option<i32> = first_nonempty!(None, None, Some(3));
        assert_eq!(fallback, Some(3));

        let none: Option<i32> = first_nonempty!(None, None);
        assert_eq!(none, None);
    }

    #[test]
    fn test_display_fragment() {
        assert_eq!(display_fragment(&json!("audio_injection")), "audio_injection");
        assert_eq!(display_fragment(&json!(3)), "3");
        assert_eq!(display_fragment(&json!({"k": "v"})), "{\"k\":\"v\"}");
    }
}
