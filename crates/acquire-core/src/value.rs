use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Value;

/// Value of a named field on an instance, if present.
pub fn field_of<T: Serialize>(item: &T, field: &str) -> Option<Value> {
    match serde_json::to_value(item).ok()? {
        Value::Object(mut map) => map.remove(field),
        _ => None,
    }
}

/// Ordering used by simulator sorts.
///
/// Numbers, strings and booleans compare naturally; any other pairing,
/// including mixed kinds, is treated as equal.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

/// Text a keyword search matches against.
pub fn search_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn numbers_compare_across_representations() {
        assert_eq!(compare_values(&json!(2), &json!(10.5)), Ordering::Less);
        assert_eq!(compare_values(&json!(-1), &json!(-1)), Ordering::Equal);
    }

    #[test]
    fn mixed_kinds_are_equal() {
        assert_eq!(compare_values(&json!("a"), &json!(1)), Ordering::Equal);
        assert_eq!(compare_values(&Value::Null, &json!(true)), Ordering::Equal);
    }

    #[test]
    fn search_text_is_unquoted() {
        assert_eq!(search_text(&json!("Alice")), "Alice");
        assert_eq!(search_text(&json!(35)), "35");
        assert_eq!(search_text(&Value::Null), "null");
    }
}
