use serde_json::Value;
use std::cmp::Ordering;

/// Deep value equality as the language defines it: numbers compare by
/// numeric value regardless of representation, arrays element-wise,
/// objects by key set (declaration order does not matter).
pub fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| value_eq(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, v)| y.get(k).map(|w| value_eq(v, w)).unwrap_or(false))
        }
        _ => false,
    }
}

/// Ordering is defined only between two numbers or two strings. Every
/// other pairing is unordered: comparison operators yield false and
/// `sort` leaves the relative order untouched.
pub fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// A value is truthy unless it is null, `false` or the number 0. Empty
/// strings, arrays and objects are truthy.
pub fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

/// Canonical string conversion, shared by `string`, `groupBy`, `keyBy`
/// and `join`: null and booleans spell themselves out, numbers use the
/// shortest round-trip form, composites serialize as compact JSON.
pub fn to_display_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => serde_json::to_string(v).unwrap_or_default(),
    }
}

/// Builds a number value from a double. Whole results stay integers so
/// they print without a trailing `.0`; non-finite results have no JSON
/// representation and collapse to null.
pub fn number_value(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < (i64::MAX as f64) {
        return Value::Number(serde_json::Number::from(n as i64));
    }
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Numeric access used by arithmetic and the numeric folds.
pub fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Short type name for error messages.
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn numbers_compare_by_value() {
        assert!(value_eq(&json!(1), &json!(1.0)));
        assert!(!value_eq(&json!(1), &json!(2)));
    }

    #[test]
    fn objects_compare_ignoring_key_order() {
        let a = serde_json::from_str::<Value>(r#"{"x":1,"y":2}"#).unwrap();
        let b = serde_json::from_str::<Value>(r#"{"y":2,"x":1}"#).unwrap();
        assert!(value_eq(&a, &b));
    }

    #[test]
    fn mixed_types_are_unordered() {
        assert_eq!(value_cmp(&json!(1), &json!("1")), None);
        assert_eq!(value_cmp(&json!([1]), &json!([1])), None);
    }

    #[test]
    fn empty_composites_are_truthy() {
        assert!(is_truthy(&json!("")));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({})));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(null)));
    }

    #[test]
    fn display_string_is_canonical() {
        assert_eq!(to_display_string(&json!(null)), "null");
        assert_eq!(to_display_string(&json!(true)), "true");
        assert_eq!(to_display_string(&json!(2.5)), "2.5");
        assert_eq!(to_display_string(&json!({"a":[1]})), r#"{"a":[1]}"#);
    }
}
