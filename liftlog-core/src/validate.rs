//! Type checks for untrusted request fields.
//!
//! `validate_field` inspects a raw JSON value against an expected primitive
//! kind and reports a client-facing message on mismatch. An absent (or null)
//! field is "not provided", never invalid. Callers run it over every field
//! of a request and collect all messages before rejecting, so a client sees
//! every problem at once.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub fn validate_field(data: &Value, field: &str, kind: &str) -> Option<String> {
    let value = match data.get(field) {
        None | Some(Value::Null) => return None,
        Some(v) => v,
    };

    let ok = match kind {
        "int" => is_int(value),
        "float" => is_float(value),
        "datetime" => value
            .as_str()
            .is_some_and(|s| parse_datetime(s).is_some()),
        _ => {
            return Some(format!(
                "Unsupported datatype '{kind}' for field '{field}'."
            ));
        }
    };

    if ok {
        None
    } else {
        Some(format!("'{field}' must be a valid {kind}."))
    }
}

fn is_int(value: &Value) -> bool {
    value.is_number() || value.as_str().is_some_and(|s| s.trim().parse::<i64>().is_ok())
}

fn is_float(value: &Value) -> bool {
    value.is_number() || value.as_str().is_some_and(|s| s.trim().parse::<f64>().is_ok())
}

/// Accepts RFC 3339 plus the common unzoned shapes clients actually send.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// Typed accessors used by handlers after validation has passed.

pub fn int_field(data: &Value, field: &str) -> Option<i64> {
    match data.get(field)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn float_field(data: &Value, field: &str) -> Option<f64> {
    match data.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn datetime_field(data: &Value, field: &str) -> Option<NaiveDateTime> {
    parse_datetime(data.get(field)?.as_str()?)
}

pub fn str_field<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field)?.as_str().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_field_is_not_an_error() {
        assert_eq!(validate_field(&json!({}), "x", "int"), None);
        assert_eq!(validate_field(&json!({ "x": null }), "x", "int"), None);
    }

    #[test]
    fn int_accepts_numbers_and_numeric_strings() {
        assert_eq!(validate_field(&json!({ "x": 5 }), "x", "int"), None);
        assert_eq!(validate_field(&json!({ "x": "12" }), "x", "int"), None);
        assert_eq!(
            validate_field(&json!({ "x": "five" }), "x", "int"),
            Some("'x' must be a valid int.".to_string())
        );
    }

    #[test]
    fn float_accepts_numbers_and_numeric_strings() {
        assert_eq!(validate_field(&json!({ "w": 2.5 }), "w", "float"), None);
        assert_eq!(validate_field(&json!({ "w": "2.5" }), "w", "float"), None);
        assert_eq!(
            validate_field(&json!({ "w": "heavy" }), "w", "float"),
            Some("'w' must be a valid float.".to_string())
        );
    }

    #[test]
    fn datetime_accepts_common_shapes() {
        for s in [
            "2025-04-13T10:00:00",
            "2025-04-13 10:00:00",
            "2025-04-13T10:00:00.123",
            "2025-04-13T10:00:00Z",
            "2025-04-13T10:00:00+02:00",
            "2025-04-13",
        ] {
            assert_eq!(validate_field(&json!({ "at": s }), "at", "datetime"), None, "{s}");
        }
        assert!(validate_field(&json!({ "at": "tomorrow" }), "at", "datetime").is_some());
        assert!(validate_field(&json!({ "at": 42 }), "at", "datetime").is_some());
    }

    #[test]
    fn unknown_kind_is_reported() {
        assert_eq!(
            validate_field(&json!({ "x": 1 }), "x", "uuid"),
            Some("Unsupported datatype 'uuid' for field 'x'.".to_string())
        );
    }

    #[test]
    fn typed_accessors_extract_after_validation() {
        let data = json!({ "sets": "3", "weight": 22.5, "when": "2025-04-13 10:00:00" });
        assert_eq!(int_field(&data, "sets"), Some(3));
        assert_eq!(float_field(&data, "weight"), Some(22.5));
        assert!(datetime_field(&data, "when").is_some());
        assert_eq!(int_field(&data, "missing"), None);
    }
}
