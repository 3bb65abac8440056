//! Tagged coercion of loosely-typed configuration values.
//!
//! Configuration arrives as arbitrary JSON. Every helper here maps a value to
//! the requested shape or to a documented fallback; none of them fail. Values
//! with the wrong type are reported at `debug` level as
//! [`FakeListError::MalformedConfigValue`] and then ignored.

use crate::error::FakeListError;
use serde_json::Value;
use tracing::debug;

fn report_malformed(key: &str, expected: &'static str) {
    let err = FakeListError::MalformedConfigValue {
        key: key.to_string(),
        expected,
    };
    debug!("{err}; using default");
}

/// Render a scalar as text without trimming. Lists, maps and null yield `None`.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Trimmed text for `key`, or an empty string when absent or not a scalar.
pub fn value_as_string(value: Option<&Value>, key: &str) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(other) => match scalar_text(other) {
            Some(text) => text.trim().to_string(),
            None => {
                report_malformed(key, "string");
                String::new()
            }
        },
    }
}

/// Untrimmed text for `key`, falling back to `fallback` when absent or malformed.
///
/// Templates keep their leading whitespace, so this variant does not trim.
pub fn value_as_template(value: Option<&Value>, key: &str, fallback: &str) -> String {
    match value {
        None | Some(Value::Null) => fallback.to_string(),
        Some(other) => scalar_text(other).unwrap_or_else(|| {
            report_malformed(key, "string");
            fallback.to_string()
        }),
    }
}

/// Boolean or boolean-looking string; anything else yields `fallback`.
///
/// Used for top-level switches, where an unreadable value keeps the default.
pub fn value_as_bool(value: Option<&Value>, key: &str, fallback: bool) -> bool {
    match value {
        None | Some(Value::Null) => fallback,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                true
            } else if text.eq_ignore_ascii_case("false") {
                false
            } else {
                report_malformed(key, "boolean");
                fallback
            }
        }
        Some(_) => {
            report_malformed(key, "boolean");
            fallback
        }
    }
}

/// Strict per-entry flag: only a boolean or the text `true` (any case) is set.
///
/// Absent or null values yield `fallback`; every other value, including
/// numbers, lists and strings such as `"no"` or `"off"`, is `false`.
pub fn value_as_flag(value: Option<&Value>, key: &str, fallback: bool) -> bool {
    match value {
        None | Some(Value::Null) => fallback,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
        Some(_) => {
            report_malformed(key, "boolean");
            false
        }
    }
}

/// Trimmed, non-empty scalar entries of a list. Non-list values yield an empty list.
pub fn value_as_string_list(value: Option<&Value>, key: &str) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(scalar_text)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect(),
        Some(_) => {
            report_malformed(key, "list");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_trimmed_and_scalars_stringified() {
        assert_eq!(value_as_string(Some(&json!("  Alpha ")), "name"), "Alpha");
        assert_eq!(value_as_string(Some(&json!(42)), "name"), "42");
        assert_eq!(value_as_string(Some(&json!(true)), "name"), "true");
        assert_eq!(value_as_string(Some(&json!(["x"])), "name"), "");
        assert_eq!(value_as_string(None, "name"), "");
    }

    #[test]
    fn booleans_accept_strings_and_fall_back() {
        assert!(!value_as_bool(Some(&json!(false)), "enabled", true));
        assert!(!value_as_bool(Some(&json!("FALSE")), "enabled", true));
        assert!(value_as_bool(Some(&json!(" true ")), "enabled", false));
        assert!(value_as_bool(Some(&json!("maybe")), "enabled", true));
        assert!(value_as_bool(Some(&json!(0)), "enabled", true));
        assert!(!value_as_bool(None, "enabled", false));
    }

    #[test]
    fn entry_flags_are_set_only_by_true() {
        assert!(value_as_flag(None, "enabled", true));
        assert!(value_as_flag(Some(&Value::Null), "enabled", true));
        assert!(value_as_flag(Some(&json!(true)), "enabled", false));
        assert!(value_as_flag(Some(&json!("TRUE")), "enabled", false));
        for raw in [json!("no"), json!("off"), json!(0), json!(1), json!(" true "), json!([])] {
            assert!(!value_as_flag(Some(&raw), "enabled", true), "{raw} should be unset");
        }
    }

    #[test]
    fn lists_drop_blank_and_structured_entries() {
        let raw = json!([" Notch ", "", null, 7, {"nested": true}, "jeb_"]);
        assert_eq!(
            value_as_string_list(Some(&raw), "authors"),
            vec!["Notch".to_string(), "7".to_string(), "jeb_".to_string()]
        );
        assert!(value_as_string_list(Some(&json!("Notch")), "authors").is_empty());
    }

    #[test]
    fn templates_keep_whitespace() {
        assert_eq!(
            value_as_template(Some(&json!("  &aHi ")), "server_header", "x"),
            "  &aHi "
        );
        assert_eq!(value_as_template(Some(&json!({})), "server_header", "x"), "x");
        assert_eq!(value_as_template(None, "server_header", "x"), "x");
    }
}
