use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const MISSING: &str = "missing";
pub const UNKNOWN: &str = "unknown";
pub const UNEXPECTED_SEQUENCE: &str = "unexpected sequence";
pub const UNEXPECTED_VALUE_IN_MAP: &str = "unexpected value in a map";

/// One schema violation found in a data document.
///
/// Which optional fields are populated depends on `code`: predicate failures
/// carry `actual`/`expected`, type mismatches carry `value`, structural
/// failures carry neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    pub code: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Failure {
    /// A bare failure with only a code and a path.
    pub fn new(code: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            path: path.into(),
            actual: None,
            expected: None,
            value: None,
        }
    }

    pub fn with_actual(mut self, actual: impl Into<Value>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    pub fn with_expected(mut self, expected: impl Into<Value>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// A required tag is absent.
    pub fn missing(path: impl Into<String>) -> Self {
        Self::new(MISSING, path)
    }

    /// A tag is present that the schema does not declare.
    pub fn unknown(path: impl Into<String>) -> Self {
        Self::new(UNKNOWN, path)
    }

    /// A tag repeats although its rule is not repeatable.
    pub fn unexpected_sequence(path: impl Into<String>) -> Self {
        Self::new(UNEXPECTED_SEQUENCE, path)
    }

    /// A bare value was given where nested structure is expected.
    pub fn unexpected_value_in_map(path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(UNEXPECTED_VALUE_IN_MAP, path).with_value(value)
    }

    /// The value does not parse as the declared type.
    pub fn not_a(type_name: &str, path: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(format!("not a {type_name}"), path).with_value(value)
    }

    /// A predicate rejected the value.
    pub fn predicate(
        code: &str,
        path: impl Into<String>,
        actual: impl Into<Value>,
        expected: impl Into<Value>,
    ) -> Self {
        Self::new(code, path)
            .with_actual(actual)
            .with_expected(expected)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.code, self.path)?;
        match (&self.actual, &self.expected, &self.value) {
            (Some(actual), Some(expected), _) => {
                write!(f, " (actual {actual}, expected {expected})")
            }
            (_, _, Some(value)) => write!(f, " (value {value:?})"),
            _ => Ok(()),
        }
    }
}

/// JSON number for a parsed value; integral values stay integers.
pub fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        Value::from(value as i64)
    } else {
        Value::from(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_fields_are_not_serialized() {
        let json = serde_json::to_value(Failure::missing("root.a")).unwrap();
        assert_eq!(json, json!({ "code": "missing", "path": "root.a" }));
    }

    #[test]
    fn predicate_failure_carries_actual_and_expected() {
        let failure = Failure::predicate("length", "root.b", "kumar", 4);
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(
            json,
            json!({ "code": "length", "path": "root.b", "actual": "kumar", "expected": 4 })
        );
    }

    #[test]
    fn type_mismatch_names_the_type() {
        let failure = Failure::not_a("integer", "root.c", "3.2");
        assert_eq!(failure.code, "not a integer");
        assert_eq!(failure.value.as_deref(), Some("3.2"));
        assert!(failure.actual.is_none());
    }

    #[test]
    fn numbers_keep_integers_integral() {
        assert_eq!(number(3.0), json!(3));
        assert_eq!(number(-4.0), json!(-4));
        assert_eq!(number(3.2), json!(3.2));
    }

    #[test]
    fn display_is_readable() {
        assert_eq!(Failure::unknown("root.x").to_string(), "unknown at root.x");
        assert_eq!(
            Failure::predicate("min", "root.a", number(0.0), number(3.0)).to_string(),
            "min at root.a (actual 0, expected 3)"
        );
        assert_eq!(
            Failure::not_a("date", "root.d", "yes").to_string(),
            "not a date at root.d (value \"yes\")"
        );
    }

    #[test]
    fn round_trips_through_json() {
        let failure = Failure::new("custom", "root.f[2]").with_value("x");
        let text = serde_json::to_string(&failure).unwrap();
        let back: Failure = serde_json::from_str(&text).unwrap();
        assert_eq!(back, failure);
    }
}
