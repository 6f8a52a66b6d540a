//! Submit-time validation.
//!
//! Messages are produced by the caller's validators and shown as-is; this
//! module only collects them per path.

use serde::Serialize;
use serde_json::Value;

use gridform_core::path;

/// One validation message for one field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validates the whole value object on submit.
pub trait Validator {
    fn validate(&self, values: &Value) -> Vec<FieldError>;
}

impl<F> Validator for F
where
    F: Fn(&Value) -> Vec<FieldError>,
{
    fn validate(&self, values: &Value) -> Vec<FieldError> {
        self(values)
    }
}

/// Rejects missing, `null`, empty-string and empty-array values.
#[derive(Debug, Clone)]
pub struct Required {
    paths: Vec<String>,
    message: String,
}

impl Required {
    #[must_use]
    pub fn new<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            message: "Required".to_string(),
        }
    }

    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Validator for Required {
    fn validate(&self, values: &Value) -> Vec<FieldError> {
        self.paths
            .iter()
            .filter(|p| is_blank(path::get(values, p)))
            .map(|p| FieldError::new(p.as_str(), self.message.as_str()))
            .collect()
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_flags_blank_values() {
        let values = json!({"a": "", "b": "x", "c": null, "d": [], "e": false, "f": 0});
        let errors = Required::new(["a", "b", "c", "d", "e", "f", "g"]).validate(&values);
        let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a", "c", "d", "g"]);
    }

    #[test]
    fn closures_are_validators() {
        let positive = |values: &Value| -> Vec<FieldError> {
            match values.get("qty").and_then(Value::as_f64) {
                Some(q) if q > 0.0 => Vec::new(),
                _ => vec![FieldError::new("qty", "must be positive")],
            }
        };
        assert!(positive.validate(&json!({"qty": 2})).is_empty());
        assert_eq!(positive.validate(&json!({"qty": 0}))[0].message, "must be positive");
    }
}
