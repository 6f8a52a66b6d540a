#![forbid(unsafe_code)]

//! Value maps handed to computed attributes.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::field::WidgetType;

/// Live values of the fields a field watches, keyed by watch name.
pub type FieldValues = BTreeMap<String, Value>;

/// The slice of external context a field opted into, keyed by context key.
pub type ContextMap = BTreeMap<String, Value>;

/// Arguments passed to every computed attribute.
///
/// `field_values` holds only the watched fields. `context` is `None` unless
/// the field declared at least one `watch_context` key.
#[derive(Debug, Clone, Copy)]
pub struct ResolveArgs<'a> {
    pub field_values: &'a FieldValues,
    pub context: Option<&'a ContextMap>,
}

impl<'a> ResolveArgs<'a> {
    #[must_use]
    pub fn new(field_values: &'a FieldValues, context: Option<&'a ContextMap>) -> Self {
        Self {
            field_values,
            context,
        }
    }

    /// Raw watched value, if present.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&'a Value> {
        self.field_values.get(name)
    }

    /// Watched value as a string slice; missing or non-string values read as `""`.
    #[must_use]
    pub fn str(&self, name: &str) -> &'a str {
        self.field_values
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Watched value as a number. Numeric strings are parsed, since text
    /// inputs commonly hold them.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.field_values.get(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Watched value as a bool; anything else reads as `false`.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.field_values
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Context entry, if the field watches that key and the form has it.
    #[must_use]
    pub fn context_value(&self, key: &str) -> Option<&'a Value> {
        self.context.and_then(|ctx| ctx.get(key))
    }
}

/// Seed value for a freshly appended array item field.
#[must_use]
pub fn default_for_widget(widget: &WidgetType) -> Value {
    match widget.as_str() {
        WidgetType::CHECKBOX_TAG => Value::Bool(false),
        WidgetType::NUMBER_TAG => Value::Null,
        _ => Value::String(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values() -> FieldValues {
        let mut v = FieldValues::new();
        v.insert("first".into(), json!("Ada"));
        v.insert("qty".into(), json!(5));
        v.insert("price".into(), json!("2.5"));
        v.insert("agree".into(), json!(true));
        v
    }

    #[test]
    fn typed_accessors() {
        let v = values();
        let args = ResolveArgs::new(&v, None);
        assert_eq!(args.str("first"), "Ada");
        assert_eq!(args.str("missing"), "");
        assert_eq!(args.number("qty"), Some(5.0));
        assert_eq!(args.number("price"), Some(2.5));
        assert_eq!(args.number("first"), None);
        assert!(args.flag("agree"));
        assert!(!args.flag("first"));
    }

    #[test]
    fn context_lookup_requires_slice() {
        let v = FieldValues::new();
        let mut ctx = ContextMap::new();
        ctx.insert("currency".into(), json!("EUR"));

        assert!(ResolveArgs::new(&v, None).context_value("currency").is_none());
        assert_eq!(
            ResolveArgs::new(&v, Some(&ctx)).context_value("currency"),
            Some(&json!("EUR"))
        );
    }

    #[test]
    fn widget_defaults() {
        assert_eq!(default_for_widget(&WidgetType::text()), json!(""));
        assert_eq!(default_for_widget(&WidgetType::textarea()), json!(""));
        assert_eq!(default_for_widget(&WidgetType::checkbox()), json!(false));
        assert_eq!(default_for_widget(&WidgetType::number()), Value::Null);
    }
}
