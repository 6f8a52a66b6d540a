#![forbid(unsafe_code)]

//! Literal-or-computed attribute values.
//!
//! An [`Attr<T>`] is a closed sum: a literal, or a function of the watched
//! field values and watched context. Dependencies are never inferred from
//! the closure; they are whatever the field lists in `watch` and
//! `watch_context`.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::value::ResolveArgs;

/// Shared computation behind [`Attr::Computed`].
pub type ComputeFn<T> = Rc<dyn Fn(&ResolveArgs<'_>) -> T>;

pub enum Attr<T> {
    Literal(T),
    Computed(ComputeFn<T>),
}

impl<T> Attr<T> {
    /// Wrap a closure as a computed attribute.
    pub fn computed(f: impl Fn(&ResolveArgs<'_>) -> T + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    #[must_use]
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&T> {
        match self {
            Self::Literal(v) => Some(v),
            Self::Computed(_) => None,
        }
    }
}

impl<T: Clone> Attr<T> {
    /// Concrete value for one input pair.
    #[must_use]
    pub fn resolve(&self, args: &ResolveArgs<'_>) -> T {
        match self {
            Self::Literal(v) => v.clone(),
            Self::Computed(f) => f(args),
        }
    }
}

impl<T: Clone> Clone for Attr<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(v) => Self::Literal(v.clone()),
            Self::Computed(f) => Self::Computed(Rc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Attr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for Attr<String> {
    fn from(v: &str) -> Self {
        Self::Literal(v.to_string())
    }
}

impl From<String> for Attr<String> {
    fn from(v: String) -> Self {
        Self::Literal(v)
    }
}

impl From<bool> for Attr<bool> {
    fn from(v: bool) -> Self {
        Self::Literal(v)
    }
}

impl From<Value> for Attr<Value> {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

/// Free-form props forwarded to the widget, each literal or computed.
pub type FieldProps = BTreeMap<String, Attr<Value>>;

/// The resolvable presentation attributes of one field.
#[derive(Debug, Clone, Default)]
pub struct FieldAttrs {
    pub label: Option<Attr<String>>,
    pub placeholder: Option<Attr<String>>,
    pub description: Option<Attr<String>>,
    pub disabled: Option<Attr<bool>>,
    pub field_props: FieldProps,
}

impl FieldAttrs {
    #[must_use]
    pub fn with_label(label: impl Into<Attr<String>>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValues;
    use serde_json::json;

    #[test]
    fn literal_and_computed_resolve() {
        let mut values = FieldValues::new();
        values.insert("name".into(), json!("Ada"));
        let args = ResolveArgs::new(&values, None);

        let lit: Attr<String> = "Hello".into();
        assert_eq!(lit.resolve(&args), "Hello");
        assert!(!lit.is_computed());

        let comp = Attr::computed(|a: &ResolveArgs<'_>| format!("Hi {}", a.str("name")));
        assert_eq!(comp.resolve(&args), "Hi Ada");
        assert!(comp.as_literal().is_none());
    }

    #[test]
    fn clone_shares_the_closure() {
        let comp: Attr<bool> = Attr::computed(|a: &ResolveArgs<'_>| a.flag("x"));
        let copy = comp.clone();
        match (&comp, &copy) {
            (Attr::Computed(a), Attr::Computed(b)) => assert!(Rc::ptr_eq(a, b)),
            _ => panic!("expected computed attrs"),
        }
        assert_eq!(format!("{copy:?}"), "Computed(..)");
    }
}
