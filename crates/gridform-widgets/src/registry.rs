//! Widget lookup by tag.

use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use gridform_core::WidgetType;

use crate::Widget;
use crate::builtins::{Checkbox, NumberInput, Radio, Select, TextArea, TextInput};

/// Widgets keyed by [`WidgetType`] tag.
///
/// Registering a tag that already exists replaces it, so callers can
/// restyle a built-in without touching field configuration.
#[derive(Clone, Default)]
pub struct WidgetRegistry {
    widgets: AHashMap<String, Rc<dyn Widget>>,
}

impl WidgetRegistry {
    /// An empty registry; every field renders without a control.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `text`, `number`, `checkbox`, `select`, `radio`, `textarea`.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(WidgetType::text(), TextInput);
        registry.register(WidgetType::number(), NumberInput);
        registry.register(WidgetType::checkbox(), Checkbox);
        registry.register(WidgetType::select(), Select);
        registry.register(WidgetType::radio(), Radio);
        registry.register(WidgetType::textarea(), TextArea);
        registry
    }

    pub fn register(&mut self, tag: impl Into<WidgetType>, widget: impl Widget + 'static) {
        self.widgets
            .insert(tag.into().as_str().to_string(), Rc::new(widget));
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, tag: impl Into<WidgetType>, widget: impl Widget + 'static) -> Self {
        self.register(tag, widget);
        self
    }

    #[must_use]
    pub fn get(&self, widget: &WidgetType) -> Option<Rc<dyn Widget>> {
        self.widgets.get(widget.as_str()).cloned()
    }

    #[must_use]
    pub fn contains(&self, widget: &WidgetType) -> bool {
        self.widgets.contains_key(widget.as_str())
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.widgets.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl fmt::Debug for WidgetRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FieldView;
    use gridform_core::{Element, InternalField, RenderNode, ResolvedAttributes};
    use serde_json::Value;

    #[test]
    fn builtins_are_registered() {
        let registry = WidgetRegistry::with_builtins();
        assert_eq!(
            registry.tags(),
            ["checkbox", "number", "radio", "select", "text", "textarea"]
        );
        for tag in WidgetType::BUILTIN {
            assert!(registry.contains(&WidgetType::from(tag)));
        }
        assert!(registry.get(&WidgetType::from("rating")).is_none());
        assert!(registry.get(&WidgetType::hidden()).is_none());
    }

    fn fancy(view: &FieldView<'_>) -> RenderNode {
        Element::new("fancy-input").attr("name", view.name()).into()
    }

    #[test]
    fn register_replaces_builtin() {
        let registry = WidgetRegistry::with_builtins().with(WidgetType::text(), fancy);
        let field = InternalField::detached("x");
        let attrs = ResolvedAttributes::default();
        let node = registry
            .get(&WidgetType::text())
            .expect("text widget")
            .render(&FieldView::new(&field, &Value::Null, &attrs, &[]));
        assert_eq!(node.as_element().map(|e| e.tag.as_str()), Some("fancy-input"));
    }
}
