#![forbid(unsafe_code)]

//! Caller-supplied field configuration.
//!
//! [`OverrideSpec`] is a tagged union over the three accepted shapes:
//!
//! - [`OverrideSpec::List`]: explicit, ordered entries that replace the
//!   default set entirely.
//! - [`OverrideSpec::Map`]: per-field patches keyed by schema key; schema
//!   order and membership are kept.
//! - [`OverrideSpec::Transform`]: a function from every default field to the
//!   complete replacement list.
//!
//! The shape is picked once at the API boundary; [`crate::merge`] has one
//! merge function per variant.

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::attr::{Attr, FieldProps};
use crate::descriptor::DEFAULT_SIZE;
use crate::field::{AutoField, InternalField, RenderOverride, WidgetType};
use crate::node::RenderNode;
use crate::resolve::ResolvedAttributes;

/// Partial field attributes. Every `Some` replaces the default wholesale.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub widget: Option<WidgetType>,
    pub size: Option<u8>,
    pub label: Option<Attr<String>>,
    pub placeholder: Option<Attr<String>>,
    pub description: Option<Attr<String>>,
    pub disabled: Option<Attr<bool>>,
    pub watch: Option<Vec<String>>,
    pub watch_context: Option<Vec<String>>,
    pub field_props: Option<FieldProps>,
    pub element: Option<RenderNode>,
    pub overrides: Option<RenderOverride>,
}

impl FieldPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn widget(mut self, widget: impl Into<WidgetType>) -> Self {
        self.widget = Some(widget.into());
        self
    }

    #[must_use]
    pub fn size(mut self, size: u8) -> Self {
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn label(mut self, label: impl Into<Attr<String>>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<Attr<String>>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<Attr<String>>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn disabled(mut self, disabled: impl Into<Attr<bool>>) -> Self {
        self.disabled = Some(disabled.into());
        self
    }

    #[must_use]
    pub fn watch<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.watch = Some(names.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn watch_context<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.watch_context = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Add one widget prop. Props accumulate within a patch; the whole bag
    /// still replaces the default bag on merge.
    #[must_use]
    pub fn prop(mut self, key: impl Into<String>, value: impl Into<Attr<Value>>) -> Self {
        self.field_props
            .get_or_insert_with(FieldProps::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn element(mut self, element: impl Into<RenderNode>) -> Self {
        self.element = Some(element.into());
        self
    }

    #[must_use]
    pub fn overrides(
        mut self,
        f: impl Fn(RenderNode, &InternalField, &ResolvedAttributes) -> RenderNode + 'static,
    ) -> Self {
        self.overrides = Some(RenderOverride::new(f));
        self
    }

    /// Shallow merge onto `field`. The field's name is never touched.
    pub fn apply_to(&self, field: &mut InternalField) {
        if let Some(widget) = &self.widget {
            field.widget = widget.clone();
        }
        if let Some(size) = self.size {
            field.size = Some(size);
        }
        if let Some(label) = &self.label {
            field.attrs.label = Some(label.clone());
        }
        if let Some(placeholder) = &self.placeholder {
            field.attrs.placeholder = Some(placeholder.clone());
        }
        if let Some(description) = &self.description {
            field.attrs.description = Some(description.clone());
        }
        if let Some(disabled) = &self.disabled {
            field.attrs.disabled = Some(disabled.clone());
        }
        if let Some(watch) = &self.watch {
            field.watch = watch.clone();
        }
        if let Some(keys) = &self.watch_context {
            field.watch_context = keys.clone();
        }
        if let Some(props) = &self.field_props {
            field.attrs.field_props = props.clone();
        }
        if let Some(element) = &self.element {
            field.element = Some(element.clone());
        }
        if let Some(overrides) = &self.overrides {
            field.overrides = Some(overrides.clone());
        }
    }
}

/// A named field entry of a list or transform result.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub patch: FieldPatch,
}

impl FieldSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            patch: FieldPatch::default(),
        }
    }

    fn with(mut self, f: impl FnOnce(FieldPatch) -> FieldPatch) -> Self {
        self.patch = f(self.patch);
        self
    }

    #[must_use]
    pub fn widget(self, widget: impl Into<WidgetType>) -> Self {
        self.with(|p| p.widget(widget))
    }

    #[must_use]
    pub fn size(self, size: u8) -> Self {
        self.with(|p| p.size(size))
    }

    #[must_use]
    pub fn label(self, label: impl Into<Attr<String>>) -> Self {
        self.with(|p| p.label(label))
    }

    #[must_use]
    pub fn placeholder(self, placeholder: impl Into<Attr<String>>) -> Self {
        self.with(|p| p.placeholder(placeholder))
    }

    #[must_use]
    pub fn description(self, description: impl Into<Attr<String>>) -> Self {
        self.with(|p| p.description(description))
    }

    #[must_use]
    pub fn disabled(self, disabled: impl Into<Attr<bool>>) -> Self {
        self.with(|p| p.disabled(disabled))
    }

    #[must_use]
    pub fn watch<S: Into<String>>(self, names: impl IntoIterator<Item = S>) -> Self {
        self.with(|p| p.watch(names))
    }

    #[must_use]
    pub fn watch_context<S: Into<String>>(self, keys: impl IntoIterator<Item = S>) -> Self {
        self.with(|p| p.watch_context(keys))
    }

    #[must_use]
    pub fn prop(self, key: impl Into<String>, value: impl Into<Attr<Value>>) -> Self {
        self.with(|p| p.prop(key, value))
    }

    #[must_use]
    pub fn element(self, element: impl Into<RenderNode>) -> Self {
        self.with(|p| p.element(element))
    }

    #[must_use]
    pub fn overrides(
        self,
        f: impl Fn(RenderNode, &InternalField, &ResolvedAttributes) -> RenderNode + 'static,
    ) -> Self {
        self.with(|p| p.overrides(f))
    }
}

impl From<AutoField> for FieldSpec {
    /// Keeps the default label and widget. A size left at the default stays
    /// unset, so the field spans whatever width the grid has.
    fn from(auto: AutoField) -> Self {
        let spec = Self::new(auto.name).label(auto.label).widget(auto.widget);
        if auto.size == DEFAULT_SIZE {
            spec
        } else {
            spec.size(auto.size)
        }
    }
}

/// One entry of a list-form override or a transform result.
#[derive(Debug, Clone)]
pub enum FieldConfig {
    Field(FieldSpec),
    /// Blank cell of `size` columns; without a size, a row break.
    Spacer { size: Option<u8> },
}

impl FieldConfig {
    #[must_use]
    pub fn row_break() -> Self {
        Self::Spacer { size: None }
    }

    #[must_use]
    pub fn spacer(size: u8) -> Self {
        Self::Spacer { size: Some(size) }
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Field(spec) => Some(&spec.name),
            Self::Spacer { .. } => None,
        }
    }
}

impl From<FieldSpec> for FieldConfig {
    fn from(spec: FieldSpec) -> Self {
        Self::Field(spec)
    }
}

impl From<AutoField> for FieldConfig {
    fn from(auto: AutoField) -> Self {
        Self::Field(auto.into())
    }
}

/// Map-form transform for one field.
pub type PatchFn = Rc<dyn Fn(&AutoField) -> Option<FieldPatch>>;

/// Whole-set transform.
pub type TransformFn = Rc<dyn Fn(Vec<AutoField>) -> Vec<FieldConfig>>;

/// A map-form value: a static patch, or a function of the default field.
#[derive(Clone)]
pub enum MapEntry {
    Patch(FieldPatch),
    Transform(PatchFn),
}

impl MapEntry {
    /// The patch to apply to `auto`, if any. `None` leaves the field unchanged.
    #[must_use]
    pub fn patch_for(&self, auto: &AutoField) -> Option<FieldPatch> {
        match self {
            Self::Patch(patch) => Some(patch.clone()),
            Self::Transform(f) => f(auto),
        }
    }
}

impl fmt::Debug for MapEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Patch(patch) => f.debug_tuple("Patch").field(patch).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

/// Map-form overrides keyed by schema key.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    entries: FxHashMap<String, MapEntry>,
}

impl FieldMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Static patch for `key`. A later call for the same key replaces it.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, patch: FieldPatch) -> Self {
        self.entries.insert(key.into(), MapEntry::Patch(patch));
        self
    }

    /// Computed patch for `key`.
    #[must_use]
    pub fn transform(
        mut self,
        key: impl Into<String>,
        f: impl Fn(&AutoField) -> Option<FieldPatch> + 'static,
    ) -> Self {
        self.entries
            .insert(key.into(), MapEntry::Transform(Rc::new(f)));
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MapEntry> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Caller override, one of three shapes.
#[derive(Clone)]
pub enum OverrideSpec {
    List(Vec<FieldConfig>),
    Map(FieldMap),
    Transform(TransformFn),
}

impl OverrideSpec {
    #[must_use]
    pub fn list(entries: impl IntoIterator<Item = FieldConfig>) -> Self {
        Self::List(entries.into_iter().collect())
    }

    #[must_use]
    pub fn map(map: FieldMap) -> Self {
        Self::Map(map)
    }

    pub fn transform(f: impl Fn(Vec<AutoField>) -> Vec<FieldConfig> + 'static) -> Self {
        Self::Transform(Rc::new(f))
    }

    /// Shape name used in diagnostics.
    #[must_use]
    pub fn shape(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Transform(_) => "transform",
        }
    }
}

impl fmt::Debug for OverrideSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List(entries) => f.debug_tuple("List").field(entries).finish(),
            Self::Map(map) => f.debug_tuple("Map").field(map).finish(),
            Self::Transform(_) => f.write_str("Transform(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ResolveArgs;
    use serde_json::json;

    #[test]
    fn patch_is_shallow_and_keeps_name() {
        let mut field = InternalField::detached("email");
        field.attrs.label = Some("Email".into());
        field.size = Some(12);

        FieldPatch::new()
            .size(6)
            .placeholder("you@example.com")
            .prop("autocomplete", json!("email"))
            .apply_to(&mut field);

        assert_eq!(field.name, "email");
        assert_eq!(field.size, Some(6));
        assert_eq!(
            field.attrs.label.as_ref().and_then(Attr::as_literal).map(String::as_str),
            Some("Email")
        );
        assert!(field.attrs.field_props.contains_key("autocomplete"));
    }

    #[test]
    fn spec_builders_forward_to_patch() {
        let spec = FieldSpec::new("fullName")
            .size(12)
            .watch(["firstName", "lastName"])
            .disabled(Attr::computed(|a: &ResolveArgs<'_>| a.str("firstName").is_empty()));
        assert_eq!(spec.patch.size, Some(12));
        assert_eq!(
            spec.patch.watch.as_deref(),
            Some(&["firstName".to_string(), "lastName".to_string()][..])
        );
        assert!(spec.patch.disabled.as_ref().is_some_and(Attr::is_computed));
    }

    #[test]
    fn auto_field_converts_with_defaults() {
        let auto = AutoField {
            name: "age".into(),
            label: "Age".into(),
            widget: WidgetType::number(),
            size: 12,
        };
        let config = FieldConfig::from(auto);
        assert_eq!(config.name(), Some("age"));
        let FieldConfig::Field(spec) = config else {
            panic!("expected a field entry");
        };
        assert_eq!(spec.patch.widget, Some(WidgetType::number()));
    }

    #[test]
    fn map_entries_and_shapes() {
        let map = FieldMap::new()
            .set("a", FieldPatch::new().size(4))
            .transform("b", |auto| (auto.name == "b").then(|| FieldPatch::new().size(3)));
        assert_eq!(map.len(), 2);
        let auto_b = AutoField {
            name: "b".into(),
            label: "B".into(),
            widget: WidgetType::text(),
            size: 12,
        };
        assert_eq!(
            map.get("b").and_then(|e| e.patch_for(&auto_b)).and_then(|p| p.size),
            Some(3)
        );
        assert_eq!(OverrideSpec::map(map).shape(), "map");
        assert_eq!(OverrideSpec::list([FieldConfig::row_break()]).shape(), "list");
        assert_eq!(OverrideSpec::transform(|f| f.into_iter().map(Into::into).collect()).shape(), "transform");
    }
}
