#![forbid(unsafe_code)]

//! Field descriptors: the default [`AutoField`] and the canonical [`InternalField`].

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::attr::{Attr, FieldAttrs};
use crate::node::RenderNode;
use crate::resolve::ResolvedAttributes;
use crate::schema::{PrimitiveType, SchemaField};

/// Widget tag used to look a control up in the widget registry.
///
/// The built-in tags have constructors; any other string is a caller-defined
/// widget and resolves only if the caller registered it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetType(Cow<'static, str>);

impl WidgetType {
    pub const TEXT_TAG: &'static str = "text";
    pub const NUMBER_TAG: &'static str = "number";
    pub const CHECKBOX_TAG: &'static str = "checkbox";
    pub const SELECT_TAG: &'static str = "select";
    pub const RADIO_TAG: &'static str = "radio";
    pub const TEXTAREA_TAG: &'static str = "textarea";
    /// Placeholders and other cells that never render a control.
    pub const HIDDEN_TAG: &'static str = "hidden";

    /// Built-in tags, in registry order.
    pub const BUILTIN: [&'static str; 6] = [
        Self::TEXT_TAG,
        Self::NUMBER_TAG,
        Self::CHECKBOX_TAG,
        Self::SELECT_TAG,
        Self::RADIO_TAG,
        Self::TEXTAREA_TAG,
    ];

    #[must_use]
    pub fn new(tag: impl Into<Cow<'static, str>>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub const fn text() -> Self {
        Self(Cow::Borrowed(Self::TEXT_TAG))
    }

    #[must_use]
    pub const fn number() -> Self {
        Self(Cow::Borrowed(Self::NUMBER_TAG))
    }

    #[must_use]
    pub const fn checkbox() -> Self {
        Self(Cow::Borrowed(Self::CHECKBOX_TAG))
    }

    #[must_use]
    pub const fn select() -> Self {
        Self(Cow::Borrowed(Self::SELECT_TAG))
    }

    #[must_use]
    pub const fn radio() -> Self {
        Self(Cow::Borrowed(Self::RADIO_TAG))
    }

    #[must_use]
    pub const fn textarea() -> Self {
        Self(Cow::Borrowed(Self::TEXTAREA_TAG))
    }

    #[must_use]
    pub const fn hidden() -> Self {
        Self(Cow::Borrowed(Self::HIDDEN_TAG))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.as_str() == Self::HIDDEN_TAG
    }

    /// Widgets that pick from a list of options.
    #[must_use]
    pub fn is_choice(&self) -> bool {
        matches!(self.as_str(), Self::SELECT_TAG | Self::RADIO_TAG)
    }
}

impl Default for WidgetType {
    fn default() -> Self {
        Self::text()
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&'static str> for WidgetType {
    fn from(tag: &'static str) -> Self {
        Self(Cow::Borrowed(tag))
    }
}

impl From<String> for WidgetType {
    fn from(tag: String) -> Self {
        Self(Cow::Owned(tag))
    }
}

/// Default descriptor derived from one schema field, before any override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoField {
    pub name: String,
    pub label: String,
    pub widget: WidgetType,
    pub size: u8,
}

/// Whether a field binds a single value or a list of item groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    #[default]
    Value,
    Array,
}

/// What a descriptor stands for in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    /// A user-addressable field.
    #[default]
    Field,
    /// Caller-supplied spacer. Without a size it forces a row break.
    Spacer,
    /// Synthetic padding inserted by the grid packer.
    Placeholder,
}

/// Post-render wrapper: receives the rendered field and its resolved
/// attributes, returns the node to show instead.
#[derive(Clone)]
pub struct RenderOverride(
    Rc<dyn Fn(RenderNode, &InternalField, &ResolvedAttributes) -> RenderNode>,
);

impl RenderOverride {
    pub fn new(
        f: impl Fn(RenderNode, &InternalField, &ResolvedAttributes) -> RenderNode + 'static,
    ) -> Self {
        Self(Rc::new(f))
    }

    #[must_use]
    pub fn apply(
        &self,
        rendered: RenderNode,
        field: &InternalField,
        attributes: &ResolvedAttributes,
    ) -> RenderNode {
        (self.0)(rendered, field, attributes)
    }
}

impl fmt::Debug for RenderOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenderOverride(..)")
    }
}

/// Canonical, fully merged field descriptor used for layout and rendering.
///
/// # Invariants
///
/// 1. `name` is unique within one render pass for `role == Field`.
/// 2. Spacers and placeholders carry a process-unique synthetic name and are
///    never user-addressable.
/// 3. `mode == Array` implies `nested` holds the item fields (possibly empty).
#[derive(Debug, Clone, Default)]
pub struct InternalField {
    pub name: String,
    pub role: FieldRole,
    pub widget: WidgetType,
    pub mode: FieldMode,
    /// Nested schema for array and object fields.
    pub nested: Vec<SchemaField>,
    /// Grid span; `None` means full width.
    pub size: Option<u8>,
    /// Sibling fields whose live values computed attributes read.
    pub watch: Vec<String>,
    /// External context keys computed attributes read.
    pub watch_context: Vec<String>,
    /// Parent array for `parent.child` names declared in list form.
    pub array_path: Option<String>,
    pub attrs: FieldAttrs,
    /// Full replacement for the rendered control.
    pub element: Option<RenderNode>,
    pub overrides: Option<RenderOverride>,
    /// Per-item templates for array fields declared through `parent.child` entries.
    pub item_fields: Vec<InternalField>,
}

static NEXT_SYNTHETIC: AtomicU64 = AtomicU64::new(1);

/// A process-unique name for a synthetic cell.
#[must_use]
pub fn synthetic_name(prefix: &str) -> String {
    let id = NEXT_SYNTHETIC.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}_{id}")
}

impl InternalField {
    /// A field with no schema binding: value mode, text widget, no label.
    #[must_use]
    pub fn detached(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Default descriptor for a schema field. The size stays unset: one full
    /// row at any grid width.
    #[must_use]
    pub fn from_schema(field: &SchemaField) -> Self {
        let mut out = Self::detached(field.key.clone());
        out.attrs.label = Some(Attr::Literal(crate::descriptor::camel_to_label(
            &field.key,
        )));
        out.widget = crate::descriptor::widget_for(field.primitive_type);
        out.bind_schema(field);
        out
    }

    /// Copy mode and nested schema from the schema field this one refers to.
    pub fn bind_schema(&mut self, field: &SchemaField) {
        self.mode = if field.primitive_type == PrimitiveType::Array {
            FieldMode::Array
        } else {
            FieldMode::Value
        };
        self.nested = field.nested_fields().to_vec();
    }

    /// Caller spacer. `None` size marks a row break.
    #[must_use]
    pub fn spacer(size: Option<u8>) -> Self {
        Self {
            name: synthetic_name("spacer"),
            role: FieldRole::Spacer,
            widget: WidgetType::hidden(),
            size,
            attrs: FieldAttrs::with_label(""),
            ..Self::default()
        }
    }

    /// Packer padding cell of `size` columns.
    #[must_use]
    pub fn placeholder(size: u8) -> Self {
        Self {
            name: synthetic_name("placeholder"),
            role: FieldRole::Placeholder,
            widget: WidgetType::hidden(),
            size: Some(size),
            attrs: FieldAttrs::with_label(""),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_row_break(&self) -> bool {
        self.role == FieldRole::Spacer && self.size.is_none()
    }

    /// Whether this cell renders anything at all.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.role == FieldRole::Field && !self.widget.is_hidden()
    }

    /// Projection handed to map-form transforms.
    #[must_use]
    pub fn auto_projection(&self) -> AutoField {
        AutoField {
            name: self.name.clone(),
            label: self
                .attrs
                .label
                .as_ref()
                .and_then(Attr::as_literal)
                .cloned()
                .unwrap_or_default(),
            widget: self.widget.clone(),
            size: self.size.unwrap_or(crate::descriptor::DEFAULT_SIZE),
        }
    }

    /// The `child` part of a `parent.child` item template name.
    #[must_use]
    pub fn item_key(&self) -> Option<&str> {
        let parent = self.array_path.as_deref()?;
        self.name
            .strip_prefix(parent)
            .and_then(|rest| rest.strip_prefix('.'))
    }
}
