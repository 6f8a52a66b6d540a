#![forbid(unsafe_code)]

//! Widgets: the controls a field renders with.
//!
//! A [`Widget`] maps one [`FieldView`] (field descriptor, current value,
//! resolved attributes, validation messages) to a [`RenderNode`]. The
//! [`WidgetRegistry`] looks widgets up by the field's widget tag;
//! [`render_field`] wraps the control with label, description and errors
//! and applies the field's post-render override.

pub mod builtins;
pub mod registry;
pub mod render;

pub use builtins::{Checkbox, NumberInput, Radio, Select, TextArea, TextInput};
pub use registry::WidgetRegistry;
pub use render::render_field;

use gridform_core::{InternalField, RenderNode, ResolvedAttributes};
use serde_json::Value;

/// Everything a widget may read about the field it renders.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    pub field: &'a InternalField,
    pub value: &'a Value,
    pub attributes: &'a ResolvedAttributes,
    pub errors: &'a [String],
}

impl<'a> FieldView<'a> {
    #[must_use]
    pub fn new(
        field: &'a InternalField,
        value: &'a Value,
        attributes: &'a ResolvedAttributes,
        errors: &'a [String],
    ) -> Self {
        Self {
            field,
            value,
            attributes,
            errors,
        }
    }

    /// Store path of the field.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.field.name
    }

    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&'a Value> {
        self.attributes.field_props.get(key)
    }
}

/// A renderable control.
pub trait Widget {
    fn render(&self, view: &FieldView<'_>) -> RenderNode;
}

impl<F> Widget for F
where
    F: Fn(&FieldView<'_>) -> RenderNode,
{
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        self(view)
    }
}
