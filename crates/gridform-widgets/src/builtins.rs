//! Built-in controls.
//!
//! Each control is an element carrying `name`, the current value, and the
//! resolved `placeholder`/`disabled` attributes. `field_props` entries are
//! forwarded as element attributes, except `options`, which choice widgets
//! expand into child elements.

use gridform_core::{Element, RenderNode};
use serde_json::Value;

use crate::{FieldView, Widget};

/// Attributes every control shares.
fn control(tag: &str, view: &FieldView<'_>) -> Element {
    let attrs = view.attributes;
    let mut el = Element::new(tag).attr("name", view.name());
    if let Some(placeholder) = &attrs.placeholder {
        el = el.attr("placeholder", placeholder.as_str());
    }
    if attrs.disabled {
        el = el.attr("disabled", true);
    }
    for (key, value) in &attrs.field_props {
        if key != "options" {
            el = el.attr(key.as_str(), value.clone());
        }
    }
    el
}

/// `options` prop as `(value, label)` pairs. Entries may be strings or
/// `{"value": .., "label": ..}` objects.
fn options(view: &FieldView<'_>) -> Vec<(Value, String)> {
    let Some(Value::Array(items)) = view.prop("options") else {
        return Vec::new();
    };
    items
        .iter()
        .map(|item| match item {
            Value::Object(obj) => {
                let value = obj.get("value").cloned().unwrap_or(Value::Null);
                let label = obj
                    .get("label")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| display(&value));
                (value, label)
            }
            other => (other.clone(), display(other)),
        })
        .collect()
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextInput;

impl Widget for TextInput {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        control("input", view)
            .attr("type", "text")
            .attr("value", display(view.value))
            .into()
    }
}

/// Numeric input. Non-numeric values render empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberInput;

impl Widget for NumberInput {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        let value = match view.value {
            Value::Number(n) => Value::Number(n.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map_or(Value::Null, Value::Number),
            _ => Value::Null,
        };
        control("input", view)
            .attr("type", "number")
            .attr("value", value)
            .into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Checkbox;

impl Widget for Checkbox {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        control("input", view)
            .attr("type", "checkbox")
            .attr("checked", view.value.as_bool().unwrap_or(false))
            .into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Select;

impl Widget for Select {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        let current = view.value;
        let opts = options(view).into_iter().map(|(value, label)| {
            let selected = value == *current;
            let mut opt = Element::new("option").attr("value", value);
            if selected {
                opt = opt.attr("selected", true);
            }
            RenderNode::from(opt.child(RenderNode::text(label)))
        });
        control("select", view).children(opts).into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Radio;

impl Widget for Radio {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        let current = view.value;
        let disabled = view.attributes.disabled;
        let name = view.name();
        let opts = options(view).into_iter().map(|(value, label)| {
            let checked = value == *current;
            let mut radio = Element::new("input")
                .attr("type", "radio")
                .attr("name", name)
                .attr("value", value);
            if checked {
                radio = radio.attr("checked", true);
            }
            if disabled {
                radio = radio.attr("disabled", true);
            }
            RenderNode::from(
                Element::new("label")
                    .child(radio)
                    .child(RenderNode::text(label)),
            )
        });
        control("radiogroup", view).children(opts).into()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextArea;

impl Widget for TextArea {
    fn render(&self, view: &FieldView<'_>) -> RenderNode {
        control("textarea", view)
            .child(RenderNode::text(display(view.value)))
            .into()
    }
}
