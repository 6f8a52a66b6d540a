//! Single-field rendering.

use gridform_core::{Element, RenderNode};

use crate::FieldView;
use crate::registry::WidgetRegistry;

/// Render one field: label, control, description, validation messages,
/// then the field's `overrides` wrapper.
///
/// Placeholders, spacers and `hidden` fields render [`RenderNode::Empty`].
/// A field's `element` replaces the registry control. A widget tag with no
/// registered widget renders the field without a control.
#[must_use]
pub fn render_field(view: &FieldView<'_>, registry: &WidgetRegistry) -> RenderNode {
    let field = view.field;
    if !field.is_visible() {
        return RenderNode::Empty;
    }
    let attrs = view.attributes;

    let control = match &field.element {
        Some(element) => element.clone(),
        None => match registry.get(&field.widget) {
            Some(widget) => widget.render(view),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    field = %field.name,
                    widget = %field.widget,
                    "no widget registered; rendering without a control"
                );
                RenderNode::Empty
            }
        },
    };

    let label = attrs
        .label
        .as_deref()
        .filter(|l| !l.is_empty())
        .map(|l| {
            RenderNode::from(
                Element::new("label")
                    .attr("for", field.name.as_str())
                    .child(RenderNode::text(l)),
            )
        })
        .unwrap_or_default();

    let description = attrs
        .description
        .as_deref()
        .map(|d| RenderNode::from(Element::new("description").child(RenderNode::text(d))))
        .unwrap_or_default();

    let errors = if view.errors.is_empty() {
        RenderNode::Empty
    } else {
        Element::new("errors")
            .children(
                view.errors
                    .iter()
                    .map(|e| RenderNode::from(Element::new("error").child(RenderNode::text(e.as_str())))),
            )
            .into()
    };

    let node: RenderNode = Element::new("field")
        .attr("name", field.name.as_str())
        .attr("widget", field.widget.as_str())
        .child(label)
        .child(control)
        .child(description)
        .child(errors)
        .into();

    match &field.overrides {
        Some(wrap) => wrap.apply(node, field, attrs),
        None => node,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridform_core::{InternalField, RenderOverride, ResolvedAttributes, WidgetType};
    use serde_json::{Value, json};

    fn attrs(label: &str) -> ResolvedAttributes {
        ResolvedAttributes {
            label: Some(label.to_string()),
            ..ResolvedAttributes::default()
        }
    }

    #[test]
    fn assembles_label_control_description_errors() {
        let field = InternalField::detached("email");
        let mut a = attrs("Email");
        a.description = Some("We never share it".into());
        let errors = vec!["Required".to_string()];
        let node = render_field(
            &FieldView::new(&field, &json!(""), &a, &errors),
            &WidgetRegistry::with_builtins(),
        );

        let el = node.as_element().expect("field element");
        let tags: Vec<_> = el
            .children
            .iter()
            .filter_map(|c| c.as_element().map(|e| e.tag.as_str()))
            .collect();
        assert_eq!(tags, ["label", "input", "description", "errors"]);
        assert!(node.find_named("input", "email").is_some());
        assert!(node.text_content().contains("Required"));
    }

    #[test]
    fn element_replaces_control() {
        let mut field = InternalField::detached("avatar");
        field.element = Some(Element::new("upload").attr("name", "avatar").into());
        let a = attrs("Avatar");
        let node = render_field(
            &FieldView::new(&field, &Value::Null, &a, &[]),
            &WidgetRegistry::with_builtins(),
        );
        assert!(node.find(&|e| e.tag == "upload").is_some());
        assert!(node.find(&|e| e.tag == "input").is_none());
    }

    #[test]
    fn unknown_widget_renders_no_control() {
        let mut field = InternalField::detached("stars");
        field.widget = WidgetType::from("rating");
        let a = attrs("Stars");
        let node = render_field(
            &FieldView::new(&field, &json!(3), &a, &[]),
            &WidgetRegistry::with_builtins(),
        );
        let el = node.as_element().expect("field element");
        assert_eq!(el.children.len(), 1);
        assert_eq!(node.text_content(), "Stars");
    }

    #[test]
    fn hidden_cells_render_nothing() {
        let a = ResolvedAttributes::default();
        let placeholder = InternalField::placeholder(6);
        let registry = WidgetRegistry::with_builtins();
        assert!(render_field(&FieldView::new(&placeholder, &Value::Null, &a, &[]), &registry).is_empty());

        let mut hidden = InternalField::detached("token");
        hidden.widget = WidgetType::hidden();
        assert!(render_field(&FieldView::new(&hidden, &Value::Null, &a, &[]), &registry).is_empty());
    }

    #[test]
    fn overrides_wrap_the_rendered_field() {
        let mut field = InternalField::detached("total");
        field.overrides = Some(RenderOverride::new(|node, f, resolved| {
            Element::new("highlight")
                .attr("for", f.name.as_str())
                .attr("label", resolved.label.clone().unwrap_or_default())
                .child(node)
                .into()
        }));
        let a = attrs("Total");
        let node = render_field(
            &FieldView::new(&field, &json!(10), &a, &[]),
            &WidgetRegistry::with_builtins(),
        );
        let root = node.as_element().expect("wrapper");
        assert_eq!(root.tag, "highlight");
        assert_eq!(root.get_attr("label"), Some(&json!("Total")));
        assert!(node.find_named("field", "total").is_some());
    }
}
