//! Default field descriptors derived from a schema.

use crate::field::{AutoField, WidgetType};
use crate::schema::{PrimitiveType, SchemaField};

/// Grid span of a field before any override: one full row.
pub const DEFAULT_SIZE: u8 = 12;

/// One [`AutoField`] per schema field, in schema order.
#[must_use]
pub fn build(schema_fields: &[SchemaField]) -> Vec<AutoField> {
    schema_fields
        .iter()
        .map(|field| AutoField {
            name: field.key.clone(),
            label: camel_to_label(&field.key),
            widget: widget_for(field.primitive_type),
            size: DEFAULT_SIZE,
        })
        .collect()
}

/// Widget a primitive type renders with unless overridden.
#[must_use]
pub fn widget_for(primitive: PrimitiveType) -> WidgetType {
    match primitive {
        PrimitiveType::String => WidgetType::text(),
        PrimitiveType::Number => WidgetType::number(),
        PrimitiveType::Boolean => WidgetType::checkbox(),
        _ => WidgetType::text(),
    }
}

/// `firstName` → `First Name`.
///
/// Every uppercase ASCII letter starts a new word; each word gets its first
/// character uppercased and the words are joined with single spaces.
#[must_use]
pub fn camel_to_label(key: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in key.chars() {
        if ch.is_ascii_uppercase() && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    words.push(current);

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn labels_from_camel_case() {
        assert_eq!(camel_to_label("firstName"), "First Name");
        assert_eq!(camel_to_label("unitPrice"), "Unit Price");
        assert_eq!(camel_to_label("age"), "Age");
        assert_eq!(camel_to_label("Name"), "Name");
        assert_eq!(camel_to_label("isHTTPS"), "Is H T T P S");
        assert_eq!(camel_to_label("snake_case"), "Snake_case");
        assert_eq!(camel_to_label(""), "");
    }

    #[test]
    fn widgets_from_primitive_types() {
        assert_eq!(widget_for(PrimitiveType::String), WidgetType::text());
        assert_eq!(widget_for(PrimitiveType::Number), WidgetType::number());
        assert_eq!(widget_for(PrimitiveType::Boolean), WidgetType::checkbox());
        assert_eq!(widget_for(PrimitiveType::Date), WidgetType::text());
        assert_eq!(widget_for(PrimitiveType::Enum), WidgetType::text());
        assert_eq!(widget_for(PrimitiveType::Array), WidgetType::text());
    }

    #[test]
    fn build_keeps_schema_order_and_full_width() {
        let fields = build(&[
            SchemaField::string("lastName"),
            SchemaField::boolean("subscribed"),
            SchemaField::number("age"),
        ]);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["lastName", "subscribed", "age"]);
        assert!(fields.iter().all(|f| f.size == DEFAULT_SIZE));
        assert_eq!(fields[1].widget, WidgetType::checkbox());
        assert_eq!(fields[0].label, "Last Name");
    }

    proptest! {
        #[test]
        fn label_words_match_uppercase_boundaries(key in "[a-z]{1,6}([A-Z][a-z]{0,5}){0,4}") {
            let label = camel_to_label(&key);
            let uppercase = key.chars().skip(1).filter(char::is_ascii_uppercase).count();
            prop_assert_eq!(label.split(' ').count(), uppercase + 1);
            prop_assert_eq!(label.replace(' ', "").to_lowercase(), key.to_lowercase());
        }
    }
}
