//! [`SchemaAdapter`] for a practical subset of JSON Schema.
//!
//! Supported per property: `type` (`string`, `number`, `integer`,
//! `boolean`, `object`, `array`; a `["T", "null"]` union reads as `T`),
//! `format: date | date-time`, `enum`, `default`, nested `properties`, and
//! `items` for arrays. Property order is document order.
//!
//! ```ignore
//! let schema = JsonSchema::from_json_str(r#"{
//!     "type": "object",
//!     "properties": {
//!         "firstName": { "type": "string" },
//!         "items": { "type": "array", "items": {
//!             "type": "object",
//!             "properties": { "qty": { "type": "integer" } }
//!         }}
//!     }
//! }"#)?;
//! ```

use serde_json::{Map, Value};

use crate::error::SchemaError;
use crate::schema::{ParsedSchema, PrimitiveType, SchemaAdapter, SchemaField};

#[derive(Debug, Clone, PartialEq)]
pub struct JsonSchema {
    fields: Vec<SchemaField>,
}

impl JsonSchema {
    /// Parse a schema document held as a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }

    /// Parse a schema document. The root must be an object schema.
    pub fn from_value(root: &Value) -> Result<Self, SchemaError> {
        let obj = root.as_object().ok_or(SchemaError::NotAnObject)?;
        match type_name(obj) {
            None | Some("object") => {}
            Some(_) => return Err(SchemaError::NotAnObject),
        }
        let props = obj
            .get("properties")
            .and_then(Value::as_object)
            .ok_or(SchemaError::NotAnObject)?;
        Ok(Self {
            fields: parse_properties(props)?,
        })
    }

    #[must_use]
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }
}

impl SchemaAdapter for JsonSchema {
    fn parse_schema(&self) -> ParsedSchema {
        ParsedSchema {
            fields: self.fields.clone(),
        }
    }
}

fn parse_properties(props: &Map<String, Value>) -> Result<Vec<SchemaField>, SchemaError> {
    props
        .iter()
        .map(|(key, prop)| parse_property(key, prop))
        .collect()
}

/// First non-`null` entry of `type`, which may be a string or a list.
fn type_name(obj: &Map<String, Value>) -> Option<&str> {
    match obj.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(list) => list
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null")
            .or(Some("null")),
        _ => None,
    }
}

fn parse_property(key: &str, prop: &Value) -> Result<SchemaField, SchemaError> {
    let obj = prop.as_object().ok_or_else(|| SchemaError::MalformedProperty {
        key: key.to_string(),
    })?;

    let mut field = if let Some(variants) = obj.get("enum").and_then(Value::as_array) {
        SchemaField::enumeration(key, variants.iter().map(enum_label))
    } else {
        match type_name(obj) {
            Some("string") => match obj.get("format").and_then(Value::as_str) {
                Some("date" | "date-time") => SchemaField::date(key),
                _ => SchemaField::string(key),
            },
            Some("number" | "integer") => SchemaField::number(key),
            Some("boolean") => SchemaField::boolean(key),
            Some("object") => SchemaField::object(key, nested_properties(obj)?),
            Some("array") => {
                let items = match obj.get("items").and_then(Value::as_object) {
                    Some(item) => nested_properties(item)?,
                    None => Vec::new(),
                };
                SchemaField::array(key, items)
            }
            Some(other) => {
                return Err(SchemaError::UnsupportedType {
                    key: key.to_string(),
                    ty: other.to_string(),
                });
            }
            None if obj.contains_key("properties") => {
                SchemaField::object(key, nested_properties(obj)?)
            }
            None => SchemaField::string(key),
        }
    };

    if let Some(default) = obj.get("default") {
        field.default = Some(default.clone());
    }
    debug_assert_eq!(field.nested.is_some(), field.primitive_type.is_nested());
    Ok(field)
}

fn nested_properties(obj: &Map<String, Value>) -> Result<Vec<SchemaField>, SchemaError> {
    match obj.get("properties").and_then(Value::as_object) {
        Some(props) => parse_properties(props),
        None => Ok(Vec::new()),
    }
}

fn enum_label(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "customerName": { "type": "string", "default": "" },
                "orderDate": { "type": "string", "format": "date" },
                "priority": { "enum": ["low", "high"] },
                "express": { "type": "boolean" },
                "notes": { "type": ["string", "null"] },
                "items": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "sku": { "type": "string" },
                            "qty": { "type": "integer", "default": 1 }
                        }
                    }
                },
                "tags": { "type": "array", "items": { "type": "string" } }
            }
        })
    }

    #[test]
    fn parses_types_in_document_order() {
        let schema = JsonSchema::from_value(&order_schema()).expect("valid schema");
        let fields = schema.parse_schema().fields;
        let summary: Vec<_> = fields
            .iter()
            .map(|f| (f.key.as_str(), f.primitive_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("customerName", PrimitiveType::String),
                ("orderDate", PrimitiveType::Date),
                ("priority", PrimitiveType::Enum),
                ("express", PrimitiveType::Boolean),
                ("notes", PrimitiveType::String),
                ("items", PrimitiveType::Array),
                ("tags", PrimitiveType::Array),
            ]
        );
        assert_eq!(fields[2].options, ["low", "high"]);
        assert_eq!(fields[5].nested_fields().len(), 2);
        assert!(fields[6].nested_fields().is_empty());
    }

    #[test]
    fn defaults_come_from_schema() {
        let schema = JsonSchema::from_value(&order_schema()).expect("valid schema");
        let defaults = Value::Object(schema.default_values());
        assert_eq!(defaults, json!({"customerName": "", "items": [], "tags": []}));
    }

    #[test]
    fn rejects_non_object_roots() {
        assert!(matches!(
            JsonSchema::from_value(&json!({"type": "string"})),
            Err(SchemaError::NotAnObject)
        ));
        assert!(matches!(
            JsonSchema::from_value(&json!([1, 2])),
            Err(SchemaError::NotAnObject)
        ));
        assert!(matches!(
            JsonSchema::from_json_str("{not json"),
            Err(SchemaError::Json(_))
        ));
    }

    #[test]
    fn rejects_unknown_property_types() {
        let err = JsonSchema::from_value(&json!({
            "properties": { "blob": { "type": "binary" } }
        }))
        .expect_err("binary is unsupported");
        assert!(matches!(err, SchemaError::UnsupportedType { ref key, .. } if key == "blob"));

        let err = JsonSchema::from_value(&json!({ "properties": { "x": 3 } }))
            .expect_err("property must be an object");
        assert!(matches!(err, SchemaError::MalformedProperty { .. }));
    }
}
