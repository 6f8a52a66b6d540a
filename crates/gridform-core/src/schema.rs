#![forbid(unsafe_code)]

//! Schema boundary.
//!
//! The form never interprets a schema language itself. A [`SchemaAdapter`]
//! flattens whatever the caller validates with into an ordered list of
//! [`SchemaField`]s plus an initial value object. Two adapters ship here:
//! [`ObjectSchema`] for schemas built in code and
//! [`JsonSchema`](crate::json_schema::JsonSchema) for JSON Schema documents.
//!
//! # Invariants
//!
//! 1. Field order is declaration order.
//! 2. `nested` is `Some` iff the type is `Array` or `Object`. For arrays it
//!    holds the fields of one item.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Primitive type tag reported by a schema adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
    Object,
    Array,
}

impl PrimitiveType {
    #[must_use]
    pub fn is_nested(self) -> bool {
        matches!(self, Self::Object | Self::Array)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Enum => "enum",
            Self::Object => "object",
            Self::Array => "array",
        }
    }
}

/// One flat entry of a parsed schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaField {
    pub key: String,
    pub primitive_type: PrimitiveType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested: Option<Vec<SchemaField>>,
    /// Declared default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Variants of an `Enum` field.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl SchemaField {
    fn scalar(key: impl Into<String>, primitive_type: PrimitiveType) -> Self {
        Self {
            key: key.into(),
            primitive_type,
            nested: None,
            default: None,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn string(key: impl Into<String>) -> Self {
        Self::scalar(key, PrimitiveType::String)
    }

    #[must_use]
    pub fn number(key: impl Into<String>) -> Self {
        Self::scalar(key, PrimitiveType::Number)
    }

    #[must_use]
    pub fn boolean(key: impl Into<String>) -> Self {
        Self::scalar(key, PrimitiveType::Boolean)
    }

    #[must_use]
    pub fn date(key: impl Into<String>) -> Self {
        Self::scalar(key, PrimitiveType::Date)
    }

    #[must_use]
    pub fn enumeration<S: Into<String>>(
        key: impl Into<String>,
        options: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::scalar(key, PrimitiveType::Enum)
        }
    }

    #[must_use]
    pub fn object(key: impl Into<String>, fields: Vec<SchemaField>) -> Self {
        Self {
            nested: Some(fields),
            ..Self::scalar(key, PrimitiveType::Object)
        }
    }

    /// Array whose items are objects with `item_fields`.
    #[must_use]
    pub fn array(key: impl Into<String>, item_fields: Vec<SchemaField>) -> Self {
        Self {
            nested: Some(item_fields),
            ..Self::scalar(key, PrimitiveType::Array)
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Nested fields, empty for scalars.
    #[must_use]
    pub fn nested_fields(&self) -> &[SchemaField] {
        self.nested.as_deref().unwrap_or(&[])
    }

    /// Initial value for this field, if it has one.
    ///
    /// Arrays start empty and objects collect their children's defaults;
    /// scalars only have a value when the schema declares one.
    #[must_use]
    pub fn initial_value(&self) -> Option<Value> {
        if let Some(default) = &self.default {
            return Some(default.clone());
        }
        match self.primitive_type {
            PrimitiveType::Array => Some(Value::Array(Vec::new())),
            PrimitiveType::Object => Some(Value::Object(default_values(self.nested_fields()))),
            _ => None,
        }
    }
}

/// Output of [`SchemaAdapter::parse_schema`].
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ParsedSchema {
    pub fields: Vec<SchemaField>,
}

/// Boundary to an external schema system.
pub trait SchemaAdapter {
    /// Flatten the schema into ordered fields.
    fn parse_schema(&self) -> ParsedSchema;

    /// Initial values derived from the schema.
    fn default_values(&self) -> Map<String, Value> {
        default_values(&self.parse_schema().fields)
    }
}

/// Collect the initial values of `fields` into an object.
#[must_use]
pub fn default_values(fields: &[SchemaField]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|f| f.initial_value().map(|v| (f.key.clone(), v)))
        .collect()
}

/// A schema assembled in code.
///
/// ```ignore
/// let schema = ObjectSchema::new()
///     .field(SchemaField::string("firstName"))
///     .field(SchemaField::number("age"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    fields: Vec<SchemaField>,
}

impl ObjectSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, field: SchemaField) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }
}

impl From<Vec<SchemaField>> for ObjectSchema {
    fn from(fields: Vec<SchemaField>) -> Self {
        Self { fields }
    }
}

impl SchemaAdapter for ObjectSchema {
    fn parse_schema(&self) -> ParsedSchema {
        ParsedSchema {
            fields: self.fields.clone(),
        }
    }
}
