use thiserror::Error;

/// Failure turning an external schema document into [`SchemaField`]s.
///
/// [`SchemaField`]: crate::schema::SchemaField
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("schema root must be an object schema with `properties`")]
    NotAnObject,

    #[error("property `{key}` is not a schema object")]
    MalformedProperty { key: String },

    #[error("property `{key}` has unsupported type `{ty}`")]
    UnsupportedType { key: String, ty: String },
}
