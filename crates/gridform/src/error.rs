use gridform_core::SchemaError;
use gridform_layout::LayoutError;
use thiserror::Error;

use crate::config::ConfigError;

/// Top-level error for building and rendering forms.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Standard result type for gridform APIs.
pub type Result<T> = std::result::Result<T, FormError>;
