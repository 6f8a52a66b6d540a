#![forbid(unsafe_code)]

//! Grid packing for merged form fields.
//!
//! [`GridPacker`] turns the ordered [`InternalField`] list into rows whose
//! spans sum to exactly the grid width, padding short rows with hidden
//! placeholder cells.
//!
//! # Usage
//!
//! ```ignore
//! use gridform_layout::{GridConfig, GridPacker};
//!
//! let rows = GridPacker::new(GridConfig::default()).pack(&fields)?;
//! for row in &rows {
//!     assert_eq!(row.width(), 12);
//! }
//! ```

mod packer;

pub use packer::{GridCell, GridPacker, GridRow, pack};

use serde::{Deserialize, Serialize};

/// Grid width used when nothing else is configured.
pub const DEFAULT_COLUMNS: u8 = 12;

/// Widest grid accepted by [`GridConfig::validate`].
pub const MAX_COLUMNS: u8 = 24;

/// Grid geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Units per row. Valid range is `1..=MAX_COLUMNS`.
    pub columns: u8,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn with_columns(columns: u8) -> Self {
        Self { columns }
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if (1..=MAX_COLUMNS).contains(&self.columns) {
            Ok(())
        } else {
            Err(LayoutError::InvalidColumns {
                columns: self.columns,
                max: MAX_COLUMNS,
            })
        }
    }
}

/// Fatal packing errors. Each one means the field configuration is wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("invalid size {size} for field {field} (expected 1..={max})")]
    InvalidSize { field: String, size: u8, max: u8 },

    #[error("row {row} has invalid width: {width} (expected {expected})")]
    RowWidth { row: usize, width: u32, expected: u8 },

    #[error("invalid grid width {columns} (expected 1..={max})")]
    InvalidColumns { columns: u8, max: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_bounds() {
        assert!(GridConfig::default().validate().is_ok());
        assert!(GridConfig::with_columns(24).validate().is_ok());
        assert_eq!(
            GridConfig::with_columns(0).validate(),
            Err(LayoutError::InvalidColumns { columns: 0, max: 24 })
        );
        assert!(GridConfig::with_columns(25).validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let cfg: GridConfig = serde_json::from_str("{}").expect("parse");
        assert_eq!(cfg.columns, 12);
        let cfg: GridConfig = serde_json::from_str(r#"{"columns": 6}"#).expect("parse");
        assert_eq!(cfg.columns, 6);
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = LayoutError::InvalidSize {
            field: "bio".into(),
            size: 13,
            max: 12,
        };
        assert_eq!(err.to_string(), "invalid size 13 for field bio (expected 1..=12)");
    }
}
