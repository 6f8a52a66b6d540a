#![forbid(unsafe_code)]

//! Per-form configuration.
//!
//! Loadable from TOML or JSON. Every section is optional; missing fields
//! fall back to defaults.
//!
//! # Example (TOML)
//!
//! ```toml
//! show_submit = true
//!
//! [grid]
//! columns = 12
//!
//! [diagnostics]
//! warn_detached = true
//! ```

use std::path::Path;

use gridform_layout::{GridConfig, MAX_COLUMNS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level form configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    pub grid: GridConfig,
    pub diagnostics: DiagnosticsConfig,
    /// Append submit and cancel buttons after the grid.
    pub show_submit: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            diagnostics: DiagnosticsConfig::default(),
            show_submit: false,
        }
    }
}

/// Development-time findings about field configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Emit a `warn` event for each configured field name with no schema
    /// match and each map key that names no schema field.
    pub warn_detached: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            warn_detached: cfg!(debug_assertions),
        }
    }
}

/// Errors from loading or validating a [`FormConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl FormConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Load by file extension: `.json` as JSON, anything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.grid.columns == 0 || self.grid.columns > MAX_COLUMNS {
            errors.push(format!(
                "grid.columns must be in 1..={MAX_COLUMNS}, got {}",
                self.grid.columns
            ));
        }
        errors
    }

    /// [`validate`](Self::validate) as a `Result`.
    pub fn check(&self) -> Result<(), ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    #[must_use]
    pub fn with_columns(mut self, columns: u8) -> Self {
        self.grid.columns = columns;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let cfg = FormConfig::default();
        assert_eq!(cfg.grid.columns, 12);
        assert!(!cfg.show_submit);
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = FormConfig::from_toml_str("show_submit = true\n[grid]\ncolumns = 6\n")
            .expect("parse");
        assert_eq!(cfg.grid.columns, 6);
        assert!(cfg.show_submit);
        assert_eq!(cfg.diagnostics, DiagnosticsConfig::default());
    }

    #[test]
    fn json_round_trips() {
        let cfg = FormConfig::default().with_columns(8);
        let json = serde_json::to_string(&cfg).expect("serialize");
        assert_eq!(FormConfig::from_json_str(&json).expect("parse"), cfg);
    }

    #[test]
    fn out_of_range_columns_are_reported() {
        let cfg = FormConfig::from_toml_str("[grid]\ncolumns = 30\n").expect("parse");
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("grid.columns"));
        let err = cfg.check().expect_err("invalid");
        assert!(err.to_string().starts_with("invalid config: grid.columns"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(matches!(
            FormConfig::from_toml_str("[grid\ncolumns = 6"),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            FormConfig::from_json_str("{\"grid\": 5}"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn loads_from_files() {
        let dir = tempfile::tempdir().expect("tempdir");

        let toml_path = dir.path().join("form.toml");
        let mut f = std::fs::File::create(&toml_path).expect("create");
        writeln!(f, "[diagnostics]\nwarn_detached = false").expect("write");
        let cfg = FormConfig::from_file(&toml_path).expect("toml");
        assert!(!cfg.diagnostics.warn_detached);

        let json_path = dir.path().join("form.json");
        std::fs::write(&json_path, r#"{"grid": {"columns": 4}}"#).expect("write");
        assert_eq!(FormConfig::from_file(&json_path).expect("json").grid.columns, 4);

        assert!(matches!(
            FormConfig::from_toml_file(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
