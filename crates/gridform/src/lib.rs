#![forbid(unsafe_code)]

//! gridform public facade.
//!
//! Builds forms from a schema: default fields derived from the schema,
//! overridden by an ordered list, a per-field map, or a transform; packed
//! into a fixed-width grid; attributes re-resolved as watched values and
//! context change.
//!
//! This crate re-exports the types most callers need and provides the
//! [`Form`] builder. Lower layers are reachable through [`core`],
//! [`layout`], [`runtime`] and [`widgets`].

pub mod config;
pub mod error;
pub mod form;
mod pipeline;

pub use config::{ConfigError, DiagnosticsConfig, FormConfig};
pub use error::{FormError, Result};
pub use form::{CancelHandler, Form, FormBuilder, RowOverride, StateHandler, SubmitHandler};
pub use pipeline::Layout;

// --- Core re-exports -------------------------------------------------------

pub use gridform_core::{
    Attr, AutoField, ContextMap, Element, FieldConfig, FieldMap, FieldPatch, FieldSpec,
    FieldValues, InternalField, JsonSchema, MergeReport, ObjectSchema, OverrideSpec,
    PrimitiveType, RenderNode, ResolveArgs, ResolvedAttributes, SchemaAdapter, SchemaField,
    WidgetType,
};

// --- Layout re-exports -----------------------------------------------------

pub use gridform_layout::{GridConfig, GridRow, LayoutError};

// --- Runtime re-exports ----------------------------------------------------

pub use gridform_runtime::{
    ArrayBinding, Binding, FieldBinding, FieldError, FormSnapshot, FormState, FormStore, ItemKey,
    Required, SubmitOutcome, Validator,
};

// --- Widget re-exports -----------------------------------------------------

pub use gridform_widgets::{FieldView, Widget, WidgetRegistry};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Attr, FieldConfig, FieldMap, FieldPatch, FieldSpec, Form, FormConfig, FormError,
        JsonSchema, ObjectSchema, OverrideSpec, RenderNode, Result, SchemaField, WidgetType,
    };

    pub use crate::{core, layout, runtime, widgets};
}

pub use gridform_core as core;
pub use gridform_layout as layout;
pub use gridform_runtime as runtime;
pub use gridform_widgets as widgets;
