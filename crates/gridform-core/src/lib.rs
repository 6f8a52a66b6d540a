#![forbid(unsafe_code)]

//! Core: schemas, field descriptors, override merging, and attribute resolution.
//!
//! # Role in gridform
//! `gridform-core` is the bottom layer. It owns the data model every other
//! crate speaks: [`SchemaField`] coming out of a [`SchemaAdapter`], the
//! derived [`AutoField`] defaults, the caller's [`OverrideSpec`], and the
//! canonical [`InternalField`] that layout and rendering consume.
//!
//! # Pipeline
//! ```text
//! SchemaAdapter ──► descriptor::build ──► merge::merge ──► (gridform-layout)
//!                    (AutoField)           (InternalField)
//! ```
//!
//! Attribute values are [`Attr`]s: either literal, or computed from the
//! watched field values and the watched slice of external context. The
//! [`AttributeResolver`] turns a field's attribute set into a
//! [`ResolvedAttributes`] for one input pair.
//!
//! Everything here is synchronous and single-threaded; shared closures are
//! held in `Rc`.

pub mod attr;
pub mod descriptor;
pub mod error;
pub mod field;
pub mod json_schema;
pub mod merge;
pub mod node;
pub mod overrides;
pub mod path;
pub mod resolve;
pub mod schema;
pub mod value;

pub use attr::{Attr, ComputeFn, FieldAttrs, FieldProps};
pub use descriptor::{camel_to_label, widget_for};
pub use error::SchemaError;
pub use field::{AutoField, FieldMode, FieldRole, InternalField, RenderOverride, WidgetType};
pub use json_schema::JsonSchema;
pub use merge::{MergeReport, merge, merge_with_report};
pub use node::{Element, RenderNode};
pub use overrides::{FieldConfig, FieldMap, FieldPatch, FieldSpec, MapEntry, OverrideSpec};
pub use path::PathSegment;
pub use resolve::{AttrKey, AttributeResolver, MemoResolver, ResolvedAttributes};
pub use schema::{ObjectSchema, ParsedSchema, PrimitiveType, SchemaAdapter, SchemaField};
pub use value::{ContextMap, FieldValues, ResolveArgs, default_for_widget};
