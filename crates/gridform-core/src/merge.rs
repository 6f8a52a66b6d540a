#![forbid(unsafe_code)]

//! Override merging: schema defaults plus one [`OverrideSpec`] shape into the
//! canonical [`InternalField`] list.
//!
//! # Precedence
//!
//! Schema-derived defaults lose to any value the caller supplies. A map-form
//! transform returning `None` leaves the field unchanged.
//!
//! # Invariants
//!
//! 1. With no override (or an empty list), output order is schema order and
//!    every field carries its schema `mode` and `nested`.
//! 2. Transform and list output is authoritative: exactly the entries the
//!    caller returned, in that order.
//! 3. Map output has one field per schema field, in schema order.
//!
//! # Failure Modes
//!
//! Nothing here fails. Names that match no schema field are kept as
//! detached value fields and listed in [`MergeReport::detached`]; map keys
//! that match no schema field are dropped and listed in
//! [`MergeReport::unknown_keys`].

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::attr::Attr;
use crate::descriptor;
use crate::field::{FieldRole, InternalField};
use crate::overrides::{FieldConfig, FieldMap, OverrideSpec};
use crate::path;
use crate::schema::{PrimitiveType, SchemaField};

/// Non-fatal findings of one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Field names with no schema match, in output order.
    pub detached: Vec<String>,
    /// Map-form keys with no schema match.
    pub unknown_keys: Vec<String>,
}

impl MergeReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.detached.is_empty() && self.unknown_keys.is_empty()
    }
}

/// Merge schema defaults with `overrides`.
#[must_use]
pub fn merge(schema_fields: &[SchemaField], overrides: Option<&OverrideSpec>) -> Vec<InternalField> {
    merge_with_report(schema_fields, overrides).0
}

/// [`merge`], also returning what did not line up with the schema.
#[must_use]
pub fn merge_with_report(
    schema_fields: &[SchemaField],
    overrides: Option<&OverrideSpec>,
) -> (Vec<InternalField>, MergeReport) {
    let _span = tracing::debug_span!(
        "gridform.merge",
        shape = overrides.map_or("defaults", OverrideSpec::shape),
        schema_fields = schema_fields.len()
    )
    .entered();

    let by_key: FxHashMap<&str, &SchemaField> =
        schema_fields.iter().map(|f| (f.key.as_str(), f)).collect();
    let mut report = MergeReport::default();

    let mut fields = match overrides {
        None => defaults(schema_fields),
        Some(OverrideSpec::List(entries)) if entries.is_empty() => defaults(schema_fields),
        Some(OverrideSpec::List(entries)) => merge_list(entries, &by_key, &mut report),
        Some(OverrideSpec::Map(map)) => merge_map(schema_fields, map, &mut report),
        Some(OverrideSpec::Transform(f)) => {
            merge_transform(f(descriptor::build(schema_fields)), &by_key, &mut report)
        }
    };

    for field in &mut fields {
        attach_options(field, &by_key);
    }

    for name in &report.detached {
        tracing::debug!(field = %name, "field name has no schema match");
    }
    for key in &report.unknown_keys {
        tracing::debug!(key = %key, "map override for unknown schema key ignored");
    }
    tracing::debug!(fields = fields.len(), "merged");
    (fields, report)
}

fn defaults(schema_fields: &[SchemaField]) -> Vec<InternalField> {
    schema_fields.iter().map(InternalField::from_schema).collect()
}

fn merge_map(
    schema_fields: &[SchemaField],
    map: &FieldMap,
    report: &mut MergeReport,
) -> Vec<InternalField> {
    let mut unknown: Vec<String> = map
        .keys()
        .filter(|k| !schema_fields.iter().any(|f| f.key == *k))
        .map(str::to_string)
        .collect();
    unknown.sort();
    report.unknown_keys = unknown;

    schema_fields
        .iter()
        .map(|schema| {
            let mut field = InternalField::from_schema(schema);
            if let Some(patch) = map
                .get(&schema.key)
                .and_then(|entry| entry.patch_for(&field.auto_projection()))
            {
                patch.apply_to(&mut field);
            }
            field
        })
        .collect()
}

fn merge_transform(
    entries: Vec<FieldConfig>,
    by_key: &FxHashMap<&str, &SchemaField>,
    report: &mut MergeReport,
) -> Vec<InternalField> {
    entries
        .into_iter()
        .map(|entry| match entry {
            FieldConfig::Spacer { size } => InternalField::spacer(size),
            FieldConfig::Field(spec) => {
                let mut field = InternalField::detached(spec.name.clone());
                match by_key.get(spec.name.as_str()) {
                    Some(schema) => {
                        field.widget = descriptor::widget_for(schema.primitive_type);
                        field.bind_schema(schema);
                    }
                    None => report.detached.push(spec.name.clone()),
                }
                spec.patch.apply_to(&mut field);
                field
            }
        })
        .collect()
}

fn merge_list(
    entries: &[FieldConfig],
    by_key: &FxHashMap<&str, &SchemaField>,
    report: &mut MergeReport,
) -> Vec<InternalField> {
    entries
        .iter()
        .map(|entry| match entry {
            FieldConfig::Spacer { size } => InternalField::spacer(*size),
            FieldConfig::Field(spec) => {
                let mut field = InternalField::detached(spec.name.clone());
                if let Some(schema) = by_key.get(spec.name.as_str()) {
                    field.widget = descriptor::widget_for(schema.primitive_type);
                    field.bind_schema(schema);
                } else if let Some((parent, child)) = array_item(&spec.name, by_key) {
                    field.array_path = Some(parent.key.clone());
                    field.nested = parent.nested_fields().to_vec();
                    if let Some(item) = parent.nested_fields().iter().find(|f| f.key == child) {
                        field.widget = descriptor::widget_for(item.primitive_type);
                    }
                } else {
                    report.detached.push(spec.name.clone());
                }
                spec.patch.apply_to(&mut field);
                field
            }
        })
        .collect()
}

/// `parent.child` where `parent` is an array-typed schema field.
fn array_item<'s>(
    name: &'s str,
    by_key: &FxHashMap<&str, &'s SchemaField>,
) -> Option<(&'s SchemaField, &'s str)> {
    let (parent, child) = path::split_parent(name)?;
    let schema = by_key.get(parent).copied()?;
    (schema.primitive_type == PrimitiveType::Array).then_some((schema, child))
}

/// Enum variants become `field_props["options"]` when the field renders as a
/// choice widget and the caller did not supply options.
fn attach_options(field: &mut InternalField, by_key: &FxHashMap<&str, &SchemaField>) {
    if field.role != FieldRole::Field || !field.widget.is_choice() {
        return;
    }
    if field.attrs.field_props.contains_key("options") {
        return;
    }
    let Some(schema) = by_key.get(field.name.as_str()) else {
        return;
    };
    if schema.options.is_empty() {
        return;
    }
    let options = Value::Array(schema.options.iter().cloned().map(Value::String).collect());
    field
        .attrs
        .field_props
        .insert("options".to_string(), Attr::Literal(options));
}
