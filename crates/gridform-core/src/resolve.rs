#![forbid(unsafe_code)]

//! Attribute resolution.
//!
//! # Design
//!
//! [`AttributeResolver`] splits a field's attributes once into a static part,
//! resolved up front, and the keys that hold computed values. Resolving then
//! clones the static part and invokes only the computed functions. The split
//! is redone only when the resolver is rebound to a different field
//! allocation (`Rc` identity), so re-rendering with the same descriptor never
//! re-partitions.
//!
//! [`MemoResolver`] adds a one-entry cache keyed by the watched values and the
//! watched context slice. Equal inputs return the cached result without
//! calling any function.
//!
//! # Invariants
//!
//! 1. A static key resolves to its literal regardless of inputs.
//! 2. `field_props` is dynamic as a whole if any of its entries is computed;
//!    literal entries of a dynamic bag pass through unchanged.
//! 3. Computed functions receive exactly the [`ResolveArgs`] passed in; the
//!    resolver never adds inputs of its own.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Serialize;
use serde_json::Value;

use crate::attr::Attr;
use crate::field::InternalField;
use crate::value::{ContextMap, FieldValues, ResolveArgs};

/// Resolvable attribute names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKey {
    Label,
    Placeholder,
    Description,
    Disabled,
    FieldProps,
}

impl AttrKey {
    pub const ALL: [Self; 5] = [
        Self::Label,
        Self::Placeholder,
        Self::Description,
        Self::Disabled,
        Self::FieldProps,
    ];
}

/// Concrete attributes for one input pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResolvedAttributes {
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    pub field_props: BTreeMap<String, Value>,
}

impl ResolvedAttributes {
    #[must_use]
    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.field_props.get(key)
    }
}

/// Static/dynamic split of one field's attributes.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    field: Rc<InternalField>,
    statics: ResolvedAttributes,
    dynamic: Vec<AttrKey>,
}

impl AttributeResolver {
    #[must_use]
    pub fn new(field: Rc<InternalField>) -> Self {
        let (statics, dynamic) = partition(&field);
        Self {
            field,
            statics,
            dynamic,
        }
    }

    /// Point the resolver at `field`. Returns `true` if the partition was
    /// recomputed, `false` if `field` is the allocation already bound.
    pub fn rebind(&mut self, field: Rc<InternalField>) -> bool {
        if Rc::ptr_eq(&self.field, &field) {
            return false;
        }
        let (statics, dynamic) = partition(&field);
        self.field = field;
        self.statics = statics;
        self.dynamic = dynamic;
        true
    }

    #[must_use]
    pub fn field(&self) -> &Rc<InternalField> {
        &self.field
    }

    /// Keys whose value depends on the inputs, in [`AttrKey::ALL`] order.
    #[must_use]
    pub fn dynamic_keys(&self) -> &[AttrKey] {
        &self.dynamic
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.dynamic.is_empty()
    }

    /// Statics plus every dynamic key evaluated against `args`.
    #[must_use]
    pub fn resolve(&self, args: &ResolveArgs<'_>) -> ResolvedAttributes {
        let mut out = self.statics.clone();
        let attrs = &self.field.attrs;
        for key in &self.dynamic {
            match key {
                AttrKey::Label => out.label = attrs.label.as_ref().map(|a| a.resolve(args)),
                AttrKey::Placeholder => {
                    out.placeholder = attrs.placeholder.as_ref().map(|a| a.resolve(args));
                }
                AttrKey::Description => {
                    out.description = attrs.description.as_ref().map(|a| a.resolve(args));
                }
                AttrKey::Disabled => {
                    out.disabled = attrs.disabled.as_ref().is_some_and(|a| a.resolve(args));
                }
                AttrKey::FieldProps => {
                    out.field_props = attrs
                        .field_props
                        .iter()
                        .map(|(k, v)| (k.clone(), v.resolve(args)))
                        .collect();
                }
            }
        }
        out
    }
}

fn partition(field: &InternalField) -> (ResolvedAttributes, Vec<AttrKey>) {
    let attrs = &field.attrs;
    let mut statics = ResolvedAttributes::default();
    let mut dynamic = Vec::new();

    let mut split_str = |key, attr: &Option<Attr<String>>, slot: &mut Option<String>| match attr {
        Some(Attr::Computed(_)) => dynamic.push(key),
        Some(Attr::Literal(v)) => *slot = Some(v.clone()),
        None => {}
    };
    split_str(AttrKey::Label, &attrs.label, &mut statics.label);
    split_str(AttrKey::Placeholder, &attrs.placeholder, &mut statics.placeholder);
    split_str(AttrKey::Description, &attrs.description, &mut statics.description);

    match &attrs.disabled {
        Some(Attr::Computed(_)) => dynamic.push(AttrKey::Disabled),
        Some(Attr::Literal(v)) => statics.disabled = *v,
        None => {}
    }

    if attrs.field_props.values().any(Attr::is_computed) {
        dynamic.push(AttrKey::FieldProps);
    } else {
        statics.field_props = attrs
            .field_props
            .iter()
            .filter_map(|(k, v)| v.as_literal().map(|v| (k.clone(), v.clone())))
            .collect();
    }

    (statics, dynamic)
}

/// [`AttributeResolver`] with a one-entry input cache.
#[derive(Debug, Clone)]
pub struct MemoResolver {
    inner: AttributeResolver,
    last: Option<(FieldValues, Option<ContextMap>, ResolvedAttributes)>,
    evaluations: u64,
}

impl MemoResolver {
    #[must_use]
    pub fn new(field: Rc<InternalField>) -> Self {
        Self {
            inner: AttributeResolver::new(field),
            last: None,
            evaluations: 0,
        }
    }

    /// See [`AttributeResolver::rebind`]. A new field drops the cache.
    pub fn rebind(&mut self, field: Rc<InternalField>) -> bool {
        let changed = self.inner.rebind(field);
        if changed {
            self.last = None;
        }
        changed
    }

    #[must_use]
    pub fn resolver(&self) -> &AttributeResolver {
        &self.inner
    }

    /// Number of times dynamic functions were actually run.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub fn resolve(&mut self, args: &ResolveArgs<'_>) -> ResolvedAttributes {
        if let Some((values, context, cached)) = &self.last
            && values == args.field_values
            && context.as_ref() == args.context
        {
            return cached.clone();
        }
        let resolved = self.inner.resolve(args);
        if !self.inner.is_static() {
            self.evaluations += 1;
        }
        self.last = Some((
            args.field_values.clone(),
            args.context.cloned(),
            resolved.clone(),
        ));
        resolved
    }
}
