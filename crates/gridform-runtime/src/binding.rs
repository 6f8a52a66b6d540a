#![forbid(unsafe_code)]

//! Reactive attribute binding for one field.
//!
//! # Design
//!
//! A [`FieldBinding`] owns a [`MemoResolver`] for its field and keeps the
//! two inputs computed attributes may read:
//!
//! - the *watched subset*: `{name: value}` for each entry of `watch`,
//! - the *context slice*: `{key: value}` for each entry of `watch_context`,
//!   or `None` when the field watches no context.
//!
//! The binding subscribes to the store with a selector that produces the
//! watched subset, so it is woken only when one of its declared
//! dependencies changes. A field with an empty `watch` never subscribes and
//! its watched subset stays empty. Context changes arrive through
//! [`FieldBinding::set_context`] and re-resolve only if the slice differs.
//!
//! # Invariants
//!
//! 1. `revision` increments exactly when the resolved attributes were
//!    recomputed after construction.
//! 2. A change to an unwatched field or an unwatched context key never bumps
//!    `revision`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use gridform_core::{
    ContextMap, FieldValues, InternalField, MemoResolver, ResolveArgs, ResolvedAttributes, path,
};
use serde_json::Value;

use crate::store::{FormState, Listener, Selector, Subscription};

/// `(key seen by computed attributes, store path it reads)`.
pub(crate) type WatchPath = (String, String);

struct BindingState {
    field: Rc<InternalField>,
    resolver: MemoResolver,
    watched: FieldValues,
    context: Option<ContextMap>,
    resolved: ResolvedAttributes,
    revision: u64,
}

impl BindingState {
    fn recompute(&mut self) {
        let args = ResolveArgs::new(&self.watched, self.context.as_ref());
        self.resolved = self.resolver.resolve(&args);
        self.revision += 1;
        tracing::debug!(
            field = %self.field.name,
            revision = self.revision,
            "attributes recomputed"
        );
    }
}

/// Live attributes of one value-mode field.
pub struct FieldBinding {
    state: Rc<RefCell<BindingState>>,
    store: Rc<dyn FormState>,
    _subscription: Option<Subscription>,
}

impl FieldBinding {
    /// Bind `field` to `store`. `context` is the form's whole context; the
    /// binding keeps only the keys the field watches.
    pub fn new(
        field: Rc<InternalField>,
        store: Rc<dyn FormState>,
        context: Option<&ContextMap>,
    ) -> Self {
        let watch = field.watch.iter().map(|w| (w.clone(), w.clone())).collect();
        Self::with_watch_paths(field, store, context, watch)
    }

    pub(crate) fn with_watch_paths(
        field: Rc<InternalField>,
        store: Rc<dyn FormState>,
        context: Option<&ContextMap>,
        watch: Vec<WatchPath>,
    ) -> Self {
        let watched = select(&watch, &store.values());
        let context = slice_context(&field.watch_context, context);
        let mut resolver = MemoResolver::new(Rc::clone(&field));
        let resolved = resolver.resolve(&ResolveArgs::new(&watched, context.as_ref()));

        let state = Rc::new(RefCell::new(BindingState {
            field,
            resolver,
            watched,
            context,
            resolved,
            revision: 0,
        }));

        let subscription = (!watch.is_empty()).then(|| {
            let selector: Selector = Rc::new(move |values: &Value| {
                Value::Object(select(&watch, values).into_iter().collect())
            });
            let weak = Rc::downgrade(&state);
            let listener: Listener = Rc::new(move |selected: &Value| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut state = state.borrow_mut();
                state.watched = selected
                    .as_object()
                    .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                state.recompute();
            });
            store.subscribe(selector, listener)
        });

        Self {
            state,
            store,
            _subscription: subscription,
        }
    }

    /// Store path of the bound value.
    #[must_use]
    pub fn name(&self) -> String {
        self.state.borrow().field.name.clone()
    }

    #[must_use]
    pub fn field(&self) -> Rc<InternalField> {
        Rc::clone(&self.state.borrow().field)
    }

    #[must_use]
    pub fn value(&self) -> Value {
        self.store.value(&self.state.borrow().field.name)
    }

    pub fn set_value(&self, value: Value) {
        let name = self.name();
        self.store.set_value(&name, value);
    }

    /// Validation messages for this field.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.store.errors(&self.state.borrow().field.name)
    }

    #[must_use]
    pub fn attributes(&self) -> ResolvedAttributes {
        self.state.borrow().resolved.clone()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.state.borrow().revision
    }

    /// Times computed functions actually ran, including the initial resolve.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.state.borrow().resolver.evaluations()
    }

    #[must_use]
    pub fn watched_values(&self) -> FieldValues {
        self.state.borrow().watched.clone()
    }

    #[must_use]
    pub fn context_slice(&self) -> Option<ContextMap> {
        self.state.borrow().context.clone()
    }

    /// Re-slice the form context. Returns whether attributes were recomputed.
    pub fn set_context(&self, context: Option<&ContextMap>) -> bool {
        let mut state = self.state.borrow_mut();
        let slice = slice_context(&state.field.watch_context, context);
        if slice == state.context {
            return false;
        }
        state.context = slice;
        state.recompute();
        true
    }
}

impl fmt::Debug for FieldBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FieldBinding")
            .field("name", &state.field.name)
            .field("watched", &state.watched)
            .field("context", &state.context)
            .field("revision", &state.revision)
            .finish_non_exhaustive()
    }
}

fn select(watch: &[WatchPath], values: &Value) -> FieldValues {
    watch
        .iter()
        .map(|(key, at)| {
            let value = path::get(values, at).cloned().unwrap_or(Value::Null);
            (key.clone(), value)
        })
        .collect()
}

/// The watched part of `context`. `None` when nothing is watched, even if
/// the form has context.
pub(crate) fn slice_context(keys: &[String], context: Option<&ContextMap>) -> Option<ContextMap> {
    if keys.is_empty() {
        return None;
    }
    let slice = keys
        .iter()
        .filter_map(|k| context?.get(k).map(|v| (k.clone(), v.clone())))
        .collect();
    Some(slice)
}
