#![forbid(unsafe_code)]

//! In-memory form-state store.
//!
//! # Design
//!
//! [`FormStore`] keeps every field value in one JSON object behind
//! `Rc<RefCell<..>>`. Cloning a `FormStore` creates another handle to the
//! same state. Subscribers register a *selector* and a *listener*: after
//! each change the selector runs against the new values, and the listener is
//! called only if the selected value differs (by `PartialEq`) from what it
//! saw last. A binding that selects its watched fields is therefore never
//! woken by changes to anything else.
//!
//! Subscribers are held weakly; the strong side lives in the returned
//! [`Subscription`] guard.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each value-changing mutation.
//! 2. Writing a value equal to the current one is a no-op.
//! 3. Listeners run after the store borrow is released, so they may read or
//!    write the store.
//! 4. Inside a batch (see [`crate::batch`]), listeners run once when the
//!    outermost batch ends and observe only the final values.
//!
//! # Failure Modes
//!
//! - Removing an out-of-range array item is ignored (logged at `debug`).
//! - A write whose index lies more than [`path::MAX_INDEX_GAP`] past the end
//!   of its array is ignored (logged at `debug`).
//! - A listener that writes the value it selects re-enters notification;
//!   it stops once the write is a no-op.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use gridform_core::path;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug_span;
use web_time::Instant;

use crate::batch::BatchScope;
use crate::validate::Validator;

/// Picks the part of the form values a subscriber depends on.
pub type Selector = Rc<dyn Fn(&Value) -> Value>;

/// Called with the newly selected value.
pub type Listener = Rc<dyn Fn(&Value)>;

/// Called with the new form state.
pub type StateListener = Rc<dyn Fn(&FormSnapshot)>;

/// Validation messages keyed by field path.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Submission state of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub can_submit: bool,
    pub is_submitted: bool,
    pub is_submitting: bool,
}

impl Default for FormSnapshot {
    fn default() -> Self {
        Self {
            can_submit: true,
            is_submitted: false,
            is_submitting: false,
        }
    }
}

/// Result of [`FormState::handle_submit`].
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation passed; carries the submitted values.
    Submitted(Value),
    /// Validation failed; nothing was submitted.
    Invalid(ErrorMap),
    /// A submission is already in progress.
    Busy,
}

impl SubmitOutcome {
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted(_))
    }
}

/// Boundary to the form-state store.
///
/// Paths use the `items[0].qty` syntax of [`gridform_core::path`].
pub trait FormState {
    /// Current value at `path`, `Null` when absent.
    fn value(&self, path: &str) -> Value;

    /// All values.
    fn values(&self) -> Value;

    fn set_value(&self, path: &str, value: Value);

    /// Register a selector/listener pair. The listener runs only when the
    /// selected value changes.
    fn subscribe(&self, selector: Selector, listener: Listener) -> Subscription;

    fn push_array_item(&self, path: &str, item: Value);

    fn remove_array_item(&self, path: &str, index: usize);

    /// Validate and, if valid, mark the form submitted.
    fn handle_submit(&self) -> SubmitOutcome;

    fn snapshot(&self) -> FormSnapshot;

    fn subscribe_state(&self, listener: StateListener) -> Subscription;

    /// Validation messages for `path`, passed through untouched.
    fn errors(&self, path: &str) -> Vec<String>;
}

struct SelectorSlot {
    selector: Selector,
    listener: Listener,
    last: RefCell<Value>,
}

struct StoreInner {
    values: Value,
    version: u64,
    subscribers: Vec<Weak<SelectorSlot>>,
    state_subscribers: Vec<Weak<dyn Fn(&FormSnapshot)>>,
    snapshot: FormSnapshot,
    errors: ErrorMap,
    validators: Vec<Rc<dyn Validator>>,
    batch_depth: u32,
    values_pending: bool,
    state_pending: bool,
}

/// Shared handle to one form's values and submission state.
#[derive(Clone)]
pub struct FormStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("FormStore")
            .field("values", &inner.values)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .field("snapshot", &inner.snapshot)
            .finish()
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

impl FormStore {
    #[must_use]
    pub fn new(initial: Map<String, Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                values: Value::Object(initial),
                version: 0,
                subscribers: Vec::new(),
                state_subscribers: Vec::new(),
                snapshot: FormSnapshot::default(),
                errors: ErrorMap::new(),
                validators: Vec::new(),
                batch_depth: 0,
                values_pending: false,
                state_pending: false,
            })),
        }
    }

    /// Add a validator run by [`FormState::handle_submit`].
    #[must_use]
    pub fn with_validator(self, validator: impl Validator + 'static) -> Self {
        self.add_validator(validator);
        self
    }

    pub fn add_validator(&self, validator: impl Validator + 'static) {
        self.inner.borrow_mut().validators.push(Rc::new(validator));
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered value subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    /// All current validation messages.
    #[must_use]
    pub fn error_map(&self) -> ErrorMap {
        self.inner.borrow().errors.clone()
    }

    /// Replace all values at once and clear validation state.
    pub fn reset(&self, values: Map<String, Value>) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.values = Value::Object(values);
            inner.version += 1;
            inner.errors.clear();
        }
        self.update_state(|s| *s = FormSnapshot::default());
        self.values_changed();
    }

    /// Listen to one path. Shorthand for a selector reading that path.
    pub fn subscribe_path(&self, path: &str, listener: impl Fn(&Value) + 'static) -> Subscription {
        let path = path.to_string();
        self.subscribe(
            Rc::new(move |values: &Value| path::get(values, &path).cloned().unwrap_or(Value::Null)),
            Rc::new(listener),
        )
    }

    /// Run `f` with notifications deferred until it returns (or, if nested,
    /// until the outermost batch ends).
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _scope = BatchScope::new(self);
        f(self)
    }

    pub(crate) fn enter_batch(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        inner.batch_depth += 1;
        inner.batch_depth == 1
    }

    /// Leave one batch level; the outermost exit flushes.
    pub(crate) fn exit_batch(&self) {
        let (values, state) = {
            let mut inner = self.inner.borrow_mut();
            inner.batch_depth = inner.batch_depth.saturating_sub(1);
            if inner.batch_depth > 0 {
                return;
            }
            (
                std::mem::take(&mut inner.values_pending),
                std::mem::take(&mut inner.state_pending),
            )
        };
        if values {
            self.notify_values();
        }
        if state {
            self.notify_state();
        }
    }

    fn values_changed(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.batch_depth > 0 {
                inner.values_pending = true;
                return;
            }
        }
        self.notify_values();
    }

    fn notify_values(&self) {
        let (slots, values) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let slots: Vec<Rc<SelectorSlot>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (slots, inner.values.clone())
        };
        if slots.is_empty() {
            return;
        }

        let started = Instant::now();
        let span = debug_span!(
            "gridform.store.notify",
            subscribers = slots.len() as u64,
            subscribers_notified = tracing::field::Empty,
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        let mut notified = 0_u64;
        for slot in &slots {
            let selected = (slot.selector)(&values);
            if *slot.last.borrow() == selected {
                continue;
            }
            slot.last.replace(selected.clone());
            (slot.listener)(&selected);
            notified += 1;
        }

        span.record("subscribers_notified", notified);
        span.record("duration_us", started.elapsed().as_micros() as u64);
    }

    fn update_state(&self, f: impl FnOnce(&mut FormSnapshot)) {
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.snapshot;
            f(&mut inner.snapshot);
            if inner.snapshot == before {
                return;
            }
            if inner.batch_depth > 0 {
                inner.state_pending = true;
                return;
            }
        }
        self.notify_state();
    }

    fn notify_state(&self) {
        let (listeners, snapshot) = {
            let mut inner = self.inner.borrow_mut();
            inner.state_subscribers.retain(|w| w.strong_count() > 0);
            let listeners: Vec<StateListener> = inner
                .state_subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect();
            (listeners, inner.snapshot)
        };
        for listener in &listeners {
            listener(&snapshot);
        }
    }

    fn run_validators(&self) -> ErrorMap {
        let (validators, values) = {
            let inner = self.inner.borrow();
            (inner.validators.clone(), inner.values.clone())
        };
        let mut errors = ErrorMap::new();
        for validator in &validators {
            for err in validator.validate(&values) {
                errors.entry(err.path).or_default().push(err.message);
            }
        }
        errors
    }
}

impl FormState for FormStore {
    fn value(&self, path: &str) -> Value {
        path::get(&self.inner.borrow().values, path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    fn values(&self) -> Value {
        self.inner.borrow().values.clone()
    }

    fn set_value(&self, path: &str, value: Value) {
        let errors_cleared = {
            let mut inner = self.inner.borrow_mut();
            if path::get(&inner.values, path) == Some(&value) {
                return;
            }
            if !path::set(&mut inner.values, path, value) {
                tracing::debug!(path, "write past array reach ignored");
                return;
            }
            inner.version += 1;
            inner.errors.remove(path).is_some()
        };
        if errors_cleared {
            let clean = self.inner.borrow().errors.is_empty();
            self.update_state(|s| s.can_submit = clean);
        }
        self.values_changed();
    }

    fn subscribe(&self, selector: Selector, listener: Listener) -> Subscription {
        let values = self.values();
        let slot = Rc::new(SelectorSlot {
            last: RefCell::new(selector(&values)),
            selector,
            listener,
        });
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&slot));
        Subscription::new(slot)
    }

    fn push_array_item(&self, path: &str, item: Value) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(items) = path::array_mut(&mut inner.values, path) else {
                tracing::debug!(path, "push past array reach ignored");
                return;
            };
            items.push(item);
            inner.version += 1;
        }
        self.values_changed();
    }

    fn remove_array_item(&self, path: &str, index: usize) {
        {
            let mut inner = self.inner.borrow_mut();
            let Some(items) = path::array_mut(&mut inner.values, path) else {
                tracing::debug!(path, index, "remove past array reach ignored");
                return;
            };
            if index >= items.len() {
                tracing::debug!(path, index, len = items.len(), "remove past end of array ignored");
                return;
            }
            items.remove(index);
            inner.version += 1;
            let prefix = format!("{path}[");
            inner.errors.retain(|key, _| !key.starts_with(&prefix));
        }
        self.values_changed();
    }

    fn handle_submit(&self) -> SubmitOutcome {
        if self.snapshot().is_submitting {
            return SubmitOutcome::Busy;
        }
        self.update_state(|s| s.is_submitting = true);

        let errors = self.run_validators();
        let valid = errors.is_empty();
        self.inner.borrow_mut().errors = errors.clone();
        self.update_state(|s| {
            s.is_submitting = false;
            s.can_submit = valid;
            s.is_submitted = valid;
        });

        if valid {
            tracing::debug!("form submitted");
            SubmitOutcome::Submitted(self.values())
        } else {
            tracing::debug!(fields = errors.len(), "submit blocked by validation");
            SubmitOutcome::Invalid(errors)
        }
    }

    fn snapshot(&self) -> FormSnapshot {
        self.inner.borrow().snapshot
    }

    fn subscribe_state(&self, listener: StateListener) -> Subscription {
        self.inner
            .borrow_mut()
            .state_subscribers
            .push(Rc::downgrade(&listener));
        Subscription::new(listener)
    }

    fn errors(&self, path: &str) -> Vec<String> {
        self.inner
            .borrow()
            .errors
            .get(path)
            .cloned()
            .unwrap_or_default()
    }
}

/// RAII guard for a store subscription.
///
/// Dropping the guard drops the only strong reference to the callback; the
/// store prunes the dead entry on its next notification.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn new<T: 'static>(guard: T) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Required;
    use serde_json::json;
    use std::cell::Cell;

    fn store() -> FormStore {
        let Value::Object(initial) = json!({"first": "", "last": "", "items": []}) else {
            unreachable!()
        };
        FormStore::new(initial)
    }

    #[test]
    fn read_write_paths() {
        let store = store();
        store.set_value("first", json!("Ada"));
        store.set_value("address.city", json!("Oslo"));
        assert_eq!(store.value("first"), json!("Ada"));
        assert_eq!(store.value("address.city"), json!("Oslo"));
        assert_eq!(store.value("missing"), Value::Null);
        assert_eq!(store.version(), 2);

        store.set_value("first", json!("Ada"));
        assert_eq!(store.version(), 2);
    }

    #[test]
    fn listener_runs_only_on_selected_change() {
        let store = store();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let _sub = store.subscribe_path("first", move |_| seen.set(seen.get() + 1));

        store.set_value("last", json!("Lovelace"));
        assert_eq!(calls.get(), 0);
        store.set_value("first", json!("Ada"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dropped_subscription_stops_listening() {
        let store = store();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let sub = store.subscribe_path("first", move |_| seen.set(seen.get() + 1));
        drop(sub);
        store.set_value("first", json!("x"));
        assert_eq!(calls.get(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn batch_defers_and_coalesces() {
        let store = store();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let _sub = store.subscribe_path("first", move |v| log.borrow_mut().push(v.clone()));

        store.batch(|s| {
            s.set_value("first", json!("a"));
            s.batch(|s| s.set_value("first", json!("b")));
            assert!(seen.borrow().is_empty());
            s.set_value("first", json!("c"));
        });
        assert_eq!(*seen.borrow(), vec![json!("c")]);
    }

    #[test]
    fn listener_may_write_back() {
        let store = store();
        let handle = store.clone();
        let _sub = store.subscribe_path("first", move |v| {
            handle.set_value("echo", v.clone());
        });
        store.set_value("first", json!("hi"));
        assert_eq!(store.value("echo"), json!("hi"));
    }

    #[test]
    fn array_items_push_and_remove() {
        let store = store();
        store.push_array_item("items", json!({"name": "a"}));
        store.push_array_item("items", json!({"name": "b"}));
        store.remove_array_item("items", 0);
        store.remove_array_item("items", 7);
        assert_eq!(store.value("items"), json!([{"name": "b"}]));
        assert_eq!(store.value("items[0].name"), json!("b"));
    }

    #[test]
    fn far_index_writes_are_ignored() {
        let store = store();
        store.set_value("items[1000000000].name", json!("x"));
        store.push_array_item(&format!("grid[{}]", usize::MAX), json!(1));
        assert_eq!(store.version(), 0);
        assert_eq!(store.value("items"), json!([]));
        assert_eq!(store.value("grid"), Value::Null);
    }

    #[test]
    fn submit_runs_validators() {
        let store = store().with_validator(Required::new(["first"]));
        let states = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&states);
        let _sub = store.subscribe_state(Rc::new(move |s: &FormSnapshot| log.borrow_mut().push(*s)));

        let outcome = store.handle_submit();
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref e) if e.contains_key("first")));
        assert!(!store.snapshot().can_submit);
        assert_eq!(store.errors("first"), ["Required"]);
        assert!(states.borrow().iter().any(|s| s.is_submitting));

        store.set_value("first", json!("Ada"));
        assert!(store.snapshot().can_submit);
        assert!(store.errors("first").is_empty());

        let outcome = store.handle_submit();
        assert!(outcome.is_submitted());
        assert!(store.snapshot().is_submitted);
    }
}
