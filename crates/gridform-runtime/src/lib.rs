#![forbid(unsafe_code)]

//! Form state and reactive field bindings.
//!
//! # Role in gridform
//! `gridform-runtime` owns everything that changes after the form is built:
//! field values in a [`FormStore`], submission state, validation messages,
//! and the per-field [`FieldBinding`]s that keep resolved attributes current
//! as watched values and context change.
//!
//! # Primary responsibilities
//! - **Store**: one JSON object of values, path-addressed, with
//!   selector-based subscriptions and batched notification.
//! - **Bindings**: [`FieldBinding`] for value fields, [`ArrayBinding`] for
//!   array fields and their per-item templates.
//! - **Validation**: [`Validator`]s run on submit; messages pass through.
//!
//! Single-threaded throughout: handles are `Rc`, nothing is `Send`.

pub mod array;
pub mod batch;
pub mod binding;
pub mod store;
pub mod validate;

pub use array::{ArrayBinding, ArrayItem, Binding, ItemKey};
pub use batch::BatchScope;
pub use binding::FieldBinding;
pub use store::{
    ErrorMap, FormSnapshot, FormState, FormStore, Listener, Selector, StateListener,
    SubmitOutcome, Subscription,
};
pub use validate::{FieldError, Required, Validator};
