#![forbid(unsafe_code)]

//! Batch update coalescing for [`FormStore`] notifications.
//!
//! Setting several fields in a row normally wakes each affected subscriber
//! once per write. Inside a batch, values update immediately but
//! notifications wait until the outermost scope ends; each subscriber then
//! runs at most once, against the final values.
//!
//! # Usage
//!
//! ```ignore
//! use gridform_runtime::BatchScope;
//!
//! {
//!     let _batch = BatchScope::new(&store);
//!     store.set_value("quantity", json!(5));
//!     store.set_value("unitPrice", json!(10));
//! } // `total` is recomputed once, here
//! ```
//!
//! # Invariants
//!
//! 1. Nested scopes are supported: only the outermost one flushes.
//! 2. Reads inside a batch see the latest values.
//! 3. After the flush, subscribers have seen only the final state.

use crate::store::FormStore;

/// RAII guard holding a store in batch mode.
#[must_use = "the batch ends when the scope is dropped"]
pub struct BatchScope {
    store: FormStore,
    is_root: bool,
}

impl BatchScope {
    pub fn new(store: &FormStore) -> Self {
        let is_root = store.enter_batch();
        Self {
            store: store.clone(),
            is_root,
        }
    }

    /// Whether this scope will flush on drop.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.is_root
    }
}

impl Drop for BatchScope {
    fn drop(&mut self) {
        self.store.exit_batch();
    }
}

impl std::fmt::Debug for BatchScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScope")
            .field("is_root", &self.is_root)
            .finish()
    }
}
