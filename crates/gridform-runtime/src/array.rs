#![forbid(unsafe_code)]

//! Array-mode fields: a list of item groups sharing one set of templates.
//!
//! Item templates come from the field's attached `item_fields` when the
//! caller declared any (`items.qty` list entries), otherwise from the
//! default merge of the array's nested schema. Item `i`'s fields are named
//! `{array}[i].{child}`, so each one reads and writes its own slot in the
//! store and resolves its attributes independently.
//!
//! Item bindings live as long as their item: one [`ArrayItem`] per
//! [`ItemKey`], built when the item appears and dropped when it goes, so each
//! item field re-resolves only when its own watched values or context change.
//! Removing an item rebinds the ones after it under their new index names.
//! Length changes made outside the binding (a write to the whole array) are
//! picked up on the next read: missing items are bound, surplus ones dropped.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use gridform_core::{
    ContextMap, FieldMode, FieldRole, InternalField, default_for_widget, merge, path,
};
use serde_json::{Map, Value};

use crate::binding::{FieldBinding, WatchPath};
use crate::store::FormState;

/// Stable identity of one array item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey(u64);

impl ItemKey {
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item-{}", self.0)
    }
}

/// A bound field of either mode.
#[derive(Debug)]
pub enum Binding {
    Value(FieldBinding),
    Array(ArrayBinding),
}

impl Binding {
    /// Bind by the field's mode.
    pub fn new(
        field: Rc<InternalField>,
        store: Rc<dyn FormState>,
        context: Option<&ContextMap>,
    ) -> Self {
        match field.mode {
            FieldMode::Value => Self::Value(FieldBinding::new(field, store, context)),
            FieldMode::Array => Self::Array(ArrayBinding::new(field, store, context)),
        }
    }

    #[must_use]
    pub fn field(&self) -> Rc<InternalField> {
        match self {
            Self::Value(b) => b.field(),
            Self::Array(a) => Rc::clone(&a.field),
        }
    }

    pub fn set_context(&self, context: Option<&ContextMap>) {
        match self {
            Self::Value(b) => {
                b.set_context(context);
            }
            Self::Array(a) => a.set_context(context),
        }
    }

    #[must_use]
    pub fn as_value(&self) -> Option<&FieldBinding> {
        match self {
            Self::Value(b) => Some(b),
            Self::Array(_) => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&ArrayBinding> {
        match self {
            Self::Array(a) => Some(a),
            Self::Value(_) => None,
        }
    }
}

/// One array item and the bindings of its fields.
#[derive(Debug)]
pub struct ArrayItem {
    pub index: usize,
    pub key: ItemKey,
    pub fields: Vec<Binding>,
}

impl ArrayItem {
    /// Binding of template field `child` within this item.
    #[must_use]
    pub fn field(&self, child: &str) -> Option<&Binding> {
        self.fields
            .iter()
            .find(|b| b.field().name.rsplit_once('.').is_some_and(|(_, c)| c == child))
    }
}

/// Binding for an array-mode field.
pub struct ArrayBinding {
    field: Rc<InternalField>,
    store: Rc<dyn FormState>,
    templates: Vec<Rc<InternalField>>,
    context: RefCell<Option<ContextMap>>,
    items: RefCell<Vec<Rc<ArrayItem>>>,
    next_key: Cell<u64>,
    /// Set while `push`/`remove` update the store and the cache together.
    busy: Cell<bool>,
}

impl ArrayBinding {
    pub fn new(
        field: Rc<InternalField>,
        store: Rc<dyn FormState>,
        context: Option<&ContextMap>,
    ) -> Self {
        let templates = item_templates(&field);
        let binding = Self {
            field,
            store,
            templates,
            context: RefCell::new(context.cloned()),
            items: RefCell::new(Vec::new()),
            next_key: Cell::new(0),
            busy: Cell::new(false),
        };
        binding.sync_items();
        binding
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.field.name
    }

    #[must_use]
    pub fn field(&self) -> &Rc<InternalField> {
        &self.field
    }

    /// Per-item field templates. Empty means the array renders nothing.
    #[must_use]
    pub fn templates(&self) -> &[Rc<InternalField>] {
        &self.templates
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store
            .value(&self.field.name)
            .as_array()
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of the current items, in index order.
    #[must_use]
    pub fn keys(&self) -> Vec<ItemKey> {
        self.sync_items();
        self.items.borrow().iter().map(|item| item.key).collect()
    }

    /// Value a fresh item starts with.
    #[must_use]
    pub fn default_item(&self) -> Value {
        let item: Map<String, Value> = self
            .templates
            .iter()
            .map(|t| {
                let seed = match t.mode {
                    FieldMode::Array => Value::Array(Vec::new()),
                    FieldMode::Value => default_for_widget(&t.widget),
                };
                (t.name.clone(), seed)
            })
            .collect();
        Value::Object(item)
    }

    /// Append a default item and bind it.
    pub fn push(&self) -> ItemKey {
        self.sync_items();
        self.busy.set(true);
        self.store.push_array_item(&self.field.name, self.default_item());
        self.busy.set(false);
        let before = self.items.borrow().len();
        self.sync_items();
        let key = match self.items.borrow().get(before) {
            Some(item) => item.key,
            None => self.mint_key(),
        };
        tracing::debug!(array = %self.field.name, %key, "array item appended");
        key
    }

    /// Remove item `index`. Out-of-range indices are ignored. Later items
    /// are rebound under their new indices and keep their keys.
    pub fn remove(&self, index: usize) -> Option<ItemKey> {
        self.sync_items();
        if index >= self.items.borrow().len() {
            return None;
        }
        self.busy.set(true);
        self.store.remove_array_item(&self.field.name, index);
        self.busy.set(false);

        let (key, later) = {
            let mut items = self.items.borrow_mut();
            let removed = items.remove(index);
            let later: Vec<ItemKey> = items[index..].iter().map(|item| item.key).collect();
            (removed.key, later)
        };
        let rebound: Vec<Rc<ArrayItem>> = later
            .into_iter()
            .enumerate()
            .map(|(offset, key)| Rc::new(self.build_item(index + offset, key)))
            .collect();
        self.items.borrow_mut().splice(index.., rebound);
        tracing::debug!(array = %self.field.name, index, %key, "array item removed");
        Some(key)
    }

    /// Index of the item with `key`, if it still exists.
    #[must_use]
    pub fn position(&self, key: ItemKey) -> Option<usize> {
        self.keys().iter().position(|k| *k == key)
    }

    /// Re-slice the context of every bound item, nested arrays included.
    /// Items bound later start from the same context.
    pub fn set_context(&self, context: Option<&ContextMap>) {
        *self.context.borrow_mut() = context.cloned();
        for item in self.items.borrow().iter() {
            for binding in &item.fields {
                binding.set_context(context);
            }
        }
    }

    /// The bound items, in index order. Repeated calls return the same
    /// bindings until the item set changes.
    #[must_use]
    pub fn items(&self) -> Vec<Rc<ArrayItem>> {
        self.sync_items();
        self.items.borrow().clone()
    }

    fn build_item(&self, index: usize, key: ItemKey) -> ArrayItem {
        let context = self.context.borrow().clone();
        ArrayItem {
            index,
            key,
            fields: self
                .templates
                .iter()
                .map(|t| self.item_binding(index, t, context.as_ref()))
                .collect(),
        }
    }

    fn item_binding(
        &self,
        index: usize,
        template: &InternalField,
        context: Option<&ContextMap>,
    ) -> Binding {
        let array = &self.field.name;
        let mut field = template.clone();
        field.name = path::item_path(array, index, &template.name);

        let watch: Vec<WatchPath> = template
            .watch
            .iter()
            .map(|w| {
                let at = if self.templates.iter().any(|t| t.name == *w) {
                    path::item_path(array, index, w)
                } else {
                    w.clone()
                };
                (w.clone(), at)
            })
            .collect();
        field.watch = watch.iter().map(|(_, at)| at.clone()).collect();

        let field = Rc::new(field);
        let store = Rc::clone(&self.store);
        match field.mode {
            FieldMode::Array => Binding::Array(ArrayBinding::new(field, store, context)),
            FieldMode::Value => {
                Binding::Value(FieldBinding::with_watch_paths(field, store, context, watch))
            }
        }
    }

    fn mint_key(&self) -> ItemKey {
        let id = self.next_key.get();
        self.next_key.set(id + 1);
        ItemKey(id)
    }

    /// Align the bound items with the stored length.
    fn sync_items(&self) {
        if self.busy.get() {
            return;
        }
        let len = self.len();
        let current = self.items.borrow().len();
        if current > len {
            self.items.borrow_mut().truncate(len);
            return;
        }
        for index in current..len {
            let item = Rc::new(self.build_item(index, self.mint_key()));
            self.items.borrow_mut().push(item);
        }
    }
}

impl fmt::Debug for ArrayBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayBinding")
            .field("name", &self.field.name)
            .field("templates", &self.templates.len())
            .field("items", &self.items.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Templates named by child key and bound to the item schema.
fn item_templates(field: &InternalField) -> Vec<Rc<InternalField>> {
    if field.item_fields.is_empty() {
        return merge(&field.nested, None).into_iter().map(Rc::new).collect();
    }
    field
        .item_fields
        .iter()
        .filter(|t| t.role == FieldRole::Field)
        .map(|t| {
            let mut template = t.clone();
            if let Some(child) = t.item_key() {
                template.name = child.to_string();
            }
            template.array_path = None;
            match field.nested.iter().find(|s| s.key == template.name) {
                Some(schema) => template.bind_schema(schema),
                None => template.nested.clear(),
            }
            Rc::new(template)
        })
        .collect()
}
