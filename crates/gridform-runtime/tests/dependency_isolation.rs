//! Bindings recompute on declared dependencies and nothing else.
//!
//! Random write streams against a store with several bound fields; each
//! binding's revision must equal the number of writes that changed one of
//! its watched values.

use std::rc::Rc;

use gridform_core::{Attr, InternalField, ResolveArgs};
use gridform_runtime::{FieldBinding, FormState, FormStore};
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

fn watching(name: &str, watch: &[&str]) -> Rc<InternalField> {
    let mut f = InternalField::detached(name);
    f.watch = watch.iter().map(|w| (*w).to_string()).collect();
    let keys = f.watch.clone();
    f.attrs.label = Some(Attr::computed(move |a: &ResolveArgs<'_>| {
        keys.iter()
            .map(|k| a.value(k).map(Value::to_string).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",")
    }));
    Rc::new(f)
}

fn initial() -> Map<String, Value> {
    KEYS.iter().map(|k| ((*k).to_string(), json!(0))).collect()
}

proptest! {
    #[test]
    fn revision_counts_only_watched_changes(
        writes in prop::collection::vec((0usize..4, 0i64..3), 0..40)
    ) {
        let store = FormStore::new(initial());
        let shared: Rc<dyn FormState> = Rc::new(store.clone());
        let ab = FieldBinding::new(watching("ab", &["a", "b"]), Rc::clone(&shared), None);
        let d = FieldBinding::new(watching("dd", &["d"]), Rc::clone(&shared), None);
        let none = FieldBinding::new(watching("none", &[]), Rc::clone(&shared), None);

        let mut current: Vec<i64> = vec![0; 4];
        let (mut expect_ab, mut expect_d) = (0u64, 0u64);
        for (slot, value) in writes {
            if current[slot] != value {
                current[slot] = value;
                match KEYS[slot] {
                    "a" | "b" => expect_ab += 1,
                    "d" => expect_d += 1,
                    _ => {}
                }
            }
            store.set_value(KEYS[slot], json!(value));
        }

        prop_assert_eq!(ab.revision(), expect_ab);
        prop_assert_eq!(d.revision(), expect_d);
        prop_assert_eq!(none.revision(), 0);
        prop_assert_eq!(
            ab.attributes().label,
            Some(format!("{},{}", current[0], current[1]))
        );
    }
}

#[test]
fn batched_writes_recompute_once() {
    let store = FormStore::new(initial());
    let shared: Rc<dyn FormState> = Rc::new(store.clone());
    let ab = FieldBinding::new(watching("ab", &["a", "b"]), shared, None);

    store.batch(|s| {
        s.set_value("a", json!(1));
        s.set_value("b", json!(2));
        s.set_value("c", json!(3));
    });
    assert_eq!(ab.revision(), 1);
    assert_eq!(ab.attributes().label.as_deref(), Some("1,2"));
}
