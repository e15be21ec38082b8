//! Property tests for the number of writes a root makes.

mod common;

use biconf::{RootOptions, Value};
use common::{counting_root, object};
use proptest::prelude::*;
use serde_json::json;

#[derive(Debug, Clone)]
enum Op {
    SetKey(u8, i64),
    RemoveKey(u8),
    Push(i64),
    Pop,
    Insert(usize, i64),
    Reverse,
    ClearList,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..4, any::<i64>()).prop_map(|(k, v)| Op::SetKey(k, v)),
        (0u8..4).prop_map(Op::RemoveKey),
        any::<i64>().prop_map(Op::Push),
        Just(Op::Pop),
        (0usize..6, any::<i64>()).prop_map(|(i, v)| Op::Insert(i, v)),
        Just(Op::Reverse),
        Just(Op::ClearList),
    ]
}

/// Apply `op` to the nested section and list; true if it changed anything.
fn apply(root: &biconf::PersistentRoot, op: &Op) -> bool {
    let section = root.field("section").unwrap();
    let section = section.as_mapping().unwrap();
    let list = section.field("list").unwrap();
    let list = list.as_sequence().unwrap();

    match op {
        Op::SetKey(k, v) => section.set(format!("k{k}"), *v).is_ok(),
        Op::RemoveKey(k) => section.remove(&format!("k{k}")).is_ok(),
        Op::Push(v) => list.push(*v).is_ok(),
        Op::Pop => list.pop().is_ok(),
        Op::Insert(i, v) => list.insert(*i, *v).is_ok(),
        Op::Reverse => list.reverse().is_ok(),
        Op::ClearList => list.clear().is_ok(),
    }
}

fn fresh_root() -> (biconf::PersistentRoot, std::sync::Arc<common::CountingStorage>, usize) {
    counting_root(
        RootOptions::new().with_default_value(object(json!({"section": {"list": []}}))),
    )
}

proptest! {
    #[test]
    fn test_bound_root_writes_once_per_successful_operation(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (root, storage, seeded) = fresh_root();
        let mut succeeded = 0;
        for op in &ops {
            if apply(&root, op) {
                succeeded += 1;
            }
        }
        prop_assert_eq!(storage.writes(), seeded + succeeded);
        prop_assert_eq!(root.save_count(), succeeded as u64);
    }

    #[test]
    fn test_unbound_bracket_writes_exactly_once(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let (root, storage, seeded) = fresh_root();
        root.unbind();
        for op in &ops {
            apply(&root, op);
        }
        prop_assert_eq!(storage.writes(), seeded);

        root.rebind().unwrap();
        prop_assert_eq!(storage.writes(), seeded + 1);
        prop_assert_eq!(
            storage.stored(root.locator()),
            Some(biconf::Raw::Structured(root.to_plain()))
        );
    }

    #[test]
    fn test_depth_does_not_multiply_writes(depth in 1usize..12) {
        let mut nested = json!({});
        for _ in 0..depth {
            nested = json!({"child": nested});
        }
        let (root, storage, seeded) = counting_root(
            RootOptions::new().with_default_value(object(json!({"tree": nested}))),
        );

        let mut current = root.field("tree").unwrap();
        for _ in 0..depth {
            let next = current.as_mapping().unwrap().field("child").unwrap();
            current = next;
        }
        current.as_mapping().unwrap().set("leaf", Value::Null).unwrap();

        prop_assert_eq!(storage.writes(), seeded + 1);
    }
}
