//! Integration tests for change propagation from nested containers to the
//! persistent root.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use biconf::{ObservableMapping, ObservableSequence, Raw, RootOptions, StoreError, Value};
use common::{counting_root, flaky_root, object};
use serde_json::json;

#[test]
fn test_nested_mutation_writes_once_per_operation() {
    let (root, storage, seeded) = counting_root(
        RootOptions::new().with_default_value(object(json!({
            "server": {"hosts": [{"name": "a", "ports": [80]}]}
        }))),
    );

    let server = root.field("server").unwrap();
    let hosts = server.as_mapping().unwrap().field("hosts").unwrap();
    let host = hosts.as_sequence().unwrap().get(0).unwrap();
    let ports = host.as_mapping().unwrap().field("ports").unwrap();

    ports.as_sequence().unwrap().push(443).unwrap();
    assert_eq!(storage.writes(), seeded + 1);

    host.as_mapping().unwrap().set("name", "b").unwrap();
    assert_eq!(storage.writes(), seeded + 2);

    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({
            "server": {"hosts": [{"name": "b", "ports": [80, 443]}]}
        })))
    );
}

#[test]
fn test_root_hook_receives_root_not_child() {
    let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let (root, _, _) = counting_root(
        RootOptions::new()
            .with_default_value(object(json!({"a": {"b": {"c": {}}}})))
            .on_changed(move |root| log.borrow_mut().push(root.len())),
    );

    let a = root.field("a").unwrap();
    let b = a.as_mapping().unwrap().field("b").unwrap();
    let c = b.as_mapping().unwrap().field("c").unwrap();
    c.as_mapping().unwrap().set("deep", true).unwrap();

    // One call, and it sees the top-level mapping (one key: "a")
    assert_eq!(*seen.borrow(), vec![1]);
}

#[test]
fn test_inserted_plain_values_become_observable() {
    let (root, storage, seeded) = counting_root(RootOptions::new());

    root.set("list", json!([{"x": 1}, [2, 3]])).unwrap();
    let list = root.field("list").unwrap();
    let list = list.as_sequence().unwrap();
    assert!(list.get(0).unwrap().as_mapping().is_some());
    assert!(list.get(1).unwrap().as_sequence().is_some());

    list.get(1).unwrap().as_sequence().unwrap().reverse().unwrap();
    assert_eq!(storage.writes(), seeded + 2);
    assert_eq!(root.to_plain(), json!({"list": [{"x": 1}, [3, 2]]}));
}

#[test]
fn test_reinserting_observable_is_not_rewrapped() {
    let (root, storage, seeded) = counting_root(RootOptions::new());

    let section = ObservableMapping::new();
    root.set("first", section.clone()).unwrap();
    root.set("second", section.clone()).unwrap();

    let stored = root.get("second").unwrap();
    assert!(stored.as_mapping().unwrap().ptr_eq(&section));

    // A single notification chain: one write per change
    section.set("k", 1).unwrap();
    assert_eq!(storage.writes(), seeded + 3);
}

#[test]
fn test_moved_child_reports_to_new_parent() {
    let (root, storage, seeded) = counting_root(RootOptions::new());
    let outside = ObservableSequence::new();
    outside.push(1).unwrap();
    assert_eq!(storage.writes(), seeded);

    root.set("items", outside.clone()).unwrap();
    outside.push(2).unwrap();
    assert_eq!(storage.writes(), seeded + 2);
    assert_eq!(root.to_plain(), json!({"items": [1, 2]}));
}

#[test]
fn test_replaced_child_stops_reporting() {
    let (root, storage, seeded) = counting_root(
        RootOptions::new().with_default_value(object(json!({"section": {"v": 1}}))),
    );
    let old = root.field("section").unwrap();
    root.set("section", json!({"v": 2})).unwrap();
    assert_eq!(storage.writes(), seeded + 1);

    old.as_mapping().unwrap().set("v", 99).unwrap();
    assert_eq!(storage.writes(), seeded + 1);
    assert_eq!(root.to_plain(), json!({"section": {"v": 2}}));
}

#[test]
fn test_get_set_container_default_is_lazy() {
    let (root, storage, seeded) = counting_root(RootOptions::new());

    let plugins = root.get_set("plugins", json!({"enabled": []})).unwrap();
    assert_eq!(storage.writes(), seeded);
    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({})))
    );

    let enabled = plugins.as_mapping().unwrap().field("enabled").unwrap();
    enabled.as_sequence().unwrap().push("spellcheck").unwrap();
    assert_eq!(storage.writes(), seeded + 1);
    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({"plugins": {"enabled": ["spellcheck"]}})))
    );

    // Permanent member now: the same handle comes back and writes normally
    let again = root.get_set("plugins", json!({})).unwrap();
    assert!(again.same_container(&plugins));
    enabled.as_sequence().unwrap().push("lint").unwrap();
    assert_eq!(storage.writes(), seeded + 2);
}

#[test]
fn test_get_set_scalar_default_writes_immediately() {
    let (root, storage, seeded) = counting_root(RootOptions::new());
    let level = root.get_set("level", "info").unwrap();
    assert_eq!(level, Value::from("info"));
    assert_eq!(storage.writes(), seeded + 1);
    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({"level": "info"})))
    );
}

#[test]
fn test_failed_operations_do_not_write() {
    let (root, storage, seeded) = counting_root(
        RootOptions::new().with_default_value(object(json!({"list": []}))),
    );

    assert!(matches!(
        root.remove("missing"),
        Err(StoreError::KeyNotFound { .. })
    ));
    let list = root.field("list").unwrap();
    let list = list.as_sequence().unwrap();
    assert!(matches!(list.pop(), Err(StoreError::EmptyContainer)));
    assert!(matches!(
        list.remove_value(&Value::from(1)),
        Err(StoreError::ValueNotFound { .. })
    ));
    assert!(matches!(
        root.field("nope"),
        Err(StoreError::NoSuchAttribute { .. })
    ));

    assert_eq!(storage.writes(), seeded);
}

#[test]
fn test_container_batch_inside_root_writes_once() {
    let (root, storage, seeded) = counting_root(
        RootOptions::new().with_default_value(object(json!({"list": []}))),
    );
    let list = root.field("list").unwrap();
    list.as_sequence()
        .unwrap()
        .batch(|l| {
            for i in 0..4 {
                l.push(i)?;
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(storage.writes(), seeded + 1);
    assert_eq!(root.to_plain(), json!({"list": [0, 1, 2, 3]}));
}

#[test]
fn test_root_mapping_cannot_be_nested_elsewhere() {
    let (root, storage, seeded) = counting_root(RootOptions::new());
    root.set("a", 1).unwrap();

    let snapshot = ObservableMapping::new();
    let err = snapshot.set("copy", root.mapping().clone()).unwrap_err();
    assert!(matches!(err, StoreError::RootNotInsertable));
    let list = ObservableSequence::new();
    assert!(matches!(
        list.push(root.mapping().clone()),
        Err(StoreError::RootNotInsertable)
    ));
    assert!(snapshot.is_empty());

    // Still persisting
    root.set("a", 2).unwrap();
    assert_eq!(root.save_count(), 2);
    assert_eq!(storage.writes(), seeded + 2);

    // A plain copy is fine
    snapshot.set("copy", root.to_plain()).unwrap();
    assert_eq!(snapshot.to_plain(), json!({"copy": {"a": 2}}));
}

#[test]
fn test_root_inside_own_child_is_refused() {
    let (root, storage, seeded) = counting_root(RootOptions::new());
    root.set("child", json!({"list": []})).unwrap();
    let child = root.field("child").unwrap();
    let list = child.as_mapping().unwrap().field("list").unwrap();
    let list = list.as_sequence().unwrap();

    assert!(matches!(
        child.as_mapping().unwrap().set("up", root.mapping().clone()),
        Err(StoreError::RootNotInsertable)
    ));
    assert!(matches!(
        list.push(child.clone()),
        Err(StoreError::CircularReference)
    ));
    assert_eq!(storage.writes(), seeded + 1);

    list.push(1).unwrap();
    assert_eq!(storage.writes(), seeded + 2);
    assert_eq!(root.to_plain(), json!({"child": {"list": [1]}}));
}

#[test]
fn test_failed_write_surfaces_and_stays_pending() {
    let (root, storage) = flaky_root(
        RootOptions::new().with_default_value(object(json!({"list": []}))),
    );
    let list = root.field("list").unwrap();
    let list = list.as_sequence().unwrap();

    storage.set_failing(true);
    let err = list.push("queued").unwrap_err();
    assert!(matches!(err, StoreError::Io { operation: "write", .. }));
    assert!(root.has_pending_changes());
    assert_eq!(root.save_count(), 0);
    assert_eq!(root.to_plain(), json!({"list": ["queued"]}));
    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({"list": []})))
    );

    storage.set_failing(false);
    root.set("retry", true).unwrap();
    assert!(!root.has_pending_changes());
    assert_eq!(
        storage.stored(root.locator()),
        Some(Raw::Structured(json!({"list": ["queued"], "retry": true})))
    );
}
