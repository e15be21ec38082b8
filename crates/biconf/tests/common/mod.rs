//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use biconf::{
    FormatRegistry, PersistentRoot, Raw, RootOptions, Storage, StorageRegistry, StoreError,
    build_default_format_registry,
};

/// In-memory storage that counts writes, registered as `counting`.
#[derive(Default)]
pub struct CountingStorage {
    writes: AtomicUsize,
    data: Mutex<HashMap<String, Raw>>,
}

impl CountingStorage {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self, locator: &str) -> Option<Raw> {
        self.data.lock().unwrap().get(locator).cloned()
    }
}

impl Storage for CountingStorage {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn exists(&self, locator: &str) -> biconf::Result<bool> {
        Ok(self.data.lock().unwrap().contains_key(locator))
    }

    fn read(&self, locator: &str) -> biconf::Result<Raw> {
        self.stored(locator).ok_or_else(|| StoreError::LocatorNotFound {
            locator: locator.to_string(),
        })
    }

    fn write(&self, locator: &str, raw: Raw) -> biconf::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.data.lock().unwrap().insert(locator.to_string(), raw);
        Ok(())
    }
}

/// Open a root on a fresh counting storage with the `none` format.
///
/// Returns the root, the storage, and the number of writes made while
/// opening (the seed).
pub fn counting_root(options: RootOptions) -> (PersistentRoot, Arc<CountingStorage>, usize) {
    let storage = Arc::new(CountingStorage::default());
    let mut storages = StorageRegistry::new();
    storages.register(storage.clone());
    let formats: FormatRegistry = build_default_format_registry();

    let root = PersistentRoot::open_with(
        options.with_storage("counting").with_parser("none"),
        &formats,
        &storages,
    )
    .unwrap();
    let seeded = storage.writes();
    (root, storage, seeded)
}

/// In-memory storage whose writes can be made to fail, registered as
/// `flaky`.
#[derive(Default)]
pub struct FlakyStorage {
    failing: AtomicBool,
    data: Mutex<HashMap<String, Raw>>,
}

impl FlakyStorage {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn stored(&self, locator: &str) -> Option<Raw> {
        self.data.lock().unwrap().get(locator).cloned()
    }
}

impl Storage for FlakyStorage {
    fn name(&self) -> &'static str {
        "flaky"
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn exists(&self, locator: &str) -> biconf::Result<bool> {
        Ok(self.data.lock().unwrap().contains_key(locator))
    }

    fn read(&self, locator: &str) -> biconf::Result<Raw> {
        self.stored(locator).ok_or_else(|| StoreError::LocatorNotFound {
            locator: locator.to_string(),
        })
    }

    fn write(&self, locator: &str, raw: Raw) -> biconf::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                operation: "write",
                path: PathBuf::from(locator),
                source: std::io::Error::other("device full"),
            });
        }
        self.data.lock().unwrap().insert(locator.to_string(), raw);
        Ok(())
    }
}

/// Open a root on a fresh flaky storage with the `none` format.
pub fn flaky_root(options: RootOptions) -> (PersistentRoot, Arc<FlakyStorage>) {
    let storage = Arc::new(FlakyStorage::default());
    let mut storages = StorageRegistry::new();
    storages.register(storage.clone());

    let root = PersistentRoot::open_with(
        options.with_storage("flaky").with_parser("none"),
        &build_default_format_registry(),
        &storages,
    )
    .unwrap();
    (root, storage)
}

pub fn object(plain: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
    plain.as_object().cloned().unwrap()
}
