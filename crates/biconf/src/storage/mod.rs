//! Storage backends and their registry.
//!
//! A [`Storage`] reads and writes [`Raw`] data at a locator. Backends are
//! looked up by name in a [`StorageRegistry`]; [`default_storage_registry`]
//! returns the cached registry holding `file` and `memory`.
//!
//! Durable backends are seeded with the default value only when nothing is
//! stored at the locator yet. Non-durable backends are seeded every time a
//! store is opened.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::{MemoryStorage, random_locator};

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, StoreError};
use crate::raw::Raw;

/// Read/write strategy for a backing store.
pub trait Storage: Send + Sync {
    /// Name the backend is registered under.
    fn name(&self) -> &'static str;

    /// Whether stored data outlives the process.
    fn is_durable(&self) -> bool;

    /// Whether anything is stored at `locator`.
    fn exists(&self, locator: &str) -> Result<bool>;

    fn read(&self, locator: &str) -> Result<Raw>;

    /// Replace whatever is stored at `locator`.
    fn write(&self, locator: &str, raw: Raw) -> Result<()>;
}

/// Registry of storage backends indexed by name.
pub struct StorageRegistry {
    storages: HashMap<&'static str, Arc<dyn Storage>>,
}

impl StorageRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            storages: HashMap::new(),
        }
    }

    /// Registers a backend under its name, replacing any previous one.
    pub fn register(&mut self, storage: Arc<dyn Storage>) {
        self.storages.insert(storage.name(), storage);
    }

    /// Gets the backend registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Storage>> {
        self.storages
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::InvalidStorage {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.storages.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.storages.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.storages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storages.is_empty()
    }
}

impl Default for StorageRegistry {
    fn default() -> Self {
        build_default_storage_registry()
    }
}

/// Cached registry with the built-in backends.
static DEFAULT_STORAGES: OnceLock<StorageRegistry> = OnceLock::new();

/// Returns the registry holding `file` and `memory`.
pub fn default_storage_registry() -> &'static StorageRegistry {
    DEFAULT_STORAGES.get_or_init(build_default_storage_registry)
}

/// Builds a fresh registry with the built-in backends.
pub fn build_default_storage_registry() -> StorageRegistry {
    let mut registry = StorageRegistry::new();
    registry.register(Arc::new(FileStorage));
    registry.register(Arc::new(MemoryStorage));
    registry
}
