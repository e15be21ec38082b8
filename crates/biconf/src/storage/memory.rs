//! Process-wide in-memory storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use rand::Rng;
use rand::distributions::Alphanumeric;

use super::Storage;
use crate::error::{Result, StoreError};
use crate::raw::Raw;

/// Table shared by every `MemoryStorage` in the process.
static MEMORY_TABLE: OnceLock<Mutex<HashMap<String, Raw>>> = OnceLock::new();

fn table() -> MutexGuard<'static, HashMap<String, Raw>> {
    MEMORY_TABLE
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Keeps raw data in a process-wide table keyed by locator.
pub struct MemoryStorage;

impl Storage for MemoryStorage {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn exists(&self, locator: &str) -> Result<bool> {
        Ok(table().contains_key(locator))
    }

    fn read(&self, locator: &str) -> Result<Raw> {
        table()
            .get(locator)
            .cloned()
            .ok_or_else(|| StoreError::LocatorNotFound {
                locator: locator.to_string(),
            })
    }

    fn write(&self, locator: &str, raw: Raw) -> Result<()> {
        table().insert(locator.to_string(), raw);
        Ok(())
    }
}

/// Random alphanumeric locator for stores opened without a path.
pub fn random_locator(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
