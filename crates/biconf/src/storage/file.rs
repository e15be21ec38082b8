//! Filesystem storage.

use std::fs;
use std::path::Path;

use super::Storage;
use crate::error::{Result, StoreError};
use crate::raw::Raw;

/// Keeps the store as UTF-8 text in the file named by the locator.
pub struct FileStorage;

impl Storage for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn exists(&self, locator: &str) -> Result<bool> {
        let path = Path::new(locator);
        path.try_exists().map_err(|e| StoreError::Io {
            operation: "inspect",
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn read(&self, locator: &str) -> Result<Raw> {
        let path = Path::new(locator);
        let text = fs::read_to_string(path).map_err(|e| StoreError::Io {
            operation: "read",
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Raw::Text(text))
    }

    fn write(&self, locator: &str, raw: Raw) -> Result<()> {
        let Raw::Text(text) = raw else {
            return Err(StoreError::IncompatibleRaw {
                strategy: self.name(),
                expected: "text",
            });
        };
        let path = Path::new(locator);

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::Io {
                operation: "create directory",
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(path, text).map_err(|e| StoreError::Io {
            operation: "write",
            path: path.to_path_buf(),
            source: e,
        })
    }
}
