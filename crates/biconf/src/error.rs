//! Store error types.
//!
//! Every store operation returns a structured error that carries enough
//! context for a user-facing message and an optional remediation hint.

use std::path::PathBuf;
use thiserror::Error;

/// Store operation error.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No format is registered under the requested name.
    #[error("Unknown parser: {name}")]
    InvalidParser { name: String },

    /// No storage backend is registered under the requested name.
    #[error("Unknown storage: {name}")]
    InvalidStorage { name: String },

    /// The stored data does not deserialize to a mapping.
    #[error("Stored data at {locator} is not a mapping")]
    InvalidRoot { locator: String },

    /// Deleting a key that the mapping does not contain.
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    /// Removing a value that the sequence does not contain.
    #[error("Value not found: {value}")]
    ValueNotFound { value: String },

    /// Popping from an empty sequence.
    #[error("Cannot pop from an empty sequence")]
    EmptyContainer,

    /// Index past the end of a sequence.
    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Field-style access to a key that the mapping does not contain.
    #[error("No such attribute: {name}")]
    NoSuchAttribute { name: String },

    /// Inserting the mapping of a persistent root into another container.
    #[error("A persistent root cannot be placed inside another container")]
    RootNotInsertable,

    /// Inserting a container into itself or into one of its descendants.
    #[error("Circular reference: a container cannot contain itself")]
    CircularReference,

    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Nothing has been written to an in-memory locator yet.
    #[error("Nothing stored under locator: {locator}")]
    LocatorNotFound { locator: String },

    /// A format or storage received raw data of the wrong shape.
    #[error("{strategy} expects {expected} data")]
    IncompatibleRaw {
        strategy: &'static str,
        expected: &'static str,
    },

    /// Serialization error.
    #[error("Failed to serialize store data")]
    Serialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize store data")]
    Deserialization {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl StoreError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidParser { name } => {
                format!("'{}' is not a known configuration format.", name)
            }
            Self::InvalidStorage { name } => {
                format!("'{}' is not a known configuration storage.", name)
            }
            Self::InvalidRoot { locator } => {
                format!(
                    "The configuration stored at {} must be a mapping at the top level.",
                    locator
                )
            }
            Self::KeyNotFound { key } => {
                format!("The configuration has no entry named '{}'.", key)
            }
            Self::ValueNotFound { value } => {
                format!("The list does not contain {}.", value)
            }
            Self::EmptyContainer => "The list is already empty.".to_string(),
            Self::IndexOutOfRange { index, len } => {
                format!(
                    "Position {} is outside the list, which has {} entries.",
                    index, len
                )
            }
            Self::NoSuchAttribute { name } => {
                format!("The configuration has no field named '{}'.", name)
            }
            Self::RootNotInsertable => {
                "A stored configuration cannot be nested inside another one.".to_string()
            }
            Self::CircularReference => {
                "A section of the configuration cannot be placed inside itself.".to_string()
            }
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::LocatorNotFound { locator } => {
                format!("No configuration is stored under '{}'.", locator)
            }
            Self::IncompatibleRaw { strategy, expected } => {
                format!("The {} strategy can only handle {} data.", strategy, expected)
            }
            Self::Serialization { .. } => {
                "An error occurred while saving the configuration.".to_string()
            }
            Self::Deserialization { .. } => {
                "An error occurred while reading the configuration. The file may be corrupted."
                    .to_string()
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidParser { .. } => {
                Some("Use one of: json, pretty-json, none.".into())
            }
            Self::InvalidStorage { .. } => Some("Use one of: file, memory.".into()),
            Self::IncompatibleRaw { .. } => {
                Some("Pair text formats with file storage and 'none' with memory storage.".into())
            }
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::RootNotInsertable | Self::CircularReference => {
                Some("Insert a copy made with to_plain() instead.".into())
            }
            Self::InvalidRoot { .. } | Self::Deserialization { .. } => {
                Some("Fix or delete the stored file so it can be seeded again.".into())
            }
            _ => None,
        }
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
