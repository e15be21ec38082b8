//! Serialization formats and their registry.
//!
//! A [`Format`] turns the whole store into [`Raw`] data and back. Formats
//! are looked up by name in a [`FormatRegistry`]; [`default_format_registry`]
//! returns the cached registry holding the built-in formats:
//!
//! | Name | Dump | Load |
//! |------|------|------|
//! | `json` | compact JSON text | JSON text |
//! | `pretty-json` | two-space indented JSON text, sorted keys | JSON text |
//! | `none` | structured tree, unchanged | structured tree, unchanged |

mod json;
mod passthrough;

pub use json::{JsonFormat, PrettyJsonFormat};
pub use passthrough::PassthroughFormat;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::error::{Result, StoreError};
use crate::raw::Raw;
use crate::value::Value;

/// Serialize/deserialize strategy for the whole store.
pub trait Format: Send + Sync {
    /// Name the format is registered under.
    fn name(&self) -> &'static str;

    /// Returns a human-readable description of the format.
    fn description(&self) -> &'static str {
        "Store format"
    }

    /// Deserialize raw data into a plain value.
    fn load(&self, raw: Raw) -> Result<serde_json::Value>;

    /// Serialize the store.
    fn dump(&self, value: &Value) -> Result<Raw>;
}

/// Registry of formats indexed by name.
pub struct FormatRegistry {
    formats: HashMap<&'static str, Arc<dyn Format>>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            formats: HashMap::new(),
        }
    }

    /// Registers a format under its name, replacing any previous one.
    pub fn register(&mut self, format: Arc<dyn Format>) {
        self.formats.insert(format.name(), format);
    }

    /// Gets the format registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Format>> {
        self.formats
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::InvalidParser {
                name: name.to_string(),
            })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formats.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.formats.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        build_default_format_registry()
    }
}

/// Cached registry with the built-in formats.
static DEFAULT_FORMATS: OnceLock<FormatRegistry> = OnceLock::new();

/// Returns the registry holding `json`, `pretty-json` and `none`.
pub fn default_format_registry() -> &'static FormatRegistry {
    DEFAULT_FORMATS.get_or_init(build_default_format_registry)
}

/// Builds a fresh registry with the built-in formats, for callers that
/// want to add their own.
pub fn build_default_format_registry() -> FormatRegistry {
    let mut registry = FormatRegistry::new();
    registry.register(Arc::new(JsonFormat));
    registry.register(Arc::new(PrettyJsonFormat));
    registry.register(Arc::new(PassthroughFormat));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_names() {
        assert_eq!(
            default_format_registry().names(),
            vec!["json", "none", "pretty-json"]
        );
    }

    #[test]
    fn test_unknown_format() {
        let err = default_format_registry().get("yaml").err().unwrap();
        assert!(matches!(err, StoreError::InvalidParser { ref name } if name == "yaml"));
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FormatRegistry::new();
        assert!(registry.is_empty());
        registry.register(Arc::new(JsonFormat));
        registry.register(Arc::new(JsonFormat));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("json"));
    }
}
