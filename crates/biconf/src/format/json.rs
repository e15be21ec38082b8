//! JSON text formats.

use super::Format;
use crate::error::{Result, StoreError};
use crate::raw::Raw;
use crate::value::Value;

/// Compact JSON.
pub struct JsonFormat;

/// Indented JSON with sorted keys.
pub struct PrettyJsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &'static str {
        "json"
    }

    fn description(&self) -> &'static str {
        "Compact JSON text"
    }

    fn load(&self, raw: Raw) -> Result<serde_json::Value> {
        parse_text(self.name(), raw)
    }

    fn dump(&self, value: &Value) -> Result<Raw> {
        serde_json::to_string(value)
            .map(Raw::Text)
            .map_err(|e| StoreError::Serialization {
                source: Box::new(e),
            })
    }
}

impl Format for PrettyJsonFormat {
    fn name(&self) -> &'static str {
        "pretty-json"
    }

    fn description(&self) -> &'static str {
        "Indented JSON text with sorted keys"
    }

    fn load(&self, raw: Raw) -> Result<serde_json::Value> {
        parse_text(self.name(), raw)
    }

    // Mapping entries are kept in key order, so serializing them directly
    // already yields sorted keys.
    fn dump(&self, value: &Value) -> Result<Raw> {
        serde_json::to_string_pretty(value)
            .map(Raw::Text)
            .map_err(|e| StoreError::Serialization {
                source: Box::new(e),
            })
    }
}

fn parse_text(strategy: &'static str, raw: Raw) -> Result<serde_json::Value> {
    let Raw::Text(text) = raw else {
        return Err(StoreError::IncompatibleRaw {
            strategy,
            expected: "text",
        });
    };
    serde_json::from_str(&text).map_err(|e| StoreError::Deserialization {
        source: Box::new(e),
    })
}
