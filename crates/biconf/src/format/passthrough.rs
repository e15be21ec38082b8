//! Identity format for in-memory stores.

use super::Format;
use crate::error::{Result, StoreError};
use crate::raw::Raw;
use crate::value::Value;

/// Hands the structure to storage as a plain tree, without encoding it.
pub struct PassthroughFormat;

impl Format for PassthroughFormat {
    fn name(&self) -> &'static str {
        "none"
    }

    fn description(&self) -> &'static str {
        "Structured data passed through unchanged"
    }

    fn load(&self, raw: Raw) -> Result<serde_json::Value> {
        match raw {
            Raw::Structured(value) => Ok(value),
            Raw::Text(_) => Err(StoreError::IncompatibleRaw {
                strategy: self.name(),
                expected: "structured",
            }),
        }
    }

    fn dump(&self, value: &Value) -> Result<Raw> {
        Ok(Raw::Structured(value.to_plain()))
    }
}
