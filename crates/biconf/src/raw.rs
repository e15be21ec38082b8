//! Raw data exchanged between formats and storages.

/// What a format produces and a storage keeps.
///
/// Text formats produce [`Raw::Text`]; the passthrough format hands the
/// structure over as a [`Raw::Structured`] tree, which only storages that
/// keep values in memory can hold.
#[derive(Debug, Clone, PartialEq)]
pub enum Raw {
    Text(String),
    Structured(serde_json::Value),
}

impl Raw {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Text(_) => None,
            Self::Structured(value) => Some(value),
        }
    }
}

impl From<String> for Raw {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<serde_json::Value> for Raw {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}
