//! Construction options for a persistent root.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::PersistentRoot;

/// Format used when a path is given and no parser is named.
pub const DEFAULT_FILE_PARSER: &str = "pretty-json";
/// Storage used when a path is given and no storage is named.
pub const DEFAULT_FILE_STORAGE: &str = "file";
/// Format used for anonymous stores when no parser is named.
pub const DEFAULT_MEMORY_PARSER: &str = "none";
/// Storage used for anonymous stores when no storage is named.
pub const DEFAULT_MEMORY_STORAGE: &str = "memory";
/// Length of generated locators for anonymous stores.
pub const RANDOM_LOCATOR_LEN: usize = 20;

/// Outcome of the before-save hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveDecision {
    /// Write the change.
    #[default]
    Proceed,
    /// Skip this write. The change stays in memory and stays pending.
    Veto,
}

impl From<bool> for SaveDecision {
    fn from(proceed: bool) -> Self {
        if proceed { Self::Proceed } else { Self::Veto }
    }
}

/// Hook called for every change while the root is bound.
pub type ChangeHook = Rc<dyn Fn(&PersistentRoot)>;

/// Hook deciding whether a change is written.
pub type SaveHook = Rc<dyn Fn(&PersistentRoot) -> SaveDecision>;

/// Options for [`PersistentRoot::open`].
///
/// ```ignore
/// let root = PersistentRoot::open(
///     RootOptions::default()
///         .with_path("settings.json")
///         .with_default_value(json!({"theme": "dark"}).as_object().cloned().unwrap_or_default())
///         .before_save(|root| SaveDecision::from(root.contains_key("theme"))),
/// )?;
/// ```
#[derive(Clone, Default)]
pub struct RootOptions {
    /// Locator of the backing store. A random one is generated when absent.
    pub path: Option<String>,

    /// Initial content when nothing is stored yet (always, for non-durable
    /// storage).
    pub default_value: serde_json::Map<String, serde_json::Value>,

    /// Format name. Defaults depend on whether `path` is set.
    pub parser: Option<String>,

    /// Storage name. Defaults depend on whether `path` is set.
    pub storage: Option<String>,

    pub on_changed: Option<ChangeHook>,

    pub before_save: Option<SaveHook>,
}

impl RootOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_default_value(mut self, value: serde_json::Map<String, serde_json::Value>) -> Self {
        self.default_value = value;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: impl Into<String>) -> Self {
        self.parser = Some(parser.into());
        self
    }

    #[must_use]
    pub fn with_storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    /// Called after every change while bound, before the before-save hook.
    #[must_use]
    pub fn on_changed(mut self, hook: impl Fn(&PersistentRoot) + 'static) -> Self {
        self.on_changed = Some(Rc::new(hook));
        self
    }

    /// Called before every write; returning [`SaveDecision::Veto`] skips it.
    #[must_use]
    pub fn before_save(mut self, hook: impl Fn(&PersistentRoot) -> SaveDecision + 'static) -> Self {
        self.before_save = Some(Rc::new(hook));
        self
    }

    /// Locator plus the format and storage names to use, after defaults.
    pub(crate) fn resolve_names(&self) -> (String, String, String) {
        let (locator, parser, storage) = match &self.path {
            Some(path) => (path.clone(), DEFAULT_FILE_PARSER, DEFAULT_FILE_STORAGE),
            None => (
                crate::storage::random_locator(RANDOM_LOCATOR_LEN),
                DEFAULT_MEMORY_PARSER,
                DEFAULT_MEMORY_STORAGE,
            ),
        };
        (
            locator,
            self.parser.clone().unwrap_or_else(|| parser.to_string()),
            self.storage.clone().unwrap_or_else(|| storage.to_string()),
        )
    }
}

impl fmt::Debug for RootOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootOptions")
            .field("path", &self.path)
            .field("default_value", &self.default_value)
            .field("parser", &self.parser)
            .field("storage", &self.storage)
            .field("on_changed", &self.on_changed.is_some())
            .field("before_save", &self.before_save.is_some())
            .finish()
    }
}

/// Store settings as a host application keeps them in its own
/// configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,

    #[serde(default)]
    pub default_value: serde_json::Map<String, serde_json::Value>,
}

impl From<StoreSettings> for RootOptions {
    fn from(settings: StoreSettings) -> Self {
        Self {
            path: settings.path,
            default_value: settings.default_value,
            parser: settings.parser,
            storage: settings.storage,
            on_changed: None,
            before_save: None,
        }
    }
}
