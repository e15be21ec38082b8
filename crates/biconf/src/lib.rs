//! Two-way configuration store.
//!
//! A [`PersistentRoot`] is a nested mapping/sequence structure that writes
//! itself to its backing store whenever anything inside it changes.
//!
//! # Features
//!
//! - **Observable containers** that promote nested mappings and sequences
//!   on insertion and bubble every change up to the root
//! - **Pluggable formats** (`json`, `pretty-json`, `none`) and **storages**
//!   (`file`, `memory`) selected by name
//! - **Before-save veto** and **bind/unbind** for grouping many changes
//!   into one write
//!
//! # Example
//!
//! ```ignore
//! use biconf::{PersistentRoot, RootOptions};
//! use serde_json::json;
//!
//! let root = PersistentRoot::open(RootOptions::new().with_path("settings.json"))?;
//!
//! // One write per change, wherever it happens
//! root.set("window", json!({"width": 800, "recent": []}))?;
//! let window = root.field("window")?;
//! window.as_mapping().unwrap().set("width", 1024)?;
//!
//! // One write for the whole block
//! root.bulk(|root| {
//!     root.set("theme", "dark")?;
//!     root.set("font_size", 13)?;
//!     Ok(())
//! })?;
//! ```
//!
//! # Architecture
//!
//! The crate is organized into:
//!
//! - `value.rs` - The store's value type
//! - `observable/` - Observable mapping and sequence, change wiring
//! - `root/` - Persistent root, options, bind state
//! - `format/` - Serialization formats and registry
//! - `storage/` - Storage backends and registry
//! - `raw.rs` - Data exchanged between formats and storages
//! - `error.rs` - Error types with user-friendly messages

mod error;
mod format;
mod observable;
mod raw;
mod root;
mod storage;
mod value;

pub use error::{Result, StoreError};
pub use format::{
    Format, FormatRegistry, JsonFormat, PassthroughFormat, PrettyJsonFormat,
    build_default_format_registry, default_format_registry,
};
pub use observable::{ChangeHandler, Container, ObservableMapping, ObservableSequence, noop_handler};
pub use raw::Raw;
pub use root::{
    BindGuard, ChangeHook, DEFAULT_FILE_PARSER, DEFAULT_FILE_STORAGE, DEFAULT_MEMORY_PARSER,
    DEFAULT_MEMORY_STORAGE, PersistState, PersistentRoot, RANDOM_LOCATOR_LEN, RootOptions,
    SaveDecision, SaveHook, StoreSettings,
};
pub use storage::{
    FileStorage, MemoryStorage, Storage, StorageRegistry, build_default_storage_registry,
    default_storage_registry, random_locator,
};
pub use value::Value;
