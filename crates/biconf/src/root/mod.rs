//! Persistent root: an observable mapping that writes itself to storage.
//!
//! Every change anywhere inside the root arrives at a single handler. While
//! the root is bound, the handler marks the change pending, calls the
//! `on_changed` hook, asks the `before_save` hook, and unless vetoed dumps
//! the whole structure with the configured format and writes it with the
//! configured storage.

mod guard;
mod options;
mod state;

pub use guard::BindGuard;
pub use options::{
    ChangeHook, DEFAULT_FILE_PARSER, DEFAULT_FILE_STORAGE, DEFAULT_MEMORY_PARSER,
    DEFAULT_MEMORY_STORAGE, RANDOM_LOCATOR_LEN, RootOptions, SaveDecision, SaveHook,
    StoreSettings,
};
pub use state::PersistState;

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{Result, StoreError};
use crate::format::{Format, FormatRegistry, default_format_registry};
use crate::observable::{ChangeHandler, Container, ObservableMapping};
use crate::storage::{Storage, StorageRegistry, default_storage_registry};
use crate::value::Value;

struct RootShared {
    locator: String,
    format: Arc<dyn Format>,
    storage: Arc<dyn Storage>,
    on_changed: Option<ChangeHook>,
    before_save: Option<SaveHook>,
    state: RefCell<PersistState>,
}

/// A mapping bound to a backing store.
///
/// Dereferences to [`ObservableMapping`], so every read and mutation of a
/// plain observable mapping is available. Cloning the handle shares the
/// same root.
#[derive(Clone)]
pub struct PersistentRoot {
    mapping: ObservableMapping,
    shared: Rc<RootShared>,
}

impl PersistentRoot {
    /// Open a root with the built-in formats and storages.
    pub fn open(options: RootOptions) -> Result<Self> {
        Self::open_with(
            options,
            default_format_registry(),
            default_storage_registry(),
        )
    }

    /// Open a root, resolving format and storage names in the given
    /// registries.
    pub fn open_with(
        options: RootOptions,
        formats: &FormatRegistry,
        storages: &StorageRegistry,
    ) -> Result<Self> {
        let (locator, parser, storage_name) = options.resolve_names();
        let format = formats.get(&parser)?;
        let storage = storages.get(&storage_name)?;

        let seed = if storage.is_durable() {
            !storage.exists(&locator)?
        } else {
            true
        };
        if seed {
            let default = Value::from(options.default_value);
            storage.write(&locator, format.dump(&default)?)?;
            tracing::info!(
                "Seeded {} configuration at {} with default value",
                storage.name(),
                locator
            );
        }

        let plain = format.load(storage.read(&locator)?)?;
        let serde_json::Value::Object(entries) = plain else {
            return Err(StoreError::InvalidRoot { locator });
        };

        let shared = Rc::new(RootShared {
            locator,
            format,
            storage,
            on_changed: options.on_changed,
            before_save: options.before_save,
            state: RefCell::new(PersistState::new()),
        });
        let mapping = ObservableMapping::from_map(entries, Self::change_handler(&shared));
        mapping.pin();

        tracing::info!(
            "Opened configuration at {} ({}, {})",
            shared.locator,
            shared.format.name(),
            shared.storage.name()
        );
        Ok(Self { mapping, shared })
    }

    /// Handler wired into the root mapping.
    fn change_handler(shared: &Rc<RootShared>) -> ChangeHandler {
        let weak = Rc::downgrade(shared);
        Rc::new(move |changed: &Container| {
            let (Some(shared), Container::Mapping(mapping)) = (weak.upgrade(), changed) else {
                return Ok(());
            };
            PersistentRoot {
                mapping: mapping.clone(),
                shared,
            }
            .handle_change()
        })
    }

    fn handle_change(&self) -> Result<()> {
        if !self.shared.state.borrow().is_bound() {
            tracing::trace!("Ignoring change to {} while unbound", self.shared.locator);
            return Ok(());
        }
        self.shared.state.borrow_mut().mark_pending();

        if let Some(hook) = &self.shared.on_changed {
            hook(self);
        }
        if let Some(hook) = &self.shared.before_save
            && hook(self) == SaveDecision::Veto
        {
            tracing::debug!("Save of {} vetoed", self.shared.locator);
            return Ok(());
        }

        self.save()
    }

    /// Write the whole structure now, without consulting the hooks.
    pub fn save(&self) -> Result<()> {
        let raw = self
            .shared
            .format
            .dump(&Value::Mapping(self.mapping.clone()))?;
        self.shared.storage.write(&self.shared.locator, raw)?;
        self.shared.state.borrow_mut().save_complete();
        tracing::debug!("Saved configuration to {}", self.shared.locator);
        Ok(())
    }

    /// Stop reacting to changes.
    pub fn unbind(&self) {
        self.shared.state.borrow_mut().unbind();
    }

    /// React to changes again, and run one change cycle for everything
    /// that happened while unbound.
    pub fn rebind(&self) -> Result<()> {
        self.shared.state.borrow_mut().bind();
        self.handle_change()
    }

    /// Unbind until the returned guard is finished or dropped.
    pub fn bind_guard(&self) -> BindGuard<'_> {
        BindGuard::new(self)
    }

    /// Run `f` unbound, then rebind (one write for all changes in `f`).
    ///
    /// Unlike [`ObservableMapping::batch`], which only defers the mapping's
    /// notification, the hooks are not called for changes made inside `f`.
    pub fn bulk<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        let guard = self.bind_guard();
        let result = f(self);
        let rebound = guard.finish();
        let value = result?;
        rebound?;
        Ok(value)
    }

    /// Unbind and drop this handle.
    pub fn release(self) {
        self.unbind();
        tracing::debug!("Released configuration at {}", self.shared.locator);
    }

    pub fn is_bound(&self) -> bool {
        self.shared.state.borrow().is_bound()
    }

    /// True while a change has not been written (for instance after a
    /// veto).
    pub fn has_pending_changes(&self) -> bool {
        self.shared.state.borrow().is_pending()
    }

    /// Writes completed since the root was opened (seeding excluded).
    pub fn save_count(&self) -> u64 {
        self.shared.state.borrow().save_count()
    }

    pub fn locator(&self) -> &str {
        &self.shared.locator
    }

    pub fn format_name(&self) -> &'static str {
        self.shared.format.name()
    }

    pub fn storage_name(&self) -> &'static str {
        self.shared.storage.name()
    }

    pub fn mapping(&self) -> &ObservableMapping {
        &self.mapping
    }
}

impl Deref for PersistentRoot {
    type Target = ObservableMapping;

    fn deref(&self) -> &ObservableMapping {
        &self.mapping
    }
}

impl fmt::Debug for PersistentRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistentRoot")
            .field("locator", &self.shared.locator)
            .field("format", &self.shared.format.name())
            .field("storage", &self.shared.storage.name())
            .field("state", &*self.shared.state.borrow())
            .field("entries", &self.mapping)
            .finish()
    }
}
