//! Observable string-keyed mapping.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::wiring::{self, ChangeHandler, Container, Notifier};
use crate::error::{Result, StoreError};
use crate::value::Value;

struct MappingInner {
    entries: BTreeMap<String, Value>,
    notifier: Notifier,
}

/// A mapping that notifies its handler after every mutation.
///
/// Cloning the handle shares the same mapping. Mapping and sequence values
/// inserted into it are rewired so their changes reach this mapping's
/// handler.
#[derive(Clone)]
pub struct ObservableMapping {
    inner: Rc<RefCell<MappingInner>>,
}

impl ObservableMapping {
    /// Create an empty, detached mapping.
    pub fn new() -> Self {
        Self::from_map(serde_json::Map::new(), wiring::noop_handler())
    }

    /// Wrap a plain mapping, calling `on_changed` after every mutation of
    /// the mapping or of anything nested inside it.
    pub fn with_handler<F>(entries: serde_json::Map<String, serde_json::Value>, on_changed: F) -> Self
    where
        F: Fn(&Container) -> Result<()> + 'static,
    {
        Self::from_map(entries, Rc::new(on_changed))
    }

    pub(crate) fn from_map(
        entries: serde_json::Map<String, serde_json::Value>,
        handler: ChangeHandler,
    ) -> Self {
        let mapping = Self {
            inner: Rc::new(RefCell::new(MappingInner {
                entries: BTreeMap::new(),
                notifier: Notifier::new(handler),
            })),
        };
        let forward = mapping.forwarder();
        let wrapped: BTreeMap<String, Value> = entries
            .into_iter()
            .map(|(key, plain)| (key, wiring::wrap(plain, &forward)))
            .collect();
        mapping.inner.borrow_mut().entries = wrapped;
        mapping
    }

    /// Handler given to children: notifies this mapping's own handler with
    /// this mapping.
    pub(crate) fn forwarder(&self) -> ChangeHandler {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |_child: &Container| match weak.upgrade() {
            Some(inner) => ObservableMapping { inner }.notify(),
            None => Ok(()),
        })
    }

    pub(crate) fn set_handler(&self, handler: ChangeHandler) {
        self.inner.borrow_mut().notifier.replace(handler);
    }

    pub(crate) fn pin(&self) {
        self.inner.borrow_mut().notifier.pin();
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.inner.borrow().notifier.is_pinned()
    }

    fn accept(&self, value: &Value) -> Result<()> {
        wiring::check_insertable(&Container::Mapping(self.clone()), value)
    }

    /// Invoke this mapping's handler with itself.
    ///
    /// Deferred while a [`batch`](Self::batch) is open.
    pub fn notify(&self) -> Result<()> {
        let handler = self.inner.borrow_mut().notifier.dispatch();
        match handler {
            Some(handler) => handler(&Container::Mapping(self.clone())),
            None => Ok(()),
        }
    }

    /// True when both handles point at the same mapping.
    pub fn ptr_eq(&self, other: &ObservableMapping) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Field-style access: like [`get`](Self::get), but a missing key is an
    /// error.
    pub fn field(&self, name: &str) -> Result<Value> {
        self.get(name).ok_or_else(|| StoreError::NoSuchAttribute {
            name: name.to_string(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().entries.keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.inner.borrow().entries.values().cloned().collect()
    }

    /// Snapshot of all entries in key order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Deep copy as a plain JSON value.
    pub fn to_plain(&self) -> serde_json::Value {
        let inner = self.inner.borrow();
        serde_json::Value::Object(
            inner
                .entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_plain()))
                .collect(),
        )
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Set `key` to `value`, returning the previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<Option<Value>> {
        let value = value.into();
        self.accept(&value)?;
        wiring::adopt(&value, self.forwarder());
        let previous = self.inner.borrow_mut().entries.insert(key.into(), value);
        if let Some(old) = &previous {
            self.release_replaced(old);
        }
        self.notify()?;
        Ok(previous)
    }

    /// Delete `key`, returning its value.
    pub fn remove(&self, key: &str) -> Result<Value> {
        let removed = self.inner.borrow_mut().entries.remove(key);
        let removed = removed.ok_or_else(|| StoreError::KeyNotFound {
            key: key.to_string(),
        })?;
        self.release_replaced(&removed);
        self.notify()?;
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        let removed = std::mem::take(&mut self.inner.borrow_mut().entries);
        removed.values().for_each(wiring::detach);
        self.notify()
    }

    /// Return the value under `key`, inserting `default` if it is absent.
    ///
    /// A scalar default is stored with [`set`](Self::set) right away. A
    /// mapping or sequence default is placed under `key` without notifying;
    /// the first change made inside it stores it through `set`, which
    /// notifies once and rewires it to this mapping.
    pub fn get_set(&self, key: &str, default: impl Into<Value>) -> Result<Value> {
        if let Some(existing) = self.get(key) {
            return Ok(existing);
        }

        let default = default.into();
        if !default.is_container() {
            self.set(key, default.clone())?;
            return Ok(default);
        }

        self.accept(&default)?;
        wiring::adopt(&default, self.materializer(key));
        self.inner
            .borrow_mut()
            .entries
            .insert(key.to_string(), default.clone());
        Ok(default)
    }

    /// Run `f` with this mapping's notifications suppressed, then notify
    /// once if anything changed.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> Result<R>) -> Result<R> {
        self.inner.borrow_mut().notifier.begin_batch();
        let result = f(self);
        let flush = self.inner.borrow_mut().notifier.end_batch();
        let flushed = if flush { self.notify() } else { Ok(()) };
        let value = result?;
        flushed?;
        Ok(value)
    }

    /// One-shot handler for a `get_set` default: stores the default under
    /// `key` on its first change.
    fn materializer(&self, key: &str) -> ChangeHandler {
        let weak = Rc::downgrade(&self.inner);
        let key = key.to_string();
        Rc::new(move |changed: &Container| match weak.upgrade() {
            Some(inner) => ObservableMapping { inner }
                .set(key.clone(), changed.clone().into_value())
                .map(|_| ()),
            None => Ok(()),
        })
    }

    /// Detach a value that left this mapping unless another key still holds
    /// it.
    fn release_replaced(&self, old: &Value) {
        let still_present = self
            .inner
            .borrow()
            .entries
            .values()
            .any(|v| v.same_container(old));
        if !still_present {
            wiring::detach(old);
        }
    }
}

impl Default for ObservableMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ObservableMapping {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.borrow().entries == other.inner.borrow().entries
    }
}

impl fmt::Debug for ObservableMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.inner.borrow().entries.iter())
            .finish()
    }
}

impl Serialize for ObservableMapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let inner = self.inner.borrow();
        let mut map = serializer.serialize_map(Some(inner.entries.len()))?;
        for (key, value) in &inner.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
