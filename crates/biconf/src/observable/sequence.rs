//! Observable ordered sequence.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::ser::{Serialize, SerializeSeq, Serializer};

use super::wiring::{self, ChangeHandler, Container, Notifier};
use crate::error::{Result, StoreError};
use crate::value::Value;

struct SequenceInner {
    items: Vec<Value>,
    notifier: Notifier,
}

/// A sequence that notifies its handler after every mutation.
#[derive(Clone)]
pub struct ObservableSequence {
    inner: Rc<RefCell<SequenceInner>>,
}

impl ObservableSequence {
    /// Create an empty, detached sequence.
    pub fn new() -> Self {
        Self::from_vec(Vec::new(), wiring::noop_handler())
    }

    /// Wrap a plain sequence, calling `on_changed` after every mutation of
    /// the sequence or of anything nested inside it.
    pub fn with_handler<F>(items: Vec<serde_json::Value>, on_changed: F) -> Self
    where
        F: Fn(&Container) -> Result<()> + 'static,
    {
        Self::from_vec(items, Rc::new(on_changed))
    }

    pub(crate) fn from_vec(items: Vec<serde_json::Value>, handler: ChangeHandler) -> Self {
        let sequence = Self {
            inner: Rc::new(RefCell::new(SequenceInner {
                items: Vec::with_capacity(items.len()),
                notifier: Notifier::new(handler),
            })),
        };
        let forward = sequence.forwarder();
        let wrapped: Vec<Value> = items
            .into_iter()
            .map(|plain| wiring::wrap(plain, &forward))
            .collect();
        sequence.inner.borrow_mut().items = wrapped;
        sequence
    }

    pub(crate) fn forwarder(&self) -> ChangeHandler {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |_child: &Container| match weak.upgrade() {
            Some(inner) => ObservableSequence { inner }.notify(),
            None => Ok(()),
        })
    }

    pub(crate) fn set_handler(&self, handler: ChangeHandler) {
        self.inner.borrow_mut().notifier.replace(handler);
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.inner.borrow().notifier.is_pinned()
    }

    fn accept(&self, value: &Value) -> Result<()> {
        wiring::check_insertable(&Container::Sequence(self.clone()), value)
    }

    /// Invoke this sequence's handler with itself.
    pub fn notify(&self) -> Result<()> {
        let handler = self.inner.borrow_mut().notifier.dispatch();
        match handler {
            Some(handler) => handler(&Container::Sequence(self.clone())),
            None => Ok(()),
        }
    }

    pub fn ptr_eq(&self, other: &ObservableSequence) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    // -------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------

    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.borrow().items.get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.inner.borrow().items.contains(value)
    }

    /// Snapshot of the items in order.
    pub fn to_vec(&self) -> Vec<Value> {
        self.inner.borrow().items.clone()
    }

    /// Deep copy as a plain JSON value.
    pub fn to_plain(&self) -> serde_json::Value {
        serde_json::Value::Array(self.inner.borrow().items.iter().map(Value::to_plain).collect())
    }

    // -------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------

    /// Replace the item at `index`, returning the old item.
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        self.check_index(index, false)?;
        self.accept(&value)?;
        wiring::adopt(&value, self.forwarder());
        let old = std::mem::replace(&mut self.inner.borrow_mut().items[index], value);
        if !self.holds(&old) {
            wiring::detach(&old);
        }
        self.notify()?;
        Ok(old)
    }

    /// Delete the item at `index`.
    pub fn remove_at(&self, index: usize) -> Result<Value> {
        self.check_index(index, false)?;
        let removed = self.inner.borrow_mut().items.remove(index);
        if !self.holds(&removed) {
            wiring::detach(&removed);
        }
        self.notify()?;
        Ok(removed)
    }

    pub fn push(&self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.accept(&value)?;
        wiring::adopt(&value, self.forwarder());
        self.inner.borrow_mut().items.push(value);
        self.notify()
    }

    /// Insert before `index`; `index == len` appends.
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.check_index(index, true)?;
        self.accept(&value)?;
        wiring::adopt(&value, self.forwarder());
        self.inner.borrow_mut().items.insert(index, value);
        self.notify()
    }

    pub fn clear(&self) -> Result<()> {
        let removed = std::mem::take(&mut self.inner.borrow_mut().items);
        removed.iter().for_each(wiring::detach);
        self.notify()
    }

    /// Remove the first item equal to `value`.
    pub fn remove_value(&self, value: &Value) -> Result<()> {
        let position = self.inner.borrow().items.iter().position(|v| v == value);
        let index = position.ok_or_else(|| StoreError::ValueNotFound {
            value: value.to_string(),
        })?;
        let removed = self.inner.borrow_mut().items.remove(index);
        if !self.holds(&removed) {
            wiring::detach(&removed);
        }
        self.notify()
    }

    /// Remove and return the last item.
    pub fn pop(&self) -> Result<Value> {
        let popped = self.inner.borrow_mut().items.pop();
        let popped = popped.ok_or(StoreError::EmptyContainer)?;
        if !self.holds(&popped) {
            wiring::detach(&popped);
        }
        self.notify()?;
        Ok(popped)
    }

    pub fn reverse(&self) -> Result<()> {
        self.inner.borrow_mut().items.reverse();
        self.notify()
    }

    /// Run `f` with this sequence's notifications suppressed, then notify
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

    fn check_index(&self, index: usize, allow_end: bool) -> Result<()> {
        let len = self.len();
        if index < len || (allow_end && index == len) {
            Ok(())
        } else {
            Err(StoreError::IndexOutOfRange { index, len })
        }
    }

    fn holds(&self, value: &Value) -> bool {
        self.inner
            .borrow()
            .items
            .iter()
            .any(|v| v.same_container(value))
    }
}

impl Default for ObservableSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ObservableSequence {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.inner.borrow().items == other.inner.borrow().items
    }
}

impl fmt::Debug for ObservableSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.borrow().items.iter()).finish()
    }
}

impl Serialize for ObservableSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let inner = self.inner.borrow();
        let mut seq = serializer.serialize_seq(Some(inner.items.len()))?;
        for item in &inner.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}
