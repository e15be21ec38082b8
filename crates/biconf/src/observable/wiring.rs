//! Change propagation between nested containers.
//!
//! Every container owns exactly one [`ChangeHandler`]. A child's handler is
//! the *forwarder* of its parent: a closure built once, at wrap time, that
//! holds a weak reference to the parent and notifies the parent's own
//! handler with the parent itself. Whatever the nesting depth, the root's
//! handler is therefore called once per mutating operation, with the root
//! as argument.

use std::rc::Rc;

use super::{ObservableMapping, ObservableSequence};
use crate::error::{Result, StoreError};
use crate::value::Value;

/// Callback invoked after a container has been mutated.
///
/// The argument is the container whose handler fired. Errors returned by
/// the handler (typically a failed write at the root) propagate to the
/// mutating call.
pub type ChangeHandler = Rc<dyn Fn(&Container) -> Result<()>>;

/// Handler used by detached containers.
pub fn noop_handler() -> ChangeHandler {
    Rc::new(|_| Ok(()))
}

/// Handle to either kind of observable container.
#[derive(Debug, Clone)]
pub enum Container {
    Mapping(ObservableMapping),
    Sequence(ObservableSequence),
}

impl Container {
    /// Invoke the container's own handler with itself.
    pub fn notify(&self) -> Result<()> {
        match self {
            Self::Mapping(mapping) => mapping.notify(),
            Self::Sequence(sequence) => sequence.notify(),
        }
    }

    /// Replace the container's handler. Has no effect on a root mapping.
    pub fn set_handler(&self, handler: ChangeHandler) {
        match self {
            Self::Mapping(mapping) => mapping.set_handler(handler),
            Self::Sequence(sequence) => sequence.set_handler(handler),
        }
    }

    /// True when both handles point at the same container.
    pub fn ptr_eq(&self, other: &Container) -> bool {
        match (self, other) {
            (Self::Mapping(a), Self::Mapping(b)) => a.ptr_eq(b),
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    pub fn as_mapping(&self) -> Option<&ObservableMapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            Self::Sequence(_) => None,
        }
    }

    pub fn to_plain(&self) -> serde_json::Value {
        match self {
            Self::Mapping(mapping) => mapping.to_plain(),
            Self::Sequence(sequence) => sequence.to_plain(),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Mapping(mapping) => Value::Mapping(mapping),
            Self::Sequence(sequence) => Value::Sequence(sequence),
        }
    }
}

impl From<ObservableMapping> for Container {
    fn from(mapping: ObservableMapping) -> Self {
        Self::Mapping(mapping)
    }
}

impl From<ObservableSequence> for Container {
    fn from(sequence: ObservableSequence) -> Self {
        Self::Sequence(sequence)
    }
}

/// Per-container notification state: the handler plus batch bookkeeping.
///
/// A pinned notifier keeps its handler for good; roots pin theirs so that
/// persistence cannot be rewired away.
pub(crate) struct Notifier {
    handler: ChangeHandler,
    pinned: bool,
    batch_depth: usize,
    deferred: bool,
}

impl Notifier {
    pub(crate) fn new(handler: ChangeHandler) -> Self {
        Self {
            handler,
            pinned: false,
            batch_depth: 0,
            deferred: false,
        }
    }

    pub(crate) fn replace(&mut self, handler: ChangeHandler) {
        if !self.pinned {
            self.handler = handler;
        }
    }

    pub(crate) fn pin(&mut self) {
        self.pinned = true;
    }

    pub(crate) fn is_pinned(&self) -> bool {
        self.pinned
    }

    /// Handler to call for a change, or `None` while a batch is open.
    pub(crate) fn dispatch(&mut self) -> Option<ChangeHandler> {
        if self.batch_depth > 0 {
            self.deferred = true;
            None
        } else {
            Some(Rc::clone(&self.handler))
        }
    }

    pub(crate) fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close one batch level. Returns true when the outermost batch closed
    /// and at least one change was deferred.
    pub(crate) fn end_batch(&mut self) -> bool {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            std::mem::take(&mut self.deferred)
        } else {
            false
        }
    }
}

/// Convert a plain value into a store value, promoting mappings and
/// sequences to observable containers whose handler is `handler`.
pub(crate) fn wrap(plain: serde_json::Value, handler: &ChangeHandler) -> Value {
    match plain {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Object(map) => {
            Value::Mapping(ObservableMapping::from_map(map, Rc::clone(handler)))
        }
        serde_json::Value::Array(items) => {
            Value::Sequence(ObservableSequence::from_vec(items, Rc::clone(handler)))
        }
    }
}

/// Rewire a value that is being placed into a container.
///
/// Containers are already observable and are never wrapped twice; only
/// their handler is replaced so it points at the new parent.
pub(crate) fn adopt(value: &Value, handler: ChangeHandler) {
    match value {
        Value::Mapping(mapping) => mapping.set_handler(handler),
        Value::Sequence(sequence) => sequence.set_handler(handler),
        _ => {}
    }
}

/// Refuse values that must not be placed into `parent`: a root mapping, or
/// a container that is `parent` itself or holds it somewhere below.
pub(crate) fn check_insertable(parent: &Container, value: &Value) -> Result<()> {
    let pinned = match value {
        Value::Mapping(mapping) => mapping.is_pinned(),
        Value::Sequence(sequence) => sequence.is_pinned(),
        _ => return Ok(()),
    };
    if pinned {
        return Err(StoreError::RootNotInsertable);
    }
    if reaches(value, parent) {
        return Err(StoreError::CircularReference);
    }
    Ok(())
}

/// True when `target` is `value` or nested anywhere inside it.
fn reaches(value: &Value, target: &Container) -> bool {
    match value {
        Value::Mapping(mapping) => {
            target.as_mapping().is_some_and(|t| t.ptr_eq(mapping))
                || mapping.values().iter().any(|child| reaches(child, target))
        }
        Value::Sequence(sequence) => {
            matches!(target, Container::Sequence(t) if t.ptr_eq(sequence))
                || sequence.to_vec().iter().any(|child| reaches(child, target))
        }
        _ => false,
    }
}

/// Cut a value that left its container loose from the old parent.
pub(crate) fn detach(value: &Value) {
    adopt(value, noop_handler());
}
