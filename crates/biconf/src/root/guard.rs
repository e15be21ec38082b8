//! Scoped unbinding of a persistent root.

use super::PersistentRoot;
use crate::error::Result;

/// RAII guard that keeps a root unbound while it lives.
///
/// Changes made while the guard is alive are kept in memory only. Closing
/// the guard rebinds the root and writes the whole structure once. Use
/// [`finish`](Self::finish) to observe a failed write; a guard that is
/// simply dropped logs the failure instead.
#[must_use = "dropping the guard immediately rebinds the root"]
pub struct BindGuard<'a> {
    root: &'a PersistentRoot,
    finished: bool,
}

impl<'a> BindGuard<'a> {
    pub(crate) fn new(root: &'a PersistentRoot) -> Self {
        root.unbind();
        Self {
            root,
            finished: false,
        }
    }

    /// The guarded root.
    pub fn root(&self) -> &PersistentRoot {
        self.root
    }

    /// Rebind the root and write it.
    pub fn finish(mut self) -> Result<()> {
        self.finished = true;
        self.root.rebind()
    }
}

impl Drop for BindGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Err(e) = self.root.rebind() {
            tracing::warn!(
                "Failed to write configuration to {} on rebind: {}",
                self.root.locator(),
                e
            );
        }
    }
}
