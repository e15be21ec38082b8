//! Bind and pending-change tracking for a persistent root.

/// Tracks whether a root reacts to changes and whether the backing store
/// is behind the in-memory structure.
#[derive(Debug, Clone)]
pub struct PersistState {
    /// Whether notifications trigger a save.
    bound: bool,

    /// Whether a change has not reached storage yet.
    pending: bool,

    /// Completed writes since the root was opened.
    saves: u64,
}

impl Default for PersistState {
    fn default() -> Self {
        Self::new()
    }
}

impl PersistState {
    /// A bound state with nothing pending.
    pub fn new() -> Self {
        Self {
            bound: true,
            pending: false,
            saves: 0,
        }
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    #[inline]
    pub fn save_count(&self) -> u64 {
        self.saves
    }

    pub fn bind(&mut self) {
        self.bound = true;
    }

    pub fn unbind(&mut self) {
        self.bound = false;
    }

    /// Record a change that storage has not seen yet.
    pub fn mark_pending(&mut self) {
        self.pending = true;
    }

    /// Record a successful write.
    pub fn save_complete(&mut self) {
        self.pending = false;
        self.saves += 1;
    }
}
