use tracing::{debug, warn};

use crate::{MergeChange, MergeConflict};

/// Receives every change and conflict of a merge.
pub trait MergeEventListener {
    fn change(&mut self, change: MergeChange);
    fn conflict(&mut self, conflict: MergeConflict);
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingListener {
    pub changes: Vec<MergeChange>,
    pub conflicts: Vec<MergeConflict>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

impl MergeEventListener for CollectingListener {
    fn change(&mut self, change: MergeChange) {
        self.changes.push(change);
    }

    fn conflict(&mut self, conflict: MergeConflict) {
        self.conflicts.push(conflict);
    }
}

/// Logs events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl MergeEventListener for TracingListener {
    fn change(&mut self, change: MergeChange) {
        debug!("{:?} by {:?} at {}", change.kind, change.side, change.path);
    }

    fn conflict(&mut self, conflict: MergeConflict) {
        warn!(
            "{:?} conflict at {}, kept {:?}",
            conflict.kind, conflict.path, conflict.winner
        );
    }
}
