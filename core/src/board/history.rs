//! Linear undo/redo history over board snapshots.
//!
//! Classic two-stack discipline: recording a new state clears the redo
//! stack, so there is no branching. The caller supplies the current capture
//! on undo/redo and applies the returned snapshot itself; this keeps the
//! history free of any borrow on the board.

use crate::board::snapshot::Snapshot;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Record `state` and clear the redo stack. A state equal to the top of
    /// the undo stack is dropped, so no-op gestures do not pollute history.
    pub fn push(&mut self, state: Snapshot) {
        if self.undo_stack.last() == Some(&state) {
            return;
        }
        debug!(depth = self.undo_stack.len() + 1, "history push");
        self.undo_stack.push(state);
        self.redo_stack.clear();
    }

    /// Pop the most recent undo entry and return the snapshot the caller
    /// should restore, pushing `current` onto the redo stack. Returns `None`
    /// when the stack is empty or the entry equals `current` (nothing to
    /// restore; the entry is consumed either way).
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let target = self.undo_stack.pop()?;
        if target == current {
            return None;
        }
        self.redo_stack.push(current);
        Some(target)
    }

    /// Pop the most recent redo entry and return the snapshot to restore,
    /// pushing `current` onto the undo stack.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let target = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(target)
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    #[cfg(test)]
    pub(crate) fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}
