//! Selection of result positions for download.
//!
//! Besides membership, the manager keeps an ordering log: the sequence in
//! which positions were added. Archive entries are numbered by this log, not
//! by position, so selecting `[2, 0]` puts position 2 in `image1`.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

/// Result of toggling a single position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Selection mode is off or the position is out of range
    Ignored,
}

/// Snapshot of the selection, for display and serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub active: bool,
    /// Selected positions in the order they were added
    pub order: Vec<usize>,
}

/// Tracks which positions of the current result set are marked for download
#[derive(Debug, Default)]
pub struct SelectionManager {
    active: bool,
    members: HashSet<usize>,
    order: Vec<usize>,
    /// Length of the result set the selection refers to
    bound: usize,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Selected positions in ordering-log sequence
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.members.contains(&index)
    }

    pub fn state(&self) -> SelectionState {
        SelectionState {
            active: self.active,
            order: self.order.clone(),
        }
    }

    /// Flip selection mode. Turning it off always drops the selection.
    pub fn toggle_mode(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            self.clear();
        }
        debug!(active = self.active, "selection mode toggled");
        self.active
    }

    /// Add or remove `index` from the selection
    pub fn toggle_item(&mut self, index: usize) -> ToggleOutcome {
        if !self.active || index >= self.bound {
            debug!(index, active = self.active, bound = self.bound, "toggle ignored");
            return ToggleOutcome::Ignored;
        }
        if self.members.remove(&index) {
            self.order.retain(|&i| i != index);
            ToggleOutcome::Removed
        } else {
            self.members.insert(index);
            self.order.push(index);
            ToggleOutcome::Added
        }
    }

    /// Re-target the selection at a freshly published result set of `len` items.
    ///
    /// Selection mode is kept; the selected positions are not.
    pub fn reset(&mut self, len: usize) {
        self.clear();
        self.bound = len;
    }

    fn clear(&mut self) {
        self.members.clear();
        self.order.clear();
    }
}
