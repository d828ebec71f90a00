//! Snapshot-based linear undo/redo
//!
//! `history` holds past states with the most recent last; `future` holds
//! undone states with the most recent first. Recording a new state clears
//! `future`.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct History<S> {
    history: VecDeque<S>,
    future: VecDeque<S>,
    /// Maximum number of past snapshots; `None` keeps everything
    capacity: Option<usize>,
}

impl<S> Default for History<S> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<S> History<S> {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            history: VecDeque::new(),
            future: VecDeque::new(),
            capacity,
        }
    }

    /// Push the state as it was before a mutation and drop the redo chain.
    ///
    /// When over capacity the oldest snapshot is evicted.
    pub fn record(&mut self, before: S) {
        self.history.push_back(before);
        self.future.clear();
        if let Some(capacity) = self.capacity {
            while self.history.len() > capacity {
                self.history.pop_front();
            }
        }
    }

    /// Restore the most recent past state into `current`
    pub fn undo(&mut self, current: &mut S) -> bool {
        let Some(previous) = self.history.pop_back() else {
            return false;
        };
        let replaced = std::mem::replace(current, previous);
        self.future.push_front(replaced);
        true
    }

    /// Re-apply the most recently undone state into `current`
    pub fn redo(&mut self, current: &mut S) -> bool {
        let Some(next) = self.future.pop_front() else {
            return false;
        };
        let replaced = std::mem::replace(current, next);
        self.history.push_back(replaced);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.future.clear();
    }
}
