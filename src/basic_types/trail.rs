use std::iter::Rev;
use std::ops::Deref;
use std::vec::Drain;

/// A growing log of state changes, segmented by decision level.
///
/// Backtracking drains the entries recorded past the target level in reverse
/// order so the caller can undo them one by one.
#[derive(Clone, Debug)]
pub(crate) struct Trail<T> {
    current_level: usize,
    /// At index i is the position where the i-th decision level ends (exclusive) on the trail.
    delimiters: Vec<usize>,
    entries: Vec<T>,
}

impl<T> Default for Trail<T> {
    fn default() -> Self {
        Trail {
            current_level: 0,
            delimiters: Vec::default(),
            entries: Vec::default(),
        }
    }
}

impl<T> Trail<T> {
    pub(crate) fn new_level(&mut self) {
        self.current_level += 1;
        self.delimiters.push(self.entries.len());
    }

    pub(crate) fn level(&self) -> usize {
        self.current_level
    }

    pub(crate) fn push(&mut self, entry: T) {
        self.entries.push(entry);
    }

    /// Backtrack to `target_level`, yielding the undone entries newest first.
    pub(crate) fn synchronise(&mut self, target_level: usize) -> Rev<Drain<'_, T>> {
        debug_assert!(target_level < self.current_level);

        let new_len = self.delimiters[target_level];

        self.current_level = target_level;
        self.delimiters.truncate(target_level);
        self.entries.drain(new_len..).rev()
    }
}

impl<T> Deref for Trail<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}
