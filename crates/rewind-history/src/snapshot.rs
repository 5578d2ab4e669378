//! Cursor-addressed snapshot log.
//!
//! A [`SnapshotLog`] is an ordered sequence of owned values plus a cursor
//! that separates the undoable past (`..cursor`) from the redoable future
//! (`cursor..`). The cursor may equal `len()`, the *live* position: nothing
//! is left to redo and the value outside the log is authoritative.
//!
//! ```text
//!   snapshots:  [ s0 | s1 | s2 | s3 ]
//!   cursor:                 ^            undo delivers s1, redo delivers s2
//!   live:                           ^    cursor == len()
//! ```
//!
//! Every operation that cannot apply returns `false` (or `None`) and leaves
//! the log untouched.

/// Ordered, append-only history of values with an undo/redo cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLog<T> {
    snapshots: Vec<T>,
    cursor: usize,
}

impl<T> Default for SnapshotLog<T> {
    fn default() -> Self {
        Self {
            snapshots: Vec::new(),
            cursor: 0,
        }
    }
}

impl<T> SnapshotLog<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
            cursor: 0,
        }
    }

    /// Record `value` as the newest snapshot.
    ///
    /// Everything from the cursor forward is discarded first, so a store after
    /// one or more undos makes the undone snapshots unreachable.
    pub fn store(&mut self, value: T) -> bool {
        self.snapshots.truncate(self.cursor);
        self.snapshots.push(value);
        self.cursor = self.snapshots.len();
        self.check();
        true
    }

    /// Append `value` without moving the cursor.
    ///
    /// Only permitted at the live cursor. Afterwards the appended value is
    /// the redo target.
    pub fn store_back(&mut self, value: T) -> bool {
        debug_assert!(
            self.has_live_value_cursor(),
            "store_back requires the live cursor ({} of {})",
            self.cursor,
            self.snapshots.len()
        );
        if !self.has_live_value_cursor() {
            return false;
        }

        self.snapshots.push(value);
        self.check();
        true
    }

    /// Step back one snapshot and hand it to `output`.
    ///
    /// When leaving the live cursor of a non-empty log, `on_first_undo` runs
    /// first and can veto the step by returning `false`.
    pub fn undo(&mut self, output: impl FnOnce(&T), on_first_undo: impl FnOnce() -> bool) -> bool {
        if self.has_live_value_cursor() && !self.snapshots.is_empty() && !on_first_undo() {
            return false;
        }
        if !self.can_undo() {
            return false;
        }

        self.cursor -= 1;
        output(&self.snapshots[self.cursor]);
        self.check();
        true
    }

    /// Hand the snapshot at the cursor to `output` and step forward.
    ///
    /// When the step reaches the live cursor, `on_last_redo` runs first and
    /// can veto it by returning `false`.
    pub fn redo(&mut self, output: impl FnOnce(&T), on_last_redo: impl FnOnce() -> bool) -> bool {
        if !self.can_redo() {
            return false;
        }
        if self.cursor + 1 == self.snapshots.len() && !on_last_redo() {
            return false;
        }

        output(&self.snapshots[self.cursor]);
        self.cursor += 1;
        self.check();
        true
    }

    /// Drop everything above the cursor without appending.
    pub fn truncate(&mut self) -> bool {
        if !self.can_truncate() {
            return false;
        }

        self.snapshots.truncate(self.cursor);
        self.check();
        true
    }

    /// Remove the most recently appended snapshot.
    ///
    /// With `update_cursor` a cursor that pointed past the removed value is
    /// pulled back to the new end. Without it, the pop is refused when the
    /// cursor would end up out of range.
    pub fn pop_back(&mut self, update_cursor: bool) -> Option<T> {
        let new_len = self.snapshots.len().checked_sub(1)?;
        if self.cursor > new_len {
            if !update_cursor {
                return None;
            }
            self.cursor = new_len;
        }

        let value = self.snapshots.pop();
        self.check();
        value
    }

    /// Forget the `count` oldest snapshots, shifting the cursor with them.
    ///
    /// Returns how many snapshots were dropped.
    pub fn trim_front(&mut self, count: usize) -> usize {
        let count = count.min(self.snapshots.len());
        self.snapshots.drain(..count);
        self.cursor = self.cursor.saturating_sub(count);
        self.check();
        count
    }

    /// Empty the log and reset the cursor.
    pub fn clear(&mut self) -> bool {
        self.snapshots.clear();
        self.cursor = 0;
        true
    }

    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.snapshots.len()
    }

    #[must_use]
    pub fn can_truncate(&self) -> bool {
        self.cursor < self.snapshots.len()
    }

    /// Whether the cursor sits past the last snapshot.
    #[must_use]
    pub fn has_live_value_cursor(&self) -> bool {
        self.cursor == self.snapshots.len()
    }

    /// Whether the cursor sits before the first snapshot.
    #[must_use]
    pub const fn has_default_cursor(&self) -> bool {
        self.cursor == 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn get_snapshot(&self, index: usize) -> Option<&T> {
        self.snapshots.get(index)
    }

    /// The snapshot at the cursor, i.e. the next redo target.
    #[must_use]
    pub fn get_active_snapshot(&self) -> Option<&T> {
        self.get_snapshot(self.cursor)
    }

    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.snapshots.last()
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.snapshots.iter()
    }

    fn check(&self) {
        debug_assert!(
            self.cursor <= self.snapshots.len(),
            "cursor {} out of range 0..={}",
            self.cursor,
            self.snapshots.len()
        );
    }
}

impl<T: Clone> SnapshotLog<T> {
    /// Record a copy of `value`.
    pub fn store_cloned(&mut self, value: &T) -> bool {
        self.store(value.clone())
    }

    /// Undo into an existing value by copy-assignment.
    pub fn undo_into(&mut self, target: &mut T) -> bool {
        self.undo(|snapshot| target.clone_from(snapshot), || true)
    }

    /// Redo into an existing value by copy-assignment.
    pub fn redo_into(&mut self, target: &mut T) -> bool {
        self.redo(|snapshot| target.clone_from(snapshot), || true)
    }
}
