//! Events the history plugin reacts to.

use crate::entry::HistoryEntry;

/// Tracking boundary: drain all change marks into one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnDeltaSnapshot {
    /// Unix timestamp in milliseconds recorded on the entry.
    pub timestamp: u64,
}

/// Revert the newest history entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UndoCommand;

/// Re-apply the next history entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedoCommand;

/// Store an externally assembled entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshotCommand {
    pub entry: HistoryEntry,
}
