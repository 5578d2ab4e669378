//! History configuration.

use tracing::warn;

/// Default number of entries kept in the global log.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Tunables for the history coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of entries in the global log; `0` keeps everything.
    pub max_entries: usize,
    /// Commit pending marks as a boundary before an undo, so no change made
    /// since the last boundary is lost.
    pub commit_before_undo: bool,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            commit_before_undo: true,
        }
    }
}

impl HistoryConfig {
    /// Read overrides from `REWIND_MAX_ENTRIES` and `REWIND_COMMIT_BEFORE_UNDO`.
    ///
    /// Unset or unparsable variables fall back to the defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_entries = lookup("REWIND_MAX_ENTRIES")
            .and_then(|v| parse_or_warn("REWIND_MAX_ENTRIES", &v, |s| s.parse().ok()))
            .unwrap_or(defaults.max_entries);

        let commit_before_undo = lookup("REWIND_COMMIT_BEFORE_UNDO")
            .and_then(|v| parse_or_warn("REWIND_COMMIT_BEFORE_UNDO", &v, parse_bool))
            .unwrap_or(defaults.commit_before_undo);

        Self {
            max_entries,
            commit_before_undo,
        }
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    #[must_use]
    pub const fn with_commit_before_undo(mut self, commit: bool) -> Self {
        self.commit_before_undo = commit;
        self
    }
}

fn parse_or_warn<T>(key: &str, value: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let parsed = parse(value.trim());
    if parsed.is_none() {
        warn!(key, value, "ignoring invalid history setting");
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
