//! Changelog configuration.

use std::path::PathBuf;

/// Configuration for opening a changelog.
#[derive(Debug, Clone)]
pub struct ChangeLogConfig {
    /// Whether the changelog starts enabled.
    pub enabled: bool,

    /// Snapshot file path; `None` keeps the log in memory only.
    pub snapshot_path: Option<PathBuf>,

    /// Whether every logged event triggers a snapshot sync
    /// (safer but slower).
    pub sync_on_log: bool,
}

impl Default for ChangeLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            snapshot_path: None,
            sync_on_log: false,
        }
    }
}

impl ChangeLogConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the changelog starts enabled.
    #[must_use]
    pub const fn enabled(mut self, value: bool) -> Self {
        self.enabled = value;
        self
    }

    /// Sets the snapshot file path.
    #[must_use]
    pub fn snapshot_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    /// Sets whether every logged event syncs the snapshot.
    #[must_use]
    pub const fn sync_on_log(mut self, value: bool) -> Self {
        self.sync_on_log = value;
        self
    }
}
