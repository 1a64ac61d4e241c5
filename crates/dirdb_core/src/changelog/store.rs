//! Changelog persistence.
//!
//! The whole changelog is persisted as one versioned CBOR document,
//! rewritten atomically on every sync. Changelogs are small relative
//! to the directory data they describe, so a full rewrite keeps the
//! format trivial to load and impossible to tear.

use crate::changelog::event::{ChangeLogEvent, Tag};
use crate::error::{DirError, DirResult};
use crate::types::Revision;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

const SNAPSHOT_TEMP_SUFFIX: &str = ".tmp";

/// A point-in-time copy of the changelog state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version, checked on load.
    pub version: u32,
    /// Highest revision logged.
    pub revision: Revision,
    /// All events, oldest first.
    pub events: Vec<ChangeLogEvent>,
    /// All tags, oldest first.
    pub tags: Vec<Tag>,
}

impl Snapshot {
    /// Creates a snapshot at the current format version.
    #[must_use]
    pub fn new(revision: Revision, events: Vec<ChangeLogEvent>, tags: Vec<Tag>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            revision,
            events,
            tags,
        }
    }
}

/// Persistence backend for a changelog.
pub trait ChangeLogStore: Send + Sync {
    /// Loads the last saved snapshot, or `None` for a fresh store.
    fn load(&self) -> DirResult<Option<Snapshot>>;

    /// Saves a snapshot durably.
    fn save(&self, snapshot: &Snapshot) -> DirResult<()>;
}

/// Changelog store backed by an optional snapshot file.
///
/// Without a path the store is purely in memory and `load` always
/// returns `None`; with a path, saves use the write-then-rename
/// pattern so a crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Default)]
pub struct FileChangeLogStore {
    path: Option<PathBuf>,
}

impl FileChangeLogStore {
    /// Creates a store with no persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self { path: None }
    }

    /// Creates a store persisting to the given snapshot file.
    #[must_use]
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    #[cfg(unix)]
    fn sync_parent_directory(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                File::open(parent)?.sync_all()?;
            }
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_parent_directory(_path: &Path) -> std::io::Result<()> {
        Ok(())
    }
}

impl ChangeLogStore for FileChangeLogStore {
    fn load(&self) -> DirResult<Option<Snapshot>> {
        let Some(path) = &self.path else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }

        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;
        if data.is_empty() {
            return Ok(None);
        }

        let snapshot: Snapshot = ciborium::de::from_reader(data.as_slice())
            .map_err(|e| DirError::corrupt(format!("changelog snapshot: {e}")))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DirError::corrupt(format!(
                "changelog snapshot version {} (expected {SNAPSHOT_VERSION})",
                snapshot.version
            )));
        }
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> DirResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut temp = path.as_os_str().to_owned();
        temp.push(SNAPSHOT_TEMP_SUFFIX);
        let temp_path = PathBuf::from(temp);

        let mut data = Vec::new();
        ciborium::ser::into_writer(snapshot, &mut data)
            .map_err(|e| DirError::corrupt(format!("changelog snapshot encode: {e}")))?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, path)?;
        Self::sync_parent_directory(path)?;
        Ok(())
    }
}
