//! The changelog engine: revision counter, event log, and tags.

use crate::changelog::config::ChangeLogConfig;
use crate::changelog::event::{ChangeLogEvent, Principal, Tag};
use crate::changelog::store::{ChangeLogStore, FileChangeLogStore, Snapshot};
use crate::error::{DirError, DirResult};
use crate::ldif::LdifChange;
use crate::types::Revision;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Lifecycle state of a changelog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeLogState {
    /// Not recording; `init` is refused.
    Disabled,
    /// Recording is configured but the log has not loaded its state.
    Enabled,
    /// Loaded and accepting events.
    Initialized,
    /// Torn down; every operation is refused.
    Destroyed,
}

/// Revision counter, events, and tags move together under one lock so
/// readers never see a revision without its event or vice versa.
#[derive(Debug)]
pub(crate) struct Inner {
    pub(crate) state: ChangeLogState,
    pub(crate) revision: Revision,
    pub(crate) events: Vec<ChangeLogEvent>,
    pub(crate) tags: Vec<Tag>,
}

/// The changelog: an append-only log of invertible changes.
///
/// Revisions start at zero and increase by exactly one per logged
/// event, including the events a revert logs for its reverse changes.
#[derive(Debug)]
pub struct ChangeLog<S: ChangeLogStore> {
    store: S,
    sync_on_log: bool,
    inner: Mutex<Inner>,
}

impl ChangeLog<FileChangeLogStore> {
    /// Opens a changelog from configuration.
    #[must_use]
    pub fn from_config(config: &ChangeLogConfig) -> Self {
        let store = match &config.snapshot_path {
            Some(path) => FileChangeLogStore::at_path(path),
            None => FileChangeLogStore::in_memory(),
        };
        let log = if config.enabled {
            Self::new(store)
        } else {
            Self::disabled(store)
        };
        Self {
            sync_on_log: config.sync_on_log,
            ..log
        }
    }
}

impl<S: ChangeLogStore> ChangeLog<S> {
    /// Creates an enabled changelog over a store. Call [`Self::init`]
    /// before logging.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            sync_on_log: false,
            inner: Mutex::new(Inner {
                state: ChangeLogState::Enabled,
                revision: Revision::new(0),
                events: Vec::new(),
                tags: Vec::new(),
            }),
        }
    }

    /// Creates a disabled changelog; enable it before `init`.
    #[must_use]
    pub fn disabled(store: S) -> Self {
        let log = Self::new(store);
        log.inner.lock().state = ChangeLogState::Disabled;
        log
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> ChangeLogState {
        self.inner.lock().state
    }

    /// Enables a disabled changelog.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is disabled.
    pub fn enable(&self) -> DirResult<()> {
        let mut inner = self.inner.lock();
        if inner.state != ChangeLogState::Disabled {
            return Err(DirError::illegal_state("changelog is not disabled"));
        }
        inner.state = ChangeLogState::Enabled;
        Ok(())
    }

    /// Loads persisted state and starts accepting events.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is enabled,
    /// and [`DirError::Corrupt`] when the persisted snapshot cannot be
    /// decoded.
    pub fn init(&self) -> DirResult<()> {
        let mut inner = self.inner.lock();
        if inner.state != ChangeLogState::Enabled {
            return Err(DirError::illegal_state("changelog is not enabled"));
        }
        if let Some(snapshot) = self.store.load()? {
            inner.revision = snapshot.revision;
            inner.events = snapshot.events;
            inner.tags = snapshot.tags;
        }
        inner.state = ChangeLogState::Initialized;
        info!(revision = inner.revision.as_u64(), "changelog initialized");
        Ok(())
    }

    /// Logs a forward change with its reverse changes, returning the
    /// new event.
    ///
    /// With `sync_on_log` configured, the snapshot is persisted before
    /// the call returns.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized, and persistence errors when a sync-on-log save
    /// fails.
    pub fn log(
        &self,
        committer: &Principal,
        forward: LdifChange,
        reverse: Vec<LdifChange>,
    ) -> DirResult<ChangeLogEvent> {
        let mut inner = self.inner.lock();
        Self::require_initialized(&inner)?;
        let event = Self::append(&mut inner, committer, forward, reverse);
        if self.sync_on_log {
            let snapshot = Snapshot::new(inner.revision, inner.events.clone(), inner.tags.clone());
            self.store.save(&snapshot)?;
        }
        Ok(event)
    }

    pub(crate) fn append(
        inner: &mut Inner,
        committer: &Principal,
        forward: LdifChange,
        reverse: Vec<LdifChange>,
    ) -> ChangeLogEvent {
        inner.revision = inner.revision.next();
        let event = ChangeLogEvent::new(inner.revision, committer.clone(), forward, reverse);
        debug!(revision = inner.revision.as_u64(), dn = %event.forward.dn(), "change logged");
        inner.events.push(event.clone());
        event
    }

    /// Returns the highest revision logged so far.
    pub fn current_revision(&self) -> Revision {
        self.inner.lock().revision
    }

    /// Returns the event at a revision, if one was logged.
    pub fn event_at(&self, revision: Revision) -> Option<ChangeLogEvent> {
        let inner = self.inner.lock();
        inner
            .events
            .iter()
            .find(|e| e.revision == revision)
            .cloned()
    }

    /// Returns all events with a revision strictly above the given one,
    /// oldest first.
    pub fn events_after(&self, revision: Revision) -> Vec<ChangeLogEvent> {
        let inner = self.inner.lock();
        inner
            .events
            .iter()
            .filter(|e| e.revision > revision)
            .cloned()
            .collect()
    }

    /// Tags the current revision.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized.
    pub fn tag(&self) -> DirResult<Tag> {
        let mut inner = self.inner.lock();
        Self::require_initialized(&inner)?;
        let revision = inner.revision;
        Self::tag_locked(&mut inner, revision, None)
    }

    /// Tags the current revision with a description.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized.
    pub fn tag_with_description(&self, description: &str) -> DirResult<Tag> {
        let mut inner = self.inner.lock();
        Self::require_initialized(&inner)?;
        let revision = inner.revision;
        Self::tag_locked(&mut inner, revision, Some(description.to_string()))
    }

    /// Tags an arbitrary revision.
    ///
    /// Tagging the same revision again returns the existing tag
    /// unchanged; the first write wins.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized, and [`DirError::RevisionOutOfRange`] when the
    /// revision has not been logged yet.
    pub fn tag_revision(&self, revision: Revision, description: Option<String>) -> DirResult<Tag> {
        let mut inner = self.inner.lock();
        Self::require_initialized(&inner)?;
        Self::tag_locked(&mut inner, revision, description)
    }

    // Revision read and tag insert must happen under one lock
    // acquisition; a log() in between would make "tag the current
    // revision" tag a stale one.
    fn tag_locked(inner: &mut Inner, revision: Revision, description: Option<String>) -> DirResult<Tag> {
        if revision > inner.revision {
            return Err(DirError::RevisionOutOfRange {
                revision,
                current: inner.revision,
            });
        }
        if let Some(existing) = inner.tags.iter().find(|t| t.revision == revision) {
            return Ok(existing.clone());
        }
        let mut tag = Tag::new(revision, description);
        tag.revision_date = inner
            .events
            .iter()
            .find(|e| e.revision == revision)
            .map(|e| e.event_date.clone());
        inner.tags.push(tag.clone());
        debug!(revision = revision.as_u64(), "revision tagged");
        Ok(tag)
    }

    /// Returns the tag on a revision, if any.
    pub fn tag_at(&self, revision: Revision) -> Option<Tag> {
        let inner = self.inner.lock();
        inner.tags.iter().find(|t| t.revision == revision).cloned()
    }

    /// Returns the most recently created tag, if any exist.
    ///
    /// Latest means creation order, not revision order: tagging an old
    /// revision after a newer one makes the old revision's tag latest.
    pub fn latest_tag(&self) -> Option<Tag> {
        let inner = self.inner.lock();
        inner.tags.last().cloned()
    }

    /// Removes the tag on a revision, returning it if it existed.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized.
    pub fn remove_tag(&self, revision: Revision) -> DirResult<Option<Tag>> {
        let mut inner = self.inner.lock();
        Self::require_initialized(&inner)?;
        let index = inner.tags.iter().position(|t| t.revision == revision);
        Ok(index.map(|i| inner.tags.remove(i)))
    }

    /// Persists the current state to the store.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized.
    pub fn sync(&self) -> DirResult<()> {
        let snapshot = {
            let inner = self.inner.lock();
            Self::require_initialized(&inner)?;
            Snapshot::new(inner.revision, inner.events.clone(), inner.tags.clone())
        };
        self.store.save(&snapshot)
    }

    /// Flushes the changelog and tears it down.
    ///
    /// The final state is persisted first, so reopening the store and
    /// calling [`Self::init`] reconstructs it; a destroyed log refuses
    /// every further operation.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] when already destroyed, and
    /// persistence errors when the final save fails (the log is not
    /// destroyed in that case).
    pub fn destroy(&self) -> DirResult<()> {
        let mut inner = self.inner.lock();
        if inner.state == ChangeLogState::Destroyed {
            return Err(DirError::illegal_state("changelog is already destroyed"));
        }
        if inner.state == ChangeLogState::Initialized {
            let snapshot = Snapshot::new(inner.revision, inner.events.clone(), inner.tags.clone());
            self.store.save(&snapshot)?;
        }
        inner.state = ChangeLogState::Destroyed;
        info!("changelog destroyed");
        Ok(())
    }

    pub(crate) fn require_initialized(inner: &Inner) -> DirResult<()> {
        if inner.state == ChangeLogState::Initialized {
            Ok(())
        } else {
            Err(DirError::illegal_state("changelog is not initialized"))
        }
    }

    pub(crate) fn lock_inner(&self) -> parking_lot::MutexGuard<'_, Inner> {
        self.inner.lock()
    }
}
