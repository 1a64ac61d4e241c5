//! Changelog and revert engine.
//!
//! Every directory mutation is logged as a [`ChangeLogEvent`] pairing
//! the forward LDIF change with the reverse changes that undo it.
//! Revisions can be tagged, and the directory reverted to any earlier
//! revision by replaying reverses through a [`ChangeApplier`].

mod config;
mod engine;
mod event;
mod revert;
mod store;

pub use config::ChangeLogConfig;
pub use engine::{ChangeLog, ChangeLogState};
pub use event::{generalized_time_now, ChangeLogEvent, Principal, Tag};
pub use revert::{ChangeApplier, MemoryDirectory};
pub use store::{ChangeLogStore, FileChangeLogStore, Snapshot, SNAPSHOT_VERSION};
