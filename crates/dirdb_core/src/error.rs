//! Error types for the directory core.

use crate::types::Revision;
use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for directory core operations.
pub type DirResult<T> = Result<T, DirError>;

/// Errors that can occur in directory core operations.
#[derive(Debug, Error)]
pub enum DirError {
    /// Store facade error.
    #[error("store error: {0}")]
    Storage(#[from] dirdb_store::StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A caller supplied a malformed or out-of-range argument.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the problem.
        message: String,
    },

    /// A distinguished name could not be parsed.
    #[error("invalid DN: {message}")]
    InvalidDn {
        /// Description of the problem.
        message: String,
    },

    /// An operation was called in a state that does not permit it.
    #[error("illegal state: {message}")]
    IllegalState {
        /// Description of the state violation.
        message: String,
    },

    /// A persisted changelog snapshot could not be decoded.
    #[error("corrupt changelog snapshot: {message}")]
    Corrupt {
        /// Description of the corruption.
        message: String,
    },

    /// A revision was outside the valid range for the operation.
    #[error("revision {revision} out of range: current revision is {current}")]
    RevisionOutOfRange {
        /// The revision that was requested.
        revision: Revision,
        /// The current highest revision.
        current: Revision,
    },

    /// A revert-to-tag was requested but no tag exists.
    #[error("no tag exists to revert to")]
    NoSuchTag,

    /// An entry required by an operation does not exist.
    #[error("entry not found: {dn}")]
    EntryNotFound {
        /// DN of the missing entry.
        dn: String,
    },

    /// An entry to be added already exists.
    #[error("entry already exists: {dn}")]
    EntryExists {
        /// DN of the existing entry.
        dn: String,
    },

    /// One or more reverse operations failed partway through a revert.
    #[error("partial revert failure: {0}")]
    PartialRevert(PartialRevertError),
}

impl DirError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid DN error.
    pub fn invalid_dn(message: impl Into<String>) -> Self {
        Self::InvalidDn {
            message: message.into(),
        }
    }

    /// Creates an illegal state error.
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Creates a corrupt snapshot error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }
}

/// Detail record for a revert that failed partway through.
///
/// Reverts apply reverse changes one at a time, re-logging each applied
/// change. When a step fails, everything applied so far stays applied
/// and logged; this record tells the operator exactly which steps those
/// were and where the failure happened, keyed by the revision of the
/// original event being undone and the index of the reverse change
/// within that event.
#[derive(Debug)]
pub struct PartialRevertError {
    /// The revision the revert was targeting.
    pub target: Revision,
    /// Steps that applied and were re-logged before the failure, as
    /// `(source revision, reverse-change index, logged-as revision)`.
    pub applied: Vec<(Revision, usize, Revision)>,
    /// Revision of the event whose reverse change failed.
    pub failed_revision: Revision,
    /// Index of the failing reverse change within that event.
    pub failed_step: usize,
    /// Description of the underlying failure.
    pub message: String,
}

impl fmt::Display for PartialRevertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "revert to {} failed at {} step {}: {} ({} step(s) already applied)",
            self.target,
            self.failed_revision,
            self.failed_step,
            self.message,
            self.applied.len()
        )
    }
}
