//! Error types for the store facade.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from a backing medium.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The table does not support duplicate keys.
    #[error("duplicates not supported by table {name}")]
    DuplicatesNotSupported {
        /// Name of the table.
        name: String,
    },

    /// The table has been closed and can no longer be used.
    #[error("table is closed")]
    TableClosed,

    /// A key or value exceeded an implementation limit.
    #[error("key or value too large: {size} bytes (limit {limit})")]
    TooLarge {
        /// Size of the offending key or value.
        size: usize,
        /// Implementation limit.
        limit: usize,
    },
}

impl StoreError {
    /// Creates a duplicates-not-supported error.
    pub fn duplicates_not_supported(name: impl Into<String>) -> Self {
        Self::DuplicatesNotSupported { name: name.into() }
    }
}
