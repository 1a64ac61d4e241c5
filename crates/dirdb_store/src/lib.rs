//! # DirDB Store
//!
//! Ordered table facade for DirDB.
//!
//! This crate provides the lowest-level storage abstraction used by the
//! directory core. Tables are **opaque, ordered key-value stores** with
//! optional duplicate-key support - they do not interpret the data they
//! hold. The directory core owns all key and value encoding: entry ids,
//! normalized attribute values, and DN keys are all just bytes here.
//!
//! ## Design Principles
//!
//! - Tables are ordered by raw byte comparison of keys
//! - A key may hold several values (duplicates), iterated in value order
//! - Count queries (`count`, `count_key`, `count_from`) are first-class,
//!   because the optimizer's scan estimates are built from them
//! - Must be `Send + Sync` for concurrent reader access
//!
//! ## Available Implementations
//!
//! - [`MemoryTable`] - For testing and ephemeral directories
//!
//! ## Example
//!
//! ```rust
//! use dirdb_store::{MemoryTable, Table};
//!
//! let table = MemoryTable::new();
//! table.put(b"cn=alice", b"1").unwrap();
//! table.put(b"cn=alice", b"2").unwrap();
//! assert_eq!(table.count_key(b"cn=alice").unwrap(), 2);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod memory;
mod table;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryTable;
pub use table::Table;
