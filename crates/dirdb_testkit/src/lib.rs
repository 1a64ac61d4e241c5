//! # DirDB Testkit
//!
//! Test utilities for DirDB.
//!
//! This crate provides:
//! - Seeded partition fixtures with known scan counts
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dirdb_testkit::prelude::*;
//!
//! #[test]
//! fn test_with_fixture() {
//!     let fixture = people_partition();
//!     // ... annotate filters against fixture.partition
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
