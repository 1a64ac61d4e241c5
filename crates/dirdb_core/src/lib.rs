//! # DirDB Core
//!
//! Directory core engine for DirDB, an embeddable LDAP directory server.
//!
//! This crate provides:
//! - A cost-based filter optimizer that annotates search filter trees
//!   with scan-count estimates from attribute indices
//! - Subtree specification and objectClass refinement evaluation
//! - An ACI tuple filter chain for access-control decisions
//! - A changelog engine recording invertible forward/reverse LDIF
//!   pairs, with tagging and revert to any earlier revision
//!
//! The LDAP wire codec, network layer, and on-disk storage format are
//! external collaborators, consumed through the [`dirdb_store::Table`]
//! facade and the [`partition::Partition`] and
//! [`changelog::ChangeApplier`] traits.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod aci;
pub mod changelog;
pub mod entry;
pub mod error;
pub mod filter;
pub mod index;
pub mod ldif;
pub mod name;
pub mod optimizer;
pub mod partition;
pub mod refinement;
pub mod schema;
pub mod subtree;
pub mod types;

pub use entry::Entry;
pub use error::{DirError, DirResult};
pub use filter::{AssertionKind, FilterNode, SearchScope};
pub use name::{Dn, Rdn};
pub use types::{EntryId, Revision};
