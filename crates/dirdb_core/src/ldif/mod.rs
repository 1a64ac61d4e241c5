//! LDIF change records and reverse-change computation.

mod change;
mod revertor;

pub use change::{LdifChange, ModOp, Modification};
pub use revertor::{reverse_add, reverse_delete, reverse_modify, reverse_modify_dn};
