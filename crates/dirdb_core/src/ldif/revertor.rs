//! Computes the reverse LDIF change for a forward change.
//!
//! Every reverse is built against the entry state the forward change
//! saw, so replaying the reverses newest-first restores that state
//! exactly.

use crate::entry::Entry;
use crate::error::{DirError, DirResult};
use crate::ldif::change::{LdifChange, ModOp, Modification};
use crate::name::Dn;

/// Reverse of adding an entry: delete it again.
#[must_use]
pub fn reverse_add(dn: Dn) -> LdifChange {
    LdifChange::Delete { dn }
}

/// Reverse of deleting an entry: add it back as it was.
#[must_use]
pub fn reverse_delete(dn: Dn, deleted: Entry) -> LdifChange {
    LdifChange::Add { dn, entry: deleted }
}

/// Reverse of a modify change.
///
/// Walks the modifications forward over a working copy of the entry as
/// it was before the change, inverting each against the state it
/// actually saw. Modifications that changed nothing produce no reverse.
/// The reverses come back newest-first, each as its own single-item
/// modify change, so applying them in order undoes the forward change.
#[must_use]
pub fn reverse_modify(dn: &Dn, mods: &[Modification], original: &Entry) -> Vec<LdifChange> {
    let mut working = original.clone();
    let mut reverses = Vec::new();
    for m in mods {
        if let Some(inverse) = invert(m, &working) {
            reverses.push(LdifChange::Modify {
                dn: dn.clone(),
                mods: vec![inverse],
            });
        }
        m.apply_to(&mut working);
    }
    reverses.reverse();
    reverses
}

fn invert(m: &Modification, before: &Entry) -> Option<Modification> {
    match m.op {
        ModOp::Add => {
            let added: Vec<String> = m
                .values
                .iter()
                .filter(|v| !before.contains(&m.attribute, v))
                .cloned()
                .collect();
            (!added.is_empty()).then(|| Modification::new(ModOp::Delete, &m.attribute, added))
        }
        ModOp::Delete => {
            let present = before.get(&m.attribute)?;
            let removed: Vec<String> = if m.values.is_empty() {
                present.to_vec()
            } else {
                m.values
                    .iter()
                    .filter(|v| before.contains(&m.attribute, v))
                    .cloned()
                    .collect()
            };
            (!removed.is_empty()).then(|| Modification::new(ModOp::Add, &m.attribute, removed))
        }
        ModOp::Replace => {
            let prior = before.get(&m.attribute).map(<[String]>::to_vec).unwrap_or_default();
            if prior == m.values {
                return None;
            }
            Some(Modification::new(ModOp::Replace, &m.attribute, prior))
        }
    }
}

/// Reverse of a rename: rename the entry back from where it landed.
///
/// `original` is the entry as it was before the forward rename. The
/// reverse removes the forward's new RDN value only when the forward
/// actually introduced it; a value that was already on the entry stays
/// after the revert. In particular the reverse of a keep-old-RDN
/// rename deletes its own old RDN, otherwise the added value would
/// survive the round trip.
///
/// # Errors
///
/// Returns [`DirError::InvalidArgument`] when the change is not a
/// rename, or when it targets the root DSE.
pub fn reverse_modify_dn(change: &LdifChange, original: &Entry) -> DirResult<LdifChange> {
    let LdifChange::ModifyDn {
        dn,
        new_rdn,
        new_superior,
        ..
    } = change
    else {
        return Err(DirError::invalid_argument(
            "reverse_modify_dn requires a modifyDn change",
        ));
    };
    let old_rdn = dn
        .rdn()
        .ok_or_else(|| DirError::invalid_argument("cannot rename the root DSE"))?;
    let old_parent = dn
        .parent()
        .ok_or_else(|| DirError::invalid_argument("cannot rename the root DSE"))?;
    Ok(LdifChange::ModifyDn {
        dn: change.renamed_dn()?,
        new_rdn: old_rdn.clone(),
        delete_old_rdn: !original.contains(new_rdn.attribute(), new_rdn.value()),
        new_superior: new_superior.as_ref().map(|_| old_parent),
    })
}
