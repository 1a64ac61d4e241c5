//! Reverting the directory to an earlier revision.
//!
//! A revert never rewrites history. It walks the events above the
//! target revision newest first, applies each stored reverse change
//! through a [`ChangeApplier`], and logs every applied reverse as a
//! new forward event. The revision therefore keeps increasing; the
//! directory content moves backwards while the log moves forwards.

use crate::changelog::engine::ChangeLog;
use crate::changelog::event::Principal;
use crate::changelog::store::ChangeLogStore;
use crate::entry::Entry;
use crate::error::{DirError, DirResult, PartialRevertError};
use crate::ldif::{reverse_add, reverse_delete, reverse_modify, reverse_modify_dn, LdifChange};
use crate::name::Dn;
use crate::types::Revision;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Applies LDIF changes to directory content.
///
/// `apply` returns the changes that undo what it just applied, built
/// against the state it saw, so the caller can log the application as
/// a fully invertible event of its own.
pub trait ChangeApplier {
    /// Applies one change.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the change does not fit
    /// the current content, e.g. adding an existing entry or
    /// modifying a missing one. Nothing is applied on error.
    fn apply(&mut self, change: &LdifChange) -> DirResult<Vec<LdifChange>>;
}

impl<S: ChangeLogStore> ChangeLog<S> {
    /// Reverts the directory to the state it had at `target`.
    ///
    /// Each applied reverse change is logged as one new forward event,
    /// so a successful revert leaves the current revision higher than
    /// before. Reverting to the current revision is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::IllegalState`] unless the log is
    /// initialized, [`DirError::RevisionOutOfRange`] when `target` is
    /// above the current revision, and [`DirError::PartialRevert`]
    /// when a reverse change fails partway; everything applied before
    /// the failure stays applied and logged.
    pub fn revert<A: ChangeApplier + ?Sized>(
        &self,
        target: Revision,
        committer: &Principal,
        applier: &mut A,
    ) -> DirResult<Revision> {
        let mut inner = self.lock_inner();
        Self::require_initialized(&inner)?;
        if target > inner.revision {
            return Err(DirError::RevisionOutOfRange {
                revision: target,
                current: inner.revision,
            });
        }

        let plan: Vec<_> = inner
            .events
            .iter()
            .filter(|e| e.revision > target)
            .rev()
            .map(|e| (e.revision, e.reverse.clone()))
            .collect();

        let mut applied = Vec::new();
        for (source, reverses) in plan {
            for (step, change) in reverses.iter().enumerate() {
                match applier.apply(change) {
                    Ok(undo) => {
                        let event = Self::append(&mut inner, committer, change.clone(), undo);
                        applied.push((source, step, event.revision));
                    }
                    Err(err) => {
                        warn!(
                            source = source.as_u64(),
                            step,
                            error = %err,
                            "revert stopped partway"
                        );
                        return Err(DirError::PartialRevert(PartialRevertError {
                            target,
                            applied,
                            failed_revision: source,
                            failed_step: step,
                            message: err.to_string(),
                        }));
                    }
                }
            }
        }

        info!(
            target = target.as_u64(),
            revision = inner.revision.as_u64(),
            steps = applied.len(),
            "revert complete"
        );
        Ok(inner.revision)
    }

    /// Reverts to the most recently created tag.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::NoSuchTag`] when no tag exists, plus the
    /// errors of [`Self::revert`].
    pub fn revert_to_latest_tag<A: ChangeApplier + ?Sized>(
        &self,
        committer: &Principal,
        applier: &mut A,
    ) -> DirResult<Revision> {
        let tag = self.latest_tag().ok_or(DirError::NoSuchTag)?;
        self.revert(tag.revision, committer, applier)
    }
}

/// In-memory directory content keyed by DN.
///
/// The reference [`ChangeApplier`]; also the content model the
/// integration tests drive reverts against.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    entries: BTreeMap<Dn, Entry>,
}

impl MemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an entry's attributes, if present.
    #[must_use]
    pub fn entry(&self, dn: &Dn) -> Option<&Entry> {
        self.entries.get(dn)
    }

    /// Returns true if an entry exists at the DN.
    #[must_use]
    pub fn contains(&self, dn: &Dn) -> bool {
        self.entries.contains_key(dn)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no entries exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn add(&mut self, dn: &Dn, entry: Entry) -> DirResult<()> {
        if self.entries.contains_key(dn) {
            return Err(DirError::EntryExists { dn: dn.to_string() });
        }
        self.entries.insert(dn.clone(), entry);
        Ok(())
    }

    fn remove(&mut self, dn: &Dn) -> DirResult<Entry> {
        self.entries
            .remove(dn)
            .ok_or_else(|| DirError::EntryNotFound { dn: dn.to_string() })
    }

    fn rename(&mut self, change: &LdifChange) -> DirResult<()> {
        let LdifChange::ModifyDn {
            dn,
            new_rdn,
            delete_old_rdn,
            ..
        } = change
        else {
            return Err(DirError::invalid_argument("rename requires a modifyDn change"));
        };
        let new_dn = change.renamed_dn()?;
        if self.entries.contains_key(&new_dn) {
            return Err(DirError::EntryExists {
                dn: new_dn.to_string(),
            });
        }
        let mut entry = self.remove(dn)?;
        if let Some(old_rdn) = dn.rdn() {
            if *delete_old_rdn {
                entry.remove_value(old_rdn.attribute(), old_rdn.value());
            }
        }
        entry.add(new_rdn.attribute(), new_rdn.value());

        // Subordinates move with their parent.
        let moved: Vec<Dn> = self
            .entries
            .keys()
            .filter(|k| k.is_descendant_or_self(dn))
            .cloned()
            .collect();
        for old in moved {
            let relative = old
                .relative_to(dn)
                .ok_or_else(|| DirError::invalid_argument("subordinate outside renamed subtree"))?;
            let child = self.remove(&old)?;
            self.entries.insert(new_dn.descend(&relative), child);
        }

        self.entries.insert(new_dn, entry);
        Ok(())
    }
}

impl ChangeApplier for MemoryDirectory {
    fn apply(&mut self, change: &LdifChange) -> DirResult<Vec<LdifChange>> {
        match change {
            LdifChange::Add { dn, entry } => {
                self.add(dn, entry.clone())?;
                Ok(vec![reverse_add(dn.clone())])
            }
            LdifChange::Delete { dn } => {
                let removed = self.remove(dn)?;
                Ok(vec![reverse_delete(dn.clone(), removed)])
            }
            LdifChange::Modify { dn, mods } => {
                let entry = self
                    .entries
                    .get_mut(dn)
                    .ok_or_else(|| DirError::EntryNotFound { dn: dn.to_string() })?;
                let reverses = reverse_modify(dn, mods, entry);
                for m in mods {
                    m.apply_to(entry);
                }
                Ok(reverses)
            }
            LdifChange::ModifyDn { dn, .. } => {
                let entry = self
                    .entries
                    .get(dn)
                    .ok_or_else(|| DirError::EntryNotFound { dn: dn.to_string() })?;
                let reverse = reverse_modify_dn(change, entry)?;
                self.rename(change)?;
                Ok(vec![reverse])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aci::AuthenticationLevel;
    use crate::changelog::store::FileChangeLogStore;
    use crate::ldif::{ModOp, Modification};
    use crate::name::Rdn;

    fn admin() -> Principal {
        Principal::new(Dn::parse("uid=admin").unwrap(), AuthenticationLevel::Simple)
    }

    fn person(cn: &str) -> Entry {
        let mut entry = Entry::new();
        entry.add("objectclass", "person");
        entry.add("cn", cn);
        entry
    }

    fn initialized() -> ChangeLog<FileChangeLogStore> {
        let log = ChangeLog::new(FileChangeLogStore::in_memory());
        log.init().unwrap();
        log
    }

    /// Applies a change through the directory and logs it, the way a
    /// directory service front end would.
    fn commit(
        log: &ChangeLog<FileChangeLogStore>,
        directory: &mut MemoryDirectory,
        change: LdifChange,
    ) -> Revision {
        let reverse = directory.apply(&change).unwrap();
        log.log(&admin(), change, reverse).unwrap().revision
    }

    #[test]
    fn revert_undoes_an_add_and_increases_revision() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let dn = Dn::parse("cn=alice,dc=example").unwrap();
        commit(&log, &mut directory, LdifChange::Add {
            dn: dn.clone(),
            entry: person("alice"),
        });
        assert!(directory.contains(&dn));

        let after = log.revert(Revision::new(0), &admin(), &mut directory).unwrap();
        assert!(!directory.contains(&dn));
        assert_eq!(after, Revision::new(2));
        assert_eq!(log.current_revision(), Revision::new(2));
    }

    #[test]
    fn revert_undoes_a_modify() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let dn = Dn::parse("cn=alice,dc=example").unwrap();
        commit(&log, &mut directory, LdifChange::Add {
            dn: dn.clone(),
            entry: person("alice"),
        });
        commit(&log, &mut directory, LdifChange::Modify {
            dn: dn.clone(),
            mods: vec![
                Modification::new(ModOp::Add, "mail", vec!["a@example.com".into()]),
                Modification::new(ModOp::Replace, "cn", vec!["alicia".into()]),
            ],
        });
        assert!(directory.entry(&dn).unwrap().contains("cn", "alicia"));

        log.revert(Revision::new(1), &admin(), &mut directory).unwrap();
        let entry = directory.entry(&dn).unwrap();
        assert_eq!(*entry, person("alice"));
    }

    #[test]
    fn revert_undoes_a_rename_with_subordinates() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let ou = Dn::parse("ou=people,dc=example").unwrap();
        let alice = Dn::parse("cn=alice,ou=people,dc=example").unwrap();
        let mut unit = Entry::new();
        unit.add("objectclass", "organizationalUnit");
        unit.add("ou", "people");
        commit(&log, &mut directory, LdifChange::Add {
            dn: ou.clone(),
            entry: unit,
        });
        commit(&log, &mut directory, LdifChange::Add {
            dn: alice.clone(),
            entry: person("alice"),
        });
        let checkpoint = log.current_revision();
        commit(&log, &mut directory, LdifChange::ModifyDn {
            dn: ou.clone(),
            new_rdn: Rdn::new("ou", "staff"),
            delete_old_rdn: true,
            new_superior: None,
        });
        assert!(directory.contains(&Dn::parse("cn=alice,ou=staff,dc=example").unwrap()));

        log.revert(checkpoint, &admin(), &mut directory).unwrap();
        assert!(directory.contains(&alice));
        assert!(directory.entry(&ou).unwrap().contains("ou", "people"));
        assert!(!directory.entry(&ou).unwrap().contains("ou", "staff"));
    }

    #[test]
    fn revert_undoes_a_keep_old_rdn_rename() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let alice = Dn::parse("cn=alice,dc=example").unwrap();
        commit(&log, &mut directory, LdifChange::Add {
            dn: alice.clone(),
            entry: person("alice"),
        });
        let checkpoint = log.current_revision();
        commit(&log, &mut directory, LdifChange::ModifyDn {
            dn: alice.clone(),
            new_rdn: Rdn::new("cn", "alicia"),
            delete_old_rdn: false,
            new_superior: None,
        });
        let renamed = Dn::parse("cn=alicia,dc=example").unwrap();
        assert!(directory.entry(&renamed).unwrap().contains("cn", "alice"));

        log.revert(checkpoint, &admin(), &mut directory).unwrap();
        // The value the rename introduced is gone again.
        assert_eq!(*directory.entry(&alice).unwrap(), person("alice"));
    }

    #[test]
    fn revert_walks_events_newest_first() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let parent = Dn::parse("ou=people,dc=example").unwrap();
        let child = Dn::parse("cn=alice,ou=people,dc=example").unwrap();
        let mut unit = Entry::new();
        unit.add("ou", "people");
        commit(&log, &mut directory, LdifChange::Add {
            dn: parent.clone(),
            entry: unit,
        });
        commit(&log, &mut directory, LdifChange::Add {
            dn: child.clone(),
            entry: person("alice"),
        });

        // Undoing oldest-first would delete the parent while the child
        // still exists; newest-first removes the child before the
        // parent.
        log.revert(Revision::new(0), &admin(), &mut directory).unwrap();
        assert!(directory.is_empty());
        assert_eq!(log.current_revision(), Revision::new(4));
    }

    #[test]
    fn revert_to_current_revision_is_a_noop() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        commit(&log, &mut directory, LdifChange::Add {
            dn: Dn::parse("cn=alice,dc=example").unwrap(),
            entry: person("alice"),
        });
        let current = log.current_revision();
        assert_eq!(log.revert(current, &admin(), &mut directory).unwrap(), current);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn revert_above_current_revision_is_rejected() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        assert!(matches!(
            log.revert(Revision::new(9), &admin(), &mut directory),
            Err(DirError::RevisionOutOfRange { .. })
        ));
    }

    #[test]
    fn revert_to_latest_tag_requires_a_tag() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        assert!(matches!(
            log.revert_to_latest_tag(&admin(), &mut directory),
            Err(DirError::NoSuchTag)
        ));
    }

    #[test]
    fn partial_revert_reports_applied_steps() {
        let log = initialized();
        let mut directory = MemoryDirectory::new();
        let alice = Dn::parse("cn=alice,dc=example").unwrap();
        let bob = Dn::parse("cn=bob,dc=example").unwrap();
        commit(&log, &mut directory, LdifChange::Add {
            dn: alice.clone(),
            entry: person("alice"),
        });
        commit(&log, &mut directory, LdifChange::Add {
            dn: bob.clone(),
            entry: person("bob"),
        });
        // Sabotage: the reverse of event 1 will try to delete alice,
        // who is already gone.
        directory.apply(&LdifChange::Delete { dn: alice.clone() }).unwrap();

        let err = log
            .revert(Revision::new(0), &admin(), &mut directory)
            .unwrap_err();
        let DirError::PartialRevert(detail) = err else {
            panic!("expected partial revert");
        };
        assert_eq!(detail.target, Revision::new(0));
        assert_eq!(detail.failed_revision, Revision::new(1));
        assert_eq!(detail.failed_step, 0);
        // The reverse of event 2 (delete bob) applied and was logged.
        assert_eq!(detail.applied, vec![(Revision::new(2), 0, Revision::new(3))]);
        assert!(!directory.contains(&bob));
        assert_eq!(log.current_revision(), Revision::new(3));
    }

    #[test]
    fn applying_a_bad_change_leaves_content_untouched() {
        let mut directory = MemoryDirectory::new();
        let dn = Dn::parse("cn=alice,dc=example").unwrap();
        directory
            .apply(&LdifChange::Add {
                dn: dn.clone(),
                entry: person("alice"),
            })
            .unwrap();
        assert!(matches!(
            directory.apply(&LdifChange::Add {
                dn: dn.clone(),
                entry: person("alice"),
            }),
            Err(DirError::EntryExists { .. })
        ));
        assert!(matches!(
            directory.apply(&LdifChange::Delete {
                dn: Dn::parse("cn=bob,dc=example").unwrap(),
            }),
            Err(DirError::EntryNotFound { .. })
        ));
        assert_eq!(directory.len(), 1);
    }
}
