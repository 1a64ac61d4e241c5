//! Partitions and suffix routing.
//!
//! A partition stores the entries below one directory suffix and owns
//! the attribute indices the optimizer reads. The [`PartitionRouter`]
//! maps a candidate DN to the partition with the longest matching
//! suffix, the way a server nexus routes operations to backends.

use crate::entry::Entry;
use crate::error::{DirError, DirResult};
use crate::index::AttributeIndex;
use crate::name::Dn;
use crate::types::EntryId;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Read access to one partition's entries and indices.
///
/// This is the contract the optimizer and evaluators consume; the
/// real on-disk backend is external and only has to satisfy this
/// surface. All methods are safe for concurrent readers.
pub trait Partition: Send + Sync {
    /// Returns the suffix this partition is mounted at.
    fn suffix(&self) -> &Dn;

    /// Returns the total number of entries in the partition.
    fn count(&self) -> DirResult<u64>;

    /// Looks up the id of the entry at `dn`, if present.
    fn entry_id(&self, dn: &Dn) -> DirResult<Option<EntryId>>;

    /// Returns the number of immediate children of an entry.
    fn child_count(&self, id: EntryId) -> DirResult<u64>;

    /// Returns true if a user index exists on `attribute`.
    fn has_user_index(&self, attribute: &str) -> bool;

    /// Returns the user index on `attribute`, if one exists.
    fn user_index(&self, attribute: &str) -> Option<&AttributeIndex>;

    /// Returns the attribute-existence index, if one exists.
    fn existence_index(&self) -> Option<&AttributeIndex>;
}

#[derive(Default)]
struct EntrySet {
    by_dn: BTreeMap<String, EntryId>,
    by_id: BTreeMap<EntryId, (Dn, Entry)>,
    next_id: u64,
}

/// An in-memory partition for tests and ephemeral directories.
///
/// Index maintenance happens inline with entry mutation, so the
/// optimizer always sees counts consistent with the entry set.
pub struct MemoryPartition {
    suffix: Dn,
    entries: RwLock<EntrySet>,
    user_indexes: HashMap<String, AttributeIndex>,
    existence: AttributeIndex,
}

impl MemoryPartition {
    /// Creates an empty partition at `suffix` with no user indexes.
    #[must_use]
    pub fn new(suffix: Dn) -> Self {
        Self::with_indexes(suffix, &[])
    }

    /// Creates an empty partition with user indexes on `attributes`.
    #[must_use]
    pub fn with_indexes(suffix: Dn, attributes: &[&str]) -> Self {
        let user_indexes = attributes
            .iter()
            .map(|attr| {
                let attr = attr.trim().to_ascii_lowercase();
                (attr.clone(), AttributeIndex::in_memory(&attr))
            })
            .collect();
        Self {
            suffix,
            entries: RwLock::new(EntrySet::default()),
            user_indexes,
            existence: AttributeIndex::in_memory("existence"),
        }
    }

    /// Adds an entry and maintains the indices.
    ///
    /// # Errors
    ///
    /// Returns [`DirError::InvalidArgument`] when the DN is outside
    /// this partition's suffix, and [`DirError::EntryExists`] when an
    /// entry already sits at the DN.
    pub fn add_entry(&self, dn: &Dn, entry: Entry) -> DirResult<EntryId> {
        if !dn.is_descendant_or_self(&self.suffix) {
            return Err(DirError::invalid_argument(format!(
                "dn {dn} is outside partition suffix {}",
                self.suffix
            )));
        }

        let mut set = self.entries.write();
        let key = dn.normalized();
        if set.by_dn.contains_key(&key) {
            return Err(DirError::EntryExists { dn: dn.to_string() });
        }

        set.next_id += 1;
        let id = EntryId::new(set.next_id);

        for (attribute, values) in entry.attributes() {
            self.existence.insert(attribute, id)?;
            if let Some(index) = self.user_indexes.get(attribute) {
                for value in values {
                    index.insert(value, id)?;
                }
            }
        }

        set.by_dn.insert(key, id);
        set.by_id.insert(id, (dn.clone(), entry));
        Ok(id)
    }

    /// Removes the entry at `dn` and unwinds the indices.
    pub fn remove_entry(&self, dn: &Dn) -> DirResult<Entry> {
        let mut set = self.entries.write();
        let key = dn.normalized();
        let Some(id) = set.by_dn.remove(&key) else {
            return Err(DirError::EntryNotFound { dn: dn.to_string() });
        };
        let (_, entry) = set.by_id.remove(&id).ok_or(DirError::EntryNotFound {
            dn: dn.to_string(),
        })?;

        for (attribute, values) in entry.attributes() {
            self.existence.remove(attribute, id)?;
            if let Some(index) = self.user_indexes.get(attribute) {
                for value in values {
                    index.remove(value, id)?;
                }
            }
        }
        Ok(entry)
    }

    /// Returns a copy of the entry at `dn`, if present.
    #[must_use]
    pub fn entry(&self, dn: &Dn) -> Option<Entry> {
        let set = self.entries.read();
        let id = set.by_dn.get(&dn.normalized())?;
        set.by_id.get(id).map(|(_, entry)| entry.clone())
    }
}

impl Partition for MemoryPartition {
    fn suffix(&self) -> &Dn {
        &self.suffix
    }

    fn count(&self) -> DirResult<u64> {
        Ok(self.entries.read().by_dn.len() as u64)
    }

    fn entry_id(&self, dn: &Dn) -> DirResult<Option<EntryId>> {
        Ok(self.entries.read().by_dn.get(&dn.normalized()).copied())
    }

    fn child_count(&self, id: EntryId) -> DirResult<u64> {
        let set = self.entries.read();
        let Some((dn, _)) = set.by_id.get(&id) else {
            return Ok(0);
        };
        let count = set
            .by_id
            .values()
            .filter(|(candidate, _)| candidate.parent().as_ref() == Some(dn))
            .count();
        Ok(count as u64)
    }

    fn has_user_index(&self, attribute: &str) -> bool {
        self.user_indexes
            .contains_key(&attribute.trim().to_ascii_lowercase())
    }

    fn user_index(&self, attribute: &str) -> Option<&AttributeIndex> {
        self.user_indexes
            .get(&attribute.trim().to_ascii_lowercase())
    }

    fn existence_index(&self) -> Option<&AttributeIndex> {
        Some(&self.existence)
    }
}

/// Routes DNs to partitions by longest suffix match.
///
/// Partitions are shared by reference; registering a partition at an
/// already-registered suffix replaces the earlier one.
#[derive(Default)]
pub struct PartitionRouter {
    /// Kept sorted by suffix depth, deepest first.
    partitions: Vec<Arc<dyn Partition>>,
}

impl PartitionRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a partition under its suffix.
    pub fn register(&mut self, partition: Arc<dyn Partition>) {
        self.partitions
            .retain(|existing| existing.suffix() != partition.suffix());
        self.partitions.push(partition);
        self.partitions
            .sort_by(|a, b| b.suffix().depth().cmp(&a.suffix().depth()));
    }

    /// Returns the partition with the longest suffix containing `dn`.
    #[must_use]
    pub fn route(&self, dn: &Dn) -> Option<Arc<dyn Partition>> {
        self.partitions
            .iter()
            .find(|partition| dn.is_descendant_or_self(partition.suffix()))
            .cloned()
    }

    /// Returns the number of registered partitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Returns true if no partition is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
