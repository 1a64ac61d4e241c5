//! Attribute indices over the ordered table facade.

use crate::error::DirResult;
use crate::types::EntryId;
use dirdb_store::{MemoryTable, Table};

/// An index over one attribute's values.
///
/// Keys are normalized attribute values (trimmed, lowercased); values
/// are entry ids. One attribute value may map to many entries, so the
/// optimizer's per-value estimates come straight from the table's
/// duplicate counts.
///
/// The existence index is an `AttributeIndex` keyed by attribute type
/// instead of value: it answers "how many entries carry attribute X".
pub struct AttributeIndex {
    attribute: String,
    table: Box<dyn Table>,
}

impl AttributeIndex {
    /// Creates an index over `attribute`, backed by `table`.
    #[must_use]
    pub fn new(attribute: &str, table: Box<dyn Table>) -> Self {
        Self {
            attribute: attribute.trim().to_ascii_lowercase(),
            table,
        }
    }

    /// Creates an index backed by an in-memory table.
    #[must_use]
    pub fn in_memory(attribute: &str) -> Self {
        Self::new(attribute, Box::new(MemoryTable::new()))
    }

    /// Returns the attribute this index covers.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Inserts a value-to-entry mapping.
    pub fn insert(&self, value: &str, id: EntryId) -> DirResult<()> {
        self.table.put(&key(value), &id.to_bytes())?;
        Ok(())
    }

    /// Removes a value-to-entry mapping.
    ///
    /// Returns true if the mapping existed.
    pub fn remove(&self, value: &str, id: EntryId) -> DirResult<bool> {
        Ok(self.table.remove(&key(value), Some(&id.to_bytes()))?)
    }

    /// Returns the total number of value-entry pairs in the index.
    pub fn count(&self) -> DirResult<u64> {
        Ok(self.table.count()?)
    }

    /// Returns the number of entries holding exactly `value`.
    pub fn count_value(&self, value: &str) -> DirResult<u64> {
        Ok(self.table.count_key(&key(value))?)
    }

    /// Returns the number of pairs at or beyond `value`.
    ///
    /// `greater` selects `>= value` versus `<= value`.
    pub fn count_range(&self, value: &str, greater: bool) -> DirResult<u64> {
        Ok(self.table.count_from(&key(value), greater)?)
    }

    /// Returns true if any entry holds `value`.
    pub fn has_value(&self, value: &str) -> DirResult<bool> {
        Ok(self.table.has(&key(value))?)
    }

    /// Returns the ids of entries holding `value`, in id order.
    pub fn entry_ids(&self, value: &str) -> DirResult<Vec<EntryId>> {
        let raw = self.table.values(&key(value))?;
        Ok(raw
            .into_iter()
            .filter_map(|bytes| {
                let arr: [u8; 8] = bytes.as_slice().try_into().ok()?;
                Some(EntryId::new(u64::from_be_bytes(arr)))
            })
            .collect())
    }
}

fn key(value: &str) -> Vec<u8> {
    value.trim().to_ascii_lowercase().into_bytes()
}
