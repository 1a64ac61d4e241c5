//! In-memory table for testing and ephemeral directories.

use crate::error::StoreResult;
use crate::table::Table;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};

/// An in-memory ordered table.
///
/// Stores all pairs in a `BTreeMap` and is suitable for:
/// - Unit and integration tests
/// - Ephemeral directories that don't need persistence
/// - The default changelog store
///
/// # Thread Safety
///
/// The table is thread-safe; each call takes the internal lock once,
/// so a single call always observes a consistent snapshot.
///
/// # Example
///
/// ```rust
/// use dirdb_store::{MemoryTable, Table};
///
/// let table = MemoryTable::new();
/// table.put(b"objectclass", b"person").unwrap();
/// assert!(table.has(b"objectclass").unwrap());
/// ```
#[derive(Debug, Default)]
pub struct MemoryTable {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    map: BTreeMap<Vec<u8>, BTreeSet<Vec<u8>>>,
    /// Total pair count, kept incrementally so `count` is O(1).
    pairs: u64,
}

impl MemoryTable {
    /// Creates a new empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every pair from the table.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.map.clear();
        inner.pairs = 0;
    }
}

impl Table for MemoryTable {
    fn count(&self) -> StoreResult<u64> {
        Ok(self.inner.read().pairs)
    }

    fn count_key(&self, key: &[u8]) -> StoreResult<u64> {
        let inner = self.inner.read();
        Ok(inner.map.get(key).map_or(0, |values| values.len() as u64))
    }

    fn count_from(&self, key: &[u8], greater: bool) -> StoreResult<u64> {
        let inner = self.inner.read();
        let total: u64 = if greater {
            inner
                .map
                .range(key.to_vec()..)
                .map(|(_, values)| values.len() as u64)
                .sum()
        } else {
            inner
                .map
                .range(..=key.to_vec())
                .map(|(_, values)| values.len() as u64)
                .sum()
        };
        Ok(total)
    }

    fn has(&self, key: &[u8]) -> StoreResult<bool> {
        Ok(self.inner.read().map.contains_key(key))
    }

    fn has_pair(&self, key: &[u8], value: &[u8]) -> StoreResult<bool> {
        let inner = self.inner.read();
        Ok(inner.map.get(key).is_some_and(|values| values.contains(value)))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        let mut inner = self.inner.write();
        let inserted = inner
            .map
            .entry(key.to_vec())
            .or_default()
            .insert(value.to_vec());
        if inserted {
            inner.pairs += 1;
        }
        Ok(())
    }

    fn remove(&self, key: &[u8], value: Option<&[u8]>) -> StoreResult<bool> {
        let mut inner = self.inner.write();
        match value {
            Some(value) => {
                let Some(values) = inner.map.get_mut(key) else {
                    return Ok(false);
                };
                let removed = values.remove(value);
                if removed {
                    inner.pairs -= 1;
                    if inner.map.get(key).is_some_and(BTreeSet::is_empty) {
                        inner.map.remove(key);
                    }
                }
                Ok(removed)
            }
            None => {
                let Some(values) = inner.map.remove(key) else {
                    return Ok(false);
                };
                inner.pairs -= values.len() as u64;
                Ok(true)
            }
        }
    }

    fn values(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>> {
        let inner = self.inner.read();
        Ok(inner
            .map
            .get(key)
            .map(|values| values.iter().cloned().collect())
            .unwrap_or_default())
    }
}
