//! Table trait definition.

use crate::error::StoreResult;

/// An ordered key-value table with duplicate-key support.
///
/// Tables are **opaque byte stores**. Keys are ordered by raw byte
/// comparison; a key may map to several values, kept in value order.
/// DirDB owns all key and value encoding - tables do not understand
/// DNs, entry ids, or attribute values.
///
/// # Invariants
///
/// - `count` equals the total number of `(key, value)` pairs
/// - `count_key` equals the number of values stored under one key
/// - `count_from` counts pairs whose key is `>=` (or `<=`) a boundary
/// - `values` returns duplicates in ascending value order
/// - Implementations must be `Send + Sync`; concurrent readers see a
///   consistent snapshot of any single call
///
/// # Implementors
///
/// - [`super::MemoryTable`] - For testing and ephemeral directories
pub trait Table: Send + Sync {
    /// Returns the total number of key-value pairs in the table.
    ///
    /// Duplicate values under one key each count as a pair.
    fn count(&self) -> StoreResult<u64>;

    /// Returns the number of values stored under `key`.
    ///
    /// Returns 0 when the key is absent.
    fn count_key(&self, key: &[u8]) -> StoreResult<u64>;

    /// Returns the number of pairs at or beyond a key boundary.
    ///
    /// When `greater` is true, counts pairs with key `>= key`;
    /// otherwise pairs with key `<= key`.
    fn count_from(&self, key: &[u8], greater: bool) -> StoreResult<u64>;

    /// Returns true if at least one value is stored under `key`.
    fn has(&self, key: &[u8]) -> StoreResult<bool>;

    /// Returns true if the exact `(key, value)` pair is stored.
    fn has_pair(&self, key: &[u8], value: &[u8]) -> StoreResult<bool>;

    /// Inserts a key-value pair.
    ///
    /// Inserting a pair that already exists is a no-op.
    fn put(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Removes a pair, or every pair under `key` when `value` is `None`.
    ///
    /// Returns true if anything was removed.
    fn remove(&self, key: &[u8], value: Option<&[u8]>) -> StoreResult<bool>;

    /// Returns the values stored under `key`, in ascending order.
    fn values(&self, key: &[u8]) -> StoreResult<Vec<Vec<u8>>>;
}
