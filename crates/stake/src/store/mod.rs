//! Byte-keyed key-value storage used by the staking module.
//!
//! ## Module Structure
//!
//! | Module | Fungsi |
//! |--------|--------|
//! | `memory` | `MemStore`: BTreeMap, untuk tests dan tooling |
//! | `cache` | `CacheStore`: write-buffer overlay di atas store lain |
//! | `lmdb_store` | `LmdbStore`: satu named database di environment LMDB |
//!
//! Semua mutasi satu transaksi dikumpulkan di `CacheStore` lalu di-flush
//! sebagai satu [`WriteBatch`]. Backend yang mendukung transaksi (LMDB)
//! meng-commit batch dalam satu write txn.

use std::collections::BTreeMap;

use crate::error::StoreError;

mod cache;
mod lmdb_store;
mod memory;

pub use self::cache::CacheStore;
pub use self::lmdb_store::{open_env, LmdbStore};
pub use self::memory::MemStore;

pub trait Store {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError>;
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError>;

    /// Apply a batch of writes. Backends with transactions override this to
    /// commit the whole batch at once.
    fn apply_batch(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        for (key, op) in batch.ops {
            match op {
                Some(value) => self.set(&key, value)?,
                None => self.delete(&key)?,
            }
        }
        Ok(())
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        (**self).get(key)
    }
    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        (**self).delete(key)
    }
    fn apply_batch(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        (**self).apply_batch(batch)
    }
}

/// Ordered set of pending writes. `None` marks a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBatch {
    pub fn new() -> Self { Self::default() }

    pub fn put(&mut self, key: &[u8], value: Vec<u8>) {
        self.ops.insert(key.to_vec(), Some(value));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.ops.insert(key.to_vec(), None);
    }

    /// `Some(None)` = deleted in this batch, `None` = untouched.
    pub fn lookup(&self, key: &[u8]) -> Option<Option<&Vec<u8>>> {
        self.ops.get(key).map(|v| v.as_ref())
    }

    pub fn len(&self) -> usize { self.ops.len() }
    pub fn is_empty(&self) -> bool { self.ops.is_empty() }

    /// Flush into `store`.
    pub fn commit<S: Store + ?Sized>(self, store: &mut S) -> Result<(), StoreError> {
        if self.is_empty() {
            return Ok(());
        }
        store.apply_batch(self)
    }

    pub(crate) fn into_ops(self) -> BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        self.ops
    }
}
