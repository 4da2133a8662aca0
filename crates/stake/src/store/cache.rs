use super::{Store, WriteBatch};
use crate::error::StoreError;

/// Read-through overlay: reads fall back to `parent`, writes stay buffered
/// until [`CacheStore::into_batch`] hands them back. Dropping the overlay
/// discards every buffered write.
pub struct CacheStore<'a, S: Store + ?Sized> {
    parent: &'a S,
    pending: WriteBatch,
}

impl<'a, S: Store + ?Sized> CacheStore<'a, S> {
    pub fn new(parent: &'a S) -> Self {
        CacheStore { parent, pending: WriteBatch::new() }
    }

    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    pub fn into_batch(self) -> WriteBatch {
        self.pending
    }
}

impl<'a, S: Store + ?Sized> Store for CacheStore<'a, S> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        match self.pending.lookup(key) {
            Some(hit) => Ok(hit.cloned()),
            None => self.parent.get(key),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        self.pending.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        self.pending.delete(key);
        Ok(())
    }
}
