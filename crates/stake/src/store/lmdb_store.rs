//! LMDB backend. Satu environment bisa menampung beberapa module (named db),
//! misalnya `stake` untuk state staking dan `bank` untuk saldo.

use lmdb::{Database, DatabaseFlags, Environment, Transaction as LmdbTxn, WriteFlags};
use std::path::Path;
use std::sync::Arc;

use super::{Store, WriteBatch};
use crate::error::StoreError;

/// Maximum named databases per environment.
const MAX_DBS: u32 = 8;

/// Open (creating the directory if needed) an LMDB environment.
pub fn open_env(path: impl AsRef<Path>, map_size: usize) -> Result<Arc<Environment>, StoreError> {
    let p = path.as_ref();
    std::fs::create_dir_all(p)?;
    let env = Environment::new()
        .set_max_dbs(MAX_DBS)
        .set_map_size(map_size)
        .open(p)?;
    Ok(Arc::new(env))
}

pub struct LmdbStore {
    env: Arc<Environment>,
    db: Database,
}

impl LmdbStore {
    /// Open or create the named database `name` inside `env`.
    pub fn new(env: Arc<Environment>, name: &str) -> Result<Self, StoreError> {
        let db = env.create_db(Some(name), DatabaseFlags::empty())?;
        Ok(LmdbStore { env, db })
    }

    pub fn sync(&self) -> Result<(), StoreError> {
        self.env.sync(true)?;
        Ok(())
    }
}

impl Store for LmdbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        let txn = self.env.begin_ro_txn()?;
        match txn.get(self.db, &key) {
            Ok(bytes) => Ok(Some(bytes.to_vec())),
            Err(lmdb::Error::NotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &[u8], value: Vec<u8>) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        txn.put(self.db, &key, &value, WriteFlags::empty())?;
        txn.commit()?;
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        match txn.del(self.db, &key, None) {
            Ok(()) | Err(lmdb::Error::NotFound) => {}
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;
        Ok(())
    }

    fn apply_batch(&mut self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut txn = self.env.begin_rw_txn()?;
        for (key, op) in batch.into_ops() {
            match op {
                Some(value) => txn.put(self.db, &key, &value, WriteFlags::empty())?,
                None => match txn.del(self.db, &key, None) {
                    Ok(()) | Err(lmdb::Error::NotFound) => {}
                    Err(e) => return Err(e.into()),
                },
            }
        }
        txn.commit()?;
        Ok(())
    }
}
