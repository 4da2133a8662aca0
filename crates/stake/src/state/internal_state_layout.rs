//! Internal state layout: key derivation + bincode codec
//!
//! ## Key Layout
//!
//! | Key | Value |
//! |-----|-------|
//! | `params` | `Params` |
//! | `last_height` | `u64` |
//! | `declaration_seq` | `u64`, last declaration number handed out |
//! | `halted_at` | `u64`, height of an epilogue that failed after minting |
//! | `candidate_index` | `Vec<PubKey>` sorted ascending |
//! | `cand/{pubkey:32}` | `Candidate` |
//! | `bond/{address:20}{pubkey:32}` | `DelegatorBond` |
//! | `queue/{name}/meta` | `QueueBounds` |
//! | `queue/{name}/e/{index:u64 BE}` | queue entry |
//! | `validator_set` | `Vec<ValidatorUpdate>` sorted by pubkey |
//!
//! Format key ini CONSENSUS-CRITICAL: mengubahnya berarti state lama tidak terbaca.

use dpos_common::{Address, PubKey};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::StakeState;
use crate::error::{StakeError, StakeResult};
use crate::params::Params;
use crate::store::Store;

pub(super) const KEY_PARAMS: &[u8] = b"params";
pub(super) const KEY_LAST_HEIGHT: &[u8] = b"last_height";
pub(super) const KEY_DECLARATION_SEQ: &[u8] = b"declaration_seq";
pub(super) const KEY_HALTED_AT: &[u8] = b"halted_at";
pub(super) const KEY_CANDIDATE_INDEX: &[u8] = b"candidate_index";
pub(super) const KEY_VALIDATOR_SET: &[u8] = b"validator_set";
const PREFIX_CANDIDATE: &[u8] = b"cand/";
const PREFIX_BOND: &[u8] = b"bond/";
const PREFIX_QUEUE: &[u8] = b"queue/";

pub(super) fn candidate_key(pk: &PubKey) -> Vec<u8> {
    [PREFIX_CANDIDATE, &pk.as_bytes()[..]].concat()
}

pub(super) fn bond_key(delegator: &Address, pk: &PubKey) -> Vec<u8> {
    [PREFIX_BOND, &delegator.as_bytes()[..], &pk.as_bytes()[..]].concat()
}

pub(super) fn queue_meta_key(name: &str) -> Vec<u8> {
    [PREFIX_QUEUE, name.as_bytes(), &b"/meta"[..]].concat()
}

pub(super) fn queue_entry_key(name: &str, index: u64) -> Vec<u8> {
    [PREFIX_QUEUE, name.as_bytes(), &b"/e/"[..], &index.to_be_bytes()[..]].concat()
}

impl<S: Store> StakeState<S> {
    // ============================================================
    // CODEC
    // ============================================================

    pub(super) fn read<T: DeserializeOwned>(&self, key: &[u8]) -> StakeResult<Option<T>> {
        match self.store.get(key)? {
            Some(raw) => Ok(Some(bincode::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub(super) fn write<T: Serialize>(&mut self, key: &[u8], value: &T) -> StakeResult<()> {
        let raw = bincode::serialize(value)?;
        self.store.set(key, raw)?;
        Ok(())
    }

    pub(super) fn remove(&mut self, key: &[u8]) -> StakeResult<()> {
        self.store.delete(key)?;
        Ok(())
    }

    // ============================================================
    // PARAMS & HEIGHT
    // ============================================================

    /// Stored params, or defaults before genesis wrote any.
    pub fn load_params(&self) -> StakeResult<Params> {
        Ok(self.read(KEY_PARAMS)?.unwrap_or_default())
    }

    pub fn has_params(&self) -> StakeResult<bool> {
        Ok(self.store.get(KEY_PARAMS)?.is_some())
    }

    pub fn save_params(&mut self, params: &Params) -> StakeResult<()> {
        self.write(KEY_PARAMS, params)
    }

    /// Height of the last block whose epilogue ran.
    pub fn last_height(&self) -> StakeResult<Option<u64>> {
        self.read(KEY_LAST_HEIGHT)
    }

    pub fn set_last_height(&mut self, height: u64) -> StakeResult<()> {
        self.write(KEY_LAST_HEIGHT, &height)
    }

    /// Hand out the next declaration number (starts at 1).
    pub fn next_declaration(&mut self) -> StakeResult<u64> {
        let last: u64 = self.read(KEY_DECLARATION_SEQ)?.unwrap_or(0);
        let next = last.checked_add(1).ok_or(StakeError::Overflow("declaration seq"))?;
        self.write(KEY_DECLARATION_SEQ, &next)?;
        Ok(next)
    }

    // ============================================================
    // HALT MARKER
    // ============================================================

    /// Height whose epilogue failed after the ledger already moved value.
    pub fn halted_at(&self) -> StakeResult<Option<u64>> {
        self.read(KEY_HALTED_AT)
    }

    pub fn set_halted_at(&mut self, height: u64) -> StakeResult<()> {
        self.write(KEY_HALTED_AT, &height)
    }

    pub fn clear_halt(&mut self) -> StakeResult<()> {
        self.remove(KEY_HALTED_AT)
    }
}
