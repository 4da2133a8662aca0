//! Candidate registry.
//!
//! Enumerasi candidate memakai index terurut (`candidate_index`), bukan urutan
//! iterasi store, agar hasil deterministik di semua backend.

use dpos_common::PubKey;
use tracing::debug;

use super::internal_state_layout::{candidate_key, KEY_CANDIDATE_INDEX};
use super::{Candidate, StakeState};
use crate::error::{StakeError, StakeResult};
use crate::store::Store;

impl<S: Store> StakeState<S> {
    pub fn get_candidate(&self, pk: &PubKey) -> StakeResult<Option<Candidate>> {
        self.read(&candidate_key(pk))
    }

    /// Registered and not withdrawn, else `CandidateNotFound`.
    pub fn get_active_candidate(&self, pk: &PubKey) -> StakeResult<Candidate> {
        match self.get_candidate(pk)? {
            Some(c) if !c.is_withdrawn() => Ok(c),
            _ => Err(StakeError::CandidateNotFound(*pk)),
        }
    }

    /// Insert or update. New keys are added to the sorted index.
    pub fn save_candidate(&mut self, candidate: &Candidate) -> StakeResult<()> {
        let key = candidate_key(&candidate.pub_key);
        if self.store.get(&key)?.is_none() {
            let mut index = self.candidate_keys()?;
            if let Err(pos) = index.binary_search(&candidate.pub_key) {
                index.insert(pos, candidate.pub_key);
                self.write(KEY_CANDIDATE_INDEX, &index)?;
            }
        }
        self.write(&key, candidate)
    }

    pub fn remove_candidate(&mut self, pk: &PubKey) -> StakeResult<()> {
        let mut index = self.candidate_keys()?;
        if let Ok(pos) = index.binary_search(pk) {
            index.remove(pos);
            self.write(KEY_CANDIDATE_INDEX, &index)?;
        }
        debug!("candidate {} removed from registry", pk);
        self.remove(&candidate_key(pk))
    }

    /// All registered candidate keys, ascending.
    pub fn candidate_keys(&self) -> StakeResult<Vec<PubKey>> {
        Ok(self.read(KEY_CANDIDATE_INDEX)?.unwrap_or_default())
    }

    /// All registered candidates (including withdrawn), ascending by key.
    pub fn candidates(&self) -> StakeResult<Vec<Candidate>> {
        let mut out = Vec::new();
        for pk in self.candidate_keys()? {
            if let Some(c) = self.get_candidate(&pk)? {
                out.push(c);
            }
        }
        Ok(out)
    }

    pub fn total_shares(&self) -> StakeResult<u128> {
        self.candidates()?
            .iter()
            .try_fold(0u128, |acc, c| acc.checked_add(c.shares))
            .ok_or(StakeError::Overflow("total_shares"))
    }
}
