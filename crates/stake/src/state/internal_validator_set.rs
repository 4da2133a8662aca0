//! Validator set projection
//!
//! ## Selection
//!
//! Candidate aktif (punya owner, shares > 0) diurutkan:
//! 1. shares DESC
//! 2. pub_key ASC (tie-break)
//!
//! lalu diambil `max_vals` teratas. Power = shares (saturating ke u64).
//!
//! ## Diff
//!
//! Dibandingkan dengan set yang terakhir disimpan: validator baru atau yang
//! power-nya berubah muncul dengan power baru, validator yang keluar muncul
//! dengan power 0. Output diurutkan pub_key ASC.

use dpos_common::PubKey;
use std::collections::BTreeMap;

use super::internal_state_layout::KEY_VALIDATOR_SET;
use super::{StakeState, ValidatorUpdate};
use crate::error::StakeResult;
use crate::store::Store;

/// Updates turning `old` into `new`, sorted by pub key.
pub fn diff_validator_sets(old: &[ValidatorUpdate], new: &[ValidatorUpdate]) -> Vec<ValidatorUpdate> {
    let old_map: BTreeMap<PubKey, u64> = old.iter().map(|v| (v.pub_key, v.power)).collect();
    let new_map: BTreeMap<PubKey, u64> = new.iter().map(|v| (v.pub_key, v.power)).collect();

    let mut updates: Vec<ValidatorUpdate> = Vec::new();
    for (pk, power) in &new_map {
        if old_map.get(pk) != Some(power) {
            updates.push(ValidatorUpdate { pub_key: *pk, power: *power });
        }
    }
    for pk in old_map.keys() {
        if !new_map.contains_key(pk) {
            updates.push(ValidatorUpdate { pub_key: *pk, power: 0 });
        }
    }
    updates.sort();
    updates
}

impl<S: Store> StakeState<S> {
    /// Current top `max_vals` candidates, highest power first.
    pub fn project_validator_set(&self, max_vals: u16) -> StakeResult<Vec<ValidatorUpdate>> {
        let mut ranked: Vec<(u128, PubKey)> = self
            .candidates()?
            .into_iter()
            .filter(|c| !c.is_withdrawn() && c.shares > 0)
            .map(|c| (c.shares, c.pub_key))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        ranked.truncate(max_vals as usize);

        Ok(ranked
            .into_iter()
            .map(|(shares, pub_key)| ValidatorUpdate {
                pub_key,
                power: u64::try_from(shares).unwrap_or(u64::MAX),
            })
            .collect())
    }

    /// Set emitted at the previous end of block, sorted by pub key.
    pub fn last_validator_set(&self) -> StakeResult<Vec<ValidatorUpdate>> {
        Ok(self.read(KEY_VALIDATOR_SET)?.unwrap_or_default())
    }

    /// Project, diff against the last emitted set, persist the new set.
    pub fn update_validator_set(&mut self, max_vals: u16) -> StakeResult<Vec<ValidatorUpdate>> {
        let mut current = self.project_validator_set(max_vals)?;
        current.sort();
        let previous = self.last_validator_set()?;
        let diff = diff_validator_sets(&previous, &current);
        if !diff.is_empty() {
            self.write(KEY_VALIDATOR_SET, &current)?;
        }
        Ok(diff)
    }
}
