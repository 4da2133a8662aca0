//! Internal reward distribution
//!
//! Dipanggil epilogue setelah kedua queue di-drain, jadi reward selalu melihat
//! registry pasca-unbonding.
//!
//! | Curve | owner part (commission) | pool part |
//! |-------|-------------------------|-----------|
//! | compounding | credit ke owner | credit ke hold account, `bonded += part` |
//! | flat | seluruh reward ke owner | - |
//!
//! Candidate withdrawn (tanpa owner): pada curve compounding seluruh reward
//! masuk pool; pada curve flat candidate dilewati.

use dpos_common::Coin;
use tracing::debug;

use super::StakeState;
use crate::error::{StakeError, StakeResult};
use crate::ledger::Ledger;
use crate::params::Params;
use crate::rewards::{split_commission, RewardPolicy};
use crate::store::Store;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardSummary {
    pub candidates_rewarded: usize,
    pub minted: u128,
    /// Part of `minted` added to pools.
    pub compounded: u128,
}

impl<S: Store> StakeState<S> {
    pub fn distribute_rewards<L: Ledger>(
        &mut self,
        ledger: &mut L,
        params: &Params,
        policy: &dyn RewardPolicy,
    ) -> StakeResult<RewardSummary> {
        let mut summary = RewardSummary::default();
        let total_shares = self.total_shares()?;
        let curve = params.curve();
        let denom = params.allowed_bond_denom.as_str();

        for mut candidate in self.candidates()? {
            let reward = policy.reward_for(&candidate, total_shares, params)?;
            if reward == 0 {
                continue;
            }

            let (mut owner_part, mut pool_part) = if curve.compounds_rewards() {
                split_commission(&candidate, reward)?
            } else {
                (reward, 0)
            };

            match candidate.owner {
                Some(owner) => {
                    if owner_part > 0 {
                        ledger.credit(&owner, &Coin::new(denom, owner_part))?;
                    }
                }
                None if curve.compounds_rewards() => {
                    pool_part += owner_part;
                    owner_part = 0;
                }
                None => continue,
            }

            if pool_part > 0 {
                ledger.credit(&params.hold_account, &Coin::new(denom, pool_part))?;
                candidate.bonded = candidate
                    .bonded
                    .checked_add(pool_part)
                    .ok_or(StakeError::Overflow("reward compounding"))?;
                candidate.refresh_exchange_rate()?;
                self.save_candidate(&candidate)?;
            }

            debug!(
                "reward {} for {}: owner {}, pool {}",
                reward, candidate.pub_key, owner_part, pool_part
            );
            summary.candidates_rewarded += 1;
            summary.minted = summary.minted.saturating_add(owner_part + pool_part);
            summary.compounded = summary.compounded.saturating_add(pool_part);
        }
        Ok(summary)
    }
}
