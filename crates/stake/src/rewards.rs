//! # Block Reward Policy
//!
//! Extension point for how much each candidate earns per block. The epilogue
//! asks the policy for every registered candidate (ascending by pub key) and
//! then splits the amount with [`split_commission`].
//!
//! ## Invariant
//!
//! For [`ProportionalReward`]:
//!
//! ```text
//! Σ reward_for(c) <= params.block_reward
//! ```
//!
//! The truncation remainder is never minted.
//!
//! ## Determinism
//!
//! Policies must be pure functions of their arguments. No clock, no randomness.

use crate::decimal::mul_div_floor;
use crate::error::{StakeError, StakeResult};
use crate::params::Params;
use crate::state::Candidate;

// ════════════════════════════════════════════════════════════════════════════════
// POLICY TRAIT
// ════════════════════════════════════════════════════════════════════════════════

pub trait RewardPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Value minted for `candidate` this block.
    fn reward_for(&self, candidate: &Candidate, total_shares: u128, params: &Params) -> StakeResult<u128>;
}

/// `floor(block_reward * shares / total_shares)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionalReward;

impl RewardPolicy for ProportionalReward {
    fn name(&self) -> &'static str { "proportional" }

    fn reward_for(&self, candidate: &Candidate, total_shares: u128, params: &Params) -> StakeResult<u128> {
        if total_shares == 0 || params.block_reward == 0 {
            return Ok(0);
        }
        mul_div_floor(params.block_reward, candidate.shares, total_shares)
            .ok_or(StakeError::Overflow("proportional reward"))
    }
}

/// Same amount for every candidate regardless of stake.
#[derive(Debug, Clone, Copy)]
pub struct FixedReward {
    pub per_candidate: u128,
}

impl RewardPolicy for FixedReward {
    fn name(&self) -> &'static str { "fixed" }

    fn reward_for(&self, _candidate: &Candidate, _total_shares: u128, _params: &Params) -> StakeResult<u128> {
        Ok(self.per_candidate)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// SPLIT
// ════════════════════════════════════════════════════════════════════════════════

/// `(owner_part, pool_part)` where `owner_part = floor(reward * commission)`.
pub fn split_commission(candidate: &Candidate, reward: u128) -> StakeResult<(u128, u128)> {
    let owner_part = candidate
        .commission
        .mul_floor(reward)
        .ok_or(StakeError::Overflow("commission split"))?
        .min(reward);
    Ok((owner_part, reward - owner_part))
}
