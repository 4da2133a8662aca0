//! # Stake State Module
//!
//! Module ini adalah **FACADE** untuk seluruh state staking yang disimpan di
//! key-value store: candidate registry, delegator bond ledger, dua delay queue,
//! params, dan validator set terakhir.
//!
//! ## Arsitektur
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      mod.rs (FACADE)                            │
//! │  - StakeState<S: Store> struct                                  │
//! │  - Public re-exports                                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//!        ┌───────────────────────┼───────────────────────┐
//!        ▼                       ▼                       ▼
//! ┌──────────────┐       ┌──────────────┐       ┌──────────────┐
//! │  Candidates  │       │    Bonds     │       │ Delay Queues │
//! └──────────────┘       └──────────────┘       └──────────────┘
//!        │                       │                       │
//!        ▼                       ▼                       ▼
//! ┌──────────────┐       ┌──────────────┐       ┌──────────────┐
//! │   Bonding    │       │   Rewards    │       │ Validator Set│
//! │  Accounting  │       │ Distribution │       │  Projection  │
//! └──────────────┘       └──────────────┘       └──────────────┘
//! ```
//!
//! ## Module Structure
//!
//! | Module | Fungsi |
//! |--------|--------|
//! | `internal_model` | Data structures: Candidate, DelegatorBond, queue entries, ValidatorUpdate |
//! | `internal_state_layout` | Key layout, bincode codec, params & height persistence |
//! | `internal_candidates` | Candidate registry + sorted index |
//! | `internal_bonds` | Delegator bond ledger |
//! | `internal_queue` | Generic FIFO delay queue over the store |
//! | `internal_bonding` | Share issuance / redemption accounting |
//! | `internal_rewards` | Per-block reward distribution |
//! | `internal_validator_set` | Top-N projection and diff against the last set |
//!
//! `StakeState` tidak pernah memegang cache: setiap read langsung ke store,
//! sehingga overlay (`CacheStore`) cukup untuk membuat satu transaksi atomic.

use crate::store::Store;

/// Data structures
mod internal_model;
/// Key layout and codec helpers
mod internal_state_layout;
/// Candidate registry
mod internal_candidates;
/// Delegator bonds
mod internal_bonds;
/// Delay queues
mod internal_queue;
/// Bond / unbond accounting
mod internal_bonding;
/// Reward distribution
mod internal_rewards;
/// Validator set projection
mod internal_validator_set;

#[cfg(test)]
mod tests;

// ════════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ════════════════════════════════════════════════════════════════════════════

pub use internal_bonding::UnbondOutcome;
pub use internal_model::{
    Candidate, CommissionChangeEntry, CommissionWindow, DelegatorBond, Description, UnbondEntry,
    ValidatorUpdate, MAX_DETAILS_LEN, MAX_IDENTITY_LEN, MAX_MONIKER_LEN, MAX_WEBSITE_LEN,
};
pub use internal_queue::{is_matured, DelayQueue, QueueEntry, COMMISSION_QUEUE, UNBONDING_QUEUE};
pub use internal_rewards::RewardSummary;
pub use internal_validator_set::diff_validator_sets;

/// Typed view of the staking module's slice of a [`Store`].
pub struct StakeState<S: Store> {
    store: S,
}

impl<S: Store> StakeState<S> {
    pub fn new(store: S) -> Self {
        StakeState { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
