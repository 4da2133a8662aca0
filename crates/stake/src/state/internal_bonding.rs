//! Bond / unbond accounting.
//!
//! Fungsi di sini hanya mengubah registry dan bond ledger. Perpindahan value
//! (ledger transfer) dilakukan oleh handler sebelum `credit_shares` dipanggil,
//! dan oleh epilogue saat entry unbonding matang.
//!
//! Invariant setelah setiap operasi:
//! - Σ bond.shares untuk satu candidate == candidate.shares
//! - candidate.exchange_rate == bonded / shares (1 jika shares == 0)

use dpos_common::{Address, PubKey};
use tracing::debug;

use super::{Candidate, DelegatorBond, StakeState};
use crate::bonding::BondingCurve;
use crate::error::{StakeError, StakeResult};
use crate::store::Store;

/// What an unbond did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnbondOutcome {
    /// Value owed to the delegator.
    pub value: u128,
    pub bond_removed: bool,
    /// Owner fully unbonded; candidate kept for remaining delegators.
    pub owner_resigned: bool,
    pub candidate_removed: bool,
}

impl<S: Store> StakeState<S> {
    /// Add `issued` shares worth `value` to `candidate` and to the bond of
    /// `delegator`. Persists both.
    pub fn credit_shares(
        &mut self,
        candidate: &mut Candidate,
        delegator: &Address,
        issued: u128,
        value: u128,
    ) -> StakeResult<()> {
        let mut bond = self
            .get_bond(delegator, &candidate.pub_key)?
            .unwrap_or(DelegatorBond { delegator: *delegator, pub_key: candidate.pub_key, shares: 0 });

        bond.shares = bond.shares.checked_add(issued).ok_or(StakeError::Overflow("bond shares"))?;
        candidate.shares = candidate
            .shares
            .checked_add(issued)
            .ok_or(StakeError::Overflow("candidate shares"))?;
        candidate.bonded = candidate
            .bonded
            .checked_add(value)
            .ok_or(StakeError::Overflow("candidate bonded"))?;
        candidate.refresh_exchange_rate()?;

        self.save_bond(&bond)?;
        self.save_candidate(candidate)?;
        debug!(
            "bonded {} shares ({} value) from {} to {}",
            issued, value, delegator, candidate.pub_key
        );
        Ok(())
    }

    /// Remove `shares` of `delegator` from candidate `pk` at the current
    /// exchange rate. Fails without writing anything if the bond is missing
    /// or too small.
    pub fn debit_shares(
        &mut self,
        curve: &dyn BondingCurve,
        delegator: &Address,
        pk: &PubKey,
        shares: u128,
    ) -> StakeResult<UnbondOutcome> {
        let mut bond = self
            .get_bond(delegator, pk)?
            .ok_or(StakeError::NoBondFound { delegator: *delegator, pub_key: *pk })?;
        if shares > bond.shares {
            return Err(StakeError::InsufficientShares { have: bond.shares, want: shares });
        }
        let mut candidate = self.get_candidate(pk)?.ok_or(StakeError::CandidateNotFound(*pk))?;
        if shares > candidate.shares {
            return Err(StakeError::InsufficientShares { have: candidate.shares, want: shares });
        }

        // last holder takes whatever is left in the pool
        let value = if shares == candidate.shares {
            candidate.bonded
        } else {
            curve.value_for(&candidate, shares)?.min(candidate.bonded)
        };

        bond.shares -= shares;
        candidate.shares -= shares;
        candidate.bonded -= value;
        candidate.refresh_exchange_rate()?;

        let bond_removed = bond.shares == 0;
        let owner_resigned = bond_removed && candidate.is_owned_by(delegator);
        if owner_resigned {
            candidate.owner = None;
        }
        let candidate_removed = candidate.shares == 0;

        self.save_bond(&bond)?;
        if candidate_removed {
            self.remove_candidate(pk)?;
        } else {
            self.save_candidate(&candidate)?;
        }

        Ok(UnbondOutcome { value, bond_removed, owner_resigned, candidate_removed })
    }
}
