//! Bonding curves: konversi value ⇄ shares untuk satu candidate pool.
//!
//! ## Rounding
//!
//! Semua konversi di-truncate ke bawah. Pool tidak pernah menerbitkan shares
//! lebih dari yang dibayar, dan tidak pernah membayar value lebih dari nilai
//! shares. Pemegang shares terakhir menerima seluruh `bonded` yang tersisa
//! sehingga tidak ada dust yang tertinggal di pool.

use crate::decimal::mul_div_floor;
use crate::error::{StakeError, StakeResult};
use crate::state::Candidate;

pub trait BondingCurve: Send + Sync {
    fn name(&self) -> &'static str;

    /// Shares issued for bonding `value` into `pool` now.
    fn shares_for(&self, pool: &Candidate, value: u128) -> StakeResult<u128>;

    /// Value released for redeeming `shares` from `pool` now.
    fn value_for(&self, pool: &Candidate, shares: u128) -> StakeResult<u128>;

    /// Whether block rewards are added to the pool (raising the rate)
    /// instead of being paid out to the owner.
    fn compounds_rewards(&self) -> bool;
}

/// One share per unit, forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatCurve;

impl BondingCurve for FlatCurve {
    fn name(&self) -> &'static str { "flat" }

    fn shares_for(&self, _pool: &Candidate, value: u128) -> StakeResult<u128> {
        Ok(value)
    }

    fn value_for(&self, _pool: &Candidate, shares: u128) -> StakeResult<u128> {
        Ok(shares)
    }

    fn compounds_rewards(&self) -> bool { false }
}

/// Shares priced at `bonded / shares` of the pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeRateCurve;

impl BondingCurve for ExchangeRateCurve {
    fn name(&self) -> &'static str { "exchange_rate" }

    fn shares_for(&self, pool: &Candidate, value: u128) -> StakeResult<u128> {
        if pool.shares == 0 || pool.bonded == 0 {
            return Ok(value);
        }
        mul_div_floor(value, pool.shares, pool.bonded).ok_or(StakeError::Overflow("shares_for"))
    }

    fn value_for(&self, pool: &Candidate, shares: u128) -> StakeResult<u128> {
        if shares > pool.shares {
            return Err(StakeError::InsufficientShares { have: pool.shares, want: shares });
        }
        if shares == pool.shares {
            return Ok(pool.bonded);
        }
        mul_div_floor(shares, pool.bonded, pool.shares).ok_or(StakeError::Overflow("value_for"))
    }

    fn compounds_rewards(&self) -> bool { true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpos_common::{Address, PubKey};

    fn pool(shares: u128, bonded: u128) -> Candidate {
        let mut c = Candidate::new(PubKey::from_bytes([1; 32]), Address::from_bytes([1; 20]), Default::default());
        c.shares = shares;
        c.bonded = bonded;
        c.refresh_exchange_rate().expect("rate");
        c
    }

    #[test]
    fn empty_pool_issues_one_to_one() {
        let c = pool(0, 0);
        assert_eq!(ExchangeRateCurve.shares_for(&c, 100).expect("shares"), 100);
    }

    #[test]
    fn shares_truncate_toward_pool() {
        // rate 1.5: 2 units buy floor(2 / 1.5) = 1 share
        let c = pool(2, 3);
        assert_eq!(ExchangeRateCurve.shares_for(&c, 2).expect("shares"), 1);
        // 1 unit buys nothing
        assert_eq!(ExchangeRateCurve.shares_for(&c, 1).expect("shares"), 0);
    }

    #[test]
    fn value_truncates_except_last_holder() {
        let c = pool(3, 10);
        assert_eq!(ExchangeRateCurve.value_for(&c, 1).expect("value"), 3);
        assert_eq!(ExchangeRateCurve.value_for(&c, 2).expect("value"), 6);
        assert_eq!(ExchangeRateCurve.value_for(&c, 3).expect("value"), 10);
    }

    #[test]
    fn value_for_more_than_pool_fails() {
        let c = pool(3, 10);
        assert!(matches!(
            ExchangeRateCurve.value_for(&c, 4),
            Err(StakeError::InsufficientShares { have: 3, want: 4 })
        ));
    }

    #[test]
    fn flat_curve_ignores_rate() {
        let c = pool(2, 3);
        assert_eq!(FlatCurve.shares_for(&c, 7).expect("shares"), 7);
        assert_eq!(FlatCurve.value_for(&c, 7).expect("value"), 7);
        assert!(!FlatCurve.compounds_rewards());
        assert!(ExchangeRateCurve.compounds_rewards());
    }
}
