#[cfg(test)]
mod bonding_tests {
    use dpos_common::{Address, PubKey};

    use crate::bonding::{ExchangeRateCurve, FlatCurve};
    use crate::decimal::Decimal;
    use crate::error::StakeError;
    use crate::state::{Candidate, StakeState};
    use crate::store::MemStore;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn pk(byte: u8) -> PubKey {
        PubKey::from_bytes([byte; 32])
    }

    /// Candidate owned by `addr(1)` with `amount` self-bonded 1:1.
    fn seeded(amount: u128) -> (StakeState<MemStore>, Candidate) {
        let mut state = StakeState::new(MemStore::new());
        let mut c = Candidate::new(pk(1), addr(1), Default::default());
        state.save_candidate(&c).expect("save");
        state.credit_shares(&mut c, &addr(1), amount, amount).expect("credit");
        (state, c)
    }

    #[test]
    fn credit_updates_bond_and_candidate() {
        let (state, c) = seeded(100);
        assert_eq!(c.shares, 100);
        assert_eq!(c.bonded, 100);
        assert_eq!(c.exchange_rate, Decimal::ONE);
        let bond = state.get_bond(&addr(1), &pk(1)).expect("get").expect("bond");
        assert_eq!(bond.shares, 100);
        assert_eq!(state.candidate_keys().expect("keys"), vec![pk(1)]);
    }

    #[test]
    fn partial_debit_keeps_everything() {
        let (mut state, _) = seeded(100);
        let out = state.debit_shares(&ExchangeRateCurve, &addr(1), &pk(1), 40).expect("debit");
        assert_eq!(out.value, 40);
        assert!(!out.bond_removed && !out.owner_resigned && !out.candidate_removed);
        let c = state.get_candidate(&pk(1)).expect("get").expect("candidate");
        assert_eq!((c.shares, c.bonded), (60, 60));
    }

    #[test]
    fn owner_full_debit_with_other_delegator_resigns() {
        let (mut state, mut c) = seeded(100);
        state.credit_shares(&mut c, &addr(2), 50, 50).expect("credit");
        let out = state.debit_shares(&ExchangeRateCurve, &addr(1), &pk(1), 100).expect("debit");
        assert!(out.bond_removed && out.owner_resigned && !out.candidate_removed);
        let c = state.get_candidate(&pk(1)).expect("get").expect("candidate");
        assert!(c.is_withdrawn());
        assert_eq!(c.shares, 50);
        assert!(state.get_bond(&addr(1), &pk(1)).expect("get").is_none());
        assert!(matches!(state.get_active_candidate(&pk(1)), Err(StakeError::CandidateNotFound(_))));
    }

    #[test]
    fn last_debit_removes_candidate_and_index() {
        let (mut state, _) = seeded(100);
        let out = state.debit_shares(&ExchangeRateCurve, &addr(1), &pk(1), 100).expect("debit");
        assert!(out.candidate_removed);
        assert!(state.get_candidate(&pk(1)).expect("get").is_none());
        assert!(state.candidate_keys().expect("keys").is_empty());
    }

    #[test]
    fn debit_failures_write_nothing() {
        let (mut state, _) = seeded(100);
        let before = state.store().clone();
        assert!(matches!(
            state.debit_shares(&FlatCurve, &addr(1), &pk(1), 101),
            Err(StakeError::InsufficientShares { have: 100, want: 101 })
        ));
        assert!(matches!(
            state.debit_shares(&FlatCurve, &addr(9), &pk(1), 1),
            Err(StakeError::NoBondFound { .. })
        ));
        assert_eq!(state.store(), &before);
    }

    #[test]
    fn rate_above_one_redeems_floor_value() {
        let (mut state, mut c) = seeded(2);
        // pool grew to 3 through rewards: rate 1.5
        c.bonded = 3;
        c.refresh_exchange_rate().expect("rate");
        state.save_candidate(&c).expect("save");
        state.credit_shares(&mut c, &addr(2), 1, 2).expect("credit");
        // pool: 3 shares, 5 bonded
        let out = state.debit_shares(&ExchangeRateCurve, &addr(2), &pk(1), 1).expect("debit");
        assert_eq!(out.value, 1);
        let c = state.get_candidate(&pk(1)).expect("get").expect("candidate");
        assert_eq!((c.shares, c.bonded), (2, 4));
    }
}
