#[cfg(test)]
mod validator_set_tests {
    use dpos_common::{Address, PubKey};

    use crate::state::{diff_validator_sets, Candidate, StakeState, ValidatorUpdate};
    use crate::store::MemStore;

    fn pk(byte: u8) -> PubKey {
        PubKey::from_bytes([byte; 32])
    }

    fn vu(byte: u8, power: u64) -> ValidatorUpdate {
        ValidatorUpdate { pub_key: pk(byte), power }
    }

    fn put(state: &mut StakeState<MemStore>, byte: u8, shares: u128, withdrawn: bool) {
        let mut c = Candidate::new(pk(byte), Address::from_bytes([byte; 20]), Default::default());
        c.shares = shares;
        c.bonded = shares;
        if withdrawn {
            c.owner = None;
        }
        state.save_candidate(&c).expect("save");
    }

    #[test]
    fn projection_orders_by_shares_then_key() {
        let mut state = StakeState::new(MemStore::new());
        put(&mut state, 3, 50, false);
        put(&mut state, 1, 50, false);
        put(&mut state, 2, 80, false);
        put(&mut state, 4, 10, false);

        let set = state.project_validator_set(3).expect("project");
        assert_eq!(set, vec![vu(2, 80), vu(1, 50), vu(3, 50)]);
    }

    #[test]
    fn withdrawn_candidates_are_not_validators() {
        let mut state = StakeState::new(MemStore::new());
        put(&mut state, 1, 50, true);
        put(&mut state, 2, 10, false);
        assert_eq!(state.project_validator_set(10).expect("project"), vec![vu(2, 10)]);
    }

    #[test]
    fn diff_adds_changes_and_removes() {
        let old = vec![vu(1, 10), vu(2, 20), vu(3, 30)];
        let new = vec![vu(3, 30), vu(2, 25), vu(4, 5)];
        assert_eq!(diff_validator_sets(&old, &new), vec![vu(1, 0), vu(2, 25), vu(4, 5)]);
        assert!(diff_validator_sets(&new, &new).is_empty());
    }

    #[test]
    fn update_persists_last_set() {
        let mut state = StakeState::new(MemStore::new());
        put(&mut state, 1, 5, false);
        put(&mut state, 2, 7, false);
        assert_eq!(state.update_validator_set(1).expect("update"), vec![vu(2, 7)]);
        assert!(state.update_validator_set(1).expect("update").is_empty());

        put(&mut state, 1, 9, false);
        assert_eq!(state.update_validator_set(1).expect("update"), vec![vu(1, 9), vu(2, 0)]);
        assert_eq!(state.last_validator_set().expect("last"), vec![vu(1, 9)]);
    }

    #[test]
    fn huge_shares_saturate_power() {
        let mut state = StakeState::new(MemStore::new());
        put(&mut state, 1, u128::from(u64::MAX) + 5, false);
        assert_eq!(state.project_validator_set(1).expect("project"), vec![vu(1, u64::MAX)]);
    }
}
