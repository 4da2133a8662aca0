//! Delegator bond ledger: `(delegator, candidate) → shares`. Zero bonds are deleted.

use dpos_common::{Address, PubKey};

use super::internal_state_layout::bond_key;
use super::{DelegatorBond, StakeState};
use crate::error::StakeResult;
use crate::store::Store;

impl<S: Store> StakeState<S> {
    pub fn get_bond(&self, delegator: &Address, pk: &PubKey) -> StakeResult<Option<DelegatorBond>> {
        self.read(&bond_key(delegator, pk))
    }

    pub fn save_bond(&mut self, bond: &DelegatorBond) -> StakeResult<()> {
        let key = bond_key(&bond.delegator, &bond.pub_key);
        if bond.shares == 0 {
            return self.remove(&key);
        }
        self.write(&key, bond)
    }

    pub fn remove_bond(&mut self, delegator: &Address, pk: &PubKey) -> StakeResult<()> {
        self.remove(&bond_key(delegator, pk))
    }
}
