//! Block execution pipeline.
//!
//! ```text
//! begin_block(h) ──► deliver_tx* ──► end_block ──► (next height)
//!      │                                 │
//!      └ epilogue: queues + rewards      └ validator set diff
//! ```
//!
//! `BlockExecutor` memegang store dan ledger, memastikan tinggi block naik
//! monoton, dan bahwa transaksi hanya dieksekusi di dalam block aktif.

use dpos_common::Address;

use crate::epilogue::{self, EpilogueReport};
use crate::error::{StakeError, StakeResult};
use crate::handler::{self, CheckResult, Context, DeliverResult};
use crate::ledger::Ledger;
use crate::projector::{self, BlockOutcome};
use crate::rewards::{ProportionalReward, RewardPolicy};
use crate::state::StakeState;
use crate::store::{CacheStore, Store};
use crate::tx::Tx;

pub struct BlockExecutor<S: Store, L: Ledger> {
    store: S,
    ledger: L,
    reward_policy: Box<dyn RewardPolicy>,
    last_height: Option<u64>,
    current: Option<u64>,
}

impl<S: Store, L: Ledger> BlockExecutor<S, L> {
    /// Resume from the height recorded in `store`, if any.
    pub fn new(store: S, ledger: L) -> StakeResult<Self> {
        let last_height = StakeState::new(CacheStore::new(&store)).last_height()?;
        Ok(BlockExecutor {
            store,
            ledger,
            reward_policy: Box::new(ProportionalReward),
            last_height,
            current: None,
        })
    }

    pub fn with_reward_policy(mut self, policy: Box<dyn RewardPolicy>) -> Self {
        self.reward_policy = policy;
        self
    }

    pub fn store(&self) -> &S { &self.store }
    pub fn store_mut(&mut self) -> &mut S { &mut self.store }
    pub fn ledger(&self) -> &L { &self.ledger }
    pub fn ledger_mut(&mut self) -> &mut L { &mut self.ledger }
    pub fn last_height(&self) -> Option<u64> { self.last_height }

    pub fn into_parts(self) -> (S, L) {
        (self.store, self.ledger)
    }

    pub fn init_state(&mut self, module: &str, key: &str, value: &str) -> StakeResult<()> {
        handler::init_state(&mut self.store, module, key, value)
    }

    pub fn begin_block(&mut self, height: u64) -> StakeResult<EpilogueReport> {
        if let Some(last) = self.last_height {
            if height <= last {
                return Err(StakeError::HeightNotIncreasing { last, got: height });
            }
        }
        let report = epilogue::begin_block(&mut self.store, &mut self.ledger, height, self.reward_policy.as_ref())?;
        self.last_height = Some(height);
        self.current = Some(height);
        Ok(report)
    }

    /// Let a halted store run epilogues again. Only after the ledger moves
    /// of the failed height were reconciled.
    pub fn clear_halt(&mut self) -> StakeResult<()> {
        epilogue::clear_halt(&mut self.store)
    }

    fn active_height(&self) -> StakeResult<u64> {
        self.current.ok_or(StakeError::NoActiveBlock)
    }

    /// Check against committed state at the active height.
    pub fn check_tx(&self, signers: Vec<Address>, tx: &Tx) -> StakeResult<CheckResult> {
        let height = self.current.or(self.last_height).unwrap_or(0);
        handler::check_tx(&self.store, &Context::new(height, signers), tx)
    }

    pub fn deliver_tx(&mut self, signers: Vec<Address>, tx: &Tx) -> StakeResult<DeliverResult> {
        let ctx = Context::new(self.active_height()?, signers);
        handler::deliver_tx(&mut self.store, &mut self.ledger, &ctx, tx)
    }

    pub fn end_block(&mut self) -> StakeResult<BlockOutcome> {
        let height = self.active_height()?;
        let outcome = projector::end_block(&mut self.store, height)?;
        self.current = None;
        Ok(outcome)
    }
}
