//! Internal delay queue management
//!
//! FIFO di atas key-value store: counter `head`/`tail` di key meta, entry di
//! `queue/{name}/e/{index}`. Entry hanya ditambah di tail dan diambil dari head,
//! sehingga entry di depan selalu paling matang. Drain berhenti di entry
//! pertama yang belum matang tanpa melihat sisanya.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use super::internal_state_layout::{queue_entry_key, queue_meta_key};
use super::{CommissionChangeEntry, StakeState, UnbondEntry};
use crate::error::{StakeError, StakeResult};
use crate::store::Store;

/// Entry stored in a [`DelayQueue`].
pub trait QueueEntry: Serialize + DeserializeOwned {
    /// Block height the entry was submitted at.
    fn submitted_at(&self) -> u64;
}

impl QueueEntry for UnbondEntry {
    fn submitted_at(&self) -> u64 { self.height }
}

impl QueueEntry for CommissionChangeEntry {
    fn submitted_at(&self) -> u64 { self.height }
}

/// `current - submitted > period` (strict).
pub fn is_matured(submitted: u64, current: u64, period: u64) -> bool {
    current.saturating_sub(submitted) > period
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
struct QueueBounds {
    head: u64,
    tail: u64,
}

impl QueueBounds {
    fn len(&self) -> u64 {
        self.tail - self.head
    }
}

pub struct DelayQueue<T> {
    name: &'static str,
    _entry: PhantomData<fn() -> T>,
}

pub const UNBONDING_QUEUE: DelayQueue<UnbondEntry> = DelayQueue::new("unbonding");
pub const COMMISSION_QUEUE: DelayQueue<CommissionChangeEntry> = DelayQueue::new("commission");

impl<T> DelayQueue<T> {
    pub const fn new(name: &'static str) -> Self {
        DelayQueue { name, _entry: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T: QueueEntry> DelayQueue<T> {
    fn bounds<S: Store>(&self, state: &StakeState<S>) -> StakeResult<QueueBounds> {
        Ok(state.read(&queue_meta_key(self.name))?.unwrap_or_default())
    }

    fn set_bounds<S: Store>(&self, state: &mut StakeState<S>, bounds: QueueBounds) -> StakeResult<()> {
        state.write(&queue_meta_key(self.name), &bounds)
    }

    pub fn len<S: Store>(&self, state: &StakeState<S>) -> StakeResult<u64> {
        Ok(self.bounds(state)?.len())
    }

    pub fn is_empty<S: Store>(&self, state: &StakeState<S>) -> StakeResult<bool> {
        Ok(self.len(state)? == 0)
    }

    pub fn push<S: Store>(&self, state: &mut StakeState<S>, entry: &T) -> StakeResult<()> {
        let mut bounds = self.bounds(state)?;
        state.write(&queue_entry_key(self.name, bounds.tail), entry)?;
        bounds.tail = bounds.tail.checked_add(1).ok_or(StakeError::Overflow("queue tail"))?;
        self.set_bounds(state, bounds)
    }

    pub fn peek<S: Store>(&self, state: &StakeState<S>) -> StakeResult<Option<T>> {
        let bounds = self.bounds(state)?;
        if bounds.len() == 0 {
            return Ok(None);
        }
        state.read(&queue_entry_key(self.name, bounds.head))
    }

    pub fn pop<S: Store>(&self, state: &mut StakeState<S>) -> StakeResult<Option<T>> {
        let mut bounds = self.bounds(state)?;
        if bounds.len() == 0 {
            return Ok(None);
        }
        let key = queue_entry_key(self.name, bounds.head);
        let entry = state.read(&key)?;
        state.remove(&key)?;
        bounds.head += 1;
        self.set_bounds(state, bounds)?;
        Ok(entry)
    }

    /// Entries front to back.
    pub fn entries<S: Store>(&self, state: &StakeState<S>) -> StakeResult<Vec<T>> {
        let bounds = self.bounds(state)?;
        let mut out = Vec::with_capacity(bounds.len() as usize);
        for idx in bounds.head..bounds.tail {
            if let Some(e) = state.read(&queue_entry_key(self.name, idx))? {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Pop the front entry if it matured at `current_height`.
    pub fn pop_matured<S: Store>(
        &self,
        state: &mut StakeState<S>,
        current_height: u64,
        period: u64,
    ) -> StakeResult<Option<T>> {
        match self.peek(state)? {
            Some(front) if is_matured(front.submitted_at(), current_height, period) => {
                Ok(Some(self.pop(state)?.unwrap_or(front)))
            }
            _ => Ok(None),
        }
    }

    /// Pop and `apply` every matured entry from the front. Stops at the first
    /// immature entry. An `apply` error aborts the drain and is returned.
    pub fn drain_matured<S, F>(
        &self,
        state: &mut StakeState<S>,
        current_height: u64,
        period: u64,
        mut apply: F,
    ) -> StakeResult<usize>
    where
        S: Store,
        F: FnMut(&mut StakeState<S>, T) -> StakeResult<()>,
    {
        let mut drained = 0usize;
        while let Some(entry) = self.pop_matured(state, current_height, period)? {
            apply(state, entry)?;
            drained += 1;
        }
        Ok(drained)
    }
}
