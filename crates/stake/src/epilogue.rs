//! # Block Epilogue
//!
//! Dijalankan sekali per block, **sebelum** transaksi pertama block tersebut.
//! Urutan tetap:
//!
//! 1. drain unbonding queue (payout hold → delegator)
//! 2. drain commission-change queue (commission overwrite)
//! 3. distribusi reward
//!
//! ## Commit & Failure
//!
//! | Tahap | Commit | Bila gagal |
//! |-------|--------|------------|
//! | unbond payout | per entry: pop + transfer di-commit bersama | entry tetap di queue, entry sebelumnya sudah lunas; retry aman |
//! | commission + reward | satu overlay di akhir | tanpa mint: overlay dibuang, retry aman |
//! | | | setelah mint: marker `halted_at` ditulis, epilogue berikutnya ditolak |
//!
//! Kegagalan transfer saat payout adalah protocol fault dan dikembalikan ke
//! pemanggil sebagai error.

use dpos_common::{Address, Coin};
use tracing::{error, info, warn};

use crate::error::{StakeError, StakeResult, TransferError};
use crate::ledger::Ledger;
use crate::params::Params;
use crate::rewards::RewardPolicy;
use crate::state::{StakeState, COMMISSION_QUEUE, UNBONDING_QUEUE};
use crate::store::{CacheStore, Store, WriteBatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpilogueReport {
    pub height: u64,
    pub unbonds_paid: usize,
    pub value_released: u128,
    pub commission_changes_applied: usize,
    pub rewards_minted: u128,
}

/// Counts ledger moves that went through, so a failure after the first
/// one is known to have left value behind.
struct CountingLedger<'a, L: Ledger> {
    inner: &'a mut L,
    applied: usize,
}

impl<L: Ledger> Ledger for CountingLedger<'_, L> {
    fn transfer(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        self.inner.transfer(from, to, coin)?;
        self.applied += 1;
        Ok(())
    }

    fn credit(&mut self, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        self.inner.credit(to, coin)?;
        self.applied += 1;
        Ok(())
    }
}

pub fn begin_block<S: Store, L: Ledger>(
    store: &mut S,
    ledger: &mut L,
    height: u64,
    policy: &dyn RewardPolicy,
) -> StakeResult<EpilogueReport> {
    let params = {
        let state = StakeState::new(CacheStore::new(&*store));
        if let Some(halted) = state.halted_at()? {
            return Err(StakeError::Halted(halted));
        }
        state.load_params()?
    };

    let mut report = EpilogueReport { height, ..Default::default() };
    let (paid, released) = pay_matured_unbonds(store, ledger, &params, height)?;
    report.unbonds_paid = paid;
    report.value_released = released;

    let mut counting = CountingLedger { inner: ledger, applied: 0 };
    let settled = settle_block(&*store, &mut counting, &params, height, policy, &mut report)
        .and_then(|batch| Ok(batch.commit(store)?));
    if let Err(e) = settled {
        if counting.applied > 0 {
            error!("epilogue at height {} failed after {} ledger move(s): {}", height, counting.applied, e);
            if let Err(mark_err) = mark_halted(store, height) {
                error!("cannot persist halt marker at height {}: {}", height, mark_err);
            }
        }
        return Err(e);
    }

    Ok(report)
}

/// Pay matured unbonds one by one. Each pop is committed together with its
/// payout, so entries paid before a failure stay paid.
fn pay_matured_unbonds<S: Store, L: Ledger>(
    store: &mut S,
    ledger: &mut L,
    params: &Params,
    height: u64,
) -> StakeResult<(usize, u128)> {
    let denom = params.allowed_bond_denom.as_str();
    let (mut paid, mut released) = (0usize, 0u128);
    loop {
        let batch = {
            let mut state = StakeState::new(CacheStore::new(&*store));
            let entry = match UNBONDING_QUEUE.pop_matured(&mut state, height, params.unbond_period)? {
                Some(entry) => entry,
                None => break,
            };
            ledger.transfer(&params.hold_account, &entry.account, &Coin::new(denom, entry.value))?;
            info!(
                "unbond matured: {} paid {} from {} (submitted at {})",
                entry.account, entry.value, entry.pub_key, entry.height
            );
            paid += 1;
            released = released.saturating_add(entry.value);
            state.into_store().into_batch()
        };
        batch.commit(store)?;
    }
    Ok((paid, released))
}

/// Commission drain, rewards and the height marker, staged in one overlay.
fn settle_block<S: Store, L: Ledger>(
    store: &S,
    ledger: &mut L,
    params: &Params,
    height: u64,
    policy: &dyn RewardPolicy,
    report: &mut EpilogueReport,
) -> StakeResult<WriteBatch> {
    let mut state = StakeState::new(CacheStore::new(store));

    report.commission_changes_applied = COMMISSION_QUEUE.drain_matured(
        &mut state,
        height,
        params.commission_change_period,
        |st, entry| {
            match st.get_candidate(&entry.pub_key)? {
                Some(mut candidate)
                    if candidate.declaration == entry.declaration
                        && candidate.pending_commission == Some(entry.commission) =>
                {
                    candidate.commission = entry.commission;
                    candidate.pending_commission = None;
                    st.save_candidate(&candidate)?;
                    info!("commission of {} is now {}", entry.pub_key, entry.commission);
                }
                Some(_) => warn!(
                    "commission change for {} staged by an earlier declaration dropped",
                    entry.pub_key
                ),
                None => warn!(
                    "commission change for removed candidate {} dropped",
                    entry.pub_key
                ),
            }
            Ok(())
        },
    )?;

    let rewards = state.distribute_rewards(ledger, params, policy)?;
    report.rewards_minted = rewards.minted;

    state.set_last_height(height)?;
    Ok(state.into_store().into_batch())
}

fn mark_halted<S: Store>(store: &mut S, height: u64) -> StakeResult<()> {
    let batch = {
        let mut state = StakeState::new(CacheStore::new(&*store));
        state.set_halted_at(height)?;
        state.into_store().into_batch()
    };
    batch.commit(store)?;
    Ok(())
}

/// Remove the halt marker after the ledger was reconciled by hand.
pub fn clear_halt<S: Store>(store: &mut S) -> StakeResult<()> {
    let batch = {
        let mut state = StakeState::new(CacheStore::new(&*store));
        state.clear_halt()?;
        state.into_store().into_batch()
    };
    batch.commit(store)?;
    Ok(())
}
