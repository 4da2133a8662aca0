//! # Transaction Processor
//!
//! Setiap transaksi punya dua fase:
//!
//! | Fase | Input store | Mutasi | Dipakai untuk |
//! |------|-------------|--------|---------------|
//! | `check_tx` | `&S` | tidak ada | mempool admission, boleh diulang |
//! | `deliver_tx` | `&mut S` | ya, atomic | eksekusi block, sekali per tx |
//!
//! `deliver_tx` menjalankan ulang semua pengecekan `check_tx`, lalu menulis ke
//! `CacheStore` overlay. Overlay hanya di-commit bila seluruh transaksi sukses,
//! jadi kegagalan di tengah (termasuk `TransferFailed`) tidak meninggalkan
//! perubahan registry apa pun.
//!
//! Ledger transfer selalu terjadi sebelum mutasi akuntansi, dan pengecekan
//! yang bisa gagal (`BondTooSmall`, dst.) selalu sebelum transfer.

use dpos_common::{Address, Coin};
use tracing::{debug, info};

use crate::decimal::Decimal;
use crate::error::{StakeError, StakeResult};
use crate::ledger::Ledger;
use crate::params::Params;
use crate::state::{
    Candidate, CommissionChangeEntry, CommissionWindow, StakeState, UnbondEntry, COMMISSION_QUEUE,
    UNBONDING_QUEUE,
};
use crate::store::{CacheStore, Store};
use crate::tx::Tx;
use crate::STAKE_MODULE_NAME;

// ════════════════════════════════════════════════════════════════════════════
// CONTEXT & RESULTS
// ════════════════════════════════════════════════════════════════════════════

/// Execution context supplied by the block pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub height: u64,
    /// Accounts whose signatures were verified upstream.
    pub signers: Vec<Address>,
}

impl Context {
    pub fn new(height: u64, signers: Vec<Address>) -> Self {
        Context { height, signers }
    }

    pub fn single(height: u64, signer: Address) -> Self {
        Context { height, signers: vec![signer] }
    }

    /// The one and only signer.
    pub fn sender(&self) -> StakeResult<Address> {
        match self.signers.as_slice() {
            [only] => Ok(*only),
            [] => Err(StakeError::MissingSignature),
            many => Err(StakeError::MultipleSigners(many.len())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub gas_wanted: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliverResult {
    pub gas_used: u64,
}

pub fn gas_for(params: &Params, tx: &Tx) -> u64 {
    match tx {
        Tx::DeclareCandidacy { .. } => params.gas_declare_candidacy,
        Tx::EditCandidacy { .. } => params.gas_edit_candidacy,
        Tx::Delegate { .. } => params.gas_delegate,
        Tx::Unbond { .. } => params.gas_unbond,
        Tx::ModifyCommission { .. } => params.gas_modify_commission,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ════════════════════════════════════════════════════════════════════════════

/// Validate `tx` against `store` without mutating it.
pub fn check_tx<S: Store>(store: &S, ctx: &Context, tx: &Tx) -> StakeResult<CheckResult> {
    tx.validate_basic()?;
    let sender = ctx.sender()?;
    let state = StakeState::new(CacheStore::new(store));
    let params = state.load_params()?;
    check_stateful(&state, &params, ctx, &sender, tx)?;
    Ok(CheckResult { gas_wanted: gas_for(&params, tx) })
}

/// Validate and apply `tx`. On error the store is unchanged.
pub fn deliver_tx<S: Store, L: Ledger>(
    store: &mut S,
    ledger: &mut L,
    ctx: &Context,
    tx: &Tx,
) -> StakeResult<DeliverResult> {
    tx.validate_basic()?;
    let sender = ctx.sender()?;

    let (batch, gas_used) = {
        let mut state = StakeState::new(CacheStore::new(&*store));
        let params = state.load_params()?;
        check_stateful(&state, &params, ctx, &sender, tx)?;
        apply_tx(&mut state, ledger, &params, ctx, &sender, tx)?;
        (state.into_store().into_batch(), gas_for(&params, tx))
    };
    batch.commit(store)?;

    info!("tx {} from {} delivered at height {}", tx, sender, ctx.height);
    Ok(DeliverResult { gas_used })
}

/// Apply one genesis/admin key for `module`. Nothing is written on error.
pub fn init_state<S: Store>(store: &mut S, module: &str, key: &str, value: &str) -> StakeResult<()> {
    if module != STAKE_MODULE_NAME {
        return Err(StakeError::UnknownModule(module.to_string()));
    }
    let mut state = StakeState::new(store);
    let mut params = state.load_params()?;
    params.set_key(key, value)?;
    state.save_params(&params)?;
    info!("genesis: {}/{} = {}", module, key, value);
    Ok(())
}

/// Write params from a set of genesis keys. All keys must be valid; otherwise
/// nothing is written.
pub fn init_genesis<'a, S, I>(store: &mut S, entries: I) -> StakeResult<Params>
where
    S: Store,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut state = StakeState::new(store);
    let mut params = state.load_params()?;
    for (key, value) in entries {
        params.set_key(key, value)?;
    }
    state.save_params(&params)?;
    Ok(params)
}

// ════════════════════════════════════════════════════════════════════════════
// CHECK
// ════════════════════════════════════════════════════════════════════════════

fn check_denom(params: &Params, coin: &Coin) -> StakeResult<()> {
    if coin.denom != params.allowed_bond_denom {
        return Err(StakeError::InvalidDenom {
            expected: params.allowed_bond_denom.clone(),
            got: coin.denom.clone(),
        });
    }
    Ok(())
}

fn check_owner(candidate: &Candidate, sender: &Address) -> StakeResult<()> {
    if !candidate.is_owned_by(sender) {
        return Err(StakeError::NotCandidateOwner { pub_key: candidate.pub_key, sender: *sender });
    }
    Ok(())
}

/// Shares `amount` buys in `candidate`; zero shares is rejected.
fn issued_shares(params: &Params, candidate: &Candidate, amount: u128) -> StakeResult<u128> {
    let issued = params.curve().shares_for(candidate, amount)?;
    if issued == 0 {
        return Err(StakeError::BondTooSmall(amount));
    }
    Ok(issued)
}

/// Window after accepting a change to `new_rate` at `height`.
fn next_commission_window(
    candidate: &Candidate,
    params: &Params,
    height: u64,
    new_rate: Decimal,
) -> StakeResult<CommissionWindow> {
    let delta = new_rate.abs_diff(candidate.commission);
    let current = candidate.commission_window;
    let window = if height.saturating_sub(current.start_height) >= params.commission_check_blocks {
        CommissionWindow { start_height: height, accumulated: Decimal::ZERO }
    } else {
        current
    };
    let allowed = params.max_commission_change.saturating_sub(window.accumulated);
    if delta > allowed {
        return Err(StakeError::CommissionChangeTooLarge { requested: delta, allowed });
    }
    Ok(CommissionWindow {
        start_height: window.start_height,
        accumulated: window
            .accumulated
            .checked_add(delta)
            .ok_or(StakeError::Overflow("commission window"))?,
    })
}

fn check_stateful<S: Store>(
    state: &StakeState<S>,
    params: &Params,
    ctx: &Context,
    sender: &Address,
    tx: &Tx,
) -> StakeResult<()> {
    let result = match tx {
        Tx::DeclareCandidacy { pub_key, bond, .. } => {
            if state.get_candidate(pub_key)?.is_some() {
                return Err(StakeError::CandidateExists(*pub_key));
            }
            check_denom(params, bond)
        }
        Tx::EditCandidacy { pub_key, .. } => {
            let candidate = state.get_active_candidate(pub_key)?;
            check_owner(&candidate, sender)
        }
        Tx::Delegate { pub_key, bond } => {
            check_denom(params, bond)?;
            let candidate = state.get_active_candidate(pub_key)?;
            issued_shares(params, &candidate, bond.amount).map(|_| ())
        }
        Tx::Unbond { pub_key, shares } => {
            let bond = state
                .get_bond(sender, pub_key)?
                .ok_or(StakeError::NoBondFound { delegator: *sender, pub_key: *pub_key })?;
            if *shares > bond.shares {
                return Err(StakeError::InsufficientShares { have: bond.shares, want: *shares });
            }
            Ok(())
        }
        Tx::ModifyCommission { pub_key, commission } => {
            let candidate = state.get_active_candidate(pub_key)?;
            check_owner(&candidate, sender)?;
            if candidate.pending_commission.is_some() {
                return Err(StakeError::CommissionChangePending(*pub_key));
            }
            next_commission_window(&candidate, params, ctx.height, *commission).map(|_| ())
        }
    };
    if let Err(e) = &result {
        debug!("tx {} from {} rejected: {}", tx, sender, e);
    }
    result
}

// ════════════════════════════════════════════════════════════════════════════
// DELIVER
// ════════════════════════════════════════════════════════════════════════════

/// Transfer `amount` into custody and issue shares. Used by both Delegate and
/// the self-bond of DeclareCandidacy.
fn delegate_into<S: Store, L: Ledger>(
    state: &mut StakeState<S>,
    ledger: &mut L,
    params: &Params,
    sender: &Address,
    candidate: &mut Candidate,
    amount: u128,
) -> StakeResult<u128> {
    let issued = issued_shares(params, candidate, amount)?;
    ledger.transfer(sender, &params.hold_account, &Coin::new(params.allowed_bond_denom.as_str(), amount))?;
    state.credit_shares(candidate, sender, issued, amount)?;
    Ok(issued)
}

fn apply_tx<S: Store, L: Ledger>(
    state: &mut StakeState<S>,
    ledger: &mut L,
    params: &Params,
    ctx: &Context,
    sender: &Address,
    tx: &Tx,
) -> StakeResult<()> {
    match tx {
        Tx::DeclareCandidacy { pub_key, bond, commission, description } => {
            let mut candidate = Candidate::new(*pub_key, *sender, description.clone());
            candidate.declaration = state.next_declaration()?;
            candidate.commission = *commission;
            candidate.commission_window.start_height = ctx.height;
            state.save_candidate(&candidate)?;
            let issued = delegate_into(state, ledger, params, sender, &mut candidate, bond.amount)?;
            info!("candidate {} declared by {} with {} shares", pub_key, sender, issued);
        }
        Tx::EditCandidacy { pub_key, description } => {
            let mut candidate = state.get_active_candidate(pub_key)?;
            if candidate.description.apply_edit(description) {
                state.save_candidate(&candidate)?;
            }
        }
        Tx::Delegate { pub_key, bond } => {
            let mut candidate = state.get_active_candidate(pub_key)?;
            delegate_into(state, ledger, params, sender, &mut candidate, bond.amount)?;
        }
        Tx::Unbond { pub_key, shares } => {
            let outcome = state.debit_shares(params.curve(), sender, pub_key, *shares)?;
            if outcome.value > 0 {
                UNBONDING_QUEUE.push(
                    state,
                    &UnbondEntry {
                        account: *sender,
                        pub_key: *pub_key,
                        shares: *shares,
                        value: outcome.value,
                        height: ctx.height,
                    },
                )?;
            }
            if outcome.owner_resigned {
                info!("owner {} resigned candidacy {}", sender, pub_key);
            }
            if outcome.candidate_removed {
                info!("candidate {} removed: no shares left", pub_key);
            }
        }
        Tx::ModifyCommission { pub_key, commission } => {
            let mut candidate = state.get_active_candidate(pub_key)?;
            candidate.commission_window = next_commission_window(&candidate, params, ctx.height, *commission)?;
            candidate.pending_commission = Some(*commission);
            state.save_candidate(&candidate)?;
            COMMISSION_QUEUE.push(
                state,
                &CommissionChangeEntry {
                    pub_key: *pub_key,
                    declaration: candidate.declaration,
                    commission: *commission,
                    height: ctx.height,
                },
            )?;
        }
    }
    Ok(())
}
