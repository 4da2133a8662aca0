//! Ledger adapter: the fungible-token ledger the staking module moves value through.
//!
//! Module staking tidak pernah membaca atau mengubah saldo secara langsung;
//! semua perpindahan value lewat [`Ledger::transfer`] dan [`Ledger::credit`].
//! Implementasi wajib atomic: gagal berarti tidak ada efek parsial.
//!
//! | Impl | Backing | Dipakai oleh |
//! |------|---------|--------------|
//! | [`MemLedger`] | `BTreeMap` | unit/integration tests |
//! | [`KvLedger`] | any [`Store`] | node (LMDB, db `bank`) |

use dpos_common::{Address, Coin};
use std::collections::BTreeMap;

use crate::error::{StoreError, TransferError};
use crate::store::{Store, WriteBatch};

pub trait Ledger {
    /// Move `coin` from `from` to `to`.
    fn transfer(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<(), TransferError>;

    /// Mint `coin` into `to`.
    fn credit(&mut self, to: &Address, coin: &Coin) -> Result<(), TransferError>;
}

fn debit_checked(account: &Address, coin: &Coin, have: u128) -> Result<u128, TransferError> {
    have.checked_sub(coin.amount).ok_or_else(|| TransferError::InsufficientBalance {
        account: *account,
        denom: coin.denom.clone(),
        have,
        need: coin.amount,
    })
}

// ════════════════════════════════════════════════════════════════════════════
// IN-MEMORY LEDGER
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct MemLedger {
    balances: BTreeMap<(Address, String), u128>,
}

impl MemLedger {
    pub fn new() -> Self { Self::default() }

    pub fn balance(&self, account: &Address, denom: &str) -> u128 {
        self.balances
            .get(&(*account, denom.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Sum of all balances of `denom`.
    pub fn supply(&self, denom: &str) -> u128 {
        self.balances
            .iter()
            .filter(|((_, d), _)| d == denom)
            .map(|(_, v)| *v)
            .sum()
    }
}

impl Ledger for MemLedger {
    fn transfer(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        let from_bal = debit_checked(from, coin, self.balance(from, &coin.denom))?;
        if from == to {
            return Ok(());
        }
        let to_bal = self
            .balance(to, &coin.denom)
            .checked_add(coin.amount)
            .ok_or(TransferError::Overflow(*to))?;
        self.balances.insert((*from, coin.denom.clone()), from_bal);
        self.balances.insert((*to, coin.denom.clone()), to_bal);
        Ok(())
    }

    fn credit(&mut self, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        let to_bal = self
            .balance(to, &coin.denom)
            .checked_add(coin.amount)
            .ok_or(TransferError::Overflow(*to))?;
        self.balances.insert((*to, coin.denom.clone()), to_bal);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// STORE-BACKED LEDGER
// ════════════════════════════════════════════════════════════════════════════

/// Balances persisted in a [`Store`]: key `bal/{address}{denom}`, value u128 BE.
/// Both legs of a transfer go out in one [`WriteBatch`].
pub struct KvLedger<S: Store> {
    store: S,
}

impl<S: Store> KvLedger<S> {
    pub fn new(store: S) -> Self { KvLedger { store } }

    pub fn into_inner(self) -> S { self.store }

    fn key(account: &Address, denom: &str) -> Vec<u8> {
        let mut k = Vec::with_capacity(4 + 20 + denom.len());
        k.extend_from_slice(b"bal/");
        k.extend_from_slice(account.as_bytes());
        k.extend_from_slice(denom.as_bytes());
        k
    }

    pub fn balance(&self, account: &Address, denom: &str) -> Result<u128, StoreError> {
        Ok(self
            .store
            .get(&Self::key(account, denom))?
            .and_then(|raw| <[u8; 16]>::try_from(raw.as_slice()).ok())
            .map(u128::from_be_bytes)
            .unwrap_or(0))
    }

    fn read(&self, account: &Address, denom: &str) -> Result<u128, TransferError> {
        self.balance(account, denom)
            .map_err(|e| TransferError::Backend(e.to_string()))
    }

    fn stage(batch: &mut WriteBatch, account: &Address, denom: &str, amount: u128) {
        let key = Self::key(account, denom);
        if amount == 0 {
            batch.delete(&key);
        } else {
            batch.put(&key, amount.to_be_bytes().to_vec());
        }
    }

    fn write(&mut self, batch: WriteBatch) -> Result<(), TransferError> {
        batch
            .commit(&mut self.store)
            .map_err(|e| TransferError::Backend(e.to_string()))
    }
}

impl<S: Store> Ledger for KvLedger<S> {
    fn transfer(&mut self, from: &Address, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        let from_bal = debit_checked(from, coin, self.read(from, &coin.denom)?)?;
        if from == to {
            return Ok(());
        }
        let to_bal = self
            .read(to, &coin.denom)?
            .checked_add(coin.amount)
            .ok_or(TransferError::Overflow(*to))?;
        let mut batch = WriteBatch::new();
        Self::stage(&mut batch, from, &coin.denom, from_bal);
        Self::stage(&mut batch, to, &coin.denom, to_bal);
        self.write(batch)
    }

    fn credit(&mut self, to: &Address, coin: &Coin) -> Result<(), TransferError> {
        let to_bal = self
            .read(to, &coin.denom)?
            .checked_add(coin.amount)
            .ok_or(TransferError::Overflow(*to))?;
        let mut batch = WriteBatch::new();
        Self::stage(&mut batch, to, &coin.denom, to_bal);
        self.write(batch)
    }
}
