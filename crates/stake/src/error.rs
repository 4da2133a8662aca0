//! Error taxonomy of the staking module.
//!
//! Setiap error membawa pesan human-readable (`Display`) dan kategori yang bisa
//! dicek mesin lewat [`StakeError::kind`].

use dpos_common::{Address, PubKey};
use thiserror::Error;

use crate::decimal::Decimal;

/// Machine-checkable category of a [`StakeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed transaction: denom mismatch, zero amount, bad signer set.
    Validation,
    /// Candidate or bond does not exist.
    NotFound,
    /// Shares too low.
    InsufficientFunds,
    /// Ledger adapter refused a transfer.
    Transfer,
    /// Bad genesis/admin key or value.
    Config,
    /// Store or codec failure, arithmetic overflow.
    Internal,
}

/// Refusal from the ledger adapter. The ledger guarantees no partial effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance in {account}: have {have}, need {need} {denom}")]
    InsufficientBalance {
        account: Address,
        denom: String,
        have: u128,
        need: u128,
    },

    #[error("balance overflow for {0}")]
    Overflow(Address),

    #[error("ledger backend failure: {0}")]
    Backend(String),
}

/// Key-value store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("lmdb error: {0}")]
    Lmdb(#[from] lmdb::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StakeError {
    // ════════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ════════════════════════════════════════════════════════════════════════
    #[error("invalid denom: expected {expected}, got {got}")]
    InvalidDenom { expected: String, got: String },

    #[error("amount must be positive")]
    ZeroAmount,

    #[error("missing signature: exactly one signer required")]
    MissingSignature,

    #[error("too many signers: exactly one required, got {0}")]
    MultipleSigners(usize),

    #[error("commission {0} out of range [0, 1]")]
    InvalidCommission(Decimal),

    #[error("description field {field} too long: {len} > {max}")]
    DescriptionTooLong { field: &'static str, len: usize, max: usize },

    #[error("candidate {0} already registered")]
    CandidateExists(PubKey),

    #[error("sender {sender} is not the owner of candidate {pub_key}")]
    NotCandidateOwner { pub_key: PubKey, sender: Address },

    #[error("commission change already pending for {0}")]
    CommissionChangePending(PubKey),

    #[error("commission change {requested} exceeds remaining allowance {allowed} in window")]
    CommissionChangeTooLarge { requested: Decimal, allowed: Decimal },

    #[error("bond of {0} is too small to buy a single share")]
    BondTooSmall(u128),

    // ════════════════════════════════════════════════════════════════════════
    // NOT FOUND
    // ════════════════════════════════════════════════════════════════════════
    #[error("candidate {0} not found")]
    CandidateNotFound(PubKey),

    #[error("no bond from {delegator} to {pub_key}")]
    NoBondFound { delegator: Address, pub_key: PubKey },

    // ════════════════════════════════════════════════════════════════════════
    // FUNDS / TRANSFER
    // ════════════════════════════════════════════════════════════════════════
    #[error("insufficient shares: have {have}, want {want}")]
    InsufficientShares { have: u128, want: u128 },

    #[error("transfer failed: {0}")]
    TransferFailed(#[from] TransferError),

    // ════════════════════════════════════════════════════════════════════════
    // CONFIG
    // ════════════════════════════════════════════════════════════════════════
    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error("unknown config key: {0}")]
    UnknownConfigKey(String),

    #[error("invalid value {value:?} for config key {key}")]
    InvalidConfigValue { key: String, value: String },

    // ════════════════════════════════════════════════════════════════════════
    // INTERNAL
    // ════════════════════════════════════════════════════════════════════════
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("block height {got} does not follow {last}")]
    HeightNotIncreasing { last: u64, got: u64 },

    #[error("no block in progress")]
    NoActiveBlock,

    #[error("epilogue at height {0} failed after minting; clear the halt marker to continue")]
    Halted(u64),
}

impl StakeError {
    pub fn kind(&self) -> ErrorKind {
        use StakeError::*;
        match self {
            InvalidDenom { .. }
            | ZeroAmount
            | MissingSignature
            | MultipleSigners(_)
            | InvalidCommission(_)
            | DescriptionTooLong { .. }
            | CandidateExists(_)
            | NotCandidateOwner { .. }
            | CommissionChangePending(_)
            | CommissionChangeTooLarge { .. }
            | BondTooSmall(_) => ErrorKind::Validation,
            CandidateNotFound(_) | NoBondFound { .. } => ErrorKind::NotFound,
            InsufficientShares { .. } => ErrorKind::InsufficientFunds,
            TransferFailed(_) => ErrorKind::Transfer,
            UnknownModule(_) | UnknownConfigKey(_) | InvalidConfigValue { .. } => ErrorKind::Config,
            Store(_) | Codec(_) | Overflow(_) | HeightNotIncreasing { .. } | NoActiveBlock | Halted(_) => {
                ErrorKind::Internal
            }
        }
    }
}

pub type StakeResult<T> = Result<T, StakeError>;
