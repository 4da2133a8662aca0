//! # DPoS Stake Module
//!
//! Accounting engine delegated-proof-of-stake: candidate registry, delegator
//! bonds dengan share/exchange-rate, delay queue untuk unbonding dan perubahan
//! commission, distribusi reward per block, dan proyeksi validator set.
//!
//! ## Modules
//!
//! | Module | Fungsi |
//! |--------|--------|
//! | `params` | Parameter module + parser genesis/admin key |
//! | `decimal` | Fixed-point 12 desimal untuk rate |
//! | `bonding` | `BondingCurve`: flat dan exchange-rate |
//! | `rewards` | `RewardPolicy`: proportional (default), fixed |
//! | `ledger` | Ledger adapter: `MemLedger`, `KvLedger` |
//! | `store` | KV store: `MemStore`, `CacheStore`, `LmdbStore` |
//! | `state` | Registry, bonds, queues di atas store |
//! | `tx` | Closed enum transaksi |
//! | `handler` | `check_tx` / `deliver_tx` / genesis |
//! | `epilogue` | `begin_block`: drain queue + reward |
//! | `projector` | `end_block`: diff validator set |
//! | `app` | `BlockExecutor` pipeline |
//!
//! ## Alur
//!
//! ```text
//! tx ─► validate_basic ─► check_stateful ─► CacheStore overlay ─► commit
//!                                   │
//!                                   └─► Ledger::transfer (hold account)
//! ```

pub mod app;
pub mod bonding;
pub mod decimal;
pub mod epilogue;
pub mod error;
pub mod handler;
pub mod ledger;
pub mod params;
pub mod projector;
pub mod rewards;
pub mod state;
pub mod store;
pub mod tx;

/// Module namespace used by genesis keys and the LMDB database name.
pub const STAKE_MODULE_NAME: &str = "stake";

pub use app::BlockExecutor;
pub use bonding::{BondingCurve, ExchangeRateCurve, FlatCurve};
pub use decimal::Decimal;
pub use epilogue::EpilogueReport;
pub use error::{ErrorKind, StakeError, StakeResult, StoreError, TransferError};
pub use handler::{check_tx, deliver_tx, init_genesis, init_state, CheckResult, Context, DeliverResult};
pub use ledger::{KvLedger, Ledger, MemLedger};
pub use params::{CurveKind, Params};
pub use projector::BlockOutcome;
pub use rewards::{FixedReward, ProportionalReward, RewardPolicy};
pub use state::{Candidate, DelegatorBond, Description, StakeState, ValidatorUpdate};
pub use store::{CacheStore, LmdbStore, MemStore, Store, WriteBatch};
pub use tx::Tx;
