//! # DPoS Node
//!
//! Host proses untuk module staking: membaca konfigurasi TOML, membuka
//! storage LMDB, menerapkan genesis, lalu me-replay block log JSON melalui
//! `BlockExecutor`.
//!
//! ```text
//! config.toml ──► NodeRuntime::open ──► genesis (sekali)
//!                        │
//! blocks.json ──► replay ─┴─► begin_block ─► deliver_tx* ─► end_block
//! ```
//!
//! | Module | Fungsi |
//! |--------|--------|
//! | `block_log` | Format dan loader block log |
//! | `runtime` | `NodeRuntime`: storage, genesis, replay |
//! | `cli` | Argumen command line (clap) |

pub mod block_log;
pub mod cli;
pub mod runtime;

pub const NODE_NAME: &str = "dpos-node";
pub const NODE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use block_log::{load_block_log, parse_block_log, BlockRecord, SignedTx};
pub use runtime::{NodeRuntime, ReplaySummary};
