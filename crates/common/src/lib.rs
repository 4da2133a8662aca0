//! # DPoS Common Crate
//!
//! Primitive types dan utilitas yang dipakai bersama oleh engine staking dan node.
//!
//! ## Modules
//! - `types`: `Address`, `PubKey`, `Coin`
//! - `crypto`: SHA3-512 hashing, derivasi alamat akun dan module account
//! - `config`: TOML node configuration (storage, logging, genesis)

pub mod config;
pub mod crypto;
pub mod types;

pub use types::{Address, Coin, PubKey};
