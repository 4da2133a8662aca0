//! Validator set projector: end-of-block diff for the consensus engine.
//!
//! Diff punya encoding bincode yang deterministik dan digest SHA3-512, sehingga
//! dua eksekusi independen bisa dibandingkan byte-per-byte.

use dpos_common::crypto::sha3_512_hex;
use tracing::info;

use crate::error::StakeResult;
use crate::state::{StakeState, ValidatorUpdate};
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    pub height: u64,
    /// Sorted by pub key; power 0 removes.
    pub updates: Vec<ValidatorUpdate>,
    /// SHA3-512 of the encoded `updates`.
    pub digest: String,
}

pub fn encode_updates(updates: &[ValidatorUpdate]) -> StakeResult<Vec<u8>> {
    Ok(bincode::serialize(updates)?)
}

pub fn updates_digest(updates: &[ValidatorUpdate]) -> StakeResult<String> {
    Ok(sha3_512_hex(&encode_updates(updates)?))
}

/// Project the validator set and persist it. Returns the diff for `height`.
pub fn end_block<S: Store>(store: &mut S, height: u64) -> StakeResult<BlockOutcome> {
    let mut state = StakeState::new(store);
    let params = state.load_params()?;
    let updates = state.update_validator_set(params.max_vals)?;
    let digest = updates_digest(&updates)?;
    if !updates.is_empty() {
        info!("height {}: {} validator update(s)", height, updates.len());
    }
    Ok(BlockOutcome { height, updates, digest })
}
