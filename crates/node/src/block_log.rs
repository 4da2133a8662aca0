//! Block log: JSON file of pre-ordered blocks replayed by the node.
//!
//! ```json
//! [
//!   { "height": 1, "txs": [
//!       { "signers": ["0101..01"], "tx": { "declare_candidacy": { ... } } }
//!   ] },
//!   { "height": 2, "txs": [] }
//! ]
//! ```
//!
//! Signature verification happens upstream; `signers` are taken as verified.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use dpos_common::Address;
use dpos_stake::Tx;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub signers: Vec<Address>,
    pub tx: Tx,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub height: u64,
    #[serde(default)]
    pub txs: Vec<SignedTx>,
}

/// Parse a block log and make sure heights strictly increase.
pub fn parse_block_log(json: &str) -> Result<Vec<BlockRecord>> {
    let blocks: Vec<BlockRecord> = serde_json::from_str(json).context("malformed block log")?;
    for pair in blocks.windows(2) {
        if pair[1].height <= pair[0].height {
            bail!(
                "block log heights must increase: {} follows {}",
                pair[1].height,
                pair[0].height
            );
        }
    }
    Ok(blocks)
}

pub fn load_block_log(path: impl AsRef<Path>) -> Result<Vec<BlockRecord>> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("cannot read block log {}", path.display()))?;
    parse_block_log(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_blocks_with_and_without_txs() {
        let signer = "01".repeat(20);
        let pk = "02".repeat(32);
        let json = format!(
            r#"[
                {{"height": 1, "txs": [{{"signers": ["{signer}"],
                  "tx": {{"delegate": {{"pub_key": "{pk}", "bond": {{"denom": "stake", "amount": 5}}}}}}}}]}},
                {{"height": 3}}
            ]"#
        );
        let blocks = parse_block_log(&json).expect("parse");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].txs.len(), 1);
        assert_eq!(blocks[0].txs[0].signers, vec![Address::from_bytes([1; 20])]);
        assert!(blocks[1].txs.is_empty());
    }

    #[test]
    fn non_increasing_heights_rejected() {
        let err = parse_block_log(r#"[{"height": 2}, {"height": 2}]"#).unwrap_err();
        assert!(err.to_string().contains("must increase"));
    }

    #[test]
    fn garbage_rejected() {
        assert!(parse_block_log("{not json").is_err());
    }
}
