//! Node config loader using TOML and serde.
//!
//! ```toml
//! [storage]
//! db_path = "./data/stake"
//!
//! [logging]
//! level = "info"
//!
//! [genesis.params]
//! allowed_bond_denom = "stake"
//! unbond_period = "5"
//!
//! [[genesis.balances]]
//! address = "0101010101010101010101010101010101010101"
//! denom = "stake"
//! amount = 1000
//! ```

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::types::Address;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct NodeConfig {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub genesis: GenesisConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the LMDB environment.
    pub db_path: String,
    /// LMDB map size in bytes.
    pub map_size: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            db_path: "./data/stake".to_string(),
            map_size: 1_000_000_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is not set.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string() }
    }
}

/// Genesis section. Param values stay strings: the staking module parses
/// them itself so malformed values surface as config errors there.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct GenesisConfig {
    pub params: BTreeMap<String, String>,
    pub balances: Vec<GenesisBalance>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct GenesisBalance {
    pub address: Address,
    pub denom: String,
    pub amount: u64,
}

/// Load config from a TOML file path.
/// If file is missing or parse fails, an error is returned.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<NodeConfig> {
    let s = fs::read_to_string(path.as_ref())?;
    let cfg: NodeConfig = toml::from_str(&s)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let def = NodeConfig::default();
        assert_eq!(def.logging.level, "info");
        assert!(def.genesis.params.is_empty());
        assert!(def.storage.map_size > 0);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let toml = r#"
            [storage]
            db_path = "/tmp/stake-db"

            [genesis.params]
            unbond_period = "5"
            max_vals = "4"

            [[genesis.balances]]
            address = "0101010101010101010101010101010101010101"
            denom = "stake"
            amount = 1000
        "#;
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "{}", toml).expect("write");
        let cfg = load_from_file(tmp.path()).expect("load");
        assert_eq!(cfg.storage.db_path, "/tmp/stake-db");
        assert_eq!(cfg.logging.level, "info");
        assert_eq!(cfg.genesis.params.get("unbond_period").map(String::as_str), Some("5"));
        assert_eq!(cfg.genesis.balances.len(), 1);
        assert_eq!(cfg.genesis.balances[0].address, Address::from_bytes([1; 20]));
    }

    #[test]
    fn test_load_rejects_bad_address() {
        use std::io::Write;
        let tmp = tempfile::NamedTempFile::new().expect("temp file");
        let mut f = tmp.reopen().expect("reopen");
        write!(f, "[[genesis.balances]]\naddress = \"zz\"\ndenom = \"stake\"\namount = 1\n").expect("write");
        assert!(load_from_file(tmp.path()).is_err());
    }
}
