//! # Node Runtime
//!
//! Menyatukan storage LMDB, ledger, dan `BlockExecutor`.
//!
//! | Database | Isi |
//! |----------|-----|
//! | `stake` | state module staking |
//! | `bank` | saldo ledger (`KvLedger`) |
//!
//! ## Startup
//!
//! 1. buka environment LMDB di `storage.db_path`
//! 2. bila params belum ada: terapkan genesis (params + saldo awal)
//! 3. lanjutkan dari `last_height` yang tersimpan
//!
//! Replay melewati block dengan height `<= last_height`, jadi menjalankan
//! ulang log yang sama setelah restart aman.
//!
//! ## Batas atomicity
//!
//! `stake` dan `bank` di-commit dalam transaksi LMDB terpisah: ledger lebih
//! dulu, lalu batch staking. Crash di antara keduanya membuat kedua db tidak
//! sinkron (transfer sudah tercatat, state staking belum), dan replay tidak
//! memperbaikinya. Kegagalan biasa (error, bukan crash) tidak kena: tx yang
//! ditolak tidak menulis apa pun, payout unbond di-commit per entry.

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use dpos_common::config::{GenesisConfig, NodeConfig};
use dpos_common::{Address, Coin};
use dpos_stake::store::open_env;
use dpos_stake::{
    BlockExecutor, CacheStore, Candidate, KvLedger, Ledger, LmdbStore, Params, StakeState,
    ValidatorUpdate, STAKE_MODULE_NAME,
};

use crate::block_log::BlockRecord;

pub const BANK_DB: &str = "bank";

pub type NodeExecutor = BlockExecutor<LmdbStore, KvLedger<LmdbStore>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub blocks_applied: usize,
    pub blocks_skipped: usize,
    pub txs_delivered: usize,
    pub txs_rejected: usize,
    pub last_height: Option<u64>,
    /// Validator updates emitted by the last applied block.
    pub last_updates: Vec<ValidatorUpdate>,
}

pub struct NodeRuntime {
    executor: NodeExecutor,
}

impl NodeRuntime {
    /// Open storage and apply genesis on first start.
    pub fn open(config: &NodeConfig) -> Result<Self> {
        let env = open_env(&config.storage.db_path, config.storage.map_size)
            .with_context(|| format!("cannot open LMDB at {}", config.storage.db_path))?;
        let store = LmdbStore::new(env.clone(), STAKE_MODULE_NAME)?;
        let ledger = KvLedger::new(LmdbStore::new(env, BANK_DB)?);
        let executor = BlockExecutor::new(store, ledger)?;

        let mut runtime = NodeRuntime { executor };
        if !runtime.has_params()? {
            runtime.apply_genesis(&config.genesis)?;
        } else {
            info!("resuming at height {:?}", runtime.executor.last_height());
        }
        Ok(runtime)
    }

    fn view(&self) -> StakeState<CacheStore<'_, LmdbStore>> {
        StakeState::new(CacheStore::new(self.executor.store()))
    }

    fn has_params(&self) -> Result<bool> {
        Ok(self.view().has_params()?)
    }

    /// Mint initial balances, then write genesis params. Stored params mark a
    /// finished genesis, so they go in last; a bank that already holds a
    /// genesis balance means an earlier attempt stopped midway.
    pub fn apply_genesis(&mut self, genesis: &GenesisConfig) -> Result<()> {
        let params_batch = {
            let mut overlay = CacheStore::new(self.executor.store());
            dpos_stake::init_genesis(
                &mut overlay,
                genesis.params.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            )
            .context("invalid genesis params")?;
            overlay.into_batch()
        };

        for b in &genesis.balances {
            let have = self.executor.ledger().balance(&b.address, &b.denom)?;
            if have != 0 {
                bail!(
                    "bank already holds {}{} for {} without genesis params: partial genesis in {}",
                    have,
                    b.denom,
                    b.address,
                    BANK_DB
                );
            }
        }
        for b in &genesis.balances {
            self.executor
                .ledger_mut()
                .credit(&b.address, &Coin::new(b.denom.as_str(), u128::from(b.amount)))
                .with_context(|| format!("genesis balance for {}", b.address))?;
        }

        params_batch.commit(self.executor.store_mut())?;
        info!(
            "genesis applied: {} param(s), {} balance(s)",
            genesis.params.len(),
            genesis.balances.len()
        );
        Ok(())
    }

    pub fn last_height(&self) -> Option<u64> {
        self.executor.last_height()
    }

    pub fn params(&self) -> Result<Params> {
        Ok(self.view().load_params()?)
    }

    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.view().candidates()?)
    }

    pub fn validator_set(&self) -> Result<Vec<ValidatorUpdate>> {
        Ok(self.view().last_validator_set()?)
    }

    pub fn balance(&self, account: &Address, denom: &str) -> Result<u128> {
        Ok(self.executor.ledger().balance(account, denom)?)
    }

    /// Execute `blocks` in order. Rejected transactions are logged and
    /// skipped; store or protocol errors abort the replay.
    pub fn replay(&mut self, blocks: &[BlockRecord]) -> Result<ReplaySummary> {
        let mut summary = ReplaySummary::default();
        for block in blocks {
            if matches!(self.executor.last_height(), Some(last) if block.height <= last) {
                summary.blocks_skipped += 1;
                continue;
            }

            let report = self
                .executor
                .begin_block(block.height)
                .with_context(|| format!("epilogue failed at height {}", block.height))?;
            debug!(
                "height {}: {} unbond(s) paid, {} commission change(s), {} minted",
                report.height, report.unbonds_paid, report.commission_changes_applied, report.rewards_minted
            );

            for (i, signed) in block.txs.iter().enumerate() {
                match self.executor.deliver_tx(signed.signers.clone(), &signed.tx) {
                    Ok(res) => {
                        summary.txs_delivered += 1;
                        debug!("height {} tx #{} used {} gas", block.height, i, res.gas_used);
                    }
                    Err(e) => {
                        summary.txs_rejected += 1;
                        warn!("height {} tx #{} {} rejected: {}", block.height, i, signed.tx, e);
                    }
                }
            }

            let outcome = self.executor.end_block()?;
            for u in &outcome.updates {
                info!("height {}: validator {} power {}", outcome.height, u.pub_key, u.power);
            }
            summary.blocks_applied += 1;
            summary.last_updates = outcome.updates;
        }

        self.executor.store().sync()?;
        summary.last_height = self.executor.last_height();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block_log::SignedTx;
    use dpos_common::config::{GenesisBalance, StorageConfig};
    use dpos_common::PubKey;
    use dpos_stake::{Decimal, Description, Tx};
    use tempfile::TempDir;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 20])
    }

    fn config(dir: &TempDir) -> NodeConfig {
        let mut cfg = NodeConfig {
            storage: StorageConfig {
                db_path: dir.path().join("db").to_string_lossy().into_owned(),
                map_size: 16 * 1024 * 1024,
            },
            ..Default::default()
        };
        cfg.genesis.params.insert("unbond_period".into(), "1".into());
        cfg.genesis.balances.push(GenesisBalance { address: addr(1), denom: "stake".into(), amount: 1_000 });
        cfg
    }

    fn blocks() -> Vec<BlockRecord> {
        let pk = PubKey::from_bytes([7; 32]);
        vec![
            BlockRecord {
                height: 1,
                txs: vec![
                    SignedTx {
                        signers: vec![addr(1)],
                        tx: Tx::DeclareCandidacy {
                            pub_key: pk,
                            bond: Coin::new("stake", 600),
                            commission: Decimal::ZERO,
                            description: Description::default(),
                        },
                    },
                    // unfunded: rejected, replay continues
                    SignedTx {
                        signers: vec![addr(2)],
                        tx: Tx::Delegate { pub_key: pk, bond: Coin::new("stake", 5) },
                    },
                ],
            },
            BlockRecord { height: 2, txs: vec![] },
        ]
    }

    #[test]
    fn genesis_then_replay() {
        let dir = TempDir::new().expect("tempdir");
        let mut node = NodeRuntime::open(&config(&dir)).expect("open");
        assert_eq!(node.params().expect("params").unbond_period, 1);

        let summary = node.replay(&blocks()).expect("replay");
        assert_eq!(summary.blocks_applied, 2);
        assert_eq!((summary.txs_delivered, summary.txs_rejected), (1, 1));
        assert_eq!(summary.last_height, Some(2));
        assert_eq!(node.candidates().expect("candidates").len(), 1);
        assert_eq!(node.validator_set().expect("set")[0].power, 600);
        assert_eq!(node.balance(&addr(1), "stake").expect("balance"), 400);
    }

    #[test]
    fn restart_skips_applied_blocks_and_genesis() {
        let dir = TempDir::new().expect("tempdir");
        {
            let mut node = NodeRuntime::open(&config(&dir)).expect("open");
            node.replay(&blocks()).expect("replay");
        }
        let mut node = NodeRuntime::open(&config(&dir)).expect("reopen");
        assert_eq!(node.last_height(), Some(2));
        // genesis balances are not minted twice
        assert_eq!(node.balance(&addr(1), "stake").expect("balance"), 400);

        let summary = node.replay(&blocks()).expect("replay");
        assert_eq!(summary.blocks_applied, 0);
        assert_eq!(summary.blocks_skipped, 2);
    }

    #[test]
    fn bad_genesis_param_mints_nothing() {
        let dir = TempDir::new().expect("tempdir");
        let mut cfg = config(&dir);
        cfg.genesis.params.insert("unbond_period".into(), "soon".into());
        assert!(NodeRuntime::open(&cfg).is_err());

        // fixed config on the same storage: genesis runs once, balances minted once
        let node = NodeRuntime::open(&config(&dir)).expect("reopen");
        assert_eq!(node.params().expect("params").unbond_period, 1);
        assert_eq!(node.balance(&addr(1), "stake").expect("balance"), 1_000);
    }

    #[test]
    fn partial_genesis_is_refused() {
        let dir = TempDir::new().expect("tempdir");
        let cfg = config(&dir);
        {
            // balances landed in the bank but params never did
            let env = open_env(&cfg.storage.db_path, cfg.storage.map_size).expect("env");
            let mut bank = KvLedger::new(LmdbStore::new(env, BANK_DB).expect("bank"));
            bank.credit(&addr(1), &Coin::new("stake", 1_000)).expect("credit");
        }
        let err = NodeRuntime::open(&cfg).err().expect("partial genesis");
        assert!(format!("{err:#}").contains("partial genesis"));
    }

    #[test]
    fn bad_genesis_param_fails_open() {
        let dir = TempDir::new().expect("tempdir");
        let mut cfg = config(&dir);
        cfg.genesis.params.insert("gas_unbound".into(), "1".into());
        assert!(NodeRuntime::open(&cfg).is_err());
    }
}
