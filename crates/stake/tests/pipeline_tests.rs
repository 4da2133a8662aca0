//! Block pipeline integration tests: `BlockExecutor` over memory and LMDB.

use dpos_common::{Address, Coin, PubKey};
use dpos_stake::store::open_env;
use dpos_stake::{
    BlockExecutor, BlockOutcome, Decimal, Description, FixedReward, KvLedger, Ledger, LmdbStore,
    MemLedger, MemStore, StakeError, Tx, ValidatorUpdate,
};
use tempfile::TempDir;

fn addr(byte: u8) -> Address {
    Address::from_bytes([byte; 20])
}

fn pk(byte: u8) -> PubKey {
    PubKey::from_bytes([byte; 32])
}

fn declare(key: u8, amount: u128) -> Tx {
    Tx::DeclareCandidacy {
        pub_key: pk(key),
        bond: Coin::new("stake", amount),
        commission: Decimal::ZERO,
        description: Description::default(),
    }
}

fn delegate(key: u8, amount: u128) -> Tx {
    Tx::Delegate { pub_key: pk(key), bond: Coin::new("stake", amount) }
}

fn unbond(key: u8, shares: u128) -> Tx {
    Tx::Unbond { pub_key: pk(key), shares }
}

fn memory_executor(genesis: &[(&str, &str)]) -> BlockExecutor<MemStore, MemLedger> {
    let mut ledger = MemLedger::new();
    for b in 1..=5u8 {
        ledger.credit(&addr(b), &Coin::new("stake", 10_000)).expect("fund");
    }
    let mut exec = BlockExecutor::new(MemStore::new(), ledger).expect("executor");
    for (k, v) in genesis {
        exec.init_state("stake", k, v).expect("genesis");
    }
    exec
}

/// Scripted blocks: (height, [(signer, tx)]).
fn script() -> Vec<(u64, Vec<(u8, Tx)>)> {
    vec![
        (1, vec![(1, declare(1, 500)), (2, declare(2, 300)), (3, declare(3, 100))]),
        (2, vec![(4, delegate(3, 450))]),
        (3, vec![(1, unbond(1, 500))]),
        (4, vec![]),
        (5, vec![(5, delegate(2, 10))]),
    ]
}

fn run_script(exec: &mut BlockExecutor<MemStore, MemLedger>) -> Vec<BlockOutcome> {
    let mut outcomes = Vec::new();
    for (height, txs) in script() {
        exec.begin_block(height).expect("begin");
        for (signer, tx) in txs {
            exec.deliver_tx(vec![addr(signer)], &tx).expect("deliver");
        }
        outcomes.push(exec.end_block().expect("end"));
    }
    outcomes
}

#[test]
fn independent_executors_agree() {
    let genesis = [("max_vals", "2"), ("block_reward", "7"), ("unbond_period", "1")];
    let mut a = memory_executor(&genesis);
    let mut b = memory_executor(&genesis);

    let out_a = run_script(&mut a);
    let out_b = run_script(&mut b);
    assert_eq!(out_a, out_b);
    assert_eq!(a.store(), b.store());

    let digests: Vec<&str> = out_a.iter().map(|o| o.digest.as_str()).collect();
    let digests_b: Vec<&str> = out_b.iter().map(|o| o.digest.as_str()).collect();
    assert_eq!(digests, digests_b);
}

#[test]
fn validator_diffs_track_top_candidates() {
    let mut exec = memory_executor(&[("max_vals", "2")]);
    let out = run_script(&mut exec);

    assert_eq!(
        out[0].updates,
        vec![ValidatorUpdate { pub_key: pk(1), power: 500 }, ValidatorUpdate { pub_key: pk(2), power: 300 }]
    );
    // 3 climbs to 550 and pushes 2 out
    assert_eq!(
        out[1].updates,
        vec![ValidatorUpdate { pub_key: pk(2), power: 0 }, ValidatorUpdate { pub_key: pk(3), power: 550 }]
    );
    // 1 is removed, 2 comes back
    assert_eq!(
        out[2].updates,
        vec![ValidatorUpdate { pub_key: pk(1), power: 0 }, ValidatorUpdate { pub_key: pk(2), power: 300 }]
    );
    assert!(out[3].updates.is_empty());
    assert_eq!(out[4].updates, vec![ValidatorUpdate { pub_key: pk(2), power: 310 }]);
}

#[test]
fn empty_diffs_share_one_digest() {
    let mut exec = memory_executor(&[]);
    exec.begin_block(1).expect("begin");
    let first = exec.end_block().expect("end");
    exec.begin_block(2).expect("begin");
    let second = exec.end_block().expect("end");
    assert!(first.updates.is_empty());
    assert_eq!(first.digest, second.digest);
    assert_eq!(first.digest.len(), 128);
}

#[test]
fn heights_must_increase() {
    let mut exec = memory_executor(&[]);
    exec.begin_block(5).expect("begin");
    exec.end_block().expect("end");
    assert!(matches!(
        exec.begin_block(5),
        Err(StakeError::HeightNotIncreasing { last: 5, got: 5 })
    ));
    assert!(matches!(
        exec.begin_block(4),
        Err(StakeError::HeightNotIncreasing { last: 5, got: 4 })
    ));
    exec.begin_block(9).expect("gaps are fine");
}

#[test]
fn tx_needs_active_block() {
    let mut exec = memory_executor(&[]);
    assert!(matches!(exec.deliver_tx(vec![addr(1)], &declare(1, 10)), Err(StakeError::NoActiveBlock)));
    assert!(matches!(exec.end_block(), Err(StakeError::NoActiveBlock)));

    exec.begin_block(1).expect("begin");
    exec.deliver_tx(vec![addr(1)], &declare(1, 10)).expect("deliver");
    exec.end_block().expect("end");
    assert!(matches!(exec.deliver_tx(vec![addr(1)], &delegate(1, 10)), Err(StakeError::NoActiveBlock)));

    // check works between blocks
    exec.check_tx(vec![addr(2)], &delegate(1, 10)).expect("check");
}

#[test]
fn genesis_rejects_bad_entries() {
    let mut exec = memory_executor(&[]);
    assert!(matches!(exec.init_state("bank", "max_vals", "1"), Err(StakeError::UnknownModule(_))));
    assert!(matches!(exec.init_state("stake", "gas_unbound", "1"), Err(StakeError::UnknownConfigKey(_))));
    assert!(matches!(
        exec.init_state("stake", "max_vals", "lots"),
        Err(StakeError::InvalidConfigValue { .. })
    ));
    exec.init_state("stake", "gas_bond", "33").expect("alias");
    let res = exec.check_tx(vec![addr(1)], &declare(1, 10)).expect("check");
    assert_eq!(res.gas_wanted, 20);
}

#[test]
fn custom_reward_policy_is_used() {
    let mut exec = memory_executor(&[]).with_reward_policy(Box::new(FixedReward { per_candidate: 10 }));
    exec.begin_block(1).expect("begin");
    exec.deliver_tx(vec![addr(1)], &declare(1, 100)).expect("declare");
    exec.end_block().expect("end");
    let report = exec.begin_block(2).expect("begin");
    assert_eq!(report.rewards_minted, 10);
}

// ════════════════════════════════════════════════════════════
// LMDB
// ════════════════════════════════════════════════════════════

type LmdbExecutor = BlockExecutor<LmdbStore, KvLedger<LmdbStore>>;

fn open_lmdb(dir: &TempDir) -> LmdbExecutor {
    let env = open_env(dir.path(), 16 * 1024 * 1024).expect("env");
    let store = LmdbStore::new(env.clone(), "stake").expect("stake db");
    let ledger = KvLedger::new(LmdbStore::new(env, "bank").expect("bank db"));
    BlockExecutor::new(store, ledger).expect("executor")
}

#[test]
fn lmdb_state_survives_restart() {
    let dir = TempDir::new().expect("tempdir");
    {
        let mut exec = open_lmdb(&dir);
        assert_eq!(exec.last_height(), None);
        exec.init_state("stake", "unbond_period", "1").expect("genesis");
        exec.ledger_mut().credit(&addr(1), &Coin::new("stake", 1_000)).expect("fund");

        exec.begin_block(1).expect("begin");
        exec.deliver_tx(vec![addr(1)], &declare(1, 400)).expect("declare");
        exec.end_block().expect("end");

        exec.begin_block(2).expect("begin");
        exec.deliver_tx(vec![addr(1)], &unbond(1, 100)).expect("unbond");
        exec.end_block().expect("end");
    }

    let mut exec = open_lmdb(&dir);
    assert_eq!(exec.last_height(), Some(2));
    assert!(matches!(exec.begin_block(2), Err(StakeError::HeightNotIncreasing { .. })));

    let report = exec.begin_block(4).expect("begin");
    assert_eq!(report.unbonds_paid, 1);
    assert_eq!(exec.ledger().balance(&addr(1), "stake").expect("balance"), 700);
    let out = exec.end_block().expect("end");
    assert!(out.updates.is_empty());
}

#[test]
fn lmdb_failed_tx_leaves_no_trace() {
    let dir = TempDir::new().expect("tempdir");
    let mut exec = open_lmdb(&dir);
    exec.begin_block(1).expect("begin");
    let err = exec.deliver_tx(vec![addr(9)], &declare(9, 10)).unwrap_err();
    assert!(matches!(err, StakeError::TransferFailed(_)));
    let out = exec.end_block().expect("end");
    assert!(out.updates.is_empty());
    assert!(exec.check_tx(vec![addr(9)], &delegate(9, 1)).is_err());
}
