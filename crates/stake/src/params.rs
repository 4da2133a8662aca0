//! Module parameters and the genesis/admin key parser.
//!
//! Params disimpan di store (key `params`) dan dibaca ulang di awal setiap
//! operasi. Tidak ada cache lintas block karena genesis/admin bisa mengubahnya.

use dpos_common::crypto::module_address;
use dpos_common::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::bonding::{BondingCurve, ExchangeRateCurve, FlatCurve};
use crate::decimal::Decimal;
use crate::error::{StakeError, StakeResult};

/// Seed for the default custody account.
pub const HOLD_ACCOUNT_SEED: &str = "stake/hold";

/// Which [`BondingCurve`] prices shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveKind {
    /// One share per unit, rewards paid out instead of compounded.
    Flat,
    /// Shares priced at `bonded / shares`, rewards compound into the pool.
    ExchangeRate,
}

impl CurveKind {
    pub fn curve(&self) -> &'static dyn BondingCurve {
        match self {
            CurveKind::Flat => &FlatCurve,
            CurveKind::ExchangeRate => &ExchangeRateCurve,
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurveKind::Flat => f.write_str("flat"),
            CurveKind::ExchangeRate => f.write_str("exchange_rate"),
        }
    }
}

impl FromStr for CurveKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "flat" => Ok(CurveKind::Flat),
            "exchange_rate" => Ok(CurveKind::ExchangeRate),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    pub allowed_bond_denom: String,
    pub max_vals: u16,

    pub gas_declare_candidacy: u64,
    pub gas_edit_candidacy: u64,
    pub gas_delegate: u64,
    pub gas_unbond: u64,
    pub gas_modify_commission: u64,

    /// Custody account for all bonded value and pending payouts.
    pub hold_account: Address,

    /// Blocks an unbond waits before payout.
    pub unbond_period: u64,
    /// Blocks a commission change waits before it takes effect.
    pub commission_change_period: u64,
    /// Max total commission movement inside one window.
    pub max_commission_change: Decimal,
    /// Length of the commission window in blocks.
    pub commission_check_blocks: u64,

    /// Value minted per block and split across candidates.
    pub block_reward: u128,
    pub bonding_curve: CurveKind,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            allowed_bond_denom: "stake".to_string(),
            max_vals: 100,
            gas_declare_candidacy: 20,
            gas_edit_candidacy: 20,
            gas_delegate: 20,
            gas_unbond: 20,
            gas_modify_commission: 20,
            hold_account: module_address(HOLD_ACCOUNT_SEED),
            unbond_period: 30,
            commission_change_period: 30,
            max_commission_change: Decimal::from_raw(10_000_000_000), // 0.01
            commission_check_blocks: 100,
            block_reward: 0,
            bonding_curve: CurveKind::ExchangeRate,
        }
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> StakeResult<T> {
    value.trim().parse::<T>().map_err(|_| StakeError::InvalidConfigValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

impl Params {
    pub fn curve(&self) -> &'static dyn BondingCurve {
        self.bonding_curve.curve()
    }

    /// Apply one genesis/admin key. On error `self` is left untouched.
    pub fn set_key(&mut self, key: &str, value: &str) -> StakeResult<()> {
        match key {
            "allowed_bond_denom" => {
                let denom = value.trim();
                if denom.is_empty() {
                    return Err(StakeError::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.allowed_bond_denom = denom.to_string();
            }
            "max_vals" => self.max_vals = parse(key, value)?,
            "gas_bond" => self.gas_delegate = parse(key, value)?,
            "gas_unbond" => self.gas_unbond = parse(key, value)?,
            "gas_declare_candidacy" => self.gas_declare_candidacy = parse(key, value)?,
            "gas_edit_candidacy" => self.gas_edit_candidacy = parse(key, value)?,
            "gas_modify_commission" => self.gas_modify_commission = parse(key, value)?,
            "hold_account" => self.hold_account = parse(key, value)?,
            "unbond_period" => self.unbond_period = parse(key, value)?,
            "commission_change_period" => self.commission_change_period = parse(key, value)?,
            "max_commission_change" => {
                let d: Decimal = parse(key, value)?;
                if d > Decimal::ONE {
                    return Err(StakeError::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                self.max_commission_change = d;
            }
            "commission_check_blocks" => self.commission_check_blocks = parse(key, value)?,
            "block_reward" => self.block_reward = parse(key, value)?,
            "bonding_curve" => self.bonding_curve = parse(key, value)?,
            other => return Err(StakeError::UnknownConfigKey(other.to_string())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn recognised_keys_update_fields() {
        let mut p = Params::default();
        p.set_key("allowed_bond_denom", "atom").expect("denom");
        p.set_key("max_vals", "7").expect("max_vals");
        p.set_key("gas_bond", "11").expect("gas_bond");
        p.set_key("unbond_period", " 5 ").expect("unbond_period");
        p.set_key("bonding_curve", "flat").expect("curve");
        assert_eq!(p.allowed_bond_denom, "atom");
        assert_eq!(p.max_vals, 7);
        assert_eq!(p.gas_delegate, 11);
        assert_eq!(p.unbond_period, 5);
        assert_eq!(p.bonding_curve, CurveKind::Flat);
    }

    #[test]
    fn unknown_key_rejected() {
        let mut p = Params::default();
        let err = p.set_key("gas_unbound", "3").unwrap_err();
        assert!(matches!(err, StakeError::UnknownConfigKey(ref k) if k == "gas_unbound"));
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(p, Params::default());
    }

    #[test]
    fn malformed_values_rejected_without_mutation() {
        let mut p = Params::default();
        for (k, v) in [
            ("max_vals", "-1"),
            ("max_vals", "70000"),
            ("unbond_period", "soon"),
            ("max_commission_change", "1.5"),
            ("hold_account", "0x1234"),
            ("bonding_curve", "quadratic"),
            ("allowed_bond_denom", "  "),
        ] {
            let err = p.set_key(k, v).unwrap_err();
            assert!(matches!(err, StakeError::InvalidConfigValue { .. }), "{k}={v}");
        }
        assert_eq!(p, Params::default());
    }

    #[test]
    fn default_hold_account_is_module_account() {
        assert_eq!(Params::default().hold_account, module_address(HOLD_ACCOUNT_SEED));
    }
}
