//! Staking transactions.
//!
//! `Tx` adalah closed enum: menambah jenis transaksi baru memaksa setiap
//! `match` di handler ikut diperbarui (exhaustiveness dicek compiler).

use dpos_common::{Coin, PubKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Decimal;
use crate::error::{StakeError, StakeResult};
use crate::state::Description;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tx {
    /// Register `pub_key` owned by the signer and self-bond `bond`.
    DeclareCandidacy {
        pub_key: PubKey,
        bond: Coin,
        commission: Decimal,
        #[serde(default)]
        description: Description,
    },
    /// Overwrite the non-empty fields of the description.
    EditCandidacy {
        pub_key: PubKey,
        description: Description,
    },
    Delegate {
        pub_key: PubKey,
        bond: Coin,
    },
    Unbond {
        pub_key: PubKey,
        shares: u128,
    },
    /// Stage a new commission rate through the commission-change queue.
    ModifyCommission {
        pub_key: PubKey,
        commission: Decimal,
    },
}

impl Tx {
    pub fn pub_key(&self) -> &PubKey {
        match self {
            Tx::DeclareCandidacy { pub_key, .. }
            | Tx::EditCandidacy { pub_key, .. }
            | Tx::Delegate { pub_key, .. }
            | Tx::Unbond { pub_key, .. }
            | Tx::ModifyCommission { pub_key, .. } => pub_key,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tx::DeclareCandidacy { .. } => "declare_candidacy",
            Tx::EditCandidacy { .. } => "edit_candidacy",
            Tx::Delegate { .. } => "delegate",
            Tx::Unbond { .. } => "unbond",
            Tx::ModifyCommission { .. } => "modify_commission",
        }
    }

    /// Stateless checks: amounts, rate range, description limits.
    pub fn validate_basic(&self) -> StakeResult<()> {
        match self {
            Tx::DeclareCandidacy { bond, commission, description, .. } => {
                validate_coin(bond)?;
                validate_commission(*commission)?;
                description.validate()
            }
            Tx::EditCandidacy { description, .. } => description.validate(),
            Tx::Delegate { bond, .. } => validate_coin(bond),
            Tx::Unbond { shares, .. } => {
                if *shares == 0 {
                    return Err(StakeError::ZeroAmount);
                }
                Ok(())
            }
            Tx::ModifyCommission { commission, .. } => validate_commission(*commission),
        }
    }
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.pub_key())
    }
}

fn validate_coin(coin: &Coin) -> StakeResult<()> {
    if coin.denom.is_empty() {
        return Err(StakeError::InvalidDenom { expected: "<non-empty>".into(), got: String::new() });
    }
    if coin.is_zero() {
        return Err(StakeError::ZeroAmount);
    }
    Ok(())
}

fn validate_commission(rate: Decimal) -> StakeResult<()> {
    if rate > Decimal::ONE {
        return Err(StakeError::InvalidCommission(rate));
    }
    Ok(())
}
