//! Data structures persisted by the staking module.

use dpos_common::{Address, PubKey};
use serde::{Deserialize, Serialize};

use crate::decimal::Decimal;
use crate::error::{StakeError, StakeResult};

// ════════════════════════════════════════════════════════════════════════════
// DESCRIPTION
// ════════════════════════════════════════════════════════════════════════════

pub const MAX_MONIKER_LEN: usize = 70;
pub const MAX_IDENTITY_LEN: usize = 3000;
pub const MAX_WEBSITE_LEN: usize = 140;
pub const MAX_DETAILS_LEN: usize = 280;

/// Free-form candidate metadata. Empty field = "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Description {
    pub moniker: String,
    pub identity: String,
    pub website: String,
    pub details: String,
}

impl Description {
    pub fn is_empty(&self) -> bool {
        self.moniker.is_empty()
            && self.identity.is_empty()
            && self.website.is_empty()
            && self.details.is_empty()
    }

    pub fn validate(&self) -> StakeResult<()> {
        for (field, value, max) in [
            ("moniker", &self.moniker, MAX_MONIKER_LEN),
            ("identity", &self.identity, MAX_IDENTITY_LEN),
            ("website", &self.website, MAX_WEBSITE_LEN),
            ("details", &self.details, MAX_DETAILS_LEN),
        ] {
            if value.len() > max {
                return Err(StakeError::DescriptionTooLong { field, len: value.len(), max });
            }
        }
        Ok(())
    }

    /// Overwrite fields that are non-empty in `edit`. Returns whether anything changed.
    pub fn apply_edit(&mut self, edit: &Description) -> bool {
        let mut changed = false;
        for (dst, src) in [
            (&mut self.moniker, &edit.moniker),
            (&mut self.identity, &edit.identity),
            (&mut self.website, &edit.website),
            (&mut self.details, &edit.details),
        ] {
            if !src.is_empty() && *dst != *src {
                dst.clone_from(src);
                changed = true;
            }
        }
        changed
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CANDIDATE
// ════════════════════════════════════════════════════════════════════════════

/// Rolling window bounding how far commission may move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionWindow {
    pub start_height: u64,
    /// Sum of |delta| of changes submitted since `start_height`.
    pub accumulated: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub pub_key: PubKey,
    /// Sequence number of the declaration that created this record.
    pub declaration: u64,
    /// `None` once the owner fully unbonded (withdrawn).
    pub owner: Option<Address>,
    pub shares: u128,
    /// Value held in custody for this pool.
    pub bonded: u128,
    /// `bonded / shares`, 1 for an empty pool.
    pub exchange_rate: Decimal,
    pub commission: Decimal,
    pub pending_commission: Option<Decimal>,
    pub commission_window: CommissionWindow,
    pub description: Description,
}

impl Candidate {
    pub fn new(pub_key: PubKey, owner: Address, description: Description) -> Self {
        Candidate {
            pub_key,
            declaration: 0,
            owner: Some(owner),
            shares: 0,
            bonded: 0,
            exchange_rate: Decimal::ONE,
            commission: Decimal::ZERO,
            pending_commission: None,
            commission_window: CommissionWindow::default(),
            description,
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        self.owner.is_none()
    }

    pub fn is_owned_by(&self, who: &Address) -> bool {
        self.owner.as_ref() == Some(who)
    }

    pub fn refresh_exchange_rate(&mut self) -> StakeResult<()> {
        self.exchange_rate = if self.shares == 0 {
            Decimal::ONE
        } else {
            Decimal::from_ratio(self.bonded, self.shares)
                .ok_or(StakeError::Overflow("exchange_rate"))?
        };
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// BONDS & QUEUE ENTRIES
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegatorBond {
    pub delegator: Address,
    pub pub_key: PubKey,
    pub shares: u128,
}

/// Pending payout; shares were already debited at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbondEntry {
    pub account: Address,
    pub pub_key: PubKey,
    pub shares: u128,
    pub value: u128,
    pub height: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommissionChangeEntry {
    pub pub_key: PubKey,
    /// [`Candidate::declaration`] at submission; a redeclared key does not match.
    pub declaration: u64,
    pub commission: Decimal,
    pub height: u64,
}

/// One entry of the validator-set diff. `power == 0` removes the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValidatorUpdate {
    pub pub_key: PubKey,
    pub power: u64,
}
