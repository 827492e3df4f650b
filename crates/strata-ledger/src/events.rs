//! Ledger events
//!
//! Mutating operations return the events they produced instead of emitting
//! them; a notifier downstream decides where they go.

use serde::{Deserialize, Serialize};
use strata_common::{Amount, HolderId, Rate, Timestamp};

/// Event produced by a ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LedgerEvent {
    /// Accrued interest materialized into principal
    InterestSettled {
        holder: HolderId,
        interest: Amount,
        principal: Amount,
        settled_at: Timestamp,
    },
    /// Depositor locked the current global rate
    RateLocked { holder: HolderId, rate: Rate },
    /// Empty recipient took over the sender's rate
    RateInherited {
        holder: HolderId,
        from: HolderId,
        rate: Rate,
    },
    /// Global rate lowered
    GlobalRateChanged { previous: Rate, current: Rate },
    Minted { holder: HolderId, amount: Amount },
    Burned { holder: HolderId, amount: Amount },
    Transferred {
        from: HolderId,
        to: HolderId,
        amount: Amount,
    },
    Approved {
        owner: HolderId,
        spender: HolderId,
        amount: Amount,
    },
}

impl LedgerEvent {
    /// Stable event name for logs and indexing
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::InterestSettled { .. } => "InterestSettled",
            LedgerEvent::RateLocked { .. } => "RateLocked",
            LedgerEvent::RateInherited { .. } => "RateInherited",
            LedgerEvent::GlobalRateChanged { .. } => "GlobalRateChanged",
            LedgerEvent::Minted { .. } => "Minted",
            LedgerEvent::Burned { .. } => "Burned",
            LedgerEvent::Transferred { .. } => "Transferred",
            LedgerEvent::Approved { .. } => "Approved",
        }
    }
}

/// Outcome of a mint, burn or transfer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Amount actually moved, with `SENTINEL_MAX` already resolved
    pub amount: Amount,
    /// Events in the order they happened
    pub events: Vec<LedgerEvent>,
}

impl Receipt {
    /// Total interest materialized by the settlements inside this operation
    pub fn interest_settled(&self) -> Amount {
        self.events
            .iter()
            .map(|e| match e {
                LedgerEvent::InterestSettled { interest, .. } => *interest,
                _ => 0,
            })
            .sum()
    }
}
