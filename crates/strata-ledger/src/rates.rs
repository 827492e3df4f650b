//! Rate directory - global rate and per-holder locked rates
//!
//! The global rate only ever moves down. Holders lock the global rate when they
//! first deposit (or when they deposit again from an empty position) and keep it
//! while they hold a balance, so later decreases never re-rate existing money.
//! An empty recipient of a transfer inherits the sender's rate instead.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strata_common::{Amount, HolderId, LedgerError, Rate, Timestamp};
use tracing::debug;

/// Per-holder accrual bookkeeping; principal lives in the base ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualRecord {
    /// Rate fixed at deposit or inheritance time
    pub locked_rate: Rate,
    /// Logical time of the most recent settlement
    pub last_settled_at: Timestamp,
}

/// Global rate plus every holder's locked rate
#[derive(Debug, Clone)]
pub struct RateDirectory {
    global_rate: Rate,
    records: HashMap<HolderId, AccrualRecord>,
}

impl RateDirectory {
    pub fn new(global_rate: Rate) -> Self {
        Self {
            global_rate,
            records: HashMap::new(),
        }
    }

    /// Rate offered to new depositors
    pub fn global_rate(&self) -> Rate {
        self.global_rate
    }

    pub fn record(&self, holder: &HolderId) -> Option<&AccrualRecord> {
        self.records.get(holder)
    }

    /// Locked rate of a holder; zero for identities that never held a balance
    pub fn user_interest_rate(&self, holder: &HolderId) -> Rate {
        self.records
            .get(holder)
            .map(|r| r.locked_rate)
            .unwrap_or(0)
    }

    /// Lower the global rate, returning the previous one
    ///
    /// Equal or higher proposals are rejected and leave the directory untouched.
    pub fn set_global_rate(&mut self, new_rate: Rate) -> Result<Rate, LedgerError> {
        if new_rate >= self.global_rate {
            return Err(LedgerError::RateCanOnlyDecrease {
                current: self.global_rate,
                proposed: new_rate,
            });
        }

        let previous = std::mem::replace(&mut self.global_rate, new_rate);
        debug!(previous, new_rate, "Global rate lowered");
        Ok(previous)
    }

    /// Lock the global rate for a depositor
    ///
    /// Applies to first-time holders and to holders whose post-settlement
    /// principal is zero. Returns the newly locked rate, or `None` when the
    /// holder keeps the rate they already had.
    pub fn lock_rate_for_holder(
        &mut self,
        holder: &HolderId,
        settled_principal: Amount,
        now: Timestamp,
    ) -> Option<Rate> {
        let global_rate = self.global_rate;
        match self.records.get_mut(holder) {
            Some(record) if settled_principal > 0 => {
                debug!(holder = %holder, locked_rate = record.locked_rate, "Keeping locked rate");
                None
            }
            Some(record) => {
                record.locked_rate = global_rate;
                Some(global_rate)
            }
            None => {
                self.records.insert(
                    holder.clone(),
                    AccrualRecord {
                        locked_rate: global_rate,
                        last_settled_at: now,
                    },
                );
                Some(global_rate)
            }
        }
    }

    /// Give an empty recipient the sender's rate
    ///
    /// Only applies when the recipient's post-settlement principal is zero; the
    /// rate is overwritten whether it goes up or down. Returns whether the
    /// recipient's rate was (re)assigned.
    pub fn inherit_rate_on_transfer_in(
        &mut self,
        recipient: &HolderId,
        recipient_settled_principal: Amount,
        sender_rate: Rate,
        now: Timestamp,
    ) -> bool {
        if recipient_settled_principal > 0 {
            return false;
        }

        let record = self
            .records
            .entry(recipient.clone())
            .or_insert(AccrualRecord {
                locked_rate: sender_rate,
                last_settled_at: now,
            });
        record.locked_rate = sender_rate;
        true
    }

    /// Advance a holder's accrual clock after settlement
    pub(crate) fn mark_settled(&mut self, holder: &HolderId, now: Timestamp) {
        if let Some(record) = self.records.get_mut(holder) {
            record.last_settled_at = now;
        }
    }

    /// All known holder records
    pub fn records(&self) -> impl Iterator<Item = (&HolderId, &AccrualRecord)> {
        self.records.iter()
    }

    pub(crate) fn restore_record(&mut self, holder: HolderId, record: AccrualRecord) {
        self.records.insert(holder, record);
    }
}
