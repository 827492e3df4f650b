//! Spending allowances for delegated transfers

use std::collections::HashMap;

use strata_common::{Amount, HolderId, LedgerError, SENTINEL_MAX};

/// Owner -> spender allowances; `SENTINEL_MAX` never decreases
#[derive(Debug, Clone, Default)]
pub struct Allowances {
    allowed: HashMap<(HolderId, HolderId), Amount>,
}

impl Allowances {
    pub fn approve(&mut self, owner: &HolderId, spender: &HolderId, amount: Amount) {
        if amount == 0 {
            self.allowed.remove(&(owner.clone(), spender.clone()));
        } else {
            self.allowed.insert((owner.clone(), spender.clone()), amount);
        }
    }

    pub fn allowance(&self, owner: &HolderId, spender: &HolderId) -> Amount {
        self.allowed
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Allowance left after spending `amount`, without recording it
    pub fn check_spend(
        &self,
        owner: &HolderId,
        spender: &HolderId,
        amount: Amount,
    ) -> Result<Amount, LedgerError> {
        let allowed = self.allowance(owner, spender);
        if allowed == SENTINEL_MAX {
            return Ok(SENTINEL_MAX);
        }

        allowed
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::InsufficientAllowance {
                spender: spender.clone(),
                required: amount,
                allowed,
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = (&HolderId, &HolderId, Amount)> {
        self.allowed
            .iter()
            .map(|((owner, spender), amount)| (owner, spender, *amount))
    }
}
