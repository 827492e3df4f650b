//! Base ledger - interest-unaware principal storage
//!
//! The core composes over a [`BaseLedger`] rather than extending it: the
//! token's own mint/burn/transfer run settlement first and then delegate the
//! raw principal movement here.

use std::collections::HashMap;

use strata_common::{Amount, HolderId, LedgerError};

/// Principal storage capability consumed by the core
pub trait BaseLedger {
    /// Increase stored principal
    fn credit_principal(&mut self, holder: &HolderId, amount: Amount) -> Result<(), LedgerError>;

    /// Decrease stored principal, failing with `InsufficientBalance` when short
    fn debit_principal(&mut self, holder: &HolderId, amount: Amount) -> Result<(), LedgerError>;

    /// Materialized principal of a holder (zero when unknown)
    fn principal_of(&self, holder: &HolderId) -> Amount;

    /// Sum of all materialized principal
    fn total_principal(&self) -> Amount;
}

/// HashMap-backed base ledger
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    principals: HashMap<HolderId, Amount>,
    total: Amount,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BaseLedger for InMemoryLedger {
    fn credit_principal(&mut self, holder: &HolderId, amount: Amount) -> Result<(), LedgerError> {
        if amount == 0 {
            return Ok(());
        }

        let current = self.principal_of(holder);
        let updated = current
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let total = self
            .total
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        self.principals.insert(holder.clone(), updated);
        self.total = total;
        Ok(())
    }

    fn debit_principal(&mut self, holder: &HolderId, amount: Amount) -> Result<(), LedgerError> {
        let current = self.principal_of(holder);
        if current < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: holder.clone(),
                required: amount,
                available: current,
            });
        }
        if amount == 0 {
            return Ok(());
        }

        self.principals.insert(holder.clone(), current - amount);
        self.total -= amount;
        Ok(())
    }

    fn principal_of(&self, holder: &HolderId) -> Amount {
        self.principals.get(holder).copied().unwrap_or(0)
    }

    fn total_principal(&self) -> Amount {
        self.total
    }
}
