//! InterestToken - rebasing balance ledger
//!
//! Every principal-changing entry point follows the same shape:
//!
//! 1. resolve `SENTINEL_MAX` against the live balance (pure read),
//! 2. plan settlement for every party and validate the whole operation,
//! 3. apply settlements, rate bookkeeping and the principal movement.
//!
//! Nothing is written before step 3, so a rejected operation leaves the ledger
//! exactly as it was.

use strata_common::{Amount, HolderId, LedgerError, Rate, Timestamp, SENTINEL_MAX};
use tracing::{debug, info, instrument, warn};

use crate::accrual;
use crate::allowances::Allowances;
use crate::base::{BaseLedger, InMemoryLedger};
use crate::events::{LedgerEvent, Receipt};
use crate::rates::RateDirectory;
use crate::settlement::{self, SettlementPlan};

/// Interest-bearing ledger composed over a base principal ledger
#[derive(Debug, Clone)]
pub struct InterestToken<L: BaseLedger = InMemoryLedger> {
    pub(crate) base: L,
    pub(crate) rates: RateDirectory,
    pub(crate) allowances: Allowances,
}

impl InterestToken<InMemoryLedger> {
    /// Create an empty ledger offering `global_rate` to new depositors
    pub fn new(global_rate: Rate) -> Self {
        Self::with_base_ledger(InMemoryLedger::new(), global_rate)
    }
}

impl<L: BaseLedger> InterestToken<L> {
    pub fn with_base_ledger(base: L, global_rate: Rate) -> Self {
        Self {
            base,
            rates: RateDirectory::new(global_rate),
            allowances: Allowances::default(),
        }
    }

    pub fn base_ledger(&self) -> &L {
        &self.base
    }

    pub fn rate_directory(&self) -> &RateDirectory {
        &self.rates
    }

    // ============ Reads ============

    /// Live balance at `now`, including interest not yet settled
    pub fn balance_of(&self, holder: &HolderId, now: Timestamp) -> Result<Amount, LedgerError> {
        let principal = self.base.principal_of(holder);
        match self.rates.record(holder) {
            Some(record) => accrual::live_balance(
                holder,
                principal,
                record.locked_rate,
                record.last_settled_at,
                now,
            ),
            None => Ok(principal),
        }
    }

    /// Materialized principal, excluding unsettled interest
    pub fn principal_balance_of(&self, holder: &HolderId) -> Amount {
        self.base.principal_of(holder)
    }

    pub fn total_principal(&self) -> Amount {
        self.base.total_principal()
    }

    pub fn global_rate(&self) -> Rate {
        self.rates.global_rate()
    }

    pub fn user_interest_rate(&self, holder: &HolderId) -> Rate {
        self.rates.user_interest_rate(holder)
    }

    pub fn last_settled_at(&self, holder: &HolderId) -> Option<Timestamp> {
        self.rates.record(holder).map(|r| r.last_settled_at)
    }

    pub fn allowance(&self, owner: &HolderId, spender: &HolderId) -> Amount {
        self.allowances.allowance(owner, spender)
    }

    // ============ Rate directory ============

    /// Lower the global rate; only affects future depositors
    #[instrument(skip(self))]
    pub fn set_global_rate(&mut self, new_rate: Rate) -> Result<LedgerEvent, LedgerError> {
        let previous = self.rates.set_global_rate(new_rate).map_err(|e| {
            warn!(error = %e, "Global rate update rejected");
            e
        })?;

        info!(previous, current = new_rate, "Global interest rate updated");
        Ok(LedgerEvent::GlobalRateChanged {
            previous,
            current: new_rate,
        })
    }

    // ============ Settlement ============

    /// Settle a holder without moving any principal
    #[instrument(skip(self))]
    pub fn settle(
        &mut self,
        holder: &HolderId,
        now: Timestamp,
    ) -> Result<Vec<LedgerEvent>, LedgerError> {
        let plan = self.plan_settlement(holder, now)?;
        self.ensure_supply_headroom(&[plan.interest])?;

        let mut events = Vec::new();
        self.apply_settlement(&plan, &mut events)?;
        Ok(events)
    }

    // ============ Mint / burn ============

    /// Validate a mint without mutating anything
    ///
    /// [`mint`](Self::mint) with the same arguments succeeds whenever this does.
    pub fn preview_mint(
        &self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<(), LedgerError> {
        self.plan_mint(holder, amount, now).map(|_| ())
    }

    /// Credit a deposit, settling and (re)locking the holder's rate first
    #[instrument(skip(self))]
    pub fn mint(
        &mut self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        let plan = self.plan_mint(holder, amount, now)?;

        let mut events = Vec::new();
        self.apply_settlement(&plan, &mut events)?;

        if let Some(rate) = self
            .rates
            .lock_rate_for_holder(holder, plan.settled_principal(), now)
        {
            events.push(LedgerEvent::RateLocked {
                holder: holder.clone(),
                rate,
            });
        }

        self.base.credit_principal(holder, amount)?;
        events.push(LedgerEvent::Minted {
            holder: holder.clone(),
            amount,
        });

        debug!(amount, principal = self.base.principal_of(holder), "Minted");
        Ok(Receipt { amount, events })
    }

    /// Resolve and validate a burn without mutating anything
    ///
    /// Returns the amount [`burn`](Self::burn) would remove at the same `now`.
    pub fn preview_burn(
        &self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        let amount = self.resolve_amount(holder, amount, now)?;
        let plan = self.plan_settlement(holder, now)?;
        Self::ensure_covers(&plan, amount)?;
        self.ensure_supply_headroom(&[plan.interest])?;
        Ok(amount)
    }

    /// Remove credits; `SENTINEL_MAX` burns the entire live balance
    #[instrument(skip(self))]
    pub fn burn(
        &mut self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        let amount = self.resolve_amount(holder, amount, now)?;
        let plan = self.plan_settlement(holder, now)?;
        Self::ensure_covers(&plan, amount)?;
        self.ensure_supply_headroom(&[plan.interest])?;

        let mut events = Vec::new();
        self.apply_settlement(&plan, &mut events)?;

        self.base.debit_principal(holder, amount)?;
        events.push(LedgerEvent::Burned {
            holder: holder.clone(),
            amount,
        });

        debug!(amount, principal = self.base.principal_of(holder), "Burned");
        Ok(Receipt { amount, events })
    }

    // ============ Transfers ============

    /// Move credits between holders after settling both
    #[instrument(skip(self))]
    pub fn transfer(
        &mut self,
        sender: &HolderId,
        recipient: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        self.move_balance(None, sender, recipient, amount, now)
    }

    pub fn approve(&mut self, owner: &HolderId, spender: &HolderId, amount: Amount) -> LedgerEvent {
        self.allowances.approve(owner, spender, amount);
        LedgerEvent::Approved {
            owner: owner.clone(),
            spender: spender.clone(),
            amount,
        }
    }

    /// Transfer on behalf of `owner`, consuming `spender`'s allowance
    #[instrument(skip(self))]
    pub fn transfer_from(
        &mut self,
        spender: &HolderId,
        owner: &HolderId,
        recipient: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        self.move_balance(Some(spender), owner, recipient, amount, now)
    }

    fn move_balance(
        &mut self,
        spender: Option<&HolderId>,
        sender: &HolderId,
        recipient: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Receipt, LedgerError> {
        let amount = self.resolve_amount(sender, amount, now)?;

        let sender_plan = self.plan_settlement(sender, now)?;
        Self::ensure_covers(&sender_plan, amount)?;

        let recipient_plan = if sender == recipient {
            None
        } else {
            let plan = self.plan_settlement(recipient, now)?;
            plan.settled_principal()
                .checked_add(amount)
                .ok_or(LedgerError::ArithmeticOverflow)?;
            Some(plan)
        };

        let remaining_allowance = match spender {
            Some(spender) => Some(self.allowances.check_spend(sender, spender, amount)?),
            None => None,
        };

        let recipient_interest = recipient_plan.as_ref().map_or(0, |p| p.interest);
        self.ensure_supply_headroom(&[sender_plan.interest, recipient_interest])?;

        // Validated: from here on nothing can fail
        let mut events = Vec::new();
        self.apply_settlement(&sender_plan, &mut events)?;

        if let Some(plan) = &recipient_plan {
            self.apply_settlement(plan, &mut events)?;

            // A sender without a record has nothing to pass on
            let sender_rate = self.rates.record(sender).map(|r| r.locked_rate);
            if let Some(sender_rate) = sender_rate {
                if self.rates.inherit_rate_on_transfer_in(
                    recipient,
                    plan.settled_principal(),
                    sender_rate,
                    now,
                ) {
                    events.push(LedgerEvent::RateInherited {
                        holder: recipient.clone(),
                        from: sender.clone(),
                        rate: sender_rate,
                    });
                }
            }

            self.base.debit_principal(sender, amount)?;
            self.base.credit_principal(recipient, amount)?;
        }

        if let (Some(spender), Some(remaining)) = (spender, remaining_allowance) {
            self.allowances.approve(sender, spender, remaining);
        }

        events.push(LedgerEvent::Transferred {
            from: sender.clone(),
            to: recipient.clone(),
            amount,
        });

        debug!(amount, "Transferred");
        Ok(Receipt { amount, events })
    }

    // ============ Internals ============

    /// Resolve the full-balance sentinel against the live balance
    ///
    /// Zero is a valid outflow: the parties are still settled.
    fn resolve_amount(
        &self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, LedgerError> {
        if amount == SENTINEL_MAX {
            self.balance_of(holder, now)
        } else {
            Ok(amount)
        }
    }

    /// Every check a mint needs, returning the holder's settlement plan
    fn plan_mint(
        &self,
        holder: &HolderId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<SettlementPlan, LedgerError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount);
        }
        if amount == SENTINEL_MAX {
            return Err(LedgerError::InvalidAmount(
                "the full-balance sentinel cannot be minted".to_string(),
            ));
        }

        let plan = self.plan_settlement(holder, now)?;
        plan.settled_principal()
            .checked_add(amount)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        self.ensure_supply_headroom(&[plan.interest, amount])?;
        Ok(plan)
    }

    fn plan_settlement(
        &self,
        holder: &HolderId,
        now: Timestamp,
    ) -> Result<SettlementPlan, LedgerError> {
        settlement::plan(&self.base, &self.rates, holder, now)
    }

    fn apply_settlement(
        &mut self,
        plan: &SettlementPlan,
        events: &mut Vec<LedgerEvent>,
    ) -> Result<(), LedgerError> {
        if let Some(event) = settlement::apply(&mut self.base, &mut self.rates, plan)? {
            events.push(event);
        }
        Ok(())
    }

    fn ensure_covers(plan: &SettlementPlan, amount: Amount) -> Result<(), LedgerError> {
        let available = plan.settled_principal();
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                holder: plan.holder.clone(),
                required: amount,
                available,
            });
        }
        Ok(())
    }

    /// Total principal must absorb every credit the operation will make
    fn ensure_supply_headroom(&self, credits: &[Amount]) -> Result<(), LedgerError> {
        credits
            .iter()
            .try_fold(self.base.total_principal(), |total, credit| {
                total.checked_add(*credit)
            })
            .map(|_| ())
            .ok_or(LedgerError::ArithmeticOverflow)
    }
}
