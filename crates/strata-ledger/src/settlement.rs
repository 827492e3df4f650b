//! Settlement protocol
//!
//! Settling a holder turns accrued-but-unmaterialized interest into principal and
//! restarts the holder's accrual window at `now`. Settlement is split into a pure
//! [`plan`] and an [`apply`] step so callers can validate a whole operation
//! before touching any state.

use strata_common::{Amount, HolderId, LedgerError, Rate, Timestamp};
use tracing::debug;

use crate::accrual;
use crate::base::BaseLedger;
use crate::events::LedgerEvent;
use crate::rates::RateDirectory;

/// What settling one holder at one instant would do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementPlan {
    pub holder: HolderId,
    /// Principal before settlement
    pub principal: Amount,
    /// Interest to materialize
    pub interest: Amount,
    pub locked_rate: Rate,
    pub settled_at: Timestamp,
    /// Whether the holder has an accrual record at all
    pub known: bool,
}

impl SettlementPlan {
    /// Principal once the plan is applied
    pub fn settled_principal(&self) -> Amount {
        self.principal + self.interest
    }
}

/// Compute the settlement of `holder` at `now` without mutating anything
pub fn plan<L: BaseLedger>(
    base: &L,
    rates: &RateDirectory,
    holder: &HolderId,
    now: Timestamp,
) -> Result<SettlementPlan, LedgerError> {
    let principal = base.principal_of(holder);

    let Some(record) = rates.record(holder) else {
        return Ok(SettlementPlan {
            holder: holder.clone(),
            principal,
            interest: 0,
            locked_rate: 0,
            settled_at: now,
            known: false,
        });
    };

    let live = accrual::live_balance(
        holder,
        principal,
        record.locked_rate,
        record.last_settled_at,
        now,
    )?;

    Ok(SettlementPlan {
        holder: holder.clone(),
        principal,
        interest: live - principal,
        locked_rate: record.locked_rate,
        settled_at: now,
        known: true,
    })
}

/// Apply a previously computed plan
///
/// Credits the interest (if any) and advances `last_settled_at` even when
/// nothing accrued. Returns the `InterestSettled` event when interest moved.
pub fn apply<L: BaseLedger>(
    base: &mut L,
    rates: &mut RateDirectory,
    plan: &SettlementPlan,
) -> Result<Option<LedgerEvent>, LedgerError> {
    if !plan.known {
        return Ok(None);
    }

    if plan.interest > 0 {
        base.credit_principal(&plan.holder, plan.interest)?;
    }
    rates.mark_settled(&plan.holder, plan.settled_at);

    debug!(
        holder = %plan.holder,
        interest = plan.interest,
        principal = plan.settled_principal(),
        settled_at = plan.settled_at,
        "Holder settled"
    );

    Ok((plan.interest > 0).then(|| LedgerEvent::InterestSettled {
        holder: plan.holder.clone(),
        interest: plan.interest,
        principal: plan.settled_principal(),
        settled_at: plan.settled_at,
    }))
}

/// Plan and apply in one step
pub fn settle<L: BaseLedger>(
    base: &mut L,
    rates: &mut RateDirectory,
    holder: &HolderId,
    now: Timestamp,
) -> Result<Option<LedgerEvent>, LedgerError> {
    let plan = plan(base, rates, holder, now)?;
    base.total_principal()
        .checked_add(plan.interest)
        .ok_or(LedgerError::ArithmeticOverflow)?;
    apply(base, rates, &plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::InMemoryLedger;
    use strata_common::UNIT;

    const RATE: Rate = 50_000_000_000;

    fn setup() -> (InMemoryLedger, RateDirectory, HolderId) {
        let alice = HolderId::new("alice");
        let mut base = InMemoryLedger::new();
        let mut rates = RateDirectory::new(RATE);
        rates.lock_rate_for_holder(&alice, 0, 0);
        base.credit_principal(&alice, 100 * UNIT).unwrap();
        (base, rates, alice)
    }

    #[test]
    fn test_settle_materializes_interest() {
        let (mut base, mut rates, alice) = setup();

        let event = settle(&mut base, &mut rates, &alice, 2).unwrap();
        assert_eq!(
            event,
            Some(LedgerEvent::InterestSettled {
                holder: alice.clone(),
                interest: 10_000_000_000_000,
                principal: 100_000_010_000_000_000_000,
                settled_at: 2,
            })
        );
        assert_eq!(base.principal_of(&alice), 100_000_010_000_000_000_000);
        assert_eq!(rates.record(&alice).unwrap().last_settled_at, 2);
    }

    #[test]
    fn test_settle_is_idempotent_at_same_instant() {
        let (mut base, mut rates, alice) = setup();

        settle(&mut base, &mut rates, &alice, 50).unwrap();
        let principal = base.principal_of(&alice);

        let again = settle(&mut base, &mut rates, &alice, 50).unwrap();
        assert_eq!(again, None);
        assert_eq!(base.principal_of(&alice), principal);
    }

    #[test]
    fn test_settle_advances_clock_without_interest() {
        let alice = HolderId::new("alice");
        let mut base = InMemoryLedger::new();
        let mut rates = RateDirectory::new(RATE);
        rates.lock_rate_for_holder(&alice, 0, 0);

        assert_eq!(settle(&mut base, &mut rates, &alice, 9).unwrap(), None);
        assert_eq!(rates.record(&alice).unwrap().last_settled_at, 9);
    }

    #[test]
    fn test_settle_unknown_holder_is_noop() {
        let mut base = InMemoryLedger::new();
        let mut rates = RateDirectory::new(RATE);
        let ghost = HolderId::new("ghost");

        assert_eq!(settle(&mut base, &mut rates, &ghost, 100).unwrap(), None);
        assert!(rates.record(&ghost).is_none());
    }

    #[test]
    fn test_clock_regression_leaves_state() {
        let (mut base, mut rates, alice) = setup();
        settle(&mut base, &mut rates, &alice, 10).unwrap();
        let principal = base.principal_of(&alice);

        let result = settle(&mut base, &mut rates, &alice, 5);
        assert!(matches!(result, Err(LedgerError::ClockRegression { .. })));
        assert_eq!(base.principal_of(&alice), principal);
        assert_eq!(rates.record(&alice).unwrap().last_settled_at, 10);
    }
}
