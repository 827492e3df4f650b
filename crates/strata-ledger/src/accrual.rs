//! Accrual engine - live balance as a pure function of time
//!
//! Interest is linear within a settlement window:
//!
//! ```text
//! multiplier = UNIT + locked_rate * (now - last_settled_at)
//! live       = principal * multiplier / UNIT
//! ```
//!
//! `principal * multiplier` routinely exceeds 128 bits, so the product is taken
//! in 256-bit precision and only the final quotient is narrowed back.

use primitive_types::U256;
use strata_common::{Amount, HolderId, LedgerError, Rate, Timestamp, UNIT};

/// Seconds elapsed since the holder's last settlement
pub fn elapsed(
    holder: &HolderId,
    last_settled_at: Timestamp,
    now: Timestamp,
) -> Result<u64, LedgerError> {
    now.checked_sub(last_settled_at)
        .ok_or_else(|| LedgerError::ClockRegression {
            holder: holder.clone(),
            last_settled_at,
            now,
        })
}

/// Accumulated growth factor over `elapsed` seconds, scaled by `UNIT`
pub fn interest_multiplier(rate: Rate, elapsed: u64) -> Result<u128, LedgerError> {
    rate.checked_mul(u128::from(elapsed))
        .and_then(|growth| UNIT.checked_add(growth))
        .ok_or(LedgerError::ArithmeticOverflow)
}

/// Apply a multiplier to a principal, truncating toward zero
pub fn apply_multiplier(principal: Amount, multiplier: u128) -> Result<Amount, LedgerError> {
    let product = U256::from(principal)
        .checked_mul(U256::from(multiplier))
        .ok_or(LedgerError::ArithmeticOverflow)?;
    let scaled = product / U256::from(UNIT);

    if scaled > U256::from(u128::MAX) {
        return Err(LedgerError::ArithmeticOverflow);
    }
    Ok(scaled.low_u128())
}

/// Live balance of a holder at `now`, including unsettled interest
///
/// Read-only and callable at any time; returns `ClockRegression` when `now`
/// precedes the last settlement.
pub fn live_balance(
    holder: &HolderId,
    principal: Amount,
    locked_rate: Rate,
    last_settled_at: Timestamp,
    now: Timestamp,
) -> Result<Amount, LedgerError> {
    let elapsed = elapsed(holder, last_settled_at, now)?;
    if principal == 0 || elapsed == 0 || locked_rate == 0 {
        return Ok(principal);
    }

    let multiplier = interest_multiplier(locked_rate, elapsed)?;
    apply_multiplier(principal, multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: Rate = 50_000_000_000; // 5e10

    fn alice() -> HolderId {
        HolderId::new("alice")
    }

    #[test]
    fn test_multiplier_is_linear() {
        assert_eq!(interest_multiplier(RATE, 0).unwrap(), UNIT);
        assert_eq!(interest_multiplier(RATE, 2).unwrap(), UNIT + 100_000_000_000);
        assert_eq!(
            interest_multiplier(RATE, 1_000).unwrap() - UNIT,
            (interest_multiplier(RATE, 500).unwrap() - UNIT) * 2
        );
    }

    #[test]
    fn test_live_balance_reference_scenario() {
        let principal = 100 * UNIT;
        let live = live_balance(&alice(), principal, RATE, 0, 2).unwrap();
        assert_eq!(live, 100_000_010_000_000_000_000);
    }

    #[test]
    fn test_live_balance_without_elapsed_time() {
        let live = live_balance(&alice(), 42 * UNIT, RATE, 7, 7).unwrap();
        assert_eq!(live, 42 * UNIT);
    }

    #[test]
    fn test_live_balance_truncates() {
        // 3 * (1e18 + 5e10) / 1e18 = 3.00000015 -> 3
        assert_eq!(live_balance(&alice(), 3, RATE, 0, 1).unwrap(), 3);
    }

    #[test]
    fn test_wide_intermediate_product() {
        // principal * multiplier overflows u128 but the quotient does not
        let principal = u128::MAX / 4;
        let live = live_balance(&alice(), principal, UNIT, 0, 1).unwrap();
        assert_eq!(live, principal * 2);
    }

    #[test]
    fn test_result_overflow_is_reported() {
        let result = live_balance(&alice(), u128::MAX / 2 + 1, UNIT, 0, 1);
        assert_eq!(result, Err(LedgerError::ArithmeticOverflow));
    }

    #[test]
    fn test_clock_regression() {
        let result = live_balance(&alice(), UNIT, RATE, 10, 9);
        assert!(matches!(
            result,
            Err(LedgerError::ClockRegression {
                last_settled_at: 10,
                now: 9,
                ..
            })
        ));
    }
}
