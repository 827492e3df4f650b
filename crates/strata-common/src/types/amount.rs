//! Fixed-point quantities and logical time
//!
//! Amounts and rates are unsigned integers carrying [`DECIMALS`] implied decimals,
//! so `UNIT` (1e18) is one whole token and a rate of `UNIT` is 100% per second.
//! Human-facing values (configuration, scenarios, logs) go through
//! [`rust_decimal::Decimal`] and are converted exactly, never through floats.

use rust_decimal::Decimal;

use crate::error::LedgerError;
use crate::{DECIMALS, UNIT};

/// Ledger credits in base units (1e18 = one token)
pub type Amount = u128;

/// Per-second growth per unit of principal, scaled by 1e18
pub type Rate = u128;

/// Logical time in seconds
pub type Timestamp = u64;

/// Convert a human decimal (e.g. `"100.5"`) into base units
///
/// Fails for negative values, for more than 18 fractional digits and when the
/// result does not fit in an [`Amount`].
pub fn from_decimal(value: Decimal) -> Result<Amount, LedgerError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(LedgerError::InvalidAmount(format!("negative value {}", value)));
    }

    let mantissa = value.mantissa().unsigned_abs();
    let scale = value.scale();

    if scale <= DECIMALS {
        let factor = 10u128.pow(DECIMALS - scale);
        mantissa
            .checked_mul(factor)
            .ok_or(LedgerError::ArithmeticOverflow)
    } else {
        let divisor = 10u128.pow(scale - DECIMALS);
        if mantissa % divisor != 0 {
            return Err(LedgerError::InvalidAmount(format!(
                "{} has more than {} decimals",
                value, DECIMALS
            )));
        }
        Ok(mantissa / divisor)
    }
}

/// Render base units as an exact decimal string for logs and reports
pub fn format_units(amount: Amount) -> String {
    let whole = amount / UNIT;
    let frac = amount % UNIT;
    if frac == 0 {
        return whole.to_string();
    }

    let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}
