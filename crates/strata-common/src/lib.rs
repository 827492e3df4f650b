//! # Strata Common
//!
//! Shared types, clocks and errors for the Strata interest-bearing ledger.
//!
//! ## Core Types
//!
//! - [`HolderId`]: identity of anyone who has ever held a balance
//! - [`Amount`]/[`Rate`]/[`Timestamp`]: 18-decimal fixed-point quantities and logical time
//! - [`Clock`]: source of logical time ([`SystemClock`], [`ManualClock`])
//!
//! ## Errors
//!
//! - [`LedgerError`]: accrual, settlement and balance-mutation failures
//! - [`VaultError`]/[`CustodyError`]: deposit and redemption orchestration failures
//! - [`StrataError`]: unified error wrapping all of the above

pub mod clock;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CustodyError, LedgerError, Result, StrataError, VaultError};
pub use types::{
    amount::{format_units, from_decimal, Amount, Rate, Timestamp},
    holder::HolderId,
};

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Number of decimals carried by amounts and rates
pub const DECIMALS: u32 = 18;

/// Fixed-point 1.0 (1e18)
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Reserved amount meaning "the holder's entire live balance"
pub const SENTINEL_MAX: Amount = u128::MAX;

/// Global rate a fresh ledger starts with (5e10 per second, scaled by 1e18)
pub const DEFAULT_GLOBAL_RATE: Rate = 50_000_000_000;
