//! Error types for the Strata ledger
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::types::amount::{Amount, Rate, Timestamp};
use crate::types::holder::HolderId;

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Unified error type for Strata operations
#[derive(Debug, Error)]
pub enum StrataError {
    // Ledger errors
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    // Vault errors
    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

/// Accrual, settlement and balance-mutation errors
///
/// Every operation that returns one of these leaves ledger state untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Amount must be positive")]
    ZeroAmount,

    #[error("Insufficient balance for {holder}: required {required}, available {available}")]
    InsufficientBalance {
        holder: HolderId,
        required: Amount,
        available: Amount,
    },

    #[error("Insufficient allowance for {spender}: required {required}, allowed {allowed}")]
    InsufficientAllowance {
        spender: HolderId,
        required: Amount,
        allowed: Amount,
    },

    #[error("Interest rate can only decrease: current {current}, proposed {proposed}")]
    RateCanOnlyDecrease { current: Rate, proposed: Rate },

    #[error("Clock moved backwards for {holder}: last settled at {last_settled_at}, now {now}")]
    ClockRegression {
        holder: HolderId,
        last_settled_at: Timestamp,
        now: Timestamp,
    },

    #[error("Fixed-point arithmetic overflow")]
    ArithmeticOverflow,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Base-asset custody errors reported by the custody collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Insufficient funds in {account}: required {required}, available {available}")]
    InsufficientFunds {
        account: String,
        required: Amount,
        available: Amount,
    },

    #[error("Custody unavailable: {0}")]
    Unavailable(String),
}

/// Deposit and redemption orchestration errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Deposit from {depositor} rejected by custody: {source}")]
    CustodyRejected {
        depositor: HolderId,
        #[source]
        source: CustodyError,
    },

    #[error("Payout of {amount} to {holder} failed: {source}")]
    PayoutFailed {
        holder: HolderId,
        amount: Amount,
        #[source]
        source: CustodyError,
    },
}

// Implement From for common external error types
impl From<serde_json::Error> for StrataError {
    fn from(err: serde_json::Error) -> Self {
        StrataError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StrataError {
    fn from(err: std::io::Error) -> Self {
        StrataError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StrataError::Ledger(LedgerError::InsufficientBalance {
            holder: HolderId::new("alice"),
            required: 10,
            available: 7,
        });
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("required 10, available 7"));
    }

    #[test]
    fn test_external_errors_convert() {
        let json = serde_json::from_str::<u32>("nope").unwrap_err();
        assert!(matches!(StrataError::from(json), StrataError::Serialization(_)));

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.json");
        let err = StrataError::from(io);
        assert!(matches!(err, StrataError::Storage(_)));
        assert!(err.to_string().contains("missing.json"));

        let vault = StrataError::from(VaultError::from(LedgerError::ZeroAmount));
        assert!(matches!(vault, StrataError::Vault(VaultError::Ledger(_))));
    }

    #[test]
    fn test_rate_error() {
        let err = LedgerError::RateCanOnlyDecrease {
            current: 5,
            proposed: 5,
        };
        assert!(err.to_string().contains("current 5, proposed 5"));
    }

    #[test]
    fn test_vault_error_wraps_ledger() {
        let err: VaultError = LedgerError::ZeroAmount.into();
        assert_eq!(err, VaultError::Ledger(LedgerError::ZeroAmount));
        assert_eq!(err.to_string(), "Amount must be positive");
    }
}
