//! # Strata Ledger
//!
//! Interest-bearing balance ledger. Balances grow linearly at a per-holder rate
//! locked at deposit time; growth is computed on read and materialized
//! ("settled") before every principal-changing operation.
//!
//! ## Components
//!
//! - [`accrual`]: pure live-balance arithmetic in 256-bit intermediate precision
//! - [`settlement`]: plan/apply settlement of one holder
//! - [`rates`]: strictly decreasing global rate and per-holder locked rates
//! - [`base`]: interest-unaware principal storage ([`BaseLedger`])
//! - [`token`]: [`InterestToken`], mint/burn/transfer orchestration
//! - [`snapshot`]: persisted state layout

pub mod accrual;
pub mod allowances;
pub mod base;
pub mod events;
pub mod rates;
pub mod settlement;
pub mod snapshot;
pub mod token;

pub use base::{BaseLedger, InMemoryLedger};
pub use events::{LedgerEvent, Receipt};
pub use rates::{AccrualRecord, RateDirectory};
pub use settlement::SettlementPlan;
pub use snapshot::{HolderSnapshot, LedgerSnapshot};
pub use token::InterestToken;
