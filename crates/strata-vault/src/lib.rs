//! # Strata Vault
//!
//! Custodial pool for the Strata ledger: takes base-asset deposits and mints
//! interest-bearing credits, burns credits and pays out base asset on
//! redemption, and publishes notifications for every operation.

pub mod custody;
pub mod notify;
pub mod vault;

pub use custody::{AssetCustody, InMemoryCustody};
pub use notify::{MemoryNotifier, Notification, Notifier, TracingNotifier, VaultEvent};
pub use vault::Vault;
