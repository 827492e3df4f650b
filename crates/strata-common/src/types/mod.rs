//! Core data types for the Strata ledger

pub mod amount;
pub mod holder;
