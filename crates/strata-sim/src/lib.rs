//! # Strata Simulator
//!
//! Replays JSON scenarios against a vault on a manual clock and reports every
//! step's outcome together with the final ledger snapshot.

pub mod config;
pub mod scenario;

pub use config::SimConfig;
pub use scenario::{Outcome, Scenario, SimReport, Simulation, Step, StepReport, Units};
