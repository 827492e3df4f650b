//! Simulator configuration

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strata_common::{
    from_decimal, Amount, Rate, Result, StrataError, Timestamp, DEFAULT_GLOBAL_RATE,
};

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Initial global rate in base units (1e18 = 100% per second)
    pub global_rate: Rate,
    /// Logical time the clock starts at
    pub start_time: Timestamp,
    /// Scenario file to replay
    pub scenario_path: Option<PathBuf>,
    /// Base asset seeded into the pool reserve before the scenario runs
    pub reward_reserve: Amount,
    /// Log every notification through tracing
    pub log_notifications: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            global_rate: DEFAULT_GLOBAL_RATE,
            start_time: 0,
            scenario_path: None,
            reward_reserve: 0,
            log_notifications: true,
        }
    }
}

impl SimConfig {
    /// Load configuration from `.env` and `STRATA_*` environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut cfg = Self::default();

        // Rates and amounts are human decimals: "0.00000005", "1000.5"
        if let Some(val) = lookup("STRATA_GLOBAL_RATE") {
            cfg.global_rate = parse_setting("STRATA_GLOBAL_RATE", &val)?;
        }
        if let Some(val) = lookup("STRATA_REWARD_RESERVE") {
            cfg.reward_reserve = parse_setting("STRATA_REWARD_RESERVE", &val)?;
        }
        if let Some(val) = lookup("STRATA_START_TIME") {
            cfg.start_time = val.trim().parse().map_err(|_| {
                StrataError::Config(format!("STRATA_START_TIME: invalid timestamp {:?}", val))
            })?;
        }
        if let Some(val) = lookup("STRATA_SCENARIO") {
            cfg.scenario_path = Some(PathBuf::from(val));
        }
        if let Some(val) = lookup("STRATA_LOG_NOTIFICATIONS") {
            cfg.log_notifications = matches!(val.trim(), "1" | "true" | "yes");
        }

        Ok(cfg)
    }
}

/// Parse a human decimal into 18-decimal base units
pub fn parse_units(value: &str) -> Result<Amount> {
    let decimal: Decimal = value
        .trim()
        .parse()
        .map_err(|_| StrataError::Config(format!("invalid decimal {:?}", value)))?;
    Ok(from_decimal(decimal)?)
}

fn parse_setting(key: &str, value: &str) -> Result<Amount> {
    parse_units(value).map_err(|err| StrataError::Config(format!("{}: {}", key, err)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use strata_common::UNIT;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = SimConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.global_rate, DEFAULT_GLOBAL_RATE);
        assert_eq!(cfg.start_time, 0);
        assert!(cfg.scenario_path.is_none());
        assert!(cfg.log_notifications);
    }

    #[test]
    fn test_overrides() {
        let cfg = SimConfig::from_lookup(lookup(&[
            ("STRATA_GLOBAL_RATE", "0.00000004"),
            ("STRATA_REWARD_RESERVE", "250.5"),
            ("STRATA_START_TIME", "1700000000"),
            ("STRATA_SCENARIO", "scenarios/reference.json"),
            ("STRATA_LOG_NOTIFICATIONS", "false"),
        ]))
        .unwrap();

        assert_eq!(cfg.global_rate, 40_000_000_000);
        assert_eq!(cfg.reward_reserve, 250 * UNIT + UNIT / 2);
        assert_eq!(cfg.start_time, 1_700_000_000);
        assert_eq!(
            cfg.scenario_path,
            Some(PathBuf::from("scenarios/reference.json"))
        );
        assert!(!cfg.log_notifications);
    }

    #[test]
    fn test_invalid_rate_is_an_error() {
        let err = SimConfig::from_lookup(lookup(&[("STRATA_GLOBAL_RATE", "fast")])).unwrap_err();
        assert!(matches!(err, StrataError::Config(_)));
        assert!(err.to_string().contains("STRATA_GLOBAL_RATE"));
    }

    #[test]
    fn test_negative_reserve_is_an_error() {
        let err =
            SimConfig::from_lookup(lookup(&[("STRATA_REWARD_RESERVE", "-5")])).unwrap_err();
        assert!(err.to_string().contains("STRATA_REWARD_RESERVE"));
    }
}
