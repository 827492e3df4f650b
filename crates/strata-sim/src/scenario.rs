//! Scenario replay
//!
//! A scenario is a JSON list of steps run in order against a fresh vault on a
//! manual clock. Rejected steps are recorded and the run continues, so a
//! scenario can exercise the failure paths as well as the happy ones.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_common::{
    format_units, Amount, Clock, HolderId, ManualClock, Result, StrataError, Timestamp,
    VaultError, SENTINEL_MAX,
};
use strata_ledger::{InterestToken, LedgerSnapshot};
use strata_vault::{
    AssetCustody, InMemoryCustody, MemoryNotifier, Notifier, TracingNotifier, Vault,
};
use tracing::{info, warn};

use crate::config::{parse_units, SimConfig};

const REFERENCE_SCENARIO: &str = include_str!("../scenarios/reference.json");

/// Holder that seeds the reward reserve from configuration
const TREASURY: &str = "treasury";

/// Amount written as a human decimal, or `"max"` for the whole balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Units(pub Amount);

impl TryFrom<String> for Units {
    type Error = StrataError;

    fn try_from(value: String) -> Result<Self> {
        if value.trim().eq_ignore_ascii_case("max") {
            return Ok(Self(SENTINEL_MAX));
        }
        parse_units(&value).map(Self)
    }
}

/// One scenario step
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Credit base asset to an external wallet
    Fund { holder: HolderId, amount: Units },
    Deposit { holder: HolderId, amount: Units },
    Redeem { holder: HolderId, amount: Units },
    Transfer {
        from: HolderId,
        to: HolderId,
        amount: Units,
    },
    Approve {
        owner: HolderId,
        spender: HolderId,
        amount: Units,
    },
    TransferFrom {
        spender: HolderId,
        owner: HolderId,
        to: HolderId,
        amount: Units,
    },
    Settle { holder: HolderId },
    FundRewards { from: HolderId, amount: Units },
    SetRate { rate: Units },
    Advance { seconds: u64 },
    /// Record a holder's live balance
    Balance { holder: HolderId },
}

impl Step {
    pub fn op(&self) -> &'static str {
        match self {
            Step::Fund { .. } => "fund",
            Step::Deposit { .. } => "deposit",
            Step::Redeem { .. } => "redeem",
            Step::Transfer { .. } => "transfer",
            Step::Approve { .. } => "approve",
            Step::TransferFrom { .. } => "transfer_from",
            Step::Settle { .. } => "settle",
            Step::FundRewards { .. } => "fund_rewards",
            Step::SetRate { .. } => "set_rate",
            Step::Advance { .. } => "advance",
            Step::Balance { .. } => "balance",
        }
    }
}

/// A named list of steps
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|err| {
            StrataError::Storage(format!("failed to read scenario {}: {}", path.display(), err))
        })?;
        Self::from_json(&json)
    }

    /// Scenario bundled with the binary
    pub fn reference() -> Result<Self> {
        Self::from_json(REFERENCE_SCENARIO)
    }
}

/// What happened to a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        amount: Option<String>,
        events: Vec<String>,
    },
    Rejected { error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub at: Timestamp,
    pub outcome: Outcome,
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub scenario: String,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub rejected: usize,
    pub reserve: String,
    pub steps: Vec<StepReport>,
    pub snapshot: LedgerSnapshot,
}

/// A vault on a manual clock with in-memory custody
pub struct Simulation {
    vault: Vault<InMemoryCustody>,
    clock: Arc<ManualClock>,
    notifier: Arc<MemoryNotifier>,
    log_notifications: bool,
}

impl Simulation {
    pub fn new(config: &SimConfig) -> Self {
        let clock = Arc::new(ManualClock::new(config.start_time));
        let notifier = Arc::new(MemoryNotifier::new());
        let vault = Vault::new(
            InterestToken::new(config.global_rate),
            InMemoryCustody::new(),
            clock.clone(),
            notifier.clone(),
        );

        Self {
            vault,
            clock,
            notifier,
            log_notifications: config.log_notifications,
        }
    }

    pub fn vault(&self) -> &Vault<InMemoryCustody> {
        &self.vault
    }

    /// Put base asset in the reserve so interest can be paid out
    pub async fn seed_reserve(&self, amount: Amount) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }

        let treasury = HolderId::new(TREASURY);
        self.vault.custody().fund_wallet(&treasury, amount);
        self.vault.fund_rewards(&treasury, amount).await?;
        self.flush();
        Ok(())
    }

    pub async fn run(&self, scenario: &Scenario) -> SimReport {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");
        let started_at = self.clock.now();
        let mut steps = Vec::with_capacity(scenario.steps.len());

        for (index, step) in scenario.steps.iter().enumerate() {
            let at = self.clock.now();
            let outcome = match self.apply(step).await {
                Ok(amount) => Outcome::Ok {
                    amount: amount.map(format_units),
                    events: self.flush(),
                },
                Err(err) => {
                    warn!(index, op = step.op(), error = %err, "Step rejected");
                    self.flush();
                    Outcome::Rejected {
                        error: err.to_string(),
                    }
                }
            };
            steps.push(StepReport {
                index,
                op: step.op(),
                at,
                outcome,
            });
        }

        let rejected = steps
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Rejected { .. }))
            .count();
        info!(rejected, "Scenario finished");

        SimReport {
            scenario: scenario.name.clone(),
            started_at,
            finished_at: self.clock.now(),
            rejected,
            reserve: format_units(self.vault.custody().reserve().await),
            steps,
            snapshot: self.vault.snapshot().await,
        }
    }

    async fn apply(&self, step: &Step) -> std::result::Result<Option<Amount>, VaultError> {
        let vault = &self.vault;
        match step {
            Step::Fund { holder, amount } => {
                vault.custody().fund_wallet(holder, amount.0);
                Ok(None)
            }
            Step::Deposit { holder, amount } => {
                vault.deposit(holder, amount.0).await.map(|r| Some(r.amount))
            }
            Step::Redeem { holder, amount } => {
                vault.redeem(holder, amount.0).await.map(|r| Some(r.amount))
            }
            Step::Transfer { from, to, amount } => vault
                .transfer(from, to, amount.0)
                .await
                .map(|r| Some(r.amount)),
            Step::Approve {
                owner,
                spender,
                amount,
            } => {
                vault.approve(owner, spender, amount.0).await;
                Ok(None)
            }
            Step::TransferFrom {
                spender,
                owner,
                to,
                amount,
            } => vault
                .transfer_from(spender, owner, to, amount.0)
                .await
                .map(|r| Some(r.amount)),
            Step::Settle { holder } => {
                vault.settle(holder).await?;
                Ok(Some(vault.principal_balance_of(holder).await))
            }
            Step::FundRewards { from, amount } => {
                vault.fund_rewards(from, amount.0).await.map(|_| None)
            }
            Step::SetRate { rate } => vault.set_interest_rate(rate.0).await.map(|_| None),
            Step::Advance { seconds } => {
                self.clock.advance(*seconds);
                Ok(None)
            }
            Step::Balance { holder } => vault.balance_of(holder).await.map(Some),
        }
    }

    /// Drain buffered notifications, logging them if enabled, and return their kinds
    fn flush(&self) -> Vec<String> {
        self.notifier
            .drain()
            .into_iter()
            .map(|notification| {
                if self.log_notifications {
                    TracingNotifier.notify(&notification);
                }
                notification.event.kind().to_string()
            })
            .collect()
    }
}
