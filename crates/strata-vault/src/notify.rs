//! Notifications for observability and indexing
//!
//! The ledger returns events; the vault wraps them in [`Notification`]s and
//! hands them to a [`Notifier`]. Delivery is fire-and-forget and never affects
//! the outcome of the operation that produced them.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use strata_common::{Amount, HolderId, Rate, Timestamp};
use strata_ledger::LedgerEvent;
use tracing::info;
use uuid::Uuid;

/// Event as seen by downstream consumers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum VaultEvent {
    /// Raw ledger event produced inside a vault operation
    Ledger(LedgerEvent),
    /// Base asset deposited and credits minted
    Deposited {
        depositor: HolderId,
        amount: Amount,
        rate: Rate,
    },
    /// Credits burned and base asset paid out
    Redeemed { holder: HolderId, amount: Amount },
    /// Reserve topped up to back accrued interest
    RewardsFunded { from: HolderId, amount: Amount },
}

impl VaultEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            VaultEvent::Ledger(event) => event.kind(),
            VaultEvent::Deposited { .. } => "Deposited",
            VaultEvent::Redeemed { .. } => "Redeemed",
            VaultEvent::RewardsFunded { .. } => "RewardsFunded",
        }
    }
}

/// Envelope delivered to notifiers
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub emitted_at: DateTime<Utc>,
    /// Ledger time of the operation
    pub logical_time: Timestamp,
    pub event: VaultEvent,
}

impl Notification {
    pub fn new(logical_time: Timestamp, event: VaultEvent) -> Self {
        Self {
            id: Uuid::now_v7(),
            emitted_at: Utc::now(),
            logical_time,
            event,
        }
    }
}

/// Consumer of vault notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Logs every notification as structured JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) {
        let payload = serde_json::to_string(&notification.event).unwrap_or_default();
        info!(
            id = %notification.id,
            kind = notification.event.kind(),
            logical_time = notification.logical_time,
            payload = %payload,
            "Notification"
        );
    }
}

/// Keeps notifications in memory
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    log: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.log.lock().clone()
    }

    pub fn events(&self) -> Vec<VaultEvent> {
        self.log.lock().iter().map(|n| n.event.clone()).collect()
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.log.lock())
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) {
        self.log.lock().push(notification.clone());
    }
}
