//! Base-asset custody
//!
//! The vault never moves the base asset itself; it asks an [`AssetCustody`]
//! implementation to pull deposits into the pool reserve and to pay
//! redemptions out of it. Payouts are the only point where an operation may
//! wait on the outside world.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use strata_common::{Amount, CustodyError, HolderId};
use tracing::debug;

/// Base-asset movement capability consumed by the vault
#[async_trait]
pub trait AssetCustody: Send + Sync {
    /// Pull `amount` of base asset from `from` into the pool reserve
    async fn receive(&self, from: &HolderId, amount: Amount) -> Result<(), CustodyError>;

    /// Pay `amount` of base asset from the pool reserve to `to`
    async fn release(&self, to: &HolderId, amount: Amount) -> Result<(), CustodyError>;

    /// Base asset currently held by the pool
    async fn reserve(&self) -> Amount;
}

/// In-process custody: external wallets plus a single pool reserve
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    wallets: DashMap<HolderId, Amount>,
    reserve: Mutex<Amount>,
}

impl InMemoryCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give a holder base asset outside the pool
    pub fn fund_wallet(&self, holder: &HolderId, amount: Amount) {
        let mut balance = self.wallets.entry(holder.clone()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Base asset a holder has outside the pool
    pub fn wallet_balance(&self, holder: &HolderId) -> Amount {
        self.wallets.get(holder).map(|b| *b).unwrap_or(0)
    }
}

#[async_trait]
impl AssetCustody for InMemoryCustody {
    async fn receive(&self, from: &HolderId, amount: Amount) -> Result<(), CustodyError> {
        let mut reserve = self.reserve.lock();
        let mut wallet = self.wallets.entry(from.clone()).or_insert(0);

        if *wallet < amount {
            return Err(CustodyError::InsufficientFunds {
                account: from.to_string(),
                required: amount,
                available: *wallet,
            });
        }
        let new_reserve = reserve.checked_add(amount).ok_or_else(|| {
            CustodyError::Unavailable("pool reserve overflow".to_string())
        })?;

        *wallet -= amount;
        *reserve = new_reserve;
        debug!(from = %from, amount, reserve = *reserve, "Base asset received");
        Ok(())
    }

    async fn release(&self, to: &HolderId, amount: Amount) -> Result<(), CustodyError> {
        let mut reserve = self.reserve.lock();
        if *reserve < amount {
            return Err(CustodyError::InsufficientFunds {
                account: "pool reserve".to_string(),
                required: amount,
                available: *reserve,
            });
        }

        let mut wallet = self.wallets.entry(to.clone()).or_insert(0);
        *wallet = wallet.saturating_add(amount);
        *reserve -= amount;
        debug!(to = %to, amount, reserve = *reserve, "Base asset released");
        Ok(())
    }

    async fn reserve(&self) -> Amount {
        *self.reserve.lock()
    }
}
