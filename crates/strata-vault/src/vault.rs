//! Vault - deposit and redemption orchestration
//!
//! The vault owns the ledger behind an async mutex so every operation is
//! serialized, reads the logical clock once per operation and pairs ledger
//! mutations with base-asset movements:
//!
//! - deposit: validate the mint, pull the asset, then mint; a rejected mint
//!   never reaches custody
//! - redeem: validate the burn, pay out, then burn; a failed payout burns nothing

use std::sync::Arc;

use strata_common::{Amount, Clock, HolderId, LedgerError, Rate, Timestamp, VaultError};
use strata_ledger::{InterestToken, LedgerEvent, LedgerSnapshot, Receipt};
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::custody::AssetCustody;
use crate::notify::{Notification, Notifier, VaultEvent};

/// Custodial pool in front of an [`InterestToken`]
pub struct Vault<C: AssetCustody> {
    token: Mutex<InterestToken>,
    custody: C,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl<C: AssetCustody> Vault<C> {
    pub fn new(
        token: InterestToken,
        custody: C,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            token: Mutex::new(token),
            custody,
            clock,
            notifier,
        }
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    /// Deposit base asset and receive credits at the current global rate
    #[instrument(skip(self))]
    pub async fn deposit(
        &self,
        depositor: &HolderId,
        amount: Amount,
    ) -> Result<Receipt, VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();

        token.preview_mint(depositor, amount, now).map_err(|err| {
            warn!(error = %err, "Deposit rejected by ledger");
            err
        })?;

        self.custody
            .receive(depositor, amount)
            .await
            .map_err(|source| {
                warn!(error = %source, "Deposit rejected by custody");
                VaultError::CustodyRejected {
                    depositor: depositor.clone(),
                    source,
                }
            })?;

        // Same state and same `now` as the preview, so this cannot be rejected
        let receipt = token.mint(depositor, amount, now)?;

        let rate = token.user_interest_rate(depositor);
        drop(token);

        info!(amount, rate, "Deposit accepted");
        self.publish(now, &receipt.events);
        self.publish_one(
            now,
            VaultEvent::Deposited {
                depositor: depositor.clone(),
                amount,
                rate,
            },
        );
        Ok(receipt)
    }

    /// Redeem credits for base asset; `SENTINEL_MAX` redeems everything
    #[instrument(skip(self))]
    pub async fn redeem(&self, holder: &HolderId, amount: Amount) -> Result<Receipt, VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();

        let amount = token.preview_burn(holder, amount, now)?;

        // A zero redemption only settles
        if amount > 0 {
            if let Err(source) = self.custody.release(holder, amount).await {
                error!(error = %source, amount, "Payout failed, nothing burned");
                return Err(VaultError::PayoutFailed {
                    holder: holder.clone(),
                    amount,
                    source,
                });
            }
        }

        // Same state and same `now` as the preview, so this cannot be rejected
        let receipt = token.burn(holder, amount, now)?;
        drop(token);

        info!(amount, "Redemption paid out");
        self.publish(now, &receipt.events);
        self.publish_one(
            now,
            VaultEvent::Redeemed {
                holder: holder.clone(),
                amount,
            },
        );
        Ok(receipt)
    }

    /// Transfer credits between holders at the current logical time
    #[instrument(skip(self))]
    pub async fn transfer(
        &self,
        sender: &HolderId,
        recipient: &HolderId,
        amount: Amount,
    ) -> Result<Receipt, VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();
        let receipt = token.transfer(sender, recipient, amount, now)?;
        drop(token);

        self.publish(now, &receipt.events);
        Ok(receipt)
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, owner: &HolderId, spender: &HolderId, amount: Amount) {
        let mut token = self.token.lock().await;
        let now = self.clock.now();
        let event = token.approve(owner, spender, amount);
        drop(token);

        self.publish(now, std::slice::from_ref(&event));
    }

    /// Transfer on behalf of `owner` against `spender`'s allowance
    #[instrument(skip(self))]
    pub async fn transfer_from(
        &self,
        spender: &HolderId,
        owner: &HolderId,
        recipient: &HolderId,
        amount: Amount,
    ) -> Result<Receipt, VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();
        let receipt = token.transfer_from(spender, owner, recipient, amount, now)?;
        drop(token);

        self.publish(now, &receipt.events);
        Ok(receipt)
    }

    /// Fold accrued interest into principal without moving any credits
    #[instrument(skip(self))]
    pub async fn settle(&self, holder: &HolderId) -> Result<(), VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();
        let events = token.settle(holder, now)?;
        drop(token);

        self.publish(now, &events);
        Ok(())
    }

    pub async fn allowance(&self, owner: &HolderId, spender: &HolderId) -> Amount {
        self.token.lock().await.allowance(owner, spender)
    }

    /// Add base asset to the reserve without minting credits
    #[instrument(skip(self))]
    pub async fn fund_rewards(&self, from: &HolderId, amount: Amount) -> Result<(), VaultError> {
        if amount == 0 {
            return Err(LedgerError::ZeroAmount.into());
        }

        let _serial = self.token.lock().await;
        let now = self.clock.now();
        self.custody
            .receive(from, amount)
            .await
            .map_err(|source| VaultError::CustodyRejected {
                depositor: from.clone(),
                source,
            })?;

        info!(amount, "Reward reserve funded");
        self.publish_one(
            now,
            VaultEvent::RewardsFunded {
                from: from.clone(),
                amount,
            },
        );
        Ok(())
    }

    /// Lower the rate offered to new depositors
    #[instrument(skip(self))]
    pub async fn set_interest_rate(&self, new_rate: Rate) -> Result<(), VaultError> {
        let mut token = self.token.lock().await;
        let now = self.clock.now();
        let event = token.set_global_rate(new_rate)?;
        drop(token);

        self.publish(now, std::slice::from_ref(&event));
        Ok(())
    }

    /// Live balance at the current logical time
    pub async fn balance_of(&self, holder: &HolderId) -> Result<Amount, VaultError> {
        let token = self.token.lock().await;
        Ok(token.balance_of(holder, self.clock.now())?)
    }

    pub async fn principal_balance_of(&self, holder: &HolderId) -> Amount {
        self.token.lock().await.principal_balance_of(holder)
    }

    pub async fn user_interest_rate(&self, holder: &HolderId) -> Rate {
        self.token.lock().await.user_interest_rate(holder)
    }

    pub async fn global_rate(&self) -> Rate {
        self.token.lock().await.global_rate()
    }

    pub async fn total_principal(&self) -> Amount {
        self.token.lock().await.total_principal()
    }

    pub async fn snapshot(&self) -> LedgerSnapshot {
        self.token.lock().await.snapshot()
    }

    fn publish(&self, now: Timestamp, events: &[LedgerEvent]) {
        for event in events {
            self.publish_one(now, VaultEvent::Ledger(event.clone()));
        }
    }

    fn publish_one(&self, now: Timestamp, event: VaultEvent) {
        self.notifier.notify(&Notification::new(now, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custody::InMemoryCustody;
    use crate::notify::MemoryNotifier;
    use strata_common::{ManualClock, SENTINEL_MAX, UNIT};

    const RATE: Rate = 50_000_000_000;

    struct Harness {
        vault: Vault<InMemoryCustody>,
        clock: Arc<ManualClock>,
        notifier: Arc<MemoryNotifier>,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(0));
        let notifier = Arc::new(MemoryNotifier::new());
        let vault = Vault::new(
            InterestToken::new(RATE),
            InMemoryCustody::new(),
            clock.clone(),
            notifier.clone(),
        );
        Harness {
            vault,
            clock,
            notifier,
        }
    }

    #[tokio::test]
    async fn test_deposit_mints_and_notifies() {
        let h = harness();
        let alice = HolderId::new("alice");
        h.vault.custody().fund_wallet(&alice, 100 * UNIT);

        h.vault.deposit(&alice, 100 * UNIT).await.unwrap();

        assert_eq!(h.vault.balance_of(&alice).await.unwrap(), 100 * UNIT);
        assert_eq!(h.vault.custody().reserve().await, 100 * UNIT);
        assert_eq!(h.vault.custody().wallet_balance(&alice), 0);

        let kinds: Vec<_> = h.notifier.events().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["RateLocked", "Minted", "Deposited"]);
    }

    #[tokio::test]
    async fn test_deposit_without_funds_mints_nothing() {
        let h = harness();
        let alice = HolderId::new("alice");

        let err = h.vault.deposit(&alice, UNIT).await.unwrap_err();
        assert!(matches!(err, VaultError::CustodyRejected { .. }));
        assert_eq!(h.vault.total_principal().await, 0);
        assert!(h.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_all_pays_interest() {
        let h = harness();
        let alice = HolderId::new("alice");
        let sponsor = HolderId::new("sponsor");
        h.vault.custody().fund_wallet(&alice, 100 * UNIT);
        h.vault.custody().fund_wallet(&sponsor, UNIT);

        h.vault.deposit(&alice, 100 * UNIT).await.unwrap();
        h.vault.fund_rewards(&sponsor, UNIT).await.unwrap();
        h.clock.advance(2);

        let receipt = h.vault.redeem(&alice, SENTINEL_MAX).await.unwrap();
        assert_eq!(receipt.amount, 100_000_010_000_000_000_000);
        assert_eq!(
            h.vault.custody().wallet_balance(&alice),
            100_000_010_000_000_000_000
        );
        assert_eq!(h.vault.principal_balance_of(&alice).await, 0);
    }

    #[tokio::test]
    async fn test_redeem_with_empty_reserve_burns_nothing() {
        let h = harness();
        let alice = HolderId::new("alice");
        h.vault.custody().fund_wallet(&alice, 100 * UNIT);
        h.vault.deposit(&alice, 100 * UNIT).await.unwrap();
        h.clock.advance(1_000);
        h.notifier.drain();

        // Interest is not backed by the reserve, so a full payout cannot succeed
        let err = h.vault.redeem(&alice, SENTINEL_MAX).await.unwrap_err();
        assert!(matches!(err, VaultError::PayoutFailed { .. }));
        assert_eq!(h.vault.principal_balance_of(&alice).await, 100 * UNIT);
        assert_eq!(h.vault.custody().reserve().await, 100 * UNIT);
        assert!(h.notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_transfer_from_consumes_allowance() {
        let h = harness();
        let (alice, bob, carol) = (
            HolderId::new("alice"),
            HolderId::new("bob"),
            HolderId::new("carol"),
        );
        h.vault.custody().fund_wallet(&alice, 10 * UNIT);
        h.vault.deposit(&alice, 10 * UNIT).await.unwrap();

        h.vault.approve(&alice, &bob, 4 * UNIT).await;
        h.vault
            .transfer_from(&bob, &alice, &carol, 3 * UNIT)
            .await
            .unwrap();

        assert_eq!(h.vault.allowance(&alice, &bob).await, UNIT);
        assert_eq!(h.vault.principal_balance_of(&carol).await, 3 * UNIT);

        let err = h
            .vault
            .transfer_from(&bob, &alice, &carol, 2 * UNIT)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            VaultError::Ledger(LedgerError::InsufficientAllowance { .. })
        ));
    }

    #[tokio::test]
    async fn test_settle_folds_interest() {
        let h = harness();
        let alice = HolderId::new("alice");
        h.vault.custody().fund_wallet(&alice, 100 * UNIT);
        h.vault.deposit(&alice, 100 * UNIT).await.unwrap();
        h.clock.advance(2);

        h.vault.settle(&alice).await.unwrap();
        assert_eq!(
            h.vault.principal_balance_of(&alice).await,
            100_000_010_000_000_000_000
        );
    }

    #[tokio::test]
    async fn test_set_interest_rate_notifies() {
        let h = harness();
        h.vault.set_interest_rate(RATE - 1).await.unwrap();
        assert_eq!(h.vault.global_rate().await, RATE - 1);

        let err = h.vault.set_interest_rate(RATE).await.unwrap_err();
        assert!(matches!(
            err,
            VaultError::Ledger(LedgerError::RateCanOnlyDecrease { .. })
        ));
        assert_eq!(h.notifier.events().len(), 1);
    }
}
