//! Persisted state layout
//!
//! One `{principal, locked_rate, last_settled_at}` record per holder plus the
//! global rate. Durability is left to whoever stores the snapshot.

use serde::{Deserialize, Serialize};
use strata_common::{Amount, HolderId, LedgerError, Rate, Timestamp};

use crate::base::BaseLedger;
use crate::rates::AccrualRecord;
use crate::token::InterestToken;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderSnapshot {
    pub holder: HolderId,
    pub principal: Amount,
    pub locked_rate: Rate,
    pub last_settled_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceSnapshot {
    pub owner: HolderId,
    pub spender: HolderId,
    pub amount: Amount,
}

/// Full ledger state, ordered by holder for stable output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub global_rate: Rate,
    pub holders: Vec<HolderSnapshot>,
    #[serde(default)]
    pub allowances: Vec<AllowanceSnapshot>,
}

impl<L: BaseLedger> InterestToken<L> {
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut holders: Vec<HolderSnapshot> = self
            .rates
            .records()
            .map(|(holder, record)| HolderSnapshot {
                holder: holder.clone(),
                principal: self.base.principal_of(holder),
                locked_rate: record.locked_rate,
                last_settled_at: record.last_settled_at,
            })
            .collect();
        holders.sort_by(|a, b| a.holder.cmp(&b.holder));

        let mut allowances: Vec<AllowanceSnapshot> = self
            .allowances
            .entries()
            .map(|(owner, spender, amount)| AllowanceSnapshot {
                owner: owner.clone(),
                spender: spender.clone(),
                amount,
            })
            .collect();
        allowances.sort_by(|a, b| (&a.owner, &a.spender).cmp(&(&b.owner, &b.spender)));

        LedgerSnapshot {
            global_rate: self.rates.global_rate(),
            holders,
            allowances,
        }
    }
}

impl<L: BaseLedger + Default> InterestToken<L> {
    /// Rebuild a ledger from a snapshot on top of an empty base ledger
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self, LedgerError> {
        let mut token = Self::with_base_ledger(L::default(), snapshot.global_rate);

        for entry in &snapshot.holders {
            if entry.principal > 0 {
                token.base.credit_principal(&entry.holder, entry.principal)?;
            }
            token.rates.restore_record(
                entry.holder.clone(),
                AccrualRecord {
                    locked_rate: entry.locked_rate,
                    last_settled_at: entry.last_settled_at,
                },
            );
        }

        for entry in &snapshot.allowances {
            token
                .allowances
                .approve(&entry.owner, &entry.spender, entry.amount);
        }

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::InMemoryLedger;
    use strata_common::UNIT;

    #[test]
    fn test_snapshot_restores_live_balances() {
        let alice = HolderId::new("alice");
        let bob = HolderId::new("bob");
        let mut token = InterestToken::new(50_000_000_000);
        token.mint(&alice, 100 * UNIT, 0).unwrap();
        token.transfer(&alice, &bob, 25 * UNIT, 10).unwrap();
        token.set_global_rate(1_000).unwrap();
        token.approve(&alice, &bob, 5);

        let snapshot = token.snapshot();
        assert_eq!(snapshot.holders[0].holder, alice);
        assert_eq!(snapshot.holders[1].holder, bob);

        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: LedgerSnapshot = serde_json::from_str(&json).unwrap();
        let restored: InterestToken<InMemoryLedger> =
            InterestToken::from_snapshot(&decoded).unwrap();

        assert_eq!(restored.global_rate(), 1_000);
        assert_eq!(restored.allowance(&alice, &bob), 5);
        assert_eq!(restored.total_principal(), token.total_principal());
        for holder in [&alice, &bob] {
            assert_eq!(
                restored.balance_of(holder, 500).unwrap(),
                token.balance_of(holder, 500).unwrap()
            );
            assert_eq!(
                restored.user_interest_rate(holder),
                token.user_interest_rate(holder)
            );
        }
    }
}
