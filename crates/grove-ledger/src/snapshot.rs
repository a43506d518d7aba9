// crates/grove-ledger/src/snapshot.rs
//
// Serializable image of the full ledger state.
//
// Shape:
//   owner + params
//   accounts        principal -> (balance, cumulative_redeemed)
//   allowances      principal -> approved platform pull
//   total_redeemed  principal -> platform-routed redemptions
//   authorized      set of principals
//   claims          token_id -> (tree_id, owner, metadata_uri)
//   counters        total_supply, pool_balance, next_token_id, next_event_seq
//
// Restoring re-checks every invariant so a corrupted snapshot is refused
// instead of silently producing an inconsistent ledger.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;
use grove_core::identity::Principal;

use crate::adoption::AdoptionClaim;
use crate::events::EventLog;
use crate::ledger::IncentiveLedger;
use crate::params::{LedgerParams, RedeemPolicy};
use crate::rewards::Account;

/// Format version written into every snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub owner: Principal,
    pub params: LedgerParams,
    pub accounts: BTreeMap<Principal, Account>,
    pub allowances: BTreeMap<Principal, u64>,
    pub total_redeemed: BTreeMap<Principal, u64>,
    pub authorized: BTreeSet<Principal>,
    pub claims: Vec<AdoptionClaim>,
    pub total_supply: u64,
    pub pool_balance: u64,
    pub next_token_id: u64,
    pub next_event_seq: u64,
}

impl LedgerSnapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, GroveError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GroveError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

fn corrupt(msg: String) -> GroveError {
    GroveError::Storage(format!("Corrupt ledger snapshot: {}", msg))
}

impl IncentiveLedger {
    /// Capture the full state.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            owner: self.owner(),
            params: self.params.clone(),
            accounts: self
                .rewards
                .accounts
                .iter()
                .filter(|(_, a)| **a != Account::default())
                .map(|(p, a)| (*p, *a))
                .collect(),
            allowances: self.platform.allowances.iter().map(|(p, a)| (*p, *a)).collect(),
            total_redeemed: self
                .platform
                .total_redeemed
                .iter()
                .map(|(p, t)| (*p, *t))
                .collect(),
            authorized: self.auth.authorized.iter().copied().collect(),
            claims: self.adoption.claims.values().cloned().collect(),
            total_supply: self.rewards.total_supply,
            pool_balance: self.rewards.pool_balance,
            next_token_id: self.adoption.next_token_id,
            next_event_seq: self.events.next_seq(),
        }
    }

    /// Rebuild a ledger from a snapshot.
    ///
    /// # Errors
    /// Returns `GroveError::Storage` if the snapshot version is unknown or any
    /// ledger invariant does not hold, and `InvalidInput` for bad params.
    pub fn restore(snapshot: LedgerSnapshot) -> Result<Self, GroveError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!("unsupported version {}", snapshot.version)));
        }
        let rates = snapshot.params.validate()?;
        if snapshot.owner.is_zero() {
            return Err(corrupt("null owner".to_string()));
        }

        let balances = snapshot
            .accounts
            .values()
            .try_fold(0u64, |sum, a| sum.checked_add(a.balance))
            .and_then(|sum| sum.checked_add(snapshot.pool_balance))
            .ok_or_else(|| corrupt("balance sum overflows".to_string()))?;
        if balances != snapshot.total_supply {
            return Err(corrupt(format!(
                "balances plus pool ({}) do not equal total supply ({})",
                balances, snapshot.total_supply
            )));
        }
        if snapshot.total_supply > snapshot.params.max_supply {
            return Err(corrupt(format!(
                "total supply {} exceeds cap {}",
                snapshot.total_supply, snapshot.params.max_supply
            )));
        }
        if snapshot.params.redeem_policy == RedeemPolicy::Burn && snapshot.pool_balance != 0 {
            return Err(corrupt(format!(
                "pool balance {} under burn policy",
                snapshot.pool_balance
            )));
        }
        let null = Principal::ZERO;
        if snapshot.accounts.contains_key(&null)
            || snapshot.allowances.contains_key(&null)
            || snapshot.total_redeemed.contains_key(&null)
            || snapshot.authorized.contains(&null)
        {
            return Err(corrupt("state recorded for the null principal".to_string()));
        }

        let mut tree_to_token = HashMap::new();
        let mut claims = BTreeMap::new();
        for claim in snapshot.claims {
            if claim.token_id == 0 || claim.token_id >= snapshot.next_token_id {
                return Err(corrupt(format!(
                    "token {} outside issued range (next {})",
                    claim.token_id, snapshot.next_token_id
                )));
            }
            if claim.owner.is_zero() {
                return Err(corrupt(format!("token {} owned by null principal", claim.token_id)));
            }
            if tree_to_token.insert(claim.tree_id, claim.token_id).is_some() {
                return Err(corrupt(format!("tree {} claimed twice", claim.tree_id)));
            }
            if claims.insert(claim.token_id, claim).is_some() {
                return Err(corrupt("duplicate token id".to_string()));
            }
        }

        let mut ledger = Self::assemble(
            snapshot.owner,
            snapshot.params,
            rates,
            EventLog::resume(snapshot.next_event_seq),
        );
        ledger.rewards.accounts = snapshot.accounts.into_iter().collect();
        ledger.rewards.total_supply = snapshot.total_supply;
        ledger.rewards.pool_balance = snapshot.pool_balance;
        ledger.auth.authorized = snapshot.authorized.into_iter().collect::<HashSet<_>>();
        ledger.platform.allowances = snapshot.allowances.into_iter().collect();
        ledger.platform.total_redeemed = snapshot.total_redeemed.into_iter().collect();
        ledger.adoption.tree_to_token = tree_to_token;
        ledger.adoption.claims = claims;
        ledger.adoption.next_token_id = snapshot.next_token_id;

        tracing::info!(
            owner = %ledger.owner(),
            total_supply = ledger.total_supply(),
            claims = ledger.total_claims(),
            next_event_seq = ledger.next_event_seq(),
            "Ledger restored from snapshot"
        );
        Ok(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::event::ReasonCode;

    fn owner() -> Principal {
        Principal::from_handle("owner")
    }

    fn user(name: &str) -> Principal {
        Principal::from_handle(name)
    }

    fn populated() -> IncentiveLedger {
        let mut ledger = IncentiveLedger::new(owner(), LedgerParams::default()).unwrap();
        ledger.add_authorized(&owner(), user("minter")).unwrap();
        ledger.reward(&user("minter"), user("u"), 200, ReasonCode(1)).unwrap();
        ledger.approve_platform(&user("u"), 100).unwrap();
        ledger.redeem_credits(&user("u"), 60).unwrap();
        ledger.mint(&owner(), user("u"), 42, "ipfs://tree42").unwrap();
        ledger
    }

    #[test]
    fn test_snapshot_restore_preserves_state() {
        let original = populated();
        let bytes = original.snapshot().to_bytes().unwrap();
        let snapshot = LedgerSnapshot::from_bytes(&bytes).unwrap();
        let mut restored = IncentiveLedger::restore(snapshot).unwrap();

        assert_eq!(restored.snapshot(), original.snapshot());
        assert_eq!(restored.balance_of(&user("u")), 140);
        assert_eq!(restored.exchange_rate(&user("u")), 175);
        assert_eq!(restored.platform_allowance(&user("u")), 40);
        assert!(restored.is_authorized(&user("minter")));
        assert!(restored.is_tree_adopted(42));
        assert_eq!(restored.token_uri(1).unwrap(), "ipfs://tree42");

        // Counters continue where they left off.
        assert_eq!(restored.mint(&owner(), user("v"), 43, "ipfs://t").unwrap(), 2);
        assert_eq!(restored.events()[0].seq, original.next_event_seq());
    }

    #[test]
    fn test_restore_rejects_supply_mismatch() {
        let mut snapshot = populated().snapshot();
        snapshot.total_supply += 1;
        assert!(matches!(
            IncentiveLedger::restore(snapshot),
            Err(GroveError::Storage(_))
        ));
    }

    #[test]
    fn test_restore_rejects_duplicate_tree() {
        let mut snapshot = populated().snapshot();
        let mut dup = snapshot.claims[0].clone();
        dup.token_id = 2;
        snapshot.claims.push(dup);
        snapshot.next_token_id = 3;
        assert!(IncentiveLedger::restore(snapshot).is_err());
    }

    #[test]
    fn test_restore_rejects_token_beyond_counter() {
        let mut snapshot = populated().snapshot();
        snapshot.next_token_id = 1;
        assert!(IncentiveLedger::restore(snapshot).is_err());
    }

    #[test]
    fn test_restore_rejects_pool_under_burn() {
        let mut snapshot = populated().snapshot();
        assert_eq!(snapshot.params.redeem_policy, RedeemPolicy::Burn);
        snapshot.pool_balance = 5;
        snapshot.total_supply += 5;
        assert!(matches!(
            IncentiveLedger::restore(snapshot),
            Err(GroveError::Storage(_))
        ));
    }

    #[test]
    fn test_restore_accepts_pool_under_pool_policy() {
        let params = LedgerParams {
            redeem_policy: RedeemPolicy::Pool,
            ..LedgerParams::default()
        };
        let mut ledger = IncentiveLedger::new(owner(), params).unwrap();
        ledger.reward(&owner(), user("u"), 50, ReasonCode(1)).unwrap();
        ledger.redeem(&user("u"), 20, ReasonCode(10)).unwrap();
        let restored = IncentiveLedger::restore(ledger.snapshot()).unwrap();
        assert_eq!(restored.pool_balance(), 20);
    }

    #[test]
    fn test_restore_rejects_null_principal_entries() {
        let mut snapshot = populated().snapshot();
        snapshot.allowances.insert(Principal::ZERO, 10);
        assert!(IncentiveLedger::restore(snapshot).is_err());

        let mut snapshot = populated().snapshot();
        snapshot.total_redeemed.insert(Principal::ZERO, 30);
        assert!(IncentiveLedger::restore(snapshot).is_err());
    }

    #[test]
    fn test_restore_rejects_unknown_version() {
        let mut snapshot = populated().snapshot();
        snapshot.version = 99;
        assert!(IncentiveLedger::restore(snapshot).is_err());
    }
}
