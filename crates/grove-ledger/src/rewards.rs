// crates/grove-ledger/src/rewards.rs
//
// Reward ledger: per-account credit balances under a global capped supply.
//
// Invariants held after every call, successful or not:
//   0 <= total_supply <= max_supply
//   total_supply == sum(balances) + pool_balance
//
// Every mutation is split into a `check_*` step that reads state and may fail,
// and a commit step that cannot fail. Callers run all checks before any
// commit, which makes batch operations all-or-nothing without rollback.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;
use grove_core::event::ReasonCode;
use grove_core::identity::Principal;

use crate::params::RedeemPolicy;

/// Balance record for one principal. Absent accounts read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub balance: u64,
    /// Credits ever redeemed by this account, through any path.
    pub cumulative_redeemed: u64,
}

/// One line of a batch reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub recipient: Principal,
    pub amount: u64,
    pub reason: ReasonCode,
}

pub struct RewardLedger {
    pub(crate) accounts: HashMap<Principal, Account>,
    pub(crate) total_supply: u64,
    pub(crate) pool_balance: u64,
    max_supply: u64,
    min_redeem_amount: u64,
    policy: RedeemPolicy,
}

impl RewardLedger {
    pub fn new(max_supply: u64, min_redeem_amount: u64, policy: RedeemPolicy) -> Self {
        Self {
            accounts: HashMap::new(),
            total_supply: 0,
            pool_balance: 0,
            max_supply,
            min_redeem_amount,
            policy,
        }
    }

    pub fn account(&self, principal: &Principal) -> Account {
        self.accounts.get(principal).copied().unwrap_or_default()
    }

    pub fn balance_of(&self, principal: &Principal) -> u64 {
        self.account(principal).balance
    }

    pub fn total_supply(&self) -> u64 {
        self.total_supply
    }

    pub fn max_supply(&self) -> u64 {
        self.max_supply
    }

    pub fn remaining_supply(&self) -> u64 {
        self.max_supply - self.total_supply
    }

    pub fn pool_balance(&self) -> u64 {
        self.pool_balance
    }

    pub fn min_redeem_amount(&self) -> u64 {
        self.min_redeem_amount
    }

    pub fn policy(&self) -> RedeemPolicy {
        self.policy
    }

    /// Validate a single credit of `amount` on top of `already_planned`
    /// credits from the same batch. Returns the new planned total.
    fn plan_credit(
        &self,
        recipient: &Principal,
        amount: u64,
        already_planned: u64,
    ) -> Result<u64, GroveError> {
        if amount == 0 {
            return Err(GroveError::InvalidInput(
                "reward amount must be greater than zero".to_string(),
            ));
        }
        if recipient.is_zero() {
            return Err(GroveError::InvalidRecipient(
                "cannot reward the null principal".to_string(),
            ));
        }
        let planned = already_planned.checked_add(amount);
        let fits = planned
            .and_then(|p| self.total_supply.checked_add(p))
            .is_some_and(|after| after <= self.max_supply);
        match planned {
            Some(planned) if fits => Ok(planned),
            _ => Err(GroveError::CapExceeded {
                requested: already_planned.saturating_add(amount),
                total_supply: self.total_supply,
                max_supply: self.max_supply,
            }),
        }
    }

    /// # Errors
    /// `InvalidInput` for a zero amount, `InvalidRecipient` for the null
    /// principal, `CapExceeded` if the supply would pass the cap.
    pub fn check_credit(&self, recipient: &Principal, amount: u64) -> Result<(), GroveError> {
        self.plan_credit(recipient, amount, 0).map(|_| ())
    }

    /// Validate a whole batch against the current supply. Returns the
    /// aggregate amount. Any failing entry fails the batch.
    pub fn check_batch(&self, entries: &[RewardEntry]) -> Result<u64, GroveError> {
        if entries.is_empty() {
            return Err(GroveError::InvalidInput("empty reward batch".to_string()));
        }
        entries.iter().try_fold(0u64, |planned, entry| {
            self.plan_credit(&entry.recipient, entry.amount, planned)
        })
    }

    /// Commit a credit. Must follow a successful check.
    pub fn credit(&mut self, recipient: Principal, amount: u64) -> u64 {
        debug_assert!(self.total_supply + amount <= self.max_supply);
        let account = self.accounts.entry(recipient).or_default();
        account.balance += amount;
        self.total_supply += amount;
        account.balance
    }

    /// # Errors
    /// `AmountBelowMinimum` below the redeem floor, `InsufficientBalance`
    /// above the account's balance.
    pub fn check_debit(&self, account: &Principal, amount: u64) -> Result<(), GroveError> {
        if amount < self.min_redeem_amount {
            return Err(GroveError::AmountBelowMinimum {
                amount,
                minimum: self.min_redeem_amount,
            });
        }
        let available = self.balance_of(account);
        if amount > available {
            return Err(GroveError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Commit a redemption. Must follow a successful check.
    pub fn debit(&mut self, account: Principal, amount: u64) -> u64 {
        let entry = self.accounts.entry(account).or_default();
        debug_assert!(entry.balance >= amount);
        entry.balance -= amount;
        entry.cumulative_redeemed = entry.cumulative_redeemed.saturating_add(amount);
        let balance = entry.balance;
        match self.policy {
            RedeemPolicy::Burn => self.total_supply -= amount,
            RedeemPolicy::Pool => self.pool_balance += amount,
        }
        balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{MAX_SUPPLY, MIN_REDEEM_AMOUNT};

    fn user(name: &str) -> Principal {
        Principal::from_handle(name)
    }

    fn ledger() -> RewardLedger {
        RewardLedger::new(MAX_SUPPLY, MIN_REDEEM_AMOUNT, RedeemPolicy::Burn)
    }

    fn entry(name: &str, amount: u64) -> RewardEntry {
        RewardEntry {
            recipient: user(name),
            amount,
            reason: ReasonCode::INITIAL_REWARD,
        }
    }

    #[test]
    fn test_absent_account_reads_zero() {
        let ledger = ledger();
        assert_eq!(ledger.account(&user("nobody")), Account::default());
    }

    #[test]
    fn test_credit_and_supply() {
        let mut ledger = ledger();
        ledger.check_credit(&user("u1"), 50).unwrap();
        assert_eq!(ledger.credit(user("u1"), 50), 50);
        assert_eq!(ledger.total_supply(), 50);
        assert_eq!(ledger.remaining_supply(), MAX_SUPPLY - 50);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let ledger = ledger();
        assert!(matches!(
            ledger.check_credit(&user("u1"), 0),
            Err(GroveError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_null_recipient_rejected() {
        let ledger = ledger();
        assert!(matches!(
            ledger.check_credit(&Principal::ZERO, 5),
            Err(GroveError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn test_cap_exactly_reachable() {
        let mut ledger = ledger();
        ledger.check_credit(&user("u1"), MAX_SUPPLY).unwrap();
        ledger.credit(user("u1"), MAX_SUPPLY);
        assert!(matches!(
            ledger.check_credit(&user("u2"), 1),
            Err(GroveError::CapExceeded { .. })
        ));
    }

    #[test]
    fn test_huge_amount_does_not_overflow() {
        let mut ledger = ledger();
        ledger.credit(user("u1"), 10);
        assert!(matches!(
            ledger.check_credit(&user("u2"), u64::MAX),
            Err(GroveError::CapExceeded { .. })
        ));
    }

    #[test]
    fn test_batch_aggregate_cap() {
        let mut ledger = RewardLedger::new(100, MIN_REDEEM_AMOUNT, RedeemPolicy::Burn);
        ledger.credit(user("u0"), 40);
        assert_eq!(ledger.check_batch(&[entry("a", 30), entry("b", 30)]).unwrap(), 60);
        assert!(matches!(
            ledger.check_batch(&[entry("a", 30), entry("b", 31)]),
            Err(GroveError::CapExceeded { .. })
        ));
    }

    #[test]
    fn test_batch_rejects_invalid_entry() {
        let ledger = ledger();
        assert!(ledger.check_batch(&[entry("a", 30), entry("b", 0)]).is_err());
        assert!(ledger.check_batch(&[]).is_err());
    }

    #[test]
    fn test_debit_floor_and_balance() {
        let mut ledger = ledger();
        ledger.credit(user("u1"), 100);
        assert!(matches!(
            ledger.check_debit(&user("u1"), 10),
            Err(GroveError::AmountBelowMinimum { amount: 10, minimum: 20 })
        ));
        assert!(matches!(
            ledger.check_debit(&user("u1"), 101),
            Err(GroveError::InsufficientBalance { requested: 101, available: 100 })
        ));
        ledger.check_debit(&user("u1"), 20).unwrap();
        assert_eq!(ledger.debit(user("u1"), 20), 80);
        assert_eq!(ledger.account(&user("u1")).cumulative_redeemed, 20);
    }

    #[test]
    fn test_burn_policy_reduces_supply() {
        let mut ledger = ledger();
        ledger.credit(user("u1"), 100);
        ledger.debit(user("u1"), 30);
        assert_eq!(ledger.total_supply(), 70);
        assert_eq!(ledger.pool_balance(), 0);
    }

    #[test]
    fn test_pool_policy_keeps_supply() {
        let mut ledger = RewardLedger::new(MAX_SUPPLY, MIN_REDEEM_AMOUNT, RedeemPolicy::Pool);
        ledger.credit(user("u1"), 100);
        ledger.debit(user("u1"), 30);
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.pool_balance(), 30);
        assert_eq!(ledger.balance_of(&user("u1")), 70);
    }
}
