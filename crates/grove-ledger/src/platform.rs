// crates/grove-ledger/src/platform.rs
//
// Platform orchestrator state: purchase reward conversion, per-account
// redemption allowances, and cumulative platform-routed redemptions that
// drive the tiered exchange rate.
//
// Redemption through the platform is an allowance-then-pull: the holder first
// approves the platform for an amount, then `redeem_credits` consumes that
// allowance and debits the holder in one critical-section entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;
use grove_core::identity::Principal;

/// Outcome of a platform-routed redemption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionReceipt {
    pub account: Principal,
    pub amount: u64,
    /// Platform-routed total after this redemption.
    pub total_redeemed: u64,
    /// Multiplier (hundredths) for `total_redeemed`.
    pub multiplier: u64,
    pub balance_after: u64,
}

pub struct PlatformOrchestrator {
    reward_percent: u64,
    pub(crate) allowances: HashMap<Principal, u64>,
    pub(crate) total_redeemed: HashMap<Principal, u64>,
}

impl PlatformOrchestrator {
    pub fn new(reward_percent: u64) -> Self {
        Self {
            reward_percent,
            allowances: HashMap::new(),
            total_redeemed: HashMap::new(),
        }
    }

    /// Credits earned for a purchase of `fiat_amount_cents`, rounded down.
    ///
    /// # Errors
    /// Returns `GroveError::InvalidInput` when the purchase is too small to
    /// earn a whole credit or the multiplication overflows.
    pub fn credit_amount(&self, fiat_amount_cents: u64) -> Result<u64, GroveError> {
        let credits = fiat_amount_cents
            .checked_mul(self.reward_percent)
            .map(|scaled| scaled / 100)
            .ok_or_else(|| {
                GroveError::InvalidInput(format!(
                    "fiat amount {} is too large to convert",
                    fiat_amount_cents
                ))
            })?;
        if credits == 0 {
            return Err(GroveError::InvalidInput(format!(
                "fiat amount {} cents earns no credits",
                fiat_amount_cents
            )));
        }
        Ok(credits)
    }

    pub fn allowance(&self, account: &Principal) -> u64 {
        self.allowances.get(account).copied().unwrap_or(0)
    }

    pub fn total_redeemed(&self, account: &Principal) -> u64 {
        self.total_redeemed.get(account).copied().unwrap_or(0)
    }

    /// Set (not add to) the amount the platform may pull from `account`.
    pub fn approve(&mut self, account: Principal, amount: u64) {
        if amount == 0 {
            self.allowances.remove(&account);
        } else {
            self.allowances.insert(account, amount);
        }
    }

    /// # Errors
    /// Returns `GroveError::InsufficientAllowance` if the approved amount is
    /// below `amount`.
    pub fn check_pull(&self, account: &Principal, amount: u64) -> Result<(), GroveError> {
        let approved = self.allowance(account);
        if amount > approved {
            return Err(GroveError::InsufficientAllowance {
                requested: amount,
                approved,
            });
        }
        Ok(())
    }

    /// Consume allowance and bump the cumulative total. Must follow a
    /// successful `check_pull`. Returns the new cumulative total.
    pub fn record_pull(&mut self, account: Principal, amount: u64) -> u64 {
        let remaining = self.allowance(&account) - amount;
        self.approve(account, remaining);
        let total = self.total_redeemed.entry(account).or_insert(0);
        *total = total.saturating_add(amount);
        *total
    }
}
