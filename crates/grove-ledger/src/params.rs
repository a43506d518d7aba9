// crates/grove-ledger/src/params.rs
//
// Supply constants and policy parameters for the Grove incentive ledger.
//
// Credits are whole integer units; there is no sub-unit denomination.
// Every policy value here can be overridden from the daemon's `[ledger]`
// TOML table, which deserializes straight into `LedgerParams`.

use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;

use crate::rate::{RateTable, RateTier};

/// Hard ceiling on credits in circulation.
pub const MAX_SUPPLY: u64 = 10_000_000;

/// Smallest amount a holder may redeem in one call.
pub const MIN_REDEEM_AMOUNT: u64 = 20;

/// Share of a fiat purchase (in cents) paid out as credits, in percent.
pub const REWARD_PERCENT: u64 = 10;

/// What happens to redeemed credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedeemPolicy {
    /// Redeemed credits leave circulation: total supply decreases.
    #[default]
    Burn,
    /// Redeemed credits move to a platform-held pool: total supply is unchanged.
    Pool,
}

/// Tunable policy for one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    #[serde(default = "default_max_supply")]
    pub max_supply: u64,

    #[serde(default = "default_min_redeem_amount")]
    pub min_redeem_amount: u64,

    /// Percent of fiat cents credited by `reward_user`. Must be in 1..=100.
    #[serde(default = "default_reward_percent")]
    pub reward_percent: u64,

    #[serde(default)]
    pub redeem_policy: RedeemPolicy,

    /// Redemption tiers, lowest threshold first.
    #[serde(default = "default_rate_tiers")]
    pub rate_tiers: Vec<RateTier>,
}

fn default_max_supply() -> u64 {
    MAX_SUPPLY
}

fn default_min_redeem_amount() -> u64 {
    MIN_REDEEM_AMOUNT
}

fn default_reward_percent() -> u64 {
    REWARD_PERCENT
}

fn default_rate_tiers() -> Vec<RateTier> {
    RateTable::default().tiers().to_vec()
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            max_supply: default_max_supply(),
            min_redeem_amount: default_min_redeem_amount(),
            reward_percent: default_reward_percent(),
            redeem_policy: RedeemPolicy::default(),
            rate_tiers: default_rate_tiers(),
        }
    }
}

impl LedgerParams {
    /// Check the parameters and build the rate table they describe.
    ///
    /// # Errors
    /// Returns `GroveError::InvalidInput` for a zero cap, a zero redeem
    /// floor, a reward percent outside 1..=100, or a malformed tier list.
    pub fn validate(&self) -> Result<RateTable, GroveError> {
        if self.max_supply == 0 {
            return Err(GroveError::InvalidInput(
                "max_supply must be greater than zero".to_string(),
            ));
        }
        if self.min_redeem_amount == 0 {
            return Err(GroveError::InvalidInput(
                "min_redeem_amount must be greater than zero".to_string(),
            ));
        }
        if self.reward_percent == 0 || self.reward_percent > 100 {
            return Err(GroveError::InvalidInput(format!(
                "reward_percent must be in 1..=100, got {}",
                self.reward_percent
            )));
        }
        RateTable::new(self.rate_tiers.clone())
    }
}
