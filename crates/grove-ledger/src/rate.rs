// crates/grove-ledger/src/rate.rs
//
// Redemption rate engine: maps cumulative redeemed credits to a tiered
// exchange-rate multiplier, expressed in hundredths (100 = 1.00x).
//
// Default tiers:
//   [0, 50]   -> 100  (1.00x)
//   [51, inf) -> 175  (1.75x)
//
// Tiers are stored by lower threshold only. A tier ends one below the next
// tier's threshold and the last tier is open-ended, so the bands are always
// contiguous, non-overlapping and cover [0, inf).

use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;

/// Multiplier denominator: a multiplier of 100 means 1.00x.
pub const RATE_SCALE: u64 = 100;

/// One redemption tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    /// Smallest cumulative amount that falls in this tier.
    pub threshold_low: u64,
    /// Multiplier in hundredths.
    pub multiplier: u64,
}

/// Inclusive view of a tier's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    pub low: u64,
    /// `None` for the open-ended top tier.
    pub high: Option<u64>,
    pub multiplier: u64,
}

/// Validated, ordered tier table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateTable {
    tiers: Vec<RateTier>,
}

impl RateTable {
    /// Build a table from tiers sorted by threshold.
    ///
    /// # Errors
    /// Returns `GroveError::InvalidInput` if the list is empty, does not start
    /// at 0, has non-increasing thresholds, or has a decreasing multiplier.
    pub fn new(tiers: Vec<RateTier>) -> Result<Self, GroveError> {
        let first = tiers
            .first()
            .ok_or_else(|| GroveError::InvalidInput("rate table has no tiers".to_string()))?;
        if first.threshold_low != 0 {
            return Err(GroveError::InvalidInput(format!(
                "first rate tier must start at 0, got {}",
                first.threshold_low
            )));
        }
        for pair in tiers.windows(2) {
            if pair[1].threshold_low <= pair[0].threshold_low {
                return Err(GroveError::InvalidInput(format!(
                    "rate thresholds must strictly increase: {} then {}",
                    pair[0].threshold_low, pair[1].threshold_low
                )));
            }
            if pair[1].multiplier < pair[0].multiplier {
                return Err(GroveError::InvalidInput(format!(
                    "rate multipliers must not decrease: {} then {}",
                    pair[0].multiplier, pair[1].multiplier
                )));
            }
        }
        Ok(Self { tiers })
    }

    /// Multiplier for a cumulative redeemed amount.
    ///
    /// Pure lookup; safe to call any number of times.
    ///
    /// # Errors
    /// Returns `GroveError::InvalidInput` for negative input.
    pub fn rate(&self, cumulative_redeemed: i64) -> Result<u64, GroveError> {
        let amount = u64::try_from(cumulative_redeemed).map_err(|_| {
            GroveError::InvalidInput(format!(
                "cumulative redeemed must be non-negative, got {}",
                cumulative_redeemed
            ))
        })?;
        Ok(self.rate_for(amount))
    }

    /// Infallible lookup for amounts the ledger already tracks as unsigned.
    pub fn rate_for(&self, cumulative_redeemed: u64) -> u64 {
        // First tier starts at 0, so the partition point is at least 1.
        let idx = self
            .tiers
            .partition_point(|t| t.threshold_low <= cumulative_redeemed);
        self.tiers[idx - 1].multiplier
    }

    pub fn tiers(&self) -> &[RateTier] {
        &self.tiers
    }

    /// Tiers as inclusive ranges.
    pub fn bands(&self) -> Vec<RateBand> {
        self.tiers
            .iter()
            .enumerate()
            .map(|(i, tier)| RateBand {
                low: tier.threshold_low,
                high: self.tiers.get(i + 1).map(|next| next.threshold_low - 1),
                multiplier: tier.multiplier,
            })
            .collect()
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            tiers: vec![
                RateTier {
                    threshold_low: 0,
                    multiplier: 100,
                },
                RateTier {
                    threshold_low: 51,
                    multiplier: 175,
                },
            ],
        }
    }
}
