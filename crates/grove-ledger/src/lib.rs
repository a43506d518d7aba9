// crates/grove-ledger/src/lib.rs
//
// grove-ledger: the incentive ledger for the Grove platform.
//
// Capped-supply reward credits with owner-delegated minting, redemption with
// a tiered exchange rate driven by cumulative platform redemptions, and a
// uniqueness-constrained registry of tree adoption claims. All state lives in
// one `IncentiveLedger`; `SharedLedger` serializes concurrent access.
//
// Credits are whole integer units. Multipliers are in hundredths (175 = 1.75x).

pub mod adoption;
pub mod authorization;
pub mod events;
pub mod ledger;
pub mod params;
pub mod platform;
pub mod rate;
pub mod rewards;
pub mod shared;
pub mod snapshot;

// Re-export key types for ergonomic access from downstream crates.
pub use adoption::{AdoptionClaim, AdoptionRegistry, FIRST_TOKEN_ID};
pub use authorization::AuthorizationRegistry;
pub use events::EventLog;
pub use ledger::IncentiveLedger;
pub use params::{LedgerParams, RedeemPolicy, MAX_SUPPLY, MIN_REDEEM_AMOUNT, REWARD_PERCENT};
pub use platform::{PlatformOrchestrator, RedemptionReceipt};
pub use rate::{RateBand, RateTable, RateTier, RATE_SCALE};
pub use rewards::{Account, RewardEntry, RewardLedger};
pub use shared::SharedLedger;
pub use snapshot::{LedgerSnapshot, SNAPSHOT_VERSION};
