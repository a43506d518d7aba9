// crates/grove-core/src/event.rs
//
// Audit events emitted by the ledger on every successful mutation.
// Events are append-only and carry a sequence number assigned by the
// ledger's event log; they are not consulted for correctness.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Principal;

/// Opaque classification tag carried by reward and redeem operations.
///
/// The ledger stores and emits reason codes without interpreting them.
/// The associated constants are the codes the platform uses today; any
/// other value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCode(pub u32);

impl ReasonCode {
    pub const INITIAL_REWARD: ReasonCode = ReasonCode(1);
    pub const TREE_ADOPTION: ReasonCode = ReasonCode(2);
    pub const PLANT_TREE: ReasonCode = ReasonCode(3);
    pub const REFERRAL: ReasonCode = ReasonCode(4);
    pub const ACHIEVEMENT: ReasonCode = ReasonCode(5);
    /// Reserved for fiat purchase rewards issued by the platform.
    pub const PLATFORM_PURCHASE: ReasonCode = ReasonCode(6);
    /// Used by platform-routed redemptions.
    pub const REDEMPTION: ReasonCode = ReasonCode(10);

    /// Human-readable label for known codes, `None` otherwise.
    pub fn label(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("initial-reward"),
            2 => Some("tree-adoption"),
            3 => Some("plant-tree"),
            4 => Some("referral"),
            5 => Some("achievement"),
            6 => Some("platform-purchase"),
            10 => Some("redemption"),
            _ => None,
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => write!(f, "{}({})", label, self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Direction of an authorization set change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationChange {
    Added,
    Removed,
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEventKind {
    Rewarded {
        recipient: Principal,
        amount: u64,
        reason: ReasonCode,
    },
    Redeemed {
        account: Principal,
        amount: u64,
        reason: ReasonCode,
    },
    AuthorizationChanged {
        principal: Principal,
        change: AuthorizationChange,
    },
    PlatformApproval {
        account: Principal,
        amount: u64,
    },
    TreeAdopted {
        recipient: Principal,
        token_id: u64,
        tree_id: u64,
    },
}

/// A sequenced, timestamped audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEvent {
    /// Position in the event log, starting at 0.
    pub seq: u64,
    /// Wall-clock time the event was committed.
    pub at: DateTime<Utc>,
    pub kind: LedgerEventKind,
}
