// crates/grove-core/src/error.rs

use thiserror::Error;

/// Protocol-wide error types for the Grove incentive ledger.
///
/// The first group are ledger rejections: they are detected before any state
/// is written, so a caller receiving one can treat the call as a no-op. The
/// last three are infrastructure failures from the persistence and
/// configuration layers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroveError {
    /// Caller is neither the owner nor an authorized principal.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Minting would push total supply past the cap.
    #[error("Cap exceeded: requested {requested} with supply {total_supply} of max {max_supply}")]
    CapExceeded {
        requested: u64,
        total_supply: u64,
        max_supply: u64,
    },

    /// Debit larger than the account balance.
    #[error("Insufficient balance: requested {requested} but only {available} available")]
    InsufficientBalance { requested: u64, available: u64 },

    /// Redemption below the configured floor.
    #[error("Amount below minimum: {amount} < {minimum}")]
    AmountBelowMinimum { amount: u64, minimum: u64 },

    /// Platform pull larger than the pre-approved allowance.
    #[error("Insufficient allowance: requested {requested} but only {approved} approved")]
    InsufficientAllowance { requested: u64, approved: u64 },

    /// Tree already has an adoption claim.
    #[error("Tree {tree_id} already claimed by token {token_id}")]
    AlreadyClaimed { tree_id: u64, token_id: u64 },

    /// Recipient is the null identity.
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    /// No claim carries this token id.
    #[error("Nonexistent token: {0}")]
    NonexistentToken(u64),

    /// Malformed argument (zero amount, negative rate input, bad table).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage layer error (RocksDB, snapshot integrity).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is inconsistent.
    #[error("Config error: {0}")]
    Config(String),
}

impl GroveError {
    /// Returns `true` for caller-recoverable ledger rejections, `false` for
    /// infrastructure failures.
    pub fn is_ledger_rejection(&self) -> bool {
        !matches!(
            self,
            GroveError::Storage(_) | GroveError::Serialization(_) | GroveError::Config(_)
        )
    }

    /// Stable snake_case tag for the variant, used on the daemon wire.
    pub fn kind(&self) -> &'static str {
        match self {
            GroveError::NotAuthorized(_) => "not_authorized",
            GroveError::CapExceeded { .. } => "cap_exceeded",
            GroveError::InsufficientBalance { .. } => "insufficient_balance",
            GroveError::AmountBelowMinimum { .. } => "amount_below_minimum",
            GroveError::InsufficientAllowance { .. } => "insufficient_allowance",
            GroveError::AlreadyClaimed { .. } => "already_claimed",
            GroveError::InvalidRecipient(_) => "invalid_recipient",
            GroveError::NonexistentToken(_) => "nonexistent_token",
            GroveError::InvalidInput(_) => "invalid_input",
            GroveError::Storage(_) => "storage",
            GroveError::Serialization(_) => "serialization",
            GroveError::Config(_) => "config",
        }
    }
}

impl From<serde_json::Error> for GroveError {
    fn from(e: serde_json::Error) -> Self {
        GroveError::Serialization(e.to_string())
    }
}
