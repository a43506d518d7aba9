// crates/grove-ledger/src/adoption.rs
//
// Adoption registry: one non-fungible claim per tree.
//
// State machine per tree id:    Unclaimed -> Claimed (terminal)
// Token id allocation:          strictly increasing from 1, advanced only by a
//                               successful mint, never reused.
//
// Claims are immutable once minted. There is no burn, transfer or re-mint.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use grove_core::error::GroveError;
use grove_core::event::LedgerEventKind;
use grove_core::identity::Principal;

/// First token id handed out by a fresh registry.
pub const FIRST_TOKEN_ID: u64 = 1;

/// A minted adoption claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdoptionClaim {
    pub token_id: u64,
    pub tree_id: u64,
    pub owner: Principal,
    pub metadata_uri: String,
    pub minted_at: DateTime<Utc>,
}

pub struct AdoptionRegistry {
    pub(crate) tree_to_token: HashMap<u64, u64>,
    pub(crate) claims: BTreeMap<u64, AdoptionClaim>,
    pub(crate) next_token_id: u64,
}

impl AdoptionRegistry {
    pub fn new() -> Self {
        Self {
            tree_to_token: HashMap::new(),
            claims: BTreeMap::new(),
            next_token_id: FIRST_TOKEN_ID,
        }
    }

    /// # Errors
    /// `InvalidRecipient` for the null principal, `AlreadyClaimed` if the tree
    /// has a claim.
    pub fn check_mint(&self, recipient: &Principal, tree_id: u64) -> Result<(), GroveError> {
        if recipient.is_zero() {
            return Err(GroveError::InvalidRecipient(
                "cannot mint an adoption claim to the null principal".to_string(),
            ));
        }
        if let Some(&token_id) = self.tree_to_token.get(&tree_id) {
            return Err(GroveError::AlreadyClaimed { tree_id, token_id });
        }
        Ok(())
    }

    /// Commit a mint. Must follow a successful `check_mint`.
    pub fn mint(
        &mut self,
        recipient: Principal,
        tree_id: u64,
        metadata_uri: String,
    ) -> (u64, LedgerEventKind) {
        let token_id = self.next_token_id;
        self.next_token_id += 1;
        self.tree_to_token.insert(tree_id, token_id);
        self.claims.insert(
            token_id,
            AdoptionClaim {
                token_id,
                tree_id,
                owner: recipient,
                metadata_uri,
                minted_at: Utc::now(),
            },
        );
        (
            token_id,
            LedgerEventKind::TreeAdopted {
                recipient,
                token_id,
                tree_id,
            },
        )
    }

    pub fn is_tree_adopted(&self, tree_id: u64) -> bool {
        self.tree_to_token.contains_key(&tree_id)
    }

    pub fn token_for_tree(&self, tree_id: u64) -> Option<u64> {
        self.tree_to_token.get(&tree_id).copied()
    }

    /// # Errors
    /// Returns `GroveError::NonexistentToken` if nothing was minted under `token_id`.
    pub fn claim(&self, token_id: u64) -> Result<&AdoptionClaim, GroveError> {
        self.claims
            .get(&token_id)
            .ok_or(GroveError::NonexistentToken(token_id))
    }

    pub fn tree_id(&self, token_id: u64) -> Result<u64, GroveError> {
        self.claim(token_id).map(|c| c.tree_id)
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str, GroveError> {
        self.claim(token_id).map(|c| c.metadata_uri.as_str())
    }

    pub fn owner_of(&self, token_id: u64) -> Result<Principal, GroveError> {
        self.claim(token_id).map(|c| c.owner)
    }

    /// Token ids held by `owner`, in mint order.
    pub fn claims_of(&self, owner: &Principal) -> Vec<u64> {
        self.claims
            .values()
            .filter(|c| c.owner == *owner)
            .map(|c| c.token_id)
            .collect()
    }

    pub fn total_claims(&self) -> usize {
        self.claims.len()
    }

    pub fn next_token_id(&self) -> u64 {
        self.next_token_id
    }
}

impl Default for AdoptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
