// crates/grove-ledger/src/authorization.rs
//
// Owner-controlled set of principals permitted to mint reward credits.
//
// The owner is implicitly authorized for every gated operation without being
// a member of the explicit set. Only the owner may change membership.

use std::collections::{BTreeSet, HashSet};

use grove_core::error::GroveError;
use grove_core::event::{AuthorizationChange, LedgerEventKind};
use grove_core::identity::Principal;

pub struct AuthorizationRegistry {
    owner: Principal,
    pub(crate) authorized: HashSet<Principal>,
}

impl AuthorizationRegistry {
    pub fn new(owner: Principal) -> Self {
        Self {
            owner,
            authorized: HashSet::new(),
        }
    }

    pub fn owner(&self) -> Principal {
        self.owner
    }

    pub fn is_owner(&self, principal: &Principal) -> bool {
        *principal == self.owner
    }

    /// Owner or explicit member.
    pub fn has_permission(&self, principal: &Principal) -> bool {
        self.is_owner(principal) || self.authorized.contains(principal)
    }

    /// Explicit membership only.
    pub fn is_member(&self, principal: &Principal) -> bool {
        self.authorized.contains(principal)
    }

    /// Members in sorted order.
    pub fn members(&self) -> Vec<Principal> {
        self.authorized
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// # Errors
    /// Returns `GroveError::NotAuthorized` if `caller` is not the owner.
    pub fn ensure_owner(&self, caller: &Principal) -> Result<(), GroveError> {
        if !self.is_owner(caller) {
            return Err(GroveError::NotAuthorized(format!(
                "{} is not the owner",
                caller
            )));
        }
        Ok(())
    }

    /// # Errors
    /// Returns `GroveError::NotAuthorized` if `caller` is neither the owner
    /// nor an authorized principal.
    pub fn ensure_permission(&self, caller: &Principal) -> Result<(), GroveError> {
        if !self.has_permission(caller) {
            return Err(GroveError::NotAuthorized(format!(
                "{} may not mint credits",
                caller
            )));
        }
        Ok(())
    }

    /// Add members. All-or-nothing: the caller and every entry are checked
    /// before the set changes. Already-present principals are skipped, so only
    /// actual changes produce events.
    pub fn add(
        &mut self,
        caller: &Principal,
        principals: &[Principal],
    ) -> Result<Vec<LedgerEventKind>, GroveError> {
        self.ensure_owner(caller)?;
        check_principals(principals)?;

        let mut changes = Vec::new();
        for principal in principals {
            if self.authorized.insert(*principal) {
                changes.push(LedgerEventKind::AuthorizationChanged {
                    principal: *principal,
                    change: AuthorizationChange::Added,
                });
            }
        }
        Ok(changes)
    }

    /// Remove members. Absent principals are a no-op.
    pub fn remove(
        &mut self,
        caller: &Principal,
        principals: &[Principal],
    ) -> Result<Vec<LedgerEventKind>, GroveError> {
        self.ensure_owner(caller)?;

        let mut changes = Vec::new();
        for principal in principals {
            if self.authorized.remove(principal) {
                changes.push(LedgerEventKind::AuthorizationChanged {
                    principal: *principal,
                    change: AuthorizationChange::Removed,
                });
            }
        }
        Ok(changes)
    }
}

fn check_principals(principals: &[Principal]) -> Result<(), GroveError> {
    if principals.iter().any(Principal::is_zero) {
        return Err(GroveError::InvalidInput(
            "the null principal cannot be authorized".to_string(),
        ));
    }
    Ok(())
}
