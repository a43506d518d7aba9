// crates/grove-ledger/src/ledger.rs
//
// IncentiveLedger: the single owner of all mutable incentive state.
//
// Holds the authorization set, reward balances, adoption claims, platform
// allowances and counters behind one `&mut self` boundary. Every mutating
// method runs all of its precondition checks first and only then commits, so
// a returned error always means no state changed and no event was recorded.
//
// Concurrent access goes through `SharedLedger` (see shared.rs), which wraps
// the whole ledger in one lock rather than locking per field.

use grove_core::error::GroveError;
use grove_core::event::{LedgerEvent, LedgerEventKind, ReasonCode};
use grove_core::identity::Principal;

use crate::adoption::{AdoptionClaim, AdoptionRegistry};
use crate::authorization::AuthorizationRegistry;
use crate::events::EventLog;
use crate::params::LedgerParams;
use crate::platform::{PlatformOrchestrator, RedemptionReceipt};
use crate::rate::RateTable;
use crate::rewards::{Account, RewardEntry, RewardLedger};

pub struct IncentiveLedger {
    pub(crate) params: LedgerParams,
    pub(crate) auth: AuthorizationRegistry,
    pub(crate) rewards: RewardLedger,
    pub(crate) rates: RateTable,
    pub(crate) adoption: AdoptionRegistry,
    pub(crate) platform: PlatformOrchestrator,
    pub(crate) events: EventLog,
}

/// Log a rejected operation at debug level and pass the result through.
fn traced<T>(
    op: &'static str,
    caller: &Principal,
    result: Result<T, GroveError>,
) -> Result<T, GroveError> {
    if let Err(e) = &result {
        tracing::debug!(op, %caller, error = %e, "Ledger operation rejected");
    }
    result
}

impl IncentiveLedger {
    /// Create an empty ledger owned by `owner`.
    ///
    /// # Errors
    /// `InvalidRecipient` for a null owner, `InvalidInput` for bad params.
    pub fn new(owner: Principal, params: LedgerParams) -> Result<Self, GroveError> {
        if owner.is_zero() {
            return Err(GroveError::InvalidRecipient(
                "ledger owner cannot be the null principal".to_string(),
            ));
        }
        let rates = params.validate()?;
        Ok(Self::assemble(owner, params, rates, EventLog::new()))
    }

    pub(crate) fn assemble(
        owner: Principal,
        params: LedgerParams,
        rates: RateTable,
        events: EventLog,
    ) -> Self {
        Self {
            auth: AuthorizationRegistry::new(owner),
            rewards: RewardLedger::new(
                params.max_supply,
                params.min_redeem_amount,
                params.redeem_policy,
            ),
            rates,
            adoption: AdoptionRegistry::new(),
            platform: PlatformOrchestrator::new(params.reward_percent),
            events,
            params,
        }
    }

    pub fn owner(&self) -> Principal {
        self.auth.owner()
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    // -----------------------------------------------------------------------
    // Authorization
    // -----------------------------------------------------------------------

    pub fn add_authorized(
        &mut self,
        caller: &Principal,
        principal: Principal,
    ) -> Result<(), GroveError> {
        self.batch_add_authorized(caller, &[principal])
    }

    pub fn remove_authorized(
        &mut self,
        caller: &Principal,
        principal: Principal,
    ) -> Result<(), GroveError> {
        self.batch_remove_authorized(caller, &[principal])
    }

    /// Add every principal or none.
    pub fn batch_add_authorized(
        &mut self,
        caller: &Principal,
        principals: &[Principal],
    ) -> Result<(), GroveError> {
        let changes = traced("add_authorized", caller, self.auth.add(caller, principals))?;
        self.events.record_all(changes);
        Ok(())
    }

    pub fn batch_remove_authorized(
        &mut self,
        caller: &Principal,
        principals: &[Principal],
    ) -> Result<(), GroveError> {
        let changes = traced("remove_authorized", caller, self.auth.remove(caller, principals))?;
        self.events.record_all(changes);
        Ok(())
    }

    /// Whether `principal` may call `reward`/`batch_reward`. The owner always may.
    pub fn is_authorized(&self, principal: &Principal) -> bool {
        self.auth.has_permission(principal)
    }

    pub fn authorized_principals(&self) -> Vec<Principal> {
        self.auth.members()
    }

    // -----------------------------------------------------------------------
    // Reward ledger
    // -----------------------------------------------------------------------

    /// Mint `amount` new credits to `recipient`. Returns the recipient's new balance.
    ///
    /// # Errors
    /// `NotAuthorized`, `InvalidInput` (zero amount), `InvalidRecipient`,
    /// `CapExceeded`.
    pub fn reward(
        &mut self,
        caller: &Principal,
        recipient: Principal,
        amount: u64,
        reason: ReasonCode,
    ) -> Result<u64, GroveError> {
        traced("reward", caller, self.check_reward(caller, &recipient, amount))?;
        Ok(self.commit_reward(recipient, amount, reason))
    }

    fn check_reward(
        &self,
        caller: &Principal,
        recipient: &Principal,
        amount: u64,
    ) -> Result<(), GroveError> {
        self.auth.ensure_permission(caller)?;
        self.rewards.check_credit(recipient, amount)
    }

    fn commit_reward(&mut self, recipient: Principal, amount: u64, reason: ReasonCode) -> u64 {
        let balance = self.rewards.credit(recipient, amount);
        self.events.record(LedgerEventKind::Rewarded {
            recipient,
            amount,
            reason,
        });
        balance
    }

    /// Apply every entry in order, or none. Returns the aggregate minted.
    pub fn batch_reward(
        &mut self,
        caller: &Principal,
        entries: &[RewardEntry],
    ) -> Result<u64, GroveError> {
        let total = traced("batch_reward", caller, {
            self.auth
                .ensure_permission(caller)
                .and_then(|_| self.rewards.check_batch(entries))
        })?;
        for entry in entries {
            self.commit_reward(entry.recipient, entry.amount, entry.reason);
        }
        Ok(total)
    }

    /// Redeem `amount` of the caller's own credits. Returns the new balance.
    ///
    /// # Errors
    /// `AmountBelowMinimum`, `InsufficientBalance`.
    pub fn redeem(
        &mut self,
        caller: &Principal,
        amount: u64,
        reason: ReasonCode,
    ) -> Result<u64, GroveError> {
        traced("redeem", caller, self.rewards.check_debit(caller, amount))?;
        Ok(self.commit_redeem(*caller, amount, reason))
    }

    fn commit_redeem(&mut self, account: Principal, amount: u64, reason: ReasonCode) -> u64 {
        let balance = self.rewards.debit(account, amount);
        self.events.record(LedgerEventKind::Redeemed {
            account,
            amount,
            reason,
        });
        balance
    }

    pub fn balance_of(&self, principal: &Principal) -> u64 {
        self.rewards.balance_of(principal)
    }

    pub fn account(&self, principal: &Principal) -> Account {
        self.rewards.account(principal)
    }

    pub fn total_supply(&self) -> u64 {
        self.rewards.total_supply()
    }

    pub fn max_supply(&self) -> u64 {
        self.rewards.max_supply()
    }

    pub fn remaining_supply(&self) -> u64 {
        self.rewards.remaining_supply()
    }

    pub fn pool_balance(&self) -> u64 {
        self.rewards.pool_balance()
    }

    // -----------------------------------------------------------------------
    // Platform orchestrator
    // -----------------------------------------------------------------------

    /// Reward a purchase: credits `reward_percent`% of `fiat_amount_cents`
    /// under the platform purchase reason code. Owner only. Returns the
    /// credits minted.
    pub fn reward_user(
        &mut self,
        caller: &Principal,
        recipient: Principal,
        fiat_amount_cents: u64,
    ) -> Result<u64, GroveError> {
        let credits = traced("reward_user", caller, {
            self.auth
                .ensure_owner(caller)
                .and_then(|_| self.platform.credit_amount(fiat_amount_cents))
                .and_then(|credits| {
                    self.check_reward(caller, &recipient, credits)
                        .map(|_| credits)
                })
        })?;
        self.commit_reward(recipient, credits, ReasonCode::PLATFORM_PURCHASE);
        Ok(credits)
    }

    /// Let the platform pull up to `amount` of the caller's credits.
    pub fn approve_platform(&mut self, caller: &Principal, amount: u64) -> Result<(), GroveError> {
        if caller.is_zero() {
            return traced(
                "approve_platform",
                caller,
                Err(GroveError::InvalidInput("null principal cannot approve".to_string())),
            );
        }
        self.platform.approve(*caller, amount);
        self.events.record(LedgerEventKind::PlatformApproval {
            account: *caller,
            amount,
        });
        Ok(())
    }

    pub fn platform_allowance(&self, principal: &Principal) -> u64 {
        self.platform.allowance(principal)
    }

    /// Pull `amount` from the caller through the platform and redeem it.
    ///
    /// Allowance, floor and balance are all checked before anything is
    /// written; the allowance pull and the debit commit together. The
    /// multiplier reported is the tier of the cumulative total including this
    /// redemption.
    ///
    /// # Errors
    /// `AmountBelowMinimum`, `InsufficientBalance`, `InsufficientAllowance`.
    pub fn redeem_credits(
        &mut self,
        caller: &Principal,
        amount: u64,
    ) -> Result<RedemptionReceipt, GroveError> {
        traced("redeem_credits", caller, {
            self.rewards
                .check_debit(caller, amount)
                .and_then(|_| self.platform.check_pull(caller, amount))
        })?;
        let total_redeemed = self.platform.record_pull(*caller, amount);
        let balance_after = self.commit_redeem(*caller, amount, ReasonCode::REDEMPTION);
        let multiplier = self.rates.rate_for(total_redeemed);
        tracing::debug!(
            account = %caller,
            total_redeemed,
            multiplier,
            "Platform redemption tier"
        );
        Ok(RedemptionReceipt {
            account: *caller,
            amount,
            total_redeemed,
            multiplier,
            balance_after,
        })
    }

    /// Cumulative platform-routed redemptions for `principal`.
    pub fn total_redeemed(&self, principal: &Principal) -> u64 {
        self.platform.total_redeemed(principal)
    }

    /// Current multiplier for `principal`'s platform redemption history.
    pub fn exchange_rate(&self, principal: &Principal) -> u64 {
        self.rates.rate_for(self.platform.total_redeemed(principal))
    }

    /// Direct access to the rate engine.
    pub fn rate(&self, cumulative_redeemed: i64) -> Result<u64, GroveError> {
        self.rates.rate(cumulative_redeemed)
    }

    pub fn rate_table(&self) -> &RateTable {
        &self.rates
    }

    // -----------------------------------------------------------------------
    // Adoption registry
    // -----------------------------------------------------------------------

    /// Issue the adoption claim for `tree_id`. Owner only. Returns the token id.
    ///
    /// # Errors
    /// `NotAuthorized`, `InvalidRecipient`, `AlreadyClaimed`.
    pub fn mint(
        &mut self,
        caller: &Principal,
        recipient: Principal,
        tree_id: u64,
        metadata_uri: impl Into<String>,
    ) -> Result<u64, GroveError> {
        traced("mint", caller, {
            self.auth
                .ensure_owner(caller)
                .and_then(|_| self.adoption.check_mint(&recipient, tree_id))
        })?;
        let (token_id, event) = self.adoption.mint(recipient, tree_id, metadata_uri.into());
        self.events.record(event);
        Ok(token_id)
    }

    pub fn is_tree_adopted(&self, tree_id: u64) -> bool {
        self.adoption.is_tree_adopted(tree_id)
    }

    pub fn tree_id(&self, token_id: u64) -> Result<u64, GroveError> {
        self.adoption.tree_id(token_id)
    }

    pub fn token_uri(&self, token_id: u64) -> Result<&str, GroveError> {
        self.adoption.token_uri(token_id)
    }

    pub fn owner_of(&self, token_id: u64) -> Result<Principal, GroveError> {
        self.adoption.owner_of(token_id)
    }

    pub fn claim(&self, token_id: u64) -> Result<&AdoptionClaim, GroveError> {
        self.adoption.claim(token_id)
    }

    pub fn claims_of(&self, owner: &Principal) -> Vec<u64> {
        self.adoption.claims_of(owner)
    }

    pub fn total_claims(&self) -> usize {
        self.adoption.total_claims()
    }

    pub fn next_token_id(&self) -> u64 {
        self.adoption.next_token_id()
    }

    // -----------------------------------------------------------------------
    // Audit log
    // -----------------------------------------------------------------------

    pub fn events(&self) -> &[LedgerEvent] {
        self.events.events()
    }

    pub fn events_since(&self, seq: u64) -> &[LedgerEvent] {
        self.events.since(seq)
    }

    pub fn next_event_seq(&self) -> u64 {
        self.events.next_seq()
    }

    /// Oldest sequence number `events_since` can still serve from memory.
    pub fn first_retained_event_seq(&self) -> u64 {
        self.events.first_retained_seq()
    }

    /// Release events with `seq < seq` once they are stored elsewhere.
    pub fn discard_events_before(&mut self, seq: u64) {
        self.events.discard_before(seq);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RedeemPolicy;
    use proptest::prelude::*;

    fn owner() -> Principal {
        Principal::from_handle("owner")
    }

    fn user(name: &str) -> Principal {
        Principal::from_handle(name)
    }

    fn ledger() -> IncentiveLedger {
        IncentiveLedger::new(owner(), LedgerParams::default()).unwrap()
    }

    fn entry(name: &str, amount: u64) -> RewardEntry {
        RewardEntry {
            recipient: user(name),
            amount,
            reason: ReasonCode::ACHIEVEMENT,
        }
    }

    #[test]
    fn test_null_owner_rejected() {
        assert!(IncentiveLedger::new(Principal::ZERO, LedgerParams::default()).is_err());
    }

    #[test]
    fn test_owner_reward() {
        let mut ledger = ledger();
        assert_eq!(ledger.reward(&owner(), user("u1"), 50, ReasonCode(1)).unwrap(), 50);
        assert_eq!(ledger.balance_of(&user("u1")), 50);
        assert_eq!(ledger.total_supply(), 50);
    }

    #[test]
    fn test_unauthorized_reward() {
        let mut ledger = ledger();
        let err = ledger
            .reward(&user("stranger"), user("u2"), 100, ReasonCode(2))
            .unwrap_err();
        assert!(matches!(err, GroveError::NotAuthorized(_)));
        assert_eq!(ledger.balance_of(&user("u2")), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_authorized_principal_can_reward_until_removed() {
        let mut ledger = ledger();
        ledger.add_authorized(&owner(), user("minter")).unwrap();
        ledger.reward(&user("minter"), user("u1"), 5, ReasonCode::REFERRAL).unwrap();
        ledger.remove_authorized(&owner(), user("minter")).unwrap();
        assert!(ledger
            .reward(&user("minter"), user("u1"), 5, ReasonCode::REFERRAL)
            .is_err());
        assert_eq!(ledger.balance_of(&user("u1")), 5);
    }

    #[test]
    fn test_cap_scenario() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u1"), 10_000_000, ReasonCode(1)).unwrap();
        let err = ledger.reward(&owner(), user("u2"), 1, ReasonCode(2)).unwrap_err();
        assert!(matches!(err, GroveError::CapExceeded { .. }));
        assert_eq!(ledger.total_supply(), 10_000_000);
        assert_eq!(ledger.balance_of(&user("u2")), 0);
    }

    #[test]
    fn test_redeem_scenarios() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u1"), 100, ReasonCode(2)).unwrap();
        assert!(matches!(
            ledger.redeem(&user("u1"), 10, ReasonCode(10)),
            Err(GroveError::AmountBelowMinimum { .. })
        ));
        assert_eq!(ledger.balance_of(&user("u1")), 100);
        assert_eq!(ledger.redeem(&user("u1"), 20, ReasonCode(10)).unwrap(), 80);
        assert_eq!(ledger.balance_of(&user("u1")), 80);
        assert!(matches!(
            ledger.redeem(&user("u1"), 81, ReasonCode(10)),
            Err(GroveError::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.account(&user("u1")).cumulative_redeemed, 20);
    }

    #[test]
    fn test_batch_reward_order_and_events() {
        let mut ledger = ledger();
        let total = ledger
            .batch_reward(&owner(), &[entry("a", 10), entry("b", 20), entry("a", 5)])
            .unwrap();
        assert_eq!(total, 35);
        assert_eq!(ledger.balance_of(&user("a")), 15);
        let amounts: Vec<u64> = ledger
            .events()
            .iter()
            .filter_map(|e| match e.kind {
                LedgerEventKind::Rewarded { amount, .. } => Some(amount),
                _ => None,
            })
            .collect();
        assert_eq!(amounts, vec![10, 20, 5]);
    }

    #[test]
    fn test_batch_reward_all_or_nothing() {
        let params = LedgerParams {
            max_supply: 100,
            ..LedgerParams::default()
        };
        let mut ledger = IncentiveLedger::new(owner(), params).unwrap();
        let err = ledger
            .batch_reward(&owner(), &[entry("a", 60), entry("b", 41)])
            .unwrap_err();
        assert!(matches!(err, GroveError::CapExceeded { .. }));
        assert_eq!(ledger.balance_of(&user("a")), 0);
        assert_eq!(ledger.total_supply(), 0);
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_batch_reward_requires_permission() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.batch_reward(&user("x"), &[entry("a", 1)]),
            Err(GroveError::NotAuthorized(_))
        ));
    }

    #[test]
    fn test_batch_add_authorized_atomic() {
        let mut ledger = ledger();
        assert!(ledger
            .batch_add_authorized(&owner(), &[user("a"), Principal::ZERO])
            .is_err());
        assert!(!ledger.is_authorized(&user("a")));
        ledger
            .batch_add_authorized(&owner(), &[user("a"), user("b")])
            .unwrap();
        assert_eq!(ledger.authorized_principals().len(), 2);
        assert!(ledger.is_authorized(&owner()));
    }

    #[test]
    fn test_reward_user_and_exchange_rate() {
        let mut ledger = ledger();
        assert_eq!(ledger.reward_user(&owner(), user("u"), 100).unwrap(), 10);
        assert_eq!(ledger.balance_of(&user("u")), 10);

        ledger.reward(&owner(), user("u"), 100, ReasonCode(1)).unwrap();
        ledger.approve_platform(&user("u"), 100).unwrap();
        assert_eq!(ledger.exchange_rate(&user("u")), 100);

        let first = ledger.redeem_credits(&user("u"), 50).unwrap();
        assert_eq!(first.multiplier, 100);
        assert_eq!(first.total_redeemed, 50);

        // Crossing into the second tier includes the current redemption.
        let err = ledger.redeem_credits(&user("u"), 1).unwrap_err();
        assert!(matches!(err, GroveError::AmountBelowMinimum { .. }));
        let second = ledger.redeem_credits(&user("u"), 20).unwrap();
        assert_eq!(second.total_redeemed, 70);
        assert_eq!(second.multiplier, 175);
        assert_eq!(ledger.exchange_rate(&user("u")), 175);
        assert_eq!(ledger.balance_of(&user("u")), 40);
        assert_eq!(ledger.platform_allowance(&user("u")), 30);
    }

    #[test]
    fn test_exchange_rate_at_fifty_one() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u"), 51, ReasonCode(1)).unwrap();
        ledger.approve_platform(&user("u"), 51).unwrap();
        let receipt = ledger.redeem_credits(&user("u"), 51).unwrap();
        assert_eq!(receipt.multiplier, 175);
        assert_eq!(ledger.exchange_rate(&user("u")), 175);
    }

    #[test]
    fn test_reward_user_owner_only() {
        let mut ledger = ledger();
        ledger.add_authorized(&owner(), user("minter")).unwrap();
        assert!(matches!(
            ledger.reward_user(&user("minter"), user("u"), 1_000),
            Err(GroveError::NotAuthorized(_))
        ));
    }

    #[test]
    fn test_redeem_credits_without_allowance_changes_nothing() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u"), 100, ReasonCode(1)).unwrap();
        ledger.approve_platform(&user("u"), 10).unwrap();
        let events_before = ledger.events().len();
        assert!(matches!(
            ledger.redeem_credits(&user("u"), 30),
            Err(GroveError::InsufficientAllowance { .. })
        ));
        assert_eq!(ledger.balance_of(&user("u")), 100);
        assert_eq!(ledger.total_redeemed(&user("u")), 0);
        assert_eq!(ledger.platform_allowance(&user("u")), 10);
        assert_eq!(ledger.events().len(), events_before);
    }

    #[test]
    fn test_direct_redeem_does_not_move_tier() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u"), 200, ReasonCode(1)).unwrap();
        ledger.redeem(&user("u"), 100, ReasonCode(10)).unwrap();
        assert_eq!(ledger.exchange_rate(&user("u")), 100);
        assert_eq!(ledger.account(&user("u")).cumulative_redeemed, 100);
    }

    #[test]
    fn test_pool_policy() {
        let params = LedgerParams {
            redeem_policy: RedeemPolicy::Pool,
            ..LedgerParams::default()
        };
        let mut ledger = IncentiveLedger::new(owner(), params).unwrap();
        ledger.reward(&owner(), user("u"), 100, ReasonCode(1)).unwrap();
        ledger.redeem(&user("u"), 40, ReasonCode(10)).unwrap();
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.pool_balance(), 40);
    }

    #[test]
    fn test_mint_scenario() {
        let mut ledger = ledger();
        let token = ledger.mint(&owner(), user("u1"), 1, "ipfs://x").unwrap();
        assert!(matches!(
            ledger.mint(&owner(), user("u2"), 1, "ipfs://y"),
            Err(GroveError::AlreadyClaimed { tree_id: 1, .. })
        ));
        assert!(ledger.is_tree_adopted(1));
        assert!(!ledger.is_tree_adopted(2));
        assert_eq!(ledger.tree_id(token).unwrap(), 1);
        assert_eq!(ledger.token_uri(token).unwrap(), "ipfs://x");
    }

    #[test]
    fn test_mint_guards() {
        let mut ledger = ledger();
        assert!(matches!(
            ledger.mint(&user("u1"), user("u1"), 1, "x"),
            Err(GroveError::NotAuthorized(_))
        ));
        assert!(matches!(
            ledger.mint(&owner(), Principal::ZERO, 1, "x"),
            Err(GroveError::InvalidRecipient(_))
        ));
        assert!(!ledger.is_tree_adopted(1));
        assert_eq!(ledger.next_token_id(), 1);
        assert!(matches!(ledger.tree_id(1), Err(GroveError::NonexistentToken(1))));
        assert!(matches!(ledger.token_uri(1), Err(GroveError::NonexistentToken(1))));
    }

    #[test]
    fn test_events_since() {
        let mut ledger = ledger();
        ledger.reward(&owner(), user("u"), 30, ReasonCode(1)).unwrap();
        ledger.mint(&owner(), user("u"), 5, "ipfs://t").unwrap();
        let tail = ledger.events_since(1);
        assert_eq!(tail.len(), 1);
        assert!(matches!(tail[0].kind, LedgerEventKind::TreeAdopted { tree_id: 5, .. }));
    }

    #[test]
    fn test_zero_redeem_records_nothing() {
        let zero_floor = LedgerParams {
            min_redeem_amount: 0,
            ..LedgerParams::default()
        };
        assert!(IncentiveLedger::new(owner(), zero_floor).is_err());

        let mut ledger = ledger();
        assert!(matches!(
            ledger.redeem(&user("u"), 0, ReasonCode(10)),
            Err(GroveError::AmountBelowMinimum { amount: 0, .. })
        ));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_discarded_events_keep_numbering() {
        let mut ledger = ledger();
        for _ in 0..100 {
            ledger.reward(&owner(), user("u"), 1, ReasonCode(1)).unwrap();
        }
        ledger.discard_events_before(ledger.next_event_seq());
        assert!(ledger.events().is_empty());
        assert_eq!(ledger.first_retained_event_seq(), 100);

        ledger.reward(&owner(), user("u"), 1, ReasonCode(1)).unwrap();
        assert_eq!(ledger.events_since(0).len(), 1);
        assert_eq!(ledger.events_since(0)[0].seq, 100);
    }

    proptest! {
        #[test]
        fn prop_supply_never_exceeds_cap(amounts in proptest::collection::vec(1u64..400, 1..40)) {
            let params = LedgerParams { max_supply: 1_000, ..LedgerParams::default() };
            let mut ledger = IncentiveLedger::new(owner(), params).unwrap();
            for (i, amount) in amounts.iter().enumerate() {
                let recipient = user(&format!("u{}", i % 3));
                let before = ledger.total_supply();
                match ledger.reward(&owner(), recipient, *amount, ReasonCode(1)) {
                    Ok(_) => prop_assert_eq!(ledger.total_supply(), before + amount),
                    Err(_) => prop_assert_eq!(ledger.total_supply(), before),
                }
                prop_assert!(ledger.total_supply() <= 1_000);
            }
        }

        #[test]
        fn prop_batch_is_atomic(
            seed in 0u64..900,
            batch in proptest::collection::vec(1u64..300, 1..8),
        ) {
            let params = LedgerParams { max_supply: 1_000, ..LedgerParams::default() };
            let mut ledger = IncentiveLedger::new(owner(), params).unwrap();
            ledger.reward(&owner(), user("seed"), seed + 1, ReasonCode(1)).unwrap();
            let entries: Vec<RewardEntry> = batch
                .iter()
                .enumerate()
                .map(|(i, amount)| entry(&format!("b{}", i), *amount))
                .collect();
            let aggregate: u64 = batch.iter().sum();
            let result = ledger.batch_reward(&owner(), &entries);
            if seed + 1 + aggregate <= 1_000 {
                prop_assert_eq!(result.unwrap(), aggregate);
            } else {
                prop_assert!(result.is_err());
                for i in 0..entries.len() {
                    prop_assert_eq!(ledger.balance_of(&user(&format!("b{}", i))), 0);
                }
                prop_assert_eq!(ledger.total_supply(), seed + 1);
            }
        }

        #[test]
        fn prop_reward_then_redeem(a in 20u64..10_000, b in 20u64..10_000) {
            prop_assume!(b <= a);
            let mut ledger = ledger();
            ledger.reward(&owner(), user("u"), a, ReasonCode(1)).unwrap();
            ledger.redeem(&user("u"), b, ReasonCode(10)).unwrap();
            prop_assert_eq!(ledger.balance_of(&user("u")), a - b);
        }
    }
}
