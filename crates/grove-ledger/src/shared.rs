// crates/grove-ledger/src/shared.rs
//
// SharedLedger: the ledger behind one async read-write lock.
//
// All mutations take the write lock for their whole duration, so no two
// mutations interleave. Queries take the read lock and see a consistent
// state. Closures passed to `read`/`write` run synchronously; nothing awaits
// while the lock is held.

use std::sync::Arc;

use tokio::sync::RwLock;

use grove_core::error::GroveError;
use grove_core::event::ReasonCode;
use grove_core::identity::Principal;

use crate::ledger::IncentiveLedger;
use crate::platform::RedemptionReceipt;

#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<IncentiveLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: IncentiveLedger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Run a query under the read lock.
    pub async fn read<R>(&self, f: impl FnOnce(&IncentiveLedger) -> R) -> R {
        let guard = self.inner.read().await;
        f(&*guard)
    }

    /// Run a mutation under the write lock.
    pub async fn write<R>(&self, f: impl FnOnce(&mut IncentiveLedger) -> R) -> R {
        let mut guard = self.inner.write().await;
        f(&mut *guard)
    }

    pub async fn reward(
        &self,
        caller: Principal,
        recipient: Principal,
        amount: u64,
        reason: ReasonCode,
    ) -> Result<u64, GroveError> {
        self.write(|l| l.reward(&caller, recipient, amount, reason)).await
    }

    pub async fn redeem(
        &self,
        caller: Principal,
        amount: u64,
        reason: ReasonCode,
    ) -> Result<u64, GroveError> {
        self.write(|l| l.redeem(&caller, amount, reason)).await
    }

    /// Allowance pull and debit in one write-lock entry.
    pub async fn redeem_credits(
        &self,
        caller: Principal,
        amount: u64,
    ) -> Result<RedemptionReceipt, GroveError> {
        self.write(|l| l.redeem_credits(&caller, amount)).await
    }

    pub async fn balance_of(&self, principal: Principal) -> u64 {
        self.read(|l| l.balance_of(&principal)).await
    }

    pub async fn total_supply(&self) -> u64 {
        self.read(|l| l.total_supply()).await
    }
}
