// crates/grove-daemon/src/persist.rs
//
// Loading the ledger at startup, flushing it after each mutation, and serving
// audit history that has already left memory.

use std::sync::Arc;

use serde_json::Value;

use grove_core::error::GroveError;
use grove_core::event::LedgerEvent;
use grove_core::identity::Principal;
use grove_core::traits::SnapshotStore;
use grove_ledger::{IncentiveLedger, LedgerParams, LedgerSnapshot, SharedLedger};

/// Restore the ledger from `store`, or create a fresh one if the store is empty.
pub fn load_ledger(
    store: &dyn SnapshotStore,
    owner: Principal,
    params: LedgerParams,
) -> Result<IncentiveLedger, GroveError> {
    match store.load_snapshot()? {
        Some(bytes) => {
            let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
            if snapshot.owner != owner {
                tracing::warn!(
                    configured = %owner,
                    stored = %snapshot.owner,
                    "Configured owner differs from stored ledger owner; keeping stored owner"
                );
            }
            IncentiveLedger::restore(snapshot)
        }
        None => {
            tracing::info!(%owner, "No snapshot found; creating a new ledger");
            IncentiveLedger::new(owner, params)
        }
    }
}

/// Writes new events and the latest snapshot to a store.
pub struct Persister {
    store: Arc<dyn SnapshotStore>,
    /// First event sequence number not yet written.
    persisted_seq: u64,
}

impl Persister {
    pub fn new(store: Arc<dyn SnapshotStore>, persisted_seq: u64) -> Self {
        Self {
            store,
            persisted_seq,
        }
    }

    pub fn store(&self) -> &dyn SnapshotStore {
        self.store.as_ref()
    }

    /// Persist everything committed since the last flush, then release the
    /// written events from memory.
    ///
    /// Events go first so a crash between the two writes leaves at worst
    /// events without the matching snapshot, never a snapshot that points
    /// past the event log. On failure nothing is released and the next
    /// flush retries from the same sequence number.
    pub async fn flush(&mut self, ledger: &SharedLedger) -> Result<(), GroveError> {
        let (snapshot, events) = ledger
            .read(|l| (l.snapshot(), l.events_since(self.persisted_seq).to_vec()))
            .await;
        self.store.append_events(&events)?;
        self.store.save_snapshot(&snapshot.to_bytes()?)?;
        let persisted = snapshot.next_event_seq;
        ledger.write(|l| l.discard_events_before(persisted)).await;
        tracing::debug!(
            events = events.len(),
            next_event_seq = persisted,
            "Ledger flushed"
        );
        self.persisted_seq = persisted;
        Ok(())
    }

    /// Acknowledge a mutation only once it is durable.
    ///
    /// A failed flush turns the reply into a `storage` error: the change is
    /// applied in memory but was not written, so it must not be reported as
    /// a success.
    pub async fn confirm(
        &mut self,
        ledger: &SharedLedger,
        result: Result<Value, GroveError>,
    ) -> Result<Value, GroveError> {
        let value = result?;
        if let Err(e) = self.flush(ledger).await {
            tracing::error!("Failed to persist ledger: {}", e);
            return Err(GroveError::Storage(format!(
                "change applied but not persisted: {}",
                e
            )));
        }
        Ok(value)
    }
}

/// Events with `seq >= from`, reading from `archive` for anything older than
/// what the ledger still holds in memory.
pub async fn events_since(
    ledger: &SharedLedger,
    archive: Option<&dyn SnapshotStore>,
    from: u64,
) -> Result<Vec<LedgerEvent>, GroveError> {
    let (retained_from, recent) = ledger
        .read(|l| (l.first_retained_event_seq(), l.events_since(from).to_vec()))
        .await;
    let mut events = Vec::new();
    if from < retained_from {
        if let Some(store) = archive {
            events = store
                .load_events_from(from)?
                .into_iter()
                .take_while(|e| e.seq < retained_from)
                .collect();
        }
    }
    events.extend(recent);
    Ok(events)
}
