// crates/grove-core/src/traits.rs

use crate::error::GroveError;
use crate::event::LedgerEvent;

/// Trait for durable ledger persistence.
///
/// Implemented by grove-store (RocksDB backend). Snapshots are opaque bytes
/// so the store does not depend on the ledger crate's types.
pub trait SnapshotStore: Send + Sync {
    /// Replace the latest snapshot.
    fn save_snapshot(&self, bytes: &[u8]) -> Result<(), GroveError>;

    /// Load the latest snapshot, if one was ever saved.
    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, GroveError>;

    /// Append events to the audit log. Events already present (same `seq`)
    /// are overwritten with identical content.
    fn append_events(&self, events: &[LedgerEvent]) -> Result<(), GroveError>;

    /// Load the full audit log in sequence order.
    fn load_events(&self) -> Result<Vec<LedgerEvent>, GroveError>;

    /// Load stored events with `seq >= from`, in sequence order.
    fn load_events_from(&self, from: u64) -> Result<Vec<LedgerEvent>, GroveError> {
        let mut events = self.load_events()?;
        events.retain(|e| e.seq >= from);
        Ok(events)
    }
}
