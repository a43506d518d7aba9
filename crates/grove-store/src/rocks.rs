// crates/grove-store/src/rocks.rs
//
// RocksDB-backed persistence for the ledger.
//
// Key format:
//   - Snapshot: `snapshot:latest`        -> JSON-serialized ledger snapshot
//   - Events:   `event:{seq:020}`        -> JSON-serialized LedgerEvent
//
// Sequence numbers are zero-padded so lexicographic key order equals
// sequence order, which lets `load_events` use a single prefix scan.

use rocksdb::{DBWithThreadMode, Direction, IteratorMode, MultiThreaded, Options, WriteBatch};

use grove_core::error::GroveError;
use grove_core::event::LedgerEvent;
use grove_core::traits::SnapshotStore;

const SNAPSHOT_KEY: &[u8] = b"snapshot:latest";
const EVENT_PREFIX: &str = "event:";

/// RocksDB wrapper implementing the `SnapshotStore` trait.
#[derive(Debug)]
pub struct RocksLedgerStore {
    db: DBWithThreadMode<MultiThreaded>,
}

impl RocksLedgerStore {
    /// Open a RocksDB database at the given filesystem path.
    ///
    /// Creates the database directory if it does not exist.
    pub fn open(path: &str) -> Result<Self, GroveError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path).map_err(|e| {
            GroveError::Storage(format!("Failed to open RocksDB at {}: {}", path, e))
        })?;

        tracing::debug!(path, "Opened ledger store");
        Ok(Self { db })
    }

    /// Build the key for an event: `event:{seq:020}`.
    fn event_key(seq: u64) -> Vec<u8> {
        format!("{}{:020}", EVENT_PREFIX, seq).into_bytes()
    }
}

impl SnapshotStore for RocksLedgerStore {
    fn save_snapshot(&self, bytes: &[u8]) -> Result<(), GroveError> {
        self.db
            .put(SNAPSHOT_KEY, bytes)
            .map_err(|e| GroveError::Storage(format!("RocksDB put failed: {}", e)))
    }

    fn load_snapshot(&self) -> Result<Option<Vec<u8>>, GroveError> {
        self.db
            .get(SNAPSHOT_KEY)
            .map_err(|e| GroveError::Storage(format!("RocksDB get failed: {}", e)))
    }

    fn append_events(&self, events: &[LedgerEvent]) -> Result<(), GroveError> {
        if events.is_empty() {
            return Ok(());
        }
        let mut batch = WriteBatch::default();
        for event in events {
            batch.put(Self::event_key(event.seq), serde_json::to_vec(event)?);
        }
        self.db
            .write(batch)
            .map_err(|e| GroveError::Storage(format!("RocksDB batch write failed: {}", e)))
    }

    fn load_events(&self) -> Result<Vec<LedgerEvent>, GroveError> {
        let prefix = EVENT_PREFIX.as_bytes();
        let mut events = Vec::new();

        for item in self.db.prefix_iterator(prefix) {
            let (key, value) = item
                .map_err(|e| GroveError::Storage(format!("RocksDB iteration error: {}", e)))?;

            // Stop when the prefix no longer matches.
            if !key.starts_with(prefix) {
                break;
            }
            events.push(serde_json::from_slice(&value)?);
        }
        Ok(events)
    }

    fn load_events_from(&self, from: u64) -> Result<Vec<LedgerEvent>, GroveError> {
        let prefix = EVENT_PREFIX.as_bytes();
        let start = Self::event_key(from);
        let mut events = Vec::new();

        for item in self.db.iterator(IteratorMode::From(&start, Direction::Forward)) {
            let (key, value) = item
                .map_err(|e| GroveError::Storage(format!("RocksDB iteration error: {}", e)))?;
            if !key.starts_with(prefix) {
                break;
            }
            events.push(serde_json::from_slice(&value)?);
        }
        Ok(events)
    }
}
