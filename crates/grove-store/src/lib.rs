// crates/grove-store/src/lib.rs
//
// grove-store: Storage layer for the Grove incentive ledger.
//
// Provides a RocksDB-backed `SnapshotStore` holding the latest ledger
// snapshot and the append-only audit event log.

pub mod rocks;

// Re-export key types for ergonomic access from downstream crates.
pub use rocks::RocksLedgerStore;
