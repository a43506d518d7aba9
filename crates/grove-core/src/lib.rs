// crates/grove-core/src/lib.rs
//
// grove-core: Core types shared by every crate in the Grove workspace.
//
// This is the leaf crate. It defines principal identities, reason codes,
// the audit event vocabulary, the protocol-wide error type, and the
// persistence trait implemented by grove-store.

pub mod error;
pub mod event;
pub mod identity;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
// Usage: `use grove_core::Principal;`

// Identity types
pub use identity::Principal;

// Event types
pub use event::{AuthorizationChange, LedgerEvent, LedgerEventKind, ReasonCode};

// Error type
pub use error::GroveError;

// Traits
pub use traits::SnapshotStore;
