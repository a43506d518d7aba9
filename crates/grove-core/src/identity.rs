// crates/grove-core/src/identity.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::GroveError;

/// Identity of an account on the Grove ledger.
///
/// A 32-byte identifier playing the role of a wallet address. The owner,
/// authorized minters, credit holders and claim holders are all principals.
/// Serialized as a lowercase 64-character hex string.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Principal([u8; 32]);

impl Principal {
    /// The null identity. Never a valid recipient.
    pub const ZERO: Principal = Principal([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a principal from a human-readable handle: SHA-256(handle).
    pub fn from_handle(handle: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(handle.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Parse either a 64-character hex principal or, failing that, treat the
    /// input as a handle.
    pub fn resolve(input: &str) -> Self {
        input
            .parse()
            .unwrap_or_else(|_| Self::from_handle(input))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for Principal {
    type Err = GroveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 64 {
            return Err(GroveError::InvalidInput(format!(
                "principal must be 64 hex characters, got {}",
                s.len()
            )));
        }
        let bytes = hex::decode(s)
            .map_err(|e| GroveError::InvalidInput(format!("principal is not hex: {}", e)))?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable.
        write!(f, "Principal({}..)", &self.to_hex()[..8])
    }
}

impl Serialize for Principal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
