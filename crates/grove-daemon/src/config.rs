// crates/grove-daemon/src/config.rs
//
// Runtime configuration for the Grove ledger daemon.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;
use std::io;

use grove_core::error::GroveError;
use grove_core::identity::Principal;
use grove_ledger::LedgerParams;

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, Deserialize)]
pub struct DaemonConfig {
    /// Ledger owner: a 64-char hex principal or a handle.
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Persist snapshots and events after every successful mutation.
    #[serde(default = "default_persist")]
    pub persist: bool,

    /// Ledger policy. Only consulted when no snapshot exists yet; a restored
    /// ledger keeps the params it was created with.
    #[serde(default)]
    pub ledger: LedgerParams,
}

fn default_owner() -> String {
    "owner".to_string()
}

fn default_data_dir() -> String {
    "~/.grove/data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_persist() -> bool {
    true
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            persist: default_persist(),
            ledger: LedgerParams::default(),
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns `Ok(None)` if the file does not exist. A file that exists but
    /// cannot be read, parsed, or validated is an error.
    pub fn load(path: &str) -> Result<Option<Self>, GroveError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(GroveError::Config(format!("Cannot read {}: {}", path, e))),
        };
        Self::parse(&contents).map(Some)
    }

    pub fn parse(contents: &str) -> Result<Self, GroveError> {
        let config: DaemonConfig = toml::from_str(contents)
            .map_err(|e| GroveError::Config(format!("Invalid TOML: {}", e)))?;
        config.ledger.validate()?;
        Ok(config)
    }

    pub fn owner_principal(&self) -> Principal {
        Principal::resolve(&self.owner)
    }
}
