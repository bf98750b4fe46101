//! SDK configuration
//!
//! Holds the node endpoint, address version and follower tuning. The
//! address version is also kept process-wide so that address helpers
//! without an explicit version argument agree with the loaded config.

use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Address version byte of NEO mainnet and testnet
pub const DEFAULT_ADDRESS_VERSION: u8 = 23;

pub const DEFAULT_RPC_URL: &str = "http://seed1.neo.org:10332";

static ADDRESS_VERSION: AtomicU8 = AtomicU8::new(DEFAULT_ADDRESS_VERSION);

/// Current process-wide address version
pub fn address_version() -> u8 {
    ADDRESS_VERSION.load(Ordering::Relaxed)
}

/// Replace the process-wide address version
pub fn set_address_version(version: u8) {
    ADDRESS_VERSION.store(version, Ordering::Relaxed);
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// SDK configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    pub address_version: u8,
    /// Per-request timeout
    pub rpc_timeout_secs: u64,
    /// Block follower polling interval
    pub poll_interval_ms: u64,
    /// Bounded capacity of the follower's delivery channel
    pub follower_channel_capacity: usize,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            address_version: DEFAULT_ADDRESS_VERSION,
            rpc_timeout_secs: 60,
            poll_interval_ms: 3000,
            follower_channel_capacity: 64,
        }
    }
}

impl SdkConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Save as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Install this config's address version process-wide
    pub fn apply(&self) {
        set_address_version(self.address_version);
        log::debug!("Address version set to {}", self.address_version);
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
