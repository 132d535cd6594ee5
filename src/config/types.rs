use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::shard::cipher::ClusterSecret;
use crate::sync::synchronizer::SyncConfig;

/// Smallest shard count a node accepts; lower values are raised to it.
pub const MIN_SHARD_COUNT: usize = 3;
/// Largest shard count a node accepts; higher values are lowered to it.
pub const MAX_SHARD_COUNT: usize = 1024;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SYNC_INTERVAL_SECS: u64 = 300;
const DEFAULT_SYNC_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    #[serde(default)]
    pub node_id: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub peer_nodes: Vec<String>,
    pub secret_key: String,
    #[serde(default = "default_shard_count")]
    pub shard_count: usize,
    #[serde(default = "default_sync_interval_secs")]
    pub sync_interval_secs: u64,
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_shard_count() -> usize {
    MIN_SHARD_COUNT
}

fn default_sync_interval_secs() -> u64 {
    DEFAULT_SYNC_INTERVAL_SECS
}

fn default_sync_timeout_secs() -> u64 {
    DEFAULT_SYNC_TIMEOUT_SECS
}

impl NodeConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a config from its JSON text.
    ///
    /// Applies the same normalisation as `load`: a shard count outside
    /// `MIN_SHARD_COUNT..=MAX_SHARD_COUNT` is clamped, and an empty `node_id`
    /// gets a random UUID.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: NodeConfig = serde_json::from_str(raw)?;
        config.validated()
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        if let Some(index) = self.peer_nodes.iter().position(|p| p.trim().is_empty()) {
            return Err(ConfigError::EmptyPeerAddress { index });
        }

        if self.sync_interval_secs == 0 {
            return Err(ConfigError::ZeroSyncInterval);
        }

        if self.shard_count < MIN_SHARD_COUNT {
            tracing::warn!(
                "shard_count {} below minimum, using {}",
                self.shard_count,
                MIN_SHARD_COUNT
            );
            self.shard_count = MIN_SHARD_COUNT;
        } else if self.shard_count > MAX_SHARD_COUNT {
            tracing::warn!(
                "shard_count {} above maximum, using {}",
                self.shard_count,
                MAX_SHARD_COUNT
            );
            self.shard_count = MAX_SHARD_COUNT;
        }

        if self.node_id.is_empty() {
            self.node_id = uuid::Uuid::new_v4().to_string();
        }

        if !self.cluster_secret().is_valid_length() {
            // Not fatal here: every encrypt/decrypt will report InvalidKeyLength.
            tracing::warn!(
                "secret_key is {} bytes; fragment encryption needs 16, 24 or 32",
                self.secret_key.len()
            );
        }

        Ok(self)
    }

    pub fn cluster_secret(&self) -> ClusterSecret {
        ClusterSecret::new(self.secret_key.as_bytes().to_vec())
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            interval: Duration::from_secs(self.sync_interval_secs),
            request_timeout: Duration::from_secs(self.sync_timeout_secs),
            ..SyncConfig::default()
        }
    }
}
