//! Error types shared across the node.
//!
//! `NotFound` is deliberately absent: a missing logical key is reported as
//! `Ok(None)` by the table, not as an error.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the per-fragment authenticated encryption.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("invalid cluster secret length {len} (expected 16, 24 or 32 bytes)")]
    InvalidKeyLength { len: usize },

    #[error("ciphertext too short: {len} bytes, need at least {min}")]
    CiphertextTooShort { len: usize, min: usize },

    #[error("ciphertext failed authentication")]
    AuthenticationFailed,

    #[error("fragment encryption failed")]
    EncryptionFailure,
}

/// Failures while reassembling fragments into a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("missing fragments at indices {missing:?}")]
    MissingFragments { missing: Vec<usize> },
}

/// Failures surfaced by `FragmentTable` reads and writes.
#[derive(Debug, Error)]
pub enum TableError {
    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error("failed to decrypt fragment {composite_key}: {source}")]
    Decryption {
        composite_key: String,
        #[source]
        source: CipherError,
    },

    #[error("value for key {key} is incomplete: {source}")]
    Incomplete {
        key: String,
        #[source]
        source: FragmentError,
    },
}

/// Failures of a single peer fetch. These are logged by the synchronizer and
/// never reach `put`/`get` callers.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("peer {peer} unreachable: {source}")]
    PeerUnreachable {
        peer: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("peer {peer} answered with status {status}")]
    PeerStatus {
        peer: String,
        status: reqwest::StatusCode,
    },

    #[error("malformed snapshot from peer {peer}: {reason}")]
    MalformedPeerResponse { peer: String, reason: String },
}

/// Failures while loading the node configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("secret_key cannot be empty")]
    EmptySecret,

    #[error("peer_nodes[{index}] is empty")]
    EmptyPeerAddress { index: usize },

    #[error("sync_interval_secs must be greater than zero")]
    ZeroSyncInterval,
}
