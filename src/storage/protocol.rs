//! Storage Network Protocol
//!
//! Defines the HTTP endpoints and Data Transfer Objects (DTOs) of a node:
//! client writes and reads, and the full-table snapshot peers pull during
//! anti-entropy.
//!
//! Ciphertext crosses the wire as standard padded base64. Snapshots from peers
//! may also carry each blob as a plain JSON array of byte values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

// --- API Endpoints ---

/// Public endpoint for client write requests.
pub const ENDPOINT_PUT: &str = "/put";
/// Public endpoint for client read requests (`/get/{key}`, key may contain `/`).
pub const ENDPOINT_GET: &str = "/get";
/// Endpoint serving the full fragment table to peers (Anti-Entropy).
pub const ENDPOINT_SYNC: &str = "/sync";

// --- Data Transfer Objects ---

/// Client write request. The value is stored as its UTF-8 bytes.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutRequest {
    pub key: String,
    pub value: String,
}

/// Acknowledgment for write operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct PutResponse {
    pub success: bool,
}

/// Successful read.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetResponse {
    pub key: String,
    pub value: String,
}

/// Body returned alongside 4xx/5xx statuses.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Full table snapshot: composite key -> sealed fragment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SyncSnapshot {
    #[serde(serialize_with = "serialize_blobs", deserialize_with = "deserialize_blobs")]
    pub entries: HashMap<String, Vec<u8>>,
}

impl From<HashMap<String, Vec<u8>>> for SyncSnapshot {
    fn from(entries: HashMap<String, Vec<u8>>) -> Self {
        Self { entries }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireBlob {
    Base64(String),
    Bytes(Vec<u8>),
}

fn serialize_blobs<S>(entries: &HashMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        entries
            .iter()
            .map(|(key, blob)| (key, STANDARD.encode(blob))),
    )
}

fn deserialize_blobs<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, WireBlob>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, blob)| match blob {
            WireBlob::Bytes(bytes) => Ok((key, bytes)),
            WireBlob::Base64(text) => match STANDARD.decode(text.as_bytes()) {
                Ok(bytes) => Ok((key, bytes)),
                Err(e) => Err(serde::de::Error::custom(format!(
                    "invalid base64 for {}: {}",
                    key, e
                ))),
            },
        })
        .collect()
}
