//! Fragmented, Encrypted Key-Value Node Library
//!
//! Core of a small multi-node key-value store. Values are split into a fixed
//! number of fragments, each fragment is sealed with AES-GCM under a cluster-wide
//! secret, and nodes pull each other's tables periodically to replicate.
//!
//! ## Modules
//! - **`shard`**: positional fragmentation (`codec`) and per-fragment encryption (`cipher`).
//! - **`storage`**: the in-memory `FragmentTable`, its wire protocol and HTTP handlers.
//! - **`sync`**: the anti-entropy `Synchronizer` that merges peer snapshots.
//! - **`config`**: the immutable per-node `NodeConfig`.
//! - **`node`**: assembles the above into a servable node.
//! - **`error`**: typed error taxonomy.

pub mod config;
pub mod error;
pub mod node;
pub mod shard;
pub mod storage;
pub mod sync;
