//! Node Configuration Module
//!
//! Loads the per-node settings (identity, port, peers, cluster secret, shard count,
//! sync cadence) from a JSON file. The resulting `NodeConfig` is immutable and is
//! handed to every component at construction.

pub mod types;

pub use types::NodeConfig;
