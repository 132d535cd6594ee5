//! Anti-Entropy Module
//!
//! Background replication between nodes. Every node periodically pulls the full
//! fragment table of each peer and fills its own gaps, which makes the cluster
//! converge for any fixed set of non-conflicting writes.
//!
//! Divergent values written under the same key on different nodes are never
//! reconciled: the merge is first-writer-wins per composite key.

pub mod synchronizer;

pub use synchronizer::{CycleReport, SyncConfig, SyncState, Synchronizer};
