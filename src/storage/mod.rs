//! Fragment Storage Module
//!
//! Holds the node's encrypted fragments in memory and exposes them over HTTP.
//!
//! ## Core Concepts
//! - **Fragment Table**: `FragmentTable` maps `<key>:<index>` to sealed fragments behind a
//!   single reader/writer lock. Writes land all fragments of a value at once.
//! - **Merge**: foreign snapshots are merged first-writer-wins; nothing is ever overwritten
//!   or decrypted during a merge.
//! - **Access**: `handlers` implement `/put`, `/get/{key}` and `/sync` on top of the table.
//! - **Persistence**: none. A restarted node repopulates only through anti-entropy.

pub mod handlers;
pub mod protocol;
pub mod table;
