//! Fragment Module
//!
//! Pure, lock-free building blocks of the write and read paths.
//!
//! ## Core Concepts
//! - **Fragmentation**: `codec` splits a value into a fixed number of positional
//!   fragments and concatenates them back. Fragment indices are positions, never hashes.
//! - **Sealing**: `cipher` encrypts each fragment on its own with AES-GCM under the
//!   shared cluster secret, prepending a fresh random nonce.

pub mod cipher;
pub mod codec;
