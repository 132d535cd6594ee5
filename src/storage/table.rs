use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::error::{CipherError, TableError};
use crate::shard::cipher::{self, ClusterSecret};
use crate::shard::codec::{self, composite_key};

/// Outcome of merging a foreign snapshot into the local table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Entries that were absent locally and got inserted.
    pub inserted: usize,
    /// Entries left untouched because the composite key already existed.
    pub skipped: usize,
}

/// The node's in-memory fragment store.
///
/// Maps composite keys (`<key>:<index>`) to sealed fragments. One reader/writer
/// lock guards the map: `get` and `snapshot` read, `put` and `merge_missing` write.
/// Encryption, decryption and network I/O always happen outside the lock.
pub struct FragmentTable {
    entries: RwLock<HashMap<String, Vec<u8>>>,
    shard_count: usize,
    secret: ClusterSecret,
}

impl FragmentTable {
    pub fn new(shard_count: usize, secret: ClusterSecret) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            shard_count,
            secret,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Splits, seals and stores `value` under `key`.
    ///
    /// All fragments are written in one critical section, so concurrent readers
    /// observe either none or all of them. On error nothing is written.
    pub async fn put(&self, key: &str, value: &[u8]) -> Result<(), TableError> {
        let sealed = codec::split(value, self.shard_count)
            .iter()
            .enumerate()
            .map(|(index, fragment)| {
                cipher::encrypt(fragment, &self.secret).map(|blob| (composite_key(key, index), blob))
            })
            .collect::<Result<Vec<_>, CipherError>>()?;

        let mut entries = self.entries.write().await;
        entries.extend(sealed);
        drop(entries);

        tracing::debug!("PUT: stored {} fragments for key {}", self.shard_count, key);
        Ok(())
    }

    /// Reads, opens and reassembles the value stored under `key`.
    ///
    /// Returns `Ok(None)` when no fragment of `key` exists. Any fragment that
    /// fails to decrypt fails the whole read, as does a partially present set.
    pub async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TableError> {
        let sealed: Vec<(String, Option<Vec<u8>>)> = {
            let entries = self.entries.read().await;
            (0..self.shard_count)
                .map(|index| {
                    let ck = composite_key(key, index);
                    let blob = entries.get(&ck).cloned();
                    (ck, blob)
                })
                .collect()
        };

        if sealed.iter().all(|(_, blob)| blob.is_none()) {
            return Ok(None);
        }

        let mut fragments = Vec::with_capacity(sealed.len());
        for (ck, blob) in sealed {
            let fragment = match blob {
                Some(blob) => Some(cipher::decrypt(&blob, &self.secret).map_err(|source| {
                    TableError::Decryption {
                        composite_key: ck,
                        source,
                    }
                })?),
                None => None,
            };
            fragments.push(fragment);
        }

        codec::reassemble(&fragments)
            .map(Some)
            .map_err(|source| TableError::Incomplete {
                key: key.to_string(),
                source,
            })
    }

    /// Copy of every stored entry, still sealed.
    pub async fn snapshot(&self) -> HashMap<String, Vec<u8>> {
        self.entries.read().await.clone()
    }

    /// Inserts every foreign entry whose composite key is absent locally.
    ///
    /// Existing entries are never overwritten (first writer wins). Applying the
    /// same snapshot again is a no-op.
    pub async fn merge_missing(&self, foreign: HashMap<String, Vec<u8>>) -> MergeReport {
        let mut report = MergeReport::default();
        let mut entries = self.entries.write().await;

        for (ck, blob) in foreign {
            if entries.contains_key(&ck) {
                report.skipped += 1;
            } else {
                entries.insert(ck, blob);
                report.inserted += 1;
            }
        }

        report
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
