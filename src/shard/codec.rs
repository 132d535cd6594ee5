use sha2::{Digest, Sha256};

use crate::error::FragmentError;

/// Splits `value` into exactly `shard_count` contiguous fragments.
///
/// Every fragment but the last is `len / shard_count` bytes long; the last one
/// absorbs the remainder. Values shorter than `shard_count` yield leading empty
/// fragments.
pub fn split(value: &[u8], shard_count: usize) -> Vec<Vec<u8>> {
    if shard_count == 0 {
        return Vec::new();
    }

    let chunk_size = value.len() / shard_count;
    (0..shard_count)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == shard_count - 1 {
                value.len()
            } else {
                start + chunk_size
            };
            value[start..end].to_vec()
        })
        .collect()
}

/// Concatenates fragments in index order.
///
/// A `None` slot is a missing fragment and fails the whole reassembly; the
/// error lists every absent index.
pub fn reassemble(fragments: &[Option<Vec<u8>>]) -> Result<Vec<u8>, FragmentError> {
    let missing: Vec<usize> = fragments
        .iter()
        .enumerate()
        .filter(|(_, fragment)| fragment.is_none())
        .map(|(index, _)| index)
        .collect();

    if !missing.is_empty() {
        return Err(FragmentError::MissingFragments { missing });
    }

    Ok(fragments.iter().flatten().flatten().copied().collect())
}

/// Storage key of one fragment: `<logical-key>:<fragment-index>`.
pub fn composite_key(key: &str, index: usize) -> String {
    format!("{}:{}", key, index)
}

/// Hash-derived index in `[0, shard_count)` for a key.
///
/// Placement helper only. The table always stores fragments at their
/// positional `split` index and never consults this.
pub fn assign_fragment_id(key: &str, shard_count: usize) -> usize {
    if shard_count == 0 {
        return 0;
    }
    let digest = Sha256::digest(key.as_bytes());
    digest[0] as usize % shard_count
}
