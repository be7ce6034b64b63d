//! Two-choice bucket derivation.
//!
//! `b1 = H(key) mod B` and `b2 = (b1 ^ H(tag)) mod B`. Because the second
//! choice only mixes in the tag, either bucket can be recomputed from the
//! other and the tag alone.

use xxhash_rust::xxh3::xxh3_64;

/// 64-bit hash used for every bucket computation.
#[inline]
pub fn hash64(bytes: &[u8]) -> u64 {
    xxh3_64(bytes)
}

/// Tag byte of a key: the byte before the trailing delimiter. The root key
/// `/` has no such byte and uses the delimiter itself.
#[inline]
pub fn tag_of_key(key: &[u8]) -> u16 {
    key[key.len().saturating_sub(2)] as u16
}

/// Hash of a tag, over its two little-endian bytes.
#[inline]
pub fn tag_hash(tag: u16) -> u64 {
    hash64(&tag.to_le_bytes())
}

/// The bucket a key hashes to first.
#[inline]
pub fn primary_bucket(key: &[u8], bucket_mask: u64) -> usize {
    (hash64(key) & bucket_mask) as usize
}

/// The other candidate bucket, given either one of the pair.
#[inline]
pub fn alternate_bucket(bucket: usize, tag: u16, bucket_mask: u64) -> usize {
    ((bucket as u64 ^ tag_hash(tag)) & bucket_mask) as usize
}

/// The two candidate buckets of a key, in probe order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidates {
    pub tag: u16,
    pub first: usize,
    pub second: usize,
}

impl Candidates {
    #[inline]
    pub fn of(key: &[u8], bucket_mask: u64) -> Self {
        let tag = tag_of_key(key);
        let first = primary_bucket(key, bucket_mask);
        Self {
            tag,
            first,
            second: alternate_bucket(first, tag, bucket_mask),
        }
    }

    /// Both buckets in probe order. They coincide when the tag hash has no
    /// bits under the mask.
    #[inline]
    pub fn buckets(&self) -> [usize; 2] {
        [self.first, self.second]
    }

    #[inline]
    pub fn contains(&self, bucket: usize) -> bool {
        self.first == bucket || self.second == bucket
    }
}
