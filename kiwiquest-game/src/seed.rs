//! Domain-separated hashing used to derive deterministic random streams.
use hmac::{Hmac, Mac};
use sha2::Sha256;

pub(crate) fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Derive a sub-seed for a named stream from a session seed.
///
/// The sub-seed is the first eight bytes of `HMAC-SHA256(seed, tag)`, so
/// adding draws in one stream never shifts another.
#[must_use]
pub fn derive_stream_seed(seed: u64, tag: &[u8]) -> u64 {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()).expect("HMAC takes any key length");
    mac.update(tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Stable bucket index for free text, used where a fallback must pick one of
/// several canned answers without consuming session randomness.
#[must_use]
pub fn text_bucket(tag: &[u8], text: &str, buckets: usize) -> usize {
    if buckets == 0 {
        return 0;
    }
    let mut buf = Vec::with_capacity(tag.len() + text.len());
    buf.extend_from_slice(tag);
    buf.extend_from_slice(text.trim().to_lowercase().as_bytes());
    let hash = fnv1a64(&buf);
    usize::try_from(hash % buckets as u64).unwrap_or(0)
}
