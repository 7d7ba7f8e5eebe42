//! BLAKE3 helpers for chunk identifiers and index checksums.

use blake3::Hasher;

/// Returns the hex BLAKE3 digest of `data`.
#[inline]
pub fn checksum_hex(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Derives a stable chunk id from its source, position and text.
///
/// Fields are separated so that `("ab", 1, "c")` and `("a", 1, "bc")` never collide.
#[inline]
pub fn chunk_id(source_ref: &str, ordinal: u32, text: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(source_ref.as_bytes());
    hasher.update(b"|");
    hasher.update(&ordinal.to_le_bytes());
    hasher.update(b"|");
    hasher.update(text.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// 32-byte key for caching per-query work.
#[inline]
pub fn hash_query(query: &str) -> [u8; 32] {
    *blake3::hash(query.as_bytes()).as_bytes()
}

/// Computes a 64-bit hash of `data`, truncated from the 256-bit BLAKE3 output.
///
/// Used for bucketing (e.g. feature hashing in the stub embedder), never for
/// identity. Use [`checksum_hex`] when collisions would matter.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let hash = blake3::hash(data);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[0..8]);
    u64::from_le_bytes(bytes)
}
