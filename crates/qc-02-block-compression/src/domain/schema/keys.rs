//! # Key Encoding
//!
//! Big-endian block numbers keep lexicographic and numeric order identical.

use crate::domain::chunk::ChunkRange;
use shared_types::{BlockNumber, Hash};

/// `num(8) || hash(32)`
pub const NATIVE_KEY_SUFFIX_LEN: usize = 8 + 32;

/// `to(8) || from(8)`
pub const COMPRESSED_KEY_SUFFIX_LEN: usize = 8 + 8;

/// `prefix || num || hash`
pub fn native_key(prefix: &[u8], num: BlockNumber, hash: &Hash) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + NATIVE_KEY_SUFFIX_LEN);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&num.to_be_bytes());
    key.extend_from_slice(hash);
    key
}

/// `prefix || to || from`
pub fn compressed_key(prefix: &[u8], range: ChunkRange) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + COMPRESSED_KEY_SUFFIX_LEN);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&range.to.to_be_bytes());
    key.extend_from_slice(&range.from.to_be_bytes());
    key
}

/// Recover the range from a compressed key, or `None` if malformed.
pub fn parse_compressed_key(prefix: &[u8], key: &[u8]) -> Option<ChunkRange> {
    let suffix = key.strip_prefix(prefix)?;
    if suffix.len() != COMPRESSED_KEY_SUFFIX_LEN {
        return None;
    }
    let to = BlockNumber::from_be_bytes(suffix[..8].try_into().ok()?);
    let from = BlockNumber::from_be_bytes(suffix[8..].try_into().ok()?);
    if from > to {
        return None;
    }
    Some(ChunkRange::new(from, to))
}

/// `nextNum` as stored.
pub fn encode_next_num(num: BlockNumber) -> [u8; 8] {
    num.to_be_bytes()
}

/// Parse a stored `nextNum`, or `None` if it is not 8 bytes.
pub fn decode_next_num(raw: &[u8]) -> Option<BlockNumber> {
    Some(BlockNumber::from_be_bytes(raw.try_into().ok()?))
}
