//! # Core Chain Entities
//!
//! The minimal set of chain identifiers used by storage subsystems.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte block hash.
pub type Hash = [u8; 32];

/// Height of a block in the chain. Genesis is 0.
pub type BlockNumber = u64;

/// The all-zero hash (parent of genesis).
pub const ZERO_HASH: Hash = [0u8; 32];

/// SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// A block identified by both its height and its hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockId {
    /// Block height.
    pub number: BlockNumber,
    /// Block hash.
    pub hash: Hash,
}

impl BlockId {
    /// Create a new block id.
    pub fn new(number: BlockNumber, hash: Hash) -> Self {
        Self { number, hash }
    }

    /// First 4 bytes of the hash, hex encoded. Used in log lines.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..4])
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} (0x{}..)", self.number, self.short_hash())
    }
}
