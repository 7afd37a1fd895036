//! # Codec Security
//!
//! Limits applied on the decompression path.
//!
//! ## Security Invariants
//!
//! - Decompression bomb prevention (max output size)
//! - Corrupted frames are rejected by the zstd frame checksum

use crate::domain::config::MAX_CHUNK_BYTE_CAP;
use crate::domain::errors::CodecError;

/// Maximum decompressed chunk size: twice the largest legal byte cap.
pub const MAX_DECOMPRESSED_SIZE: usize = 2 * MAX_CHUNK_BYTE_CAP;

/// Reject decoded output larger than `limit`.
pub fn validate_decompressed_size(decompressed_size: usize, limit: usize) -> Result<(), CodecError> {
    if decompressed_size > limit {
        return Err(CodecError::DecompressedTooLarge { limit });
    }
    Ok(())
}
