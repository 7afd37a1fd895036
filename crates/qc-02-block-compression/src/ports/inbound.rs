//! # Inbound Ports (Driving Ports)
//!
//! The API the host node drives: compressed lookups and reorg hooks.
//! Lifecycle (`init`/`start`/`stop`) lives on `CompressionModule` itself.

use crate::domain::errors::CompressionError;
use shared_types::{BlockNumber, Hash};

/// Point lookups that transparently fall back to compressed history.
///
/// Every method returns `Ok(None)` when the record exists in neither the
/// native keyspace nor a chunk, or when the chunk holds a different hash at
/// that height (a stale height after a reorg).
pub trait CompressedBlockReader: Send + Sync {
    /// Raw header bytes for `(num, hash)`.
    fn find_compressed_header(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError>;

    /// Raw body bytes for `(num, hash)`.
    fn find_compressed_body(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError>;

    /// Raw receipts bytes for `(num, hash)`.
    fn find_compressed_receipts(
        &self,
        num: BlockNumber,
        hash: &Hash,
    ) -> Result<Option<Vec<u8>>, CompressionError>;
}

/// Hooks invoked by the host's reorg handler. Drivers must be stopped first.
pub trait ReorgCompensator: Send + Sync {
    /// Coarse rewind notification. The per-block hook does the work.
    fn rewind_to(&self, new_head: BlockNumber) -> Result<(), CompressionError>;

    /// Called per discarded block, in descending order.
    fn rewind_delete(&self, hash: &Hash, num: BlockNumber) -> Result<(), CompressionError>;
}
