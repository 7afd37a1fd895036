//! # Chunk Compressor
//!
//! Single-shot zstd compression. `CodecConfig::build` picks the compressor
//! the module runs with.

use super::security::{validate_decompressed_size, MAX_DECOMPRESSED_SIZE};
use crate::domain::errors::{CodecError, ConfigError};
use std::io::{Read, Write};
use std::sync::Arc;

// =============================================================================
// CODEC CONFIGURATION
// =============================================================================

/// Configuration for chunk compression
#[derive(Debug, Clone)]
pub struct CodecConfig {
    /// Zstd when true, pass-through for backends that already compress
    pub compression: bool,
    /// Compression level (1-22, default 3)
    pub level: i32,
    /// Write a frame checksum so corrupted chunks fail to decode
    pub checksum: bool,
    /// Upper bound on decoded output
    pub max_decompressed_size: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            compression: true,
            level: zstd::DEFAULT_COMPRESSION_LEVEL,
            checksum: true,
            max_decompressed_size: MAX_DECOMPRESSED_SIZE,
        }
    }
}

impl CodecConfig {
    /// Store chunks as plain bincode
    pub fn disabled() -> Self {
        Self {
            compression: false,
            ..Self::default()
        }
    }

    /// Create config for testing (fast level)
    pub fn for_testing() -> Self {
        Self {
            level: 1,
            ..Self::default()
        }
    }

    /// Check the level is one zstd accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=22).contains(&self.level) {
            return Err(ConfigError::InvalidCodecLevel { level: self.level });
        }
        Ok(())
    }

    /// The compressor these settings describe.
    pub fn build(&self) -> Arc<dyn BlockCompressor> {
        if self.compression {
            Arc::new(ZstdCompressor::new(self.clone()))
        } else {
            Arc::new(NoOpCompressor)
        }
    }
}

// =============================================================================
// COMPRESSOR TRAIT
// =============================================================================

/// Compress/decompress opaque byte buffers
pub trait BlockCompressor: Send + Sync {
    /// Compress data
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
    /// Decompress data
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError>;
    /// Check if compression is enabled
    fn is_enabled(&self) -> bool;
}

// =============================================================================
// ZSTD COMPRESSOR
// =============================================================================

/// Zstd-based compressor
pub struct ZstdCompressor {
    config: CodecConfig,
}

impl ZstdCompressor {
    /// Create a new Zstd compressor
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Create with default settings
    pub fn default_compressor() -> Self {
        Self::new(CodecConfig::default())
    }

    fn finish_encoder<W: Write>(
        &self,
        mut encoder: zstd::stream::Encoder<'_, W>,
        data: &[u8],
    ) -> Result<W, CodecError> {
        encoder
            .include_checksum(self.config.checksum)
            .map_err(CodecError::CompressFailed)?;
        encoder
            .set_pledged_src_size(Some(data.len() as u64))
            .map_err(CodecError::CompressFailed)?;
        encoder
            .write_all(data)
            .map_err(CodecError::CompressFailed)?;
        encoder.finish().map_err(CodecError::CompressFailed)
    }

    fn read_bounded<R: Read>(&self, decoder: R) -> Result<Vec<u8>, CodecError> {
        let limit = self.config.max_decompressed_size;
        let mut output = Vec::new();
        decoder
            .take(limit as u64 + 1)
            .read_to_end(&mut output)
            .map_err(CodecError::DecompressFailed)?;
        validate_decompressed_size(output.len(), limit)?;
        Ok(output)
    }
}

impl BlockCompressor for ZstdCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let encoder = zstd::stream::Encoder::new(Vec::new(), self.config.level)
            .map_err(CodecError::CompressFailed)?;
        self.finish_encoder(encoder, data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let decoder = zstd::stream::Decoder::new(data).map_err(CodecError::DecompressFailed)?;
        self.read_bounded(decoder)
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

// =============================================================================
// NO-OP COMPRESSOR
// =============================================================================

/// No-op compressor that returns data unchanged
pub struct NoOpCompressor;

impl BlockCompressor for NoOpCompressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        Ok(data.to_vec())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
