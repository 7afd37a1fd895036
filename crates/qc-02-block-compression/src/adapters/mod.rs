//! # Adapters Module
//!
//! In-process implementations of the outbound ports.
//!
//! ## Modules
//!
//! - `storage`: ordered in-memory key-value store
//! - `chain`: in-memory canonical chain index

pub mod chain;
pub mod storage;

pub use chain::InMemoryChain;
pub use storage::InMemoryKVStore;
