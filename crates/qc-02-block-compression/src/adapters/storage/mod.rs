//! # Storage Adapters
//!
//! The production store is the host node's database driver; this crate ships
//! an in-memory ordered store for tests and the simulation binary.

mod memory;

pub use memory::InMemoryKVStore;
