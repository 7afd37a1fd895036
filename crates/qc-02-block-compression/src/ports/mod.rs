//! # Ports Layer
//!
//! Defines the port traits for the Block Compression subsystem.
//!
//! ## Hexagonal Architecture
//!
//! - `inbound.rs` - Driving ports (lookup and reorg hooks used by the host)
//! - `outbound.rs` - Driven ports (KV store and chain reader the host supplies)

pub mod inbound;
pub mod outbound;
