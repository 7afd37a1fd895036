//! # Shared Types Crate
//!
//! Chain primitives shared across subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `Hash` and `BlockNumber` are defined once here.
//! - **Addressing**: per-block records are addressed by `(number, hash)` so that
//!   sibling blocks at the same height never collide.

pub mod entities;

pub use entities::*;
