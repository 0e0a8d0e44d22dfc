//! FILENAME: bitset/src/lib.rs
//! Sparse bit set for Tabula.
//!
//! This crate provides the selection primitive shared by every row/column mask
//! in the table engine. It depends on nothing from the engine so it can be
//! benchmarked and tested in isolation.
//!
//! Layers:
//! - `sparse`: The multi-level `SparseBitSet` (outer -> mid -> leaf words)
//! - `error`: Out-of-range failures for mutating calls

pub mod error;
pub mod sparse;

pub use error::BitSetError;
pub use sparse::{SetBits, SparseBitSet, MAX_INDEX};
