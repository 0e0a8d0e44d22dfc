//! FILENAME: bitset/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BitSetError {
    #[error("bit index {index} is outside the addressable range 0..={max}")]
    OutOfRange { index: usize, max: usize },

    #[error("bit range {start}..{end} is outside the addressable range 0..={max}")]
    RangeOutOfBounds { start: usize, end: usize, max: usize },
}
