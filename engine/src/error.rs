//! FILENAME: engine/src/error.rs
//! PURPOSE: The single error type returned by table operations.
//! CONTEXT: Every failure aborts the operation that raised it and leaves the
//! table as it was before the call.

use tabula_bitset::BitSetError;
use thiserror::Error;

use crate::value::Value;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("duplicate name: {0}")]
    DuplicateName(Value),

    #[error("unknown name: {0}")]
    UnknownName(Value),

    #[error("shape mismatch: expected {expected} columns, found {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("values not unique: {first} and {second}")]
    NonUnique { first: Value, second: Value },

    #[error("no results for aggregate function {0}")]
    NoAggregableColumns(String),

    #[error("generated join key is not unique: {0}")]
    JoinKeyCollision(Value),

    #[error("position {index} out of range (size {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("mask error: {0}")]
    BitSet(#[from] BitSetError),
}

pub type Result<T> = std::result::Result<T, TableError>;
