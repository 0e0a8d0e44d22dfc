//! FILENAME: engine/src/lib.rs
//! PURPOSE: Main library entry point for the table engine.
//! CONTEXT: Re-exports the `Table` facade and the types its operations take
//! and return. Readers, renderers and scripting front ends build on this
//! surface only.

pub mod logging;

pub mod aggregation;
pub mod combining;
pub mod conversion;
pub mod definition;
pub mod error;
pub mod export;
pub mod grouping;
pub mod index;
pub mod pivot;
pub mod selection;
pub mod shaping;
pub mod sorting;
pub mod store;
pub mod table;
pub mod value;
pub mod views;
pub mod windows;

// Re-export commonly used types at the crate root
pub use aggregation::{Aggregate, AggregateFn, COLLAPSE_DELIMITER};
pub use conversion::Converter;
pub use definition::{
    ConvertOptions, FactorReference, JoinOptions, JoinType, ModelMatrixOptions, NumberDefault,
    PivotDefinition, Reducer, SortDirection, SortKey,
};
pub use error::{Result, TableError};
pub use export::INTERCEPT;
pub use grouping::{Grouping, Partition};
pub use index::Index;
pub use store::ColumnStore;
pub use table::Table;
pub use tabula_bitset::{BitSetError, SparseBitSet};
pub use value::{CellKind, Value};
pub use views::{Axis, FlatView, LineView, ListView, RowMap, TransformedView, TransposedView};
pub use windows::Cumulative;

#[cfg(test)]
mod tests;
