//! FILENAME: engine/src/definition.rs
//! Operation Definitions - The serializable configuration.
//!
//! This module contains the types that DESCRIBE a table operation rather than
//! perform it. These structures are designed to be:
//! - Serializable (so a host can persist or transmit a query)
//! - Cheap to clone
//! - Immutable snapshots of caller intent

use serde::{Deserialize, Serialize};

use crate::value::{CellKind, Value};

// ============================================================================
// JOINS
// ============================================================================

/// Which side drives a join and which unmatched rows survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    Outer,
    Left,
    Right,
}

impl Default for JoinType {
    fn default() -> Self {
        JoinType::Left
    }
}

/// Join configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    pub how: JoinType,

    /// Appended (as `name_suffix`) to a left column whose name collides.
    pub left_suffix: String,

    /// Appended (as `name_suffix`) to a right column whose name collides.
    pub right_suffix: String,
}

impl JoinOptions {
    pub fn new(how: JoinType) -> Self {
        JoinOptions {
            how,
            ..JoinOptions::default()
        }
    }
}

impl Default for JoinOptions {
    fn default() -> Self {
        JoinOptions {
            how: JoinType::Left,
            left_suffix: "left".to_string(),
            right_suffix: "right".to_string(),
        }
    }
}

// ============================================================================
// SORTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Ascending
    }
}

/// One column of a multi-column sort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: Value,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(column: impl Into<Value>) -> Self {
        SortKey {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn desc(column: impl Into<Value>) -> Self {
        SortKey {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Parses `"name"` (ascending) or `"-name"` (descending).
    pub fn parse(spec: &str) -> Self {
        match spec.strip_prefix('-') {
            Some(name) => SortKey::desc(name),
            None => SortKey::asc(spec),
        }
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported reducers for aggregation and pivoting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reducer {
    Count,
    Sum,
    Product,
    Mean,
    StdDev,
    Variance,
    Skew,
    Kurtosis,
    Min,
    Max,
    Median,
    /// Percentile in `[0, 100]`.
    Percentile(f64),
    Unique,
    Collapse,
    First,
    Last,
}

impl Reducer {
    /// Short lowercase name, used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Reducer::Count => "count",
            Reducer::Sum => "sum",
            Reducer::Product => "prod",
            Reducer::Mean => "mean",
            Reducer::StdDev => "std",
            Reducer::Variance => "var",
            Reducer::Skew => "skew",
            Reducer::Kurtosis => "kurt",
            Reducer::Min => "min",
            Reducer::Max => "max",
            Reducer::Median => "median",
            Reducer::Percentile(_) => "percentile",
            Reducer::Unique => "unique",
            Reducer::Collapse => "collapse",
            Reducer::First => "first",
            Reducer::Last => "last",
        }
    }

    /// Default reducer for a column of the given kind.
    pub fn default_for(kind: CellKind) -> Reducer {
        match kind {
            CellKind::Number => Reducer::Sum,
            CellKind::Boolean => Reducer::Sum,
            CellKind::Text => Reducer::Collapse,
            CellKind::Date => Reducer::Max,
            CellKind::Null => Reducer::Count,
        }
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Reducer::Sum
    }
}

// ============================================================================
// PIVOT
// ============================================================================

/// Describes a pivot: which columns become row keys, which become column keys,
/// and which are aggregated into the cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotDefinition {
    pub rows: Vec<Value>,
    pub columns: Vec<Value>,
    pub values: Vec<Value>,

    /// Reducer applied to every value column; `None` means `Unique`.
    #[serde(default)]
    pub reducer: Option<Reducer>,
}

impl PivotDefinition {
    pub fn new<R, C, V>(rows: R, columns: C, values: V) -> Self
    where
        R: IntoIterator,
        R::Item: Into<Value>,
        C: IntoIterator,
        C::Item: Into<Value>,
        V: IntoIterator,
        V::Item: Into<Value>,
    {
        PivotDefinition {
            rows: rows.into_iter().map(Into::into).collect(),
            columns: columns.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(Into::into).collect(),
            reducer: None,
        }
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn reducer(&self) -> Reducer {
        self.reducer.unwrap_or(Reducer::Unique)
    }
}

// ============================================================================
// CONVERSION
// ============================================================================

/// Which numeric parser wins when a column parses as both integer and float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberDefault {
    Int,
    Float,
}

impl Default for NumberDefault {
    fn default() -> Self {
        NumberDefault::Int
    }
}

/// Options for string -> typed value coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertOptions {
    pub number_default: NumberDefault,

    /// Cells whose text equals this marker become `Null`.
    pub na: Option<String>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        ConvertOptions {
            number_default: NumberDefault::Int,
            na: Some(String::new()),
        }
    }
}

// ============================================================================
// MODEL MATRIX
// ============================================================================

/// Reference (omitted) level for a dummy-encoded column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorReference {
    pub column: Value,
    pub level: Value,
}

/// Options for dense numeric export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMatrixOptions {
    /// Substituted for null cells.
    pub fill_value: f64,

    /// Prepend a constant `1.0` column.
    pub intercept: bool,

    /// Explicit reference levels; otherwise the first seen level is used.
    #[serde(default)]
    pub references: Vec<FactorReference>,
}

impl Default for ModelMatrixOptions {
    fn default() -> Self {
        ModelMatrixOptions {
            fill_value: 0.0,
            intercept: false,
            references: Vec::new(),
        }
    }
}
