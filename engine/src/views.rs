//! FILENAME: engine/src/views.rs
//! PURPOSE: Lazy, non-copying projections over a table.
//! CONTEXT: A view borrows the table's row index, column index and column store
//! and translates a logical (row, col) into a store lookup on demand. Because
//! views hold a shared borrow, the table cannot be mutated while one is alive;
//! create a fresh view after mutating.
//!
//! Conventions:
//! - `FlatView` walks cells in column-major order (all of column 0, then
//!   column 1, ...).
//! - `TransposedView` swaps roles: its row `i` is the table's column `i`.

use rustc_hash::FxHashMap;

use crate::table::Table;
use crate::value::Value;

static NULL: Value = Value::Null;

/// Which axis a list view walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Rows,
    Columns,
}

// ============================================================================
// LIST VIEW (rows or columns)
// ============================================================================

/// The table presented as a sequence of rows or of columns.
#[derive(Debug, Clone, Copy)]
pub struct ListView<'a> {
    table: &'a Table,
    axis: Axis,
}

impl<'a> ListView<'a> {
    pub(crate) fn new(table: &'a Table, axis: Axis) -> Self {
        ListView { table, axis }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn len(&self) -> usize {
        match self.axis {
            Axis::Rows => self.table.length(),
            Axis::Columns => self.table.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, pos: usize) -> Option<LineView<'a>> {
        (pos < self.len()).then(|| LineView::new(self.table, self.axis, pos))
    }

    pub fn iter(&self) -> impl Iterator<Item = LineView<'a>> + 'a {
        let (table, axis) = (self.table, self.axis);
        (0..self.len()).map(move |pos| LineView::new(table, axis, pos))
    }
}

/// One row or one column, indexed lazily against the store.
#[derive(Debug, Clone, Copy)]
pub struct LineView<'a> {
    table: &'a Table,
    axis: Axis,
    pos: usize,
}

impl<'a> LineView<'a> {
    pub(crate) fn new(table: &'a Table, axis: Axis, pos: usize) -> Self {
        LineView { table, axis, pos }
    }

    /// Position of this row/column in its own index.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Name of this row/column.
    pub fn name(&self) -> &'a Value {
        let index = match self.axis {
            Axis::Rows => &self.table.index,
            Axis::Columns => &self.table.columns,
        };
        index.name_at(self.pos).unwrap_or(&NULL)
    }

    /// Number of cells along this line.
    pub fn len(&self) -> usize {
        match self.axis {
            Axis::Rows => self.table.size(),
            Axis::Columns => self.table.length(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell at position `i` along the line.
    pub fn get(&self, i: usize) -> Option<&'a Value> {
        match self.axis {
            Axis::Rows => self.table.data.try_get(i, self.pos),
            Axis::Columns => self.table.data.try_get(self.pos, i),
        }
    }

    /// Cell addressed by the name on the other axis (a column name for a row,
    /// a row name for a column).
    pub fn get_named(&self, name: &Value) -> Option<&'a Value> {
        let other = match self.axis {
            Axis::Rows => &self.table.columns,
            Axis::Columns => &self.table.index,
        };
        other.position(name).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + 'a {
        let line = *self;
        (0..line.len()).filter_map(move |i| line.get(i))
    }

    pub fn to_vec(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    /// The line as a name -> value mapping.
    pub fn as_map(&self) -> RowMap<'a> {
        RowMap { line: *self }
    }
}

// ============================================================================
// MAP VIEW
// ============================================================================

/// A row (or column) addressed by name instead of position.
#[derive(Debug, Clone, Copy)]
pub struct RowMap<'a> {
    line: LineView<'a>,
}

impl<'a> RowMap<'a> {
    pub fn name(&self) -> &'a Value {
        self.line.name()
    }

    pub fn get(&self, key: &Value) -> Option<&'a Value> {
        self.line.get_named(key)
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    /// (key, value) pairs in position order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Value, &'a Value)> + 'a {
        let line = self.line;
        let keys = match line.axis {
            Axis::Rows => line.table.columns.names(),
            Axis::Columns => line.table.index.names(),
        };
        keys.iter().zip(line.iter())
    }

    pub fn to_map(&self) -> FxHashMap<Value, Value> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

// ============================================================================
// TRANSPOSED VIEW
// ============================================================================

/// The table with rows and columns swapped, without moving data.
#[derive(Debug, Clone, Copy)]
pub struct TransposedView<'a> {
    table: &'a Table,
}

impl<'a> TransposedView<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        TransposedView { table }
    }

    /// Row count of the transposed shape (the table's column count).
    pub fn rows(&self) -> usize {
        self.table.size()
    }

    /// Column count of the transposed shape (the table's row count).
    pub fn cols(&self) -> usize {
        self.table.length()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&'a Value> {
        self.table.data.try_get(row, col)
    }

    /// Column-major copy of the transposed data, ready for a new store.
    pub(crate) fn to_columns(&self) -> Vec<Vec<Value>> {
        (0..self.cols())
            .map(|c| (0..self.rows()).map(|r| self.table.data.get(r, c).clone()).collect())
            .collect()
    }
}

// ============================================================================
// TRANSFORMED VIEW
// ============================================================================

/// Element-wise transformation applied on access.
pub struct TransformedView<'a, F>
where
    F: Fn(&Value) -> Value,
{
    table: &'a Table,
    transform: F,
}

impl<'a, F> TransformedView<'a, F>
where
    F: Fn(&Value) -> Value,
{
    pub(crate) fn new(table: &'a Table, transform: F) -> Self {
        TransformedView { table, transform }
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Value> {
        self.table.data.try_get(col, row).map(&self.transform)
    }

    /// Column-major copy of the transformed data.
    pub(crate) fn to_columns(&self) -> Vec<Vec<Value>> {
        self.table
            .data
            .columns()
            .iter()
            .map(|column| column.iter().map(&self.transform).collect())
            .collect()
    }
}

impl<F> std::fmt::Debug for TransformedView<'_, F>
where
    F: Fn(&Value) -> Value,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformedView")
            .field("rows", &self.table.length())
            .field("cols", &self.table.size())
            .finish()
    }
}

// ============================================================================
// FLAT VIEW
// ============================================================================

/// Every cell as one sequence, column-major.
#[derive(Debug, Clone, Copy)]
pub struct FlatView<'a> {
    table: &'a Table,
}

impl<'a> FlatView<'a> {
    pub(crate) fn new(table: &'a Table) -> Self {
        FlatView { table }
    }

    pub fn len(&self) -> usize {
        self.table.size() * self.table.length()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, i: usize) -> Option<&'a Value> {
        let length = self.table.length();
        if length == 0 {
            return None;
        }
        self.table.data.try_get(i / length, i % length)
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Value> + 'a {
        self.table.data.columns().iter().flat_map(|column| column.iter())
    }
}
