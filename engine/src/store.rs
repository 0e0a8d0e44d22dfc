//! FILENAME: engine/src/store.rs
//! PURPOSE: Column-major physical storage for table cells.
//! CONTEXT: Every column is a `Vec<Value>` of the same length. Access is
//! positional and unchecked; the owning `Table` resolves names and validates
//! positions before it reaches this layer. Growth pads with `Value::Null`.

use tabula_bitset::SparseBitSet;

use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStore {
    /// Columns in position order.
    columns: Vec<Vec<Value>>,

    /// Row count, tracked separately so a table with rows but no columns
    /// keeps its length.
    length: usize,
}

impl ColumnStore {
    pub fn new() -> Self {
        ColumnStore {
            columns: Vec::new(),
            length: 0,
        }
    }

    /// Builds a store from columns, padding every column to the longest one.
    pub fn from_columns(columns: Vec<Vec<Value>>) -> Self {
        let length = columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut store = ColumnStore {
            columns,
            length,
        };
        for column in &mut store.columns {
            column.resize(length, Value::Null);
        }
        store
    }

    /// Number of columns.
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Cell at (col, row).
    ///
    /// # Panics
    /// Panics if either position is out of bounds.
    pub fn get(&self, col: usize, row: usize) -> &Value {
        &self.columns[col][row]
    }

    pub fn try_get(&self, col: usize, row: usize) -> Option<&Value> {
        self.columns.get(col).and_then(|c| c.get(row))
    }

    /// Overwrites the cell at (col, row).
    ///
    /// # Panics
    /// Panics if either position is out of bounds.
    pub fn set(&mut self, value: Value, col: usize, row: usize) {
        self.columns[col][row] = value;
    }

    /// Appends a column, padding with nulls or truncating to the row count.
    /// An empty store adopts the column's length.
    pub fn add(&mut self, mut column: Vec<Value>) {
        if self.columns.is_empty() && self.length == 0 {
            self.length = column.len();
        }
        column.resize(self.length, Value::Null);
        self.columns.push(column);
    }

    /// Grows to at least `cols` x `rows`; never removes anything.
    pub fn reshape(&mut self, cols: usize, rows: usize) {
        let rows = rows.max(self.length);
        while self.columns.len() < cols {
            self.columns.push(Vec::new());
        }
        for column in &mut self.columns {
            column.resize(rows, Value::Null);
        }
        self.length = rows;
    }

    pub fn column(&self, col: usize) -> Option<&[Value]> {
        self.columns.get(col).map(Vec::as_slice)
    }

    pub fn columns(&self) -> &[Vec<Value>] {
        &self.columns
    }

    /// Copies the cells at the selected rows (and columns, when a column mask
    /// is given) into a new store. This is where selection physically copies.
    pub fn select(&self, rows: &SparseBitSet, cols: Option<&SparseBitSet>) -> ColumnStore {
        let row_positions: Vec<usize> = rows.iter().take_while(|&r| r < self.length).collect();
        let mut selected = ColumnStore::new();
        selected.length = row_positions.len();
        for (c, column) in self.columns.iter().enumerate() {
            if cols.map_or(true, |mask| mask.get(c)) {
                selected
                    .columns
                    .push(row_positions.iter().map(|&r| column[r].clone()).collect());
            }
        }
        selected
    }

    /// Reorders rows: output row `i` is input row `order[i]`.
    pub fn permute(&self, order: &[usize]) -> ColumnStore {
        ColumnStore {
            columns: self
                .columns
                .iter()
                .map(|column| order.iter().map(|&r| column[r].clone()).collect())
                .collect(),
            length: order.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    #[test]
    fn test_add_pads_and_truncates() {
        let mut store = ColumnStore::new();
        store.add(ints(&[1, 2, 3]));
        store.add(ints(&[4]));
        store.add(ints(&[5, 6, 7, 8]));

        assert_eq!(store.size(), 3);
        assert_eq!(store.length(), 3);
        assert_eq!(store.get(1, 2), &Value::Null);
        assert_eq!(store.column(2).unwrap(), ints(&[5, 6, 7]).as_slice());
    }

    #[test]
    fn test_reshape_only_grows() {
        let mut store = ColumnStore::from_columns(vec![ints(&[1, 2])]);
        store.reshape(3, 4);
        assert_eq!((store.size(), store.length()), (3, 4));
        assert_eq!(store.get(0, 1), &Value::Int(2));
        assert_eq!(store.get(2, 3), &Value::Null);

        store.reshape(1, 1);
        assert_eq!((store.size(), store.length()), (3, 4));
    }

    #[test]
    fn test_set_and_try_get() {
        let mut store = ColumnStore::from_columns(vec![ints(&[1, 2])]);
        store.set(Value::from("x"), 0, 1);
        assert_eq!(store.get(0, 1), &Value::from("x"));
        assert_eq!(store.try_get(0, 2), None);
        assert_eq!(store.try_get(1, 0), None);
    }

    #[test]
    fn test_select_rows_and_columns() {
        let store = ColumnStore::from_columns(vec![ints(&[1, 2, 3]), ints(&[4, 5, 6])]);
        let rows = SparseBitSet::from_range(1..3).unwrap();
        let mut cols = SparseBitSet::new();
        cols.set(1).unwrap();

        let selected = store.select(&rows, Some(&cols));
        assert_eq!(selected.size(), 1);
        assert_eq!(selected.length(), 2);
        assert_eq!(selected.column(0).unwrap(), ints(&[5, 6]).as_slice());

        let all_cols = store.select(&rows, None);
        assert_eq!(all_cols.size(), 2);
    }

    #[test]
    fn test_permute() {
        let store = ColumnStore::from_columns(vec![ints(&[1, 2, 3])]);
        let permuted = store.permute(&[2, 0, 1]);
        assert_eq!(permuted.column(0).unwrap(), ints(&[3, 1, 2]).as_slice());
    }
}
