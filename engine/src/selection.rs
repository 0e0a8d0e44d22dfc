//! FILENAME: engine/src/selection.rs
//! PURPOSE: Turns predicates and coordinate ranges into row/column masks, and
//! materializes a table restricted to a mask.

use std::ops::Range;

use tabula_bitset::SparseBitSet;

use crate::error::Result;
use crate::logging::log_debug;
use crate::table::Table;
use crate::views::{Axis, LineView};

/// Mask of the rows for which `predicate` holds, scanned in row order.
pub fn select<F>(table: &Table, mut predicate: F) -> Result<SparseBitSet>
where
    F: FnMut(&LineView<'_>) -> bool,
{
    let mut mask = SparseBitSet::new();
    for row in 0..table.length() {
        if predicate(&LineView::new(table, Axis::Rows, row)) {
            mask.set(row)?;
        }
    }
    log_debug!(
        "SELECT",
        "predicate kept {} of {} rows",
        mask.cardinality(),
        table.length()
    );
    Ok(mask)
}

/// Dense mask for `range`, clamped to `0..len`.
pub fn range_mask(range: Range<usize>, len: usize) -> Result<SparseBitSet> {
    let end = range.end.min(len);
    let start = range.start.min(end);
    Ok(SparseBitSet::from_range(start..end)?)
}

/// Row and column masks for a rectangular slice.
pub fn slice(
    table: &Table,
    rows: Range<usize>,
    cols: Range<usize>,
) -> Result<(SparseBitSet, SparseBitSet)> {
    Ok((
        range_mask(rows, table.length())?,
        range_mask(cols, table.size())?,
    ))
}

/// Mask of the first `n` rows.
pub fn head(table: &Table, n: usize) -> Result<SparseBitSet> {
    range_mask(0..n, table.length())
}

/// Mask of the last `n` rows.
pub fn tail(table: &Table, n: usize) -> Result<SparseBitSet> {
    let len = table.length();
    range_mask(len.saturating_sub(n)..len, len)
}

/// Copies the masked rows (and columns) into a new, ungrouped table. Names keep
/// their relative order and are renumbered densely.
pub fn materialize(table: &Table, rows: &SparseBitSet, cols: Option<&SparseBitSet>) -> Table {
    let index = table.index.select(rows);
    let columns = match cols {
        Some(mask) => table.columns.select(mask),
        None => table.columns.clone(),
    };
    let data = table.data.select(rows, cols);
    Table::assemble(index, columns, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn numbers() -> Table {
        Table::from_rows(
            ["n", "label"],
            (0..10).map(|i| vec![Value::Int(i), Value::from(format!("row{}", i))]),
        )
        .unwrap()
    }

    #[test]
    fn test_select_even_rows() {
        let table = numbers();
        let mask = select(&table, |row| row.get(0).and_then(Value::as_i64).unwrap_or(1) % 2 == 0)
            .unwrap();
        assert_eq!(mask.iter().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);

        let selected = materialize(&table, &mask, None);
        assert_eq!(selected.length(), 5);
        assert_eq!(selected.index().names()[1], Value::Int(2));
        assert_eq!(selected.get_at(1, 1).unwrap(), &Value::from("row2"));
    }

    #[test]
    fn test_head_and_tail_clamp() {
        let table = numbers();
        assert_eq!(head(&table, 3).unwrap().cardinality(), 3);
        assert_eq!(head(&table, 30).unwrap().cardinality(), 10);
        let last = tail(&table, 2).unwrap();
        assert_eq!(last.iter().collect::<Vec<_>>(), vec![8, 9]);
        assert_eq!(tail(&table, 20).unwrap().cardinality(), 10);
    }

    #[test]
    fn test_slice_masks_both_axes() {
        let table = numbers();
        let (rows, cols) = slice(&table, 2..4, 1..5).unwrap();
        let sliced = materialize(&table, &rows, Some(&cols));
        assert_eq!((sliced.length(), sliced.size()), (2, 1));
        assert_eq!(sliced.columns().names(), &[Value::from("label")]);
        assert_eq!(sliced.get_at(0, 0).unwrap(), &Value::from("row2"));
    }

    #[test]
    fn test_empty_range() {
        let table = numbers();
        let (rows, _) = slice(&table, 7..3, 0..1).unwrap();
        assert!(rows.is_empty());
    }
}
