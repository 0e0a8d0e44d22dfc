//! FILENAME: engine/src/sorting.rs
//! PURPOSE: Multi-column row ordering.
//! CONTEXT: The comparator walks the sort columns in order using the value
//! total order, stops at the first column that differs, and flips the result
//! for descending columns. Rows carry their names with them.

use std::cmp::Ordering;

use crate::definition::SortDirection;
use crate::logging::log_debug;
use crate::table::Table;

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Row permutation that orders `table` by `keys` (column position, direction).
pub fn sort_order(table: &Table, keys: &[(usize, SortDirection)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..table.length()).collect();
    order.sort_by(|&a, &b| {
        keys.iter()
            .map(|&(col, direction)| {
                directed(table.data.get(col, a).cmp(table.data.get(col, b)), direction)
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
    order
}

/// Row permutation that orders `table` by row name.
pub fn index_order(table: &Table, direction: SortDirection) -> Vec<usize> {
    let names = table.index.names();
    let mut order: Vec<usize> = (0..table.length()).collect();
    order.sort_by(|&a, &b| directed(names[a].cmp(&names[b]), direction));
    order
}

/// Reorders rows; output row `i` is input row `order[i]`.
pub fn permute(table: &Table, order: &[usize]) -> Table {
    log_debug!("SORT", "permuting {} rows", order.len());
    let names = table.index.names();
    let mut index = crate::index::Index::new();
    for &row in order {
        // Names are unique in the source, so a permutation stays unique.
        let _ = index.add(names[row].clone());
    }
    Table::assemble(index, table.columns.clone(), table.data.permute(order))
}
