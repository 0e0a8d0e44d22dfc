//! FILENAME: engine/src/pivot.rs
//! PURPOSE: Reshapes long-format rows into a wide matrix of aggregated cells.
//! CONTEXT: Rows are grouped by the row columns; inside each row group they
//! are grouped again by the column columns. Every (row group, column key,
//! value column) triple is reduced to one cell.
//!
//! Output layout:
//! - row-key columns first, copied from the first row of each group
//! - then one column per distinct column key, in first-seen order across the
//!   whole table, named by the key as text (`"{value}_{key}"` when several
//!   value columns are pivoted)
//! - rows named by the row group key; missing combinations are null

use rustc_hash::FxHashMap;

use crate::aggregation::Aggregate;
use crate::definition::PivotDefinition;
use crate::error::{Result, TableError};
use crate::grouping::Grouping;
use crate::index::Index;
use crate::logging::{log_debug, log_enter, log_exit};
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::Value;

/// Column key rendered as a column name.
fn key_label(key: &Value) -> String {
    match key {
        Value::Tuple(parts) => parts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("_"),
        other => other.to_string(),
    }
}

/// Builds the pivot described by `definition`.
pub fn pivot(table: &Table, definition: &PivotDefinition) -> Result<Table> {
    if definition.rows.is_empty() || definition.columns.is_empty() {
        return Err(TableError::InvalidArgument(
            "pivot needs at least one row column and one column column".to_string(),
        ));
    }
    let row_cols = table.columns.indices(&definition.rows)?;
    let col_cols = table.columns.indices(&definition.columns)?;
    let value_cols: Vec<usize> = if definition.values.is_empty() {
        (0..table.size())
            .filter(|c| !row_cols.contains(c) && !col_cols.contains(c))
            .collect()
    } else {
        table.columns.indices(&definition.values)?
    };
    let reducer = definition.reducer();

    log_enter!(
        "PIVOT",
        "pivot",
        "rows={:?} cols={:?} values={} reducer={}",
        definition.rows,
        definition.columns,
        value_cols.len(),
        reducer.name()
    );

    let grouping = Grouping::by_columns(table, &row_cols)?;
    let Some(partition) = grouping.partition() else {
        return Err(TableError::InvalidArgument("pivot has no row grouping".to_string()));
    };

    // Column keys in first-seen order across the table.
    let mut col_keys: Vec<Value> = Vec::new();
    let mut col_slots: FxHashMap<Value, usize> = FxHashMap::default();

    // Per row group: column slot -> member rows.
    let mut cells: Vec<FxHashMap<usize, Vec<usize>>> = Vec::with_capacity(partition.len());
    for (_, mask) in partition.iter() {
        let mut sub: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for row in mask.iter() {
            let key = Value::key_of(
                col_cols.iter().map(|&c| table.data.get(c, row).clone()).collect(),
            );
            let slot = match col_slots.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = col_keys.len();
                    col_slots.insert(key.clone(), slot);
                    col_keys.push(key);
                    slot
                }
            };
            sub.entry(slot).or_default().push(row);
        }
        cells.push(sub);
    }

    let mut names = Index::new();
    let mut columns: Vec<Vec<Value>> = Vec::new();

    for &c in &row_cols {
        names.add(table.columns.name_at(c).cloned().unwrap_or_default())?;
        columns.push(
            partition
                .iter()
                .map(|(_, mask)| {
                    mask.next_set_bit(0)
                        .map(|row| table.data.get(c, row).clone())
                        .unwrap_or_default()
                })
                .collect(),
        );
    }

    let qualify = value_cols.len() > 1;
    for &v in &value_cols {
        let value_name = table.columns.name_at(v).cloned().unwrap_or_default();
        for (slot, key) in col_keys.iter().enumerate() {
            let label = if qualify {
                format!("{}_{}", value_name, key_label(key))
            } else {
                key_label(key)
            };
            names.add(Value::Text(label))?;

            let mut column = Vec::with_capacity(partition.len());
            for sub in &cells {
                let cell = match sub.get(&slot) {
                    Some(rows) => {
                        let values: Vec<&Value> = rows.iter().map(|&r| table.data.get(v, r)).collect();
                        reducer.attempt(&values)?.unwrap_or_else(|| {
                            log_debug!(
                                "PIVOT",
                                "{} cannot reduce {} at {}",
                                reducer.name(),
                                value_name,
                                key
                            );
                            Value::Null
                        })
                    }
                    None => Value::Null,
                };
                column.push(cell);
            }
            columns.push(column);
        }
    }

    let index = Index::from_names(partition.keys().iter().cloned())?;
    let length = index.len();
    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), length);
    log_exit!("PIVOT", "pivot", "{} rows x {} cols", length, names.len());
    Ok(Table::assemble(index, names, data))
}
