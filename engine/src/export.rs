//! FILENAME: engine/src/export.rs
//! PURPOSE: Dense exports for downstream consumers: plain arrays, name maps and
//! the numeric model matrix.
//! CONTEXT: The model matrix keeps numeric columns as they are, turns booleans
//! into 0/1 and dummy-encodes every other column as one `{col}${level}`
//! indicator per non-reference level. The reference level is the first level
//! seen unless `ModelMatrixOptions::references` names one.

use rustc_hash::FxHashMap;

use crate::definition::ModelMatrixOptions;
use crate::error::Result;
use crate::index::Index;
use crate::logging::log_debug;
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::{CellKind, Value};

/// Name of the optional constant column.
pub const INTERCEPT: &str = "intercept";

/// Row-major copy of every cell.
pub fn to_array(table: &Table) -> Vec<Vec<Value>> {
    (0..table.length())
        .map(|r| table.data.columns().iter().map(|column| column[r].clone()).collect())
        .collect()
}

/// Row name -> row cells.
pub fn map(table: &Table) -> FxHashMap<Value, Vec<Value>> {
    table
        .index
        .iter()
        .cloned()
        .zip(to_array(table))
        .collect()
}

/// Cell of `key_col` -> cell of `value_col`, row by row; a repeated key keeps
/// its last value.
pub fn map_columns(table: &Table, key_col: usize, value_col: usize) -> FxHashMap<Value, Value> {
    (0..table.length())
        .map(|r| {
            (
                table.data.get(key_col, r).clone(),
                table.data.get(value_col, r).clone(),
            )
        })
        .collect()
}

// ============================================================================
// MODEL MATRIX
// ============================================================================

enum Encoding {
    Intercept,
    Numeric(usize),
    Indicator { col: usize, level: Value },
}

/// Output columns of the model matrix, in order.
fn plan(table: &Table, options: &ModelMatrixOptions) -> (Vec<Value>, Vec<Encoding>) {
    let mut names = Vec::new();
    let mut encodings = Vec::new();
    if options.intercept {
        names.push(Value::from(INTERCEPT));
        encodings.push(Encoding::Intercept);
    }

    for (col, kind) in table.types().into_iter().enumerate() {
        let name = table.columns.name_at(col).cloned().unwrap_or_default();
        match kind {
            CellKind::Number | CellKind::Boolean | CellKind::Null => {
                names.push(name);
                encodings.push(Encoding::Numeric(col));
            }
            CellKind::Text | CellKind::Date => {
                let mut levels: Vec<&Value> = Vec::new();
                for value in table.data.columns()[col].iter().filter(|v| !v.is_null()) {
                    if !levels.contains(&value) {
                        levels.push(value);
                    }
                }
                let reference = options
                    .references
                    .iter()
                    .find(|r| r.column == name)
                    .map(|r| &r.level)
                    .or_else(|| levels.first().copied());

                for level in levels.into_iter().filter(|l| Some(*l) != reference) {
                    names.push(Value::Text(format!("{}${}", name, level)));
                    encodings.push(Encoding::Indicator {
                        col,
                        level: level.clone(),
                    });
                }
            }
        }
    }
    (names, encodings)
}

fn encode(table: &Table, encodings: &[Encoding], fill: f64, row: usize) -> Vec<f64> {
    encodings
        .iter()
        .map(|encoding| match encoding {
            Encoding::Intercept => 1.0,
            Encoding::Numeric(col) => table.data.get(*col, row).as_f64().unwrap_or(fill),
            Encoding::Indicator { col, level } => {
                let cell = table.data.get(*col, row);
                if cell.is_null() {
                    fill
                } else if cell == level {
                    1.0
                } else {
                    0.0
                }
            }
        })
        .collect()
}

/// Dense row-major numeric matrix.
pub fn to_model_matrix(table: &Table, options: &ModelMatrixOptions) -> Vec<Vec<f64>> {
    let (names, encodings) = plan(table, options);
    log_debug!(
        "EXPORT",
        "model matrix {} rows x {} cols",
        table.length(),
        names.len()
    );
    (0..table.length())
        .map(|row| encode(table, &encodings, options.fill_value, row))
        .collect()
}

/// The model matrix as a table with the same row names.
pub fn model_matrix_table(table: &Table, options: &ModelMatrixOptions) -> Result<Table> {
    let (names, encodings) = plan(table, options);
    let columns: Vec<Vec<Value>> = (0..encodings.len())
        .map(|_| Vec::with_capacity(table.length()))
        .collect();
    let columns = (0..table.length()).fold(columns, |mut columns, row| {
        let encoded = encode(table, &encodings, options.fill_value, row);
        for (column, x) in columns.iter_mut().zip(encoded) {
            column.push(Value::Float(x));
        }
        columns
    });

    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), table.length());
    Ok(Table::assemble(
        table.index.clone(),
        Index::from_names(names)?,
        data,
    ))
}
