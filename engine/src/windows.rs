//! FILENAME: engine/src/windows.rs
//! PURPOSE: Row-order transforms over numeric columns: lagged differences,
//! percent change, rolling windows and running (cumulative) reductions.
//! CONTEXT: Non-numeric columns are left out of the result. The first cells
//! of a lagged or windowed column, which have no full window behind them, are
//! null.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::index::Index;
use crate::logging::log_debug;
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::{CellKind, Value};

// ============================================================================
// LAGGED AND ROLLING TRANSFORMS
// ============================================================================

fn check_period(period: usize) -> Result<()> {
    if period == 0 {
        return Err(TableError::InvalidArgument("period must be positive".to_string()));
    }
    Ok(())
}

/// Applies `compute` to each numeric column; rows and row names are kept.
fn map_numeric<F>(table: &Table, mut compute: F) -> Result<Table>
where
    F: FnMut(&[Value]) -> Vec<Value>,
{
    let numeric: Vec<usize> = table
        .types()
        .into_iter()
        .enumerate()
        .filter(|&(_, kind)| kind == CellKind::Number)
        .map(|(c, _)| c)
        .collect();

    let names = Index::from_names(
        numeric
            .iter()
            .filter_map(|&c| table.columns.name_at(c).cloned()),
    )?;
    let columns: Vec<Vec<Value>> = numeric
        .iter()
        .map(|&c| compute(&table.data.columns()[c]))
        .collect();

    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), table.length());
    Ok(Table::assemble(table.index.clone(), names, data))
}

fn difference(current: &Value, previous: &Value) -> Value {
    match (current, previous) {
        (Value::Int(a), Value::Int(b)) => a
            .checked_sub(*b)
            .map_or(Value::Float(*a as f64 - *b as f64), Value::Int),
        _ => match (current.as_f64(), previous.as_f64()) {
            (Some(a), Some(b)) => Value::Float(a - b),
            _ => Value::Null,
        },
    }
}

fn change(current: &Value, previous: &Value) -> Value {
    match (current.as_f64(), previous.as_f64()) {
        (Some(a), Some(b)) => Value::Float(a / b - 1.0),
        _ => Value::Null,
    }
}

fn lagged(column: &[Value], period: usize, op: fn(&Value, &Value) -> Value) -> Vec<Value> {
    (0..column.len())
        .map(|t| {
            if t < period {
                Value::Null
            } else {
                op(&column[t], &column[t - period])
            }
        })
        .collect()
}

/// `x[t] - x[t - period]`.
pub fn diff(table: &Table, period: usize) -> Result<Table> {
    check_period(period)?;
    log_debug!("WINDOW", "diff period={}", period);
    map_numeric(table, |column| lagged(column, period, difference))
}

/// `x[t] / x[t - period] - 1`.
pub fn percent_change(table: &Table, period: usize) -> Result<Table> {
    check_period(period)?;
    log_debug!("WINDOW", "percent_change period={}", period);
    map_numeric(table, |column| lagged(column, period, change))
}

/// `func` over the trailing window of `period` cells ending at each row.
pub fn rollapply<F>(table: &Table, period: usize, func: F) -> Result<Table>
where
    F: Fn(&[Value]) -> Value,
{
    check_period(period)?;
    log_debug!("WINDOW", "rollapply period={}", period);
    map_numeric(table, |column| {
        (0..column.len())
            .map(|t| {
                if t + 1 < period {
                    Value::Null
                } else {
                    func(&column[t + 1 - period..=t])
                }
            })
            .collect()
    })
}

// ============================================================================
// CUMULATIVE TRANSFORMS
// ============================================================================

/// Running reduction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cumulative {
    Sum,
    Product,
    Min,
    Max,
}

impl Cumulative {
    pub fn name(&self) -> &'static str {
        match self {
            Cumulative::Sum => "cumsum",
            Cumulative::Product => "cumprod",
            Cumulative::Min => "cummin",
            Cumulative::Max => "cummax",
        }
    }

    fn step_int(&self, acc: i64, x: i64) -> Option<i64> {
        match self {
            Cumulative::Sum => acc.checked_add(x),
            Cumulative::Product => acc.checked_mul(x),
            Cumulative::Min => Some(acc.min(x)),
            Cumulative::Max => Some(acc.max(x)),
        }
    }

    fn step_float(&self, acc: f64, x: f64) -> f64 {
        match self {
            Cumulative::Sum => acc + x,
            Cumulative::Product => acc * x,
            Cumulative::Min => acc.min(x),
            Cumulative::Max => acc.max(x),
        }
    }
}

/// Integer running reduction; `None` on overflow.
fn run_int(cells: &[&Value], op: Cumulative) -> Option<Vec<Value>> {
    let mut acc: Option<i64> = None;
    let mut out = Vec::with_capacity(cells.len());
    for cell in cells {
        match cell.as_i64() {
            Some(x) => {
                let next = match acc {
                    None => x,
                    Some(a) => op.step_int(a, x)?,
                };
                acc = Some(next);
                out.push(Value::Int(next));
            }
            None => out.push(Value::Null),
        }
    }
    Some(out)
}

fn run_float(cells: &[&Value], op: Cumulative) -> Vec<Value> {
    let mut acc: Option<f64> = None;
    cells
        .iter()
        .map(|cell| match cell.as_f64() {
            Some(x) => {
                let next = acc.map_or(x, |a| op.step_float(a, x));
                acc = Some(next);
                Value::Float(next)
            }
            None => Value::Null,
        })
        .collect()
}

/// Running reduction per group (or over the whole table). Rows are emitted
/// group by group and keep their names; key columns are copied through and
/// columns holding non-numeric values are dropped.
pub fn cumulative(table: &Table, op: Cumulative) -> Result<Table> {
    let groups: Vec<Vec<usize>> = match table.grouping.partition() {
        None => vec![(0..table.length()).collect()],
        Some(partition) => partition.iter().map(|(_, mask)| mask.iter().collect()).collect(),
    };
    let order: Vec<usize> = groups.iter().flatten().copied().collect();

    let mut names = Index::new();
    let mut columns: Vec<Vec<Value>> = Vec::new();
    let mut value_columns = 0usize;

    for c in 0..table.size() {
        let name = table.columns.name_at(c).cloned().unwrap_or_default();
        let column = &table.data.columns()[c];

        if table.grouping.is_key_column(c) {
            names.add(name)?;
            columns.push(order.iter().map(|&r| column[r].clone()).collect());
            continue;
        }

        let present = || column.iter().filter(|v| !v.is_null());
        if !present().all(|v| v.as_f64().is_some()) {
            log_debug!("WINDOW", "{} drops non-numeric column {}", op.name(), name);
            continue;
        }
        let integral = present().all(|v| v.as_i64().is_some());

        let mut out = Vec::with_capacity(order.len());
        for rows in &groups {
            let cells: Vec<&Value> = rows.iter().map(|&r| &column[r]).collect();
            let run = if integral { run_int(&cells, op) } else { None };
            out.extend(run.unwrap_or_else(|| run_float(&cells, op)));
        }
        names.add(name)?;
        columns.push(out);
        value_columns += 1;
    }

    if value_columns == 0 {
        return Err(TableError::NoAggregableColumns(op.name().to_string()));
    }

    let index = Index::from_names(order.iter().filter_map(|&r| table.index.name_at(r).cloned()))?;
    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), order.len());
    Ok(Table::assemble(index, names, data))
}
