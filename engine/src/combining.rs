//! FILENAME: engine/src/combining.rs
//! PURPOSE: Joins, merges, cell-level fills and row concatenation.
//! CONTEXT: A join builds an ordered key -> row map for each side, keyed by row
//! name or by a key function. `Left`, `Inner` and `Outer` iterate the left side
//! and put its columns first; `Right` iterates the right side and puts its
//! columns first. Unmatched driver rows are kept (null-filled) except for
//! `Inner`; `Outer` finally appends the other side's unmatched rows.

use rustc_hash::FxHashMap;

use crate::definition::{JoinOptions, JoinType};
use crate::error::{Result, TableError};
use crate::index::Index;
use crate::logging::{log_debug, log_enter, log_exit};
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::Value;
use crate::views::{Axis, LineView};

/// How join keys are computed for one side.
pub enum JoinKey<'f> {
    /// The row names.
    RowNames,
    /// The given column positions, as a tuple when more than one.
    Columns(&'f [usize]),
    /// An arbitrary row -> key function.
    Function(&'f dyn Fn(&LineView<'_>) -> Value),
}

/// Keys of one side in row order, plus key -> row lookup.
struct KeyedRows {
    keys: Vec<Value>,
    rows: FxHashMap<Value, usize>,
}

impl KeyedRows {
    fn build(table: &Table, key: &JoinKey<'_>) -> Result<KeyedRows> {
        let mut keyed = KeyedRows {
            keys: Vec::with_capacity(table.length()),
            rows: FxHashMap::default(),
        };
        for row in 0..table.length() {
            let value = match key {
                JoinKey::RowNames => table.index.name_at(row).cloned().unwrap_or_default(),
                JoinKey::Columns(cols) => Value::key_of(
                    cols.iter().map(|&c| table.data.get(c, row).clone()).collect(),
                ),
                JoinKey::Function(f) => f(&LineView::new(table, Axis::Rows, row)),
            };
            if keyed.rows.insert(value.clone(), row).is_some() {
                return Err(TableError::JoinKeyCollision(value));
            }
            keyed.keys.push(value);
        }
        Ok(keyed)
    }
}

/// `name` with `suffix` attached: `name_suffix` for scalars, an extra tuple
/// part for tuple names.
fn suffixed(name: &Value, suffix: &str) -> Value {
    match name {
        Value::Tuple(parts) => {
            let mut parts = parts.clone();
            parts.push(Value::from(suffix));
            Value::Tuple(parts)
        }
        other => Value::Text(format!("{}_{}", other, suffix)),
    }
}

/// Output column names: `first` columns then `second` columns, with colliding
/// pairs suffixed.
fn joined_names(
    first: &Table,
    first_suffix: &str,
    second: &Table,
    second_suffix: &str,
) -> Result<Index> {
    let mut names = Index::new();
    for name in first.columns.iter() {
        if second.columns.contains(name) {
            names.add(suffixed(name, first_suffix))?;
        } else {
            names.add(name.clone())?;
        }
    }
    for name in second.columns.iter() {
        if first.columns.contains(name) {
            names.add(suffixed(name, second_suffix))?;
        } else {
            names.add(name.clone())?;
        }
    }
    Ok(names)
}

/// Appends one output row to `columns`: the `first` row (or nulls) then the
/// `second` row (or nulls).
fn push_row(
    columns: &mut [Vec<Value>],
    first: &Table,
    first_row: Option<usize>,
    second: &Table,
    second_row: Option<usize>,
) {
    let split = first.size();
    for (c, column) in columns.iter_mut().enumerate() {
        let cell = if c < split {
            first_row.map(|r| first.data.get(c, r).clone())
        } else {
            second_row.map(|r| second.data.get(c - split, r).clone())
        };
        column.push(cell.unwrap_or_default());
    }
}

/// Joins `left` and `right` on keys computed per side.
pub fn join(
    left: &Table,
    right: &Table,
    options: &JoinOptions,
    left_key: JoinKey<'_>,
    right_key: JoinKey<'_>,
) -> Result<Table> {
    log_enter!(
        "JOIN",
        "join",
        "{:?} {}x{} with {}x{}",
        options.how,
        left.length(),
        left.size(),
        right.length(),
        right.size()
    );

    let left_keys = KeyedRows::build(left, &left_key)?;
    let right_keys = KeyedRows::build(right, &right_key)?;

    // The driver side is iterated in order and its columns come first.
    let (driver, driver_keys, driver_suffix, other, other_keys, other_suffix) = match options.how
    {
        JoinType::Right => (
            right,
            &right_keys,
            options.right_suffix.as_str(),
            left,
            &left_keys,
            options.left_suffix.as_str(),
        ),
        _ => (
            left,
            &left_keys,
            options.left_suffix.as_str(),
            right,
            &right_keys,
            options.right_suffix.as_str(),
        ),
    };

    let names = joined_names(driver, driver_suffix, other, other_suffix)?;
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    let mut index = Index::new();

    for (row, key) in driver_keys.keys.iter().enumerate() {
        let matched = other_keys.rows.get(key).copied();
        if matched.is_none() && options.how == JoinType::Inner {
            continue;
        }
        index.add(key.clone())?;
        push_row(&mut columns, driver, Some(row), other, matched);
    }

    if options.how == JoinType::Outer {
        for (row, key) in other_keys.keys.iter().enumerate() {
            if driver_keys.rows.contains_key(key) {
                continue;
            }
            index.add(key.clone())?;
            push_row(&mut columns, driver, None, other, Some(row));
        }
    }

    let length = index.len();
    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), length);
    log_exit!("JOIN", "join", "{} rows", length);
    Ok(Table::assemble(index, names, data))
}

/// Joins on the shared non-numeric columns: both sides are reindexed on them
/// and joined on row names.
pub fn merge(left: &Table, right: &Table, options: &JoinOptions) -> Result<Table> {
    let right_text: Vec<&Value> = right.nonnumeric_names();
    let shared: Vec<Value> = left
        .nonnumeric_names()
        .into_iter()
        .filter(|name| right_text.contains(name))
        .cloned()
        .collect();
    if shared.is_empty() {
        return Err(TableError::InvalidArgument(
            "merge needs at least one shared non-numeric column".to_string(),
        ));
    }
    log_debug!("JOIN", "merge on {} shared columns", shared.len());

    let left = left.reindex(&shared, true)?;
    let right = right.reindex(&shared, true)?;
    join(&left, &right, options, JoinKey::RowNames, JoinKey::RowNames)
}

/// Positional cell fill from `sources` into `dest`, first non-null source
/// winning. With `only_nulls`, existing non-null cells are kept.
pub fn fill_from(dest: &mut Table, sources: &[&Table], only_nulls: bool) {
    let mut filled = 0usize;
    for col in 0..dest.size() {
        for row in 0..dest.length() {
            if only_nulls && !dest.data.get(col, row).is_null() {
                continue;
            }
            let found = sources
                .iter()
                .filter_map(|source| source.data.try_get(col, row))
                .find(|value| !value.is_null());
            if let Some(value) = found {
                dest.data.set(value.clone(), col, row);
                filled += 1;
            }
        }
    }
    log_debug!("JOIN", "filled {} cells from {} sources", filled, sources.len());
}

/// Appends the rows of `others` below `base`, column by column position.
pub fn concat(base: &Table, others: &[&Table]) -> Result<Table> {
    let expected = base.size();
    if let Some(bad) = others.iter().find(|t| t.size() != expected) {
        return Err(TableError::ShapeMismatch {
            expected,
            actual: bad.size(),
        });
    }

    let mut columns: Vec<Vec<Value>> = base.data.columns().to_vec();
    let mut index = base.index.clone();
    for other in others {
        for row in 0..other.length() {
            let mut name = other.index.name_at(row).cloned().unwrap_or_default();
            let mut pos = index.len();
            // A clashing name falls back to the first free integer from its position.
            while index.contains(&name) {
                name = Value::from(pos);
                pos += 1;
            }
            index.add(name)?;
        }
        for (column, source) in columns.iter_mut().zip(other.data.columns()) {
            column.extend(source.iter().cloned());
        }
    }

    let mut data = ColumnStore::from_columns(columns);
    data.reshape(expected, index.len());
    log_debug!("JOIN", "concat {} tables into {} rows", others.len() + 1, index.len());
    Ok(Table::assemble(index, base.columns.clone(), data))
}
