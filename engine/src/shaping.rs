//! FILENAME: engine/src/shaping.rs
//! PURPOSE: Re-labels or resizes a table, keeping cells whose (row, column)
//! identity survives.

use crate::error::Result;
use crate::index::Index;
use crate::logging::log_debug;
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::Value;

/// Fresh table with the given row and column names. A cell is copied when
/// both its row name and column name exist in the source; all others are null.
pub fn reshape(table: &Table, rows: &[Value], cols: &[Value]) -> Result<Table> {
    let index = Index::from_names(rows.iter().cloned())?;
    let columns = Index::from_names(cols.iter().cloned())?;

    let source_rows: Vec<Option<usize>> = rows.iter().map(|r| table.index.position(r)).collect();
    let data: Vec<Vec<Value>> = cols
        .iter()
        .map(|name| match table.columns.position(name) {
            Some(c) => source_rows
                .iter()
                .map(|row| row.map(|r| table.data.get(c, r).clone()).unwrap_or_default())
                .collect(),
            None => vec![Value::Null; rows.len()],
        })
        .collect();

    log_debug!("SHAPE", "reshape to {} rows x {} cols", rows.len(), cols.len());
    let mut store = ColumnStore::from_columns(data);
    store.reshape(cols.len(), rows.len());
    Ok(Table::assemble(index, columns, store))
}

/// Resizes to `n_rows` x `n_cols`. Existing names are kept positionally,
/// positions beyond them get integer names, and cells at coincident positions
/// are copied.
pub fn reshape_to(table: &Table, n_rows: usize, n_cols: usize) -> Result<Table> {
    let mut index = Index::from_names(table.index.names().iter().take(n_rows).cloned())?;
    index.extend(n_rows)?;
    let mut columns = Index::from_names(table.columns.names().iter().take(n_cols).cloned())?;
    columns.extend(n_cols)?;

    let data: Vec<Vec<Value>> = (0..n_cols)
        .map(|c| {
            (0..n_rows)
                .map(|r| table.data.try_get(c, r).cloned().unwrap_or_default())
                .collect()
        })
        .collect();

    let mut store = ColumnStore::from_columns(data);
    store.reshape(n_cols, n_rows);
    Ok(Table::assemble(index, columns, store))
}

/// Names of `a` followed by the names of `b` that `a` lacks.
fn union(a: &Index, b: &Index) -> Vec<Value> {
    let mut names: Vec<Value> = a.names().to_vec();
    names.extend(b.iter().filter(|name| !a.contains(name)).cloned());
    names
}

/// Cell-wise text diff over the union of both tables' rows and columns:
/// `""` when both are null, the value when they agree or one side is null,
/// `"a | b"` otherwise.
pub fn compare(a: &Table, b: &Table) -> Result<Table> {
    let rows = union(&a.index, &b.index);
    let cols = union(&a.columns, &b.columns);
    let left = reshape(a, &rows, &cols)?;
    let right = reshape(b, &rows, &cols)?;

    let mut differing = 0usize;
    let data: Vec<Vec<Value>> = left
        .data
        .columns()
        .iter()
        .zip(right.data.columns())
        .map(|(lcol, rcol)| {
            lcol.iter()
                .zip(rcol)
                .map(|(l, r)| {
                    let text = match (l.is_null(), r.is_null()) {
                        (true, true) => String::new(),
                        (false, true) => l.to_string(),
                        (true, false) => r.to_string(),
                        (false, false) if l == r => l.to_string(),
                        (false, false) => {
                            differing += 1;
                            format!("{} | {}", l, r)
                        }
                    };
                    Value::Text(text)
                })
                .collect()
        })
        .collect();

    log_debug!("SHAPE", "compare found {} differing cells", differing);
    let mut store = ColumnStore::from_columns(data);
    store.reshape(cols.len(), rows.len());
    Ok(Table::assemble(left.index, left.columns, store))
}

/// Same cells, rows renamed `0..n`.
pub fn reset_index(table: &Table) -> Table {
    Table::assemble(
        Index::range(table.length()),
        table.columns.clone(),
        table.data.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TableError;

    fn single_cell() -> Table {
        Table::from_parts(["b"], ["x"], vec![vec![Value::Int(42)]]).unwrap()
    }

    #[test]
    fn test_reshape_copies_coincident_cell() {
        let names = |v: &[&str]| v.iter().map(|s| Value::from(*s)).collect::<Vec<_>>();
        let shaped = reshape(&single_cell(), &names(&["a", "b", "c"]), &names(&["x", "y"])).unwrap();

        assert_eq!((shaped.length(), shaped.size()), (3, 2));
        assert_eq!(shaped.get("b", "x").unwrap(), &Value::Int(42));
        let non_null = shaped.values().iter().filter(|v| !v.is_null()).count();
        assert_eq!(non_null, 1);
    }

    #[test]
    fn test_reshape_rejects_duplicate_names() {
        let rows = vec![Value::from("a"), Value::from("a")];
        assert!(matches!(
            reshape(&single_cell(), &rows, &[]),
            Err(TableError::DuplicateName(_))
        ));
    }

    #[test]
    fn test_reshape_to_grows_and_shrinks() {
        let table = Table::from_parts(
            ["r0", "r1"],
            ["c0", "c1"],
            vec![
                vec![Value::Int(1), Value::Int(2)],
                vec![Value::Int(3), Value::Int(4)],
            ],
        )
        .unwrap();

        let grown = reshape_to(&table, 3, 1).unwrap();
        assert_eq!(
            grown.index().names(),
            &[Value::from("r0"), Value::from("r1"), Value::Int(2)]
        );
        assert_eq!(grown.columns().names(), &[Value::from("c0")]);
        assert_eq!(grown.col_at(0).unwrap(), vec![Value::Int(1), Value::Int(2), Value::Null]);
    }

    #[test]
    fn test_compare() {
        let a = Table::from_parts(
            ["r1", "r2"],
            ["v"],
            vec![vec![Value::Int(1), Value::Int(2)]],
        )
        .unwrap();
        let b = Table::from_parts(
            ["r1", "r3"],
            ["v", "w"],
            vec![
                vec![Value::Int(1), Value::Int(5)],
                vec![Value::Int(9), Value::Null],
            ],
        )
        .unwrap();

        let diff = compare(&a, &b).unwrap();
        assert_eq!(diff.length(), 3);
        assert_eq!(diff.get("r1", "v").unwrap(), &Value::from("1"));
        assert_eq!(diff.get("r2", "v").unwrap(), &Value::from("2"));
        assert_eq!(diff.get("r1", "w").unwrap(), &Value::from("9"));
        assert_eq!(diff.get("r2", "w").unwrap(), &Value::from(""));

        let changed = Table::from_parts(["r1"], ["v"], vec![vec![Value::Int(7)]]).unwrap();
        let diff = compare(&a, &changed).unwrap();
        assert_eq!(diff.get("r1", "v").unwrap(), &Value::from("1 | 7"));
    }

    #[test]
    fn test_reset_index() {
        let reset = reset_index(&single_cell());
        assert_eq!(reset.index().names(), &[Value::Int(0)]);
        assert_eq!(reset.get_at(0, 0).unwrap(), &Value::Int(42));
    }
}
