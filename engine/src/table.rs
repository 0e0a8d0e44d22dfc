//! FILENAME: engine/src/table.rs
//! PURPOSE: The `Table` facade: construction, cell access, mutation and every
//! query operation.
//! CONTEXT: A table is a row index, a column index and a column-major store
//! kept positionally in step (row `i` of every column is named
//! `index[i]`), plus an optional grouping. Structural operations return new
//! tables; only `set`, `add`, `append`, `rename`, `update`, `coalesce` and
//! `convert` modify a table in place. Every failing call leaves the table as it
//! was.

use rustc_hash::{FxHashMap, FxHashSet};
use tabula_bitset::SparseBitSet;

use crate::aggregation::{self, Aggregate};
use crate::combining::{self, JoinKey};
use crate::conversion::{self, Converter};
use crate::definition::{
    ConvertOptions, JoinOptions, ModelMatrixOptions, PivotDefinition, Reducer, SortDirection,
    SortKey,
};
use crate::error::{Result, TableError};
use crate::export;
use crate::grouping::{Grouping, Partition};
use crate::index::Index;
use crate::logging::log_debug;
use crate::pivot;
use crate::selection;
use crate::shaping;
use crate::sorting;
use crate::store::ColumnStore;
use crate::value::{CellKind, Value};
use crate::views::{Axis, FlatView, LineView, ListView, RowMap, TransformedView, TransposedView};
use crate::windows::{self, Cumulative};

/// Store of `cols` x `rows`, keeping the row count when there are no columns.
fn padded_store(columns: Vec<Vec<Value>>, cols: usize, rows: usize) -> ColumnStore {
    let mut store = ColumnStore::from_columns(columns);
    store.reshape(cols, rows);
    store
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub(crate) index: Index,
    pub(crate) columns: Index,
    pub(crate) data: ColumnStore,
    pub(crate) grouping: Grouping,
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

impl Table {
    pub fn new() -> Self {
        Table {
            index: Index::new(),
            columns: Index::new(),
            data: ColumnStore::new(),
            grouping: Grouping::Ungrouped,
        }
    }

    /// Empty table with the given column names.
    pub fn with_columns<C>(columns: C) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<Value>,
    {
        let columns = Index::from_names(columns)?;
        let mut data = ColumnStore::new();
        data.reshape(columns.len(), 0);
        Ok(Table::assemble(Index::new(), columns, data))
    }

    /// Table from row names, column names and column-major data. Missing names
    /// are generated as integers and short columns are null-padded.
    pub fn from_parts<R, C>(rows: R, columns: C, data: Vec<Vec<Value>>) -> Result<Self>
    where
        R: IntoIterator,
        R::Item: Into<Value>,
        C: IntoIterator,
        C::Item: Into<Value>,
    {
        let mut index = Index::from_names(rows)?;
        let mut columns = Index::from_names(columns)?;
        let mut data = ColumnStore::from_columns(data);

        columns.extend(data.size())?;
        index.extend(data.length())?;
        data.reshape(columns.len(), index.len());
        Ok(Table::assemble(index, columns, data))
    }

    /// Table from column names and row-major data. Rows are named `0..n`;
    /// cells beyond the column count are ignored and short rows null-padded.
    pub fn from_rows<C, R>(columns: C, rows: R) -> Result<Self>
    where
        C: IntoIterator,
        C::Item: Into<Value>,
        R: IntoIterator<Item = Vec<Value>>,
    {
        let columns = Index::from_names(columns)?;
        let mut data: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];
        let mut length = 0usize;
        for row in rows {
            let mut cells = row.into_iter();
            for column in data.iter_mut() {
                column.push(cells.next().unwrap_or_default());
            }
            length += 1;
        }
        let store = padded_store(data, columns.len(), length);
        Ok(Table::assemble(Index::range(length), columns, store))
    }

    /// Wraps already consistent parts into an ungrouped table.
    pub(crate) fn assemble(index: Index, columns: Index, data: ColumnStore) -> Self {
        debug_assert_eq!(index.len(), data.length());
        debug_assert_eq!(columns.len(), data.size());
        Table {
            index,
            columns,
            data,
            grouping: Grouping::Ungrouped,
        }
    }

    fn with_grouping(mut self, grouping: Grouping) -> Self {
        self.grouping = grouping;
        self
    }
}

// ============================================================================
// READ ACCESS
// ============================================================================

impl Table {
    /// Number of columns.
    pub fn size(&self) -> usize {
        self.data.size()
    }

    /// Number of rows.
    pub fn length(&self) -> usize {
        self.data.length()
    }

    pub fn is_empty(&self) -> bool {
        self.length() == 0
    }

    /// Row names.
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Column names.
    pub fn columns(&self) -> &Index {
        &self.columns
    }

    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// The group partition, when grouped.
    pub fn groups(&self) -> Option<&Partition> {
        self.grouping.partition()
    }

    fn col_position(&self, name: &Value) -> Result<usize> {
        self.columns.get(name)
    }

    fn col_positions<I>(&self, names: I) -> Result<Vec<usize>>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        names
            .into_iter()
            .map(|name| self.col_position(&name.into()))
            .collect()
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.length() {
            return Err(TableError::OutOfRange {
                index: row,
                len: self.length(),
            });
        }
        Ok(())
    }

    fn check_col(&self, col: usize) -> Result<()> {
        if col >= self.size() {
            return Err(TableError::OutOfRange {
                index: col,
                len: self.size(),
            });
        }
        Ok(())
    }

    /// Cell by row and column name.
    pub fn get(&self, row: impl Into<Value>, col: impl Into<Value>) -> Result<&Value> {
        let r = self.index.get(&row.into())?;
        let c = self.col_position(&col.into())?;
        Ok(self.data.get(c, r))
    }

    /// Cell by row and column position.
    pub fn get_at(&self, row: usize, col: usize) -> Result<&Value> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.data.get(col, row))
    }

    pub fn col(&self, name: impl Into<Value>) -> Result<Vec<Value>> {
        let c = self.col_position(&name.into())?;
        Ok(self.data.columns()[c].clone())
    }

    pub fn col_at(&self, col: usize) -> Result<Vec<Value>> {
        self.check_col(col)?;
        Ok(self.data.columns()[col].clone())
    }

    pub fn row(&self, name: impl Into<Value>) -> Result<Vec<Value>> {
        let r = self.index.get(&name.into())?;
        Ok(LineView::new(self, Axis::Rows, r).to_vec())
    }

    pub fn row_at(&self, row: usize) -> Result<Vec<Value>> {
        self.check_row(row)?;
        Ok(LineView::new(self, Axis::Rows, row).to_vec())
    }

    /// Kind of each column, taken from its first non-null cell (`Null` when
    /// the column is empty or all null).
    pub fn types(&self) -> Vec<CellKind> {
        self.data
            .columns()
            .iter()
            .map(|column| {
                column
                    .iter()
                    .find(|v| !v.is_null())
                    .map_or(CellKind::Null, Value::kind)
            })
            .collect()
    }

    fn columns_where(&self, keep: impl Fn(CellKind) -> bool) -> Vec<usize> {
        self.types()
            .into_iter()
            .enumerate()
            .filter(|&(_, kind)| keep(kind))
            .map(|(c, _)| c)
            .collect()
    }

    pub(crate) fn nonnumeric_names(&self) -> Vec<&Value> {
        self.columns_where(|kind| kind != CellKind::Number)
            .into_iter()
            .filter_map(|c| self.columns.name_at(c))
            .collect()
    }

    fn select_columns(&self, cols: &[usize]) -> Result<Table> {
        let rows = SparseBitSet::from_range(0..self.length())?;
        let mask: SparseBitSet = cols.iter().copied().collect();
        Ok(selection::materialize(self, &rows, Some(&mask)))
    }

    /// Only the numeric columns.
    pub fn numeric(&self) -> Result<Table> {
        self.select_columns(&self.columns_where(|kind| kind == CellKind::Number))
    }

    /// Every column that is not numeric.
    pub fn nonnumeric(&self) -> Result<Table> {
        self.select_columns(&self.columns_where(|kind| kind != CellKind::Number))
    }

    /// Rows as a lazy list.
    pub fn rows(&self) -> ListView<'_> {
        ListView::new(self, Axis::Rows)
    }

    /// Columns as a lazy list.
    pub fn columns_view(&self) -> ListView<'_> {
        ListView::new(self, Axis::Columns)
    }

    /// Every cell, column-major.
    pub fn values(&self) -> FlatView<'_> {
        FlatView::new(self)
    }

    /// Rows as name -> value maps.
    pub fn itermap(&self) -> impl Iterator<Item = RowMap<'_>> + '_ {
        self.rows().iter().map(|row| row.as_map())
    }

    /// Rows and columns swapped, without copying.
    pub fn transposed(&self) -> TransposedView<'_> {
        TransposedView::new(self)
    }
}

// ============================================================================
// MUTATION
// ============================================================================

impl Table {
    /// Adds an all-null column.
    pub fn add(&mut self, name: impl Into<Value>) -> Result<()> {
        self.add_with(name, Vec::new())
    }

    /// Adds a column, null-padded or truncated to the row count. An empty
    /// table takes its row count from the column.
    pub fn add_with(&mut self, name: impl Into<Value>, values: Vec<Value>) -> Result<()> {
        let name = name.into();
        if self.columns.contains(&name) {
            return Err(TableError::DuplicateName(name));
        }
        let length = if self.size() == 0 && self.length() == 0 {
            values.len()
        } else {
            self.length()
        };
        let mut index = self.index.clone();
        index.extend(length)?;

        self.columns.add(name)?;
        self.data.add(values);
        self.index = index;
        Ok(())
    }

    /// Appends a row named by its position.
    pub fn append(&mut self, row: Vec<Value>) -> Result<()> {
        let name = Value::from(self.length());
        self.append_named(name, row)
    }

    /// Appends a row. Extra cells are ignored, missing cells are null.
    pub fn append_named(&mut self, name: impl Into<Value>, row: Vec<Value>) -> Result<()> {
        let r = self.index.add(name.into())?;
        self.data.reshape(self.size(), r + 1);
        for (c, value) in row.into_iter().take(self.size()).enumerate() {
            self.data.set(value, c, r);
        }
        Ok(())
    }

    /// Sets a cell by row and column name.
    pub fn set(
        &mut self,
        row: impl Into<Value>,
        col: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<()> {
        let r = self.index.get(&row.into())?;
        let c = self.col_position(&col.into())?;
        self.data.set(value.into(), c, r);
        Ok(())
    }

    /// Sets a cell by position.
    pub fn set_at(&mut self, row: usize, col: usize, value: impl Into<Value>) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        self.data.set(value.into(), col, row);
        Ok(())
    }

    /// Renames columns in place.
    pub fn rename<I, K, V>(&mut self, renames: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        self.columns
            .rename(renames.into_iter().map(|(k, v)| (k.into(), v.into())))
    }

    /// Renames rows in place.
    pub fn rename_index<I, K, V>(&mut self, renames: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        self.index
            .rename(renames.into_iter().map(|(k, v)| (k.into(), v.into())))
    }

    pub(crate) fn replace_column(&mut self, col: usize, values: Vec<Value>) {
        for (r, value) in values.into_iter().enumerate().take(self.length()) {
            self.data.set(value, col, r);
        }
    }

    /// Overwrites cells with the first non-null cell at the same position in
    /// `sources`.
    pub fn update(&mut self, sources: &[&Table]) {
        combining::fill_from(self, sources, false);
    }

    /// Fills null cells from the first non-null cell at the same position in
    /// `sources`.
    pub fn coalesce(&mut self, sources: &[&Table]) {
        combining::fill_from(self, sources, true);
    }

    /// Coerces text columns to typed values, in place.
    pub fn convert(&mut self, options: &ConvertOptions) {
        conversion::convert(self, options);
    }

    /// Forces the named columns to the given kinds, in place.
    pub fn convert_columns<I, K>(&mut self, kinds: I, options: &ConvertOptions) -> Result<()>
    where
        I: IntoIterator<Item = (K, CellKind)>,
        K: Into<Value>,
    {
        let targets = kinds
            .into_iter()
            .map(|(name, kind)| {
                self.col_position(&name.into())
                    .map(|c| (c, Converter::for_kind(kind, options.number_default)))
            })
            .collect::<Result<Vec<_>>>()?;
        conversion::convert_columns(self, &targets, options);
        Ok(())
    }
}

// ============================================================================
// COLUMN AND ROW SUBSETS
// ============================================================================

impl Table {
    /// Without the named columns.
    pub fn drop<I>(&self, cols: I) -> Result<Table>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let dropped: FxHashSet<usize> = self.col_positions(cols)?.into_iter().collect();
        let kept: Vec<usize> = (0..self.size()).filter(|c| !dropped.contains(c)).collect();
        self.select_columns(&kept)
    }

    /// Only the named columns, in table order.
    pub fn retain<I>(&self, cols: I) -> Result<Table>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut kept = self.col_positions(cols)?;
        kept.sort_unstable();
        self.select_columns(&kept)
    }

    /// Rows renamed by the values of `cols` (a tuple for several columns),
    /// optionally dropping those columns.
    pub fn reindex(&self, cols: &[Value], drop: bool) -> Result<Table> {
        let positions = self.col_positions(cols.iter())?;
        let names = (0..self.length()).map(|r| {
            Value::key_of(positions.iter().map(|&c| self.data.get(c, r).clone()).collect())
        });
        let index = Index::from_names(names)?;

        let mut table = if drop { self.drop(cols.iter())? } else { self.clone() };
        table.index = index;
        table.grouping = Grouping::Ungrouped;
        Ok(table)
    }

    /// Rows for which `predicate` holds.
    pub fn select<F>(&self, predicate: F) -> Result<Table>
    where
        F: FnMut(&LineView<'_>) -> bool,
    {
        let mask = selection::select(self, predicate)?;
        Ok(selection::materialize(self, &mask, None))
    }

    pub fn head(&self, n: usize) -> Result<Table> {
        Ok(selection::materialize(self, &selection::head(self, n)?, None))
    }

    pub fn tail(&self, n: usize) -> Result<Table> {
        Ok(selection::materialize(self, &selection::tail(self, n)?, None))
    }

    /// Rows `rows` and columns `cols` (end exclusive, clamped to the shape).
    pub fn slice(
        &self,
        rows: std::ops::Range<usize>,
        cols: std::ops::Range<usize>,
    ) -> Result<Table> {
        let (row_mask, col_mask) = selection::slice(self, rows, cols)?;
        Ok(selection::materialize(self, &row_mask, Some(&col_mask)))
    }

    /// Rows without any null cell.
    pub fn dropna(&self) -> Result<Table> {
        self.select(|row| row.iter().all(|v| !v.is_null()))
    }

    /// First row for each distinct combination of `cols`.
    pub fn unique_by<I>(&self, cols: I) -> Result<Table>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let positions = self.col_positions(cols)?;
        let mut seen = FxHashSet::default();
        let mut mask = SparseBitSet::new();
        for r in 0..self.length() {
            let key = Value::key_of(positions.iter().map(|&c| self.data.get(c, r).clone()).collect());
            if seen.insert(key) {
                mask.set(r)?;
            }
        }
        Ok(selection::materialize(self, &mask, None))
    }
}

// ============================================================================
// ELEMENT-WISE TRANSFORMS
// ============================================================================

impl Table {
    /// `func` applied to every cell.
    pub fn apply<F>(&self, func: F) -> Table
    where
        F: Fn(&Value) -> Value,
    {
        let columns = TransformedView::new(self, func).to_columns();
        Table::assemble(
            self.index.clone(),
            self.columns.clone(),
            padded_store(columns, self.size(), self.length()),
        )
    }

    /// Each row replaced by the rows `func` returns for it; output rows are
    /// named by position.
    pub fn transform<F>(&self, mut func: F) -> Result<Table>
    where
        F: FnMut(&LineView<'_>) -> Vec<Vec<Value>>,
    {
        let mut out = Table::with_columns(self.columns.iter().cloned())?;
        for row in self.rows().iter() {
            for produced in func(&row) {
                out.append(produced)?;
            }
        }
        Ok(out)
    }

    /// Null cells replaced by `fill`.
    pub fn fillna(&self, fill: impl Into<Value>) -> Table {
        let fill = fill.into();
        self.apply(|v| if v.is_null() { fill.clone() } else { v.clone() })
    }

    /// `true` where a cell is null.
    pub fn isnull(&self) -> Table {
        self.apply(|v| Value::Bool(v.is_null()))
    }

    /// `true` where a cell is not null.
    pub fn notnull(&self) -> Table {
        self.apply(|v| Value::Bool(!v.is_null()))
    }

    /// Rows become columns and columns become rows.
    pub fn transpose(&self) -> Table {
        let columns = self.transposed().to_columns();
        Table::assemble(
            self.columns.clone(),
            self.index.clone(),
            padded_store(columns, self.length(), self.size()),
        )
    }
}

// ============================================================================
// GROUPING AND AGGREGATION
// ============================================================================

impl Table {
    /// Grouped by the named columns.
    pub fn group_by<I>(&self, cols: I) -> Result<Table>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let positions = self.col_positions(cols)?;
        let grouping = Grouping::by_columns(self, &positions)?;
        Ok(self.clone().with_grouping(grouping))
    }

    /// Grouped by a row -> key function.
    pub fn group_by_fn<F>(&self, key: F) -> Result<Table>
    where
        F: FnMut(&LineView<'_>) -> Value,
    {
        let grouping = Grouping::by_key(self, key)?;
        Ok(self.clone().with_grouping(grouping))
    }

    /// One sub-table per group, in group order. An ungrouped table yields
    /// itself under a null key.
    pub fn explode(&self) -> Vec<(Value, Table)> {
        match self.grouping.partition() {
            None => {
                let mut whole = self.clone();
                whole.grouping = Grouping::Ungrouped;
                vec![(Value::Null, whole)]
            }
            Some(partition) => partition
                .iter()
                .map(|(key, mask)| (key.clone(), selection::materialize(self, mask, None)))
                .collect(),
        }
    }

    /// Applies `reducer` per group (or to whole columns when ungrouped).
    pub fn aggregate(&self, reducer: &dyn Aggregate) -> Result<Table> {
        aggregation::aggregate(self, reducer)
    }

    /// Applies the default reducer for each column's kind.
    pub fn aggregate_default(&self) -> Result<Table> {
        aggregation::aggregate_default(self)
    }

    pub fn count(&self) -> Result<Table> {
        aggregation::count(self)
    }

    pub fn sum(&self) -> Result<Table> {
        self.aggregate(&Reducer::Sum)
    }

    pub fn prod(&self) -> Result<Table> {
        self.aggregate(&Reducer::Product)
    }

    pub fn mean(&self) -> Result<Table> {
        self.aggregate(&Reducer::Mean)
    }

    pub fn stddev(&self) -> Result<Table> {
        self.aggregate(&Reducer::StdDev)
    }

    pub fn var(&self) -> Result<Table> {
        self.aggregate(&Reducer::Variance)
    }

    pub fn skew(&self) -> Result<Table> {
        self.aggregate(&Reducer::Skew)
    }

    pub fn kurt(&self) -> Result<Table> {
        self.aggregate(&Reducer::Kurtosis)
    }

    pub fn min(&self) -> Result<Table> {
        self.aggregate(&Reducer::Min)
    }

    pub fn max(&self) -> Result<Table> {
        self.aggregate(&Reducer::Max)
    }

    pub fn median(&self) -> Result<Table> {
        self.aggregate(&Reducer::Median)
    }

    pub fn percentile(&self, p: f64) -> Result<Table> {
        self.aggregate(&Reducer::Percentile(p))
    }

    /// The single distinct value of each column per group; fails when a
    /// group holds two different values.
    pub fn unique(&self) -> Result<Table> {
        self.aggregate(&Reducer::Unique)
    }

    pub fn collapse(&self) -> Result<Table> {
        self.aggregate(&Reducer::Collapse)
    }

    pub fn first(&self) -> Result<Table> {
        self.aggregate(&Reducer::First)
    }

    pub fn last(&self) -> Result<Table> {
        self.aggregate(&Reducer::Last)
    }

    pub fn describe(&self) -> Result<Table> {
        aggregation::describe(self)
    }

    pub fn cov(&self) -> Result<Table> {
        aggregation::cov(self)
    }

    pub fn cumsum(&self) -> Result<Table> {
        windows::cumulative(self, Cumulative::Sum)
    }

    pub fn cumprod(&self) -> Result<Table> {
        windows::cumulative(self, Cumulative::Product)
    }

    pub fn cummin(&self) -> Result<Table> {
        windows::cumulative(self, Cumulative::Min)
    }

    pub fn cummax(&self) -> Result<Table> {
        windows::cumulative(self, Cumulative::Max)
    }

    /// Wide table described by `definition`.
    pub fn pivot(&self, definition: &PivotDefinition) -> Result<Table> {
        pivot::pivot(self, definition)
    }
}

// ============================================================================
// ORDERING
// ============================================================================

impl Table {
    /// Sorted by columns given as `"name"` (ascending) or `"-name"`
    /// (descending).
    pub fn sort_by<I, S>(&self, keys: I) -> Result<Table>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys: Vec<SortKey> = keys.into_iter().map(|k| SortKey::parse(k.as_ref())).collect();
        self.sort_by_keys(&keys)
    }

    pub fn sort_by_keys(&self, keys: &[SortKey]) -> Result<Table> {
        let resolved = keys
            .iter()
            .map(|key| self.col_position(&key.column).map(|c| (c, key.direction)))
            .collect::<Result<Vec<_>>>()?;
        let order = sorting::sort_order(self, &resolved);
        Ok(sorting::permute(self, &order))
    }

    /// Sorted by row name.
    pub fn sort_by_index(&self, direction: SortDirection) -> Table {
        sorting::permute(self, &sorting::index_order(self, direction))
    }
}

// ============================================================================
// COMBINING
// ============================================================================

impl Table {
    /// Joins on row names.
    pub fn join(&self, right: &Table, options: &JoinOptions) -> Result<Table> {
        combining::join(self, right, options, JoinKey::RowNames, JoinKey::RowNames)
    }

    /// Joins on a key computed from each row of either side.
    pub fn join_by<F>(&self, right: &Table, options: &JoinOptions, key: F) -> Result<Table>
    where
        F: Fn(&LineView<'_>) -> Value,
    {
        combining::join(
            self,
            right,
            options,
            JoinKey::Function(&key),
            JoinKey::Function(&key),
        )
    }

    /// Joins on the columns at `cols`, taken at the same positions on both
    /// sides.
    pub fn join_on(&self, right: &Table, options: &JoinOptions, cols: &[usize]) -> Result<Table> {
        for &c in cols {
            self.check_col(c)?;
            right.check_col(c)?;
        }
        combining::join(
            self,
            right,
            options,
            JoinKey::Columns(cols),
            JoinKey::Columns(cols),
        )
    }

    /// Joins on the non-numeric columns both sides share.
    pub fn merge(&self, right: &Table, options: &JoinOptions) -> Result<Table> {
        combining::merge(self, right, options)
    }

    /// Rows of `others` appended by column position.
    pub fn concat(&self, others: &[&Table]) -> Result<Table> {
        combining::concat(self, others)
    }
}

// ============================================================================
// WINDOWS AND SHAPING
// ============================================================================

impl Table {
    pub fn diff(&self, period: usize) -> Result<Table> {
        windows::diff(self, period)
    }

    pub fn percent_change(&self, period: usize) -> Result<Table> {
        windows::percent_change(self, period)
    }

    pub fn rollapply<F>(&self, period: usize, func: F) -> Result<Table>
    where
        F: Fn(&[Value]) -> Value,
    {
        windows::rollapply(self, period, func)
    }

    /// Re-labelled to `rows` x `cols`, keeping cells whose names survive.
    pub fn reshape<R, C>(&self, rows: R, cols: C) -> Result<Table>
    where
        R: IntoIterator,
        R::Item: Into<Value>,
        C: IntoIterator,
        C::Item: Into<Value>,
    {
        let rows: Vec<Value> = rows.into_iter().map(Into::into).collect();
        let cols: Vec<Value> = cols.into_iter().map(Into::into).collect();
        shaping::reshape(self, &rows, &cols)
    }

    /// Resized to `n_rows` x `n_cols` by position.
    pub fn reshape_to(&self, n_rows: usize, n_cols: usize) -> Result<Table> {
        shaping::reshape_to(self, n_rows, n_cols)
    }

    /// Cell-wise text diff against `other`.
    pub fn compare(&self, other: &Table) -> Result<Table> {
        shaping::compare(self, other)
    }

    /// Rows renamed `0..n`.
    pub fn reset_index(&self) -> Table {
        shaping::reset_index(self)
    }
}

// ============================================================================
// EXPORT
// ============================================================================

impl Table {
    /// Row-major cells.
    pub fn to_array(&self) -> Vec<Vec<Value>> {
        export::to_array(self)
    }

    /// Dense numeric matrix with dummy-encoded non-numeric columns.
    pub fn to_model_matrix(&self, options: &ModelMatrixOptions) -> Vec<Vec<f64>> {
        export::to_model_matrix(self, options)
    }

    pub fn model_matrix_table(&self, options: &ModelMatrixOptions) -> Result<Table> {
        export::model_matrix_table(self, options)
    }

    /// Row name -> row cells.
    pub fn map(&self) -> FxHashMap<Value, Vec<Value>> {
        export::map(self)
    }

    /// Values of column `key` -> values of column `value`.
    pub fn map_columns(
        &self,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<FxHashMap<Value, Value>> {
        let k = self.col_position(&key.into())?;
        let v = self.col_position(&value.into())?;
        log_debug!("EXPORT", "map column {} -> {}", k, v);
        Ok(export::map_columns(self, k, v))
    }
}
