//! FILENAME: engine/src/aggregation.rs
//! PURPOSE: Reducer library and the group-apply algorithm.
//! CONTEXT: A reducer turns the cells of one column (or one group of one
//! column) into a single value. `attempt` returns `Ok(None)` when the reducer
//! cannot handle the column's values; group-apply then drops that column from
//! the result and logs it. `Err` aborts the whole call.
//!
//! Numeric reducers ignore nulls, count booleans as 0/1 and reject any other
//! non-null value. Sum, product, min and max stay integral when every input is
//! integral.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;

use crate::definition::Reducer;
use crate::error::{Result, TableError};
use crate::grouping::Grouping;
use crate::index::Index;
use crate::logging::{log_debug, log_enter, log_exit};
use crate::store::ColumnStore;
use crate::table::Table;
use crate::value::{CellKind, Value};

/// Delimiter used by `Reducer::Collapse`.
pub const COLLAPSE_DELIMITER: &str = ",";

// ============================================================================
// AGGREGATE TRAIT
// ============================================================================

/// A function from a list of cells to one summary value.
pub trait Aggregate {
    /// Name used for the result row of an ungrouped aggregation and in logs.
    fn name(&self) -> &str;

    /// Reduces `values`. `Ok(None)` marks the input as incompatible.
    fn attempt(&self, values: &[&Value]) -> Result<Option<Value>>;
}

impl Aggregate for Reducer {
    fn name(&self) -> &str {
        Reducer::name(self)
    }

    fn attempt(&self, values: &[&Value]) -> Result<Option<Value>> {
        match *self {
            Reducer::Count => Ok(Some(Value::from(non_null(values).count()))),
            Reducer::Sum => Ok(sum(values)),
            Reducer::Product => Ok(product(values)),
            Reducer::Mean => Ok(moments(values).map(|m| m.mean_value())),
            Reducer::Variance => Ok(moments(values).map(|m| m.variance())),
            Reducer::StdDev => Ok(moments(values).map(|m| m.std_dev())),
            Reducer::Skew => Ok(moments(values).map(|m| m.skew())),
            Reducer::Kurtosis => Ok(moments(values).map(|m| m.kurtosis())),
            Reducer::Min => Ok(extreme(values, Ordering::Less)),
            Reducer::Max => Ok(extreme(values, Ordering::Greater)),
            Reducer::Median => Ok(percentile(values, 50.0)),
            Reducer::Percentile(p) => {
                if !(0.0..=100.0).contains(&p) {
                    return Err(TableError::InvalidArgument(format!(
                        "percentile must be within [0, 100], got {}",
                        p
                    )));
                }
                Ok(percentile(values, p))
            }
            Reducer::Unique => unique(values).map(Some),
            Reducer::Collapse => Ok(Some(collapse(values))),
            Reducer::First => Ok(Some(non_null(values).next().cloned().unwrap_or_default())),
            Reducer::Last => Ok(Some(non_null(values).last().cloned().unwrap_or_default())),
        }
    }
}

/// Adapts a closure into an [`Aggregate`].
pub struct AggregateFn<F> {
    name: String,
    func: F,
}

impl<F> AggregateFn<F>
where
    F: Fn(&[&Value]) -> Option<Value>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        AggregateFn {
            name: name.into(),
            func,
        }
    }
}

impl<F> Aggregate for AggregateFn<F>
where
    F: Fn(&[&Value]) -> Option<Value>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn attempt(&self, values: &[&Value]) -> Result<Option<Value>> {
        Ok((self.func)(values))
    }
}

// ============================================================================
// REDUCERS
// ============================================================================

fn non_null<'a>(values: &'a [&'a Value]) -> impl Iterator<Item = &'a Value> + 'a {
    values.iter().copied().filter(|v| !v.is_null())
}

/// Numeric inputs with nulls skipped, or `None` if any cell is not numeric.
/// The flag tells whether every input was integral.
fn numbers(values: &[&Value]) -> Option<(Vec<f64>, bool)> {
    let mut out = Vec::with_capacity(values.len());
    let mut integral = true;
    for value in non_null(values) {
        out.push(value.as_f64()?);
        integral &= value.as_i64().is_some();
    }
    Some((out, integral))
}

fn integers(values: &[&Value]) -> Vec<i64> {
    non_null(values).filter_map(Value::as_i64).collect()
}

fn sum(values: &[&Value]) -> Option<Value> {
    let (floats, integral) = numbers(values)?;
    if floats.is_empty() {
        return Some(Value::Null);
    }
    if integral {
        let exact = integers(values)
            .into_iter()
            .try_fold(0i64, |acc, v| acc.checked_add(v));
        if let Some(total) = exact {
            return Some(Value::Int(total));
        }
    }
    Some(Value::Float(floats.iter().sum()))
}

fn product(values: &[&Value]) -> Option<Value> {
    let (floats, integral) = numbers(values)?;
    if floats.is_empty() {
        return Some(Value::Null);
    }
    if integral {
        let exact = integers(values)
            .into_iter()
            .try_fold(1i64, |acc, v| acc.checked_mul(v));
        if let Some(total) = exact {
            return Some(Value::Int(total));
        }
    }
    Some(Value::Float(floats.iter().product()))
}

/// Min (`Ordering::Less`) or max (`Ordering::Greater`). Numbers compare
/// numerically; a column of one other kind (text, dates) uses the value order.
fn extreme(values: &[&Value], want: Ordering) -> Option<Value> {
    let mut present = non_null(values).peekable();
    let Some(&first) = present.peek() else {
        return Some(Value::Null);
    };

    if let Some((floats, integral)) = numbers(values) {
        if integral {
            let ints = integers(values);
            let best = match want {
                Ordering::Less => ints.iter().min(),
                _ => ints.iter().max(),
            };
            return best.map(|&v| Value::Int(v));
        }
        let best = floats.into_iter().reduce(|a, b| match want {
            Ordering::Less => a.min(b),
            _ => a.max(b),
        });
        return best.map(Value::Float);
    }

    let kind = first.kind();
    if !non_null(values).all(|v| v.kind() == kind) {
        return None;
    }
    non_null(values)
        .reduce(|a, b| if b.cmp(a) == want { b } else { a })
        .cloned()
}

/// Legacy percentile estimator: position `p * (n + 1) / 100` over the sorted
/// values, interpolating between neighbours.
fn percentile(values: &[&Value], p: f64) -> Option<Value> {
    let (mut floats, _) = numbers(values)?;
    if floats.is_empty() {
        return Some(Value::Null);
    }
    floats.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = floats.len();
    if n == 1 {
        return Some(Value::Float(floats[0]));
    }
    let pos = p * (n as f64 + 1.0) / 100.0;
    let floor = pos.floor();
    let result = if pos < 1.0 {
        floats[0]
    } else if pos >= n as f64 {
        floats[n - 1]
    } else {
        let lower = floats[floor as usize - 1];
        let upper = floats[floor as usize];
        lower + (pos - floor) * (upper - lower)
    };
    Some(Value::Float(result))
}

fn unique(values: &[&Value]) -> Result<Value> {
    let mut present = non_null(values);
    let Some(first) = present.next() else {
        return Ok(Value::Null);
    };
    match present.find(|v| *v != first) {
        Some(second) => Err(TableError::NonUnique {
            first: first.clone(),
            second: second.clone(),
        }),
        None => Ok(first.clone()),
    }
}

/// Distinct non-null values in first-seen order, joined as text.
fn collapse(values: &[&Value]) -> Value {
    let mut seen = FxHashSet::default();
    let parts: Vec<String> = non_null(values)
        .filter(|v| seen.insert(*v))
        .map(ToString::to_string)
        .collect();
    if parts.is_empty() {
        Value::Null
    } else {
        Value::Text(parts.join(COLLAPSE_DELIMITER))
    }
}

fn moments(values: &[&Value]) -> Option<Moments> {
    let (floats, _) = numbers(values)?;
    let mut acc = Moments::new();
    for x in floats {
        acc.add(x);
    }
    Some(acc)
}

// ============================================================================
// MOMENT ACCUMULATOR
// ============================================================================

/// Single-pass central moments (Welford, extended to the third and fourth
/// moments).
#[derive(Debug, Clone, Default)]
pub struct Moments {
    pub n: u64,
    pub mean: f64,
    pub m2: f64,
    pub m3: f64,
    pub m4: f64,
}

impl Moments {
    pub fn new() -> Self {
        Moments {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            m3: 0.0,
            m4: 0.0,
        }
    }

    pub fn add(&mut self, x: f64) {
        let n1 = self.n as f64;
        self.n += 1;
        let n = self.n as f64;
        let delta = x - self.mean;
        let delta_n = delta / n;
        let delta_n2 = delta_n * delta_n;
        let term1 = delta * delta_n * n1;

        self.mean += delta_n;
        self.m4 += term1 * delta_n2 * (n * n - 3.0 * n + 3.0) + 6.0 * delta_n2 * self.m2
            - 4.0 * delta_n * self.m3;
        self.m3 += term1 * delta_n * (n - 2.0) - 3.0 * delta_n * self.m2;
        self.m2 += term1;
    }

    fn mean_value(&self) -> Value {
        if self.n == 0 {
            Value::Null
        } else {
            Value::Float(self.mean)
        }
    }

    fn sample_variance(&self) -> Option<f64> {
        (self.n >= 2).then(|| self.m2 / (self.n - 1) as f64)
    }

    fn variance(&self) -> Value {
        self.sample_variance().map_or(Value::Null, Value::Float)
    }

    fn std_dev(&self) -> Value {
        self.sample_variance()
            .map_or(Value::Null, |v| Value::Float(v.sqrt()))
    }

    /// Sample-adjusted skewness; needs at least three values.
    fn skew(&self) -> Value {
        if self.n < 3 {
            return Value::Null;
        }
        let n = self.n as f64;
        let variance = self.m2 / (n - 1.0);
        if variance < 1e-19 {
            return Value::Float(0.0);
        }
        let scaled = self.m3 / (variance * variance.sqrt());
        Value::Float(n / ((n - 1.0) * (n - 2.0)) * scaled)
    }

    /// Sample excess kurtosis; needs at least four values.
    fn kurtosis(&self) -> Value {
        if self.n < 4 {
            return Value::Null;
        }
        let n = self.n as f64;
        let variance = self.m2 / (n - 1.0);
        if variance < 1e-19 {
            return Value::Float(0.0);
        }
        let numerator = n * (n + 1.0) * self.m4 - 3.0 * self.m2 * self.m2 * (n - 1.0);
        let denominator = (n - 1.0) * (n - 2.0) * (n - 3.0) * variance * variance;
        Value::Float(numerator / denominator)
    }
}

// ============================================================================
// GROUP-APPLY
// ============================================================================

/// Applies `reducer` to every non-key column, once per group.
pub fn aggregate(table: &Table, reducer: &dyn Aggregate) -> Result<Table> {
    let reducers = vec![reducer; table.size()];
    group_apply(table, reducer.name(), &reducers)
}

/// Applies the default reducer for each column's kind.
pub fn aggregate_default(table: &Table) -> Result<Table> {
    let defaults: Vec<Reducer> = table
        .types()
        .into_iter()
        .map(Reducer::default_for)
        .collect();
    let reducers: Vec<&dyn Aggregate> = defaults.iter().map(|r| r as &dyn Aggregate).collect();
    group_apply(table, "aggregate", &reducers)
}

/// Non-null counts. A grouping whose columns are all keys yields group sizes
/// in a synthetic `count` column instead.
pub fn count(table: &Table) -> Result<Table> {
    if let Some(partition) = table.grouping.partition() {
        let all_keys = (0..table.size()).all(|c| table.grouping.is_key_column(c));
        if all_keys {
            let mut columns = key_columns(table);
            let mut names = Index::from_names(
                partition
                    .key_columns()
                    .iter()
                    .filter_map(|&c| table.columns.name_at(c).cloned()),
            )?;
            names.add(Value::from("count"))?;
            columns.push(
                partition
                    .iter()
                    .map(|(_, mask)| Value::from(mask.cardinality()))
                    .collect(),
            );
            let index = Index::from_names(partition.keys().iter().cloned())?;
            return Ok(Table::assemble(index, names, ColumnStore::from_columns(columns)));
        }
    }
    aggregate(table, &Reducer::Count)
}

/// Key column values (first member of each group), one column per key.
fn key_columns(table: &Table) -> Vec<Vec<Value>> {
    let Some(partition) = table.grouping.partition() else {
        return Vec::new();
    };
    partition
        .key_columns()
        .iter()
        .map(|&c| {
            partition
                .iter()
                .map(|(_, mask)| {
                    mask.next_set_bit(0)
                        .map(|row| table.data.get(c, row).clone())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

/// `reducers[c]` is applied to column `c`; key columns are copied through.
fn group_apply(table: &Table, label: &str, reducers: &[&dyn Aggregate]) -> Result<Table> {
    log_enter!("AGG", "group_apply", "{} over {} columns", label, table.size());

    let mut names = Index::new();
    let mut columns: Vec<Vec<Value>> = Vec::new();

    let index = match &table.grouping {
        Grouping::Ungrouped => {
            for (c, reducer) in reducers.iter().enumerate() {
                let cells: Vec<&Value> = table.data.columns()[c].iter().collect();
                match reducer.attempt(&cells)? {
                    Some(value) => {
                        names.add(column_name(table, c))?;
                        columns.push(vec![value]);
                    }
                    None => log_dropped(table, c, reducer.name()),
                }
            }
            Index::from_names([Value::from(label)])?
        }
        Grouping::Partitioned(partition) => {
            for &c in partition.key_columns() {
                names.add(column_name(table, c))?;
            }
            columns.extend(key_columns(table));
            let key_count = columns.len();

            for (c, reducer) in reducers.iter().enumerate() {
                if table.grouping.is_key_column(c) {
                    continue;
                }
                let mut reduced = Vec::with_capacity(partition.len());
                let mut compatible = true;
                for (_, mask) in partition.iter() {
                    let cells: Vec<&Value> = mask.iter().map(|r| table.data.get(c, r)).collect();
                    match reducer.attempt(&cells)? {
                        Some(value) => reduced.push(value),
                        None => {
                            compatible = false;
                            break;
                        }
                    }
                }
                if compatible {
                    names.add(column_name(table, c))?;
                    columns.push(reduced);
                } else {
                    log_dropped(table, c, reducer.name());
                }
            }
            if columns.len() == key_count {
                return Err(TableError::NoAggregableColumns(label.to_string()));
            }
            Index::from_names(partition.keys().iter().cloned())?
        }
    };

    if columns.is_empty() {
        return Err(TableError::NoAggregableColumns(label.to_string()));
    }

    let length = index.len();
    let mut data = ColumnStore::from_columns(columns);
    data.reshape(names.len(), length);
    log_exit!("AGG", "group_apply", "{} rows x {} cols", length, names.len());
    Ok(Table::assemble(index, names, data))
}

fn column_name(table: &Table, c: usize) -> Value {
    table.columns.name_at(c).cloned().unwrap_or_else(|| Value::from(c))
}

fn log_dropped(table: &Table, c: usize, reducer: &str) {
    log_debug!(
        "AGG",
        "dropping column {} (incompatible with {})",
        column_name(table, c),
        reducer
    );
}

// ============================================================================
// SUMMARIES
// ============================================================================

const DESCRIBE_STATS: [Reducer; 6] = [
    Reducer::Count,
    Reducer::Mean,
    Reducer::StdDev,
    Reducer::Variance,
    Reducer::Max,
    Reducer::Min,
];

/// Numeric, non-key column positions.
fn numeric_value_columns(table: &Table) -> Vec<usize> {
    table
        .types()
        .into_iter()
        .enumerate()
        .filter(|&(c, kind)| kind == CellKind::Number && !table.grouping.is_key_column(c))
        .map(|(c, _)| c)
        .collect()
}

/// Count, mean, std, var, max and min of every numeric column. Grouped tables
/// get one block of rows per group, named `(key..., stat)`.
pub fn describe(table: &Table) -> Result<Table> {
    let numeric = numeric_value_columns(table);
    if numeric.is_empty() {
        return Err(TableError::NoAggregableColumns("describe".to_string()));
    }

    let groups: Vec<(Option<&Value>, Vec<usize>)> = match table.grouping.partition() {
        None => vec![(None, (0..table.length()).collect())],
        Some(partition) => partition
            .iter()
            .map(|(key, mask)| (Some(key), mask.iter().collect()))
            .collect(),
    };

    let mut row_names = Vec::with_capacity(groups.len() * DESCRIBE_STATS.len());
    let mut columns: Vec<Vec<Value>> = vec![Vec::new(); numeric.len()];
    for (key, rows) in &groups {
        for stat in DESCRIBE_STATS {
            row_names.push(match key {
                None => Value::from(stat.name()),
                Some(key) => {
                    let mut parts = key.key_parts();
                    parts.push(Value::from(stat.name()));
                    Value::Tuple(parts)
                }
            });
            for (out, &c) in columns.iter_mut().zip(&numeric) {
                let cells: Vec<&Value> = rows.iter().map(|&r| table.data.get(c, r)).collect();
                out.push(stat.attempt(&cells)?.unwrap_or_default());
            }
        }
    }

    let names = Index::from_names(numeric.iter().map(|&c| column_name(table, c)))?;
    Ok(Table::assemble(
        Index::from_names(row_names)?,
        names,
        ColumnStore::from_columns(columns),
    ))
}

/// Online co-moment accumulator for a covariance matrix.
#[derive(Debug, Clone)]
struct CoMoments {
    n: u64,
    means: Vec<f64>,
    /// Row-major `k x k` co-moment sums.
    comoments: Vec<f64>,
}

impl CoMoments {
    fn new(k: usize) -> Self {
        CoMoments {
            n: 0,
            means: vec![0.0; k],
            comoments: vec![0.0; k * k],
        }
    }

    fn add(&mut self, row: &[f64]) {
        let k = self.means.len();
        self.n += 1;
        let n = self.n as f64;
        let deltas: Vec<f64> = row.iter().zip(&self.means).map(|(x, m)| x - m).collect();
        for (mean, delta) in self.means.iter_mut().zip(&deltas) {
            *mean += delta / n;
        }
        for i in 0..k {
            for j in 0..k {
                self.comoments[i * k + j] += deltas[i] * (row[j] - self.means[j]);
            }
        }
    }

    fn covariance(&self, i: usize, j: usize) -> Value {
        if self.n < 2 {
            return Value::Null;
        }
        let k = self.means.len();
        Value::Float(self.comoments[i * k + j] / (self.n - 1) as f64)
    }
}

/// Sample covariance matrix of the numeric columns. Rows holding a null in any
/// numeric column are skipped.
pub fn cov(table: &Table) -> Result<Table> {
    let numeric = numeric_value_columns(table);
    if numeric.is_empty() {
        return Err(TableError::NoAggregableColumns("cov".to_string()));
    }

    let k = numeric.len();
    let mut acc = CoMoments::new(k);
    let mut row = Vec::with_capacity(k);
    for r in 0..table.length() {
        row.clear();
        row.extend(numeric.iter().map_while(|&c| table.data.get(c, r).as_f64()));
        if row.len() == k {
            acc.add(&row);
        }
    }

    let names: Vec<Value> = numeric.iter().map(|&c| column_name(table, c)).collect();
    let columns: Vec<Vec<Value>> = (0..k)
        .map(|j| (0..k).map(|i| acc.covariance(i, j)).collect())
        .collect();
    Ok(Table::assemble(
        Index::from_names(names.clone())?,
        Index::from_names(names)?,
        ColumnStore::from_columns(columns),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[Value]) -> Vec<&Value> {
        values.iter().collect()
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Int(v)).collect()
    }

    fn float(value: Option<Value>) -> f64 {
        value.and_then(|v| v.as_f64()).unwrap()
    }

    #[test]
    fn test_sum_keeps_integers() {
        let values = ints(&[1, 2, 3]);
        assert_eq!(Reducer::Sum.attempt(&cells(&values)).unwrap(), Some(Value::Int(6)));

        let mixed = vec![Value::Int(1), Value::Float(0.5), Value::Null];
        assert_eq!(
            Reducer::Sum.attempt(&cells(&mixed)).unwrap(),
            Some(Value::Float(1.5))
        );
    }

    #[test]
    fn test_sum_overflow_falls_back_to_float() {
        let values = ints(&[i64::MAX, 1]);
        let result = Reducer::Sum.attempt(&cells(&values)).unwrap();
        assert!(matches!(result, Some(Value::Float(_))));
    }

    #[test]
    fn test_numeric_reducers_reject_text() {
        let values = vec![Value::Int(1), Value::from("x")];
        assert_eq!(Reducer::Sum.attempt(&cells(&values)).unwrap(), None);
        assert_eq!(Reducer::Mean.attempt(&cells(&values)).unwrap(), None);
    }

    #[test]
    fn test_booleans_count_as_numbers() {
        let values = vec![Value::Bool(true), Value::Bool(true), Value::Bool(false)];
        assert_eq!(Reducer::Sum.attempt(&cells(&values)).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn test_all_null_is_null() {
        let values = vec![Value::Null, Value::Null];
        assert_eq!(Reducer::Sum.attempt(&cells(&values)).unwrap(), Some(Value::Null));
        assert_eq!(Reducer::Max.attempt(&cells(&values)).unwrap(), Some(Value::Null));
        assert_eq!(Reducer::Count.attempt(&cells(&values)).unwrap(), Some(Value::Int(0)));
    }

    #[test]
    fn test_mean_variance_std() {
        let values = ints(&[2, 4, 4, 4, 5, 5, 7, 9]);
        let c = cells(&values);
        assert_eq!(float(Reducer::Mean.attempt(&c).unwrap()), 5.0);
        let var = float(Reducer::Variance.attempt(&c).unwrap());
        assert!((var - 32.0 / 7.0).abs() < 1e-12);
        let std = float(Reducer::StdDev.attempt(&c).unwrap());
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_skew_and_kurtosis() {
        let values = ints(&[1, 2, 3, 4, 10]);
        let c = cells(&values);
        // Reference values from the sample-adjusted estimators.
        let skew = float(Reducer::Skew.attempt(&c).unwrap());
        assert!((skew - 1.6971).abs() < 1e-3, "skew = {}", skew);
        let kurt = float(Reducer::Kurtosis.attempt(&c).unwrap());
        assert!((kurt - 3.152).abs() < 1e-3, "kurt = {}", kurt);

        let short = ints(&[1, 2]);
        assert_eq!(Reducer::Skew.attempt(&cells(&short)).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_min_max() {
        let values = ints(&[3, 1, 2]);
        assert_eq!(Reducer::Min.attempt(&cells(&values)).unwrap(), Some(Value::Int(1)));
        assert_eq!(Reducer::Max.attempt(&cells(&values)).unwrap(), Some(Value::Int(3)));

        let text = vec![Value::from("pear"), Value::from("apple")];
        assert_eq!(
            Reducer::Min.attempt(&cells(&text)).unwrap(),
            Some(Value::from("apple"))
        );

        let mixed = vec![Value::from("pear"), Value::Int(1)];
        assert_eq!(Reducer::Max.attempt(&cells(&mixed)).unwrap(), None);
    }

    #[test]
    fn test_median_and_percentile() {
        let values = ints(&[1, 2, 3, 4]);
        let c = cells(&values);
        assert_eq!(float(Reducer::Median.attempt(&c).unwrap()), 2.5);
        assert_eq!(float(Reducer::Percentile(100.0).attempt(&c).unwrap()), 4.0);
        assert_eq!(float(Reducer::Percentile(0.0).attempt(&c).unwrap()), 1.0);
        assert!(matches!(
            Reducer::Percentile(101.0).attempt(&c),
            Err(TableError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unique() {
        let same = ints(&[5, 5, 5]);
        assert_eq!(Reducer::Unique.attempt(&cells(&same)).unwrap(), Some(Value::Int(5)));

        let differ = ints(&[5, 6]);
        assert_eq!(
            Reducer::Unique.attempt(&cells(&differ)),
            Err(TableError::NonUnique {
                first: Value::Int(5),
                second: Value::Int(6),
            })
        );
    }

    #[test]
    fn test_collapse_distinct_in_order() {
        let values = vec![
            Value::from("b"),
            Value::from("a"),
            Value::Null,
            Value::from("b"),
        ];
        assert_eq!(
            Reducer::Collapse.attempt(&cells(&values)).unwrap(),
            Some(Value::from("b,a"))
        );
    }

    #[test]
    fn test_first_last_skip_nulls() {
        let values = vec![Value::Null, Value::Int(1), Value::Int(2), Value::Null];
        assert_eq!(Reducer::First.attempt(&cells(&values)).unwrap(), Some(Value::Int(1)));
        assert_eq!(Reducer::Last.attempt(&cells(&values)).unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn test_custom_aggregate() {
        let longest = AggregateFn::new("longest", |values: &[&Value]| {
            values
                .iter()
                .filter_map(|v| v.as_str())
                .max_by_key(|s| s.len())
                .map(Value::from)
        });
        let values = vec![Value::from("ab"), Value::from("abcd")];
        assert_eq!(longest.name(), "longest");
        assert_eq!(longest.attempt(&cells(&values)).unwrap(), Some(Value::from("abcd")));
    }

    #[test]
    fn test_moments_match_two_pass() {
        let data = [1.5, 2.25, -3.0, 8.0, 0.5, 4.0];
        let mut acc = Moments::new();
        data.iter().for_each(|&x| acc.add(x));
        let mean = data.iter().sum::<f64>() / data.len() as f64;
        let m2: f64 = data.iter().map(|x| (x - mean).powi(2)).sum();
        let m3: f64 = data.iter().map(|x| (x - mean).powi(3)).sum();
        let m4: f64 = data.iter().map(|x| (x - mean).powi(4)).sum();
        assert!((acc.mean - mean).abs() < 1e-12);
        assert!((acc.m2 - m2).abs() < 1e-9);
        assert!((acc.m3 - m3).abs() < 1e-9);
        assert!((acc.m4 - m4).abs() < 1e-9);
    }
}
