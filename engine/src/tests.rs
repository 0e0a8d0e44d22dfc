//! FILENAME: engine/src/tests.rs
//! PURPOSE: End-to-end tests for the table engine: worked scenarios and
//! properties checked over generated inputs.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::definition::{JoinOptions, JoinType, PivotDefinition, Reducer, SortDirection};
use crate::error::TableError;
use crate::index::Index;
use crate::table::Table;
use crate::value::Value;
use tabula_bitset::SparseBitSet;

/// Small deterministic generator so property checks are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next() % n
    }
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|&v| Value::Int(v)).collect()
}

// ========================================
// SCENARIOS
// ========================================

#[test]
fn test_group_count_by_single_column() {
    let table = Table::from_parts(Vec::<Value>::new(), ["value"], vec![ints(&[1, 1, 1, 2, 2])])
        .unwrap();
    let counts = table.group_by(["value"]).unwrap().count().unwrap();

    assert_eq!(counts.length(), 2);
    assert_eq!(counts.index().names(), &[Value::Int(1), Value::Int(2)]);
    assert_eq!(counts.get(1, "count").unwrap(), &Value::Int(3));
    assert_eq!(counts.get(2, "count").unwrap(), &Value::Int(2));
}

#[test]
fn test_sort_descending_then_head() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["name", "value"],
        vec![
            vec![Value::from("alpha"), Value::from("bravo"), Value::from("charlie")],
            ints(&[10, 20, 30]),
        ],
    )
    .unwrap();

    let top = table.sort_by(["-value"]).unwrap().head(1).unwrap();
    assert_eq!(top.length(), 1);
    assert_eq!(top.row_at(0).unwrap(), vec![Value::from("charlie"), Value::Int(30)]);
}

#[test]
fn test_bitset_sparse_members() {
    let mut set = SparseBitSet::new();
    set.set(5).unwrap();
    set.set(100).unwrap();
    set.set(1000).unwrap();

    assert_eq!(set.cardinality(), 3);
    assert_eq!(set.next_set_bit(6), Some(100));
    assert_eq!(set.next_set_bit(1001), None);
}

fn keyed(rows: [&str; 3], cols: [&str; 2], data: [[i64; 2]; 3]) -> Table {
    let columns = (0..2)
        .map(|c| data.iter().map(|row| Value::Int(row[c])).collect())
        .collect();
    Table::from_parts(rows, cols, columns).unwrap()
}

#[test]
fn test_default_join_is_left() {
    let left = keyed(["one", "two", "three"], ["a", "b"], [[1, 2], [3, 4], [5, 6]]);
    let right = keyed(["one", "two", "four"], ["a", "b"], [[10, 20], [30, 40], [50, 60]]);

    let joined = left.join(&right, &JoinOptions::default()).unwrap();
    assert_eq!(
        joined.index().names(),
        &[Value::from("one"), Value::from("two"), Value::from("three")]
    );
    assert_eq!(
        joined.columns().names(),
        &[
            Value::from("a_left"),
            Value::from("b_left"),
            Value::from("a_right"),
            Value::from("b_right"),
        ]
    );
    assert_eq!(joined.get("two", "b_right").unwrap(), &Value::Int(40));
    assert_eq!(joined.get("three", "a_right").unwrap(), &Value::Null);
    assert_eq!(joined.get("three", "b_right").unwrap(), &Value::Null);
}

#[test]
fn test_unique_reducer_per_group() {
    let table = Table::from_rows(
        ["k", "v"],
        vec![
            vec![Value::from("x"), Value::Int(5)],
            vec![Value::from("x"), Value::Int(5)],
            vec![Value::from("x"), Value::Int(5)],
            vec![Value::from("y"), Value::Int(5)],
            vec![Value::from("y"), Value::Int(6)],
        ],
    )
    .unwrap();

    let only_x = table
        .select(|row| row.get(0) == Some(&Value::from("x")))
        .unwrap();
    let unique = only_x.group_by(["k"]).unwrap().unique().unwrap();
    assert_eq!(unique.get("x", "v").unwrap(), &Value::Int(5));

    let err = table.group_by(["k"]).unwrap().unique().unwrap_err();
    assert!(matches!(err, TableError::NonUnique { .. }));
}

#[test]
fn test_reshape_keeps_only_coincident_cell() {
    let source = Table::from_parts(["b"], ["x"], vec![vec![Value::Int(7)]]).unwrap();
    let shaped = source.reshape(["a", "b", "c"], ["x", "y"]).unwrap();

    assert_eq!((shaped.length(), shaped.size()), (3, 2));
    assert_eq!(shaped.get("b", "x").unwrap(), &Value::Int(7));
    assert_eq!(shaped.values().iter().filter(|v| !v.is_null()).count(), 1);
}

// ========================================
// PROPERTIES
// ========================================

#[test]
fn test_index_uniqueness_and_extend() {
    let mut rng = Lcg(7);
    for _ in 0..20 {
        let count = rng.below(10) as usize;
        let mut index = Index::from_names((0..count).map(|i| format!("n{}", i))).unwrap();
        if count > 0 {
            assert!(matches!(
                index.add(Value::from("n0")),
                Err(TableError::DuplicateName(_))
            ));
        }

        let before = index.len();
        let target = rng.below(20) as usize;
        index.extend(target).unwrap();
        assert_eq!(index.len(), target.max(before));

        let distinct: FxHashSet<&Value> = index.iter().collect();
        assert_eq!(distinct.len(), index.len());
    }
}

#[test]
fn test_bitset_matches_model() {
    let mut rng = Lcg(42);
    let mut set = SparseBitSet::new();
    let mut model = BTreeSet::new();

    for _ in 0..2000 {
        // Mix dense low indices with sparse far ones.
        let index = if rng.below(4) == 0 {
            rng.below(5_000_000) as usize
        } else {
            rng.below(300) as usize
        };
        if rng.below(3) == 0 {
            set.clear(index).unwrap();
            model.remove(&index);
        } else {
            set.set(index).unwrap();
            model.insert(index);
        }
    }

    assert_eq!(set.cardinality(), model.len());
    assert!(model.iter().all(|&i| set.get(i)));
    assert_eq!(set.iter().collect::<Vec<_>>(), model.iter().copied().collect::<Vec<_>>());

    for _ in 0..200 {
        let from = rng.below(5_100_000) as usize;
        assert_eq!(set.next_set_bit(from), model.range(from..).next().copied());
    }
}

fn random_table(rng: &mut Lcg, rows: usize) -> Table {
    let groups = ["a", "b", "c", "d"];
    Table::from_rows(
        ["group", "v"],
        (0..rows).map(|_| {
            let v = if rng.below(6) == 0 {
                Value::Null
            } else {
                Value::Int(rng.below(50) as i64 - 25)
            };
            vec![Value::from(groups[rng.below(4) as usize]), v]
        }),
    )
    .unwrap()
}

#[test]
fn test_group_partition_covers_rows_once() {
    let mut rng = Lcg(3);
    for rows in [0usize, 1, 17, 64] {
        let grouped = random_table(&mut rng, rows).group_by(["group"]).unwrap();
        let mut seen = SparseBitSet::new();
        let mut total = 0;
        if let Some(partition) = grouped.groups() {
            for (_, mask) in partition.iter() {
                for row in mask.iter() {
                    assert!(!seen.get(row), "row {} in two groups", row);
                    seen.set(row).unwrap();
                }
                total += mask.cardinality();
            }
        }
        assert_eq!(total, rows);
        assert_eq!(seen.iter().collect::<Vec<_>>(), (0..rows).collect::<Vec<_>>());

        let exploded: usize = grouped.explode().iter().map(|(_, t)| t.length()).sum();
        assert_eq!(exploded, rows);
    }
}

fn named_rows(rng: &mut Lcg, prefix: &str, universe: u64) -> Table {
    let mut table = Table::with_columns([format!("{}_v", prefix)]).unwrap();
    let mut used = FxHashSet::default();
    for _ in 0..rng.below(12) {
        let name = rng.below(universe) as i64;
        if used.insert(name) {
            table.append_named(name, vec![Value::Int(name * 10)]).unwrap();
        }
    }
    table
}

#[test]
fn test_join_cardinality() {
    let mut rng = Lcg(11);
    for _ in 0..30 {
        let left = named_rows(&mut rng, "l", 15);
        let right = named_rows(&mut rng, "r", 15);
        let (n, m) = (left.length(), right.length());
        let len = |how| left.join(&right, &JoinOptions::new(how)).unwrap().length();

        assert!(len(JoinType::Inner) <= n.min(m));
        assert_eq!(len(JoinType::Left), n);
        assert_eq!(len(JoinType::Right), m);
        let outer = len(JoinType::Outer);
        assert!(outer <= n + m);
        assert!(outer >= n.max(m));
    }
}

#[test]
fn test_sort_is_ordered() {
    let mut rng = Lcg(5);
    for rows in [0usize, 2, 31] {
        let table = random_table(&mut rng, rows);
        let sorted = table.sort_by(["v"]).unwrap();
        let column = sorted.col("v").unwrap();
        assert!(column.windows(2).all(|w| w[0] <= w[1]));

        let descending = table.sort_by(["-v"]).unwrap().col("v").unwrap();
        assert!(descending.windows(2).all(|w| w[0] >= w[1]));

        let by_index = sorted.sort_by_index(SortDirection::Ascending);
        assert_eq!(by_index.col("v").unwrap(), table.col("v").unwrap());
    }
}

#[test]
fn test_pivot_row_sums_match_group_sums() {
    let mut rng = Lcg(9);
    let products = ["tea", "coffee", "cocoa"];
    let regions = ["north", "south", "east"];
    let table = Table::from_rows(
        ["region", "product", "units"],
        (0..40).map(|_| {
            vec![
                Value::from(regions[rng.below(3) as usize]),
                Value::from(products[rng.below(3) as usize]),
                Value::Int(rng.below(100) as i64),
            ]
        }),
    )
    .unwrap();

    let pivoted = table
        .pivot(&PivotDefinition::new(["region"], ["product"], ["units"]).with_reducer(Reducer::Sum))
        .unwrap();
    let grouped = table
        .retain(["region", "units"])
        .unwrap()
        .group_by(["region"])
        .unwrap()
        .sum()
        .unwrap();

    assert_eq!(pivoted.length(), grouped.length());
    for row in pivoted.rows().iter() {
        let across: i64 = row.iter().skip(1).filter_map(Value::as_i64).sum();
        assert_eq!(grouped.get(row.name().clone(), "units").unwrap(), &Value::Int(across));
    }
}

// ========================================
// FACADE
// ========================================

fn text(values: &[&str]) -> Vec<Value> {
    values.iter().map(|&v| Value::from(v)).collect()
}

fn assert_close(value: &Value, expected: f64) {
    let actual = value.as_f64().unwrap();
    assert!((actual - expected).abs() < 1e-9, "{} != {}", actual, expected);
}

#[test]
fn test_merge_on_shared_text_column() {
    let left = Table::from_parts(
        Vec::<Value>::new(),
        ["name", "a"],
        vec![text(&["x", "y", "z"]), ints(&[1, 2, 3])],
    )
    .unwrap();
    let right = Table::from_parts(
        Vec::<Value>::new(),
        ["name", "b"],
        vec![text(&["y", "x"]), ints(&[20, 10])],
    )
    .unwrap();

    let merged = left.merge(&right, &JoinOptions::default()).unwrap();
    assert_eq!(merged.index().names(), text(&["x", "y", "z"]).as_slice());
    assert_eq!(merged.columns().names(), text(&["a", "b"]).as_slice());
    assert_eq!(merged.get("x", "b").unwrap(), &Value::Int(10));
    assert_eq!(merged.get("y", "a").unwrap(), &Value::Int(2));
    assert_eq!(merged.get("z", "b").unwrap(), &Value::Null);

    let numbers = Table::from_rows(["a"], vec![ints(&[1])]).unwrap();
    assert!(matches!(
        left.merge(&numbers, &JoinOptions::default()),
        Err(TableError::InvalidArgument(_))
    ));
}

#[test]
fn test_join_on_same_positions() {
    let left = Table::from_parts(
        Vec::<Value>::new(),
        ["k", "v"],
        vec![text(&["p", "q"]), ints(&[1, 2])],
    )
    .unwrap();
    let right = Table::from_parts(
        Vec::<Value>::new(),
        ["k", "w"],
        vec![text(&["q", "r"]), ints(&[30, 40])],
    )
    .unwrap();

    let joined = left
        .join_on(&right, &JoinOptions::new(JoinType::Inner), &[0])
        .unwrap();
    assert_eq!(joined.index().names(), text(&["q"]).as_slice());
    assert_eq!(
        joined.columns().names(),
        text(&["k_left", "v", "k_right", "w"]).as_slice()
    );
    assert_eq!(joined.get("q", "v").unwrap(), &Value::Int(2));
    assert_eq!(joined.get("q", "w").unwrap(), &Value::Int(30));

    assert!(matches!(
        left.join_on(&right, &JoinOptions::default(), &[2]),
        Err(TableError::OutOfRange { .. })
    ));
}

#[test]
fn test_describe_numeric_columns() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["x", "label"],
        vec![ints(&[1, 2, 3]), text(&["a", "b", "c"])],
    )
    .unwrap();

    let summary = table.describe().unwrap();
    assert_eq!(
        summary.index().names(),
        text(&["count", "mean", "std", "var", "max", "min"]).as_slice()
    );
    assert_eq!(summary.columns().names(), text(&["x"]).as_slice());
    assert_eq!(summary.get("count", "x").unwrap(), &Value::Int(3));
    assert_close(summary.get("mean", "x").unwrap(), 2.0);
    assert_close(summary.get("std", "x").unwrap(), 1.0);
    assert_close(summary.get("var", "x").unwrap(), 1.0);
    assert_eq!(summary.get("max", "x").unwrap(), &Value::Int(3));
    assert_eq!(summary.get("min", "x").unwrap(), &Value::Int(1));

    let labels = Table::from_parts(Vec::<Value>::new(), ["label"], vec![text(&["a"])]).unwrap();
    assert_eq!(
        labels.describe(),
        Err(TableError::NoAggregableColumns("describe".to_string()))
    );
}

#[test]
fn test_cov_matrix() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["x", "y"],
        vec![ints(&[1, 2, 3]), ints(&[1, 3, 6])],
    )
    .unwrap();

    let matrix = table.cov().unwrap();
    assert_eq!(matrix.index().names(), text(&["x", "y"]).as_slice());
    assert_eq!(matrix.columns().names(), text(&["x", "y"]).as_slice());
    assert_close(matrix.get("x", "x").unwrap(), 1.0);
    assert_close(matrix.get("x", "y").unwrap(), 2.5);
    assert_close(matrix.get("y", "x").unwrap(), 2.5);
    assert_close(matrix.get("y", "y").unwrap(), 19.0 / 3.0);
}

#[test]
fn test_aggregate_default_by_kind() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["n", "s"],
        vec![ints(&[1, 2, 3]), text(&["a", "b", "a"])],
    )
    .unwrap();

    let summary = table.aggregate_default().unwrap();
    assert_eq!(summary.index().names(), text(&["aggregate"]).as_slice());
    assert_eq!(summary.get("aggregate", "n").unwrap(), &Value::Int(6));
    assert_eq!(summary.get("aggregate", "s").unwrap(), &Value::from("a,b"));
}

#[test]
fn test_grouped_sum_drops_text_column() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["k", "v", "note"],
        vec![
            text(&["x", "y", "x"]),
            ints(&[1, 2, 3]),
            text(&["p", "q", "r"]),
        ],
    )
    .unwrap();

    let sums = table.group_by(["k"]).unwrap().sum().unwrap();
    assert_eq!(sums.columns().names(), text(&["k", "v"]).as_slice());
    assert_eq!(sums.index().names(), text(&["x", "y"]).as_slice());
    assert_eq!(sums.get("x", "v").unwrap(), &Value::Int(4));
    assert_eq!(sums.get("y", "v").unwrap(), &Value::Int(2));

    let notes = table.drop(["v"]).unwrap();
    assert_eq!(
        notes.group_by(["k"]).unwrap().sum(),
        Err(TableError::NoAggregableColumns("sum".to_string()))
    );
}

#[test]
fn test_group_by_function_sum() {
    let table = Table::from_parts(Vec::<Value>::new(), ["v"], vec![ints(&[1, 2, 3, 4, 5])]).unwrap();

    let grouped = table
        .group_by_fn(|row| {
            Value::from(row.get(0).and_then(Value::as_i64).unwrap_or(0) % 2 == 0)
        })
        .unwrap();
    assert_eq!(grouped.groups().map(|p| p.len()), Some(2));

    let sums = grouped.sum().unwrap();
    assert_eq!(
        sums.index().names(),
        &[Value::Bool(false), Value::Bool(true)]
    );
    assert_eq!(sums.get(false, "v").unwrap(), &Value::Int(9));
    assert_eq!(sums.get(true, "v").unwrap(), &Value::Int(6));
}

#[test]
fn test_update_and_coalesce() {
    let base = Table::from_parts(
        Vec::<Value>::new(),
        ["a", "b"],
        vec![vec![Value::Null, Value::Int(1)], ints(&[5, 6])],
    )
    .unwrap();
    let source = Table::from_parts(
        Vec::<Value>::new(),
        ["a"],
        vec![vec![Value::Int(7), Value::Int(9)]],
    )
    .unwrap();

    let mut updated = base.clone();
    updated.update(&[&source]);
    assert_eq!(updated.col_at(0).unwrap(), ints(&[7, 9]));
    assert_eq!(updated.col_at(1).unwrap(), ints(&[5, 6]));

    let mut coalesced = base.clone();
    coalesced.coalesce(&[&source]);
    assert_eq!(coalesced.col_at(0).unwrap(), ints(&[7, 1]));
    assert_eq!(coalesced.col_at(1).unwrap(), ints(&[5, 6]));
}

// ========================================
// CONVENTIONS
// ========================================

#[test]
fn test_flat_values_are_column_major() {
    let table = Table::from_parts(
        Vec::<Value>::new(),
        ["a", "b"],
        vec![ints(&[1, 2]), ints(&[3, 4])],
    )
    .unwrap();
    let flat: Vec<Value> = table.values().iter().cloned().collect();
    assert_eq!(flat, ints(&[1, 2, 3, 4]));
}

#[test]
fn test_failed_mutation_leaves_table_unchanged() {
    let mut table = Table::from_rows(["a", "b"], vec![ints(&[1, 2])]).unwrap();
    let before = table.clone();

    assert!(table.rename([("a", "b")]).is_err());
    assert!(table.add_with("a", ints(&[9])).is_err());
    assert!(table.set(0, "missing", 1).is_err());
    assert!(table.append_named(0, ints(&[5, 6])).is_err());
    assert_eq!(table, before);
}

#[test]
fn test_table_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Table>();

    let table = Table::from_rows(["v"], (0..100).map(|i| vec![Value::Int(i)])).unwrap();
    let totals: Vec<Value> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| table.sum().unwrap().get_at(0, 0).unwrap().clone()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(totals.iter().all(|t| t == &Value::Int(4950)));
}
