//! FILENAME: engine/src/grouping.rs
//! PURPOSE: Partitions row positions into named groups.
//! CONTEXT: A grouped table carries its partition so that the next aggregation,
//! pivot or explode can consume it. Every other structural operation returns an
//! ungrouped table.
//!
//! Groups are recorded in first-seen order during a single pass over the rows,
//! so two tables with the same rows in the same order always produce the same
//! group order.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tabula_bitset::SparseBitSet;

use crate::error::Result;
use crate::logging::log_debug;
use crate::table::Table;
use crate::value::Value;
use crate::views::{Axis, LineView};

/// Key column positions; almost always a handful.
pub type KeyColumns = SmallVec<[usize; 4]>;

/// Grouping state attached to a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Grouping {
    /// The whole table is one implicit group.
    Ungrouped,
    Partitioned(Partition),
}

impl Default for Grouping {
    fn default() -> Self {
        Grouping::Ungrouped
    }
}

impl Grouping {
    /// Groups by the values of `columns`: the key is the cell itself for one
    /// column and a `Value::Tuple` for several. No columns means ungrouped.
    pub fn by_columns(table: &Table, columns: &[usize]) -> Result<Grouping> {
        if columns.is_empty() {
            return Ok(Grouping::Ungrouped);
        }
        let key_columns: KeyColumns = columns.iter().copied().collect();
        let partition = Partition::build(table.length(), key_columns.clone(), |row| {
            Value::key_of(key_columns.iter().map(|&c| table.data.get(c, row).clone()).collect())
        })?;
        Ok(Grouping::Partitioned(partition))
    }

    /// Groups by an arbitrary row -> key function. No column is treated as a
    /// key column, so aggregation reduces every column.
    pub fn by_key<F>(table: &Table, mut key: F) -> Result<Grouping>
    where
        F: FnMut(&LineView<'_>) -> Value,
    {
        let partition = Partition::build(table.length(), KeyColumns::new(), |row| {
            key(&LineView::new(table, Axis::Rows, row))
        })?;
        Ok(Grouping::Partitioned(partition))
    }

    pub fn is_grouped(&self) -> bool {
        matches!(self, Grouping::Partitioned(_))
    }

    pub fn partition(&self) -> Option<&Partition> {
        match self {
            Grouping::Ungrouped => None,
            Grouping::Partitioned(partition) => Some(partition),
        }
    }

    /// Whether column `col` is one of the grouping keys.
    pub fn is_key_column(&self, col: usize) -> bool {
        self.partition()
            .map_or(false, |p| p.key_columns.contains(&col))
    }
}

/// Ordered map from group key to the mask of its rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Group keys in first-seen order.
    keys: Vec<Value>,

    /// Row mask per group, parallel to `keys`.
    masks: Vec<SparseBitSet>,

    /// Key -> slot in `keys`/`masks`.
    lookup: FxHashMap<Value, usize>,

    key_columns: KeyColumns,
}

impl Partition {
    fn build<F>(length: usize, key_columns: KeyColumns, mut key_at: F) -> Result<Partition>
    where
        F: FnMut(usize) -> Value,
    {
        let mut partition = Partition {
            keys: Vec::new(),
            masks: Vec::new(),
            lookup: FxHashMap::default(),
            key_columns,
        };

        for row in 0..length {
            let key = key_at(row);
            let slot = match partition.lookup.get(&key) {
                Some(&slot) => slot,
                None => {
                    let slot = partition.keys.len();
                    partition.lookup.insert(key.clone(), slot);
                    partition.keys.push(key);
                    partition.masks.push(SparseBitSet::new());
                    slot
                }
            };
            partition.masks[slot].set(row)?;
        }

        log_debug!(
            "GROUP",
            "partitioned {} rows into {} groups",
            length,
            partition.keys.len()
        );
        Ok(partition)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    pub fn key_columns(&self) -> &[usize] {
        &self.key_columns
    }

    /// Rows of the group named `key`.
    pub fn get(&self, key: &Value) -> Option<&SparseBitSet> {
        self.lookup.get(key).map(|&slot| &self.masks[slot])
    }

    /// (key, rows) pairs in group order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &SparseBitSet)> {
        self.keys.iter().zip(self.masks.iter())
    }
}
