//! FILENAME: engine/src/index.rs
//! PURPOSE: Bidirectional mapping between row/column names and dense positions.
//! CONTEXT: A table owns two of these (rows and columns). Positions are always a
//! dense `0..n` range in insertion order, so `position -> name` is a plain
//! vector lookup and `name -> position` is a hash lookup. Names are unique.

use rustc_hash::FxHashMap;
use tabula_bitset::SparseBitSet;

use crate::error::{Result, TableError};
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Index {
    /// Names ordered by position.
    names: Vec<Value>,

    /// Reverse lookup from name to position.
    positions: FxHashMap<Value, usize>,
}

impl Index {
    pub fn new() -> Self {
        Index {
            names: Vec::new(),
            positions: FxHashMap::default(),
        }
    }

    /// Builds an index from names in order; fails on the first duplicate.
    pub fn from_names<I>(names: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut index = Index::new();
        for name in names {
            index.add(name.into())?;
        }
        Ok(index)
    }

    /// Index named `0..len`.
    pub fn range(len: usize) -> Self {
        let mut index = Index::new();
        for pos in 0..len {
            index.names.push(Value::from(pos));
            index.positions.insert(Value::from(pos), pos);
        }
        index
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Registers `name` at the next position and returns that position.
    pub fn add(&mut self, name: Value) -> Result<usize> {
        if self.positions.contains_key(&name) {
            return Err(TableError::DuplicateName(name));
        }
        let pos = self.names.len();
        self.positions.insert(name.clone(), pos);
        self.names.push(name);
        Ok(pos)
    }

    /// Position of `name`.
    pub fn get(&self, name: &Value) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| TableError::UnknownName(name.clone()))
    }

    pub fn position(&self, name: &Value) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn contains(&self, name: &Value) -> bool {
        self.positions.contains_key(name)
    }

    pub fn name_at(&self, pos: usize) -> Option<&Value> {
        self.names.get(pos)
    }

    /// Appends integer names for positions `len()..len`; a no-op when the
    /// index is already at least that long.
    pub fn extend(&mut self, len: usize) -> Result<()> {
        for pos in self.names.len()..len {
            self.add(Value::from(pos))?;
        }
        Ok(())
    }

    /// Batch lookup, failing on the first unknown name.
    pub fn indices(&self, names: &[Value]) -> Result<Vec<usize>> {
        names.iter().map(|name| self.get(name)).collect()
    }

    /// Renames entries in place, keeping their positions. Every old name must
    /// exist and the result must still be unique; otherwise nothing changes.
    pub fn rename<I>(&mut self, renames: I) -> Result<()>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let mut renamed = self.names.clone();
        for (old, new) in renames {
            let pos = self.get(&old)?;
            renamed[pos] = new;
        }

        let mut positions = FxHashMap::default();
        for (pos, name) in renamed.iter().enumerate() {
            if positions.insert(name.clone(), pos).is_some() {
                return Err(TableError::DuplicateName(name.clone()));
            }
        }

        self.names = renamed;
        self.positions = positions;
        Ok(())
    }

    /// Names in position order.
    pub fn names(&self) -> &[Value] {
        &self.names
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.names.iter()
    }

    /// Keeps only the positions in `mask`, preserving their relative order and
    /// renumbering them densely.
    pub fn select(&self, mask: &SparseBitSet) -> Index {
        let mut selected = Index::new();
        for pos in mask.iter() {
            let Some(name) = self.names.get(pos) else {
                break;
            };
            selected.positions.insert(name.clone(), selected.names.len());
            selected.names.push(name.clone());
        }
        selected
    }
}

impl<'a> IntoIterator for &'a Index {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
