//! FILENAME: bitset/src/sparse.rs
//! PURPOSE: A memory-sparse bit vector spanning the full 31-bit non-negative range.
//! CONTEXT: Used as the row/column mask for selection, slicing and group partitions.
//! Dense ranges (head/tail/slice) and very sparse sets (predicate filters) must
//! both be cheap, so storage is a fixed fan-out trie that only allocates the
//! branches that actually hold set bits.
//!
//! An index is split into four fields (high to low):
//!
//! ```text
//!  30        21 20        11 10    6 5      0
//! +------------+------------+-------+--------+
//! |   area     |   block    | word  |  bit   |
//! |  10 bits   |  10 bits   | 5 bits| 6 bits |
//! +------------+------------+-------+--------+
//! ```
//!
//! Bits are stored little-endian within each `u64` word (bit 0 is the LSB).

use std::fmt;
use std::ops::Range;

use crate::error::BitSetError;

// ============================================================================
// LAYOUT CONSTANTS
// ============================================================================

const BIT_BITS: u32 = 6;
const WORD_BITS: u32 = 5;
const BLOCK_BITS: u32 = 10;
const AREA_BITS: u32 = 10;

const BITS_PER_WORD: usize = 1 << BIT_BITS;
const WORDS_PER_BLOCK: usize = 1 << WORD_BITS;
const BLOCKS_PER_AREA: usize = 1 << BLOCK_BITS;
const MAX_AREAS: usize = 1 << AREA_BITS;

const BITS_PER_BLOCK: usize = BITS_PER_WORD * WORDS_PER_BLOCK;
const BITS_PER_AREA: usize = BITS_PER_BLOCK * BLOCKS_PER_AREA;

/// Largest addressable bit index (2^31 - 1).
pub const MAX_INDEX: usize = (1 << (AREA_BITS + BLOCK_BITS + WORD_BITS + BIT_BITS)) - 1;

/// Initial length of the outer array on first allocation.
const INITIAL_AREAS: usize = 4;

type Block = Box<[u64; WORDS_PER_BLOCK]>;
type Area = Vec<Option<Block>>;

/// Position of a bit inside the trie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    area: usize,
    block: usize,
    word: usize,
    bit: u32,
}

impl Slot {
    #[inline]
    fn of(index: usize) -> Self {
        Slot {
            area: index >> (BLOCK_BITS + WORD_BITS + BIT_BITS),
            block: (index >> (WORD_BITS + BIT_BITS)) & (BLOCKS_PER_AREA - 1),
            word: (index >> BIT_BITS) & (WORDS_PER_BLOCK - 1),
            bit: (index & (BITS_PER_WORD - 1)) as u32,
        }
    }

    #[inline]
    fn index(area: usize, block: usize, word: usize, bit: u32) -> usize {
        area * BITS_PER_AREA + block * BITS_PER_BLOCK + word * BITS_PER_WORD + bit as usize
    }
}

// ============================================================================
// SPARSE BIT SET
// ============================================================================

/// A set of non-negative integers in `0..=MAX_INDEX`.
///
/// `cardinality()` is maintained incrementally and always equals the number of
/// set bits. Clearing never allocates; setting allocates at most one area and
/// one block.
#[derive(Clone, Default)]
pub struct SparseBitSet {
    /// Outer array, grown geometrically up to `MAX_AREAS`.
    areas: Vec<Option<Area>>,

    /// Number of set bits.
    cardinality: usize,
}

impl SparseBitSet {
    /// Creates an empty set. Nothing is allocated until the first bit is set.
    pub fn new() -> Self {
        SparseBitSet {
            areas: Vec::new(),
            cardinality: 0,
        }
    }

    /// Creates a set containing every index in `range`.
    pub fn from_range(range: Range<usize>) -> Result<Self, BitSetError> {
        let mut set = SparseBitSet::new();
        set.set_range(range)?;
        Ok(set)
    }

    /// Returns the number of set bits.
    pub fn cardinality(&self) -> usize {
        self.cardinality
    }

    /// Returns true when no bit is set.
    pub fn is_empty(&self) -> bool {
        self.cardinality == 0
    }

    /// Returns whether `index` is set. Indices beyond `MAX_INDEX` are never set.
    pub fn get(&self, index: usize) -> bool {
        if index > MAX_INDEX {
            return false;
        }
        let slot = Slot::of(index);
        self.block(slot.area, slot.block)
            .map(|block| (block[slot.word] >> slot.bit) & 1 == 1)
            .unwrap_or(false)
    }

    /// Sets `index`.
    pub fn set(&mut self, index: usize) -> Result<(), BitSetError> {
        check_index(index)?;
        let slot = Slot::of(index);
        let word = &mut self.block_mut(slot.area, slot.block)[slot.word];
        let mask = 1u64 << slot.bit;
        if *word & mask == 0 {
            *word |= mask;
            self.cardinality += 1;
        }
        Ok(())
    }

    /// Sets or clears `index` depending on `value`.
    pub fn set_value(&mut self, index: usize, value: bool) -> Result<(), BitSetError> {
        if value {
            self.set(index)
        } else {
            self.clear(index)
        }
    }

    /// Clears `index`. Never allocates.
    pub fn clear(&mut self, index: usize) -> Result<(), BitSetError> {
        check_index(index)?;
        let slot = Slot::of(index);
        let mut removed = false;
        if let Some(block) = self.existing_block_mut(slot.area, slot.block) {
            let mask = 1u64 << slot.bit;
            if block[slot.word] & mask != 0 {
                block[slot.word] &= !mask;
                removed = true;
            }
        }
        if removed {
            self.cardinality -= 1;
        }
        Ok(())
    }

    /// Inverts `index`.
    pub fn flip(&mut self, index: usize) -> Result<(), BitSetError> {
        let current = self.get(index);
        self.set_value(index, !current)
    }

    /// Sets every index in `range` (end exclusive).
    pub fn set_range(&mut self, range: Range<usize>) -> Result<(), BitSetError> {
        check_range(&range)?;
        let mut i = range.start;
        while i < range.end {
            let slot = Slot::of(i);
            let take = (BITS_PER_WORD - slot.bit as usize).min(range.end - i);
            let mask = word_mask(slot.bit, take);
            let word = &mut self.block_mut(slot.area, slot.block)[slot.word];
            let added = (mask & !*word).count_ones() as usize;
            *word |= mask;
            self.cardinality += added;
            i += take;
        }
        Ok(())
    }

    /// Clears every index in `range` (end exclusive). Never allocates.
    pub fn clear_range(&mut self, range: Range<usize>) -> Result<(), BitSetError> {
        check_range(&range)?;
        let mut i = range.start;
        let mut removed = 0usize;
        while i < range.end {
            let slot = Slot::of(i);

            // Skip whole missing areas and blocks.
            if self.area(slot.area).is_none() {
                i = (slot.area + 1) * BITS_PER_AREA;
                continue;
            }
            let Some(block) = self.existing_block_mut(slot.area, slot.block) else {
                i = Slot::index(slot.area, slot.block, 0, 0) + BITS_PER_BLOCK;
                continue;
            };

            let take = (BITS_PER_WORD - slot.bit as usize).min(range.end - i);
            let mask = word_mask(slot.bit, take);
            removed += (block[slot.word] & mask).count_ones() as usize;
            block[slot.word] &= !mask;
            i += take;
        }
        self.cardinality -= removed;
        Ok(())
    }

    /// Returns the smallest set index that is `>= from`, or `None`.
    ///
    /// Absent areas and blocks are skipped wholesale; within a block each word
    /// is tested with `trailing_zeros`, so the scan costs O(distance / 64).
    pub fn next_set_bit(&self, from: usize) -> Option<usize> {
        if from > MAX_INDEX || self.cardinality == 0 {
            return None;
        }
        let start = Slot::of(from);

        for area_idx in start.area..self.areas.len() {
            let Some(area) = &self.areas[area_idx] else {
                continue;
            };
            let first_block = if area_idx == start.area { start.block } else { 0 };

            for block_idx in first_block..BLOCKS_PER_AREA {
                let Some(block) = &area[block_idx] else {
                    continue;
                };
                let at_start = area_idx == start.area && block_idx == start.block;
                let first_word = if at_start { start.word } else { 0 };

                for word_idx in first_word..WORDS_PER_BLOCK {
                    let mut word = block[word_idx];
                    if at_start && word_idx == start.word {
                        word &= u64::MAX << start.bit;
                    }
                    if word != 0 {
                        return Some(Slot::index(
                            area_idx,
                            block_idx,
                            word_idx,
                            word.trailing_zeros(),
                        ));
                    }
                }
            }
        }
        None
    }

    /// Iterates over set indices in ascending order.
    pub fn iter(&self) -> SetBits<'_> {
        SetBits {
            set: self,
            next: Some(0),
        }
    }

    /// Adds every index of `other` to this set.
    pub fn union_with(&mut self, other: &SparseBitSet) {
        for index in other.iter() {
            // Indices coming from another set are always addressable.
            let _ = self.set(index);
        }
    }

    /// Keeps only the indices also present in `other`.
    pub fn intersect_with(&mut self, other: &SparseBitSet) {
        let drop: Vec<usize> = self.iter().filter(|&i| !other.get(i)).collect();
        for index in drop {
            let _ = self.clear(index);
        }
    }

    // ------------------------------------------------------------------------
    // Trie navigation
    // ------------------------------------------------------------------------

    fn area(&self, area: usize) -> Option<&Area> {
        self.areas.get(area).and_then(|a| a.as_ref())
    }

    fn block(&self, area: usize, block: usize) -> Option<&Block> {
        self.area(area).and_then(|a| a[block].as_ref())
    }

    fn existing_block_mut(&mut self, area: usize, block: usize) -> Option<&mut Block> {
        self.areas
            .get_mut(area)
            .and_then(|a| a.as_mut())
            .and_then(|a| a[block].as_mut())
    }

    /// Returns the block for a slot, allocating the path to it on demand.
    fn block_mut(&mut self, area: usize, block: usize) -> &mut Block {
        if area >= self.areas.len() {
            let grown = (self.areas.len() * 2).max(INITIAL_AREAS).max(area + 1);
            self.areas.resize_with(grown.min(MAX_AREAS), || None);
        }
        let area = self.areas[area].get_or_insert_with(|| vec![None; BLOCKS_PER_AREA]);
        area[block].get_or_insert_with(|| Box::new([0u64; WORDS_PER_BLOCK]))
    }
}

/// Mask of `take` consecutive bits starting at `bit`.
#[inline]
fn word_mask(bit: u32, take: usize) -> u64 {
    if take >= BITS_PER_WORD {
        u64::MAX
    } else {
        ((1u64 << take) - 1) << bit
    }
}

fn check_index(index: usize) -> Result<(), BitSetError> {
    if index > MAX_INDEX {
        return Err(BitSetError::OutOfRange {
            index,
            max: MAX_INDEX,
        });
    }
    Ok(())
}

fn check_range(range: &Range<usize>) -> Result<(), BitSetError> {
    if range.start > range.end || range.end > MAX_INDEX + 1 {
        return Err(BitSetError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            max: MAX_INDEX,
        });
    }
    Ok(())
}

impl PartialEq for SparseBitSet {
    fn eq(&self, other: &Self) -> bool {
        self.cardinality == other.cardinality && self.iter().eq(other.iter())
    }
}

impl Eq for SparseBitSet {}

impl fmt::Debug for SparseBitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Indices above `MAX_INDEX` are skipped.
impl FromIterator<usize> for SparseBitSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = SparseBitSet::new();
        for index in iter {
            let _ = set.set(index);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SparseBitSet {
    type Item = usize;
    type IntoIter = SetBits<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the set indices of a [`SparseBitSet`].
#[derive(Debug, Clone)]
pub struct SetBits<'a> {
    set: &'a SparseBitSet,
    next: Option<usize>,
}

impl Iterator for SetBits<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let from = self.next?;
        let found = self.set.next_set_bit(from);
        self.next = found.and_then(|i| i.checked_add(1));
        found
    }
}
