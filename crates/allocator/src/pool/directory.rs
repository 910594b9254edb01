//! Block directory
//!
//! The directory is the ordered map of the arena: a vector of [`Block`]s
//! sorted by offset, each one contiguous with the next, together covering
//! `[0, capacity)` exactly once.
//!
//! ```text
//! offset:  0        16    24               64
//!          [ used 16 ][free 8][    used 40    ]
//! ```
//!
//! ## Invariants
//!
//! Between public operations:
//! - `blocks[0].offset == 0`
//! - `blocks[i].end() == blocks[i + 1].offset`
//! - `blocks.last().end() == capacity`
//! - no two neighbouring blocks are both free
//!
//! Helpers below may break the last rule transiently; every caller restores
//! it before returning.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{MemoryError, MemoryResult};

/// A contiguous byte range of the arena and its state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    offset: usize,
    size: usize,
    is_free: bool,
}

impl Block {
    pub(crate) fn free(offset: usize, size: usize) -> Self {
        Self {
            offset,
            size,
            is_free: true,
        }
    }

    /// Offset of the first byte
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the block is available for allocation
    #[inline]
    pub fn is_free(&self) -> bool {
        self.is_free
    }

    /// One past the last byte
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Result of looking up an offset in the directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// A block starts exactly at the offset
    Start(usize),
    /// The offset falls strictly inside the block at this index
    Inside(usize),
    /// The offset is past the end of the arena
    OutOfRange,
}

#[derive(Debug, Clone)]
pub(crate) struct Directory {
    blocks: Vec<Block>,
    capacity: usize,
}

impl Directory {
    pub fn new(capacity: usize) -> Self {
        Self {
            blocks: vec![Block::free(0, capacity)],
            capacity,
        }
    }

    /// Back to a single free block spanning the arena
    pub fn reset(&mut self) {
        self.blocks.clear();
        self.blocks.push(Block::free(0, self.capacity));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, index: usize) -> Block {
        self.blocks[index]
    }

    /// Index of the first free block, scanning from offset 0
    pub fn first_free(&self) -> Option<usize> {
        self.blocks.iter().position(Block::is_free)
    }

    /// Index of the lowest-offset free block holding at least `size` bytes
    pub fn first_fit(&self, size: usize) -> Option<usize> {
        self.blocks
            .iter()
            .position(|block| block.is_free && block.size >= size)
    }

    pub fn lookup(&self, offset: usize) -> Lookup {
        match self.blocks.binary_search_by_key(&offset, |block| block.offset) {
            Ok(index) => Lookup::Start(index),
            Err(0) => Lookup::OutOfRange,
            Err(index) if offset < self.blocks[index - 1].end() => Lookup::Inside(index - 1),
            Err(_) => Lookup::OutOfRange,
        }
    }

    /// Marks the free block at `index` occupied, keeping only `size` bytes
    pub fn occupy(&mut self, index: usize, size: usize) {
        debug_assert!(self.blocks[index].is_free && self.blocks[index].size >= size);
        self.blocks[index].is_free = false;
        self.split(index, size);
    }

    /// Cuts the block at `index` down to `size` bytes
    ///
    /// The cut-off tail becomes a free block and is merged with a free
    /// successor. No-op when the block is not larger than `size`.
    pub fn split(&mut self, index: usize, size: usize) {
        let block = self.blocks[index];
        if block.size <= size {
            return;
        }
        self.blocks[index].size = size;
        self.blocks
            .insert(index + 1, Block::free(block.offset + size, block.size - size));
        if self.blocks.get(index + 2).is_some_and(Block::is_free) {
            self.absorb_next(index + 1);
        }
    }

    /// Whether the block at `index` reaches `size` bytes by taking in its
    /// free successor
    pub fn can_grow_in_place(&self, index: usize, size: usize) -> bool {
        let block = self.blocks[index];
        self.blocks
            .get(index + 1)
            .is_some_and(|next| next.is_free && block.size + next.size >= size)
    }

    /// Folds the successor of `index` into it
    pub fn absorb_next(&mut self, index: usize) {
        let next = self.blocks.remove(index + 1);
        self.blocks[index].size += next.size;
    }

    /// Marks the block at `index` free and merges it with free neighbours
    ///
    /// Returns the index of the resulting free block.
    pub fn release(&mut self, mut index: usize) -> usize {
        self.blocks[index].is_free = true;
        if self.blocks.get(index + 1).is_some_and(Block::is_free) {
            self.absorb_next(index);
        }
        if index > 0 && self.blocks[index - 1].is_free {
            index -= 1;
            self.absorb_next(index);
        }
        index
    }

    pub fn used_bytes(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| !block.is_free)
            .map(Block::size)
            .sum()
    }

    pub fn free_bytes(&self) -> usize {
        self.capacity - self.used_bytes()
    }

    pub fn free_count(&self) -> usize {
        self.blocks.iter().filter(|block| block.is_free).count()
    }

    pub fn largest_free(&self) -> usize {
        self.blocks
            .iter()
            .filter(|block| block.is_free)
            .map(Block::size)
            .max()
            .unwrap_or(0)
    }

    /// Verifies every directory invariant
    pub fn check(&self) -> MemoryResult<()> {
        let corrupt = |details: String| Err(MemoryError::corruption("block directory", &details));

        let Some(first) = self.blocks.first() else {
            return corrupt("directory is empty".to_string());
        };
        if first.offset != 0 {
            return corrupt(format!("first block starts at {}", first.offset));
        }

        let mut total = 0usize;
        for (index, block) in self.blocks.iter().enumerate() {
            if block.size == 0 {
                return corrupt(format!("block {index} at {} is empty", block.offset));
            }
            total += block.size;
            if let Some(next) = self.blocks.get(index + 1) {
                if block.end() != next.offset {
                    return corrupt(format!(
                        "block {index} ends at {} but next starts at {}",
                        block.end(),
                        next.offset
                    ));
                }
                if block.is_free && next.is_free {
                    return corrupt(format!(
                        "adjacent free blocks at {} and {}",
                        block.offset, next.offset
                    ));
                }
            }
        }

        if total != self.capacity {
            return corrupt(format!(
                "block sizes sum to {total}, capacity is {}",
                self.capacity
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(dir: &Directory) -> Vec<(usize, usize, bool)> {
        dir.blocks()
            .iter()
            .map(|b| (b.offset(), b.size(), b.is_free()))
            .collect()
    }

    #[test]
    fn test_new_directory_is_one_free_block() {
        let dir = Directory::new(64);
        assert_eq!(shape(&dir), vec![(0, 64, true)]);
        assert!(dir.check().is_ok());
    }

    #[test]
    fn test_occupy_splits_larger_block() {
        let mut dir = Directory::new(64);
        dir.occupy(0, 16);
        assert_eq!(shape(&dir), vec![(0, 16, false), (16, 48, true)]);
        assert!(dir.check().is_ok());
    }

    #[test]
    fn test_occupy_exact_fit_does_not_split() {
        let mut dir = Directory::new(16);
        dir.occupy(0, 16);
        assert_eq!(shape(&dir), vec![(0, 16, false)]);
    }

    #[test]
    fn test_release_merges_both_neighbours() {
        let mut dir = Directory::new(30);
        dir.occupy(0, 10);
        dir.occupy(1, 10);
        dir.occupy(2, 10);
        dir.release(0);
        dir.release(2);
        assert_eq!(
            shape(&dir),
            vec![(0, 10, true), (10, 10, false), (20, 10, true)]
        );

        let merged = dir.release(1);
        assert_eq!(merged, 0);
        assert_eq!(shape(&dir), vec![(0, 30, true)]);
    }

    #[test]
    fn test_split_merges_tail_with_free_successor() {
        let mut dir = Directory::new(30);
        dir.occupy(0, 20);
        dir.split(0, 5);
        assert_eq!(shape(&dir), vec![(0, 5, false), (5, 25, true)]);
        assert!(dir.check().is_ok());
    }

    #[test]
    fn test_lookup() {
        let mut dir = Directory::new(32);
        dir.occupy(0, 8);
        assert_eq!(dir.lookup(0), Lookup::Start(0));
        assert_eq!(dir.lookup(8), Lookup::Start(1));
        assert_eq!(dir.lookup(4), Lookup::Inside(0));
        assert_eq!(dir.lookup(20), Lookup::Inside(1));
        assert_eq!(dir.lookup(32), Lookup::OutOfRange);
        assert_eq!(dir.lookup(1000), Lookup::OutOfRange);
    }

    #[test]
    fn test_first_fit_takes_lowest_offset() {
        let mut dir = Directory::new(35);
        // [10 free][5 used][5 free][5 used][10 free]
        dir.occupy(0, 10);
        dir.occupy(1, 5);
        dir.occupy(2, 5);
        dir.occupy(3, 5);
        dir.release(0);
        dir.release(2);
        assert_eq!(dir.first_fit(5), Some(0));
        assert_eq!(dir.first_fit(11), None);
        assert_eq!(dir.largest_free(), 10);
    }

    #[test]
    fn test_check_reports_adjacent_free_blocks() {
        let mut dir = Directory::new(20);
        dir.blocks = vec![Block::free(0, 10), Block::free(10, 10)];
        let err = dir.check().unwrap_err();
        assert!(err.to_string().contains("adjacent free"));
    }

    #[test]
    fn test_check_reports_gap() {
        let mut dir = Directory::new(20);
        dir.blocks = vec![
            Block {
                offset: 0,
                size: 5,
                is_free: false,
            },
            Block::free(6, 14),
        ];
        assert!(dir.check().is_err());
    }
}
