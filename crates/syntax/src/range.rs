// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Text ranges

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open `[start, end)` interval of byte offsets in the statement text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    /// Create a new range
    ///
    /// # Panics
    ///
    /// Panics if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "invalid text range {start}..{end}");
        Self { start, end }
    }

    /// Empty range positioned at `offset`
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `start <= offset < end`
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// `start <= offset <= end`, i.e. the cursor may sit right after the last character
    pub fn touches(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn intersects(&self, other: TextRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Smallest range covering both
    pub fn cover(&self, other: TextRange) -> TextRange {
        TextRange {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let range = TextRange::new(3, 7);
        assert!(range.contains(3));
        assert!(range.contains(6));
        assert!(!range.contains(7));
        assert!(range.touches(7));
        assert!(!range.touches(8));
    }

    #[test]
    fn test_intersects_and_cover() {
        let a = TextRange::new(0, 5);
        let b = TextRange::new(5, 9);
        assert!(!a.intersects(b));
        assert!(a.intersects(TextRange::new(4, 6)));
        assert_eq!(a.cover(b), TextRange::new(0, 9));
    }

    #[test]
    #[should_panic]
    fn test_inverted_range_panics() {
        let _ = TextRange::new(5, 2);
    }
}
