// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Lexical Scopes
//!
//! A [`LexicalScope`] is a text interval owned by a model node together with
//! the symbol items written inside it. Items are kept sorted by start offset
//! so the item nearest to a cursor is found by binary search.
//!
//! The scope's origin is filled in during resolution, once the rows context
//! that applies inside the interval is known.

use std::sync::OnceLock;

use sqlmodel_syntax::TextRange;

use crate::symbol::{SymbolEntryId, SymbolsOrigin};

/// A symbol occurrence addressable by position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalItem {
    pub range: TextRange,
    pub entry: SymbolEntryId,
}

/// Item in a start-sorted slice whose interval contains `offset`
pub(crate) fn item_covering(items: &[LexicalItem], offset: usize) -> Option<&LexicalItem> {
    let idx = items.partition_point(|item| item.range.start <= offset);
    idx.checked_sub(1)
        .map(|i| &items[i])
        .filter(|item| item.range.contains(offset))
}

#[derive(Debug)]
pub struct LexicalScope {
    range: TextRange,
    items: Vec<LexicalItem>,
    origin: OnceLock<SymbolsOrigin>,
}

impl LexicalScope {
    pub fn new(range: TextRange, mut items: Vec<LexicalItem>) -> Self {
        items.sort_by_key(|item| item.range.start);
        Self {
            range,
            items,
            origin: OnceLock::new(),
        }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn items(&self) -> &[LexicalItem] {
        &self.items
    }

    /// Cursor positions inside the interval or right after its end
    pub fn covers(&self, offset: usize) -> bool {
        self.range.touches(offset)
    }

    /// Last item starting at or before `offset` that still touches it
    pub fn find_nearest_item(&self, offset: usize) -> Option<&LexicalItem> {
        let idx = self.items.partition_point(|item| item.range.start <= offset);
        idx.checked_sub(1)
            .map(|i| &self.items[i])
            .filter(|item| item.range.touches(offset))
    }

    pub fn origin(&self) -> Option<&SymbolsOrigin> {
        self.origin.get()
    }

    /// Set the origin; returns false if it was already set
    pub fn set_origin(&self, origin: SymbolsOrigin) -> bool {
        self.origin.set(origin).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::RowsDataContext;

    fn item(start: usize, end: usize, entry: u32) -> LexicalItem {
        LexicalItem {
            range: TextRange::new(start, end),
            entry: SymbolEntryId(entry),
        }
    }

    #[test]
    fn test_items_are_sorted_on_construction() {
        let scope = LexicalScope::new(TextRange::new(0, 20), vec![item(10, 12, 1), item(2, 4, 0)]);
        assert_eq!(scope.items()[0].entry, SymbolEntryId(0));
        assert_eq!(scope.items()[1].entry, SymbolEntryId(1));
    }

    #[test]
    fn test_find_nearest_item() {
        let scope = LexicalScope::new(
            TextRange::new(0, 20),
            vec![item(2, 4, 0), item(10, 12, 1)],
        );
        assert_eq!(scope.find_nearest_item(3).map(|i| i.entry), Some(SymbolEntryId(0)));
        // right after the identifier
        assert_eq!(scope.find_nearest_item(12).map(|i| i.entry), Some(SymbolEntryId(1)));
        assert!(scope.find_nearest_item(6).is_none());
        assert!(scope.find_nearest_item(0).is_none());
    }

    #[test]
    fn test_item_covering_is_half_open() {
        let items = vec![item(2, 4, 0), item(10, 12, 1)];
        assert_eq!(item_covering(&items, 11).map(|i| i.entry), Some(SymbolEntryId(1)));
        assert!(item_covering(&items, 12).is_none());
    }

    #[test]
    fn test_origin_set_once() {
        let scope = LexicalScope::new(TextRange::new(0, 5), Vec::new());
        assert!(scope.origin().is_none());
        assert!(scope.set_origin(SymbolsOrigin::ColumnNameFromRowsData(RowsDataContext::empty())));
        assert!(!scope.set_origin(SymbolsOrigin::ColumnNameFromRowsData(RowsDataContext::empty())));
        assert!(scope.covers(5));
        assert!(!scope.covers(6));
    }
}
