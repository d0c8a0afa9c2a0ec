// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Symbols
//!
//! Every identifier occurrence in the statement becomes a [`SymbolEntry`].
//! An entry carries the [`Symbol`] it denotes (name, [`SymbolClass`] and an
//! optional definition) and a [`SymbolsOrigin`] telling editor tooling which
//! names could appear at that position.
//!
//! ## Classification
//!
//! Entries start as [`SymbolClass::Unknown`] (or [`SymbolClass::Quoted`] for
//! quoted identifiers). Resolution moves them to a terminal class at most
//! once; later attempts are ignored, which makes repeated resolution passes
//! idempotent:
//!
//! ```
//! use sqlmodel_semantic::{SymbolClass, SymbolTable};
//! use sqlmodel_syntax::TextRange;
//!
//! let mut symbols = SymbolTable::new();
//! let id = symbols.add("t", "t", TextRange::new(14, 15), false);
//!
//! assert!(symbols.classify(id, SymbolClass::Table, None));
//! assert!(!symbols.classify(id, SymbolClass::Column, None));
//! assert_eq!(symbols.entry(id).class(), SymbolClass::Table);
//! ```

use sqlmodel_catalog::{ObjectKind, ObjectRef};
use sqlmodel_syntax::TextRange;

use crate::rows::{ResultColumn, RowsDataContext, RowsSourceContext};

/// Index of a [`SymbolEntry`] in its [`SymbolTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolEntryId(pub u32);

impl SymbolEntryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Resolved kind of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    /// Not classified yet
    Unknown,
    /// Quoted identifier not classified yet
    Quoted,
    String,
    /// Could not be bound to anything valid
    Error,
    Catalog,
    Schema,
    Table,
    TableAlias,
    Column,
    /// Column introduced by the statement itself (alias, CTE column list)
    ColumnDerived,
    Procedure,
    Function,
    Sequence,
    Constraint,
    Index,
    Object,
    Reserved,
}

impl SymbolClass {
    /// Terminal classes are never changed once assigned
    pub fn is_terminal(self) -> bool {
        !matches!(self, SymbolClass::Unknown | SymbolClass::Quoted)
    }

    pub fn for_object_kind(kind: ObjectKind) -> Self {
        match kind {
            ObjectKind::DataSource | ObjectKind::Catalog => SymbolClass::Catalog,
            ObjectKind::Schema => SymbolClass::Schema,
            ObjectKind::Table | ObjectKind::View => SymbolClass::Table,
            ObjectKind::Column => SymbolClass::Column,
            ObjectKind::Procedure => SymbolClass::Procedure,
            ObjectKind::Function => SymbolClass::Function,
            ObjectKind::Sequence => SymbolClass::Sequence,
            ObjectKind::Constraint => SymbolClass::Constraint,
            ObjectKind::Index => SymbolClass::Index,
        }
    }
}

/// What a symbol is bound to
#[derive(Debug, Clone)]
pub enum SymbolDefinition {
    /// Another entry of the same statement (alias, CTE name, declared column)
    Entry(SymbolEntryId),
    /// A catalog object
    DbObject(ObjectRef),
    /// A column of some rows context
    Column(ResultColumn),
}

impl SymbolDefinition {
    pub fn as_column(&self) -> Option<&ResultColumn> {
        match self {
            SymbolDefinition::Column(column) => Some(column),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            SymbolDefinition::DbObject(object) => Some(object),
            _ => None,
        }
    }
}

/// Why names at a position resolve the way they do
#[derive(Debug, Clone)]
pub enum SymbolsOrigin {
    /// Catalog objects of the given kinds reachable from the connection
    DbObjectFromContext {
        kinds: Vec<ObjectKind>,
        context: RowsSourceContext,
    },
    /// Members of the given kinds of a specific catalog object
    DbObjectFromObject {
        kinds: Vec<ObjectKind>,
        object: ObjectRef,
    },
    /// Column names drawn from a rows data context
    ColumnNameFromRowsData(RowsDataContext),
    /// Columns of the table a foreign key references
    ColumnRefFromReferencedContext(RowsDataContext),
}

impl SymbolsOrigin {
    pub fn table_names(context: RowsSourceContext) -> Self {
        SymbolsOrigin::DbObjectFromContext {
            kinds: vec![ObjectKind::Table, ObjectKind::View],
            context,
        }
    }

    /// Rows context behind a column-name origin
    pub fn rows(&self) -> Option<&RowsDataContext> {
        match self {
            SymbolsOrigin::ColumnNameFromRowsData(rows)
            | SymbolsOrigin::ColumnRefFromReferencedContext(rows) => Some(rows),
            _ => None,
        }
    }
}

/// The meaning of a name
#[derive(Debug, Clone)]
pub struct Symbol {
    name: String,
    class: SymbolClass,
    definition: Option<SymbolDefinition>,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> SymbolClass {
        self.class
    }

    pub fn definition(&self) -> Option<&SymbolDefinition> {
        self.definition.as_ref()
    }
}

/// One textual occurrence of a symbol
#[derive(Debug, Clone)]
pub struct SymbolEntry {
    id: SymbolEntryId,
    range: TextRange,
    raw_name: String,
    quoted: bool,
    symbol: Symbol,
    origin: Option<SymbolsOrigin>,
}

impl SymbolEntry {
    pub fn id(&self) -> SymbolEntryId {
        self.id
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    /// Identifier as written, quotes included
    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Identifier normalized for the dialect
    pub fn name(&self) -> &str {
        &self.symbol.name
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn class(&self) -> SymbolClass {
        self.symbol.class
    }

    pub fn definition(&self) -> Option<&SymbolDefinition> {
        self.symbol.definition.as_ref()
    }

    pub fn origin(&self) -> Option<&SymbolsOrigin> {
        self.origin.as_ref()
    }
}

/// All symbol entries of a statement, in text order
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an occurrence; `name` is the dialect-normalized identifier
    pub fn add(
        &mut self,
        raw_name: impl Into<String>,
        name: impl Into<String>,
        range: TextRange,
        quoted: bool,
    ) -> SymbolEntryId {
        let id = SymbolEntryId(self.entries.len() as u32);
        self.entries.push(SymbolEntry {
            id,
            range,
            raw_name: raw_name.into(),
            quoted,
            symbol: Symbol {
                name: name.into(),
                class: if quoted {
                    SymbolClass::Quoted
                } else {
                    SymbolClass::Unknown
                },
                definition: None,
            },
            origin: None,
        });
        id
    }

    pub fn entry(&self, id: SymbolEntryId) -> &SymbolEntry {
        &self.entries[id.index()]
    }

    pub fn entries(&self) -> &[SymbolEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Assign a terminal class; returns false if the entry was already classified
    pub fn classify(
        &mut self,
        id: SymbolEntryId,
        class: SymbolClass,
        definition: Option<SymbolDefinition>,
    ) -> bool {
        let symbol = &mut self.entries[id.index()].symbol;
        if symbol.class.is_terminal() {
            return false;
        }
        symbol.class = class;
        symbol.definition = definition;
        true
    }

    /// Set the origin unless one is already present
    pub fn set_origin(&mut self, id: SymbolEntryId, origin: SymbolsOrigin) {
        let entry = &mut self.entries[id.index()];
        if entry.origin.is_none() {
            entry.origin = Some(origin);
        }
    }

    /// Entry whose range contains `offset`
    pub fn entry_at(&self, offset: usize) -> Option<&SymbolEntry> {
        let idx = self.entries.partition_point(|e| e.range.start <= offset);
        idx.checked_sub(1)
            .map(|i| &self.entries[i])
            .filter(|e| e.range.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_catalog::DataType;

    #[test]
    fn test_quoted_entries_start_quoted() {
        let mut symbols = SymbolTable::new();
        let id = symbols.add("\"Users\"", "Users", TextRange::new(0, 7), true);
        let entry = symbols.entry(id);
        assert_eq!(entry.class(), SymbolClass::Quoted);
        assert_eq!(entry.raw_name(), "\"Users\"");
        assert_eq!(entry.name(), "Users");
    }

    #[test]
    fn test_classification_is_monotone() {
        let mut symbols = SymbolTable::new();
        let id = symbols.add("a", "a", TextRange::new(7, 8), false);
        let column = ResultColumn::new("a", DataType::Integer);
        assert!(symbols.classify(id, SymbolClass::Column, Some(SymbolDefinition::Column(column))));
        assert!(!symbols.classify(id, SymbolClass::Error, None));
        let entry = symbols.entry(id);
        assert_eq!(entry.class(), SymbolClass::Column);
        assert_eq!(
            entry.definition().and_then(|d| d.as_column()).map(|c| c.name.as_str()),
            Some("a")
        );
    }

    #[test]
    fn test_origin_is_set_once() {
        let mut symbols = SymbolTable::new();
        let id = symbols.add("a", "a", TextRange::new(0, 1), false);
        symbols.set_origin(id, SymbolsOrigin::ColumnNameFromRowsData(RowsDataContext::empty()));
        symbols.set_origin(id, SymbolsOrigin::table_names(RowsSourceContext::offline()));
        assert!(matches!(
            symbols.entry(id).origin(),
            Some(SymbolsOrigin::ColumnNameFromRowsData(_))
        ));
    }

    #[test]
    fn test_entry_at() {
        let mut symbols = SymbolTable::new();
        symbols.add("a", "a", TextRange::new(7, 8), false);
        symbols.add("t", "t", TextRange::new(14, 15), false);
        assert_eq!(symbols.entry_at(7).map(|e| e.name()), Some("a"));
        assert_eq!(symbols.entry_at(14).map(|e| e.name()), Some("t"));
        assert!(symbols.entry_at(8).is_none());
        assert!(symbols.entry_at(0).is_none());
    }

    #[test]
    fn test_class_for_object_kind() {
        assert_eq!(SymbolClass::for_object_kind(ObjectKind::View), SymbolClass::Table);
        assert_eq!(SymbolClass::for_object_kind(ObjectKind::Schema), SymbolClass::Schema);
        assert_eq!(
            SymbolClass::for_object_kind(ObjectKind::Procedure),
            SymbolClass::Procedure
        );
        assert!(!SymbolClass::Quoted.is_terminal());
        assert!(SymbolClass::Error.is_terminal());
    }
}
