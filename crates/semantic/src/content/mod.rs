// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Model content
//!
//! The statement-specific part of a [`QueryModel`](crate::QueryModel). A
//! closed set of variants, each resolving in two ordered phases:
//!
//! 1. objects and rows: relation names are bound to catalog objects (or
//!    CTEs) and the rows contexts each construct sees are computed
//! 2. value relations: column references, routine calls and nested
//!    queries are bound against those rows contexts
//!
//! The phases share a [`ResolveCx`], which owns no state of its own: it
//! borrows the node tree, the symbol table and the recognition context.

pub mod command;
pub mod dml;
pub mod query;

use sqlmodel_catalog::{ObjectKind, ObjectRef};
use sqlmodel_syntax::{SyntaxKind, SyntaxTree, TextRange};
use tracing::{debug, warn};

use crate::ddl::{AlterTableModel, CreateTableModel, ObjectDropModel};
use crate::name_resolver::{LookupOptions, NameResolver};
use crate::node::{NodeId, NodeTree};
use crate::recognition::RecognitionContext;
use crate::rows::{ColumnResolution, ResultColumn, RowsDataContext, RowsSource, RowsSourceContext};
use crate::symbol::{SymbolClass, SymbolDefinition, SymbolEntryId, SymbolTable, SymbolsOrigin};

pub use command::CommandModel;
pub use dml::{DeleteModel, InsertModel, UpdateModel};
pub use query::QueryContent;

/// Statement-specific content of a model
#[derive(Debug)]
pub enum ModelContent {
    Query(QueryContent),
    CreateTable(CreateTableModel),
    AlterTable(AlterTableModel),
    Drop(ObjectDropModel),
    Insert(InsertModel),
    Update(UpdateModel),
    Delete(DeleteModel),
    Command(CommandModel),
}

impl ModelContent {
    /// Content for the statement rooted at `root`, if its kind is recognized
    pub(crate) fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, root: NodeId) -> Option<Self> {
        let content = match tree.kind(root) {
            SyntaxKind::Query | SyntaxKind::Select | SyntaxKind::SetOperation => {
                ModelContent::Query(QueryContent::new(root))
            }
            SyntaxKind::CreateTable => {
                ModelContent::CreateTable(CreateTableModel::from_tree(tree, syntax, root))
            }
            SyntaxKind::AlterTable => {
                ModelContent::AlterTable(AlterTableModel::from_tree(tree, syntax, root))
            }
            SyntaxKind::DropStatement => {
                ModelContent::Drop(ObjectDropModel::from_tree(tree, syntax, root))
            }
            SyntaxKind::Insert => ModelContent::Insert(InsertModel::from_tree(tree, root)),
            SyntaxKind::Update => ModelContent::Update(UpdateModel::from_tree(tree, root)),
            SyntaxKind::Delete => ModelContent::Delete(DeleteModel::from_tree(tree, root)),
            SyntaxKind::Command => ModelContent::Command(CommandModel::from_tree(syntax, tree, root)),
            other => {
                debug!(kind = ?other, "No model content for statement kind");
                return None;
            }
        };
        Some(content)
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        match self {
            ModelContent::Query(content) => content.resolve_object_and_rows_references(cx, sources).await,
            ModelContent::CreateTable(content) => {
                content.resolve_object_and_rows_references(cx, sources).await
            }
            ModelContent::AlterTable(content) => {
                content.resolve_object_and_rows_references(cx, sources).await
            }
            ModelContent::Drop(content) => content.resolve_object_and_rows_references(cx, sources).await,
            ModelContent::Insert(content) => content.resolve_object_and_rows_references(cx, sources).await,
            ModelContent::Update(content) => content.resolve_object_and_rows_references(cx, sources).await,
            ModelContent::Delete(content) => content.resolve_object_and_rows_references(cx, sources).await,
            ModelContent::Command(_) => {}
        }
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        match self {
            ModelContent::Query(content) => content.resolve_value_relations(cx).await,
            ModelContent::CreateTable(content) => content.resolve_value_relations(cx).await,
            ModelContent::AlterTable(content) => content.resolve_value_relations(cx).await,
            ModelContent::Insert(content) => content.resolve_value_relations(cx).await,
            ModelContent::Update(content) => content.resolve_value_relations(cx).await,
            ModelContent::Delete(content) => content.resolve_value_relations(cx).await,
            // drop targets and commands have no value scope
            ModelContent::Drop(_) | ModelContent::Command(_) => {}
        }
    }
}

/// Borrowed state of one resolution pass
pub(crate) struct ResolveCx<'a> {
    pub tree: &'a NodeTree,
    pub symbols: &'a mut SymbolTable,
    pub recognition: &'a mut RecognitionContext,
}

impl<'a> ResolveCx<'a> {
    pub fn new(
        tree: &'a NodeTree,
        symbols: &'a mut SymbolTable,
        recognition: &'a mut RecognitionContext,
    ) -> Self {
        Self {
            tree,
            symbols,
            recognition,
        }
    }

    /// Normalized name of an entry
    pub fn name(&self, entry: SymbolEntryId) -> String {
        self.symbols.entry(entry).name().to_string()
    }

    pub fn is_quoted(&self, entry: SymbolEntryId) -> bool {
        self.symbols.entry(entry).is_quoted()
    }

    pub fn entry_range(&self, entry: SymbolEntryId) -> TextRange {
        self.symbols.entry(entry).range()
    }

    /// Normalized dotted name
    pub fn dotted(&self, parts: &[SymbolEntryId]) -> String {
        parts
            .iter()
            .map(|&p| self.symbols.entry(p).name())
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn classify(&mut self, entry: SymbolEntryId, class: SymbolClass, definition: Option<SymbolDefinition>) {
        self.symbols.classify(entry, class, definition);
    }

    pub fn set_origin(&mut self, entry: SymbolEntryId, origin: SymbolsOrigin) {
        self.symbols.set_origin(entry, origin);
    }

    pub fn warn(&mut self, range: TextRange, message: impl Into<String>) {
        self.recognition.append_warning(range, message);
    }

    /// Resolve a dotted name through the catalog, keeping the first accepted object
    pub async fn find_object(
        &self,
        sources: &RowsSourceContext,
        parts: &[SymbolEntryId],
        options: LookupOptions,
        accept: impl Fn(ObjectKind) -> bool,
    ) -> Option<ObjectRef> {
        let execution = sources.connection()?;
        let names: Vec<String> = parts
            .iter()
            .map(|&p| self.symbols.entry(p).raw_name().to_string())
            .collect();
        let resolver = NameResolver::new(self.recognition.monitor().as_ref(), self.recognition.config());
        resolver
            .find_objects_by_fqn(None, Some(execution), &names, options)
            .await
            .into_iter()
            .find(|object| accept(object.kind()))
    }

    /// Classify each part of a dotted name after the object it resolved to
    /// and the object's ancestors
    pub fn classify_object_path(&mut self, parts: &[SymbolEntryId], object: &ObjectRef) {
        let mut current = Some(object.clone());
        for &entry in parts.iter().rev() {
            let Some(object) = current else {
                break;
            };
            self.symbols.classify(
                entry,
                SymbolClass::for_object_kind(object.kind()),
                Some(SymbolDefinition::DbObject(object.clone())),
            );
            current = object.parent();
        }
    }

    /// Columns of a table-like object; `None` if they could not be read
    pub async fn load_columns(&mut self, object: &ObjectRef) -> Option<Vec<ResultColumn>> {
        let table = object.as_table()?;
        match table.columns(self.recognition.monitor().as_ref()).await {
            Ok(columns) => Some(
                columns
                    .into_iter()
                    .map(|c| ResultColumn::new(c.name, c.data_type).with_object(object.clone()))
                    .collect(),
            ),
            Err(err) => {
                warn!(error = %err, table = %object.qualified_name(), "Failed to read columns");
                None
            }
        }
    }

    /// Resolve the target table of a statement.
    ///
    /// The returned rows always hold one source for the table; it is marked
    /// unresolved when the table is unknown or its columns cannot be read.
    pub async fn resolve_table(
        &mut self,
        parts: &[SymbolEntryId],
        sources: &RowsSourceContext,
        range: TextRange,
    ) -> (Option<ObjectRef>, RowsDataContext) {
        if parts.is_empty() {
            return (None, RowsDataContext::empty());
        }
        let source = self.resolve_table_source(parts, sources, range).await;
        (source.object.clone(), RowsDataContext::empty().with_source(source))
    }

    /// Look up a table name in the catalog and describe it as a rows source.
    ///
    /// Warns with `range` when the table is not found and a connection exists.
    pub async fn resolve_table_source(
        &mut self,
        parts: &[SymbolEntryId],
        sources: &RowsSourceContext,
        range: TextRange,
    ) -> RowsSource {
        let name = self.dotted(parts);
        let Some(&last) = parts.last() else {
            return RowsSource::unresolved(name);
        };
        let origin = SymbolsOrigin::table_names(sources.clone());
        for &part in parts {
            self.set_origin(part, origin.clone());
        }

        let object = self
            .find_object(sources, parts, LookupOptions::tables(), ObjectKind::is_table_like)
            .await;
        match object {
            Some(object) => {
                self.classify_object_path(parts, &object);
                match self.load_columns(&object).await {
                    Some(columns) => RowsSource::new(name, columns),
                    None => RowsSource::unresolved(name),
                }
                .with_object(Some(object))
            }
            None => {
                self.classify(last, SymbolClass::Table, None);
                if sources.connection().is_some() && !self.recognition.is_canceled() {
                    self.warn(range, format!("Table '{name}' not found"));
                }
                RowsSource::unresolved(name)
            }
        }
    }

    /// Bind an unqualified column name against `rows`
    pub fn bind_column(&mut self, entry: SymbolEntryId, rows: &RowsDataContext) -> Option<ResultColumn> {
        let name = self.name(entry);
        let range = self.entry_range(entry);
        self.set_origin(entry, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
        match rows.resolve_column(&name, self.is_quoted(entry)) {
            ColumnResolution::Found(column) => {
                self.classify(entry, SymbolClass::Column, Some(SymbolDefinition::Column(column.clone())));
                Some(column)
            }
            ColumnResolution::Ambiguous(_) => {
                self.classify(entry, SymbolClass::Error, None);
                self.warn(range, format!("Column reference '{name}' is ambiguous"));
                None
            }
            ColumnResolution::NotFound if rows.has_unresolved_source() => {
                let column = ResultColumn::unknown(&name);
                self.classify(entry, SymbolClass::Column, Some(SymbolDefinition::Column(column)));
                None
            }
            ColumnResolution::NotFound => {
                self.classify(entry, SymbolClass::Error, None);
                self.warn(range, format!("Column '{name}' not found"));
                None
            }
        }
    }
}

/// Children of `node` that are query units
pub(crate) fn query_units(tree: &NodeTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    tree.children(node)
        .iter()
        .copied()
        .filter(|&child| is_query_unit(tree.kind(child)))
}

pub(crate) fn is_query_unit(kind: SyntaxKind) -> bool {
    matches!(kind, SyntaxKind::Query | SyntaxKind::Select | SyntaxKind::SetOperation)
}
