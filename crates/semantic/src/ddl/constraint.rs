// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Column and table constraints
//!
//! A [`ColumnConstraintSpec`] is one constraint, written inline on a column
//! definition or as a table constraint. Its own column names bind against
//! the rows of the constrained table. A foreign key also binds its
//! referenced columns against the referenced table:
//!
//! - explicit `REFERENCES parent (a, b)`: each name is looked up in
//!   `parent`; a name that does not resolve becomes an unknown-typed
//!   placeholder and a warning
//! - bare `REFERENCES parent`: the primary key of `parent` is read from the
//!   catalog and stands in for the list. A missing primary key is a
//!   warning; a failure reading it is an error carrying the catalog cause
//!
//! Either way, a referenced tuple whose length differs from the
//! constrained column list is reported as a warning and kept.

use sqlmodel_catalog::ObjectRef;
use sqlmodel_syntax::{SyntaxKind, TextRange};
use tracing::debug;

use crate::content::ResolveCx;
use crate::content::query::QueryResolver;
use crate::name_resolver::LookupOptions;
use crate::node::{NodeId, NodeTree};
use crate::rows::{ResultColumn, RowsDataContext, RowsSource, RowsSourceContext, names_match};
use crate::symbol::{SymbolClass, SymbolDefinition, SymbolEntryId, SymbolsOrigin};

/// `REFERENCES table [(columns)]`
#[derive(Debug, Clone)]
pub struct ReferenceSpec {
    node: NodeId,
    table: Vec<SymbolEntryId>,
    columns: Vec<SymbolEntryId>,
}

impl ReferenceSpec {
    fn from_tree(tree: &NodeTree, node: NodeId) -> Self {
        Self {
            node,
            table: tree.node(node).identifiers().to_vec(),
            columns: column_list(tree, node),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Parts of the referenced table name
    pub fn table(&self) -> &[SymbolEntryId] {
        &self.table
    }

    /// Explicitly referenced columns; empty when the primary key is implied
    pub fn columns(&self) -> &[SymbolEntryId] {
        &self.columns
    }
}

#[derive(Debug, Clone)]
pub enum ConstraintKind {
    PrimaryKey,
    Unique,
    NotNull,
    Null,
    Default,
    Check,
    ForeignKey(ReferenceSpec),
}

impl ConstraintKind {
    fn from_node(tree: &NodeTree, kind_node: NodeId) -> Option<Self> {
        let kind = match tree.kind(kind_node) {
            SyntaxKind::PrimaryKey => ConstraintKind::PrimaryKey,
            SyntaxKind::UniqueKey => ConstraintKind::Unique,
            SyntaxKind::NotNull => ConstraintKind::NotNull,
            SyntaxKind::NullConstraint => ConstraintKind::Null,
            SyntaxKind::DefaultValue => ConstraintKind::Default,
            SyntaxKind::Check => ConstraintKind::Check,
            SyntaxKind::References => {
                ConstraintKind::ForeignKey(ReferenceSpec::from_tree(tree, kind_node))
            }
            SyntaxKind::ForeignKey => {
                let references = tree.child_of_kind(kind_node, SyntaxKind::References)?;
                ConstraintKind::ForeignKey(ReferenceSpec::from_tree(tree, references))
            }
            _ => return None,
        };
        Some(kind)
    }
}

/// What a foreign key points at
#[derive(Debug, Clone)]
enum ReferenceTarget {
    /// The table being declared by the statement
    OwnTable,
    Object(ObjectRef),
}

/// The table a constraint belongs to
pub(crate) struct OwnTable<'a> {
    /// Normalized name, when the statement declares the table
    pub name: Option<&'a str>,
    /// Columns of the table; `None` when they are unknown
    pub rows: Option<&'a RowsDataContext>,
    /// Declared primary key, for self references
    pub primary_key: &'a [ResultColumn],
    /// Catalog object of the table when it already exists; self references
    /// then read the key from the catalog
    pub object: Option<&'a ObjectRef>,
}

#[derive(Debug, Clone)]
pub struct ColumnConstraintSpec {
    node: NodeId,
    name: Option<SymbolEntryId>,
    kind: ConstraintKind,
    /// Constrained columns: the column itself when inline, the column list otherwise
    columns: Vec<SymbolEntryId>,
    inline: bool,
    /// Node holding the DEFAULT or CHECK expression
    expression: Option<NodeId>,
    target: Option<ReferenceTarget>,
    referenced_rows: Option<RowsDataContext>,
    referenced_columns: Option<Vec<ResultColumn>>,
}

impl ColumnConstraintSpec {
    /// Constraint at a `ColumnConstraint` or `TableConstraint` node
    pub(crate) fn from_tree(tree: &NodeTree, node: NodeId, column: Option<SymbolEntryId>) -> Option<Self> {
        let kind_node = tree
            .children(node)
            .iter()
            .copied()
            .find(|&child| ConstraintKind::from_node(tree, child).is_some())?;
        let kind = ConstraintKind::from_node(tree, kind_node)?;
        let inline = tree.kind(node) == SyntaxKind::ColumnConstraint;
        let columns = if inline {
            column.into_iter().collect()
        } else {
            column_list(tree, kind_node)
        };
        let expression = matches!(kind, ConstraintKind::Default | ConstraintKind::Check).then_some(kind_node);
        Some(Self {
            node,
            name: tree.node(node).identifiers().first().copied(),
            kind,
            columns,
            inline,
            expression,
            target: None,
            referenced_rows: None,
            referenced_columns: None,
        })
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Entry of the `CONSTRAINT name` clause
    pub fn name(&self) -> Option<SymbolEntryId> {
        self.name
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn columns(&self) -> &[SymbolEntryId] {
        &self.columns
    }

    pub fn is_inline(&self) -> bool {
        self.inline
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(self.kind, ConstraintKind::PrimaryKey)
    }

    pub fn references(&self) -> Option<&ReferenceSpec> {
        match &self.kind {
            ConstraintKind::ForeignKey(reference) => Some(reference),
            _ => None,
        }
    }

    /// Referenced table object; `None` for self references and unresolved tables
    pub fn referenced_table(&self) -> Option<&ObjectRef> {
        match &self.target {
            Some(ReferenceTarget::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// Columns of the referenced table
    pub fn referenced_rows(&self) -> Option<&RowsDataContext> {
        self.referenced_rows.as_ref()
    }

    /// Referenced key the foreign key's columns pair with
    pub fn referenced_columns(&self) -> Option<&[ResultColumn]> {
        self.referenced_columns.as_deref()
    }

    /// Bind the constraint name and the referenced table
    pub(crate) async fn resolve_objects(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
        own: &OwnTable<'_>,
    ) {
        if let Some(name) = self.name {
            cx.classify(name, SymbolClass::Constraint, None);
        }
        self.target = None;
        let Some(reference) = self.references() else {
            return;
        };
        let reference_node = reference.node;
        let parts = reference.table.clone();
        let Some(&last) = parts.last() else {
            return;
        };
        cx.set_origin(last, SymbolsOrigin::table_names(sources.clone()));

        let name = cx.name(last);
        let is_own = parts.len() == 1
            && own
                .name
                .is_some_and(|own_name| names_match(own_name, &name, cx.is_quoted(last)));
        if is_own {
            match own.object {
                Some(object) => {
                    cx.classify_object_path(&parts, object);
                    self.target = Some(ReferenceTarget::Object(object.clone()));
                }
                None => {
                    cx.classify(last, SymbolClass::Table, None);
                    self.target = Some(ReferenceTarget::OwnTable);
                }
            }
            return;
        }

        let object = cx
            .find_object(sources, &parts, LookupOptions::tables(), |kind| kind.is_table_like())
            .await;
        match object {
            Some(object) => {
                cx.classify_object_path(&parts, &object);
                self.target = Some(ReferenceTarget::Object(object));
            }
            None => {
                cx.classify(last, SymbolClass::Table, None);
                if sources.connection().is_some() && !cx.recognition.is_canceled() {
                    let range = cx.tree.region(reference_node);
                    cx.warn(range, format!("Referenced table '{}' not found", cx.dotted(&parts)));
                }
            }
        }
    }

    /// Bind column names and expressions against the constrained table
    pub(crate) async fn resolve_values(
        &mut self,
        cx: &mut ResolveCx<'_>,
        resolver: &mut QueryResolver,
        sources: &RowsSourceContext,
        own: &OwnTable<'_>,
    ) {
        let tree = cx.tree;
        match own.rows {
            Some(rows) => {
                if !self.inline {
                    for &column in &self.columns {
                        cx.bind_column(column, rows);
                    }
                }
                if let Some(expression) = self.expression {
                    resolver.resolve_values(cx, expression, rows, sources).await;
                }
                tree.set_scope_origin(self.node, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
            }
            None => {
                for &column in &self.columns {
                    cx.classify(column, SymbolClass::Column, None);
                }
            }
        }

        if self.references().is_some() {
            self.resolve_reference(cx, own).await;
        }
    }

    async fn resolve_reference(&mut self, cx: &mut ResolveCx<'_>, own: &OwnTable<'_>) {
        let Some(reference) = self.references().cloned() else {
            return;
        };
        let range = cx.tree.region(reference.node);
        let table_name = cx.dotted(&reference.table);

        let source = match &self.target {
            None => {
                debug!(table = %table_name, "Referenced table unresolved, skipping referenced columns");
                return;
            }
            Some(ReferenceTarget::OwnTable) => own
                .rows
                .and_then(|rows| rows.rows_sources().next().cloned())
                .unwrap_or_else(|| RowsSource::unresolved(table_name.clone())),
            Some(ReferenceTarget::Object(object)) => match cx.load_columns(object).await {
                Some(columns) => RowsSource::new(table_name.clone(), columns),
                None => RowsSource::unresolved(table_name.clone()),
            }
            .with_object(Some(object.clone())),
        };
        let referenced_rows = RowsDataContext::empty().with_source(source.clone());

        let referenced = if reference.columns.is_empty() {
            match self.implied_key(cx, own, &source, &table_name, range).await {
                Some(key) => key,
                None => return,
            }
        } else {
            let mut referenced = Vec::with_capacity(reference.columns.len());
            for &entry in &reference.columns {
                let name = cx.name(entry);
                cx.set_origin(
                    entry,
                    SymbolsOrigin::ColumnRefFromReferencedContext(referenced_rows.clone()),
                );
                match source.find_column(&name, cx.is_quoted(entry)) {
                    Some(column) => {
                        cx.classify(
                            entry,
                            SymbolClass::Column,
                            Some(SymbolDefinition::Column(column.clone())),
                        );
                        referenced.push(column.clone());
                    }
                    None => {
                        cx.classify(entry, SymbolClass::Error, None);
                        cx.warn(
                            cx.entry_range(entry),
                            format!("Column '{name}' not found in referenced table '{table_name}'"),
                        );
                        referenced.push(ResultColumn::unknown(name));
                    }
                }
            }
            referenced
        };

        if referenced.len() != self.columns.len() {
            cx.warn(
                range,
                format!(
                    "Foreign key has {} columns but the referenced key has {}",
                    self.columns.len(),
                    referenced.len()
                ),
            );
        }

        cx.tree.set_scope_origin(
            self.node,
            SymbolsOrigin::ColumnRefFromReferencedContext(referenced_rows.clone()),
        );
        self.referenced_rows = Some(referenced_rows);
        self.referenced_columns = Some(referenced);
    }

    /// Primary key of the referenced table, standing in for a missing column list
    async fn implied_key(
        &self,
        cx: &mut ResolveCx<'_>,
        own: &OwnTable<'_>,
        source: &RowsSource,
        table_name: &str,
        range: TextRange,
    ) -> Option<Vec<ResultColumn>> {
        let key = match &self.target {
            Some(ReferenceTarget::OwnTable) => {
                let names: Vec<String> = own.primary_key.iter().map(|c| c.name.clone()).collect();
                (!names.is_empty()).then_some(names)
            }
            Some(ReferenceTarget::Object(object)) => {
                let table = object.as_table()?;
                let key = table.primary_key(cx.recognition.monitor().as_ref()).await;
                match key {
                    Ok(key) => key,
                    Err(err) => {
                        cx.recognition.append_error(
                            range,
                            format!("Failed to read primary key of '{table_name}'"),
                            Some(err),
                        );
                        return None;
                    }
                }
            }
            None => None,
        };
        let Some(key) = key else {
            cx.warn(range, format!("Referenced table '{table_name}' has no primary key"));
            return None;
        };
        Some(
            key.iter()
                .map(|name| {
                    source
                        .find_column(name, true)
                        .or_else(|| source.find_column(name, false))
                        .cloned()
                        .unwrap_or_else(|| ResultColumn::unknown(name))
                })
                .collect(),
        )
    }
}

/// Identifiers of the `ColumnList` under `node`
fn column_list(tree: &NodeTree, node: NodeId) -> Vec<SymbolEntryId> {
    tree.child_of_kind(node, SyntaxKind::ColumnList)
        .map(|list| tree.node(list).identifiers().to_vec())
        .unwrap_or_default()
}
