// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `INSERT`, `UPDATE` and `DELETE`.
//!
//! The target table supplies the rows its column names and conditions bind
//! against. Queries and subqueries inside the statement go through the
//! same [`QueryResolver`] as plain queries.

use sqlmodel_catalog::ObjectRef;
use sqlmodel_syntax::SyntaxKind;

use super::query::QueryResolver;
use super::{ResolveCx, is_query_unit};
use crate::node::{NodeId, NodeTree};
use crate::rows::{RowsDataContext, RowsSourceContext};
use crate::symbol::SymbolsOrigin;
use crate::traversal::PostOrder;

#[derive(Debug)]
pub struct InsertModel {
    node: NodeId,
    columns: Option<NodeId>,
    values: Option<NodeId>,
    query: Option<NodeId>,
    /// Width of the query's result, when every column is known
    query_width: Option<usize>,
    table: Option<ObjectRef>,
    rows: Option<RowsDataContext>,
    sources: RowsSourceContext,
    resolver: QueryResolver,
}

impl InsertModel {
    pub(crate) fn from_tree(tree: &NodeTree, node: NodeId) -> Self {
        Self {
            node,
            columns: tree.child_of_kind(node, SyntaxKind::ColumnList),
            values: tree.child_of_kind(node, SyntaxKind::ValuesClause),
            query: tree
                .children(node)
                .iter()
                .copied()
                .find(|&c| is_query_unit(tree.kind(c))),
            query_width: None,
            table: None,
            rows: None,
            sources: RowsSourceContext::offline(),
            resolver: QueryResolver::default(),
        }
    }

    pub fn table(&self) -> Option<&ObjectRef> {
        self.table.as_ref()
    }

    /// Rows of the target table
    pub fn target_rows(&self) -> Option<&RowsDataContext> {
        self.rows.as_ref()
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        let tree = cx.tree;
        let parts = tree.node(self.node).identifiers();
        let (table, rows) = cx.resolve_table(parts, sources, tree.region(self.node)).await;
        if let Some(list) = self.columns {
            tree.set_scope_origin(list, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
        }
        self.table = table;
        self.rows = Some(rows);
        self.sources = sources.clone();

        self.resolver = QueryResolver::default();
        self.query_width = None;
        if let Some(query) = self.query {
            let result = self.resolver.resolve_rows(cx, query, sources).await;
            // a wildcard over an unknown table has no reliable width
            let has_wildcard = PostOrder::new(tree, query).any(|n| tree.kind(n) == SyntaxKind::Asterisk);
            if !has_wildcard {
                self.query_width = Some(result.columns().len());
            }
        }
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        let tree = cx.tree;
        let rows = self.rows.clone().unwrap_or_default();

        let expected = match self.columns {
            Some(list) => {
                let targets = tree.node(list).identifiers();
                for &entry in targets {
                    cx.bind_column(entry, &rows);
                }
                Some(targets.len())
            }
            None if self.table.is_some() && !rows.has_unresolved_source() => Some(rows.columns().len()),
            None => None,
        };

        if let (Some(query), Some(width), Some(expected)) = (self.query, self.query_width, expected)
            && width != expected
        {
            cx.warn(
                tree.region(query),
                format!("Query returns {width} columns but {expected} columns are expected"),
            );
        }

        if let Some(values) = self.values {
            // VALUES cannot see the target's columns
            let visible = RowsDataContext::nested_in(self.sources.outer_rows().cloned());
            for &row in tree.children(values) {
                let count = tree
                    .children(row)
                    .iter()
                    .filter(|&&c| tree.kind(c).is_expression())
                    .count();
                if let Some(expected) = expected.filter(|&n| n != count) {
                    cx.warn(
                        tree.region(row),
                        format!("VALUES row has {count} values but {expected} columns are expected"),
                    );
                }
                self.resolver
                    .resolve_values(cx, row, &visible, &self.sources)
                    .await;
            }
        }
        self.resolver.finish(cx).await;
    }
}

/// Target table and condition shared by `UPDATE` and `DELETE`
#[derive(Debug)]
struct TargetedStatement {
    node: NodeId,
    table: Option<NodeId>,
    rows: Option<RowsDataContext>,
    sources: RowsSourceContext,
    resolver: QueryResolver,
}

impl TargetedStatement {
    fn new(tree: &NodeTree, node: NodeId) -> Self {
        Self {
            node,
            table: tree.child_of_kind(node, SyntaxKind::TableReference),
            rows: None,
            sources: RowsSourceContext::offline(),
            resolver: QueryResolver::default(),
        }
    }

    async fn resolve_rows(&mut self, cx: &mut ResolveCx<'_>, sources: &RowsSourceContext, clauses: &[SyntaxKind]) {
        self.resolver = QueryResolver::default();
        self.sources = sources.clone();
        let rows = match self.table {
            Some(table) => self.resolver.resolve_rows(cx, table, sources).await,
            None => RowsDataContext::empty(),
        };
        let rows = rows.with_outer(sources.outer_rows().cloned());
        for &kind in clauses {
            if let Some(clause) = cx.tree.child_of_kind(self.node, kind) {
                cx.tree
                    .set_scope_origin(clause, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
            }
        }
        self.rows = Some(rows);
    }

    async fn resolve_values(&mut self, cx: &mut ResolveCx<'_>, clauses: &[SyntaxKind]) {
        let rows = self.rows.clone().unwrap_or_default();
        let tree = cx.tree;
        for &kind in clauses {
            if let Some(clause) = tree.child_of_kind(self.node, kind) {
                self.resolver
                    .resolve_values(cx, clause, &rows, &self.sources)
                    .await;
            }
        }
        self.resolver.finish(cx).await;
    }
}

const UPDATE_CLAUSES: &[SyntaxKind] = &[SyntaxKind::SetClause, SyntaxKind::WhereClause];
const DELETE_CLAUSES: &[SyntaxKind] = &[SyntaxKind::WhereClause];

#[derive(Debug)]
pub struct UpdateModel {
    inner: TargetedStatement,
}

impl UpdateModel {
    pub(crate) fn from_tree(tree: &NodeTree, node: NodeId) -> Self {
        Self {
            inner: TargetedStatement::new(tree, node),
        }
    }

    pub fn target_rows(&self) -> Option<&RowsDataContext> {
        self.inner.rows.as_ref()
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        self.inner.resolve_rows(cx, sources, UPDATE_CLAUSES).await;
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        self.inner.resolve_values(cx, UPDATE_CLAUSES).await;
    }
}

#[derive(Debug)]
pub struct DeleteModel {
    inner: TargetedStatement,
}

impl DeleteModel {
    pub(crate) fn from_tree(tree: &NodeTree, node: NodeId) -> Self {
        Self {
            inner: TargetedStatement::new(tree, node),
        }
    }

    pub fn target_rows(&self) -> Option<&RowsDataContext> {
        self.inner.rows.as_ref()
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        self.inner.resolve_rows(cx, sources, DELETE_CLAUSES).await;
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        self.inner.resolve_values(cx, DELETE_CLAUSES).await;
    }
}
