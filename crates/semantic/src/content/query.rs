// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query resolution
//!
//! [`QueryResolver`] binds the relations and values of query units
//! (`SELECT`, set operations, `WITH` queries).
//!
//! ## Rows phase
//!
//! A [`SmartWalk`] visits the relation-producing nodes of a unit. Rows are
//! computed on exit, bottom-up: table references, derived tables, joins,
//! then the `SELECT` that combines them into its projection tuple. `WITH`
//! bindings are visited as delayed siblings so each CTE, and finally the
//! body, sees the bindings to its left.
//!
//! ## Value phase
//!
//! Column references, routine calls and join conditions are bound against
//! the rows computed above. Subqueries found in values are queued together
//! with the rows they may correlate with, and resolved (both phases) from a
//! worklist, so nesting depth never turns into recursion.

use std::collections::HashMap;

use sqlmodel_catalog::{DataType, ObjectKind};
use sqlmodel_syntax::SyntaxKind;
use tracing::{debug, instrument};

use super::{ResolveCx, is_query_unit, query_units};
use crate::name_resolver::LookupOptions;
use crate::node::{NodeId, NodeTree};
use crate::rows::{ColumnResolution, ResultColumn, RowsDataContext, RowsSource, RowsSourceContext};
use crate::symbol::{SymbolClass, SymbolDefinition, SymbolEntryId, SymbolsOrigin};
use crate::traversal::{SmartWalk, WalkEvent, WalkPolicy};

const UNNAMED_COLUMN: &str = "?column?";

/// Rows and scopes a `SELECT` resolved in the rows phase
#[derive(Debug, Clone)]
struct SelectUnit {
    node: NodeId,
    sources: RowsSourceContext,
    /// Rows of the FROM clause, chained to the enclosing query's rows
    source_rows: RowsDataContext,
    tuple: RowsDataContext,
}

#[derive(Debug, Clone)]
struct JoinUnit {
    node: NodeId,
    sources: RowsSourceContext,
    rows: RowsDataContext,
}

/// Query unit found inside a value, resolved after the enclosing unit
#[derive(Debug, Clone)]
struct PendingUnit {
    node: NodeId,
    sources: RowsSourceContext,
}

/// Walk state: rows per node and the `WITH` bindings being accumulated
#[derive(Debug, Default)]
struct RowsWalkState {
    rows: HashMap<NodeId, RowsDataContext>,
    /// Bindings visible after the CTEs of a `WITH` processed so far
    with_contexts: HashMap<NodeId, RowsSourceContext>,
    /// Context a `Query` body runs in once its `WITH` is done
    body_contexts: HashMap<NodeId, RowsSourceContext>,
}

impl RowsWalkState {
    fn rows_of(&self, node: Option<NodeId>) -> RowsDataContext {
        node.and_then(|n| self.rows.get(&n)).cloned().unwrap_or_default()
    }
}

fn is_rows_source(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::TableReference | SyntaxKind::DerivedTable | SyntaxKind::Join
    )
}

impl WalkPolicy<RowsSourceContext> for RowsWalkState {
    fn logical_children(&self, tree: &NodeTree, node: NodeId) -> Vec<NodeId> {
        let children = tree.children(node).iter().copied();
        match tree.kind(node) {
            SyntaxKind::Query => children
                .filter(|&c| tree.kind(c) == SyntaxKind::WithClause || is_query_unit(tree.kind(c)))
                .collect(),
            SyntaxKind::WithClause => children
                .filter(|&c| tree.kind(c) == SyntaxKind::CteDefinition)
                .collect(),
            SyntaxKind::CteDefinition | SyntaxKind::DerivedTable | SyntaxKind::SetOperation => {
                query_units(tree, node).collect()
            }
            SyntaxKind::Select => tree
                .child_of_kind(node, SyntaxKind::FromClause)
                .map(|from| {
                    tree.children(from)
                        .iter()
                        .copied()
                        .filter(|&c| is_rows_source(tree.kind(c)))
                        .collect()
                })
                .unwrap_or_default(),
            SyntaxKind::Join => children.filter(|&c| is_rows_source(tree.kind(c))).collect(),
            _ => Vec::new(),
        }
    }

    fn delays_rest_of_children(&self, tree: &NodeTree, node: NodeId) -> bool {
        matches!(tree.kind(node), SyntaxKind::Query | SyntaxKind::WithClause)
    }

    fn child_context(
        &self,
        tree: &NodeTree,
        parent: NodeId,
        child: NodeId,
        context: &RowsSourceContext,
    ) -> RowsSourceContext {
        let bound = match tree.kind(parent) {
            SyntaxKind::Query if tree.kind(child) != SyntaxKind::WithClause => {
                self.body_contexts.get(&parent)
            }
            SyntaxKind::WithClause => self.with_contexts.get(&parent),
            _ => None,
        };
        bound.cloned().unwrap_or_else(|| context.clone())
    }
}

#[derive(Debug, Default)]
pub(crate) struct QueryResolver {
    selects: Vec<SelectUnit>,
    joins: Vec<JoinUnit>,
    pending: Vec<PendingUnit>,
}

impl QueryResolver {
    /// Rows phase of the query unit at `root`; returns its result tuple
    #[instrument(skip_all, fields(node = root.0))]
    pub async fn resolve_rows(
        &mut self,
        cx: &mut ResolveCx<'_>,
        root: NodeId,
        sources: &RowsSourceContext,
    ) -> RowsDataContext {
        let tree = cx.tree;
        let monitor = cx.recognition.monitor().clone();
        let mut walk = SmartWalk::new(
            tree,
            root,
            sources.clone(),
            RowsWalkState::default(),
            move || monitor.is_canceled(),
        );

        while let Some(event) = walk.next_event() {
            let (node, context) = match event {
                WalkEvent::Enter(node, context) => {
                    if tree.kind(node) == SyntaxKind::WithClause {
                        walk.policy_mut().with_contexts.insert(node, context);
                    }
                    continue;
                }
                WalkEvent::Exit(node, context) => (node, context),
            };

            let rows = match tree.kind(node) {
                SyntaxKind::TableReference => Some(self.table_reference(cx, node, &context).await),
                SyntaxKind::DerivedTable => Some(derived_table(cx, node, walk.policy())),
                SyntaxKind::Join => Some(self.join(cx, node, &context, walk.policy())),
                SyntaxKind::Select => Some(self.select(cx, node, &context, walk.policy())),
                SyntaxKind::SetOperation => Some(set_operation(cx, node, walk.policy())),
                SyntaxKind::CteDefinition => {
                    cte_definition(cx, node, walk.policy_mut());
                    None
                }
                SyntaxKind::WithClause => {
                    let state = walk.policy_mut();
                    if let (Some(query), Some(bound)) =
                        (tree.node(node).parent(), state.with_contexts.get(&node).cloned())
                    {
                        state.body_contexts.insert(query, bound);
                    }
                    None
                }
                SyntaxKind::Query => {
                    let body = query_units(tree, node).last();
                    Some(walk.policy().rows_of(body))
                }
                _ => None,
            };
            if let Some(rows) = rows {
                walk.policy_mut().rows.insert(node, rows);
            }
        }

        if walk.was_canceled() {
            debug!("Rows resolution canceled");
        }
        walk.into_policy().rows_of(Some(root))
    }

    /// Queue the value subtree at `root` for binding against `rows`
    pub async fn resolve_values(
        &mut self,
        cx: &mut ResolveCx<'_>,
        root: NodeId,
        rows: &RowsDataContext,
        sources: &RowsSourceContext,
    ) {
        let tree = cx.tree;
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if cx.recognition.is_canceled() {
                return;
            }
            match tree.kind(node) {
                SyntaxKind::ColumnReference => column_reference(cx, node, rows),
                SyntaxKind::FunctionCall => {
                    routine_call(cx, node, sources).await;
                    stack.extend(tree.children(node).iter().rev());
                }
                kind if is_query_unit(kind) => self.pending.push(PendingUnit {
                    node,
                    sources: sources.with_outer_rows(rows.clone()),
                }),
                SyntaxKind::Asterisk | SyntaxKind::DataTypeName => {}
                _ => stack.extend(tree.children(node).iter().rev()),
            }
        }
    }

    /// Value phase for everything collected so far, draining nested units
    pub async fn finish(&mut self, cx: &mut ResolveCx<'_>) {
        loop {
            if cx.recognition.is_canceled() {
                debug!("Value resolution canceled");
                return;
            }
            let joins = std::mem::take(&mut self.joins);
            let selects = std::mem::take(&mut self.selects);
            let pending = std::mem::take(&mut self.pending);
            if joins.is_empty() && selects.is_empty() && pending.is_empty() {
                return;
            }
            for join in joins {
                self.join_values(cx, &join).await;
            }
            for select in selects {
                self.select_values(cx, &select).await;
            }
            for unit in pending {
                self.resolve_rows(cx, unit.node, &unit.sources).await;
            }
        }
    }

    async fn table_reference(
        &mut self,
        cx: &mut ResolveCx<'_>,
        node: NodeId,
        sources: &RowsSourceContext,
    ) -> RowsDataContext {
        let tree = cx.tree;
        let model = tree.node(node);
        let parts = model.identifiers().to_vec();
        let alias = model.alias();
        let Some(&last) = parts.last() else {
            return RowsDataContext::empty();
        };

        let origin = SymbolsOrigin::table_names(sources.clone());
        for &part in &parts {
            cx.set_origin(part, origin.clone());
        }
        if let Err(err) = model.set_tail_origin(origin) {
            debug!(%err, "Keeping existing tail origin");
        }
        let alias_name = alias.map(|a| cx.name(a));

        if parts.len() == 1 {
            let name = cx.name(last);
            if let Some(rows) = sources.find_cte(&name, cx.is_quoted(last)) {
                let declaration = rows
                    .owner()
                    .and_then(|owner| tree.node(owner).identifiers().first().copied())
                    .map(SymbolDefinition::Entry);
                cx.classify(last, SymbolClass::Table, declaration);
                classify_alias(cx, alias, last);
                let source = RowsSource::new(name, rows.columns().to_vec())
                    .with_alias(alias_name)
                    .with_node(node);
                return RowsDataContext::empty().with_source(source);
            }
        }

        let source = cx.resolve_table_source(&parts, sources, tree.region(node)).await;
        classify_alias(cx, alias, last);
        RowsDataContext::empty().with_source(source.with_alias(alias_name).with_node(node))
    }

    fn join(
        &mut self,
        cx: &ResolveCx<'_>,
        node: NodeId,
        sources: &RowsSourceContext,
        state: &RowsWalkState,
    ) -> RowsDataContext {
        let tree = cx.tree;
        let using: Vec<String> = tree
            .child_of_kind(node, SyntaxKind::UsingClause)
            .and_then(|using| tree.child_of_kind(using, SyntaxKind::ColumnList))
            .map(|list| tree.node(list).identifiers().iter().map(|&e| cx.name(e)).collect())
            .unwrap_or_default();

        let mut sides = tree
            .children(node)
            .iter()
            .filter(|&&c| is_rows_source(tree.kind(c)))
            .map(|&c| state.rows_of(Some(c)));
        let mut rows = sides.next().unwrap_or_default();
        for side in sides {
            rows = rows.combine_using(&side, &using, false);
        }
        self.joins.push(JoinUnit {
            node,
            sources: sources.clone(),
            rows: rows.with_outer(sources.outer_rows().cloned()),
        });
        rows
    }

    fn select(
        &mut self,
        cx: &mut ResolveCx<'_>,
        node: NodeId,
        sources: &RowsSourceContext,
        state: &RowsWalkState,
    ) -> RowsDataContext {
        let tree = cx.tree;
        let mut combined = RowsDataContext::empty();
        if let Some(from) = tree.child_of_kind(node, SyntaxKind::FromClause) {
            for &item in tree.children(from) {
                if let Some(rows) = state.rows.get(&item) {
                    combined = combined.combine(rows);
                }
            }
            tree.set_scope_origin(from, SymbolsOrigin::table_names(sources.clone()));
        }
        let source_rows = combined.with_outer(sources.outer_rows().cloned());

        let columns = projection(cx, node, &source_rows);
        let tuple = source_rows.make_tuple(node, columns);

        for kind in [
            SyntaxKind::SelectList,
            SyntaxKind::WhereClause,
            SyntaxKind::GroupByClause,
            SyntaxKind::HavingClause,
        ] {
            if let Some(clause) = tree.child_of_kind(node, kind) {
                tree.set_scope_origin(clause, SymbolsOrigin::ColumnNameFromRowsData(source_rows.clone()));
            }
        }
        if let Some(order) = tree.child_of_kind(node, SyntaxKind::OrderByClause) {
            let visible = tuple.with_outer(Some(source_rows.clone()));
            tree.set_scope_origin(order, SymbolsOrigin::ColumnNameFromRowsData(visible));
        }
        if let Err(err) = tree
            .node(node)
            .set_tail_origin(SymbolsOrigin::ColumnNameFromRowsData(source_rows.clone()))
        {
            debug!(%err, "Keeping existing tail origin");
        }

        self.selects.push(SelectUnit {
            node,
            sources: sources.clone(),
            source_rows,
            tuple: tuple.clone(),
        });
        tuple
    }

    async fn select_values(&mut self, cx: &mut ResolveCx<'_>, select: &SelectUnit) {
        let tree = cx.tree;
        if let Some(list) = tree.child_of_kind(select.node, SyntaxKind::SelectList) {
            for &item in tree.children(list) {
                self.resolve_values(cx, item, &select.source_rows, &select.sources)
                    .await;
            }
        }
        for kind in [
            SyntaxKind::WhereClause,
            SyntaxKind::GroupByClause,
            SyntaxKind::HavingClause,
        ] {
            if let Some(clause) = tree.child_of_kind(select.node, kind) {
                self.resolve_values(cx, clause, &select.source_rows, &select.sources)
                    .await;
            }
        }
        if let Some(order) = tree.child_of_kind(select.node, SyntaxKind::OrderByClause) {
            // output names first, then the FROM columns
            let visible = select.tuple.with_outer(Some(select.source_rows.clone()));
            self.resolve_values(cx, order, &visible, &select.sources).await;
        }
    }

    async fn join_values(&mut self, cx: &mut ResolveCx<'_>, join: &JoinUnit) {
        let tree = cx.tree;
        if let Some(condition) = tree.child_of_kind(join.node, SyntaxKind::JoinCondition) {
            tree.set_scope_origin(condition, SymbolsOrigin::ColumnNameFromRowsData(join.rows.clone()));
            self.resolve_values(cx, condition, &join.rows, &join.sources)
                .await;
        }
        if let Some(list) = tree
            .child_of_kind(join.node, SyntaxKind::UsingClause)
            .and_then(|using| tree.child_of_kind(using, SyntaxKind::ColumnList))
        {
            for &entry in tree.node(list).identifiers() {
                cx.bind_column(entry, &join.rows);
            }
        }
    }
}

fn classify_alias(cx: &mut ResolveCx<'_>, alias: Option<SymbolEntryId>, name: SymbolEntryId) {
    if let Some(alias) = alias {
        cx.classify(alias, SymbolClass::TableAlias, Some(SymbolDefinition::Entry(name)));
    }
}

fn derived_table(cx: &mut ResolveCx<'_>, node: NodeId, state: &RowsWalkState) -> RowsDataContext {
    let tree = cx.tree;
    let rows = state.rows_of(query_units(tree, node).next());
    let alias = tree.node(node).alias();
    let name = alias.map(|a| cx.name(a)).unwrap_or_default();
    if let Some(alias) = alias {
        cx.classify(alias, SymbolClass::TableAlias, None);
    }
    let source = RowsSource::new(name.clone(), rows.columns().to_vec())
        .with_alias(alias.map(|_| name))
        .with_node(node);
    RowsDataContext::empty().with_source(source)
}

fn set_operation(cx: &mut ResolveCx<'_>, node: NodeId, state: &RowsWalkState) -> RowsDataContext {
    let tree = cx.tree;
    let branches: Vec<RowsDataContext> = query_units(tree, node)
        .map(|unit| state.rows_of(Some(unit)))
        .collect();
    let Some(first) = branches.first() else {
        return RowsDataContext::empty();
    };
    for other in &branches[1..] {
        if other.columns().len() != first.columns().len() {
            cx.warn(
                tree.region(node),
                format!(
                    "Set operation branches return {} and {} columns",
                    first.columns().len(),
                    other.columns().len()
                ),
            );
        }
    }
    RowsDataContext::empty().make_tuple(node, first.columns().to_vec())
}

fn cte_definition(cx: &mut ResolveCx<'_>, node: NodeId, state: &mut RowsWalkState) {
    let tree = cx.tree;
    let (Some(with), Some(&name)) = (tree.node(node).parent(), tree.node(node).identifiers().first())
    else {
        return;
    };
    let body = query_units(tree, node).next();
    let mut columns = state.rows_of(body).columns().to_vec();

    if let Some(list) = tree.child_of_kind(node, SyntaxKind::ColumnList) {
        let aliases = tree.node(list).identifiers();
        if body.is_some() && aliases.len() != columns.len() {
            cx.warn(
                tree.region(list),
                format!(
                    "WITH query '{}' has {} columns but {} column names were given",
                    cx.name(name),
                    columns.len(),
                    aliases.len()
                ),
            );
        }
        for (i, &alias) in aliases.iter().enumerate() {
            let alias_name = cx.name(alias);
            let column = match columns.get(i) {
                Some(column) => column.renamed(alias_name).declared_at(alias),
                None => ResultColumn::unknown(alias_name).declared_at(alias),
            };
            cx.classify(
                alias,
                SymbolClass::ColumnDerived,
                Some(SymbolDefinition::Column(column.clone())),
            );
            match columns.get_mut(i) {
                Some(slot) => *slot = column,
                None => columns.push(column),
            }
        }
    }

    cx.classify(name, SymbolClass::Table, None);
    let tuple = RowsDataContext::empty().make_tuple(node, columns);
    let bound = state
        .with_contexts
        .get(&with)
        .cloned()
        .unwrap_or_default()
        .with_cte(cx.name(name), tuple);
    state.with_contexts.insert(with, bound);
}

/// Output columns of a `SELECT`; aliases are declared here, values bind later
fn projection(cx: &mut ResolveCx<'_>, select: NodeId, rows: &RowsDataContext) -> Vec<ResultColumn> {
    let tree = cx.tree;
    let Some(list) = tree.child_of_kind(select, SyntaxKind::SelectList) else {
        return Vec::new();
    };
    let mut columns = Vec::new();
    for &item in tree.children(list) {
        let expr = match tree.kind(item) {
            SyntaxKind::SelectItem => tree.children(item).first().copied(),
            SyntaxKind::Asterisk => Some(item),
            _ => None,
        };
        if let Some(expr) = expr.filter(|&e| tree.kind(e) == SyntaxKind::Asterisk) {
            columns.extend(wildcard(cx, expr, rows));
            continue;
        }

        let mut column = match expr {
            Some(expr) if tree.kind(expr) == SyntaxKind::ColumnReference => {
                let parts = tree.node(expr).identifiers();
                peek_column(cx, parts, rows).unwrap_or_else(|| {
                    let name = parts.last().map(|&p| cx.name(p)).unwrap_or_default();
                    ResultColumn::new(name, DataType::Unknown)
                })
            }
            Some(expr) if tree.kind(expr) == SyntaxKind::FunctionCall => {
                let name = tree
                    .node(expr)
                    .identifiers()
                    .last()
                    .map(|&p| cx.name(p))
                    .unwrap_or_else(|| UNNAMED_COLUMN.to_string());
                ResultColumn::new(name, DataType::Unknown)
            }
            _ => ResultColumn::new(UNNAMED_COLUMN, DataType::Unknown),
        };
        if let Some(alias) = tree.node(item).alias() {
            column = column.renamed(cx.name(alias)).declared_at(alias);
            cx.classify(
                alias,
                SymbolClass::ColumnDerived,
                Some(SymbolDefinition::Column(column.clone())),
            );
        }
        columns.push(column);
    }
    columns
}

fn wildcard(cx: &mut ResolveCx<'_>, node: NodeId, rows: &RowsDataContext) -> Vec<ResultColumn> {
    let tree = cx.tree;
    let Some(&qualifier) = tree.node(node).identifiers().last() else {
        return rows.columns().to_vec();
    };
    let name = cx.name(qualifier);
    cx.set_origin(qualifier, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
    match rows.find_source(&name, cx.is_quoted(qualifier)) {
        Some(source) => {
            classify_qualifier(cx, qualifier, source);
            source.columns.clone()
        }
        None => {
            cx.classify(qualifier, SymbolClass::Error, None);
            cx.warn(cx.entry_range(qualifier), format!("Unknown table or alias '{name}'"));
            Vec::new()
        }
    }
}

fn classify_qualifier(cx: &mut ResolveCx<'_>, qualifier: SymbolEntryId, source: &RowsSource) {
    let class = if source.alias.is_some() {
        SymbolClass::TableAlias
    } else {
        SymbolClass::Table
    };
    cx.classify(
        qualifier,
        class,
        source.object.clone().map(SymbolDefinition::DbObject),
    );
}

/// Column a reference would bind to, without classifying anything
fn peek_column(cx: &ResolveCx<'_>, parts: &[SymbolEntryId], rows: &RowsDataContext) -> Option<ResultColumn> {
    let (&name, qualifier) = parts.split_last()?;
    let column = cx.name(name);
    let case_sensitive = cx.is_quoted(name);
    match qualifier.last() {
        Some(&q) => rows
            .find_source(&cx.name(q), cx.is_quoted(q))?
            .find_column(&column, case_sensitive)
            .cloned(),
        None => match rows.resolve_column(&column, case_sensitive) {
            ColumnResolution::Found(found) => Some(found),
            _ => None,
        },
    }
}

fn column_reference(cx: &mut ResolveCx<'_>, node: NodeId, rows: &RowsDataContext) {
    let tree = cx.tree;
    let parts = tree.node(node).identifiers();
    let Some((&name, qualifier)) = parts.split_last() else {
        return;
    };
    let Some(&q) = qualifier.last() else {
        cx.bind_column(name, rows);
        return;
    };

    cx.set_origin(q, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
    let qualifier_name = cx.name(q);
    let column_name = cx.name(name);
    match rows.find_source(&qualifier_name, cx.is_quoted(q)) {
        Some(source) => {
            classify_qualifier(cx, q, source);
            cx.set_origin(
                name,
                SymbolsOrigin::ColumnNameFromRowsData(RowsDataContext::empty().with_source(source.clone())),
            );
            match source.find_column(&column_name, cx.is_quoted(name)) {
                Some(column) => cx.classify(
                    name,
                    SymbolClass::Column,
                    Some(SymbolDefinition::Column(column.clone())),
                ),
                None if source.resolved => {
                    cx.classify(name, SymbolClass::Error, None);
                    cx.warn(
                        cx.entry_range(name),
                        format!("Column '{column_name}' not found in '{}'", source.visible_name()),
                    );
                }
                None => cx.classify(
                    name,
                    SymbolClass::Column,
                    Some(SymbolDefinition::Column(ResultColumn::unknown(column_name))),
                ),
            }
        }
        None => {
            cx.classify(q, SymbolClass::Error, None);
            cx.warn(cx.entry_range(q), format!("Unknown table or alias '{qualifier_name}'"));
            cx.classify(
                name,
                SymbolClass::Column,
                Some(SymbolDefinition::Column(ResultColumn::unknown(column_name))),
            );
        }
    }
}

async fn routine_call(cx: &mut ResolveCx<'_>, node: NodeId, sources: &RowsSourceContext) {
    let tree = cx.tree;
    let parts = tree.node(node).identifiers();
    let Some(&last) = parts.last() else {
        return;
    };
    if cx.symbols.entry(last).class().is_terminal() {
        return;
    }
    let object = if cx.recognition.config().resolve_routine_names {
        cx.find_object(sources, parts, LookupOptions::any_object(), ObjectKind::is_routine)
            .await
    } else {
        None
    };
    match object {
        Some(object) => cx.classify_object_path(parts, &object),
        None => cx.classify(last, SymbolClass::Function, None),
    }
}

/// A plain query: `SELECT`, set operation or `WITH` query
#[derive(Debug)]
pub struct QueryContent {
    node: NodeId,
    resolver: QueryResolver,
    result: Option<RowsDataContext>,
}

impl QueryContent {
    pub(crate) fn new(node: NodeId) -> Self {
        Self {
            node,
            resolver: QueryResolver::default(),
            result: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Result tuple, once the rows phase ran
    pub fn result_rows(&self) -> Option<&RowsDataContext> {
        self.result.as_ref()
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        self.resolver = QueryResolver::default();
        let rows = self.resolver.resolve_rows(cx, self.node, sources).await;
        self.result = Some(rows);
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        self.resolver.finish(cx).await;
    }
}
