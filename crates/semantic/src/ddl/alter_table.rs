// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `ALTER TABLE`.

use sqlmodel_catalog::ObjectRef;
use sqlmodel_syntax::{SyntaxKind, SyntaxTree};

use super::constraint::{ColumnConstraintSpec, OwnTable};
use super::create_table::ColumnSpec;
use crate::content::ResolveCx;
use crate::content::query::QueryResolver;
use crate::node::{NodeId, NodeTree};
use crate::rows::{RowsDataContext, RowsSourceContext};
use crate::symbol::{SymbolClass, SymbolEntryId, SymbolsOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterActionKind {
    AddColumn,
    DropColumn,
    AlterColumn,
    RenameColumn,
    AddConstraint,
    DropConstraint,
    RenameTable,
    Other,
}

impl AlterActionKind {
    fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        let syntax_node = tree.node(node).syntax_node();
        let has = |word: &str| syntax.has_keyword(syntax_node, word);
        if has("RENAME") {
            if has("COLUMN") || tree.node(node).identifiers().len() > 1 {
                AlterActionKind::RenameColumn
            } else {
                AlterActionKind::RenameTable
            }
        } else if has("ADD") {
            if has("CONSTRAINT") || tree.child_of_kind(node, SyntaxKind::TableConstraint).is_some() {
                AlterActionKind::AddConstraint
            } else {
                AlterActionKind::AddColumn
            }
        } else if has("DROP") {
            if has("CONSTRAINT") {
                AlterActionKind::DropConstraint
            } else {
                AlterActionKind::DropColumn
            }
        } else if has("ALTER") || has("MODIFY") || has("CHANGE") {
            AlterActionKind::AlterColumn
        } else {
            AlterActionKind::Other
        }
    }

    /// Actions whose first name refers to an existing column
    fn targets_existing_column(self) -> bool {
        matches!(
            self,
            AlterActionKind::DropColumn | AlterActionKind::AlterColumn | AlterActionKind::RenameColumn
        )
    }
}

/// One action of an `ALTER TABLE`
#[derive(Debug, Clone)]
pub struct AlterTableActionSpec {
    node: NodeId,
    kind: AlterActionKind,
    column: Option<ColumnSpec>,
    names: Vec<SymbolEntryId>,
    constraint: Option<ColumnConstraintSpec>,
}

impl AlterTableActionSpec {
    fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        Self {
            node,
            kind: AlterActionKind::from_tree(tree, syntax, node),
            column: tree
                .child_of_kind(node, SyntaxKind::ColumnDefinition)
                .map(|c| ColumnSpec::from_tree(tree, syntax, c)),
            names: tree.node(node).identifiers().to_vec(),
            constraint: tree
                .child_of_kind(node, SyntaxKind::TableConstraint)
                .and_then(|c| ColumnConstraintSpec::from_tree(tree, c, None)),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn kind(&self) -> AlterActionKind {
        self.kind
    }

    /// Column definition of `ADD COLUMN` and friends
    pub fn column(&self) -> Option<&ColumnSpec> {
        self.column.as_ref()
    }

    /// Names written directly in the action
    pub fn names(&self) -> &[SymbolEntryId] {
        &self.names
    }

    pub fn constraint(&self) -> Option<&ColumnConstraintSpec> {
        self.constraint.as_ref()
    }

    fn constraints_mut(&mut self) -> impl Iterator<Item = &mut ColumnConstraintSpec> {
        let inline = self
            .column
            .iter_mut()
            .flat_map(|c| c.constraints_mut().iter_mut());
        inline.chain(self.constraint.iter_mut())
    }

    fn resolve_names(&self, cx: &mut ResolveCx<'_>, rows: Option<&RowsDataContext>, table: &str) {
        for (i, &entry) in self.names.iter().enumerate() {
            match self.kind {
                kind if i == 0 && kind.targets_existing_column() => match rows {
                    Some(rows) => {
                        cx.bind_column(entry, rows);
                    }
                    None => {
                        cx.classify(entry, SymbolClass::Column, None);
                        let name = cx.name(entry);
                        cx.warn(
                            cx.entry_range(entry),
                            format!("Column '{name}' cannot be resolved, table '{table}' is unknown"),
                        );
                    }
                },
                AlterActionKind::RenameColumn => cx.classify(entry, SymbolClass::ColumnDerived, None),
                AlterActionKind::DropConstraint => cx.classify(entry, SymbolClass::Constraint, None),
                AlterActionKind::RenameTable => cx.classify(entry, SymbolClass::Table, None),
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
pub struct AlterTableModel {
    node: NodeId,
    name: Vec<SymbolEntryId>,
    actions: Vec<AlterTableActionSpec>,
    table: Option<ObjectRef>,
    rows: Option<RowsDataContext>,
    sources: RowsSourceContext,
    resolver: QueryResolver,
}

impl AlterTableModel {
    pub(crate) fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        Self {
            node,
            name: tree.node(node).identifiers().to_vec(),
            actions: tree
                .children_of_kind(node, SyntaxKind::AlterTableAction)
                .map(|a| AlterTableActionSpec::from_tree(tree, syntax, a))
                .collect(),
            table: None,
            rows: None,
            sources: RowsSourceContext::offline(),
            resolver: QueryResolver::default(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn actions(&self) -> &[AlterTableActionSpec] {
        &self.actions
    }

    pub fn table(&self) -> Option<&ObjectRef> {
        self.table.as_ref()
    }

    /// Rows of the altered table; `None` when the table is unknown
    pub fn table_rows(&self) -> Option<&RowsDataContext> {
        self.rows.as_ref()
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        self.sources = sources.clone();
        self.resolver = QueryResolver::default();
        let range = cx.tree.region(self.node);
        let (table, rows) = cx.resolve_table(&self.name, sources, range).await;
        self.rows = table.is_some().then_some(rows);
        self.table = table;

        let own_name = self.name.last().map(|&last| cx.name(last));
        let own = OwnTable {
            name: own_name.as_deref(),
            rows: self.rows.as_ref(),
            primary_key: &[],
            object: self.table.as_ref(),
        };
        for action in &mut self.actions {
            for constraint in action.constraints_mut() {
                constraint.resolve_objects(cx, sources, &own).await;
            }
        }
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        let tree = cx.tree;
        let table = cx.dotted(&self.name);
        let own_name = self.name.last().map(|&last| cx.name(last));
        let own = OwnTable {
            name: own_name.as_deref(),
            rows: self.rows.as_ref(),
            primary_key: &[],
            object: self.table.as_ref(),
        };
        for action in &mut self.actions {
            action.resolve_names(cx, own.rows, &table);
            if let Some(column) = &action.column {
                column.declare(cx);
            }
            if let Some(rows) = own.rows {
                tree.set_scope_origin(action.node, SymbolsOrigin::ColumnNameFromRowsData(rows.clone()));
            }
            for constraint in action.constraints_mut() {
                constraint
                    .resolve_values(cx, &mut self.resolver, &self.sources, &own)
                    .await;
            }
        }
        self.resolver.finish(cx).await;
    }
}
