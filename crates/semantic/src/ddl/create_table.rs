// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `CREATE TABLE`.
//!
//! The declared columns form a virtual rows context for the new table. It
//! exists whether or not the catalog already knows the table, and it is
//! what column names inside the statement's constraints bind against.

use sqlmodel_catalog::{DataType, ObjectRef};
use sqlmodel_syntax::{SyntaxKind, SyntaxTree};

use super::constraint::{ColumnConstraintSpec, OwnTable};
use crate::content::ResolveCx;
use crate::content::query::QueryResolver;
use crate::name_resolver::LookupOptions;
use crate::node::{NodeId, NodeTree};
use crate::rows::{ResultColumn, RowsDataContext, RowsSource, RowsSourceContext, names_match};
use crate::symbol::{SymbolClass, SymbolDefinition, SymbolEntryId, SymbolsOrigin};

/// One column definition
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    node: NodeId,
    name: Option<SymbolEntryId>,
    data_type: DataType,
    constraints: Vec<ColumnConstraintSpec>,
}

impl ColumnSpec {
    pub(crate) fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        let name = tree.node(node).identifiers().first().copied();
        let data_type = tree
            .child_of_kind(node, SyntaxKind::DataTypeName)
            .map(|type_node| DataType::from_sql_name(syntax.text(tree.node(type_node).syntax_node())))
            .unwrap_or(DataType::Unknown);
        let constraints = tree
            .children_of_kind(node, SyntaxKind::ColumnConstraint)
            .filter_map(|c| ColumnConstraintSpec::from_tree(tree, c, name))
            .collect();
        Self {
            node,
            name,
            data_type,
            constraints,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn name(&self) -> Option<SymbolEntryId> {
        self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn constraints(&self) -> &[ColumnConstraintSpec] {
        &self.constraints
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut [ColumnConstraintSpec] {
        &mut self.constraints
    }

    pub fn is_primary_key(&self) -> bool {
        self.constraints.iter().any(ColumnConstraintSpec::is_primary_key)
    }

    /// Declare the column: classify its name and describe it as a result column
    pub(crate) fn declare(&self, cx: &mut ResolveCx<'_>) -> Option<ResultColumn> {
        let entry = self.name?;
        let column = ResultColumn::new(cx.name(entry), self.data_type.clone()).declared_at(entry);
        cx.classify(entry, SymbolClass::Column, Some(SymbolDefinition::Column(column.clone())));
        Some(column)
    }
}

#[derive(Debug)]
pub struct CreateTableModel {
    node: NodeId,
    name: Vec<SymbolEntryId>,
    columns: Vec<ColumnSpec>,
    constraints: Vec<ColumnConstraintSpec>,
    table_name: Option<String>,
    existing: Option<ObjectRef>,
    rows: RowsDataContext,
    primary_key: Vec<ResultColumn>,
    sources: RowsSourceContext,
    resolver: QueryResolver,
}

impl CreateTableModel {
    pub(crate) fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        Self {
            node,
            name: tree.node(node).identifiers().to_vec(),
            columns: tree
                .children_of_kind(node, SyntaxKind::ColumnDefinition)
                .map(|c| ColumnSpec::from_tree(tree, syntax, c))
                .collect(),
            constraints: tree
                .children_of_kind(node, SyntaxKind::TableConstraint)
                .filter_map(|c| ColumnConstraintSpec::from_tree(tree, c, None))
                .collect(),
            table_name: None,
            existing: None,
            rows: RowsDataContext::empty(),
            primary_key: Vec::new(),
            sources: RowsSourceContext::offline(),
            resolver: QueryResolver::default(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Parts of the declared table name
    pub fn name(&self) -> &[SymbolEntryId] {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Table constraints, in declaration order
    pub fn constraints(&self) -> &[ColumnConstraintSpec] {
        &self.constraints
    }

    /// Catalog object of the same name, when the table already exists
    pub fn existing_table(&self) -> Option<&ObjectRef> {
        self.existing.as_ref()
    }

    /// Rows of the table as declared
    pub fn virtual_rows(&self) -> &RowsDataContext {
        &self.rows
    }

    /// Declared primary key, inline or table-level
    pub fn primary_key(&self) -> &[ResultColumn] {
        &self.primary_key
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        self.sources = sources.clone();
        self.resolver = QueryResolver::default();
        self.existing = None;

        if let Some(&last) = self.name.last() {
            let origin = SymbolsOrigin::table_names(sources.clone());
            for &part in &self.name {
                cx.set_origin(part, origin.clone());
            }
            // creating a table that already exists is not this model's concern
            self.existing = cx
                .find_object(sources, &self.name, LookupOptions::tables(), |kind| kind.is_table_like())
                .await;
            match &self.existing {
                Some(object) => cx.classify_object_path(&self.name, object),
                None => cx.classify(last, SymbolClass::Table, None),
            }
            self.table_name = Some(cx.name(last));
        }

        let declared: Vec<ResultColumn> = self.columns.iter().filter_map(|c| c.declare(cx)).collect();
        let source = RowsSource::new(cx.dotted(&self.name), declared.clone())
            .with_object(self.existing.clone())
            .with_node(self.node);
        self.rows = RowsDataContext::empty().with_source(source);
        self.primary_key = self.declared_primary_key(cx, &declared);

        let own = OwnTable {
            name: self.table_name.as_deref(),
            rows: Some(&self.rows),
            primary_key: &self.primary_key,
            object: None,
        };
        for column in &mut self.columns {
            for constraint in column.constraints_mut() {
                constraint.resolve_objects(cx, sources, &own).await;
            }
        }
        for constraint in &mut self.constraints {
            constraint.resolve_objects(cx, sources, &own).await;
        }
    }

    pub(crate) async fn resolve_value_relations(&mut self, cx: &mut ResolveCx<'_>) {
        let own = OwnTable {
            name: self.table_name.as_deref(),
            rows: Some(&self.rows),
            primary_key: &self.primary_key,
            object: None,
        };
        for column in &mut self.columns {
            for constraint in column.constraints_mut() {
                constraint
                    .resolve_values(cx, &mut self.resolver, &self.sources, &own)
                    .await;
            }
        }
        for constraint in &mut self.constraints {
            constraint
                .resolve_values(cx, &mut self.resolver, &self.sources, &own)
                .await;
        }
        self.resolver.finish(cx).await;
    }

    fn declared_primary_key(&self, cx: &ResolveCx<'_>, declared: &[ResultColumn]) -> Vec<ResultColumn> {
        let inline = self
            .columns
            .iter()
            .filter(|c| c.is_primary_key())
            .filter_map(|c| c.name);
        let table_level = self
            .constraints
            .iter()
            .filter(|c| c.is_primary_key())
            .flat_map(|c| c.columns().iter().copied());
        inline
            .chain(table_level)
            .filter_map(|entry| {
                let name = cx.name(entry);
                let quoted = cx.is_quoted(entry);
                declared
                    .iter()
                    .find(|column| names_match(&column.name, &name, quoted))
                    .cloned()
            })
            .collect()
    }
}
