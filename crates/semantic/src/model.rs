// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Query Model
//!
//! [`QueryModel`] is the root of the node model for one statement. It owns
//! the node arena, every symbol entry of the statement and the flat list of
//! lexical items, and it carries at most one [`ModelContent`].
//!
//! The model is built once per parse and resolved once with
//! [`QueryModel::resolve_relations`]. After that it only answers lookups:
//!
//! - [`QueryModel::find_node_containing`]: deepest node whose interval
//!   contains an offset
//! - [`QueryModel::find_lexical_context`]: the symbol item at an offset and
//!   the origin that explains what names are valid there
//!
//! Lookups take `&self` and never mutate, so concurrent readers of a
//! resolved model need no locking.

use std::sync::Arc;

use sqlmodel_syntax::{Dialect, SyntaxKind, SyntaxTree};
use tracing::{debug, instrument};

use crate::builder::build_model;
use crate::content::{ModelContent, ResolveCx};
use crate::error::SemanticResult;
use crate::node::{NodeId, NodeTree};
use crate::recognition::RecognitionContext;
use crate::rows::RowsSourceContext;
use crate::scope::{LexicalItem, item_covering};
use crate::symbol::{SymbolEntry, SymbolTable, SymbolsOrigin};
use crate::traversal::PostOrder;

/// How far resolution has progressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResolutionState {
    Constructed,
    ObjectsResolved,
    ValueRelationsResolved,
}

/// Answer of [`QueryModel::find_lexical_context`]
#[derive(Debug, Clone, Copy)]
pub struct LexicalContext<'a> {
    /// Offset the lookup was made at
    pub offset: usize,
    /// Symbol item at or right before the offset
    pub item: Option<LexicalItem>,
    /// Origin explaining the names valid at the offset
    pub origin: Option<&'a SymbolsOrigin>,
}

#[derive(Debug)]
pub struct QueryModel {
    syntax: Arc<SyntaxTree>,
    dialect: Dialect,
    tree: NodeTree,
    symbols: SymbolTable,
    lexical_items: Vec<LexicalItem>,
    content: Option<ModelContent>,
    state: ResolutionState,
}

impl QueryModel {
    /// Build the model of the statement in `syntax`
    pub fn build(syntax: Arc<SyntaxTree>, dialect: Dialect) -> SemanticResult<Self> {
        let parts = build_model(&syntax, dialect)?;
        let content = ModelContent::from_tree(&parts.tree, &syntax, parts.tree.root());
        Ok(Self {
            syntax,
            dialect,
            tree: parts.tree,
            symbols: parts.symbols,
            lexical_items: parts.lexical_items,
            content,
            state: ResolutionState::Constructed,
        })
    }

    pub fn syntax(&self) -> &SyntaxTree {
        &self.syntax
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tree(&self) -> &NodeTree {
        &self.tree
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn content(&self) -> Option<&ModelContent> {
        self.content.as_ref()
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Every symbol entry of the statement, in text order
    pub fn all_symbols(&self) -> &[SymbolEntry] {
        self.symbols.entries()
    }

    /// Nodes of the given kinds, deepest first
    pub fn nodes_of_kind<'a>(&'a self, kinds: &'a [SyntaxKind]) -> impl Iterator<Item = NodeId> + 'a {
        PostOrder::new(&self.tree, self.tree.root()).filter(move |&node| kinds.contains(&self.tree.kind(node)))
    }

    /// Resolve every name of the statement.
    ///
    /// Objects and rows are resolved first, then value relations. Running it
    /// again with the same catalog state leaves classifications unchanged.
    #[instrument(skip_all, fields(kind = ?self.tree.kind(self.tree.root())))]
    pub async fn resolve_relations(&mut self, sources: &RowsSourceContext, recognition: &mut RecognitionContext) {
        let mut cx = ResolveCx::new(&self.tree, &mut self.symbols, recognition);
        if let Some(content) = self.content.as_mut() {
            content.resolve_object_and_rows_references(&mut cx, sources).await;
            self.state = self.state.max(ResolutionState::ObjectsResolved);
            if cx.recognition.is_canceled() {
                debug!("Resolution canceled after object references");
                return;
            }
            content.resolve_value_relations(&mut cx).await;
            self.state = ResolutionState::ValueRelationsResolved;
        }
        self.resolve_statement_tail();
    }

    /// Give the root the origin that applies at the statement's end
    fn resolve_statement_tail(&self) {
        let tree = &self.tree;
        let root = tree.node(tree.root());
        if root.tail_origin().is_some() {
            return;
        }
        let end = root.region().end;

        let mut chain = vec![tree.root()];
        let mut current = tree.root();
        while let Some(child) = tree.find_child_touching(current, end) {
            chain.push(child);
            current = child;
        }

        let origin = chain
            .iter()
            .rev()
            .find_map(|&id| {
                let node = tree.node(id);
                node.tail_origin()
                    .or_else(|| node.find_lexical_scope(end).and_then(|scope| scope.origin()))
            })
            .or_else(|| {
                // nothing reaches the end: take the scope that ends last
                tree.iter()
                    .flat_map(|node| node.scopes())
                    .filter(|scope| scope.origin().is_some())
                    .max_by_key(|scope| scope.range().end)
                    .and_then(|scope| scope.origin())
            })
            .cloned();

        if let Some(origin) = origin
            && let Err(err) = root.set_tail_origin(origin)
        {
            debug!(%err, "Keeping existing statement tail origin");
        }
    }

    /// Deepest node whose interval contains `offset`; the root if none does
    pub fn find_node_containing(&self, offset: usize) -> NodeId {
        let mut current = self.tree.root();
        while let Some(child) = self.tree.find_child_containing(current, offset) {
            current = child;
        }
        current
    }

    /// Symbol item and origin at `offset`
    pub fn find_lexical_context(&self, offset: usize) -> LexicalContext<'_> {
        let chain = self.tree.path_to(offset);

        let mut scope = None;
        let mut ancestor_tail = None;
        for &id in chain.iter().rev() {
            let node = self.tree.node(id);
            if scope.is_none() {
                scope = node.find_lexical_scope(offset);
            }
            if ancestor_tail.is_none() {
                ancestor_tail = node.tail_origin();
            }
            if scope.is_some() && ancestor_tail.is_some() {
                break;
            }
        }

        let item = scope
            .and_then(|scope| scope.find_nearest_item(offset))
            .copied()
            .or_else(|| {
                offset
                    .checked_sub(1)
                    .and_then(|before| item_covering(&self.lexical_items, before))
                    .copied()
            });

        let deepest_tail = chain
            .last()
            .and_then(|&id| self.tree.node(id).tail_origin());
        let origin = item
            .and_then(|item| self.symbols.entry(item.entry).origin())
            .or(deepest_tail)
            .or(ancestor_tail)
            .or_else(|| scope.and_then(|scope| scope.origin()));

        LexicalContext { offset, item, origin }
    }

    /// Symbol entry of a lexical item
    pub fn entry(&self, item: &LexicalItem) -> &SymbolEntry {
        self.symbols.entry(item.entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_syntax::TextRange;
    use sqlmodel_test_utils::syntax_tree;

    use crate::symbol::SymbolClass;

    fn select_a_from_t() -> QueryModel {
        let sql = "SELECT a FROM t";
        let syntax = syntax_tree(sql, |b| {
            b.node(SyntaxKind::Select, |b| {
                b.keyword("SELECT");
                b.node(SyntaxKind::SelectList, |b| {
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["a"]));
                });
                b.node(SyntaxKind::FromClause, |b| {
                    b.keyword("FROM");
                    b.table_ref(&["t"], None);
                });
            });
        });
        QueryModel::build(syntax, Dialect::PostgreSQL).unwrap()
    }

    #[test]
    fn test_build_collects_symbols_in_text_order() {
        let model = select_a_from_t();
        let names: Vec<_> = model.all_symbols().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, vec!["a", "t"]);
        assert_eq!(model.state(), ResolutionState::Constructed);
        assert!(matches!(model.content(), Some(ModelContent::Query(_))));
    }

    #[test]
    fn test_find_node_containing_descends_to_leaf() {
        let model = select_a_from_t();
        let leaf = model.find_node_containing(7);
        assert_eq!(model.tree().kind(leaf), SyntaxKind::ColumnReference);
        // between clauses
        assert_eq!(model.find_node_containing(8), model.root());
        // outside the statement
        assert_eq!(model.find_node_containing(100), model.root());
    }

    #[test]
    fn test_nodes_of_kind_is_deepest_first() {
        let model = select_a_from_t();
        let kinds: Vec<_> = model
            .nodes_of_kind(&[SyntaxKind::Select, SyntaxKind::TableReference])
            .map(|n| model.tree().kind(n))
            .collect();
        assert_eq!(kinds, vec![SyntaxKind::TableReference, SyntaxKind::Select]);
    }

    #[test]
    fn test_lexical_context_before_resolution() {
        let model = select_a_from_t();
        let context = model.find_lexical_context(8);
        assert_eq!(context.offset, 8);
        let item = context.item.unwrap();
        assert_eq!(model.entry(&item).name(), "a");
        assert_eq!(item.range, TextRange::new(7, 8));
        assert!(context.origin.is_none());
        assert_eq!(model.entry(&item).class(), SymbolClass::Unknown);
    }
}
