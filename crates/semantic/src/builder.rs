// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Model Builder
//!
//! Turns a [`SyntaxTree`] into the node arena, the symbol table and the
//! lexical scopes of a statement.
//!
//! The syntax tree is walked pre-order with an explicit stack. Each syntax
//! node lands in one of three places:
//!
//! - a new model node (most inner nodes)
//! - its parent model node: `QualifiedName` and `ConstraintName` contribute
//!   their identifier parts to the enclosing node, and `Alias` sets its
//!   alias
//! - nowhere: `Error` subtrees, punctuation and the tokens of a data type
//!
//! Identifier tokens become [`SymbolEntry`](crate::symbol::SymbolEntry)s in
//! text order. Once the tree is complete, scope-owning nodes register a
//! [`LexicalScope`] holding the entries written in their subtree.

use sqlmodel_syntax::{Dialect, SyntaxKind, SyntaxNodeId, SyntaxTree};
use tracing::debug;

use crate::error::SemanticResult;
use crate::node::{NodeId, NodeTree};
use crate::scope::{LexicalItem, LexicalScope};
use crate::symbol::SymbolTable;

/// Everything construction produces for one statement
pub(crate) struct ModelParts {
    pub tree: NodeTree,
    pub symbols: SymbolTable,
    pub lexical_items: Vec<LexicalItem>,
}

#[derive(Clone, Copy)]
enum Slot {
    Node(NodeId),
    Alias(NodeId),
    Skip,
}

/// Kinds whose subtree forms a scope of its own
const SCOPE_KINDS: &[SyntaxKind] = &[
    SyntaxKind::SelectList,
    SyntaxKind::FromClause,
    SyntaxKind::WhereClause,
    SyntaxKind::GroupByClause,
    SyntaxKind::HavingClause,
    SyntaxKind::OrderByClause,
    SyntaxKind::JoinCondition,
    SyntaxKind::SetClause,
    SyntaxKind::ColumnConstraint,
    SyntaxKind::TableConstraint,
    SyntaxKind::AlterTableAction,
    SyntaxKind::DropStatement,
];

/// Scopes stop at nested query units, which own their scopes
const QUERY_UNITS: &[SyntaxKind] = &[SyntaxKind::Query, SyntaxKind::Select, SyntaxKind::SetOperation];

pub(crate) fn build_model(syntax: &SyntaxTree, dialect: Dialect) -> SemanticResult<ModelParts> {
    let root = syntax.root();
    let mut tree = NodeTree::new(root.kind, root.range, syntax.root_id());
    let mut symbols = SymbolTable::new();

    let mut stack: Vec<(SyntaxNodeId, Slot)> = Vec::new();
    if root.kind != SyntaxKind::Error {
        push_children(&mut stack, syntax, syntax.root_id(), Slot::Node(tree.root()));
    }

    while let Some((id, slot)) = stack.pop() {
        let kind = syntax.kind(id);
        if matches!(slot, Slot::Skip) || kind == SyntaxKind::Error {
            continue;
        }

        if kind.is_identifier() {
            let raw = syntax.text(id);
            let quoted = kind == SyntaxKind::QuotedIdentifier || dialect.is_quoted(raw);
            let entry = symbols.add(raw, dialect.normalize_identifier(raw), syntax.range(id), quoted);
            match slot {
                Slot::Node(node) => tree.push_identifier(node, entry),
                Slot::Alias(node) => tree.set_alias(node, entry),
                Slot::Skip => {}
            }
            continue;
        }
        if kind.is_token() {
            continue;
        }

        let next = match slot {
            Slot::Alias(node) => Slot::Alias(node),
            Slot::Node(parent) => match kind {
                SyntaxKind::Alias => Slot::Alias(parent),
                SyntaxKind::ConstraintName => Slot::Node(parent),
                SyntaxKind::QualifiedName if tree.kind(parent) != SyntaxKind::DropStatement => {
                    Slot::Node(parent)
                }
                _ => {
                    let node = tree.add_child(parent, kind, syntax.range(id), id)?;
                    if kind == SyntaxKind::DataTypeName {
                        Slot::Skip
                    } else {
                        Slot::Node(node)
                    }
                }
            },
            Slot::Skip => Slot::Skip,
        };
        push_children(&mut stack, syntax, id, next);
    }

    register_scopes(&mut tree, &symbols);

    let lexical_items = symbols
        .entries()
        .iter()
        .map(|entry| LexicalItem {
            range: entry.range(),
            entry: entry.id(),
        })
        .collect();

    debug!(
        nodes = tree.len(),
        symbols = symbols.len(),
        "Model tree constructed"
    );
    Ok(ModelParts {
        tree,
        symbols,
        lexical_items,
    })
}

fn push_children(stack: &mut Vec<(SyntaxNodeId, Slot)>, syntax: &SyntaxTree, id: SyntaxNodeId, slot: Slot) {
    for &child in syntax.children(id).iter().rev() {
        stack.push((child, slot));
    }
}

fn owns_scope(tree: &NodeTree, node: NodeId) -> bool {
    let kind = tree.kind(node);
    if SCOPE_KINDS.contains(&kind) {
        return true;
    }
    // the target column list of an INSERT
    kind == SyntaxKind::ColumnList
        && tree
            .node(node)
            .parent()
            .is_some_and(|parent| tree.kind(parent) == SyntaxKind::Insert)
}

fn register_scopes(tree: &mut NodeTree, symbols: &SymbolTable) {
    let owners: Vec<NodeId> = tree
        .iter()
        .map(|node| node.id())
        .filter(|&id| owns_scope(tree, id))
        .collect();

    for owner in owners {
        let items = scope_items(tree, symbols, owner);
        let scope = LexicalScope::new(tree.region(owner), items);
        tree.register_scope(owner, scope);
    }
}

fn scope_items(tree: &NodeTree, symbols: &SymbolTable, owner: NodeId) -> Vec<LexicalItem> {
    let mut items = Vec::new();
    let mut stack = vec![owner];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        for &entry in node.identifiers().iter().chain(node.alias().iter()) {
            items.push(LexicalItem {
                range: symbols.entry(entry).range(),
                entry,
            });
        }
        stack.extend(
            node.children()
                .iter()
                .copied()
                .filter(|&child| !QUERY_UNITS.contains(&tree.kind(child))),
        );
    }
    items
}
