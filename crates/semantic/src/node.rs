// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Node Model
//!
//! The query model is a tree of [`ModelNode`]s stored in one arena
//! ([`NodeTree`]) per parsed statement. A node covers a text interval,
//! points back at its syntax node and keeps its children sorted by start
//! offset, so descending to the node at a cursor is a binary search per
//! level.
//!
//! Topology is fixed once the builder finishes. Two fields are filled in
//! later, during the single resolution pass: scope origins and the node's
//! tail origin. Both are write-once.

use std::sync::OnceLock;

use sqlmodel_syntax::{SyntaxKind, SyntaxNodeId, TextRange};

use crate::error::{SemanticError, SemanticResult};
use crate::scope::LexicalScope;
use crate::symbol::{SymbolEntryId, SymbolsOrigin};

/// Index of a node in its [`NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub struct ModelNode {
    id: NodeId,
    kind: SyntaxKind,
    range: TextRange,
    syntax: SyntaxNodeId,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    identifiers: Vec<SymbolEntryId>,
    alias: Option<SymbolEntryId>,
    scopes: Vec<LexicalScope>,
    tail_origin: OnceLock<SymbolsOrigin>,
}

impl ModelNode {
    fn new(id: NodeId, kind: SyntaxKind, range: TextRange, syntax: SyntaxNodeId) -> Self {
        Self {
            id,
            kind,
            range,
            syntax,
            parent: None,
            children: Vec::new(),
            identifiers: Vec::new(),
            alias: None,
            scopes: Vec::new(),
            tail_origin: OnceLock::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    pub fn region(&self) -> TextRange {
        self.range
    }

    pub fn syntax_node(&self) -> SyntaxNodeId {
        self.syntax
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in text order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Identifier parts written directly in this node, e.g. a dotted name
    pub fn identifiers(&self) -> &[SymbolEntryId] {
        &self.identifiers
    }

    pub fn alias(&self) -> Option<SymbolEntryId> {
        self.alias
    }

    pub fn scopes(&self) -> &[LexicalScope] {
        &self.scopes
    }

    /// First owned scope covering `offset`
    pub fn find_lexical_scope(&self, offset: usize) -> Option<&LexicalScope> {
        self.scopes.iter().find(|scope| scope.covers(offset))
    }

    pub fn tail_origin(&self) -> Option<&SymbolsOrigin> {
        self.tail_origin.get()
    }

    /// Set the origin that applies just past this node; it can be set only once
    pub fn set_tail_origin(&self, origin: SymbolsOrigin) -> SemanticResult<()> {
        self.tail_origin
            .set(origin)
            .map_err(|_| SemanticError::TailOriginAlreadySet(self.range))
    }
}

/// Arena holding every node of one statement
#[derive(Debug)]
pub struct NodeTree {
    nodes: Vec<ModelNode>,
}

impl NodeTree {
    pub(crate) fn new(kind: SyntaxKind, range: TextRange, syntax: SyntaxNodeId) -> Self {
        Self {
            nodes: vec![ModelNode::new(NodeId(0), kind, range, syntax)],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &ModelNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn region(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelNode> {
        self.nodes.iter()
    }

    pub fn child_of_kind(&self, id: NodeId, kind: SyntaxKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    pub fn children_of_kind(&self, id: NodeId, kind: SyntaxKind) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    /// Attach a new child, keeping siblings sorted by start offset
    pub(crate) fn add_child(
        &mut self,
        parent: NodeId,
        kind: SyntaxKind,
        range: TextRange,
        syntax: SyntaxNodeId,
    ) -> SemanticResult<NodeId> {
        let parent_range = self.region(parent);
        if !parent_range.contains_range(range) {
            return Err(SemanticError::InvalidRange {
                range,
                parent: parent_range,
            });
        }
        let siblings = &self.nodes[parent.index()].children;
        let pos = siblings.partition_point(|&s| self.nodes[s.index()].range.start <= range.start);
        for &neighbor in siblings[pos.saturating_sub(1)..].iter().take(2) {
            let sibling = self.nodes[neighbor.index()].range;
            if sibling.intersects(range) {
                return Err(SemanticError::OverlappingChildren { range, sibling });
            }
        }

        let id = NodeId(self.nodes.len() as u32);
        let mut node = ModelNode::new(id, kind, range, syntax);
        node.parent = Some(parent);
        self.nodes.push(node);
        self.nodes[parent.index()].children.insert(pos, id);
        Ok(id)
    }

    pub(crate) fn push_identifier(&mut self, node: NodeId, entry: SymbolEntryId) {
        self.nodes[node.index()].identifiers.push(entry);
    }

    pub(crate) fn set_alias(&mut self, node: NodeId, entry: SymbolEntryId) {
        self.nodes[node.index()].alias = Some(entry);
    }

    /// Append a scope to the node's scope list
    pub(crate) fn register_scope(&mut self, node: NodeId, scope: LexicalScope) {
        self.nodes[node.index()].scopes.push(scope);
    }

    /// Set the origin of the node's first scope, if it has one
    pub(crate) fn set_scope_origin(&self, node: NodeId, origin: SymbolsOrigin) {
        if let Some(scope) = self.node(node).scopes.first() {
            scope.set_origin(origin);
        }
    }

    /// Direct child whose interval contains `offset`
    pub fn find_child_containing(&self, parent: NodeId, offset: usize) -> Option<NodeId> {
        let children = self.children(parent);
        match children {
            [] => None,
            [only] => self.region(*only).contains(offset).then_some(*only),
            _ => {
                let idx = children.partition_point(|&c| self.region(c).start <= offset);
                idx.checked_sub(1)
                    .map(|i| children[i])
                    .filter(|&c| self.region(c).contains(offset))
            }
        }
    }

    /// Direct child whose interval contains `offset` or ends exactly at it
    pub fn find_child_touching(&self, parent: NodeId, offset: usize) -> Option<NodeId> {
        let children = self.children(parent);
        let idx = children.partition_point(|&c| self.region(c).start <= offset);
        idx.checked_sub(1)
            .map(|i| children[i])
            .filter(|&c| self.region(c).touches(offset))
    }

    /// Nodes from the root down to the deepest node containing `offset`
    pub fn path_to(&self, offset: usize) -> Vec<NodeId> {
        let mut path = vec![self.root()];
        let mut current = self.root();
        while let Some(child) = self.find_child_containing(current, offset) {
            path.push(child);
            current = child;
        }
        path
    }

    /// Nearest ancestor (self included) of one of the given kinds
    pub fn ancestor_of_kind(&self, id: NodeId, kinds: &[SyntaxKind]) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if kinds.contains(&self.kind(node)) {
                return Some(node);
            }
            current = self.node(node).parent;
        }
        None
    }
}
