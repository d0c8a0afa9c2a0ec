// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Syntax Tree
//!
//! An arena of syntax nodes produced by a parser for one SQL statement.
//!
//! ## Design
//!
//! Nodes are stored in a flat vector and addressed by [`SyntaxNodeId`].
//! Tokens are leaves whose text is the source slice of their range; inner
//! nodes cover their children. The tree is immutable once built and is
//! shared read-only with the query model, which keeps a [`SyntaxNodeId`]
//! back-reference on every model node.
//!
//! ## Building
//!
//! ```
//! use sqlmodel_syntax::{SyntaxKind, SyntaxTreeBuilder, TextRange};
//!
//! let mut builder = SyntaxTreeBuilder::new("SELECT a");
//! builder.start_node(SyntaxKind::Select);
//! builder.token(SyntaxKind::Keyword, TextRange::new(0, 6));
//! builder.start_node(SyntaxKind::ColumnReference);
//! builder.token(SyntaxKind::Identifier, TextRange::new(7, 8));
//! builder.finish_node();
//! builder.finish_node();
//! let tree = builder.finish().unwrap();
//!
//! assert_eq!(tree.root().kind, SyntaxKind::Select);
//! assert_eq!(tree.root().range, TextRange::new(0, 8));
//! ```

use crate::range::TextRange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while assembling a syntax tree
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("finish_node called without a matching start_node")]
    UnbalancedFinish,

    #[error("{0} node(s) left open")]
    UnclosedNodes(usize),

    #[error("tree has no root node")]
    EmptyTree,

    #[error("range {range} is outside the source text of length {len}")]
    RangeOutOfBounds { range: TextRange, len: usize },

    #[error("tokens can only be added inside a node")]
    TokenOutsideNode,
}

/// Kind of a syntax node or token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntaxKind {
    // Query structure
    Query,
    WithClause,
    CteDefinition,
    SetOperation,
    Select,
    SelectList,
    SelectItem,
    Asterisk,
    Alias,
    FromClause,
    TableReference,
    DerivedTable,
    Join,
    JoinCondition,
    UsingClause,
    WhereClause,
    GroupByClause,
    HavingClause,
    OrderByClause,
    OrderByItem,

    // Values
    ColumnReference,
    QualifiedName,
    Literal,
    FunctionCall,
    BinaryExpression,
    UnaryExpression,
    ParenthesizedExpression,
    ExpressionList,
    CaseExpression,
    SubqueryExpression,
    ExistsExpression,

    // DDL
    CreateTable,
    ColumnDefinition,
    DataTypeName,
    ColumnConstraint,
    TableConstraint,
    ConstraintName,
    PrimaryKey,
    UniqueKey,
    NotNull,
    NullConstraint,
    DefaultValue,
    Check,
    ForeignKey,
    References,
    ColumnList,
    AlterTable,
    AlterTableAction,
    DropStatement,

    // DML
    Insert,
    ValuesClause,
    ValuesRow,
    Update,
    SetClause,
    Assignment,
    Delete,

    // Other statements
    Command,
    Error,

    // Tokens
    Identifier,
    QuotedIdentifier,
    Keyword,
    Operator,
    Punctuation,
    Text,
}

impl SyntaxKind {
    /// Leaf kinds whose text is taken from the source
    pub fn is_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::Identifier
                | SyntaxKind::QuotedIdentifier
                | SyntaxKind::Keyword
                | SyntaxKind::Operator
                | SyntaxKind::Punctuation
                | SyntaxKind::Text
        )
    }

    pub fn is_identifier(self) -> bool {
        matches!(self, SyntaxKind::Identifier | SyntaxKind::QuotedIdentifier)
    }

    /// Kinds that denote a value expression
    pub fn is_expression(self) -> bool {
        matches!(
            self,
            SyntaxKind::ColumnReference
                | SyntaxKind::Literal
                | SyntaxKind::FunctionCall
                | SyntaxKind::BinaryExpression
                | SyntaxKind::UnaryExpression
                | SyntaxKind::ParenthesizedExpression
                | SyntaxKind::ExpressionList
                | SyntaxKind::CaseExpression
                | SyntaxKind::SubqueryExpression
                | SyntaxKind::ExistsExpression
        )
    }
}

/// Index of a node inside its [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SyntaxNodeId(pub u32);

impl SyntaxNodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node or token of the syntax tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub range: TextRange,
    pub children: Vec<SyntaxNodeId>,
}

/// Immutable syntax tree of one statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
    root: SyntaxNodeId,
}

impl SyntaxTree {
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root_id(&self) -> SyntaxNodeId {
        self.root
    }

    pub fn root(&self) -> &SyntaxNode {
        self.node(self.root)
    }

    pub fn node(&self, id: SyntaxNodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: SyntaxNodeId) -> SyntaxKind {
        self.node(id).kind
    }

    pub fn range(&self, id: SyntaxNodeId) -> TextRange {
        self.node(id).range
    }

    pub fn children(&self, id: SyntaxNodeId) -> &[SyntaxNodeId] {
        &self.node(id).children
    }

    /// Source text covered by the node
    pub fn text(&self, id: SyntaxNodeId) -> &str {
        let range = self.range(id);
        &self.source[range.start..range.end]
    }

    /// First direct child of the given kind
    pub fn child_of_kind(&self, id: SyntaxNodeId, kind: SyntaxKind) -> Option<SyntaxNodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    /// All direct children of the given kind
    pub fn children_of_kind(
        &self,
        id: SyntaxNodeId,
        kind: SyntaxKind,
    ) -> impl Iterator<Item = SyntaxNodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(move |&child| self.kind(child) == kind)
    }

    /// Upper-cased texts of the direct keyword children, in order
    pub fn keywords(&self, id: SyntaxNodeId) -> Vec<String> {
        self.children_of_kind(id, SyntaxKind::Keyword)
            .map(|kw| self.text(kw).to_ascii_uppercase())
            .collect()
    }

    pub fn has_keyword(&self, id: SyntaxNodeId, keyword: &str) -> bool {
        self.children_of_kind(id, SyntaxKind::Keyword)
            .any(|kw| self.text(kw).eq_ignore_ascii_case(keyword))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct OpenNode {
    kind: SyntaxKind,
    children: Vec<SyntaxNodeId>,
}

/// Incremental builder mirroring a parser's enter/leave events
pub struct SyntaxTreeBuilder {
    source: String,
    nodes: Vec<SyntaxNode>,
    open: Vec<OpenNode>,
    root: Option<SyntaxNodeId>,
    error: Option<SyntaxError>,
}

impl SyntaxTreeBuilder {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            open: Vec::new(),
            root: None,
            error: None,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Open an inner node; its range is computed from its children when finished
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.open.push(OpenNode {
            kind,
            children: Vec::new(),
        });
    }

    /// Add a leaf token to the innermost open node
    pub fn token(&mut self, kind: SyntaxKind, range: TextRange) -> SyntaxNodeId {
        let id = self.push(SyntaxNode {
            kind,
            range,
            children: Vec::new(),
        });
        if range.end > self.source.len() {
            self.record(SyntaxError::RangeOutOfBounds {
                range,
                len: self.source.len(),
            });
        }
        match self.open.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.record(SyntaxError::TokenOutsideNode),
        }
        id
    }

    /// Close the innermost open node
    pub fn finish_node(&mut self) -> Option<SyntaxNodeId> {
        let Some(open) = self.open.pop() else {
            self.record(SyntaxError::UnbalancedFinish);
            return None;
        };
        let range = open
            .children
            .iter()
            .map(|&child| self.nodes[child.index()].range)
            .reduce(|acc, r| acc.cover(r))
            .unwrap_or_else(|| TextRange::empty(self.cursor()));
        let id = self.push(SyntaxNode {
            kind: open.kind,
            range,
            children: open.children,
        });
        match self.open.last_mut() {
            Some(parent) => parent.children.push(id),
            None => self.root = Some(id),
        }
        Some(id)
    }

    /// Complete the tree; the root node is widened to cover the whole source
    pub fn finish(mut self) -> Result<SyntaxTree, SyntaxError> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        if !self.open.is_empty() {
            return Err(SyntaxError::UnclosedNodes(self.open.len()));
        }
        let root = self.root.ok_or(SyntaxError::EmptyTree)?;
        self.nodes[root.index()].range = TextRange::new(0, self.source.len());
        Ok(SyntaxTree {
            source: self.source,
            nodes: self.nodes,
            root,
        })
    }

    fn cursor(&self) -> usize {
        self.nodes.last().map(|n| n.range.end).unwrap_or(0)
    }

    fn push(&mut self, node: SyntaxNode) -> SyntaxNodeId {
        let id = SyntaxNodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    fn record(&mut self, error: SyntaxError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
