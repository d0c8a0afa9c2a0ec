// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # SQL Model - Semantic Layer
//!
//! Binds every identifier of a parsed SQL statement to a catalog object, a
//! column of some rows context, or an explicit unresolved classification,
//! and answers position-based questions about the result.
//!
//! ## Overview
//!
//! ```text
//! SyntaxTree ──build──> QueryModel ──resolve_relations──> resolved QueryModel
//!                        │  NodeTree (arena)                  │
//!                        │  SymbolTable                       ├─ find_node_containing(offset)
//!                        │  LexicalScopes                     └─ find_lexical_context(offset)
//!                        └─ ModelContent (query, DDL, DML, command)
//! ```
//!
//! - [`QueryModel::build`] turns a syntax tree into the node arena, the
//!   symbol entries and the lexical scopes of the statement
//! - [`QueryModel::resolve_relations`] resolves table names through the
//!   [`NameResolver`], computes the rows contexts each construct sees and
//!   binds column references against them. Problems are reported on the
//!   [`RecognitionContext`]; nothing here fails an editing session
//! - lookups are read-only and can run concurrently on a resolved model
//!
//! Catalog access goes through the traits of `sqlmodel-catalog`, so the
//! same code runs against a live database or an in-memory catalog.

pub(crate) mod builder;
pub mod config;
pub mod content;
pub mod ddl;
pub mod error;
pub mod model;
pub mod name_resolver;
pub mod node;
pub mod recognition;
pub mod rows;
pub mod scope;
pub mod symbol;
pub mod traversal;

pub use config::RecognitionConfig;
pub use content::{CommandModel, DeleteModel, InsertModel, ModelContent, QueryContent, UpdateModel};
pub use ddl::{
    AlterActionKind, AlterTableActionSpec, AlterTableModel, ColumnConstraintSpec, ColumnSpec, ConstraintKind,
    CreateTableModel, ObjectDropModel, ReferenceSpec,
};
pub use error::{SemanticError, SemanticResult};
pub use model::{LexicalContext, QueryModel, ResolutionState};
pub use name_resolver::{LookupOptions, NameResolver, ResolutionStrategy};
pub use node::{ModelNode, NodeId, NodeTree};
pub use recognition::{Diagnostic, RecognitionContext, Severity};
pub use rows::{ColumnResolution, ResultColumn, RowsDataContext, RowsSource, RowsSourceContext};
pub use scope::{LexicalItem, LexicalScope};
pub use symbol::{Symbol, SymbolClass, SymbolDefinition, SymbolEntry, SymbolEntryId, SymbolTable, SymbolsOrigin};
