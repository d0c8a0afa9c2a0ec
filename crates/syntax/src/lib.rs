// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Query Model - Syntax Layer
//!
//! This crate describes the syntax tree the query model is built from.
//! Producing the tree (tokenizing and parsing SQL text) happens elsewhere;
//! this crate only fixes its shape:
//!
//! - [`TextRange`]: half-open `[start, end)` byte offsets into the source
//! - [`SyntaxTree`]: an arena of [`SyntaxNode`]s over the source text
//! - [`SyntaxTreeBuilder`]: `start_node` / `token` / `finish_node` construction
//! - [`Dialect`]: identifier quoting and default-case rules

pub mod dialect;
pub mod range;
pub mod tree;

pub use dialect::{Dialect, DialectFamily, IdentifierCase};
pub use range::TextRange;
pub use tree::{
    SyntaxError, SyntaxKind, SyntaxNode, SyntaxNodeId, SyntaxTree, SyntaxTreeBuilder,
};
