// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Testing utilities for the SQL query model
//!
//! This crate provides common testing components including:
//! - A syntax tree builder anchored on the SQL text
//! - An in-memory catalog with a standard test schema
//! - Log output for tests

pub mod mock_catalog;
pub mod sql_tree;
pub mod logging;

// Re-exports for convenience
pub use mock_catalog::{MockCatalogBuilder, standard_catalog};
pub use sql_tree::{SqlTreeBuilder, syntax_tree};
pub use logging::init_tracing;
