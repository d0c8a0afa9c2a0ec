// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Shared helpers for the semantic integration tests

#![allow(dead_code)]

use std::sync::Arc;

use sqlmodel_catalog::{DefaultProgressMonitor, StaticCatalog};
use sqlmodel_semantic::{
    Diagnostic, QueryModel, RecognitionConfig, RecognitionContext, RowsSourceContext, SymbolClass,
    SymbolEntry,
};
use sqlmodel_syntax::{Dialect, SyntaxTree};
use sqlmodel_test_utils::{init_tracing, standard_catalog};

/// A resolved statement together with what resolution reported
pub struct Resolved {
    pub model: QueryModel,
    pub diagnostics: Vec<Diagnostic>,
}

impl Resolved {
    /// The `nth` entry (0-based) spelled `name`
    pub fn nth(&self, name: &str, nth: usize) -> &SymbolEntry {
        self.model
            .all_symbols()
            .iter()
            .filter(|e| e.raw_name() == name)
            .nth(nth)
            .unwrap_or_else(|| panic!("no occurrence #{nth} of `{name}`"))
    }

    pub fn entry(&self, name: &str) -> &SymbolEntry {
        self.nth(name, 0)
    }

    pub fn class(&self, name: &str) -> SymbolClass {
        self.entry(name).class()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

/// Resolve against the standard test catalog
pub async fn resolve(syntax: Arc<SyntaxTree>) -> Resolved {
    resolve_with(syntax, &standard_catalog()).await
}

pub async fn resolve_with(syntax: Arc<SyntaxTree>, catalog: &StaticCatalog) -> Resolved {
    let sources = RowsSourceContext::new(catalog.execution_context());
    resolve_in(syntax, &sources, DefaultProgressMonitor::new()).await
}

pub async fn resolve_in(
    syntax: Arc<SyntaxTree>,
    sources: &RowsSourceContext,
    monitor: DefaultProgressMonitor,
) -> Resolved {
    init_tracing();
    let mut model = QueryModel::build(syntax, Dialect::PostgreSQL).expect("model builds");
    let mut recognition = RecognitionContext::new(Arc::new(monitor), RecognitionConfig::default());
    model.resolve_relations(sources, &mut recognition).await;
    Resolved {
        model,
        diagnostics: recognition.take_diagnostics(),
    }
}
