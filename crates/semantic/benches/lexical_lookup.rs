// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Model performance benchmarks
//!
//! Measures:
//! - model construction from a syntax tree
//! - full name resolution against the test catalog
//! - offset lookups on a resolved model

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sqlmodel_catalog::DefaultProgressMonitor;
use sqlmodel_semantic::{QueryModel, RecognitionConfig, RecognitionContext, RowsSourceContext};
use sqlmodel_syntax::{Dialect, SyntaxKind, SyntaxTree};
use sqlmodel_test_utils::{standard_catalog, syntax_tree};

const WIDTHS: &[usize] = &[10, 100, 1000];

/// `SELECT a, b, a, ... FROM t WHERE a = b` with `width` select items
fn wide_select(width: usize) -> Arc<SyntaxTree> {
    let names: Vec<&str> = (0..width).map(|i| if i % 2 == 0 { "a" } else { "b" }).collect();
    let sql = format!("SELECT {} FROM t WHERE a = b", names.join(", "));
    syntax_tree(&sql, |b| {
        b.node(SyntaxKind::Select, |b| {
            b.keyword("SELECT");
            b.node(SyntaxKind::SelectList, |b| {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        b.punct(",");
                    }
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&[*name]));
                }
            });
            b.node(SyntaxKind::FromClause, |b| {
                b.keyword("FROM");
                b.table_ref(&["t"], None);
            });
            b.node(SyntaxKind::WhereClause, |b| {
                b.keyword("WHERE");
                b.node(SyntaxKind::BinaryExpression, |b| {
                    b.column_ref(&["a"]);
                    b.op("=");
                    b.column_ref(&["b"]);
                });
            });
        });
    })
}

fn resolved_model(runtime: &tokio::runtime::Runtime, syntax: Arc<SyntaxTree>) -> QueryModel {
    let catalog = standard_catalog();
    let sources = RowsSourceContext::new(catalog.execution_context());
    let mut model = QueryModel::build(syntax, Dialect::PostgreSQL).unwrap();
    let mut recognition = RecognitionContext::new(
        Arc::new(DefaultProgressMonitor::new()),
        RecognitionConfig::default(),
    );
    runtime.block_on(model.resolve_relations(&sources, &mut recognition));
    model
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("model/build");
    for &width in WIDTHS {
        let syntax = wide_select(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &syntax, |b, syntax| {
            b.iter(|| black_box(QueryModel::build(syntax.clone(), Dialect::PostgreSQL).unwrap()));
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("model/resolve_relations");
    for &width in WIDTHS {
        let syntax = wide_select(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &syntax, |b, syntax| {
            b.iter(|| black_box(resolved_model(&runtime, syntax.clone())));
        });
    }
    group.finish();
}

fn bench_lexical_context(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("model/find_lexical_context");
    for &width in WIDTHS {
        let model = resolved_model(&runtime, wide_select(width));
        let len = model.syntax().source().len();
        group.bench_with_input(BenchmarkId::from_parameter(width), &model, |b, model| {
            b.iter(|| {
                for offset in (0..=len).step_by(7) {
                    black_box(model.find_lexical_context(offset));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(50);
    targets = bench_build, bench_resolve, bench_lexical_context
);
criterion_main!(benches);
