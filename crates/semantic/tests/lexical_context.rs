// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Offset lookups on resolved models, cancellation and repeatability

mod common;

use std::sync::Arc;

use common::{resolve, resolve_in, resolve_with};
use sqlmodel_catalog::{DefaultProgressMonitor, ObjectKind};
use sqlmodel_semantic::{ResolutionState, RowsSourceContext, SymbolClass, SymbolsOrigin};
use sqlmodel_syntax::{SyntaxKind, SyntaxTree};
use sqlmodel_test_utils::{standard_catalog, syntax_tree};

/// `SELECT a FROM t`, with a WHERE clause holding `where_clause` when given
fn select_from_t(sql: &str, where_clause: Option<&[&str]>) -> Arc<SyntaxTree> {
    syntax_tree(sql, |b| {
        b.node(SyntaxKind::Select, |b| {
            b.keyword("SELECT");
            b.node(SyntaxKind::SelectList, |b| {
                b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["a"]));
            });
            b.node(SyntaxKind::FromClause, |b| {
                b.keyword("FROM");
                b.table_ref(&["t"], None);
            });
            if let Some(condition) = where_clause {
                b.node(SyntaxKind::WhereClause, |b| {
                    b.keyword("WHERE");
                    if !condition.is_empty() {
                        b.column_ref(condition);
                    }
                });
            }
        });
    })
}

fn column_names(origin: Option<&SymbolsOrigin>) -> Vec<String> {
    origin
        .and_then(SymbolsOrigin::rows)
        .map(|rows| rows.columns().iter().map(|c| c.name.clone()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_statement_tail_offers_source_columns() {
    let resolved = resolve(select_from_t("SELECT a FROM t ", None)).await;
    let context = resolved.model.find_lexical_context(16);

    assert!(context.item.is_none());
    assert!(matches!(
        context.origin,
        Some(SymbolsOrigin::ColumnNameFromRowsData(_))
    ));
    assert_eq!(column_names(context.origin), vec!["a", "b"]);
}

#[tokio::test]
async fn test_cursor_right_after_table_name() {
    let resolved = resolve(select_from_t("SELECT a FROM t", None)).await;
    let context = resolved.model.find_lexical_context(15);

    let item = context.item.expect("item before the cursor");
    assert_eq!(resolved.model.entry(&item).name(), "t");
    assert!(matches!(
        context.origin,
        Some(SymbolsOrigin::DbObjectFromContext { kinds, .. })
            if kinds == &[ObjectKind::Table, ObjectKind::View]
    ));
}

#[tokio::test]
async fn test_empty_where_clause_offers_source_columns() {
    let sql = "SELECT a FROM t WHERE ";
    let resolved = resolve(select_from_t(sql, Some(&[]))).await;
    let context = resolved.model.find_lexical_context(sql.len());

    assert!(context.item.is_none());
    assert_eq!(column_names(context.origin), vec!["a", "b"]);
}

#[tokio::test]
async fn test_partial_name_in_where_clause() {
    let sql = "SELECT a FROM t WHERE b";
    let resolved = resolve(select_from_t(sql, Some(&["b"]))).await;

    // inside the name and right after it
    for offset in [22, 23] {
        let context = resolved.model.find_lexical_context(offset);
        let item = context.item.expect("name under the cursor");
        assert_eq!(resolved.model.entry(&item).name(), "b");
        assert_eq!(resolved.model.entry(&item).class(), SymbolClass::Column);
        assert_eq!(column_names(context.origin), vec!["a", "b"]);
    }
}

#[tokio::test]
async fn test_lookups_are_consistent_for_every_offset() {
    let sql = "SELECT abc FROM t";
    let syntax = syntax_tree(sql, |b| {
        b.node(SyntaxKind::Select, |b| {
            b.keyword("SELECT");
            b.node(SyntaxKind::SelectList, |b| {
                b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["abc"]));
            });
            b.node(SyntaxKind::FromClause, |b| {
                b.keyword("FROM");
                b.table_ref(&["t"], None);
            });
        });
    });
    let resolved = resolve(syntax).await;
    let model = &resolved.model;

    for offset in 7..10 {
        assert_eq!(
            model.tree().kind(model.find_node_containing(offset)),
            SyntaxKind::ColumnReference
        );
    }
    assert_eq!(model.find_node_containing(10), model.root());

    for offset in 0..=sql.len() + 2 {
        let node = model.find_node_containing(offset);
        assert!(node == model.root() || model.tree().region(node).contains(offset));

        let context = model.find_lexical_context(offset);
        if let Some(item) = context.item {
            assert!(item.range.touches(offset), "item {:?} at {offset}", item.range);
        }
    }
}

#[tokio::test]
async fn test_create_table_end_takes_last_scope_origin() {
    let sql = "CREATE TABLE c (x INT REFERENCES customers)";
    let syntax = syntax_tree(sql, |b| {
        b.node(SyntaxKind::CreateTable, |b| {
            b.keyword("CREATE");
            b.keyword("TABLE");
            b.ident("c");
            b.punct("(");
            b.node(SyntaxKind::ColumnDefinition, |b| {
                b.ident("x");
                b.node(SyntaxKind::DataTypeName, |b| b.keyword("INT"));
                b.node(SyntaxKind::ColumnConstraint, |b| {
                    b.node(SyntaxKind::References, |b| {
                        b.keyword("REFERENCES");
                        b.ident("customers");
                    });
                });
            });
            b.punct(")");
        });
    });
    let resolved = resolve(syntax).await;
    let model = &resolved.model;

    assert!(model.tree().node(model.root()).tail_origin().is_some());
    let context = model.find_lexical_context(sql.len());
    assert!(context.item.is_none());
    assert_eq!(column_names(context.origin), vec!["x"]);
}

#[tokio::test]
async fn test_drop_tail_offers_objects_of_the_dropped_kind() {
    let sql = "DROP TABLE ";
    let syntax = syntax_tree(sql, |b| {
        b.node(SyntaxKind::DropStatement, |b| {
            b.keyword("DROP");
            b.keyword("TABLE");
        });
    });
    let resolved = resolve(syntax).await;
    let context = resolved.model.find_lexical_context(sql.len());

    assert!(matches!(
        context.origin,
        Some(SymbolsOrigin::DbObjectFromContext { kinds, .. }) if kinds == &[ObjectKind::Table]
    ));
}

#[tokio::test]
async fn test_resolving_twice_keeps_classifications() {
    let sql = "SELECT o.total, nope FROM orders o";
    let build = || {
        syntax_tree(sql, |b| {
            b.node(SyntaxKind::Select, |b| {
                b.keyword("SELECT");
                b.node(SyntaxKind::SelectList, |b| {
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["o", "total"]));
                    b.punct(",");
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["nope"]));
                });
                b.node(SyntaxKind::FromClause, |b| {
                    b.keyword("FROM");
                    b.table_ref(&["orders"], Some("o"));
                });
            });
        })
    };
    let catalog = standard_catalog();
    let mut resolved = resolve_with(build(), &catalog).await;
    let first: Vec<SymbolClass> = resolved.model.all_symbols().iter().map(|e| e.class()).collect();
    assert!(first.contains(&SymbolClass::Error));

    let sources = RowsSourceContext::new(catalog.execution_context());
    let mut recognition = sqlmodel_semantic::RecognitionContext::new(
        Arc::new(DefaultProgressMonitor::new()),
        Default::default(),
    );
    resolved.model.resolve_relations(&sources, &mut recognition).await;
    let second: Vec<SymbolClass> = resolved.model.all_symbols().iter().map(|e| e.class()).collect();

    assert_eq!(first, second);
    assert_eq!(resolved.model.state(), ResolutionState::ValueRelationsResolved);
}

#[tokio::test]
async fn test_canceled_resolution_stops_after_objects() {
    let monitor = DefaultProgressMonitor::new();
    monitor.cancel();
    let sources = RowsSourceContext::new(standard_catalog().execution_context());
    let resolved = resolve_in(select_from_t("SELECT a FROM t", None), &sources, monitor).await;

    assert_eq!(resolved.model.state(), ResolutionState::ObjectsResolved);
    assert!(resolved.diagnostics.is_empty());
    assert!(
        resolved
            .model
            .all_symbols()
            .iter()
            .all(|e| e.class() == SymbolClass::Unknown)
    );
}

#[tokio::test]
async fn test_offline_resolution_reports_nothing() {
    let resolved = resolve_in(
        select_from_t("SELECT a FROM t", None),
        &RowsSourceContext::offline(),
        DefaultProgressMonitor::new(),
    )
    .await;

    assert!(resolved.diagnostics.is_empty());
    let table = resolved.entry("t");
    assert_eq!(table.class(), SymbolClass::Table);
    assert!(table.definition().is_none());
    assert_eq!(resolved.class("a"), SymbolClass::Column);
}
