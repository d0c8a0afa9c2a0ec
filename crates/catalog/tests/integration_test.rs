// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog crate

use std::sync::Arc;

use async_trait::async_trait;
use sqlmodel_catalog::{
    CatalogContainer, CatalogObject, CatalogResult, ColumnMetadata, DataSource, DataType,
    DefaultProgressMonitor, ObjectKind, ObjectRef, ProgressMonitor, StaticCatalog, StructureScope,
    TableMetadata, TableType, same_object,
};
use sqlmodel_syntax::Dialect;

// Minimal hand-written catalog object for exercising trait defaults
#[derive(Debug)]
struct TestSchema {
    name: String,
    parent: Option<ObjectRef>,
}

impl CatalogObject for TestSchema {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ObjectKind {
        ObjectKind::Schema
    }

    fn parent(&self) -> Option<ObjectRef> {
        self.parent.clone()
    }

    fn as_container(&self) -> Option<&dyn CatalogContainer> {
        Some(self)
    }
}

#[async_trait]
impl CatalogContainer for TestSchema {
    async fn get_child(
        &self,
        _monitor: &dyn ProgressMonitor,
        _name: &str,
    ) -> CatalogResult<Option<ObjectRef>> {
        Ok(None)
    }

    async fn children(&self, _monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ObjectRef>> {
        Ok(Vec::new())
    }

    async fn cache_structure(
        &self,
        _monitor: &dyn ProgressMonitor,
        _scope: StructureScope,
    ) -> CatalogResult<()> {
        Ok(())
    }

    fn data_source(&self) -> Option<Arc<dyn DataSource>> {
        None
    }
}

fn shop_catalog() -> StaticCatalog {
    StaticCatalog::builder("shop-db", Dialect::MySQL)
        .with_table(
            "shop",
            TableMetadata::new("users").with_columns(vec![
                ColumnMetadata::new("id", DataType::BigInt).with_primary_key(),
                ColumnMetadata::new("email", DataType::Varchar(Some(255))).with_nullable(false),
            ]),
        )
        .with_table(
            "shop",
            TableMetadata::new("active_users")
                .with_type(TableType::View)
                .with_column(ColumnMetadata::new("id", DataType::BigInt)),
        )
        .with_sequence("shop", "order_seq")
        .with_function("shop", "total_spent")
        .with_default_schema("shop")
        .build()
}

#[tokio::test]
async fn test_default_trait_methods() {
    let parent: ObjectRef = Arc::new(TestSchema {
        name: "analytics".to_string(),
        parent: None,
    });
    let child = TestSchema {
        name: "staging".to_string(),
        parent: Some(parent.clone()),
    };

    assert_eq!(child.qualified_name(), "analytics.staging");
    assert!(child.is_connected());
    assert!(child.as_table().is_none());

    let container = child.as_container().unwrap();
    assert!(!container.is_procedure_container());
    let monitor = DefaultProgressMonitor::new();
    assert!(container.procedures(&monitor).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mysql_style_catalog_without_catalog_level() {
    let catalog = shop_catalog();
    let monitor = DefaultProgressMonitor::new();

    let shop = catalog.object("shop").unwrap();
    assert_eq!(shop.kind(), ObjectKind::Schema);

    let view = shop
        .as_container()
        .unwrap()
        .get_child(&monitor, "active_users")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(view.kind(), ObjectKind::View);
    assert_eq!(view.qualified_name(), "shop.active_users");
    assert!(view.as_table().unwrap().primary_key(&monitor).await.unwrap().is_none());
}

#[tokio::test]
async fn test_objects_know_their_data_source() {
    let catalog = shop_catalog();
    let seq = catalog.object("shop.order_seq").unwrap();
    assert_eq!(seq.kind(), ObjectKind::Sequence);

    let shop = seq.parent().unwrap();
    let source = shop.as_container().unwrap().data_source().unwrap();
    assert_eq!(source.name(), "shop-db");
    assert_eq!(source.dialect(), Dialect::MySQL);
    assert!(same_object(&source.root(), &catalog.root()));
}

#[test]
fn test_same_object_compares_identity() {
    let catalog = shop_catalog();
    let a = catalog.object("shop.users").unwrap();
    let b = catalog.object("shop.users").unwrap();
    let c = catalog.object("shop.active_users").unwrap();
    assert!(same_object(&a, &b));
    assert!(!same_object(&a, &c));
}

#[test]
fn test_metadata_json_round_trip() {
    let table = TableMetadata::new("users")
        .with_column(ColumnMetadata::new("id", DataType::BigInt).with_primary_key())
        .with_comment("accounts");
    let json = serde_json::to_string(&table).unwrap();
    let back: TableMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(back, table);
}
