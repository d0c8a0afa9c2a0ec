// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! In-memory catalogs for tests
//!
//! Every table lives in the `app.public` schema unless a path is given;
//! `app` and `app.public` are the default catalog and schema.

use sqlmodel_catalog::{
    CatalogError, ColumnMetadata, DataType, StaticCatalog, StaticCatalogBuilder, TableMetadata,
};
use sqlmodel_syntax::Dialect;

/// Default schema of mock catalogs
pub const DEFAULT_SCHEMA: &str = "app.public";

/// Builder for mock catalogs with a fluent API
pub struct MockCatalogBuilder {
    inner: StaticCatalogBuilder,
}

impl Default for MockCatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalogBuilder {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::PostgreSQL)
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            inner: StaticCatalog::builder("mock", dialect)
                .with_schema(DEFAULT_SCHEMA)
                .with_default_catalog("app")
                .with_default_schema(DEFAULT_SCHEMA),
        }
    }

    /// Add a table with the given columns to the default schema
    pub fn with_table(self, name: &str, columns: &[(&str, DataType)]) -> Self {
        let columns = columns
            .iter()
            .map(|(column, data_type)| ColumnMetadata::new(*column, data_type.clone()))
            .collect();
        self.with_table_metadata(DEFAULT_SCHEMA, TableMetadata::new(name).with_columns(columns))
    }

    pub fn with_table_metadata(mut self, schema: &str, table: TableMetadata) -> Self {
        self.inner = self.inner.with_table(schema, table);
        self
    }

    pub fn with_procedure(mut self, name: &str) -> Self {
        self.inner = self.inner.with_procedure(DEFAULT_SCHEMA, name);
        self
    }

    /// Mark the object at `path` as disconnected
    pub fn offline(mut self, path: &str) -> Self {
        self.inner = self.inner.offline(path);
        self
    }

    /// Make every metadata access on the object at `path` fail
    pub fn failing(mut self, path: &str, error: CatalogError) -> Self {
        self.inner = self.inner.failing(path, error);
        self
    }

    pub fn without_structure_assistant(mut self) -> Self {
        self.inner = self.inner.without_structure_assistant();
        self
    }

    /// Add the standard test schema
    ///
    /// - `t(a int, b int)`
    /// - `users(id bigint primary key, email varchar(255), name varchar(100))`
    /// - `customers(cust_pk int primary key, name text)`
    /// - `orders(id bigint primary key, cust_id int, total decimal)`
    /// - `parent(a int)` without a primary key
    /// - procedure `refresh_stats`
    pub fn with_standard_schema(self) -> Self {
        self.with_table("t", &[("a", DataType::Integer), ("b", DataType::Integer)])
            .with_table_metadata(
                DEFAULT_SCHEMA,
                TableMetadata::new("users").with_columns(vec![
                    ColumnMetadata::new("id", DataType::BigInt)
                        .with_nullable(false)
                        .with_primary_key(),
                    ColumnMetadata::new("email", DataType::Varchar(Some(255))).with_nullable(false),
                    ColumnMetadata::new("name", DataType::Varchar(Some(100))),
                ]),
            )
            .with_table_metadata(
                DEFAULT_SCHEMA,
                TableMetadata::new("customers")
                    .with_columns(vec![
                        ColumnMetadata::new("cust_pk", DataType::Integer).with_nullable(false),
                        ColumnMetadata::new("name", DataType::Text),
                    ])
                    .with_primary_key(["cust_pk"]),
            )
            .with_table_metadata(
                DEFAULT_SCHEMA,
                TableMetadata::new("orders")
                    .with_columns(vec![
                        ColumnMetadata::new("id", DataType::BigInt).with_primary_key(),
                        ColumnMetadata::new("cust_id", DataType::Integer)
                            .with_foreign_key("customers", "cust_pk"),
                        ColumnMetadata::new("total", DataType::Decimal),
                    ]),
            )
            .with_table("parent", &[("a", DataType::Integer)])
            .with_procedure("refresh_stats")
    }

    pub fn build(self) -> StaticCatalog {
        self.inner.build()
    }
}

/// Catalog holding the standard test schema
pub fn standard_catalog() -> StaticCatalog {
    MockCatalogBuilder::new().with_standard_schema().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_catalog::{DataSource, DefaultProgressMonitor, ObjectKind};

    #[tokio::test]
    async fn test_standard_schema_layout() {
        let catalog = standard_catalog();
        let customers = catalog.object("app.public.customers").unwrap();
        assert_eq!(customers.kind(), ObjectKind::Table);
        let key = customers
            .as_table()
            .unwrap()
            .primary_key(&DefaultProgressMonitor::new())
            .await
            .unwrap();
        assert_eq!(key, Some(vec!["cust_pk".to_string()]));

        let context = catalog.execution_context();
        assert!(context.default_schema().is_some());
        assert_eq!(catalog.dialect(), Dialect::PostgreSQL);
    }
}
