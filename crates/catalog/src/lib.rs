// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # SQL Model - Catalog Layer
//!
//! This crate defines the catalog collaborators the query model resolves
//! names against:
//!
//! - **Object tree**: [`CatalogObject`], [`CatalogContainer`], [`TableObject`]
//! - **Connection**: [`DataSource`] and the [`ExecutionContext`] carrying
//!   default catalog and schema
//! - **Fuzzy search**: [`StructureAssistant`]
//! - **Cancellation**: [`ProgressMonitor`] with a default and a
//!   cache-only implementation
//!
//! [`StaticCatalog`] is an in-memory implementation of all of them.
//!
//! ## Implementing a catalog
//!
//! ```rust,ignore
//! use async_trait::async_trait;
//! use sqlmodel_catalog::{CatalogContainer, CatalogResult, ObjectRef, ProgressMonitor};
//!
//! #[async_trait]
//! impl CatalogContainer for MySchema {
//!     async fn get_child(
//!         &self,
//!         monitor: &dyn ProgressMonitor,
//!         name: &str,
//!     ) -> CatalogResult<Option<ObjectRef>> {
//!         // Look the name up in cached metadata or query the server
//!     }
//!     // ...
//! }
//! ```

pub mod context;
pub mod error;
pub mod metadata;
pub mod monitor;
pub mod r#static;
pub mod r#trait;

// Re-exports
pub use context::ExecutionContext;
pub use error::{CatalogError, CatalogResult};
pub use metadata::{ColumnMetadata, ColumnReference, DataType, ObjectKind, TableMetadata, TableType};
pub use monitor::{CachingProgressMonitor, DefaultProgressMonitor, ProgressMonitor};
pub use r#static::{StaticCatalog, StaticCatalogBuilder, StaticObject, matches_mask};
pub use r#trait::{
    CatalogContainer, CatalogObject, DataSource, ObjectRef, ObjectSearchParams, StructureAssistant,
    StructureScope, TableObject, same_object,
};
