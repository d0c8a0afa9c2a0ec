// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Catalog object traits
//!
//! The semantic layer sees a catalog as a tree of objects. Every object
//! implements [`CatalogObject`]; containers (data source, catalog, schema)
//! additionally expose [`CatalogContainer`] and tables/views expose
//! [`TableObject`]. All metadata loading is async because it may reach the
//! network.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sqlmodel_syntax::Dialect;

use crate::context::ExecutionContext;
use crate::error::CatalogResult;
use crate::metadata::{ColumnMetadata, ObjectKind};
use crate::monitor::ProgressMonitor;

/// Shared handle to a catalog object
pub type ObjectRef = Arc<dyn CatalogObject>;

/// A named object in the catalog tree
pub trait CatalogObject: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn kind(&self) -> ObjectKind;

    fn parent(&self) -> Option<ObjectRef>;

    /// Disconnected objects have no loadable metadata
    fn is_connected(&self) -> bool {
        true
    }

    /// Dotted name from the top-most container down, data source excluded
    fn qualified_name(&self) -> String {
        let mut parts = vec![self.name().to_string()];
        let mut current = self.parent();
        while let Some(object) = current {
            if object.kind() == ObjectKind::DataSource {
                break;
            }
            parts.push(object.name().to_string());
            current = object.parent();
        }
        parts.reverse();
        parts.join(".")
    }

    fn as_container(&self) -> Option<&dyn CatalogContainer> {
        None
    }

    fn as_table(&self) -> Option<&dyn TableObject> {
        None
    }
}

/// Two handles denote the same catalog object
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Arc::ptr_eq(a, b) || (a.kind() == b.kind() && a.qualified_name() == b.qualified_name())
}

/// Which part of a container's structure to load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureScope {
    /// Direct children only
    Children,
    /// Children and their columns
    Full,
}

/// An object holding other objects
#[async_trait]
pub trait CatalogContainer: Send + Sync {
    /// Look up a direct child by exact name
    async fn get_child(
        &self,
        monitor: &dyn ProgressMonitor,
        name: &str,
    ) -> CatalogResult<Option<ObjectRef>>;

    async fn children(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ObjectRef>>;

    /// Populate the metadata cache for this container
    async fn cache_structure(
        &self,
        monitor: &dyn ProgressMonitor,
        scope: StructureScope,
    ) -> CatalogResult<()>;

    /// Containers that keep procedures apart from their ordinary children
    fn is_procedure_container(&self) -> bool {
        false
    }

    async fn procedures(&self, _monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ObjectRef>> {
        Ok(Vec::new())
    }

    fn data_source(&self) -> Option<Arc<dyn DataSource>>;
}

/// An object exposing rows
#[async_trait]
pub trait TableObject: Send + Sync {
    async fn columns(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ColumnMetadata>>;

    /// Primary key column names; `None` when the table has no primary key
    async fn primary_key(&self, monitor: &dyn ProgressMonitor)
    -> CatalogResult<Option<Vec<String>>>;
}

/// A connected database
pub trait DataSource: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn dialect(&self) -> Dialect;

    /// Root container of the object tree
    fn root(&self) -> ObjectRef;

    fn structure_assistant(&self) -> Option<Arc<dyn StructureAssistant>>;
}

/// Parameters of an approximate object search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSearchParams {
    /// Name mask; `%` matches any run of characters and `_` a single one
    pub mask: String,
    pub case_sensitive: bool,
    pub max_results: usize,
    /// Search the whole data source instead of the default schema
    pub global_search: bool,
    /// Object kinds to return; empty means tables and views
    pub kinds: Vec<ObjectKind>,
}

impl ObjectSearchParams {
    pub fn new(mask: impl Into<String>) -> Self {
        Self {
            mask: mask.into(),
            case_sensitive: false,
            max_results: 2,
            global_search: false,
            kinds: Vec::new(),
        }
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_global_search(mut self, global_search: bool) -> Self {
        self.global_search = global_search;
        self
    }

    pub fn with_kinds(mut self, kinds: Vec<ObjectKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn accepts(&self, kind: ObjectKind) -> bool {
        if self.kinds.is_empty() {
            kind.is_table_like()
        } else {
            self.kinds.contains(&kind)
        }
    }
}

/// Fuzzy object search collaborator
#[async_trait]
pub trait StructureAssistant: Send + Sync {
    async fn find_objects_by_mask(
        &self,
        monitor: &dyn ProgressMonitor,
        execution: &ExecutionContext,
        params: &ObjectSearchParams,
    ) -> CatalogResult<Vec<ObjectRef>>;
}
