// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static Catalog
//!
//! An in-memory catalog tree implementing every collaborator trait. It is
//! used by tests and by tooling that works from a schema snapshot instead
//! of a live connection.
//!
//! ## Usage
//!
//! ```
//! use sqlmodel_catalog::{
//!     ColumnMetadata, DataSource, DataType, StaticCatalog, TableMetadata,
//! };
//! use sqlmodel_syntax::Dialect;
//!
//! let catalog = StaticCatalog::builder("local", Dialect::PostgreSQL)
//!     .with_table(
//!         "main.public",
//!         TableMetadata::new("users")
//!             .with_column(ColumnMetadata::new("id", DataType::Integer).with_primary_key()),
//!     )
//!     .with_default_schema("main.public")
//!     .build();
//!
//! assert_eq!(catalog.dialect(), Dialect::PostgreSQL);
//! assert!(catalog.object("main.public.users").is_some());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sqlmodel_syntax::Dialect;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::{CatalogError, CatalogResult};
use crate::metadata::{ColumnMetadata, ObjectKind, TableMetadata};
use crate::monitor::ProgressMonitor;
use crate::r#trait::{
    CatalogContainer, CatalogObject, DataSource, ObjectRef, ObjectSearchParams, StructureAssistant,
    StructureScope, TableObject,
};

const ROOT: usize = 0;

#[derive(Debug)]
struct Entry {
    name: String,
    kind: ObjectKind,
    parent: Option<usize>,
    children: Vec<usize>,
    procedures: Vec<usize>,
    table: Option<TableMetadata>,
    connected: bool,
    failure: Option<CatalogError>,
}

impl Entry {
    fn new(name: impl Into<String>, kind: ObjectKind, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            kind,
            parent,
            children: Vec::new(),
            procedures: Vec::new(),
            table: None,
            connected: true,
            failure: None,
        }
    }
}

#[derive(Debug)]
struct CatalogData {
    dialect: Dialect,
    entries: Vec<Entry>,
    assistant: bool,
    default_catalog: Option<usize>,
    default_schema: Option<usize>,
    structure_loads: AtomicUsize,
}

impl CatalogData {
    fn find_path(&self, path: &str) -> Option<usize> {
        find_path(&self.entries, path)
    }
}

fn find_path(entries: &[Entry], path: &str) -> Option<usize> {
    let mut current = ROOT;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let entry = &entries[current];
        current = entry
            .children
            .iter()
            .chain(entry.procedures.iter())
            .copied()
            .find(|&id| entries[id].name == segment)?;
    }
    Some(current)
}

/// Static catalog with predefined schema data
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    data: Arc<CatalogData>,
}

impl StaticCatalog {
    pub fn builder(name: impl Into<String>, dialect: Dialect) -> StaticCatalogBuilder {
        StaticCatalogBuilder::new(name, dialect)
    }

    /// Object at a dotted path below the data source, e.g. `main.public.users`
    pub fn object(&self, path: &str) -> Option<ObjectRef> {
        self.data.find_path(path).map(|id| self.handle(id))
    }

    /// Execution context with the configured default catalog and schema
    pub fn execution_context(&self) -> ExecutionContext {
        let mut context = ExecutionContext::new(Arc::new(self.clone()));
        if let Some(id) = self.data.default_catalog {
            context = context.with_default_catalog(self.handle(id));
        }
        if let Some(id) = self.data.default_schema {
            context = context.with_default_schema(self.handle(id));
        }
        context
    }

    /// Number of successful `cache_structure` calls so far
    pub fn structure_loads(&self) -> usize {
        self.data.structure_loads.load(Ordering::Relaxed)
    }

    fn handle(&self, id: usize) -> ObjectRef {
        Arc::new(StaticObject {
            data: self.data.clone(),
            id,
        })
    }
}

impl DataSource for StaticCatalog {
    fn name(&self) -> &str {
        &self.data.entries[ROOT].name
    }

    fn dialect(&self) -> Dialect {
        self.data.dialect
    }

    fn root(&self) -> ObjectRef {
        self.handle(ROOT)
    }

    fn structure_assistant(&self) -> Option<Arc<dyn StructureAssistant>> {
        self.data.assistant.then(|| {
            Arc::new(StaticStructureAssistant {
                catalog: self.clone(),
            }) as Arc<dyn StructureAssistant>
        })
    }
}

/// Builder for [`StaticCatalog`]
///
/// Paths are dotted names below the data source. Missing intermediate
/// containers are created as catalogs, the last segment with the kind the
/// method implies.
pub struct StaticCatalogBuilder {
    dialect: Dialect,
    entries: Vec<Entry>,
    assistant: bool,
    default_catalog: Option<String>,
    default_schema: Option<String>,
}

impl StaticCatalogBuilder {
    pub fn new(name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            dialect,
            entries: vec![Entry::new(name, ObjectKind::DataSource, None)],
            assistant: true,
            default_catalog: None,
            default_schema: None,
        }
    }

    pub fn with_catalog(mut self, path: &str) -> Self {
        self.ensure_container(path, ObjectKind::Catalog);
        self
    }

    pub fn with_schema(mut self, path: &str) -> Self {
        self.ensure_container(path, ObjectKind::Schema);
        self
    }

    /// Add a table or view (by its table type) to the schema at `path`
    pub fn with_table(mut self, path: &str, table: TableMetadata) -> Self {
        let parent = self.ensure_container(path, ObjectKind::Schema);
        let mut entry = Entry::new(table.name.clone(), table.object_kind(), Some(parent));
        entry.table = Some(table);
        let id = self.push(entry);
        self.entries[parent].children.push(id);
        self
    }

    pub fn with_procedure(self, path: &str, name: &str) -> Self {
        self.with_routine(path, name, ObjectKind::Procedure)
    }

    pub fn with_function(self, path: &str, name: &str) -> Self {
        self.with_routine(path, name, ObjectKind::Function)
    }

    pub fn with_sequence(mut self, path: &str, name: &str) -> Self {
        let parent = self.ensure_container(path, ObjectKind::Schema);
        let id = self.push(Entry::new(name, ObjectKind::Sequence, Some(parent)));
        self.entries[parent].children.push(id);
        self
    }

    /// Mark the object at `path` as disconnected
    pub fn offline(mut self, path: &str) -> Self {
        if let Some(id) = self.find(path) {
            self.entries[id].connected = false;
        }
        self
    }

    /// Make every metadata access on the object at `path` fail
    pub fn failing(mut self, path: &str, error: CatalogError) -> Self {
        if let Some(id) = self.find(path) {
            self.entries[id].failure = Some(error);
        }
        self
    }

    pub fn without_structure_assistant(mut self) -> Self {
        self.assistant = false;
        self
    }

    pub fn with_default_catalog(mut self, path: &str) -> Self {
        self.default_catalog = Some(path.to_string());
        self
    }

    pub fn with_default_schema(mut self, path: &str) -> Self {
        self.default_schema = Some(path.to_string());
        self
    }

    pub fn build(self) -> StaticCatalog {
        let mut data = CatalogData {
            dialect: self.dialect,
            entries: self.entries,
            assistant: self.assistant,
            default_catalog: None,
            default_schema: None,
            structure_loads: AtomicUsize::new(0),
        };
        data.default_catalog = self.default_catalog.and_then(|p| data.find_path(&p));
        data.default_schema = self.default_schema.and_then(|p| data.find_path(&p));
        StaticCatalog {
            data: Arc::new(data),
        }
    }

    fn with_routine(mut self, path: &str, name: &str, kind: ObjectKind) -> Self {
        let parent = self.ensure_container(path, ObjectKind::Schema);
        let id = self.push(Entry::new(name, kind, Some(parent)));
        self.entries[parent].procedures.push(id);
        self
    }

    fn push(&mut self, entry: Entry) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    fn find(&self, path: &str) -> Option<usize> {
        find_path(&self.entries, path)
    }

    fn ensure_container(&mut self, path: &str, leaf: ObjectKind) -> usize {
        let segments: Vec<&str> = path.split('.').filter(|s| !s.is_empty()).collect();
        let mut current = ROOT;
        for (i, segment) in segments.iter().enumerate() {
            let existing = self.entries[current]
                .children
                .iter()
                .copied()
                .find(|&id| self.entries[id].name == *segment);
            current = match existing {
                Some(id) => id,
                None => {
                    let kind = if i + 1 == segments.len() {
                        leaf
                    } else {
                        ObjectKind::Catalog
                    };
                    let id = self.push(Entry::new(*segment, kind, Some(current)));
                    self.entries[current].children.push(id);
                    id
                }
            };
        }
        current
    }
}

/// Handle to one object of a [`StaticCatalog`]
#[derive(Debug, Clone)]
pub struct StaticObject {
    data: Arc<CatalogData>,
    id: usize,
}

impl StaticObject {
    fn entry(&self) -> &Entry {
        &self.data.entries[self.id]
    }

    fn sibling(&self, id: usize) -> ObjectRef {
        Arc::new(StaticObject {
            data: self.data.clone(),
            id,
        })
    }

    fn check_access(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<()> {
        if monitor.is_canceled() {
            return Err(CatalogError::Canceled);
        }
        let entry = self.entry();
        if let Some(failure) = &entry.failure {
            return Err(failure.clone());
        }
        if !entry.connected {
            return Err(CatalogError::Offline(entry.name.clone()));
        }
        Ok(())
    }
}

impl CatalogObject for StaticObject {
    fn name(&self) -> &str {
        &self.entry().name
    }

    fn kind(&self) -> ObjectKind {
        self.entry().kind
    }

    fn parent(&self) -> Option<ObjectRef> {
        self.entry().parent.map(|id| self.sibling(id))
    }

    fn is_connected(&self) -> bool {
        self.entry().connected
    }

    fn as_container(&self) -> Option<&dyn CatalogContainer> {
        self.kind().is_container().then_some(self as &dyn CatalogContainer)
    }

    fn as_table(&self) -> Option<&dyn TableObject> {
        self.entry()
            .table
            .is_some()
            .then_some(self as &dyn TableObject)
    }
}

#[async_trait]
impl CatalogContainer for StaticObject {
    async fn get_child(
        &self,
        monitor: &dyn ProgressMonitor,
        name: &str,
    ) -> CatalogResult<Option<ObjectRef>> {
        self.check_access(monitor)?;
        Ok(self
            .entry()
            .children
            .iter()
            .copied()
            .find(|&id| self.data.entries[id].name == name)
            .map(|id| self.sibling(id)))
    }

    async fn children(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ObjectRef>> {
        self.check_access(monitor)?;
        Ok(self
            .entry()
            .children
            .iter()
            .map(|&id| self.sibling(id))
            .collect())
    }

    async fn cache_structure(
        &self,
        monitor: &dyn ProgressMonitor,
        scope: StructureScope,
    ) -> CatalogResult<()> {
        self.check_access(monitor)?;
        debug!(object = %self.qualified_name(), ?scope, "Loading structure");
        self.data.structure_loads.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn is_procedure_container(&self) -> bool {
        self.kind() == ObjectKind::Schema
    }

    async fn procedures(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ObjectRef>> {
        self.check_access(monitor)?;
        Ok(self
            .entry()
            .procedures
            .iter()
            .map(|&id| self.sibling(id))
            .collect())
    }

    fn data_source(&self) -> Option<Arc<dyn DataSource>> {
        Some(Arc::new(StaticCatalog {
            data: self.data.clone(),
        }))
    }
}

#[async_trait]
impl TableObject for StaticObject {
    async fn columns(&self, monitor: &dyn ProgressMonitor) -> CatalogResult<Vec<ColumnMetadata>> {
        self.check_access(monitor)?;
        Ok(self
            .entry()
            .table
            .as_ref()
            .map(|t| t.columns.clone())
            .unwrap_or_default())
    }

    async fn primary_key(
        &self,
        monitor: &dyn ProgressMonitor,
    ) -> CatalogResult<Option<Vec<String>>> {
        self.check_access(monitor)?;
        Ok(self
            .entry()
            .table
            .as_ref()
            .and_then(TableMetadata::primary_key_columns))
    }
}

/// Mask search over a [`StaticCatalog`]
struct StaticStructureAssistant {
    catalog: StaticCatalog,
}

#[async_trait]
impl StructureAssistant for StaticStructureAssistant {
    async fn find_objects_by_mask(
        &self,
        monitor: &dyn ProgressMonitor,
        execution: &ExecutionContext,
        params: &ObjectSearchParams,
    ) -> CatalogResult<Vec<ObjectRef>> {
        if monitor.is_canceled() {
            return Err(CatalogError::Canceled);
        }
        let data = &self.catalog.data;
        let start = if params.global_search {
            ROOT
        } else {
            execution
                .default_schema()
                .and_then(|schema| data.find_path(&schema.qualified_name()))
                .unwrap_or(ROOT)
        };

        let mut found = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let entry = &data.entries[id];
            if !entry.connected || entry.failure.is_some() {
                continue;
            }
            if id != start
                && params.accepts(entry.kind)
                && matches_mask(&params.mask, &entry.name, params.case_sensitive)
            {
                found.push(id);
            }
            stack.extend(entry.procedures.iter().rev());
            stack.extend(entry.children.iter().rev());
        }

        found.sort_unstable();
        found.truncate(params.max_results);
        Ok(found.into_iter().map(|id| self.catalog.handle(id)).collect())
    }
}

/// SQL `LIKE`-style mask match: `%` any run, `_` any single character
pub fn matches_mask(mask: &str, name: &str, case_sensitive: bool) -> bool {
    let fold = |s: &str| -> Vec<char> {
        if case_sensitive {
            s.chars().collect()
        } else {
            s.chars().flat_map(char::to_lowercase).collect()
        }
    };
    let pattern = fold(mask);
    let text = fold(name);

    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '%' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((bp, bt)) = backtrack {
            p = bp + 1;
            t = bt + 1;
            backtrack = Some((bp, bt + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::DataType;
    use crate::monitor::{CachingProgressMonitor, DefaultProgressMonitor};

    fn catalog() -> StaticCatalog {
        StaticCatalog::builder("local", Dialect::PostgreSQL)
            .with_table(
                "main.public",
                TableMetadata::new("users")
                    .with_column(ColumnMetadata::new("id", DataType::Integer).with_primary_key())
                    .with_column(ColumnMetadata::new("name", DataType::Text)),
            )
            .with_table("main.public", TableMetadata::new("user_roles"))
            .with_procedure("main.public", "refresh_stats")
            .with_table("main.archive", TableMetadata::new("old_users"))
            .offline("main.archive")
            .with_schema("main.locked")
            .failing(
                "main.locked",
                CatalogError::PermissionDenied("main.locked".into()),
            )
            .with_default_catalog("main")
            .with_default_schema("main.public")
            .build()
    }

    #[tokio::test]
    async fn test_get_child_walks_tree() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let main = catalog
            .root()
            .as_container()
            .unwrap()
            .get_child(&monitor, "main")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(main.kind(), ObjectKind::Catalog);

        let public = main
            .as_container()
            .unwrap()
            .get_child(&monitor, "public")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(public.qualified_name(), "main.public");
        assert!(public.as_container().unwrap().is_procedure_container());
    }

    #[tokio::test]
    async fn test_procedures_are_not_children() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let public = catalog.object("main.public").unwrap();
        let container = public.as_container().unwrap();
        assert!(
            container
                .get_child(&monitor, "refresh_stats")
                .await
                .unwrap()
                .is_none()
        );
        let procedures = container.procedures(&monitor).await.unwrap();
        assert_eq!(procedures.len(), 1);
        assert_eq!(procedures[0].kind(), ObjectKind::Procedure);
    }

    #[tokio::test]
    async fn test_table_metadata() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let users = catalog.object("main.public.users").unwrap();
        let table = users.as_table().unwrap();
        assert_eq!(table.columns(&monitor).await.unwrap().len(), 2);
        assert_eq!(
            table.primary_key(&monitor).await.unwrap(),
            Some(vec!["id".to_string()])
        );
    }

    #[tokio::test]
    async fn test_offline_and_failing_objects() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();

        let archive = catalog.object("main.archive").unwrap();
        assert!(!archive.is_connected());
        let result = archive.as_container().unwrap().children(&monitor).await;
        assert!(matches!(result, Err(CatalogError::Offline(_))));

        let locked = catalog.object("main.locked").unwrap();
        let result = locked
            .as_container()
            .unwrap()
            .cache_structure(&monitor, StructureScope::Children)
            .await;
        assert!(matches!(result, Err(CatalogError::PermissionDenied(_))));
    }

    #[tokio::test]
    async fn test_cache_structure_counts_loads() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let public = catalog.object("main.public").unwrap();
        public
            .as_container()
            .unwrap()
            .cache_structure(&monitor, StructureScope::Full)
            .await
            .unwrap();
        assert_eq!(catalog.structure_loads(), 1);
    }

    #[tokio::test]
    async fn test_canceled_monitor() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        monitor.cancel();
        let result = catalog
            .root()
            .as_container()
            .unwrap()
            .get_child(&monitor, "main")
            .await;
        assert_eq!(result.unwrap_err(), CatalogError::Canceled);
    }

    #[tokio::test]
    async fn test_structure_assistant_in_default_schema() {
        let catalog = catalog();
        let monitor = CachingProgressMonitor::new(Arc::new(DefaultProgressMonitor::new()));
        let assistant = catalog.structure_assistant().unwrap();
        let found = assistant
            .find_objects_by_mask(
                &monitor,
                &catalog.execution_context(),
                &ObjectSearchParams::new("USER%"),
            )
            .await
            .unwrap();
        let names: Vec<_> = found.iter().map(|o| o.name().to_string()).collect();
        assert_eq!(names, vec!["users", "user_roles"]);
    }

    #[tokio::test]
    async fn test_structure_assistant_skips_offline_subtrees() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let assistant = catalog.structure_assistant().unwrap();
        let found = assistant
            .find_objects_by_mask(
                &monitor,
                &catalog.execution_context(),
                &ObjectSearchParams::new("old_users").with_global_search(true),
            )
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_matches_mask() {
        assert!(matches_mask("us%", "users", true));
        assert!(matches_mask("u_ers", "users", true));
        assert!(matches_mask("%ers", "users", true));
        assert!(matches_mask("%", "", true));
        assert!(!matches_mask("US%", "users", true));
        assert!(matches_mask("US%", "users", false));
        assert!(!matches_mask("user", "users", false));
    }

    #[test]
    fn test_execution_context_defaults() {
        let catalog = catalog();
        let context = catalog.execution_context();
        assert_eq!(context.default_schema().unwrap().qualified_name(), "main.public");
        assert_eq!(context.default_catalog().unwrap().name(), "main");
        assert_eq!(context.defaults().count(), 2);
    }
}
