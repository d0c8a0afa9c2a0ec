// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Name Resolver
//!
//! Resolves a dotted name to catalog objects. Strategies run in order and
//! the first non-empty result wins:
//!
//! 1. [`ResolutionStrategy::ContextDefaults`]: the name as a child path of
//!    the default schema, then of the default catalog
//! 2. [`ResolutionStrategy::ContainerWalk`]: the name as a child path of the
//!    given container, climbing to its ancestors, loading structure on the way
//! 3. [`ResolutionStrategy::StructureAssistant`]: fuzzy search for a
//!    single-part name
//!
//! If nothing is found with the names as written, the whole sequence runs
//! once more with quotes stripped and case folded for the dialect.
//!
//! Resolution is best-effort: catalog failures are logged and count as
//! "not found", and the result is simply empty.

use sqlmodel_catalog::{
    CatalogError, ExecutionContext, ObjectKind, ObjectRef, ObjectSearchParams, ProgressMonitor,
    StructureScope,
};
use sqlmodel_syntax::Dialect;
use tracing::{debug, instrument, warn};

use crate::config::RecognitionConfig;

/// Strategy for resolving a dotted name to catalog objects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Child path of the execution context's default schema or catalog
    ContextDefaults,

    /// Child path of the starting container or one of its ancestors
    ContainerWalk,

    /// Approximate search through the data source's structure assistant
    StructureAssistant,
}

impl ResolutionStrategy {
    /// Get all strategies in order of precedence
    pub fn all() -> &'static [ResolutionStrategy] {
        use ResolutionStrategy::*;
        &[ContextDefaults, ContainerWalk, StructureAssistant]
    }
}

/// Per-lookup switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LookupOptions {
    /// Allow the structure assistant fallback
    pub use_assistant: bool,
    /// Search the whole data source rather than the default schema
    pub global_search: bool,
    /// Accept routines and other non-table objects
    pub any_object_kind: bool,
}

impl LookupOptions {
    pub fn tables() -> Self {
        Self {
            use_assistant: true,
            ..Self::default()
        }
    }

    pub fn any_object() -> Self {
        Self {
            use_assistant: true,
            any_object_kind: true,
            ..Self::default()
        }
    }
}

pub struct NameResolver<'a> {
    monitor: &'a dyn ProgressMonitor,
    config: &'a RecognitionConfig,
}

impl<'a> NameResolver<'a> {
    pub fn new(monitor: &'a dyn ProgressMonitor, config: &'a RecognitionConfig) -> Self {
        Self { monitor, config }
    }

    /// Resolve `name_parts` (as written, quotes included) to catalog objects
    #[instrument(skip_all, fields(name = %name_parts.join(".")))]
    pub async fn find_objects_by_fqn(
        &self,
        container: Option<&ObjectRef>,
        execution: Option<&ExecutionContext>,
        name_parts: &[String],
        options: LookupOptions,
    ) -> Vec<ObjectRef> {
        if name_parts.is_empty() {
            return Vec::new();
        }
        let dialect = self.dialect(container, execution);

        let mut attempts = vec![name_parts.to_vec()];
        if self.config.retry_with_normalized_names {
            let normalized: Vec<String> = name_parts
                .iter()
                .map(|part| dialect.normalize_identifier(part))
                .collect();
            if normalized != name_parts {
                attempts.push(normalized);
            }
        }

        for (attempt, names) in attempts.iter().enumerate() {
            for strategy in ResolutionStrategy::all() {
                if self.monitor.is_canceled() {
                    debug!("Name resolution canceled");
                    return Vec::new();
                }
                debug!(?strategy, attempt, "Attempting resolution strategy");
                let found = match strategy {
                    ResolutionStrategy::ContextDefaults => {
                        self.from_context_defaults(execution, names, options).await
                    }
                    ResolutionStrategy::ContainerWalk => {
                        self.from_container_walk(container, execution, names).await
                    }
                    ResolutionStrategy::StructureAssistant => {
                        self.from_structure_assistant(execution, names, name_parts, options, dialect)
                            .await
                    }
                };
                if let Some(object) = found {
                    debug!(?strategy, object = %object.qualified_name(), "Name resolved");
                    return vec![object];
                }
            }
        }

        debug!("All strategies exhausted, name not found");
        Vec::new()
    }

    fn dialect(&self, container: Option<&ObjectRef>, execution: Option<&ExecutionContext>) -> Dialect {
        execution
            .map(|e| e.data_source().dialect())
            .or_else(|| {
                container
                    .and_then(|c| c.as_container())
                    .and_then(|c| c.data_source())
                    .map(|ds| ds.dialect())
            })
            .unwrap_or_default()
    }

    async fn from_context_defaults(
        &self,
        execution: Option<&ExecutionContext>,
        names: &[String],
        options: LookupOptions,
    ) -> Option<ObjectRef> {
        let execution = execution?;
        if names.len() > 2 {
            return None;
        }
        for default in execution.defaults() {
            if let Some(found) = self
                .descend(default, names, false, options.any_object_kind)
                .await
            {
                return Some(found);
            }
        }
        None
    }

    async fn from_container_walk(
        &self,
        container: Option<&ObjectRef>,
        execution: Option<&ExecutionContext>,
        names: &[String],
    ) -> Option<ObjectRef> {
        let start = container
            .cloned()
            .or_else(|| execution.map(|e| e.data_source().root()))?;

        let mut current = Some(start);
        while let Some(object) = current {
            if object.is_connected() && object.as_container().is_some() {
                if let Some(found) = self.descend(&object, names, true, true).await {
                    return Some(found);
                }
            }
            current = object.parent();
        }
        None
    }

    async fn from_structure_assistant(
        &self,
        execution: Option<&ExecutionContext>,
        names: &[String],
        written: &[String],
        options: LookupOptions,
        dialect: Dialect,
    ) -> Option<ObjectRef> {
        if !options.use_assistant
            || !self.config.use_structure_assistant
            || names.len() != 1
            || self.monitor.is_force_cache_usage()
        {
            return None;
        }
        let execution = execution?;
        let assistant = execution.data_source().structure_assistant()?;

        let kinds = if options.any_object_kind {
            vec![
                ObjectKind::Table,
                ObjectKind::View,
                ObjectKind::Procedure,
                ObjectKind::Function,
                ObjectKind::Sequence,
            ]
        } else {
            Vec::new()
        };
        let params = ObjectSearchParams::new(dialect.unquote(&names[0]))
            .with_case_sensitive(dialect.is_quoted(&written[0]))
            .with_max_results(self.config.assistant_max_results)
            .with_global_search(options.global_search)
            .with_kinds(kinds);

        let found = self
            .check(
                assistant
                    .find_objects_by_mask(self.monitor, execution, &params)
                    .await,
                "structure assistant search",
            )?;
        found.into_iter().find(|object| object.is_connected())
    }

    /// Follow `names` as a child path from `start`
    async fn descend(
        &self,
        start: &ObjectRef,
        names: &[String],
        load_structure: bool,
        search_procedures: bool,
    ) -> Option<ObjectRef> {
        let mut current = start.clone();
        for name in names {
            if self.monitor.is_canceled() {
                return None;
            }
            let container = current.as_container()?;
            if load_structure {
                self.check(
                    container
                        .cache_structure(self.monitor, StructureScope::Children)
                        .await,
                    "structure load",
                )?;
            }
            let child = self.check(container.get_child(self.monitor, name).await, "child lookup")?;
            let next = match child {
                Some(child) if child.is_connected() => child,
                Some(child) => {
                    debug!(object = %child.qualified_name(), "Skipping disconnected object");
                    return None;
                }
                None if search_procedures && container.is_procedure_container() => {
                    let procedures =
                        self.check(container.procedures(self.monitor).await, "procedure list")?;
                    procedures.into_iter().find(|p| p.name() == name.as_str())?
                }
                None => return None,
            };
            current = next;
        }
        Some(current)
    }

    fn check<T>(&self, result: Result<T, CatalogError>, operation: &str) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(CatalogError::Canceled) => None,
            Err(err) => {
                warn!(error = %err, operation, "Catalog access failed during name resolution");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_catalog::{
        CachingProgressMonitor, CatalogObject, ColumnMetadata, DataSource, DataType,
        DefaultProgressMonitor, StaticCatalog, TableMetadata,
    };
    use std::sync::Arc;

    fn catalog() -> StaticCatalog {
        StaticCatalog::builder("local", Dialect::PostgreSQL)
            .with_table(
                "main.public",
                TableMetadata::new("users")
                    .with_column(ColumnMetadata::new("id", DataType::Integer)),
            )
            .with_table("main.public", TableMetadata::new("Mixed"))
            .with_table("main.sales", TableMetadata::new("orders"))
            .with_procedure("main.public", "refresh_stats")
            .with_table("main.archive", TableMetadata::new("old_orders"))
            .offline("main.archive")
            .with_table("main.locked", TableMetadata::new("secrets"))
            .failing("main.locked", CatalogError::PermissionDenied("locked".into()))
            .with_default_catalog("main")
            .with_default_schema("main.public")
            .build()
    }

    fn parts(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn resolve(
        catalog: &StaticCatalog,
        monitor: &dyn ProgressMonitor,
        config: &RecognitionConfig,
        names: &[&str],
        options: LookupOptions,
    ) -> Vec<ObjectRef> {
        let execution = catalog.execution_context();
        NameResolver::new(monitor, config)
            .find_objects_by_fqn(None, Some(&execution), &parts(names), options)
            .await
    }

    #[tokio::test]
    async fn test_single_part_from_default_schema() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let found = resolve(&catalog, &monitor, &config, &["users"], LookupOptions::tables()).await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].qualified_name(), "main.public.users");
        // the shortcut does not load structure
        assert_eq!(catalog.structure_loads(), 0);
    }

    #[tokio::test]
    async fn test_two_parts_from_default_catalog() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let found = resolve(&catalog, &monitor, &config, &["sales", "orders"], LookupOptions::tables()).await;
        assert_eq!(found[0].qualified_name(), "main.sales.orders");
    }

    #[tokio::test]
    async fn test_container_walk_loads_structure() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let found = resolve(
            &catalog,
            &monitor,
            &config,
            &["main", "sales", "orders"],
            LookupOptions::tables(),
        )
        .await;
        assert_eq!(found[0].qualified_name(), "main.sales.orders");
        assert_eq!(catalog.structure_loads(), 3);
    }

    #[tokio::test]
    async fn test_container_walk_climbs_ancestors() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let start = catalog.object("main.public").unwrap();
        let found = NameResolver::new(&monitor, &config)
            .find_objects_by_fqn(Some(&start), None, &parts(&["sales", "orders"]), LookupOptions::default())
            .await;
        assert_eq!(found[0].qualified_name(), "main.sales.orders");
    }

    #[tokio::test]
    async fn test_procedure_found_through_procedure_list() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let found = resolve(
            &catalog,
            &monitor,
            &config,
            &["refresh_stats"],
            LookupOptions::any_object(),
        )
        .await;
        assert_eq!(found[0].kind(), ObjectKind::Procedure);
    }

    #[tokio::test]
    async fn test_disconnected_object_is_not_found() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default().with_structure_assistant(false);
        let found = resolve(
            &catalog,
            &monitor,
            &config,
            &["archive", "old_orders"],
            LookupOptions::tables(),
        )
        .await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_catalog_failure_is_swallowed() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        let found = resolve(&catalog, &monitor, &config, &["locked", "secrets"], LookupOptions::tables()).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_retry_with_normalized_names() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default().with_structure_assistant(false);

        // unquoted names fold to lower case in PostgreSQL
        let found = resolve(&catalog, &monitor, &config, &["USERS"], LookupOptions::tables()).await;
        assert_eq!(found[0].name(), "users");

        // quoted names keep their case
        let found = resolve(&catalog, &monitor, &config, &["\"Mixed\""], LookupOptions::tables()).await;
        assert_eq!(found[0].name(), "Mixed");

        let no_retry = config.clone().with_normalized_retry(false);
        let found = resolve(&catalog, &monitor, &no_retry, &["USERS"], LookupOptions::tables()).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_structure_assistant_fallback() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        let config = RecognitionConfig::default();
        // not a child of any default, but the assistant finds it globally
        let options = LookupOptions {
            global_search: true,
            ..LookupOptions::tables()
        };
        let found = resolve(&catalog, &monitor, &config, &["orders"], options).await;
        assert_eq!(found[0].qualified_name(), "main.sales.orders");
    }

    #[tokio::test]
    async fn test_structure_assistant_skipped_in_force_cache_mode() {
        let catalog = catalog();
        let monitor = CachingProgressMonitor::new(Arc::new(DefaultProgressMonitor::new()));
        let config = RecognitionConfig::default();
        let options = LookupOptions {
            global_search: true,
            ..LookupOptions::tables()
        };
        let found = resolve(&catalog, &monitor, &config, &["orders"], options).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_canceled_monitor_returns_empty() {
        let catalog = catalog();
        let monitor = DefaultProgressMonitor::new();
        monitor.cancel();
        let config = RecognitionConfig::default();
        let found = resolve(&catalog, &monitor, &config, &["users"], LookupOptions::tables()).await;
        assert!(found.is_empty());
        assert_eq!(catalog.root().name(), "local");
    }
}
