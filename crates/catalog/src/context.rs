// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Execution context
//!
//! The connection a statement runs against, with its default catalog and
//! schema. Unqualified names are first looked up in these defaults.

use std::sync::Arc;

use crate::r#trait::{DataSource, ObjectRef};

#[derive(Debug, Clone)]
pub struct ExecutionContext {
    data_source: Arc<dyn DataSource>,
    default_catalog: Option<ObjectRef>,
    default_schema: Option<ObjectRef>,
}

impl ExecutionContext {
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            data_source,
            default_catalog: None,
            default_schema: None,
        }
    }

    pub fn with_default_catalog(mut self, catalog: ObjectRef) -> Self {
        self.default_catalog = Some(catalog);
        self
    }

    pub fn with_default_schema(mut self, schema: ObjectRef) -> Self {
        self.default_schema = Some(schema);
        self
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }

    pub fn default_catalog(&self) -> Option<&ObjectRef> {
        self.default_catalog.as_ref()
    }

    pub fn default_schema(&self) -> Option<&ObjectRef> {
        self.default_schema.as_ref()
    }

    /// Default schema and catalog, most specific first
    pub fn defaults(&self) -> impl Iterator<Item = &ObjectRef> {
        self.default_schema.iter().chain(self.default_catalog.iter())
    }
}
