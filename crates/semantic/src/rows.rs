// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Rows contexts
//!
//! Two immutable environments are threaded through resolution:
//!
//! - [`RowsSourceContext`]: what relations can be named here (the
//!   connection, `WITH` bindings in effect, rows of an enclosing query)
//! - [`RowsDataContext`]: which columns are visible here and which sources
//!   provide them
//!
//! Both are cheap to clone (`Arc` inside). Every transformation returns a
//! new context and leaves the receiver untouched, so a context captured in
//! a symbol origin never changes afterwards.

use std::fmt;
use std::sync::Arc;

use sqlmodel_catalog::{DataType, ExecutionContext, ObjectRef};

use crate::node::NodeId;
use crate::symbol::SymbolEntryId;

/// One column of a rows tuple
#[derive(Debug, Clone)]
pub struct ResultColumn {
    pub name: String,
    pub data_type: DataType,
    /// Catalog table the column belongs to
    pub object: Option<ObjectRef>,
    /// Symbol entry declaring the column (aliases, CTE lists, DDL columns)
    pub declared_at: Option<SymbolEntryId>,
    /// Created as a placeholder for a name that did not resolve
    pub synthetic: bool,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            object: None,
            declared_at: None,
            synthetic: false,
        }
    }

    /// Placeholder column of unknown type
    pub fn unknown(name: impl Into<String>) -> Self {
        Self {
            synthetic: true,
            ..Self::new(name, DataType::Unknown)
        }
    }

    pub fn with_object(mut self, object: ObjectRef) -> Self {
        self.object = Some(object);
        self
    }

    pub fn declared_at(mut self, entry: SymbolEntryId) -> Self {
        self.declared_at = Some(entry);
        self
    }

    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    fn matches(&self, name: &str, case_sensitive: bool) -> bool {
        names_match(&self.name, name, case_sensitive)
    }
}

impl PartialEq for ResultColumn {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.data_type == other.data_type
            && self.declared_at == other.declared_at
            && self.synthetic == other.synthetic
    }
}

pub(crate) fn names_match(stored: &str, wanted: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        stored == wanted
    } else {
        stored.eq_ignore_ascii_case(wanted)
    }
}

/// A relation visible in a rows data context
#[derive(Debug, Clone)]
pub struct RowsSource {
    /// Name the relation was referenced by
    pub name: String,
    pub alias: Option<String>,
    pub object: Option<ObjectRef>,
    /// Model node that introduced the source
    pub node: Option<NodeId>,
    pub columns: Vec<ResultColumn>,
    /// False when the relation could not be resolved; its columns are unknown
    pub resolved: bool,
}

impl RowsSource {
    pub fn new(name: impl Into<String>, columns: Vec<ResultColumn>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            object: None,
            node: None,
            columns,
            resolved: true,
        }
    }

    /// Source whose relation is unknown
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            resolved: false,
            ..Self::new(name, Vec::new())
        }
    }

    pub fn with_alias(mut self, alias: Option<String>) -> Self {
        self.alias = alias;
        self
    }

    pub fn with_object(mut self, object: Option<ObjectRef>) -> Self {
        self.object = object;
        self
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    /// Name visible to qualified references: the alias if present
    pub fn visible_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Whether `qualifier` names this source
    pub fn answers_to(&self, qualifier: &str, case_sensitive: bool) -> bool {
        match &self.alias {
            Some(alias) => names_match(alias, qualifier, case_sensitive),
            None => {
                let last = self.name.rsplit('.').next().unwrap_or(&self.name);
                names_match(last, qualifier, case_sensitive)
                    || names_match(&self.name, qualifier, case_sensitive)
            }
        }
    }

    pub fn find_column(&self, name: &str, case_sensitive: bool) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.matches(name, case_sensitive))
    }
}

/// Outcome of an unqualified column lookup
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnResolution {
    Found(ResultColumn),
    Ambiguous(Vec<ResultColumn>),
    NotFound,
}

#[derive(Debug, Default)]
struct RowsData {
    columns: Vec<ResultColumn>,
    sources: Vec<Arc<RowsSource>>,
    outer: Option<RowsDataContext>,
    owner: Option<NodeId>,
}

/// Columns visible at a point of the statement
#[derive(Clone, Default)]
pub struct RowsDataContext {
    inner: Arc<RowsData>,
}

impl fmt::Debug for RowsDataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowsDataContext")
            .field(
                "columns",
                &self.inner.columns.iter().map(|c| &c.name).collect::<Vec<_>>(),
            )
            .field(
                "sources",
                &self
                    .inner
                    .sources
                    .iter()
                    .map(|s| s.visible_name())
                    .collect::<Vec<_>>(),
            )
            .field("has_outer", &self.inner.outer.is_some())
            .finish()
    }
}

impl RowsDataContext {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Empty context whose lookups fall through to `outer`
    pub fn nested_in(outer: Option<RowsDataContext>) -> Self {
        Self {
            inner: Arc::new(RowsData {
                outer,
                ..RowsData::default()
            }),
        }
    }

    pub fn columns(&self) -> &[ResultColumn] {
        &self.inner.columns
    }

    /// Sources visible directly in this context
    pub fn rows_sources(&self) -> impl Iterator<Item = &RowsSource> {
        self.inner.sources.iter().map(|s| s.as_ref())
    }

    pub fn outer(&self) -> Option<&RowsDataContext> {
        self.inner.outer.as_ref()
    }

    pub fn owner(&self) -> Option<NodeId> {
        self.inner.owner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.columns.is_empty() && self.inner.sources.is_empty()
    }

    /// New context with one more source; its columns join the visible set
    pub fn with_source(&self, source: RowsSource) -> Self {
        let mut columns = self.inner.columns.clone();
        columns.extend(source.columns.iter().cloned());
        let mut sources = self.inner.sources.clone();
        sources.push(Arc::new(source));
        Self {
            inner: Arc::new(RowsData {
                columns,
                sources,
                outer: self.inner.outer.clone(),
                owner: self.inner.owner,
            }),
        }
    }

    /// Union of two contexts, as produced by a join; the receiver's outer is kept
    pub fn combine(&self, other: &RowsDataContext) -> Self {
        self.combine_using(other, &[], false)
    }

    /// Join union where the right side's `using` columns are merged into the left's
    pub fn combine_using(&self, other: &RowsDataContext, using: &[String], case_sensitive: bool) -> Self {
        let mut columns = self.inner.columns.clone();
        columns.extend(
            other
                .inner
                .columns
                .iter()
                .filter(|c| !using.iter().any(|u| c.matches(u, case_sensitive)))
                .cloned(),
        );
        let mut sources = self.inner.sources.clone();
        sources.extend(other.inner.sources.iter().cloned());
        Self {
            inner: Arc::new(RowsData {
                columns,
                sources,
                outer: self.inner.outer.clone(),
                owner: self.inner.owner,
            }),
        }
    }

    /// Projection tuple owned by `owner`; sources are dropped, the outer chain is kept
    pub fn make_tuple(&self, owner: NodeId, columns: Vec<ResultColumn>) -> Self {
        Self {
            inner: Arc::new(RowsData {
                columns,
                sources: Vec::new(),
                outer: self.inner.outer.clone(),
                owner: Some(owner),
            }),
        }
    }

    /// Same columns and sources with another outer context
    pub fn with_outer(&self, outer: Option<RowsDataContext>) -> Self {
        Self {
            inner: Arc::new(RowsData {
                columns: self.inner.columns.clone(),
                sources: self.inner.sources.clone(),
                outer,
                owner: self.inner.owner,
            }),
        }
    }

    /// Unqualified lookup: this context first, then the outer chain
    pub fn resolve_column(&self, name: &str, case_sensitive: bool) -> ColumnResolution {
        let mut current = Some(self);
        while let Some(rows) = current {
            let mut matches: Vec<&ResultColumn> = rows
                .inner
                .columns
                .iter()
                .filter(|c| c.matches(name, case_sensitive))
                .collect();
            if !case_sensitive && matches.len() > 1 {
                // an exact-case hit disambiguates case-folded ones
                let exact: Vec<&ResultColumn> =
                    matches.iter().copied().filter(|c| c.name == name).collect();
                if exact.len() == 1 {
                    matches = exact;
                }
            }
            match matches.len() {
                0 => current = rows.outer(),
                1 => return ColumnResolution::Found(matches[0].clone()),
                _ => return ColumnResolution::Ambiguous(matches.into_iter().cloned().collect()),
            }
        }
        ColumnResolution::NotFound
    }

    /// Source named by `qualifier`, searching the outer chain
    pub fn find_source(&self, qualifier: &str, case_sensitive: bool) -> Option<&RowsSource> {
        let mut current = Some(self);
        while let Some(rows) = current {
            if let Some(source) = rows
                .inner
                .sources
                .iter()
                .rev()
                .find(|s| s.answers_to(qualifier, case_sensitive))
            {
                return Some(source);
            }
            current = rows.outer();
        }
        None
    }

    /// Some source in this context or its outer chain failed to resolve
    pub fn has_unresolved_source(&self) -> bool {
        let mut current = Some(self);
        while let Some(rows) = current {
            if rows.inner.sources.iter().any(|s| !s.resolved) {
                return true;
            }
            current = rows.outer();
        }
        false
    }
}

#[derive(Debug, Clone)]
struct CteBinding {
    name: String,
    rows: RowsDataContext,
}

#[derive(Debug, Default)]
struct RowsSourceData {
    connection: Option<ExecutionContext>,
    ctes: Vec<CteBinding>,
    outer_rows: Option<RowsDataContext>,
}

/// Relations that can be named at a point of the statement
#[derive(Debug, Clone, Default)]
pub struct RowsSourceContext {
    inner: Arc<RowsSourceData>,
}

impl RowsSourceContext {
    /// Context for a statement running against `connection`
    pub fn new(connection: ExecutionContext) -> Self {
        Self {
            inner: Arc::new(RowsSourceData {
                connection: Some(connection),
                ..RowsSourceData::default()
            }),
        }
    }

    /// Context without a connection; every catalog name stays unresolved
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn connection(&self) -> Option<&ExecutionContext> {
        self.inner.connection.as_ref()
    }

    /// Rows of the enclosing query, visible to correlated subqueries
    pub fn outer_rows(&self) -> Option<&RowsDataContext> {
        self.inner.outer_rows.as_ref()
    }

    pub fn with_cte(&self, name: impl Into<String>, rows: RowsDataContext) -> Self {
        let mut ctes = self.inner.ctes.clone();
        ctes.push(CteBinding {
            name: name.into(),
            rows,
        });
        Self {
            inner: Arc::new(RowsSourceData {
                connection: self.inner.connection.clone(),
                ctes,
                outer_rows: self.inner.outer_rows.clone(),
            }),
        }
    }

    pub fn with_outer_rows(&self, rows: RowsDataContext) -> Self {
        Self {
            inner: Arc::new(RowsSourceData {
                connection: self.inner.connection.clone(),
                ctes: self.inner.ctes.clone(),
                outer_rows: Some(rows),
            }),
        }
    }

    /// Most recent `WITH` binding of `name`
    pub fn find_cte(&self, name: &str, case_sensitive: bool) -> Option<&RowsDataContext> {
        self.inner
            .ctes
            .iter()
            .rev()
            .find(|b| names_match(&b.name, name, case_sensitive))
            .map(|b| &b.rows)
    }

    pub fn cte_names(&self) -> impl Iterator<Item = &str> {
        self.inner.ctes.iter().map(|b| b.name.as_str())
    }
}
