// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! `DROP <kind> [IF EXISTS] name [, name ...]`

use sqlmodel_catalog::{ObjectKind, ObjectRef};
use sqlmodel_syntax::{SyntaxKind, SyntaxTree};
use tracing::debug;

use crate::content::ResolveCx;
use crate::name_resolver::LookupOptions;
use crate::node::{NodeId, NodeTree};
use crate::rows::RowsSourceContext;
use crate::symbol::{SymbolClass, SymbolsOrigin};

#[derive(Debug)]
pub struct ObjectDropModel {
    node: NodeId,
    object_kind: ObjectKind,
    if_exists: bool,
    targets: Vec<NodeId>,
    objects: Vec<Option<ObjectRef>>,
}

impl ObjectDropModel {
    pub(crate) fn from_tree(tree: &NodeTree, syntax: &SyntaxTree, node: NodeId) -> Self {
        let keywords = syntax.keywords(tree.node(node).syntax_node());
        let object_kind = keywords
            .iter()
            .find_map(|kw| object_kind_for_keyword(kw))
            .unwrap_or(ObjectKind::Table);
        let if_exists = keywords
            .windows(2)
            .any(|pair| pair[0] == "IF" && pair[1] == "EXISTS");
        Self {
            node,
            object_kind,
            if_exists,
            targets: tree.children_of_kind(node, SyntaxKind::QualifiedName).collect(),
            objects: Vec::new(),
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Kind of objects the statement drops
    pub fn object_kind(&self) -> ObjectKind {
        self.object_kind
    }

    /// Whether the statement carries `IF EXISTS`
    pub fn if_exists(&self) -> bool {
        self.if_exists
    }

    /// Name nodes, one per dropped object
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    /// Resolved objects, parallel to [`targets`](Self::targets)
    pub fn objects(&self) -> &[Option<ObjectRef>] {
        &self.objects
    }

    pub(crate) async fn resolve_object_and_rows_references(
        &mut self,
        cx: &mut ResolveCx<'_>,
        sources: &RowsSourceContext,
    ) {
        let tree = cx.tree;
        let kind = self.object_kind;
        let origin = SymbolsOrigin::DbObjectFromContext {
            kinds: vec![kind],
            context: sources.clone(),
        };
        tree.set_scope_origin(self.node, origin.clone());
        if let Err(err) = tree.node(self.node).set_tail_origin(origin.clone()) {
            debug!(%err, "Keeping existing tail origin");
        }

        let options = if kind.is_table_like() {
            LookupOptions::tables()
        } else {
            LookupOptions::any_object()
        };
        self.objects.clear();
        for &target in &self.targets {
            let parts = tree.node(target).identifiers();
            let Some(&last) = parts.last() else {
                self.objects.push(None);
                continue;
            };
            for &part in parts {
                cx.set_origin(part, origin.clone());
            }
            let object = cx.find_object(sources, parts, options, |found| found == kind).await;
            match &object {
                Some(object) => cx.classify_object_path(parts, object),
                None => {
                    cx.classify(last, SymbolClass::for_object_kind(kind), None);
                    if !self.if_exists && sources.connection().is_some() && !cx.recognition.is_canceled() {
                        cx.warn(
                            tree.region(target),
                            format!("{} '{}' not found", kind_label(kind), cx.dotted(parts)),
                        );
                    }
                }
            }
            self.objects.push(object);
        }
    }
}

fn object_kind_for_keyword(keyword: &str) -> Option<ObjectKind> {
    let kind = match keyword {
        "TABLE" => ObjectKind::Table,
        "VIEW" => ObjectKind::View,
        "PROCEDURE" => ObjectKind::Procedure,
        "FUNCTION" => ObjectKind::Function,
        "SEQUENCE" => ObjectKind::Sequence,
        "INDEX" => ObjectKind::Index,
        "SCHEMA" => ObjectKind::Schema,
        "DATABASE" | "CATALOG" => ObjectKind::Catalog,
        _ => return None,
    };
    Some(kind)
}

fn kind_label(kind: ObjectKind) -> &'static str {
    match kind {
        ObjectKind::DataSource => "Data source",
        ObjectKind::Catalog => "Catalog",
        ObjectKind::Schema => "Schema",
        ObjectKind::Table => "Table",
        ObjectKind::View => "View",
        ObjectKind::Column => "Column",
        ObjectKind::Procedure => "Procedure",
        ObjectKind::Function => "Function",
        ObjectKind::Sequence => "Sequence",
        ObjectKind::Constraint => "Constraint",
        ObjectKind::Index => "Index",
    }
}
