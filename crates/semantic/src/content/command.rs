// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Client-side directives such as `@set x = 1`. They carry text only and
//! resolve nothing.

use sqlmodel_syntax::{SyntaxKind, SyntaxTree};

use crate::node::{NodeId, NodeTree};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandModel {
    name: String,
    parameters: Vec<String>,
}

impl CommandModel {
    pub(crate) fn from_tree(syntax: &SyntaxTree, tree: &NodeTree, root: NodeId) -> Self {
        let command = tree.node(root).syntax_node();
        let mut words = syntax
            .children_of_kind(command, SyntaxKind::Text)
            .map(|token| syntax.text(token).to_string());
        Self {
            name: words.next().unwrap_or_default(),
            parameters: words.collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_syntax::Dialect;
    use sqlmodel_test_utils::syntax_tree;

    #[test]
    fn test_command_words() {
        let syntax = syntax_tree("@set limit = 10", |b| {
            b.node(SyntaxKind::Command, |b| {
                b.text("@set");
                b.text("limit");
                b.text("=");
                b.text("10");
            });
        });
        let parts = crate::builder::build_model(&syntax, Dialect::Generic).unwrap();
        let command = CommandModel::from_tree(&syntax, &parts.tree, parts.tree.root());
        assert_eq!(command.name(), "@set");
        assert_eq!(command.parameters(), ["limit", "=", "10"]);
        assert!(parts.symbols.is_empty());
    }
}
