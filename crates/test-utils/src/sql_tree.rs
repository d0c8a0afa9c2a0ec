// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Syntax trees for tests, anchored on the SQL text
//!
//! Tests describe the tree shape; token ranges are found by searching the
//! text forward from the previous token, so no offsets are written by hand.
//!
//! ```
//! use sqlmodel_syntax::SyntaxKind;
//! use sqlmodel_test_utils::syntax_tree;
//!
//! let tree = syntax_tree("SELECT a FROM t", |b| {
//!     b.node(SyntaxKind::Select, |b| {
//!         b.keyword("SELECT");
//!         b.node(SyntaxKind::SelectList, |b| {
//!             b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["a"]));
//!         });
//!         b.node(SyntaxKind::FromClause, |b| {
//!             b.keyword("FROM");
//!             b.table_ref(&["t"], None);
//!         });
//!     });
//! });
//! assert_eq!(tree.root().kind, SyntaxKind::Select);
//! ```

use std::sync::Arc;

use sqlmodel_syntax::{SyntaxKind, SyntaxNodeId, SyntaxTree, SyntaxTreeBuilder, TextRange};

/// Build a syntax tree over `sql`
///
/// # Panics
///
/// Panics if a token is not found in the remaining text or the tree is
/// unbalanced.
pub fn syntax_tree(sql: &str, build: impl FnOnce(&mut SqlTreeBuilder)) -> Arc<SyntaxTree> {
    let mut builder = SqlTreeBuilder::new(sql);
    build(&mut builder);
    Arc::new(builder.finish())
}

pub struct SqlTreeBuilder {
    inner: SyntaxTreeBuilder,
    cursor: usize,
}

impl SqlTreeBuilder {
    pub fn new(sql: &str) -> Self {
        Self {
            inner: SyntaxTreeBuilder::new(sql),
            cursor: 0,
        }
    }

    pub fn finish(self) -> SyntaxTree {
        self.inner.finish().expect("test syntax tree is well formed")
    }

    /// Inner node whose children are added by `children`
    pub fn node(&mut self, kind: SyntaxKind, children: impl FnOnce(&mut Self)) {
        self.inner.start_node(kind);
        children(self);
        self.inner.finish_node();
    }

    pub fn keyword(&mut self, word: &str) {
        self.token(SyntaxKind::Keyword, word);
    }

    /// Identifier token; quoted when it starts with a quote character
    pub fn ident(&mut self, name: &str) {
        let kind = if name.starts_with(['"', '`', '[']) {
            SyntaxKind::QuotedIdentifier
        } else {
            SyntaxKind::Identifier
        };
        self.token(kind, name);
    }

    pub fn punct(&mut self, punct: &str) {
        self.token(SyntaxKind::Punctuation, punct);
    }

    pub fn op(&mut self, op: &str) {
        self.token(SyntaxKind::Operator, op);
    }

    pub fn text(&mut self, text: &str) {
        self.token(SyntaxKind::Text, text);
    }

    pub fn literal(&mut self, text: &str) {
        self.node(SyntaxKind::Literal, |b| b.text(text));
    }

    pub fn qualified_name(&mut self, parts: &[&str]) {
        self.node(SyntaxKind::QualifiedName, |b| b.dotted(parts));
    }

    pub fn column_ref(&mut self, parts: &[&str]) {
        self.node(SyntaxKind::ColumnReference, |b| b.dotted(parts));
    }

    /// `name [alias]`; an `AS` between them is skipped over
    pub fn table_ref(&mut self, parts: &[&str], alias: Option<&str>) {
        self.node(SyntaxKind::TableReference, |b| {
            b.dotted(parts);
            if let Some(alias) = alias {
                b.alias(alias);
            }
        });
    }

    pub fn alias(&mut self, name: &str) {
        self.node(SyntaxKind::Alias, |b| b.ident(name));
    }

    /// `(a, b, ...)`
    pub fn column_list(&mut self, names: &[&str]) {
        self.node(SyntaxKind::ColumnList, |b| {
            b.punct("(");
            for (i, name) in names.iter().enumerate() {
                if i > 0 {
                    b.punct(",");
                }
                b.ident(name);
            }
            b.punct(")");
        });
    }

    fn dotted(&mut self, parts: &[&str]) {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                self.punct(".");
            }
            self.ident(part);
        }
    }

    fn token(&mut self, kind: SyntaxKind, text: &str) -> SyntaxNodeId {
        let start = self.find(text);
        let range = TextRange::new(start, start + text.len());
        self.cursor = range.end;
        self.inner.token(kind, range)
    }

    /// Next occurrence of `text` at or after the cursor; words must stand alone
    fn find(&self, text: &str) -> usize {
        let source = self.inner.source();
        let is_word = text.chars().all(|c| c.is_alphanumeric() || c == '_');
        let is_word_char = |c: char| c.is_alphanumeric() || c == '_';
        let mut from = self.cursor;
        while let Some(found) = source[from..].find(text) {
            let start = from + found;
            let end = start + text.len();
            let standalone = !is_word
                || (!source[..start].ends_with(is_word_char) && !source[end..].starts_with(is_word_char));
            if standalone {
                return start;
            }
            from = end;
        }
        panic!(
            "`{text}` not found after offset {} in `{source}`",
            self.cursor
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_match_whole_tokens_only() {
        let tree = syntax_tree("SELECT ab, a FROM t", |b| {
            b.node(SyntaxKind::Select, |b| {
                b.keyword("SELECT");
                b.node(SyntaxKind::SelectList, |b| {
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["ab"]));
                    b.punct(",");
                    b.node(SyntaxKind::SelectItem, |b| b.column_ref(&["a"]));
                });
            });
        });
        let list = tree.child_of_kind(tree.root_id(), SyntaxKind::SelectList).unwrap();
        let items: Vec<_> = tree.children_of_kind(list, SyntaxKind::SelectItem).collect();
        assert_eq!(tree.range(items[1]), TextRange::new(11, 12));
    }

    #[test]
    fn test_quoted_identifiers() {
        let tree = syntax_tree(r#"SELECT "Name" FROM t"#, |b| {
            b.node(SyntaxKind::Select, |b| {
                b.keyword("SELECT");
                b.node(SyntaxKind::SelectList, |b| b.column_ref(&[r#""Name""#]));
            });
        });
        let list = tree.child_of_kind(tree.root_id(), SyntaxKind::SelectList).unwrap();
        let column = tree.children(list)[0];
        let token = tree.children(column)[0];
        assert_eq!(tree.kind(token), SyntaxKind::QuotedIdentifier);
        assert_eq!(tree.text(token), r#""Name""#);
    }
}
