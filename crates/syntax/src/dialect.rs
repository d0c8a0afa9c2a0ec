// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Support
//!
//! This module defines SQL dialects and the identifier rules the query model
//! needs from them.
//!
//! ## Dialect Families
//!
//! - **MySQL Family**: MySQL, TiDB, MariaDB
//!   - Backtick-quoted identifiers, names kept as typed
//! - **PostgreSQL Family**: PostgreSQL, CockroachDB
//!   - Double-quoted identifiers, unquoted names fold to lower case
//! - **Generic**: ANSI behaviour
//!   - Double-quoted identifiers, unquoted names fold to upper case
//!
//! ## Identifier Normalization
//!
//! [`Dialect::normalize_identifier`] turns an identifier as typed into the
//! form the catalog stores:
//!
//! ```
//! use sqlmodel_syntax::Dialect;
//!
//! assert_eq!(Dialect::PostgreSQL.normalize_identifier("Orders"), "orders");
//! assert_eq!(Dialect::PostgreSQL.normalize_identifier("\"Orders\""), "Orders");
//! assert_eq!(Dialect::MySQL.normalize_identifier("`Orders`"), "Orders");
//! assert_eq!(Dialect::Generic.normalize_identifier("orders"), "ORDERS");
//! ```

use serde::{Deserialize, Serialize};

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Dialect {
    /// MySQL (5.7, 8.0)
    MySQL,
    /// PostgreSQL (12, 14, 15+)
    PostgreSQL,
    /// TiDB (5.0, 6.0, 7.0, 8.0)
    TiDB,
    /// MariaDB (10.x, 11.x)
    MariaDB,
    /// CockroachDB (21.x, 22.x, 23.x)
    CockroachDB,
    /// ANSI SQL
    #[default]
    Generic,
}

/// Dialect family groupings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DialectFamily {
    MySQL,
    PostgreSQL,
    Ansi,
}

/// How a dialect stores unquoted identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierCase {
    Lower,
    Upper,
    AsIs,
}

impl Dialect {
    /// Returns the family this dialect belongs to
    pub fn family(&self) -> DialectFamily {
        match self {
            Dialect::MySQL | Dialect::TiDB | Dialect::MariaDB => DialectFamily::MySQL,
            Dialect::PostgreSQL | Dialect::CockroachDB => DialectFamily::PostgreSQL,
            Dialect::Generic => DialectFamily::Ansi,
        }
    }

    /// Characters that open (and close) a quoted identifier
    pub fn quote_chars(&self) -> &'static [char] {
        match self.family() {
            DialectFamily::MySQL => &['`', '"'],
            DialectFamily::PostgreSQL | DialectFamily::Ansi => &['"'],
        }
    }

    /// Default case applied to unquoted identifiers
    pub fn identifier_case(&self) -> IdentifierCase {
        match self.family() {
            DialectFamily::MySQL => IdentifierCase::AsIs,
            DialectFamily::PostgreSQL => IdentifierCase::Lower,
            DialectFamily::Ansi => IdentifierCase::Upper,
        }
    }

    pub fn is_quoted(&self, name: &str) -> bool {
        let mut chars = name.chars();
        match (chars.next(), chars.next_back()) {
            (Some(open), Some(close)) => open == close && self.quote_chars().contains(&open),
            _ => false,
        }
    }

    /// Strip identifier quotes, collapsing doubled quote characters inside
    pub fn unquote<'a>(&self, name: &'a str) -> std::borrow::Cow<'a, str> {
        if !self.is_quoted(name) {
            return std::borrow::Cow::Borrowed(name);
        }
        let quote = name.chars().next().unwrap_or('"');
        let inner = &name[quote.len_utf8()..name.len() - quote.len_utf8()];
        let doubled: String = [quote, quote].iter().collect();
        if inner.contains(&doubled) {
            std::borrow::Cow::Owned(inner.replace(&doubled, &quote.to_string()))
        } else {
            std::borrow::Cow::Borrowed(inner)
        }
    }

    /// Fold an unquoted identifier to the dialect's default case
    pub fn fold_case(&self, name: &str) -> String {
        match self.identifier_case() {
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::AsIs => name.to_string(),
        }
    }

    /// Identifier as the catalog stores it: quoted names lose their quotes
    /// and keep their case, unquoted names are case-folded
    pub fn normalize_identifier(&self, raw: &str) -> String {
        if self.is_quoted(raw) {
            self.unquote(raw).into_owned()
        } else {
            self.fold_case(raw)
        }
    }
}
