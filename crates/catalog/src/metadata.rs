// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata types for database schema information
//!
//! This module defines the types used to describe catalog objects:
//! object kinds, tables, columns and their data types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL data types (unified across dialects)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    // Numeric types
    Integer,
    BigInt,
    SmallInt,
    Decimal,
    Float,
    Double,

    // String types
    Varchar(Option<usize>),
    Char(Option<usize>),
    Text,

    // Binary types
    Blob,

    // Date/Time types
    Date,
    Time,
    Timestamp,

    Boolean,
    Json,
    Uuid,

    /// Declared with a type name this model does not know
    Other(String),

    /// No type information is available
    Unknown,
}

impl DataType {
    /// Map a declared SQL type name such as `VARCHAR(20)` to a [`DataType`]
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlmodel_catalog::DataType;
    ///
    /// assert_eq!(DataType::from_sql_name("int"), DataType::Integer);
    /// assert_eq!(DataType::from_sql_name("VARCHAR(20)"), DataType::Varchar(Some(20)));
    /// assert_eq!(DataType::from_sql_name("geometry"), DataType::Other("GEOMETRY".into()));
    /// ```
    pub fn from_sql_name(name: &str) -> Self {
        let upper = name.trim().to_ascii_uppercase();
        let (base, length) = match upper.split_once('(') {
            Some((base, rest)) => (
                base.trim().to_string(),
                rest.trim_end_matches(')')
                    .split(',')
                    .next()
                    .and_then(|n| n.trim().parse::<usize>().ok()),
            ),
            None => (upper.clone(), None),
        };

        match base.as_str() {
            "INT" | "INTEGER" | "INT4" | "MEDIUMINT" => DataType::Integer,
            "BIGINT" | "INT8" => DataType::BigInt,
            "SMALLINT" | "INT2" | "TINYINT" => DataType::SmallInt,
            "DECIMAL" | "NUMERIC" => DataType::Decimal,
            "FLOAT" | "REAL" | "FLOAT4" => DataType::Float,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" => DataType::Double,
            "VARCHAR" | "CHARACTER VARYING" => DataType::Varchar(length),
            "CHAR" | "CHARACTER" => DataType::Char(length),
            "TEXT" => DataType::Text,
            "BLOB" | "BYTEA" => DataType::Blob,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" => DataType::Timestamp,
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            "JSON" | "JSONB" => DataType::Json,
            "UUID" => DataType::Uuid,
            "" => DataType::Unknown,
            _ => DataType::Other(upper),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DataType::Unknown)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INTEGER"),
            DataType::BigInt => write!(f, "BIGINT"),
            DataType::SmallInt => write!(f, "SMALLINT"),
            DataType::Decimal => write!(f, "DECIMAL"),
            DataType::Float => write!(f, "FLOAT"),
            DataType::Double => write!(f, "DOUBLE"),
            DataType::Varchar(Some(n)) => write!(f, "VARCHAR({n})"),
            DataType::Varchar(None) => write!(f, "VARCHAR"),
            DataType::Char(Some(n)) => write!(f, "CHAR({n})"),
            DataType::Char(None) => write!(f, "CHAR"),
            DataType::Text => write!(f, "TEXT"),
            DataType::Blob => write!(f, "BLOB"),
            DataType::Date => write!(f, "DATE"),
            DataType::Time => write!(f, "TIME"),
            DataType::Timestamp => write!(f, "TIMESTAMP"),
            DataType::Boolean => write!(f, "BOOLEAN"),
            DataType::Json => write!(f, "JSON"),
            DataType::Uuid => write!(f, "UUID"),
            DataType::Other(name) => write!(f, "{name}"),
            DataType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Kind of a catalog object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    DataSource,
    Catalog,
    Schema,
    Table,
    View,
    Column,
    Procedure,
    Function,
    Sequence,
    Constraint,
    Index,
}

impl ObjectKind {
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ObjectKind::DataSource | ObjectKind::Catalog | ObjectKind::Schema
        )
    }

    /// Objects that expose rows
    pub fn is_table_like(self) -> bool {
        matches!(self, ObjectKind::Table | ObjectKind::View)
    }

    pub fn is_routine(self) -> bool {
        matches!(self, ObjectKind::Procedure | ObjectKind::Function)
    }
}

/// Table type classification
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TableType {
    #[default]
    Table,
    View,
    MaterializedView,
    Temporary,
    Other(String),
}

/// Reference to a table column (for foreign keys)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnReference {
    pub table: String,
    pub column: String,
}

/// Metadata for a database column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
    /// Whether the column is nullable
    pub nullable: bool,
    /// Default value (as SQL expression string)
    pub default_value: Option<String>,
    /// Column comment/description
    pub comment: Option<String>,
    /// Whether this is a primary key column
    pub is_primary_key: bool,
    /// Referenced column (if foreign key)
    pub references: Option<ColumnReference>,
}

impl ColumnMetadata {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            default_value: None,
            comment: None,
            is_primary_key: false,
            references: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Mark as primary key; primary key columns are never nullable
    pub fn with_primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self.nullable = false;
        self
    }

    pub fn with_foreign_key(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

/// Metadata for a database table or view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name
    pub name: String,
    /// Column definitions, in declaration order
    pub columns: Vec<ColumnMetadata>,
    /// Explicit primary key column list; overrides per-column flags when set
    pub primary_key: Option<Vec<String>>,
    /// Table comment/description
    pub comment: Option<String>,
    /// Table type (TABLE, VIEW, MATERIALIZED VIEW, etc.)
    pub table_type: TableType,
}

impl TableMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            comment: None,
            table_type: TableType::Table,
        }
    }

    pub fn with_columns(mut self, columns: Vec<ColumnMetadata>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Declare a (possibly composite) primary key
    pub fn with_primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_key = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn with_type(mut self, table_type: TableType) -> Self {
        self.table_type = table_type;
        self
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key column names, or `None` if the table has no primary key
    pub fn primary_key_columns(&self) -> Option<Vec<String>> {
        if let Some(pk) = &self.primary_key {
            return Some(pk.clone());
        }
        let flagged: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        (!flagged.is_empty()).then_some(flagged)
    }

    pub fn object_kind(&self) -> ObjectKind {
        match self.table_type {
            TableType::View | TableType::MaterializedView => ObjectKind::View,
            _ => ObjectKind::Table,
        }
    }
}
