// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Data definition statements

mod alter_table;
mod constraint;
mod create_table;
mod drop;

pub use alter_table::{AlterActionKind, AlterTableActionSpec, AlterTableModel};
pub use constraint::{ColumnConstraintSpec, ConstraintKind, ReferenceSpec};
pub use create_table::{ColumnSpec, CreateTableModel};
pub use drop::ObjectDropModel;
