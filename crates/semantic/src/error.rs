// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details
//
//! # Error types for the query model
//!
//! These errors report broken construction invariants. Problems found while
//! resolving names are never errors: they are recorded as diagnostics on the
//! [`RecognitionContext`](crate::RecognitionContext).

use sqlmodel_syntax::TextRange;
use thiserror::Error;

/// Result type alias for semantic operations
pub type SemanticResult<T> = Result<T, SemanticError>;

/// Errors that can occur while building or annotating a query model
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A child node overlaps one of its siblings
    #[error("Node at {range} overlaps sibling at {sibling}")]
    OverlappingChildren { range: TextRange, sibling: TextRange },

    /// A child node is not inside its parent
    #[error("Node range {range} is outside parent range {parent}")]
    InvalidRange { range: TextRange, parent: TextRange },

    /// A node's tail origin was already set
    #[error("Tail origin already set for node at {0}")]
    TailOriginAlreadySet(TextRange),

    /// Configuration could not be parsed
    #[error("Invalid recognition config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_overlap() {
        let err = SemanticError::OverlappingChildren {
            range: TextRange::new(3, 8),
            sibling: TextRange::new(0, 5),
        };
        assert_eq!(err.to_string(), "Node at 3..8 overlaps sibling at 0..5");
    }

    #[test]
    fn test_error_display_tail_origin() {
        let err = SemanticError::TailOriginAlreadySet(TextRange::new(0, 10));
        let msg = format!("{}", err);
        assert!(msg.contains("already set"));
        assert!(msg.contains("0..10"));
    }
}
