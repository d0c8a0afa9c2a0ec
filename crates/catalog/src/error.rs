// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for Catalog operations
//!
//! This module defines the error types raised by catalog collaborators.
//! The semantic layer never lets these escape a resolution pass: the name
//! resolver logs and swallows them, and DDL models attach them as the cause
//! of a recorded diagnostic.

use serde::Serialize;
use thiserror::Error;

/// Result type alias for Catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur during Catalog operations
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
pub enum CatalogError {
    /// Failed to connect to the database
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Metadata query failed
    #[error("Metadata query failed: {0}")]
    QueryFailed(String),

    /// Requested object was not found
    #[error("Object '{0}' not found")]
    ObjectNotFound(String),

    /// Permission denied for requested operation
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Object is disconnected and its metadata is unavailable
    #[error("Object '{0}' is offline")]
    Offline(String),

    /// The specified feature is not supported by this catalog implementation
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// The operation was canceled through the progress monitor
    #[error("Operation canceled")]
    Canceled,
}

impl CatalogError {
    /// Whether the failure is transient I/O rather than a definitive answer
    pub fn is_access_failure(&self) -> bool {
        matches!(
            self,
            CatalogError::ConnectionFailed(_)
                | CatalogError::QueryFailed(_)
                | CatalogError::PermissionDenied(_)
                | CatalogError::Offline(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CatalogError::ObjectNotFound("public.users".to_string());
        assert_eq!(err.to_string(), "Object 'public.users' not found");

        let err = CatalogError::PermissionDenied("schema secret".to_string());
        assert_eq!(err.to_string(), "Permission denied: schema secret");
    }

    #[test]
    fn test_access_failure_classification() {
        assert!(CatalogError::ConnectionFailed("refused".into()).is_access_failure());
        assert!(CatalogError::Offline("archive".into()).is_access_failure());
        assert!(!CatalogError::Canceled.is_access_failure());
        assert!(!CatalogError::NotSupported("search".into()).is_access_failure());
    }

    #[test]
    fn test_error_serializes() {
        let json = serde_json::to_string(&CatalogError::Canceled).unwrap();
        assert_eq!(json, "\"Canceled\"");
    }
}
