// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Recognition Configuration
//!
//! Tuning knobs for a resolution pass. The configuration is plain data and
//! can be loaded from the JSON settings an editor integration sends:
//!
//! ```
//! use sqlmodel_semantic::RecognitionConfig;
//!
//! let config = RecognitionConfig::from_json(r#"{ "use_structure_assistant": false }"#).unwrap();
//! assert!(!config.use_structure_assistant);
//! assert_eq!(config.assistant_max_results, 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SemanticError, SemanticResult};

/// Options controlling name recognition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Fall back to the data source's fuzzy object search for single-part names
    pub use_structure_assistant: bool,

    /// Candidates requested from the structure assistant
    pub assistant_max_results: usize,

    /// Retry a failed lookup once with quotes stripped and case folded
    pub retry_with_normalized_names: bool,

    /// Report errors as warnings
    pub treat_errors_as_warnings: bool,

    /// Look function call names up as catalog routines
    pub resolve_routine_names: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            use_structure_assistant: true,
            assistant_max_results: 2,
            retry_with_normalized_names: true,
            treat_errors_as_warnings: false,
            resolve_routine_names: true,
        }
    }
}

impl RecognitionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> SemanticResult<Self> {
        serde_json::from_str(json).map_err(|e| SemanticError::InvalidConfig(e.to_string()))
    }

    pub fn with_structure_assistant(mut self, enabled: bool) -> Self {
        self.use_structure_assistant = enabled;
        self
    }

    pub fn with_normalized_retry(mut self, enabled: bool) -> Self {
        self.retry_with_normalized_names = enabled;
        self
    }

    pub fn with_errors_as_warnings(mut self, enabled: bool) -> Self {
        self.treat_errors_as_warnings = enabled;
        self
    }

    pub fn with_routine_resolution(mut self, enabled: bool) -> Self {
        self.resolve_routine_names = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecognitionConfig::default();
        assert!(config.use_structure_assistant);
        assert_eq!(config.assistant_max_results, 2);
        assert!(config.retry_with_normalized_names);
        assert!(!config.treat_errors_as_warnings);
        assert!(config.resolve_routine_names);
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            RecognitionConfig::from_json(r#"{"treat_errors_as_warnings": true, "assistant_max_results": 5}"#)
                .unwrap();
        assert!(config.treat_errors_as_warnings);
        assert_eq!(config.assistant_max_results, 5);
        assert!(config.use_structure_assistant);
    }

    #[test]
    fn test_from_json_invalid() {
        let err = RecognitionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SemanticError::InvalidConfig(_)));
    }

    #[test]
    fn test_builders() {
        let config = RecognitionConfig::new()
            .with_structure_assistant(false)
            .with_normalized_retry(false)
            .with_routine_resolution(false);
        assert!(!config.use_structure_assistant);
        assert!(!config.retry_with_normalized_names);
        assert!(!config.resolve_routine_names);
    }
}
