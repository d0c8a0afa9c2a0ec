// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Recognition context
//!
//! The only channel through which a resolution pass reports problems.
//! Warnings cover names that do not resolve and structural mismatches;
//! errors cover catalog failures that prevented a step from running.

use std::sync::Arc;

use sqlmodel_catalog::{CatalogError, ProgressMonitor};
use sqlmodel_syntax::TextRange;
use tracing::debug;

use crate::config::RecognitionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found in the statement
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub message: String,
    pub severity: Severity,
    /// Catalog failure behind an error
    pub cause: Option<CatalogError>,
}

/// Per-pass state shared by every resolution step
pub struct RecognitionContext {
    monitor: Arc<dyn ProgressMonitor>,
    config: RecognitionConfig,
    treat_errors_as_warnings: bool,
    diagnostics: Vec<Diagnostic>,
}

impl RecognitionContext {
    pub fn new(monitor: Arc<dyn ProgressMonitor>, config: RecognitionConfig) -> Self {
        Self {
            monitor,
            treat_errors_as_warnings: config.treat_errors_as_warnings,
            config,
            diagnostics: Vec::new(),
        }
    }

    pub fn monitor(&self) -> &Arc<dyn ProgressMonitor> {
        &self.monitor
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    pub fn is_canceled(&self) -> bool {
        self.monitor.is_canceled()
    }

    pub fn set_treat_errors_as_warnings(&mut self, value: bool) {
        self.treat_errors_as_warnings = value;
    }

    pub fn append_warning(&mut self, range: TextRange, message: impl Into<String>) {
        let message = message.into();
        debug!(%range, %message, "Recognition warning");
        self.diagnostics.push(Diagnostic {
            range,
            message,
            severity: Severity::Warning,
            cause: None,
        });
    }

    pub fn append_error(
        &mut self,
        range: TextRange,
        message: impl Into<String>,
        cause: Option<CatalogError>,
    ) {
        let message = message.into();
        let severity = if self.treat_errors_as_warnings {
            Severity::Warning
        } else {
            Severity::Error
        };
        debug!(%range, %message, ?severity, "Recognition error");
        self.diagnostics.push(Diagnostic {
            range,
            message,
            severity,
            cause,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlmodel_catalog::DefaultProgressMonitor;

    fn context(config: RecognitionConfig) -> RecognitionContext {
        RecognitionContext::new(Arc::new(DefaultProgressMonitor::new()), config)
    }

    #[test]
    fn test_warnings_and_errors_are_separated() {
        let mut ctx = context(RecognitionConfig::default());
        ctx.append_warning(TextRange::new(0, 1), "Table 'x' not found");
        ctx.append_error(
            TextRange::new(2, 3),
            "Failed to read primary key",
            Some(CatalogError::QueryFailed("timeout".into())),
        );
        assert_eq!(ctx.warnings().count(), 1);
        assert_eq!(ctx.errors().count(), 1);
        assert_eq!(
            ctx.errors().next().unwrap().cause,
            Some(CatalogError::QueryFailed("timeout".into()))
        );
    }

    #[test]
    fn test_errors_degrade_to_warnings() {
        let mut ctx = context(RecognitionConfig::default().with_errors_as_warnings(true));
        ctx.append_error(TextRange::new(0, 1), "boom", None);
        assert_eq!(ctx.errors().count(), 0);
        assert_eq!(ctx.warnings().count(), 1);

        ctx.set_treat_errors_as_warnings(false);
        ctx.append_error(TextRange::new(0, 1), "boom", None);
        assert_eq!(ctx.errors().count(), 1);
    }

    #[test]
    fn test_take_diagnostics() {
        let mut ctx = context(RecognitionConfig::default());
        ctx.append_warning(TextRange::new(0, 1), "w");
        assert_eq!(ctx.take_diagnostics().len(), 1);
        assert!(ctx.diagnostics().is_empty());
    }
}
