// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Progress monitors
//!
//! A monitor carries the cooperative cancellation flag polled by traversal
//! and name resolution, and tells catalog implementations whether they may
//! reach the network or must answer from cached metadata only.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub trait ProgressMonitor: Send + Sync {
    fn is_canceled(&self) -> bool;

    /// Metadata-cache-only mode, no network access
    fn is_force_cache_usage(&self) -> bool {
        false
    }
}

/// Monitor backed by a shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct DefaultProgressMonitor {
    canceled: Arc<AtomicBool>,
}

impl DefaultProgressMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; every clone observes it
    pub fn cancel(&self) {
        self.canceled.store(true, Ordering::Release);
    }
}

impl ProgressMonitor for DefaultProgressMonitor {
    fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }
}

/// Wrapper forcing metadata-cache-only mode on another monitor
#[derive(Clone)]
pub struct CachingProgressMonitor {
    inner: Arc<dyn ProgressMonitor>,
}

impl CachingProgressMonitor {
    pub fn new(inner: Arc<dyn ProgressMonitor>) -> Self {
        Self { inner }
    }
}

impl ProgressMonitor for CachingProgressMonitor {
    fn is_canceled(&self) -> bool {
        self.inner.is_canceled()
    }

    fn is_force_cache_usage(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let monitor = DefaultProgressMonitor::new();
        let clone = monitor.clone();
        assert!(!clone.is_canceled());
        monitor.cancel();
        assert!(clone.is_canceled());
    }

    #[test]
    fn test_caching_monitor_forwards_cancellation() {
        let inner = DefaultProgressMonitor::new();
        let caching = CachingProgressMonitor::new(Arc::new(inner.clone()));
        assert!(caching.is_force_cache_usage());
        assert!(!inner.is_force_cache_usage());
        inner.cancel();
        assert!(caching.is_canceled());
    }
}
