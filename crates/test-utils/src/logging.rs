// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Log output for tests

use std::sync::Once;

use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Route `tracing` output to the test writer, filtered by `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_tracing() {
    INIT.call_once(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .finish();
        // another harness may have installed one already
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
