//! Common fixtures for supervisor and event model integration tests.

pub mod pipeline;

use std::sync::Once;

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for test runs.
///
/// Call once at the beginning of tests. Set `ENABLE_TRACING=1` to view tracing
/// output:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
                )
                .try_init();
        }
    });
}
