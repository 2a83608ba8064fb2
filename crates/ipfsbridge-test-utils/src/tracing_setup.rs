//! Tracing initialisation for tests.
//!
//! The subscriber is installed at most once per process, so every test may
//! call [`init_test_tracing`] without coordination.

use tracing_subscriber::EnvFilter;

/// Default directive used when `RUST_LOG` is unset: the client's own crates
/// at debug, everything else (hyper, reqwest, axum) at warn.
pub const DEFAULT_TEST_FILTER: &str = "warn,ipfsbridge_core=debug,ipfsbridge_config=debug";

/// Install a test-writer subscriber honouring `RUST_LOG`, falling back to
/// [`DEFAULT_TEST_FILTER`].
///
/// ```ignore
/// #[tokio::test]
/// async fn subscribe_logs() {
///     ipfsbridge_test_utils::tracing_setup::init_test_tracing();
///     // ...
/// }
/// ```
pub fn init_test_tracing() {
    init_test_tracing_with(DEFAULT_TEST_FILTER);
}

/// Like [`init_test_tracing`] with an explicit fallback directive.
pub fn init_test_tracing_with(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
