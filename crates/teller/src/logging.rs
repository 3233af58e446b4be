//! Log output for test runs.
//!
//! Every page action emits `tracing` events; this module installs a
//! formatting subscriber so they show up in `cargo test` output.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "teller=info";

/// Install the global fmt subscriber.
///
/// Safe to call from every test: only the first call installs anything.
/// Output goes through the test writer so it is captured per test.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(false)
        .try_init();
}
