#![forbid(unsafe_code)]

//! Test log output.

use std::sync::Once;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

static INIT: Once = Once::new();

/// Install a global subscriber writing to the test writer.
///
/// Filtered by `RUST_LOG`, defaulting to debug level for the alertkit
/// crates. Safe to call from every test; only the first call installs.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "alertkit_core=debug,alertkit_runtime=debug,alertkit_widgets=debug,alertkit_harness=debug",
            )
        });
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer().with_target(true))
            .try_init();
    });
}
