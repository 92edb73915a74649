#![forbid(unsafe_code)]

//! Test harness for alertkit.
//!
//! - [`SimulatedHost`]: a presentation host that runs custom transitions on
//!   a hand-advanced [`Timeline`](alertkit_runtime::Timeline).
//! - [`view_tree`]: JSON snapshot of a view hierarchy for assertions.
//! - [`init_test_logging`]: `tracing` output for test runs.

pub mod context;
pub mod host;
pub mod logging;
pub mod snapshot;

pub use context::SimContext;
pub use host::SimulatedHost;
pub use logging::init_test_logging;
pub use snapshot::{path_to, view_tree};
