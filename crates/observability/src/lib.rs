//! Process-wide tracing setup for binaries and tests that drive the engine.
//!
//! Library crates only emit events through `tracing`; installing a subscriber
//! is left to whoever owns the process.

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init();
}

/// Initialize with an explicit filter directive instead of `RUST_LOG`.
pub fn init_with_filter(directives: &str) {
    tracing::init_with_filter(directives);
}

/// Subscriber configuration (filters, layers).
pub mod tracing;
