//! Tracing setup for binaries embedding the orchestration layer.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `genflow=info`. Call once at startup.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genflow=info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
