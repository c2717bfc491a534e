//! Tracing subscriber setup
//!
//! The engine itself only emits `tracing` events; the embedding service
//! decides where they go. This helper installs the default fmt
//! subscriber for services (and ad-hoc tools) that want the standard
//! setup: env-filter driven, INFO by default.

/// Initialize the global tracing subscriber
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}
