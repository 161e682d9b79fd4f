//! Shared setup for the demo binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to info
/// for the SDK.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aptos_txn_sdk=info,demos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
