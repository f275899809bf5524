//! Tracing subscriber setup

use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install the global fmt subscriber. Verbosity follows `RUST_LOG` and
/// defaults to `info`.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("setting default subscriber failed: {}", e))
}
