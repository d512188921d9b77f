use anyhow::{anyhow, Error};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Console logging, filtered by `RUST_LOG` (`info` when unset).
pub fn init_local_telemetry() -> Result<(), Error> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow!("failed to install the tracing subscriber: {}", e))?;

    Ok(())
}
