//! Logging setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,storyreel=debug";

/// Filter used when `RUST_LOG` is unset; `verbose` raises everything to debug.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { DEFAULT_FILTER }
}

/// Initialize console logging.
///
/// `RUST_LOG` takes precedence over the default filter.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_console_telemetry(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}
