//! Tracing subscriber setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error returned when the global subscriber cannot be installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(#[from] Box<dyn std::error::Error + Send + Sync>);

/// Installs a formatted `tracing` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG` when set and from `default_directive`
/// otherwise, for example `"studydesk=info,warn"`.
///
/// # Errors
///
/// Returns [`TelemetryError`] when a global subscriber has already been set.
pub fn init_tracing(default_directive: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()?;
    Ok(())
}
