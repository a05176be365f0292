//! Process-wide `tracing` subscriber setup.
//!
//! The filter directive comes from `RUST_LOG`, then `LOG_LEVEL`, then
//! defaults to `info`. Library code only emits events; installing the
//! subscriber is left to binaries and embedding hosts.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Filter directive used when no environment override is present.
pub const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Picks the filter directive from the `RUST_LOG` and `LOG_LEVEL` values.
///
/// Blank values are treated as unset.
#[must_use]
pub fn resolve_filter(rust_log: Option<&str>, log_level: Option<&str>) -> String {
    [rust_log, log_level]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_owned()
}

/// Installs a formatting subscriber filtered by the environment.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for an unparsable directive and
/// [`TelemetryError::Install`] when a global subscriber is already set.
pub fn init() -> Result<(), TelemetryError> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let directive = resolve_filter(rust_log.as_deref(), log_level.as_deref());
    let filter =
        EnvFilter::try_new(&directive).map_err(|err| TelemetryError::InvalidFilter {
            directive: directive.clone(),
            reason: err.to_string(),
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
