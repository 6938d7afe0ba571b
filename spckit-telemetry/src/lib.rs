//! Tracing setup shared by Spckit binaries.
//!
//! Libraries in the workspace only emit `tracing` events; a binary calls
//! [`init_tracing`] once to install the subscriber. Output goes to stderr so it
//! never interleaves with a terminal chat on stdout.

#![warn(missing_docs, clippy::pedantic)]

use std::io;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

/// Variable consulted first for the filter directive.
pub const LOG_ENV_VAR: &str = "SPCKIT_LOG";

/// Variable consulted when [`LOG_ENV_VAR`] is unset.
pub const FALLBACK_LOG_ENV_VAR: &str = "RUST_LOG";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive could not be parsed.
    #[error("invalid log filter `{directive}`: {reason}")]
    InvalidFilter {
        /// Directive that failed to parse.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber was already installed.
    #[error("tracing subscriber already installed: {reason}")]
    AlreadyInstalled {
        /// Underlying message.
        reason: String,
    },
}

/// Result alias for telemetry setup.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line events.
    #[default]
    Compact,
    /// Multi-line, human-oriented events.
    Pretty,
}

/// Subscriber options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Directive used when neither environment variable is set.
    pub default_directive: String,
    /// Output layout.
    pub format: LogFormat,
    /// Include the event target (module path).
    pub with_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_directive: "info".to_owned(),
            format: LogFormat::Compact,
            with_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Resolves the filter directive: `SPCKIT_LOG`, then `RUST_LOG`, then the default.
    #[must_use]
    pub fn directive_from<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        [LOG_ENV_VAR, FALLBACK_LOG_ENV_VAR]
            .into_iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()))
            .unwrap_or_else(|| self.default_directive.clone())
    }
}

/// Builds the filter for `directive`, quieting the HTTP stack below `warn`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the directive does not parse.
pub fn build_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    let invalid = |reason: String| TelemetryError::InvalidFilter {
        directive: directive.to_owned(),
        reason,
    };
    let filter = EnvFilter::try_new(directive).map_err(|err| invalid(err.to_string()))?;
    let hyper = "hyper=warn"
        .parse::<Directive>()
        .map_err(|err| invalid(format!("{err}")))?;
    Ok(filter.add_directive(hyper))
}

/// Installs the global subscriber using the process environment.
///
/// # Errors
///
/// Returns an error when the filter is invalid or a subscriber is already set.
pub fn init_tracing(config: &TelemetryConfig) -> TelemetryResult<()> {
    let directive = config.directive_from(|name| std::env::var(name).ok());
    let filter = build_filter(&directive)?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.with_target)
        .with_writer(io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.map_err(|err| TelemetryError::AlreadyInstalled {
        reason: err.to_string(),
    })
}
