use spckit_adapters::traits::AdapterError;
use thiserror::Error;

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// None of the accepted credential variables was set.
    #[error("missing API credential: set one of {}", .variables.join(", "))]
    MissingCredential {
        /// Variables that were checked, in priority order.
        variables: &'static [&'static str],
    },

    /// A variable was set to a value that could not be used.
    #[error("invalid value for {variable}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        variable: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The model adapter rejected the resulting settings.
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl ConfigError {
    /// Convenience constructor for invalid values.
    #[must_use]
    pub fn invalid_value(variable: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            variable,
            reason: reason.into(),
        }
    }
}
