//! Shared error definitions for Spckit primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the primitives crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while manipulating primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided session identifier could not be parsed.
    #[error("invalid session id: {source}")]
    InvalidSessionId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// A category label did not match the fixed stage vocabulary.
    #[error("unknown build category `{label}`")]
    UnknownCategory {
        /// The offending label.
        label: String,
    },
}
