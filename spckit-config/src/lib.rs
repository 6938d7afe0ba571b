//! Configuration for the Spckit recommendation stack.
//!
//! Settings are read from environment variables through [`SpckitConfig::from_env`]
//! or, in tests, from any lookup function via [`SpckitConfig::from_lookup`].

#![warn(missing_docs, clippy::pedantic)]

mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use schema::SpckitConfig;
