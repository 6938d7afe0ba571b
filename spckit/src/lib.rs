//! Spckit AI recommendation session SDK facade.
//!
//! Bundles the workspace crates behind feature flags so front-ends can pull in
//! only the pieces they render.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use spckit_primitives as primitives;

/// Session state machine (enabled by `session` feature).
#[cfg(feature = "session")]
pub use spckit_session as session;

/// Model adapters and the recommendation client (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use spckit_adapters as adapters;

/// Tracing subscriber setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use spckit_telemetry as telemetry;

/// Persona and request prompts (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use spckit_prompts as prompts;

/// Environment configuration (enabled by `config` feature).
#[cfg(feature = "config")]
pub use spckit_config as config;
