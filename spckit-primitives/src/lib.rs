//! Core shared types for the Spckit recommendation session.

#![warn(missing_docs, clippy::pedantic)]

mod category;
mod chat;
mod component;
mod error;
mod ids;
mod price;

/// Fixed build-stage vocabulary and selection keys.
pub use category::{BuildCategory, CategoryKey};
/// Conversation history entries.
pub use chat::{ChatRole, ChatTurn};
/// Hardware part candidates and the structured AI answer.
pub use component::{AiResponse, Component, InvalidComponent};
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Unique identifier for a recommendation session.
pub use ids::SessionId;
/// Price parsing and formatting helpers.
pub use price::{extract_price, format_price};
