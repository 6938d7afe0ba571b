//! Prompt construction for recommendation requests.
//!
//! [`RecommendationPrompts`] combines the fixed persona instruction, the request
//! template, and an optional window of earlier conversation turns into the text
//! sent to the model.

#![warn(missing_docs, clippy::pedantic)]

pub mod context;
pub mod system;
pub mod template;

mod manager;

pub use context::ConversationWindow;
pub use manager::RecommendationPrompts;
pub use system::SystemInstruction;
pub use template::{PromptTemplate, TemplateError, TemplateResult};
