//! Conversation history entries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Author of a chat turn.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Text typed by the user.
    User,
    /// Reply produced by the recommendation model.
    Model,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::User => "user",
            Self::Model => "model",
        })
    }
}

/// One entry of the append-only conversation history.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ChatTurn {
    role: ChatRole,
    text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pending: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl ChatTurn {
    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
            pending: false,
        }
    }

    /// Creates a completed model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
            pending: false,
        }
    }

    /// Creates the loading placeholder shown while a reply is outstanding.
    #[must_use]
    pub fn pending_model() -> Self {
        Self {
            role: ChatRole::Model,
            text: String::new(),
            pending: true,
        }
    }

    /// Returns the author role.
    #[must_use]
    pub const fn role(&self) -> ChatRole {
        self.role
    }

    /// Returns the turn text. Empty for a pending placeholder.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns `true` for the loading placeholder.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Fills a pending placeholder with the final reply.
    ///
    /// Returns `false` and leaves the turn untouched when it is not a placeholder.
    pub fn resolve(&mut self, text: impl Into<String>) -> bool {
        if !self.pending {
            return false;
        }
        self.text = text.into();
        self.pending = false;
        true
    }
}
