//! Request lifecycle of a recommendation session.

use spckit_primitives::SessionId;
use thiserror::Error;
use tracing::debug;

/// States a session occupies while handling user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No request outstanding; a new message may be submitted.
    #[default]
    Idle,
    /// A recommendation request is in flight.
    AwaitingResponse,
}

impl SessionState {
    /// Returns `true` while a request is outstanding.
    #[must_use]
    pub const fn is_awaiting(self) -> bool {
        matches!(self, Self::AwaitingResponse)
    }
}

/// Events that trigger lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A non-empty user message was accepted and a request issued.
    Submit,
    /// The outstanding request finished, successfully or not.
    Resolve,
    /// The session was sent back to the entry view.
    Reset,
}

/// Lifecycle state manager.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    session_id: SessionId,
    state: SessionState,
}

impl Lifecycle {
    /// Constructs a lifecycle controller for the given session.
    #[must_use]
    pub const fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            state: SessionState::Idle,
        }
    }

    /// Returns the owning session identifier.
    #[must_use]
    pub const fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Applies a lifecycle event, returning the resulting state.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] when the supplied event is not
    /// allowed from the current state, most notably a second submit while awaiting.
    pub fn transition(&mut self, event: SessionEvent) -> LifecycleResult<SessionState> {
        let next = match (self.state, event) {
            (SessionState::Idle, SessionEvent::Submit) => Some(SessionState::AwaitingResponse),
            (SessionState::AwaitingResponse, SessionEvent::Resolve) | (_, SessionEvent::Reset) => {
                Some(SessionState::Idle)
            }
            _ => None,
        };

        let Some(next_state) = next else {
            return Err(LifecycleError::InvalidTransition {
                session_id: self.session_id,
                from: self.state,
                event,
            });
        };

        if next_state != self.state {
            debug!(
                session_id = %self.session_id,
                ?self.state,
                ?next_state,
                ?event,
                "session lifecycle transition"
            );
            self.state = next_state;
        }

        Ok(self.state)
    }
}

/// Errors emitted by the lifecycle controller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Transition was not permitted from the current state.
    #[error("invalid lifecycle transition from {from:?} via {event:?} for session {session_id}")]
    InvalidTransition {
        /// Identifier of the session whose transition failed.
        session_id: SessionId,
        /// State prior to the attempted transition.
        from: SessionState,
        /// Event that triggered the failure.
        event: SessionEvent,
    },
}

/// Result alias used for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;
