//! Change notifications delivered to presentation adapters.

use std::fmt;
use std::sync::Arc;

use spckit_primitives::{BuildCategory, ChatTurn, Component, SessionId};
use tracing::{debug, warn};

use crate::selection::SelectedParts;

/// Receives session state after each change.
///
/// Every method has a no-op default so adapters implement only what they render.
/// Callbacks run after the session lock is released, on the task that made the
/// change.
pub trait SessionObserver: Send + Sync {
    /// Conversation history changed.
    fn on_history_changed(&self, _session: SessionId, _history: &[ChatTurn]) {}

    /// Candidate list was replaced or cleared.
    fn on_candidates_changed(&self, _session: SessionId, _candidates: &[Component]) {}

    /// Selected parts changed; `total` is the recomputed price.
    fn on_selected_parts_changed(&self, _session: SessionId, _parts: &SelectedParts, _total: u64) {}

    /// Loading indicator toggled.
    fn on_loading_changed(&self, _session: SessionId, _loading: bool) {}

    /// A request failed; `message` is the localized text shown to the user.
    fn on_error(&self, _session: SessionId, _message: &str) {}

    /// Guided build stage moved. `None` with `complete` set means the build is done.
    fn on_stage_changed(&self, _session: SessionId, _stage: Option<BuildCategory>, _complete: bool) {
    }
}

/// Observer that mirrors session changes into the tracing system.
#[derive(Debug, Default)]
pub struct TracingSessionObserver;

impl SessionObserver for TracingSessionObserver {
    fn on_history_changed(&self, session: SessionId, history: &[ChatTurn]) {
        debug!(session_id = %session, turns = history.len(), "history changed");
    }

    fn on_candidates_changed(&self, session: SessionId, candidates: &[Component]) {
        debug!(session_id = %session, candidates = candidates.len(), "candidates changed");
    }

    fn on_selected_parts_changed(&self, session: SessionId, parts: &SelectedParts, total: u64) {
        debug!(session_id = %session, parts = parts.len(), total, "selected parts changed");
    }

    fn on_loading_changed(&self, session: SessionId, loading: bool) {
        debug!(session_id = %session, loading, "loading changed");
    }

    fn on_error(&self, session: SessionId, message: &str) {
        warn!(session_id = %session, message, "recommendation failed");
    }

    fn on_stage_changed(&self, session: SessionId, stage: Option<BuildCategory>, complete: bool) {
        debug!(session_id = %session, ?stage, complete, "stage changed");
    }
}

/// Composite observer that forwards notifications to a collection of observers.
#[derive(Default)]
pub struct CompositeSessionObserver {
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl fmt::Debug for CompositeSessionObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeSessionObserver")
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl CompositeSessionObserver {
    /// Creates a new composite observer from the supplied list.
    #[must_use]
    pub fn new<I>(observers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn SessionObserver>>,
    {
        Self {
            observers: observers.into_iter().collect(),
        }
    }

    /// Adds an observer to the composite set.
    pub fn push(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }
}

impl SessionObserver for CompositeSessionObserver {
    fn on_history_changed(&self, session: SessionId, history: &[ChatTurn]) {
        for observer in &self.observers {
            observer.on_history_changed(session, history);
        }
    }

    fn on_candidates_changed(&self, session: SessionId, candidates: &[Component]) {
        for observer in &self.observers {
            observer.on_candidates_changed(session, candidates);
        }
    }

    fn on_selected_parts_changed(&self, session: SessionId, parts: &SelectedParts, total: u64) {
        for observer in &self.observers {
            observer.on_selected_parts_changed(session, parts, total);
        }
    }

    fn on_loading_changed(&self, session: SessionId, loading: bool) {
        for observer in &self.observers {
            observer.on_loading_changed(session, loading);
        }
    }

    fn on_error(&self, session: SessionId, message: &str) {
        for observer in &self.observers {
            observer.on_error(session, message);
        }
    }

    fn on_stage_changed(&self, session: SessionId, stage: Option<BuildCategory>, complete: bool) {
        for observer in &self.observers {
            observer.on_stage_changed(session, stage, complete);
        }
    }
}
