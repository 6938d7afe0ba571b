//! The per-user recommendation session.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use spckit_adapters::recommend::{FAILURE_MESSAGE, RecommendationClient};
use spckit_primitives::{BuildCategory, CategoryKey, ChatTurn, Component, SessionId};
use tracing::{debug, info, warn};

use crate::lifecycle::{Lifecycle, SessionEvent, SessionState};
use crate::observer::{SessionObserver, TracingSessionObserver};
use crate::selection::{SelectedParts, Selection};
use crate::stage::{StageAdvance, StageProgress};

/// Behavior switches for a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Walk the fixed category order and scope each request to the active stage.
    pub guided_build: bool,
}

impl SessionConfig {
    /// Enables or disables the guided build.
    #[must_use]
    pub const fn with_guided_build(mut self, enabled: bool) -> Self {
        self.guided_build = enabled;
        self
    }
}

/// Why a submitted message was not sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The message was blank after trimming.
    Empty,
    /// A request is already outstanding.
    Busy,
}

/// Outcome of [`RecommendationSession::submit_message`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was appended and no request was issued.
    Ignored(IgnoreReason),
    /// The model answered; these are the new candidates.
    Answered {
        /// Valid candidate components.
        candidates: Vec<Component>,
    },
    /// The request failed; `message` was appended to the history.
    Failed {
        /// Localized failure text.
        message: String,
    },
    /// The session was reset while the request was in flight and the reply was dropped.
    Discarded,
}

/// Serializable copy of the session state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub id: SessionId,
    /// Lifecycle state.
    pub state: SessionState,
    /// Conversation history, oldest first.
    pub history: Vec<ChatTurn>,
    /// Latest candidate list.
    pub candidates: Vec<Component>,
    /// Selected parts in display order.
    pub selected_parts: SelectedParts,
    /// Sum of the selected prices.
    pub total_price: u64,
    /// Active guided-build stage.
    pub stage: Option<BuildCategory>,
    /// Whether the guided build finished.
    pub build_complete: bool,
}

struct SessionInner {
    lifecycle: Lifecycle,
    history: Vec<ChatTurn>,
    candidates: Vec<Component>,
    selected: SelectedParts,
    stage: Option<StageProgress>,
}

impl SessionInner {
    fn new(id: SessionId, config: SessionConfig) -> Self {
        Self {
            lifecycle: Lifecycle::new(id),
            history: Vec::new(),
            candidates: Vec::new(),
            selected: SelectedParts::new(),
            stage: config.guided_build.then(StageProgress::new),
        }
    }

    const fn id(&self) -> SessionId {
        self.lifecycle.session_id()
    }

    fn stage_view(&self) -> (Option<BuildCategory>, bool) {
        self.stage
            .map_or((None, false), |stage| (stage.current(), stage.is_complete()))
    }

    fn resolve_pending(&mut self, text: &str) {
        match self.history.iter_mut().rev().find(|turn| turn.is_pending()) {
            Some(turn) => {
                turn.resolve(text);
            }
            None => self.history.push(ChatTurn::model(text)),
        }
    }
}

/// Settles a `submit_message` call whose future was dropped mid-request.
///
/// The pending turn gets the failure text and the lifecycle returns to idle,
/// unless the session was reset in the meantime.
struct PendingReply<'a> {
    session: &'a RecommendationSession,
    id: SessionId,
    settled: bool,
}

impl Drop for PendingReply<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let history = {
            let Ok(mut inner) = self.session.inner.lock() else {
                return;
            };
            if inner.id() != self.id {
                return;
            }
            inner.resolve_pending(FAILURE_MESSAGE);
            if let Err(err) = inner.lifecycle.transition(SessionEvent::Resolve) {
                warn!(session_id = %self.id, error = %err, "unexpected lifecycle state on cancel");
            }
            inner.history.clone()
        };
        warn!(session_id = %self.id, "request cancelled before the reply arrived");

        let observer = &self.session.observer;
        observer.on_history_changed(self.id, &history);
        observer.on_error(self.id, FAILURE_MESSAGE);
        observer.on_loading_changed(self.id, false);
    }
}

/// One user's conversation, candidates, selections and stage progress.
///
/// All methods take `&self`; state lives behind a mutex that is never held
/// across the outbound request. Observers are notified after the lock is
/// released.
pub struct RecommendationSession {
    config: SessionConfig,
    client: Arc<RecommendationClient>,
    observer: Arc<dyn SessionObserver>,
    inner: Mutex<SessionInner>,
}

impl fmt::Debug for RecommendationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("RecommendationSession");
        if let Ok(inner) = self.inner.lock() {
            debug.field("id", &inner.id());
        }
        debug.field("config", &self.config).finish_non_exhaustive()
    }
}

impl RecommendationSession {
    /// Creates a session that reports changes to the tracing system.
    #[must_use]
    pub fn new(client: Arc<RecommendationClient>, config: SessionConfig) -> Self {
        Self::with_observer(client, config, Arc::new(TracingSessionObserver))
    }

    /// Creates a session that reports changes to `observer`.
    #[must_use]
    pub fn with_observer(
        client: Arc<RecommendationClient>,
        config: SessionConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let id = SessionId::random();
        info!(session_id = %id, guided_build = config.guided_build, "session created");
        Self {
            config,
            client,
            observer,
            inner: Mutex::new(SessionInner::new(id, config)),
        }
    }

    /// Returns the session identifier.
    ///
    /// A new identifier is issued on every [`reset`](Self::reset).
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.lock().id()
    }

    /// Returns the behavior switches.
    #[must_use]
    pub const fn config(&self) -> SessionConfig {
        self.config
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session state poisoned")
    }

    /// Sends a user message and waits for the recommendation.
    ///
    /// Blank messages and messages sent while a request is outstanding are
    /// ignored without touching the history. Otherwise the user turn and a
    /// pending model turn are appended, the request is issued (scoped to the
    /// active stage under guided build), and the pending turn is replaced with
    /// the analysis or the localized failure message.
    ///
    /// If the returned future is dropped before the reply is applied, the
    /// pending turn is resolved with the failure message and the session
    /// becomes idle again.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub async fn submit_message(&self, text: &str) -> SubmitOutcome {
        let message = text.trim();
        if message.is_empty() {
            return SubmitOutcome::Ignored(IgnoreReason::Empty);
        }

        let (id, earlier, filter, history) = {
            let mut inner = self.lock();
            let id = inner.id();
            if let Err(err) = inner.lifecycle.transition(SessionEvent::Submit) {
                debug!(session_id = %id, error = %err, "message ignored while awaiting");
                return SubmitOutcome::Ignored(IgnoreReason::Busy);
            }
            let earlier = inner.history.clone();
            inner.history.push(ChatTurn::user(message));
            inner.history.push(ChatTurn::pending_model());
            let (filter, _) = inner.stage_view();
            (id, earlier, filter, inner.history.clone())
        };
        let mut pending = PendingReply {
            session: self,
            id,
            settled: false,
        };
        self.observer.on_history_changed(id, &history);
        self.observer.on_loading_changed(id, true);

        let result = self
            .client
            .request_recommendation_with_history(&earlier, message, filter)
            .await;
        pending.settled = true;

        let (outcome, history, candidates) = {
            let mut inner = self.lock();
            if inner.id() != id {
                info!(session_id = %id, "discarding reply that arrived after reset");
                return SubmitOutcome::Discarded;
            }

            let outcome = match result {
                Ok(response) => {
                    inner.resolve_pending(&response.analysis);
                    inner.candidates.clone_from(&response.components);
                    SubmitOutcome::Answered {
                        candidates: response.components,
                    }
                }
                Err(err) => {
                    let message = err.user_message().to_owned();
                    inner.resolve_pending(&message);
                    SubmitOutcome::Failed { message }
                }
            };
            if let Err(err) = inner.lifecycle.transition(SessionEvent::Resolve) {
                warn!(session_id = %id, error = %err, "unexpected lifecycle state on reply");
            }
            let candidates = matches!(outcome, SubmitOutcome::Answered { .. })
                .then(|| inner.candidates.clone());
            (outcome, inner.history.clone(), candidates)
        };

        self.observer.on_history_changed(id, &history);
        if let Some(candidates) = candidates {
            self.observer.on_candidates_changed(id, &candidates);
        }
        if let SubmitOutcome::Failed { message } = &outcome {
            self.observer.on_error(id, message);
        }
        self.observer.on_loading_changed(id, false);
        outcome
    }

    /// Puts `component` into its category slot, replacing any previous choice.
    ///
    /// Selection is allowed for any category regardless of the active stage.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn select_component(&self, component: Component) -> Selection {
        let (id, selection, parts) = {
            let mut inner = self.lock();
            let selection = inner.selected.select(component);
            (inner.id(), selection, inner.selected.clone())
        };
        if selection != Selection::Unchanged {
            debug!(session_id = %id, total = parts.total(), "component selected");
            self.observer
                .on_selected_parts_changed(id, &parts, parts.total());
        }
        selection
    }

    /// Removes the selection for `category` (any alias, case-insensitive).
    ///
    /// Returns `true` when something was removed.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn remove_component(&self, category: &str) -> bool {
        let key = CategoryKey::from_label(category);
        let removed = {
            let mut inner = self.lock();
            inner
                .selected
                .remove(&key)
                .map(|_| (inner.id(), inner.selected.clone()))
        };
        match removed {
            Some((id, parts)) => {
                debug!(session_id = %id, category = %key, "component removed");
                self.observer
                    .on_selected_parts_changed(id, &parts, parts.total());
                true
            }
            None => false,
        }
    }

    /// Moves the guided build to the next category.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn advance_stage(&self) -> StageAdvance {
        let (id, advance, stage, complete) = {
            let mut inner = self.lock();
            let id = inner.id();
            let Some(progress) = inner.stage.as_mut() else {
                return StageAdvance::Disabled;
            };
            let advance = progress.advance();
            (id, advance, progress.current(), progress.is_complete())
        };
        info!(session_id = %id, ?stage, complete, "stage advanced");
        self.observer.on_stage_changed(id, stage, complete);
        advance
    }

    /// Returns the session to its initial state under a fresh identifier.
    ///
    /// A reply still in flight belongs to the previous identifier and is
    /// discarded when it arrives.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn reset(&self) {
        let (previous, id, was_loading, stage, complete) = {
            let mut inner = self.lock();
            let previous = inner.id();
            let was_loading = inner.lifecycle.state().is_awaiting();
            if let Err(err) = inner.lifecycle.transition(SessionEvent::Reset) {
                warn!(session_id = %previous, error = %err, "unexpected lifecycle state on reset");
            }
            *inner = SessionInner::new(SessionId::random(), self.config);
            let (stage, complete) = inner.stage_view();
            (previous, inner.id(), was_loading, stage, complete)
        };
        info!(session_id = %id, previous = %previous, was_loading, "session reset");

        let parts = SelectedParts::new();
        self.observer.on_history_changed(id, &[]);
        self.observer.on_candidates_changed(id, &[]);
        self.observer.on_selected_parts_changed(id, &parts, 0);
        if was_loading {
            self.observer.on_loading_changed(id, false);
        }
        if self.config.guided_build {
            self.observer.on_stage_changed(id, stage, complete);
        }
    }

    /// Returns the conversation history.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn history(&self) -> Vec<ChatTurn> {
        self.lock().history.clone()
    }

    /// Returns the latest candidate list.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn candidates(&self) -> Vec<Component> {
        self.lock().candidates.clone()
    }

    /// Returns the selected parts.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn selected_parts(&self) -> SelectedParts {
        self.lock().selected.clone()
    }

    /// Returns the summed price of the selected parts.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn total_price(&self) -> u64 {
        self.lock().selected.total()
    }

    /// Returns the active guided-build category.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn current_stage(&self) -> Option<BuildCategory> {
        self.lock().stage_view().0
    }

    /// Returns `true` once the guided build passed its last stage.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn is_build_complete(&self) -> bool {
        self.lock().stage_view().1
    }

    /// Returns `true` while a request is outstanding.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().lifecycle.state().is_awaiting()
    }

    /// Returns the lifecycle state.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().lifecycle.state()
    }

    /// Captures a serializable copy of the session.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let inner = self.lock();
        let (stage, build_complete) = inner.stage_view();
        SessionSnapshot {
            id: inner.id(),
            state: inner.lifecycle.state(),
            history: inner.history.clone(),
            candidates: inner.candidates.clone(),
            selected_parts: inner.selected.clone(),
            total_price: inner.selected.total(),
            stage,
            build_complete,
        }
    }
}
