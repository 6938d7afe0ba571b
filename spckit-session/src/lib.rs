//! Recommendation session state machine.
//!
//! A [`RecommendationSession`] owns one user's conversation history, the latest
//! candidate list, the selected parts (one per category), and the optional
//! guided-build stage. It issues requests through a shared
//! [`RecommendationClient`](spckit_adapters::recommend::RecommendationClient) and
//! reports every change to a [`SessionObserver`].

#![warn(missing_docs, clippy::pedantic)]

mod lifecycle;
mod observer;
mod selection;
mod session;
mod stage;

pub use lifecycle::{Lifecycle, LifecycleError, LifecycleResult, SessionEvent, SessionState};
pub use observer::{CompositeSessionObserver, SessionObserver, TracingSessionObserver};
pub use selection::{SelectedParts, Selection};
pub use session::{
    IgnoreReason, RecommendationSession, SessionConfig, SessionSnapshot, SubmitOutcome,
};
pub use stage::{StageAdvance, StageProgress};
