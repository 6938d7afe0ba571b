//! Guided build stage progression.

use serde::{Deserialize, Serialize};
use spckit_primitives::BuildCategory;

/// Result of [`crate::RecommendationSession::advance_stage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageAdvance {
    /// Moved to this category; the caller should request recommendations for it.
    Next(BuildCategory),
    /// The last stage was passed; the build is complete.
    Complete,
    /// Guided build is not enabled for this session.
    Disabled,
}

/// Position in the fixed category order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageProgress {
    current: BuildCategory,
    complete: bool,
}

impl StageProgress {
    /// Starts at the first category.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: BuildCategory::ALL[0],
            complete: false,
        }
    }

    /// Active category, or `None` once complete.
    #[must_use]
    pub const fn current(&self) -> Option<BuildCategory> {
        if self.complete {
            None
        } else {
            Some(self.current)
        }
    }

    /// Returns `true` after the last stage was passed.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Moves to the next category, or completes after the last one.
    pub fn advance(&mut self) -> StageAdvance {
        if self.complete {
            return StageAdvance::Complete;
        }
        match self.current.next() {
            Some(next) => {
                self.current = next;
                StageAdvance::Next(next)
            }
            None => {
                self.complete = true;
                StageAdvance::Complete
            }
        }
    }
}

impl Default for StageProgress {
    fn default() -> Self {
        Self::new()
    }
}
