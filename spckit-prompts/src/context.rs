//! Window of earlier turns prepended to a new request.

use std::fmt::Write;

use spckit_primitives::{ChatRole, ChatTurn};

/// Characters kept from each earlier turn before it is elided.
const DEFAULT_TURN_CHAR_LIMIT: usize = 600;

/// Selects which earlier turns accompany a new request.
///
/// A window of zero turns sends only the latest message, which is how the
/// recommendation flow behaves unless configured otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversationWindow {
    max_turns: usize,
    turn_char_limit: usize,
}

impl ConversationWindow {
    /// Creates a window keeping the last `max_turns` completed turns.
    #[must_use]
    pub const fn new(max_turns: usize) -> Self {
        Self {
            max_turns,
            turn_char_limit: DEFAULT_TURN_CHAR_LIMIT,
        }
    }

    /// Overrides how many characters of each earlier turn are kept.
    #[must_use]
    pub const fn with_turn_char_limit(mut self, limit: usize) -> Self {
        self.turn_char_limit = limit;
        self
    }

    /// Returns the configured number of turns.
    #[must_use]
    pub const fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Renders the transcript of earlier turns, or `None` when there is nothing to add.
    ///
    /// Pending placeholders are skipped. The caller passes history that does not
    /// yet contain the message being sent.
    #[must_use]
    pub fn render(&self, history: &[ChatTurn]) -> Option<String> {
        if self.max_turns == 0 {
            return None;
        }

        let completed: Vec<&ChatTurn> = history.iter().filter(|turn| !turn.is_pending()).collect();
        let skip = completed.len().saturating_sub(self.max_turns);
        let window = &completed[skip..];
        if window.is_empty() {
            return None;
        }

        let mut transcript = String::from("이전 대화:\n");
        for turn in window {
            let speaker = match turn.role() {
                ChatRole::User => "사용자",
                ChatRole::Model => "Spckit AI",
            };
            let _ = writeln!(transcript, "{speaker}: {}", self.clip(turn.text()));
        }
        Some(transcript)
    }

    fn clip<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        match text.char_indices().nth(self.turn_char_limit) {
            Some((cut, _)) => format!("{}…", &text[..cut]).into(),
            None => text.into(),
        }
    }
}

impl Default for ConversationWindow {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<ChatTurn> {
        vec![
            ChatTurn::user("첫 질문"),
            ChatTurn::model("첫 답변"),
            ChatTurn::user("두 번째 질문"),
            ChatTurn::model("두 번째 답변"),
        ]
    }

    #[test]
    fn zero_window_adds_nothing() {
        assert_eq!(ConversationWindow::new(0).render(&history()), None);
    }

    #[test]
    fn keeps_most_recent_turns() {
        let rendered = ConversationWindow::new(2).render(&history()).unwrap();
        assert!(!rendered.contains("첫 질문"));
        assert!(rendered.contains("사용자: 두 번째 질문"));
        assert!(rendered.contains("Spckit AI: 두 번째 답변"));
    }

    #[test]
    fn skips_pending_placeholders() {
        let mut turns = history();
        turns.push(ChatTurn::pending_model());
        let rendered = ConversationWindow::new(1).render(&turns).unwrap();
        assert!(rendered.contains("두 번째 답변"));
    }

    #[test]
    fn clips_long_turns() {
        let turns = vec![ChatTurn::model("가나다라마바사")];
        let rendered = ConversationWindow::new(4)
            .with_turn_char_limit(3)
            .render(&turns)
            .unwrap();
        assert!(rendered.contains("가나다…"));
        assert!(!rendered.contains("라"));
    }

    #[test]
    fn empty_history_adds_nothing() {
        assert_eq!(ConversationWindow::new(3).render(&[]), None);
    }
}
