use std::collections::HashMap;

use spckit_primitives::{BuildCategory, ChatTurn};
use tracing::trace;

use crate::context::ConversationWindow;
use crate::system::SystemInstruction;
use crate::template::{PromptTemplate, TemplateResult};

const REQUEST_TEMPLATE: &str = "사용자 요청: \"{{request}}\". 이 요청에 따라 PC 부품 견적을 맞춰주세요. \
상세한 분석과 함께 추천 부품 목록을 제공해주세요.";

const STAGE_TEMPLATE: &str = "사용자 요청: \"{{request}}\". 지금은 {{category}} 단계입니다. \
{{category}} 부품만 추천하고 components의 category 값은 반드시 \"{{category}}\"로 작성해주세요. \
상세한 분석과 함께 추천 부품 목록을 제공해주세요.";

/// Coordinates the persona instruction, request templates, and conversation window.
#[derive(Debug, Clone)]
pub struct RecommendationPrompts {
    system: SystemInstruction,
    request: PromptTemplate,
    stage: PromptTemplate,
    window: ConversationWindow,
}

impl RecommendationPrompts {
    /// Creates the default prompt set with the given conversation window.
    #[must_use]
    pub fn new(window: ConversationWindow) -> Self {
        Self {
            system: SystemInstruction::default(),
            request: PromptTemplate::new(REQUEST_TEMPLATE).require("request"),
            stage: PromptTemplate::new(STAGE_TEMPLATE)
                .require("request")
                .require("category"),
            window,
        }
    }

    /// Replaces the persona instruction.
    #[must_use]
    pub fn with_system_instruction(mut self, system: SystemInstruction) -> Self {
        self.system = system;
        self
    }

    /// Returns the persona instruction.
    #[must_use]
    pub const fn system_instruction(&self) -> &SystemInstruction {
        &self.system
    }

    /// Returns the conversation window.
    #[must_use]
    pub const fn window(&self) -> ConversationWindow {
        self.window
    }

    /// Renders the user content for a request.
    ///
    /// `earlier` holds the turns before `message`; they are included only when
    /// the window is non-zero. A category scopes the request to that stage.
    ///
    /// # Errors
    ///
    /// Propagates template rendering failures.
    pub fn user_content(
        &self,
        earlier: &[ChatTurn],
        message: &str,
        category: Option<BuildCategory>,
    ) -> TemplateResult<String> {
        let mut vars = HashMap::from([("request", message.trim().to_owned())]);
        let body = match category {
            Some(category) => {
                vars.insert("category", category.label().to_owned());
                self.stage.render(&vars)?
            }
            None => self.request.render(&vars)?,
        };

        let content = match self.window.render(earlier) {
            Some(transcript) => format!("{transcript}\n{body}"),
            None => body,
        };
        trace!(chars = content.chars().count(), ?category, "rendered request content");
        Ok(content)
    }
}

impl Default for RecommendationPrompts {
    fn default() -> Self {
        Self::new(ConversationWindow::default())
    }
}
