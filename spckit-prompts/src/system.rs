//! Fixed persona instruction applied to every recommendation request.

/// Persona used when no override is configured.
pub const DEFAULT_PERSONA: &str = "당신은 'Spckit AI'입니다. 사용자의 요구사항, 예산, 사용 목적에 따라 \
맞춤형 PC 부품을 추천하는 전문 AI 어시스턴트입니다. 항상 한국어로 답변해야 합니다.";

/// System instruction fixing the assistant persona and output language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInstruction {
    content: String,
}

impl SystemInstruction {
    /// Creates an instruction with custom content.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the textual content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl Default for SystemInstruction {
    fn default() -> Self {
        Self::new(DEFAULT_PERSONA)
    }
}
