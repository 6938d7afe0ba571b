//! Recommendation client: one structured request per user message.

use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Value, json};
use spckit_primitives::{AiResponse, BuildCategory, ChatTurn, Component};
use spckit_prompts::{RecommendationPrompts, TemplateError};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::traits::{
    AdapterError, InferenceRequest, MessageRole, ModelAdapter, PromptMessage, ResponseFormat,
};

/// Localized message shown in the chat whenever a recommendation fails.
pub const FAILURE_MESSAGE: &str = "AI로부터 응답을 받는데 실패했습니다. 잠시 후 다시 시도해주세요.";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Default output-token cap.
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Result alias for recommendation requests.
pub type RecommendationResult<T> = Result<T, RecommendationError>;

/// Failure of a single recommendation request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecommendationError {
    /// The request never produced a usable HTTP answer.
    #[error("recommendation request failed: {reason}")]
    Network {
        /// Underlying cause.
        reason: String,
    },
    /// The model answered but the body did not match the expected shape.
    #[error("malformed recommendation response: {reason}")]
    MalformedResponse {
        /// What was wrong with the body.
        reason: String,
    },
    /// The request could not be built locally, so nothing was sent.
    #[error("invalid recommendation request: {reason}")]
    InvalidRequest {
        /// What was wrong with the request.
        reason: String,
    },
}

impl RecommendationError {
    /// Convenience constructor for malformed bodies.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }

    /// Message suitable for the chat; the cause stays in the logs.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        FAILURE_MESSAGE
    }
}

impl From<AdapterError> for RecommendationError {
    fn from(value: AdapterError) -> Self {
        match value {
            AdapterError::Response { reason } => Self::MalformedResponse { reason },
            AdapterError::InvalidRequest { reason } => Self::InvalidRequest { reason },
            other => Self::Network {
                reason: other.to_string(),
            },
        }
    }
}

impl From<TemplateError> for RecommendationError {
    fn from(value: TemplateError) -> Self {
        Self::InvalidRequest {
            reason: format!("failed to render prompt: {value}"),
        }
    }
}

/// Issues recommendation requests through a [`ModelAdapter`].
///
/// The client holds no per-session state and is shared behind an [`Arc`].
#[derive(Clone)]
pub struct RecommendationClient {
    adapter: Arc<dyn ModelAdapter>,
    prompts: RecommendationPrompts,
    temperature: f32,
    max_output_tokens: u32,
}

impl std::fmt::Debug for RecommendationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationClient")
            .field("provider", &self.adapter.metadata().provider())
            .field("model", &self.adapter.metadata().model())
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish_non_exhaustive()
    }
}

impl RecommendationClient {
    /// Creates a client with the default prompts and generation settings.
    #[must_use]
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self {
            adapter,
            prompts: RecommendationPrompts::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Replaces the prompt set.
    #[must_use]
    pub fn with_prompts(mut self, prompts: RecommendationPrompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the output-token cap.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Returns the prompt set in use.
    #[must_use]
    pub const fn prompts(&self) -> &RecommendationPrompts {
        &self.prompts
    }

    /// Requests recommendations for a single message.
    ///
    /// # Errors
    ///
    /// See [`RecommendationClient::request_recommendation_with_history`].
    pub async fn request_recommendation(
        &self,
        message: &str,
        filter: Option<BuildCategory>,
    ) -> RecommendationResult<AiResponse> {
        self.request_recommendation_with_history(&[], message, filter)
            .await
    }

    /// Requests recommendations, prepending the configured window of `earlier` turns.
    ///
    /// With a category filter the prompt is scoped to that stage and components
    /// of any other category are dropped. The call is attempted once.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendationError::Network`] for transport failures,
    /// [`RecommendationError::MalformedResponse`] when the body is unusable and
    /// [`RecommendationError::InvalidRequest`] when the prompt cannot be built.
    pub async fn request_recommendation_with_history(
        &self,
        earlier: &[ChatTurn],
        message: &str,
        filter: Option<BuildCategory>,
    ) -> RecommendationResult<AiResponse> {
        let result = self.request_inner(earlier, message, filter).await;
        if let Err(err) = &result {
            error!(
                model = self.adapter.metadata().model(),
                error = %err,
                "recommendation request failed"
            );
        }
        result
    }

    async fn request_inner(
        &self,
        earlier: &[ChatTurn],
        message: &str,
        filter: Option<BuildCategory>,
    ) -> RecommendationResult<AiResponse> {
        let content = self.prompts.user_content(earlier, message, filter)?;

        let request = InferenceRequest::new(vec![PromptMessage::new(MessageRole::User, content)])?
            .with_system_prompt(self.prompts.system_instruction().content())
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens)
            .with_response_format(ResponseFormat::json(response_schema()));

        let mut stream = self.adapter.infer(request).await?;
        let mut raw = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            raw.push_str(&chunk.delta);
            if chunk.done {
                break;
            }
        }

        let response = parse_recommendation(&raw, filter)?;
        info!(
            model = self.adapter.metadata().model(),
            components = response.components.len(),
            ?filter,
            "recommendation received"
        );
        Ok(response)
    }
}

/// Output schema sent with every request.
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {
                "type": "STRING",
                "description": "사용자 요청에 대한 상세한 분석과 추천 이유",
            },
            "components": {
                "type": "ARRAY",
                "description": "추천 PC 부품 목록",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "category": {
                            "type": "STRING",
                            "description": "부품 카테고리 (예: CPU, GPU, RAM, 메인보드, SSD, 케이스, 파워)",
                        },
                        "name": {
                            "type": "STRING",
                            "description": "부품의 정확한 모델명",
                        },
                        "price": {
                            "type": "STRING",
                            "description": "부품의 대략적인 가격 (예: 약 450,000원)",
                        },
                        "features": {
                            "type": "ARRAY",
                            "description": "부품의 주요 특징 목록",
                            "items": { "type": "STRING" },
                        },
                    },
                    "required": ["category", "name", "price", "features"],
                },
            },
        },
        "required": ["analysis", "components"],
    })
}

/// Parses and validates the model's JSON document.
///
/// Invalid component entries are dropped. With a `filter`, entries whose
/// category does not resolve to it are dropped too.
///
/// # Errors
///
/// Returns [`RecommendationError::MalformedResponse`] when the body is not JSON
/// or `analysis`/`components` are missing or mistyped.
pub fn parse_recommendation(
    raw: &str,
    filter: Option<BuildCategory>,
) -> RecommendationResult<AiResponse> {
    let body = strip_code_fence(raw);
    let document: Value = serde_json::from_str(body)
        .map_err(|err| RecommendationError::malformed(format!("body is not JSON: {err}")))?;

    let analysis = document
        .get("analysis")
        .and_then(Value::as_str)
        .ok_or_else(|| RecommendationError::malformed("`analysis` must be a string"))?
        .to_owned();
    let entries = document
        .get("components")
        .and_then(Value::as_array)
        .ok_or_else(|| RecommendationError::malformed("`components` must be an array"))?;

    let components = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match Component::from_value(entry) {
            Ok(component) => Some(component),
            Err(err) => {
                debug!(index, error = %err, "dropping invalid component");
                None
            }
        })
        .filter(|component| match filter {
            Some(category) if component.category_key().category() != Some(category) => {
                debug!(
                    expected = %category,
                    got = component.category(),
                    "dropping component outside the active stage"
                );
                false
            }
            _ => true,
        })
        .collect();

    Ok(AiResponse {
        analysis,
        components,
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end()
        .strip_suffix("```")
        .unwrap_or(rest)
        .trim()
}
