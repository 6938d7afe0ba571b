//! Google Gemini adapter using the `generateContent` endpoint.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use futures::stream;
use hyper::body::to_bytes;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Request, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::timeout;
use tracing::debug;

use crate::http_client::{HyperClient, build_https_client};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest,
    MessageRole, ModelAdapter, PromptMessage,
};

/// Public Gemini API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Configuration for the Gemini adapter.
#[derive(Clone)]
pub struct GeminiConfig {
    api_key: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl GeminiConfig {
    /// Creates a configuration using the supplied model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout: Duration::from_secs(60),
            default_temperature: None,
        }
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when requests omit it.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the HTTP request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies the API key.
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Gemini adapter that calls the API over HTTPS.
pub struct GeminiAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    api_key: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GeminiAdapter {
    /// Constructs a new adapter with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API key is missing or the
    /// endpoint cannot be formed.
    pub fn new(config: GeminiConfig) -> AdapterResult<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AdapterError::configuration("Gemini adapter requires an API key"))?;

        let endpoint = format!(
            "{}v1beta/models/{}:generateContent",
            config.base_url, config.model
        )
        .parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid Gemini endpoint: {err}")))?;

        Ok(Self {
            client: build_https_client()?,
            endpoint,
            metadata: AdapterMetadata::new("gemini", config.model),
            api_key,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_request(&self, request: &InferenceRequest) -> GenerateContentRequest {
        let system_instruction = request.system_prompt().map(|prompt| SystemInstruction {
            parts: vec![Part {
                text: prompt.to_owned(),
            }],
        });

        let contents = request
            .messages()
            .iter()
            .filter(|msg| msg.role() != MessageRole::System)
            .map(map_prompt_message)
            .collect();

        let format = request.response_format();
        let generation_config = GenerationConfig {
            temperature: request.temperature().or(self.default_temperature),
            max_output_tokens: request.max_output_tokens(),
            response_mime_type: format.map(|f| f.mime_type().to_owned()),
            response_schema: format.and_then(|f| f.schema().cloned()),
        };

        GenerateContentRequest {
            system_instruction,
            contents,
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }
}

#[async_trait]
impl ModelAdapter for GeminiAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let payload = self.build_request(&request);
        let body = serde_json::to_vec(&payload).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Gemini request: {err}"))
        })?;

        let req = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.api_key.as_str())
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build Gemini request: {err}"))
            })?;

        debug!(model = self.metadata.model(), "sending Gemini generateContent");

        let response = timeout(self.timeout, self.client.request(req))
            .await
            .map_err(|_| AdapterError::transport("Gemini request timed out"))?
            .map_err(|err| AdapterError::transport(format!("Gemini request failed: {err}")))?;

        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            AdapterError::transport(format!("failed to read Gemini response: {err}"))
        })?;

        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let decoded: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|err| AdapterError::response(format!("failed to decode Gemini response: {err}")))?;
        let content = response_text(decoded)?;

        let stream = stream::once(async move { Ok(InferenceChunk::new(content, true)) });
        Ok(Box::pin(stream))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

impl GenerationConfig {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.max_output_tokens.is_none()
            && self.response_mime_type.is_none()
            && self.response_schema.is_none()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

fn response_text(response: GenerateContentResponse) -> AdapterResult<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(AdapterError::response(format!("Gemini blocked the prompt: {reason}")));
    }

    let Some(content) = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
    else {
        return Err(AdapterError::response("Gemini returned no candidates"));
    };

    let text = content
        .parts
        .into_iter()
        .map(|part| part.text)
        .collect::<String>();

    if text.trim().is_empty() {
        return Err(AdapterError::response("Gemini returned an empty candidate"));
    }
    Ok(text)
}

fn map_prompt_message(message: &PromptMessage) -> Content {
    let role = match message.role() {
        MessageRole::Model => "model",
        MessageRole::User | MessageRole::System => "user",
    };

    Content {
        role: role.to_owned(),
        parts: vec![Part {
            text: message.content().to_owned(),
        }],
    }
}

fn sanitize_base_url(input: &str) -> AdapterResult<String> {
    let mut base = input.trim().to_owned();
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(AdapterError::configuration(
            "Gemini base URL must start with http:// or https://",
        ));
    }
    if !base.ends_with('/') {
        base.push('/');
    }
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("invalid Gemini base URL: {err}")))?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ResponseFormat;
    use serde_json::json;

    fn adapter() -> GeminiAdapter {
        GeminiAdapter::new(GeminiConfig::new("gemini-2.5-pro").with_api_key("test_key"))
            .expect("adapter")
    }

    #[test]
    fn base_url_requires_scheme() {
        let err = GeminiConfig::new("gemini-2.5-pro")
            .with_base_url("generativelanguage.googleapis.com")
            .expect_err("missing scheme should error");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn sanitize_appends_trailing_slash() {
        let cfg = GeminiConfig::new("gemini-2.5-pro")
            .with_base_url("http://127.0.0.1:8080/mock")
            .expect("valid URL");
        assert_eq!(cfg.base_url, "http://127.0.0.1:8080/mock/");
    }

    #[test]
    fn missing_or_blank_key_is_a_configuration_error() {
        let err = GeminiAdapter::new(GeminiConfig::new("gemini-2.5-pro")).expect_err("no key");
        assert!(matches!(err, AdapterError::Configuration { .. }));

        let err = GeminiAdapter::new(GeminiConfig::new("gemini-2.5-pro").with_api_key("  "))
            .expect_err("blank key");
        assert!(matches!(err, AdapterError::Configuration { .. }));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let cfg = GeminiConfig::new("gemini-2.5-pro").with_api_key("secret-value");
        assert!(!format!("{cfg:?}").contains("secret-value"));
    }

    #[test]
    fn request_carries_schema_and_generation_settings() {
        let request = InferenceRequest::new(vec![PromptMessage::new(MessageRole::User, "견적")])
            .unwrap()
            .with_system_prompt("Spckit AI")
            .with_temperature(0.7)
            .with_max_output_tokens(2048)
            .with_response_format(ResponseFormat::json(json!({"type": "OBJECT"})));

        let body = serde_json::to_value(adapter().build_request(&request)).unwrap();
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Spckit AI");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "견적");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn request_without_settings_omits_generation_config() {
        let request =
            InferenceRequest::new(vec![PromptMessage::new(MessageRole::User, "hi")]).unwrap();
        let body = serde_json::to_value(adapter().build_request(&request)).unwrap();
        assert!(body.get("generationConfig").is_none());
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn system_messages_are_filtered_from_contents() {
        let request = InferenceRequest::new(vec![
            PromptMessage::new(MessageRole::System, "system"),
            PromptMessage::new(MessageRole::Model, "earlier"),
            PromptMessage::new(MessageRole::User, "hello"),
        ])
        .unwrap();
        let generated = adapter().build_request(&request);
        assert_eq!(generated.contents.len(), 2);
        assert_eq!(generated.contents[0].role, "model");
    }

    #[test]
    fn extracts_candidate_text() {
        let decoded: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "{\"analysis\":"}, {"text": "\"ok\"}"}]}}]
        }))
        .unwrap();
        assert_eq!(response_text(decoded).unwrap(), "{\"analysis\":\"ok\"}");
    }

    #[test]
    fn empty_or_blocked_responses_are_errors() {
        let empty: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": []})).unwrap();
        assert!(matches!(response_text(empty), Err(AdapterError::Response { .. })));

        let blocked: GenerateContentResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        let err = response_text(blocked).expect_err("blocked");
        assert!(err.to_string().contains("SAFETY"));
    }
}
