//! Strongly typed configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use spckit_adapters::gemini::{GeminiAdapter, GeminiConfig};
use spckit_adapters::recommend::{
    DEFAULT_MAX_OUTPUT_TOKENS, DEFAULT_TEMPERATURE, RecommendationClient,
};
use spckit_prompts::{ConversationWindow, RecommendationPrompts};
use spckit_session::SessionConfig;
use tracing::info;

use crate::error::ConfigResult;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-pro";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Effective settings for one process.
#[derive(Clone, PartialEq)]
pub struct SpckitConfig {
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) base_url: Option<String>,
    pub(crate) temperature: f32,
    pub(crate) max_output_tokens: u32,
    pub(crate) timeout: Duration,
    pub(crate) guided_build: bool,
    pub(crate) history_turns: usize,
}

impl fmt::Debug for SpckitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpckitConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("timeout", &self.timeout)
            .field("guided_build", &self.guided_build)
            .field("history_turns", &self.history_turns)
            .finish()
    }
}

impl SpckitConfig {
    /// Creates a configuration with defaults for everything but the credential.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_owned(),
            base_url: None,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: DEFAULT_TIMEOUT,
            guided_build: false,
            history_turns: 0,
        }
    }

    /// Overrides the model identifier.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Enables or disables the guided build.
    #[must_use]
    pub const fn with_guided_build(mut self, enabled: bool) -> Self {
        self.guided_build = enabled;
        self
    }

    /// Sets how many earlier turns accompany each request.
    #[must_use]
    pub const fn with_history_turns(mut self, turns: usize) -> Self {
        self.history_turns = turns;
        self
    }

    /// Returns the model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the API base URL override.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the sampling temperature.
    #[must_use]
    pub const fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Returns the output-token cap.
    #[must_use]
    pub const fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns whether the guided build is enabled.
    #[must_use]
    pub const fn guided_build(&self) -> bool {
        self.guided_build
    }

    /// Returns how many earlier turns accompany each request.
    #[must_use]
    pub const fn history_turns(&self) -> usize {
        self.history_turns
    }

    /// Gemini adapter settings.
    ///
    /// # Errors
    ///
    /// Propagates an invalid base URL.
    pub fn gemini_config(&self) -> ConfigResult<GeminiConfig> {
        let mut config = GeminiConfig::new(&self.model)
            .with_api_key(&self.api_key)
            .with_timeout(self.timeout)
            .with_default_temperature(self.temperature);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url)?;
        }
        Ok(config)
    }

    /// Session behavior switches.
    #[must_use]
    pub const fn session_config(&self) -> SessionConfig {
        SessionConfig {
            guided_build: self.guided_build,
        }
    }

    /// Prompt set with the configured conversation window.
    #[must_use]
    pub fn prompts(&self) -> RecommendationPrompts {
        RecommendationPrompts::new(ConversationWindow::new(self.history_turns))
    }

    /// Builds the shared recommendation client over the Gemini adapter.
    ///
    /// # Errors
    ///
    /// Returns an error when the adapter cannot be constructed.
    pub fn build_client(&self) -> ConfigResult<Arc<RecommendationClient>> {
        let adapter = GeminiAdapter::new(self.gemini_config()?)?;
        info!(
            model = %self.model,
            guided_build = self.guided_build,
            history_turns = self.history_turns,
            "recommendation client configured"
        );
        let client = RecommendationClient::new(Arc::new(adapter))
            .with_prompts(self.prompts())
            .with_temperature(self.temperature)
            .with_max_output_tokens(self.max_output_tokens);
        Ok(Arc::new(client))
    }
}
