mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AiError;
use crate::schema::gemini_schema;
use crate::traits::{StructuredAgent, StructuredRequest};

use client::GeminiClient;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    model: String,
    client: GeminiClient,
    temperature: Option<f32>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            client: GeminiClient::new(&api_key.into(), DEFAULT_TIMEOUT),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(&url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: StructuredRequest) -> types::GenerateContentRequest {
        let mut config = types::GenerationConfig::json(gemini_schema(request.schema));
        config.temperature = self.temperature;

        types::GenerateContentRequest {
            system_instruction: (!request.system.is_empty())
                .then(|| types::Content::system(request.system)),
            contents: vec![types::Content::user(request.user)],
            generation_config: config,
        }
    }
}

#[async_trait]
impl StructuredAgent for Gemini {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    async fn structured(&self, request: StructuredRequest) -> Result<String, AiError> {
        let wire = self.build_request(request);
        self.client.generate_content(&self.model, &wire).await
    }
}
