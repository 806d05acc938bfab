mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::AiError;
use crate::schema::openai_schema;
use crate::traits::{StructuredAgent, StructuredRequest};

use client::OpenAiClient;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// =============================================================================
// OpenAi Agent
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    model: String,
    client: OpenAiClient,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            client: OpenAiClient::new(&api_key.into(), DEFAULT_TIMEOUT),
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

    /// Get the model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: StructuredRequest) -> types::StructuredChatRequest {
        types::StructuredChatRequest {
            model: self.model.clone(),
            messages: vec![
                types::WireMessage::system(request.system),
                types::WireMessage::user(request.user),
            ],
            temperature: types::supports_temperature(&self.model).then_some(0.0),
            response_format: types::ResponseFormat::json_schema(
                schema_slug(&request.schema_name),
                openai_schema(request.schema),
            ),
        }
    }
}

/// OpenAI schema names must match `^[a-zA-Z0-9_-]+$`.
fn schema_slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if slug.is_empty() {
        "structured_response".to_string()
    } else {
        slug
    }
}

#[async_trait]
impl StructuredAgent for OpenAi {
    fn provider(&self) -> &'static str {
        "openai"
    }

    async fn structured(&self, request: StructuredRequest) -> Result<String, AiError> {
        let wire = self.build_request(request);
        self.client.structured_output(&wire).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_new() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini");
        assert_eq!(ai.model(), "gpt-4o-mini");
        assert_eq!(ai.client.base_url(), client::OPENAI_API_URL);
        assert_eq!(ai.client.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_openai_builders() {
        let ai = OpenAi::new("sk-test", "gpt-4o")
            .with_base_url("https://proxy.internal/v1")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(ai.client.base_url(), "https://proxy.internal/v1");
        assert_eq!(ai.client.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_build_request_shapes_schema() {
        let ai = OpenAi::new("sk-test", "gpt-4o-mini");
        let request = StructuredRequest::new(
            "sys",
            "user",
            "Problem Draft",
            serde_json::json!({
                "type": "object",
                "properties": { "title": { "type": "string" } }
            }),
        );
        let wire = serde_json::to_value(ai.build_request(request)).unwrap();

        assert_eq!(wire["temperature"], 0.0);
        assert_eq!(wire["messages"][0]["role"], "system");
        assert_eq!(wire["messages"][1]["content"], "user");
        assert_eq!(wire["response_format"]["json_schema"]["name"], "Problem_Draft");
        let schema = &wire["response_format"]["json_schema"]["schema"];
        assert_eq!(schema["additionalProperties"], false);
        assert_eq!(schema["required"][0], "title");
    }

    #[test]
    fn test_reasoning_model_omits_temperature() {
        let ai = OpenAi::new("sk-test", "gpt-5-mini");
        let request = StructuredRequest::new("s", "u", "x", serde_json::json!({"type": "object"}));
        let wire = serde_json::to_value(ai.build_request(request)).unwrap();
        assert!(wire.get("temperature").is_none());
    }
}
