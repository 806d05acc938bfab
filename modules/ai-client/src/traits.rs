use async_trait::async_trait;
use tracing::debug;

use crate::error::AiError;
use crate::schema::StructuredOutput;
use crate::util::strip_code_blocks;

// =============================================================================
// Structured Request
// =============================================================================

/// A single structured-output call: two prompts and the JSON schema the
/// provider must answer with.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    pub system: String,
    pub user: String,
    pub schema_name: String,
    /// Schema for the response. Kept in schemars' form; each provider shapes
    /// it to its own dialect before sending.
    pub schema: serde_json::Value,
}

impl StructuredRequest {
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        schema_name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema_name: schema_name.into(),
            schema,
        }
    }

    /// Build a request whose schema is generated from `T`.
    pub fn for_type<T: StructuredOutput>(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(system, user, T::type_name(), T::raw_schema())
    }
}

// =============================================================================
// StructuredAgent Trait
// =============================================================================

/// A hosted model that can answer with JSON conforming to a schema.
///
/// Returns the raw JSON text. Callers deserialize and validate it themselves,
/// usually through [`extract`].
#[async_trait]
pub trait StructuredAgent: Send + Sync {
    /// Provider name for logs.
    fn provider(&self) -> &'static str;

    async fn structured(&self, request: StructuredRequest) -> Result<String, AiError>;
}

#[async_trait]
impl<A: StructuredAgent + ?Sized> StructuredAgent for std::sync::Arc<A> {
    fn provider(&self) -> &'static str {
        (**self).provider()
    }

    async fn structured(&self, request: StructuredRequest) -> Result<String, AiError> {
        (**self).structured(request).await
    }
}

/// Type-safe structured output extraction.
pub async fn extract<T, A>(
    agent: &A,
    system: impl Into<String>,
    user: impl Into<String>,
) -> Result<T, AiError>
where
    T: StructuredOutput,
    A: StructuredAgent + ?Sized,
{
    let request = StructuredRequest::for_type::<T>(system, user);
    debug!(provider = agent.provider(), schema = %request.schema_name, "Structured extraction");

    let raw = agent.structured(request).await?;
    let body = strip_code_blocks(&raw);
    if body.is_empty() {
        return Err(AiError::EmptyResponse(agent.provider()));
    }

    Ok(serde_json::from_str(body)?)
}
