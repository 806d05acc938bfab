use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AiError {
    /// Whether the failure happened before any response body was read.
    pub fn is_transport(&self) -> bool {
        matches!(self, AiError::Network(_) | AiError::Timeout(_))
    }
}

impl From<reqwest::Error> for AiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AiError::Timeout(e.to_string())
        } else {
            AiError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AiError {
    fn from(e: serde_json::Error) -> Self {
        AiError::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_parse() {
        let err: AiError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, AiError::Parse(_)));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_api_error_display() {
        let err = AiError::Api {
            status: 429,
            body: "quota exhausted".to_string(),
        };
        assert_eq!(err.to_string(), "API error (429): quota exhausted");
    }
}
