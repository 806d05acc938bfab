use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::PulseError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    OpenAi,
}

impl AiProvider {
    fn key_var(self) -> &'static str {
        match self {
            AiProvider::Gemini => "GEMINI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-3-flash-preview",
            AiProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_provider: AiProvider,
    pub ai_api_key: String,
    pub ai_model: String,
    pub ai_base_url: Option<String>,
    pub ai_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, PulseError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PulseError> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai_provider = match var("AI_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
            None => AiProvider::Gemini,
            Some(p) if p == "gemini" => AiProvider::Gemini,
            Some(p) if p == "openai" => AiProvider::OpenAi,
            Some(other) => {
                return Err(PulseError::Config(format!(
                    "AI_PROVIDER must be 'gemini' or 'openai', got '{other}'"
                )))
            }
        };

        let key_var = ai_provider.key_var();
        let ai_api_key = var(key_var)
            .ok_or_else(|| PulseError::Config(format!("{key_var} environment variable is required")))?;

        let ai_timeout = match var("AI_TIMEOUT_SECS") {
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    PulseError::Config(format!("AI_TIMEOUT_SECS must be a positive integer, got '{raw}'"))
                })?,
        };

        Ok(Self {
            ai_provider,
            ai_api_key,
            ai_model: var("AI_MODEL").unwrap_or_else(|| ai_provider.default_model().to_string()),
            ai_base_url: var("AI_BASE_URL"),
            ai_timeout,
        })
    }

    /// Log the configuration with the credential masked.
    pub fn log_redacted(&self) {
        info!(
            provider = ?self.ai_provider,
            model = %self.ai_model,
            base_url = self.ai_base_url.as_deref().unwrap_or("(default)"),
            timeout_secs = self.ai_timeout.as_secs(),
            api_key = %redact(&self.ai_api_key),
            "Configuration loaded"
        );
    }
}

fn redact(secret: &str) -> String {
    let tail: String = secret
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    if secret.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("****{tail}")
    }
}
