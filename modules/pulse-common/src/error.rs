use thiserror::Error;

use crate::lifecycle::Lifecycle;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Problem not found: {0}")]
    NotFound(String),

    #[error("Lifecycle cannot move from {from} to {to}")]
    InvalidTransition { from: Lifecycle, to: Lifecycle },

    #[error(transparent)]
    Ai(#[from] ai_client::AiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
