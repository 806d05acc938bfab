#[macro_use]
mod labels;

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod types;

pub use config::{AiProvider, Config};
pub use error::PulseError;
pub use lifecycle::Lifecycle;
pub use types::*;
