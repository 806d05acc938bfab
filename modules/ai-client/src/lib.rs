pub mod error;
pub mod gemini;
pub mod openai;
pub mod schema;
pub mod traits;
pub mod util;

pub use error::AiError;
pub use gemini::Gemini;
pub use openai::OpenAi;
pub use schema::StructuredOutput;
pub use traits::{extract, StructuredAgent, StructuredRequest};
pub use util::{strip_code_blocks, truncate_to_char_boundary};
