pub mod cleanup;
pub mod extractor;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod validation;

pub use cleanup::*;
pub use extractor::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use validation::*;

use thiserror::Error;

use crate::pipeline::generation::GenerationError;

/// Characters of cleaned output kept in a parse failure.
pub const PARSE_SNIPPET_CHARS: usize = 500;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Sequence draft is empty")]
    EmptySequence,

    #[error("Structured conversion request failed: {0}")]
    Generator(#[from] GenerationError),

    #[error("Structured output could not be parsed ({reason}). Cleaned content (first {PARSE_SNIPPET_CHARS} chars): {snippet}")]
    StructuredParse { reason: String, snippet: String },
}
