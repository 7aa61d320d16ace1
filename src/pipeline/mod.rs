pub mod batch;
pub mod corrections;
pub mod dedup;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod validators;

use thiserror::Error;

/// Failures at the text-generation boundary.
///
/// Data problems in patient records are never errors; they surface as
/// report values. These variants cover the external collaborator only,
/// and are always caught at the detector/suggester boundary and
/// converted to the documented fallback behaviour.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Text-generation service is unreachable at {0}")]
    Connection(String),

    #[error("Text-generation service returned status {status}: {body}")]
    ServiceStatus { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
}
