//! Error types for the pipeline.

use thiserror::Error;

/// Failures a pipeline can hit on its own account.
///
/// I/O and argument errors keep their own types and travel inside
/// [`anyhow::Error`]; callers can `downcast_ref::<PipelineError>()` to tell
/// these apart.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("No input matches `{pattern}`")]
    InputNotFound { pattern: String },

    #[error("Record has {found} field(s), field {index} is missing: {line:?}")]
    MissingField {
        index: usize,
        found: usize,
        line: String,
    },

    #[error("Cannot parse field {index} ({value:?}) of record {line:?}: {reason}")]
    ParseField {
        index: usize,
        value: String,
        line: String,
        reason: String,
    },

    #[error("No app named `{0}` found.")]
    UnknownWorkload(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
