//! Error types for the Soul Mirror core.
//!
//! Only [`OrchestratorError`] ever reaches a caller of the pipeline. Everything else is
//! recovered inside the component that produced it and turned into telemetry.

use thiserror::Error;

/// A tool could not produce output for the given input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Unrecoverable profile storage fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("profile storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure talking to the external model. Absorbed by the selection service.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("no LLM credential configured")]
    MissingCredential,

    #[error("LLM request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("LLM API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("LLM response decode failed: {0}")]
    Decode(String),

    #[error("empty response from LLM")]
    EmptyReply,

    #[error("no tool selection list in LLM reply: {0}")]
    Parse(String),
}

/// The descriptor set handed to the selection service is unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("tool descriptor at position {0} has an empty name")]
    EmptyToolName(usize),

    #[error("duplicate tool descriptor: {0}")]
    DuplicateTool(String),
}

/// The only condition that aborts a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestratorError {
    #[error("processing failed")]
    SelectionFailed(#[source] SelectionError),
}

impl From<SelectionError> for OrchestratorError {
    fn from(err: SelectionError) -> Self {
        OrchestratorError::SelectionFailed(err)
    }
}

/// Configuration could not be assembled from defaults, file and environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_failure_does_not_leak_detail() {
        let err: OrchestratorError = SelectionError::DuplicateTool("echo".into()).into();
        assert_eq!(err.to_string(), "processing failed");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("duplicate tool descriptor: echo"));
    }

    #[test]
    fn execution_error_displays_message() {
        assert_eq!(ExecutionError::new("boom").to_string(), "boom");
    }
}
