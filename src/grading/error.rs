//! Grading error taxonomy
//!
//! Only [`ValidationError`] ever reaches the caller. Everything in
//! [`PipelineFailure`] is absorbed by the orchestrator and answered with a
//! fallback grade.

use thiserror::Error;

/// Maximum number of characters of raw judgment text kept for diagnostics
pub const DIAGNOSTIC_LIMIT: usize = 500;

/// The request itself is malformed; grading cannot start
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request is missing a question")]
    MissingQuestion,

    #[error("Request contains no responses")]
    NoResponses,

    #[error("Question {question_id} has no parts")]
    NoParts { question_id: String },

    #[error("Part label {0} is used more than once")]
    DuplicateLabel(String),

    #[error("Part {label} has invalid max points {max_points} (must be positive, in 0.5 steps)")]
    InvalidMaxPoints { label: String, max_points: f64 },

    #[error("Question total points {declared} does not match the sum of part points {sum}")]
    TotalPointsMismatch { declared: f64, sum: f64 },

    #[error("Response references unknown part: {0}")]
    UnknownPart(String),

    #[error("More than one response for part: {0}")]
    DuplicateResponse(String),
}

/// The judgment service could not produce any text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeFailure {
    #[error("Judgment timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("Judgment transport error: {message}")]
    Transport { message: String },

    #[error("Judgment service returned no text")]
    EmptyOutput,
}

/// The judgment text contained no recoverable JSON object
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unparsable judgment: {reason}")]
pub struct ParseFailure {
    pub reason: String,
    /// Leading slice of the raw text, at most [`DIAGNOSTIC_LIMIT`] characters
    pub snippet: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            snippet: truncate_diagnostic(raw),
        }
    }
}

/// The parsed judgment had no usable score information
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Unusable judgment structure: {0}")]
pub struct NormalizationFailure(pub String);

/// Any failure downstream of a valid request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineFailure {
    #[error(transparent)]
    Invoke(#[from] InvokeFailure),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Normalize(#[from] NormalizationFailure),
}

impl PipelineFailure {
    /// Short machine-readable kind, used in logs and the journal
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineFailure::Invoke(InvokeFailure::Timeout { .. }) => "upstream_timeout",
            PipelineFailure::Invoke(InvokeFailure::Transport { .. }) => "upstream_transport_error",
            PipelineFailure::Invoke(InvokeFailure::EmptyOutput) => "upstream_empty_output",
            PipelineFailure::Parse(_) => "parse_failure",
            PipelineFailure::Normalize(_) => "normalization_failure",
        }
    }
}

/// Keeps at most [`DIAGNOSTIC_LIMIT`] characters, on a char boundary.
pub fn truncate_diagnostic(text: &str) -> String {
    text.chars().take(DIAGNOSTIC_LIMIT).collect()
}
