use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DictionaryError>;

/// Problem with one input of an add or inline-edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub pointer: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pointer: pointer.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.pointer, self.message)
    }
}

/// Every condition here is recoverable; the session falls back to its prior
/// state and reports the error as a notice.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("invalid operation `{token}`: {reason}")]
    InvalidOperation { token: String, reason: String },

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    #[error("failed to encode envelope: {0}")]
    EncodeEnvelope(#[source] serde_json::Error),

    #[error("validation failed: {}", summarize(.0))]
    ValidationFailure(Vec<FieldIssue>),
}

impl DictionaryError {
    pub fn invalid_operation(token: impl Into<String>, reason: impl Into<String>) -> Self {
        DictionaryError::InvalidOperation {
            token: token.into(),
            reason: reason.into(),
        }
    }

    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            DictionaryError::ValidationFailure(issues) => issues,
            _ => &[],
        }
    }
}

fn summarize(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
