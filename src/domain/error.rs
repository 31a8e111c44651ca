// Error taxonomy for calls against the license server
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FetchError {
    /// The request never completed (connect failure, reset, timeout)
    #[error("network error: {message}")]
    NetworkFailure { message: String },

    /// The server answered with a non-2xx status
    #[error("HTTP error! status: {status}")]
    HttpError { status: u16 },

    /// The body was not the JSON shape we expected
    #[error("failed to parse response: {message}")]
    ParseFailure { message: String },

    /// Rejected client-side before any request was sent
    #[error("validation failed: {message}")]
    ValidationFailure { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::ParseFailure {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpError { status } => Some(*status),
            _ => None,
        }
    }
}
