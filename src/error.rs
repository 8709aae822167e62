// src/error.rs
//! Typed errors at the crate's seams.
//!
//! Filters and the scorer are infallible; only document extraction and
//! posting sources can fail, plus normalization of raw provider records.

use std::time::Duration;

/// Failure to turn an uploaded document into text. Surfaced to the caller.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("could not read document: {0}")]
    Unreadable(String),
}

/// Failure of a single posting source. The orchestrator absorbs these.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("source `{source_name}` unavailable: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },
    #[error("source `{source_name}` timed out after {elapsed:?}")]
    Timeout {
        source_name: String,
        elapsed: Duration,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("decode error: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unavailable { .. } => "unavailable",
            Self::Timeout { .. } => "timeout",
            Self::Http(_) => "http",
            Self::Decode(_) => "decode",
        }
    }
}

/// A raw provider record that cannot become a `JobPosting`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedPosting {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("record is not an object")]
    NotAnObject,
}
