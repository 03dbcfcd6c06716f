//! Closed error taxonomy for the extraction pipeline.
//!
//! Every `Display` message here may be shown to an end user as-is.
use tailor_common::TailorError;
use thiserror::Error;

/// Classification shared by fetch and extraction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Timeout,
    HttpStatus(u16),
    Unreachable,
    InsufficientContent,
}

/// Fetch-stage failures. Always terminal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    InvalidUrl(String),
    #[error("Request to the job URL timed out. Please try again or paste the job description.")]
    Timeout,
    #[error("Could not load the page (HTTP {0}). Please paste the job description instead.")]
    HttpStatus(u16),
    #[error("Could not reach the job URL. Please check the link or paste the job description.")]
    Unreachable,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            FetchError::Timeout => ErrorKind::Timeout,
            FetchError::HttpStatus(code) => ErrorKind::HttpStatus(*code),
            FetchError::Unreachable => ErrorKind::Unreachable,
        }
    }
}

/// Completion-service failure. Internal only: the orchestrator absorbs it.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("completion timed out")]
    Timeout,
    #[error("completion failed: {0}")]
    Completion(String),
}

impl From<TailorError> for ModelError {
    fn from(err: TailorError) -> Self {
        match err {
            TailorError::Timeout => ModelError::Timeout,
            other => ModelError::Completion(other.to_string()),
        }
    }
}

/// Terminal result of [`crate::ExtractionOrchestrator::extract`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(
        "This page didn't return enough text (it may be loaded by JavaScript). \
         Try pasting the job description in the box below instead."
    )]
    InsufficientContent,
}

impl ExtractionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractionError::Fetch(err) => err.kind(),
            ExtractionError::InsufficientContent => ErrorKind::InsufficientContent,
        }
    }
}
