//! High-level error helper utilities for user-facing error handling.
//!
//! Structured summaries and friendly suggestions suitable for UI rendering.

use super::types::{ErrorCategory, ErrorKind, ModerationError};

/// Structured error summary for UI consumption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub kind: ErrorKind,
    pub category: ErrorCategory,
    pub status: Option<u16>,
    /// Message shown to the user
    pub message: String,
    /// Whether the UI should offer a manual retry
    pub retryable: bool,
    pub suggestions: Vec<String>,
}

/// Summarize a `ModerationError` with friendly suggestions.
pub fn summarize_error(err: &ModerationError) -> ErrorSummary {
    ErrorSummary {
        kind: err.kind(),
        category: err.category(),
        status: err.status_code(),
        message: err.to_string(),
        retryable: err.is_user_retryable(),
        suggestions: suggest_fixes(err),
    }
}

/// Suggest fixes based on the error.
pub fn suggest_fixes(err: &ModerationError) -> Vec<String> {
    let mut tips = Vec::new();
    match err {
        ModerationError::EmptyInput => {
            tips.push("Type or paste the text you want to check".to_string());
        }
        ModerationError::InputTooLong { limit, .. } => {
            tips.push(format!("Shorten the text to at most {limit} characters"));
            tips.push("Split long documents and analyze them in parts".to_string());
        }
        ModerationError::RequestTimeout { .. } => {
            tips.push("The server may be waking up; wait a few seconds and try again".to_string());
        }
        ModerationError::RateLimited(_) => {
            tips.push("Wait a moment before sending another request".to_string());
        }
        ModerationError::Forbidden(_) => {
            tips.push("Verify the API key or the proxy access settings".to_string());
        }
        ModerationError::ConfigurationError(_) => {
            tips.push("Check the endpoint URLs, timeouts and limits".to_string());
        }
        _ => {}
    }

    match err.category() {
        ErrorCategory::Connectivity if !matches!(err, ModerationError::RequestTimeout { .. }) => {
            tips.push("Check your internet connection".to_string());
        }
        ErrorCategory::Upstream if err.is_user_retryable() => {
            tips.push("Try again in a little while".to_string());
        }
        _ => {}
    }
    tips
}
