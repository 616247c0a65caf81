//! Core error types.

use std::time::Duration;
use thiserror::Error;

/// Friendly fallback messages used when the error body carries none.
pub mod messages {
    pub const BAD_REQUEST: &str = "Invalid request. Please check your input and try again";
    pub const FORBIDDEN: &str = "Access denied by the moderation service";
    pub const RATE_LIMITED: &str = "Too many requests. Please wait a moment and try again";
    pub const SERVER_ERROR: &str = "The server encountered an error. Please try again";
    pub const UPSTREAM_UNREACHABLE: &str = "Could not reach the moderation service";
    pub const UPSTREAM_TIMEOUT: &str = "The moderation service took too long to respond";
    pub const UNKNOWN_HTTP: &str = "Unexpected error from the server";
    pub const NETWORK: &str = "Network error. Please check your connection and try again";
}

/// Every failure modlens can surface.
///
/// All variants render a human-readable message through `Display`; none of
/// them is fatal and callers are expected to return to an idle state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    /// Trimmed input is empty
    #[error("Please enter some text to analyze")]
    EmptyInput,

    /// Trimmed input exceeds the configured character limit
    #[error("Text is too long ({actual} characters). The limit is {limit} characters")]
    InputTooLong { limit: usize, actual: usize },

    /// The local network connectivity flag reports offline
    #[error("You appear to be offline. Check your internet connection and try again")]
    NoConnectivity,

    /// Transport failure other than cancellation
    #[error("{0}")]
    NetworkError(String),

    /// The request was cancelled when its timer expired
    #[error(
        "Request timed out after {} seconds. The server may be starting up, please try again",
        .timeout.as_secs()
    )]
    RequestTimeout { timeout: Duration },

    /// HTTP 400
    #[error("{0}")]
    BadRequest(String),

    /// HTTP 403
    #[error("{0}")]
    Forbidden(String),

    /// HTTP 429
    #[error("{0}")]
    RateLimited(String),

    /// HTTP 500
    #[error("{0}")]
    ServerError(String),

    /// HTTP 502
    #[error("{0}")]
    UpstreamUnreachable(String),

    /// HTTP 504
    #[error("{0}")]
    UpstreamTimeout(String),

    /// Any other non-success status
    #[error("{message} (HTTP {status})")]
    UnknownHttpError { status: u16, message: String },

    /// Success status but the body lacks the flag or the scores
    #[error("Unexpected response from the server: {0}")]
    MalformedResponse(String),

    /// Invalid configuration or runtime setup
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Flat discriminant of [`ModerationError`] handed to the presentation sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    InputTooLong,
    NoConnectivity,
    NetworkError,
    RequestTimeout,
    BadRequest,
    Forbidden,
    RateLimited,
    ServerError,
    UpstreamUnreachable,
    UpstreamTimeout,
    UnknownHttpError,
    MalformedResponse,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyInput => "empty_input",
            Self::InputTooLong => "input_too_long",
            Self::NoConnectivity => "no_connectivity",
            Self::NetworkError => "network_error",
            Self::RequestTimeout => "request_timeout",
            Self::BadRequest => "bad_request",
            Self::Forbidden => "forbidden",
            Self::RateLimited => "rate_limited",
            Self::ServerError => "server_error",
            Self::UpstreamUnreachable => "upstream_unreachable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::UnknownHttpError => "unknown_http_error",
            Self::MalformedResponse => "malformed_response",
            Self::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse error taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Rejected locally, no network attempted
    Input,
    /// Connectivity problems; the user may retry
    Connectivity,
    /// The server answered with an error or an unusable body
    Upstream,
    /// Setup problems
    Configuration,
}

impl ModerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyInput => ErrorKind::EmptyInput,
            Self::InputTooLong { .. } => ErrorKind::InputTooLong,
            Self::NoConnectivity => ErrorKind::NoConnectivity,
            Self::NetworkError(_) => ErrorKind::NetworkError,
            Self::RequestTimeout { .. } => ErrorKind::RequestTimeout,
            Self::BadRequest(_) => ErrorKind::BadRequest,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::RateLimited(_) => ErrorKind::RateLimited,
            Self::ServerError(_) => ErrorKind::ServerError,
            Self::UpstreamUnreachable(_) => ErrorKind::UpstreamUnreachable,
            Self::UpstreamTimeout(_) => ErrorKind::UpstreamTimeout,
            Self::UnknownHttpError { .. } => ErrorKind::UnknownHttpError,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::ConfigurationError(_) => ErrorKind::Configuration,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput | Self::InputTooLong { .. } => ErrorCategory::Input,
            Self::NoConnectivity | Self::NetworkError(_) | Self::RequestTimeout { .. } => {
                ErrorCategory::Connectivity
            }
            Self::ConfigurationError(_) => ErrorCategory::Configuration,
            _ => ErrorCategory::Upstream,
        }
    }

    /// HTTP status behind the error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::Forbidden(_) => Some(403),
            Self::RateLimited(_) => Some(429),
            Self::ServerError(_) => Some(500),
            Self::UpstreamUnreachable(_) => Some(502),
            Self::UpstreamTimeout(_) => Some(504),
            Self::UnknownHttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether triggering the same analysis again can reasonably succeed.
    ///
    /// Nothing in modlens retries automatically; this only drives UI hints.
    pub fn is_user_retryable(&self) -> bool {
        match self {
            Self::NoConnectivity
            | Self::NetworkError(_)
            | Self::RequestTimeout { .. }
            | Self::RateLimited(_)
            | Self::ServerError(_)
            | Self::UpstreamUnreachable(_)
            | Self::UpstreamTimeout(_) => true,
            Self::UnknownHttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Map a non-success HTTP response from the moderation endpoint to an error.
///
/// A `message` found in the body (`{"message": ..}` or
/// `{"error": {"message": ..}}`) replaces the default text for the kind.
pub fn classify_http_error(status: u16, body: &[u8]) -> ModerationError {
    let body_message = extract_body_message(body);
    let message = |fallback: &str| body_message.clone().unwrap_or_else(|| fallback.to_string());

    match status {
        400 => ModerationError::BadRequest(message(messages::BAD_REQUEST)),
        403 => ModerationError::Forbidden(message(messages::FORBIDDEN)),
        429 => ModerationError::RateLimited(message(messages::RATE_LIMITED)),
        500 => ModerationError::ServerError(message(messages::SERVER_ERROR)),
        502 => ModerationError::UpstreamUnreachable(message(messages::UPSTREAM_UNREACHABLE)),
        504 => ModerationError::UpstreamTimeout(message(messages::UPSTREAM_TIMEOUT)),
        other => ModerationError::UnknownHttpError {
            status: other,
            message: message(messages::UNKNOWN_HTTP),
        },
    }
}

fn extract_body_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let message = value
        .get("message")
        .or_else(|| value.get("error").and_then(|e| e.get("message")))
        .and_then(|m| m.as_str())?
        .trim();
    (!message.is_empty()).then(|| message.to_string())
}
