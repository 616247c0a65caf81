//! Error Handling Module
//!
//! This module provides error handling for modlens, including:
//! - Core error types (`ModerationError`, `ErrorKind`, `ErrorCategory`)
//! - HTTP status classification for the moderation endpoint
//! - User-facing error summaries
//!
//! # Example
//!
//! ```rust,ignore
//! use modlens::error::{classify_http_error, ErrorKind};
//!
//! let error = classify_http_error(429, b"");
//! assert_eq!(error.kind(), ErrorKind::RateLimited);
//! assert!(error.is_user_retryable());
//! ```

pub mod helpers;
pub mod types;

pub use helpers::*;
pub use types::*;
