//! HTTP transport abstraction.
//!
//! The client and the health monitor never talk to `reqwest` directly; they
//! go through an injectable [`HttpTransport`] so tests (or embedders with
//! their own HTTP stack) can observe the final URL/headers/body and return a
//! synthetic response.

use crate::utils::CancelHandle;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use thiserror::Error;

/// Transport-level request data for JSON POST requests.
#[derive(Debug, Clone)]
pub struct HttpTransportRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// Transport-level response data.
#[derive(Debug, Clone)]
pub struct HttpTransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpTransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure below the HTTP status level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The cancel handle fired before a response arrived
    #[error("request cancelled")]
    Cancelled,
    /// Connection, TLS, DNS or body read failure
    #[error("network error: {0}")]
    Network(String),
}

/// Custom HTTP transport.
///
/// Contract: when `cancel` fires, implementations stop the in-flight
/// operation, release its connection and return [`TransportError::Cancelled`].
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post_json(
        &self,
        request: HttpTransportRequest,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError>;

    async fn get(
        &self,
        url: &str,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError>;
}
