//! Moderation client
//!
//! Validates input locally, sends it to the moderation endpoint under a
//! cancellation deadline and classifies every failure into a
//! [`ModerationError`]. Never retries on its own.

use crate::config::{ApiMode, Config};
use crate::error::{ModerationError, classify_http_error, messages};
use crate::execution::http::{
    HttpTransport, HttpTransportRequest, ReqwestTransport, TransportError,
};
use crate::state::AppState;
use crate::types::RawModerationResponse;
use crate::utils::{CancelHandle, Interrupted, run_with_deadline};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Input that passed local validation: trimmed, non-empty, within the limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInput {
    text: String,
}

impl PreparedInput {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub struct ModerationClient {
    config: Arc<Config>,
    transport: Arc<dyn HttpTransport>,
    state: Arc<AppState>,
}

static_assertions::assert_impl_all!(ModerationClient: Send, Sync);

impl std::fmt::Debug for ModerationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModerationClient")
            .field("moderation_url", &self.config.moderation_url)
            .field("api_mode", &self.config.api_mode)
            .finish_non_exhaustive()
    }
}

impl ModerationClient {
    /// Create a client using the default `reqwest` transport.
    pub fn new(config: Arc<Config>, state: Arc<AppState>) -> Result<Self, ModerationError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, state))
    }

    /// Create a client over a custom transport.
    pub fn with_transport(
        config: Arc<Config>,
        transport: Arc<dyn HttpTransport>,
        state: Arc<AppState>,
    ) -> Self {
        Self {
            config,
            transport,
            state,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Local checks, in order: non-empty, within the limit, network online.
    pub fn prepare(&self, text: &str) -> Result<PreparedInput, ModerationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ModerationError::EmptyInput);
        }

        let actual = trimmed.chars().count();
        if actual > self.config.max_input_chars {
            return Err(ModerationError::InputTooLong {
                limit: self.config.max_input_chars,
                actual,
            });
        }

        if !self.state.is_network_online() {
            return Err(ModerationError::NoConnectivity);
        }

        Ok(PreparedInput {
            text: trimmed.to_string(),
        })
    }

    /// Validate and send `text`.
    pub async fn analyze(&self, text: &str) -> Result<RawModerationResponse, ModerationError> {
        let input = self.prepare(text)?;
        self.send(&input).await
    }

    /// Send already validated input. Issues exactly one request.
    pub async fn send(
        &self,
        input: &PreparedInput,
    ) -> Result<RawModerationResponse, ModerationError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "moderation_request",
            request_id = %request_id,
            chars = input.char_count()
        );
        self.send_inner(input).instrument(span).await
    }

    async fn send_inner(
        &self,
        input: &PreparedInput,
    ) -> Result<RawModerationResponse, ModerationError> {
        let availability = self.state.availability();
        if availability.is_degraded() {
            tracing::warn!(
                state = %availability,
                "backend not confirmed online; request may be slow"
            );
        }

        let request = self.build_request(input)?;
        let timeout = self.config.request_timeout;
        let cancel = CancelHandle::new();
        let started = Instant::now();
        tracing::debug!(url = %request.url, "sending moderation request");

        let outcome = run_with_deadline(
            self.transport.post_json(request, cancel.clone()),
            timeout,
            &cancel,
        )
        .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Err(Interrupted::DeadlineElapsed) | Ok(Err(TransportError::Cancelled)) => {
                tracing::warn!(duration_ms, "moderation request timed out");
                return Err(ModerationError::RequestTimeout { timeout });
            }
            Err(Interrupted::Cancelled) => {
                return Err(ModerationError::NetworkError(
                    "Request was cancelled".to_string(),
                ));
            }
            Ok(Err(TransportError::Network(detail))) => {
                tracing::warn!(duration_ms, error = %detail, "moderation request failed");
                return Err(ModerationError::NetworkError(messages::NETWORK.to_string()));
            }
        };

        if !response.is_success() {
            let err = classify_http_error(response.status, &response.body);
            tracing::warn!(
                status = response.status,
                duration_ms,
                kind = %err.kind(),
                "moderation endpoint returned an error"
            );
            return Err(err);
        }

        let raw = RawModerationResponse::from_body(&response.body)?;
        tracing::debug!(
            status = response.status,
            duration_ms,
            categories = raw.scores.len(),
            flagged = raw.flagged,
            "moderation request completed"
        );
        Ok(raw)
    }

    fn build_request(
        &self,
        input: &PreparedInput,
    ) -> Result<HttpTransportRequest, ModerationError> {
        let body = match self.config.api_mode {
            ApiMode::Proxy => serde_json::json!({ "text": input.text() }),
            ApiMode::Direct => serde_json::json!({
                "input": input.text(),
                "model": self.config.model,
            }),
        };

        let mut headers = HeaderMap::new();
        if let Some(key) = &self.config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|_| {
                    ModerationError::ConfigurationError(
                        "API key contains characters not allowed in a header".to_string(),
                    )
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(HttpTransportRequest {
            url: self.config.moderation_url.clone(),
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::http::HttpTransportResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingTransport {
        calls: Mutex<Vec<HttpTransportRequest>>,
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn post_json(
            &self,
            request: HttpTransportRequest,
            _cancel: CancelHandle,
        ) -> Result<HttpTransportResponse, TransportError> {
            self.calls.lock().expect("lock").push(request);
            Ok(HttpTransportResponse {
                status: 200,
                headers: HeaderMap::new(),
                body: br#"{"flagged":false,"scores":{}}"#.to_vec(),
            })
        }

        async fn get(
            &self,
            _url: &str,
            _cancel: CancelHandle,
        ) -> Result<HttpTransportResponse, TransportError> {
            Err(TransportError::Network("unused".to_string()))
        }
    }

    fn client(config: Config) -> (ModerationClient, Arc<CountingTransport>, Arc<AppState>) {
        let transport = Arc::new(CountingTransport::default());
        let state = Arc::new(AppState::new());
        let client =
            ModerationClient::with_transport(Arc::new(config), transport.clone(), state.clone());
        (client, transport, state)
    }

    #[test]
    fn prepare_checks_in_order() {
        let (client, _, state) = client(
            Config::for_backend("http://localhost").with_max_input_chars(5),
        );
        state.set_network_online(false);

        assert_eq!(client.prepare("   \n\t"), Err(ModerationError::EmptyInput));
        assert_eq!(
            client.prepare("abcdef"),
            Err(ModerationError::InputTooLong {
                limit: 5,
                actual: 6
            })
        );
        assert_eq!(client.prepare("abc"), Err(ModerationError::NoConnectivity));

        state.set_network_online(true);
        let input = client.prepare("  abcde  ").unwrap();
        assert_eq!(input.text(), "abcde");
    }

    #[test]
    fn limit_counts_characters() {
        let (client, _, _) = client(
            Config::for_backend("http://localhost").with_max_input_chars(3),
        );
        assert!(client.prepare("日本語").is_ok());
        assert!(client.prepare("日本語!").is_err());
    }

    #[tokio::test]
    async fn proxy_mode_sends_trimmed_text_only() {
        let (client, transport, _) = client(Config::for_backend("http://localhost:3000"));
        client.analyze("  hello  ").await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "http://localhost:3000/moderate");
        assert_eq!(calls[0].body, serde_json::json!({ "text": "hello" }));
        assert!(calls[0].headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn direct_mode_sends_model_and_bearer() {
        let config = Config::new(
            "https://api.example.com/v1/moderations",
            "https://api.example.com/health",
        )
        .with_api_mode(ApiMode::Direct)
        .with_model("omni-moderation-latest")
        .with_api_key("sk-test");
        let (client, transport, _) = client(config);
        client.analyze("hi").await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(
            calls[0].body,
            serde_json::json!({ "input": "hi", "model": "omni-moderation-latest" })
        );
        assert_eq!(calls[0].headers.get(AUTHORIZATION).unwrap(), "Bearer sk-test");
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_transport() {
        let (client, transport, _) = client(
            Config::for_backend("http://localhost").with_max_input_chars(4),
        );
        assert!(client.analyze("").await.is_err());
        assert!(client.analyze("12345").await.is_err());
        assert!(transport.calls.lock().unwrap().is_empty());
    }
}
