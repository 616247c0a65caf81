//! Default `reqwest`-backed transport.

use super::transport::{HttpTransport, HttpTransportRequest, HttpTransportResponse, TransportError};
use crate::config::Config;
use crate::error::ModerationError;
use crate::utils::CancelHandle;
use async_trait::async_trait;

/// [`HttpTransport`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the connect timeout and user agent from `config`.
    ///
    /// No overall request timeout is set here: deadlines are enforced by the
    /// callers through their cancel handles.
    pub fn new(config: &Config) -> Result<Self, ModerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                ModerationError::ConfigurationError(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(
        request: reqwest::RequestBuilder,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        let exchange = async {
            let response = request.send().await.map_err(network_error)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(network_error)?;
            Ok(HttpTransportResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            result = exchange => result,
        }
    }
}

fn network_error(err: reqwest::Error) -> TransportError {
    TransportError::Network(err.to_string())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        request: HttpTransportRequest,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        let builder = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .json(&request.body);
        Self::send(builder, cancel).await
    }

    async fn get(
        &self,
        url: &str,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        Self::send(self.client.get(url), cancel).await
    }
}
