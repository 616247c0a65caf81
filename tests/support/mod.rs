//! Test doubles shared by the integration tests: a scripted in-memory
//! transport and a sink that records every event.
#![allow(dead_code)]

use async_trait::async_trait;
use modlens::error::ErrorKind;
use modlens::execution::http::{
    HttpTransport, HttpTransportRequest, HttpTransportResponse, TransportError,
};
use modlens::sink::PresentationSink;
use modlens::types::{AnalysisResult, AvailabilityState};
use modlens::utils::CancelHandle;
use reqwest::header::HeaderMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// One scripted reply.
#[derive(Clone)]
pub enum Reply {
    /// Respond with a status and a JSON body
    Json(u16, serde_json::Value),
    /// Fail with a network error
    Network,
    /// Never answer; only returns once the cancel handle fires
    Hang,
    /// Wait for the gate, then respond with the inner reply
    Gated(Arc<Notify>, Box<Reply>),
}

impl Reply {
    pub fn ok() -> Self {
        Reply::Json(200, serde_json::json!({ "status": "ok" }))
    }

    pub fn status(status: u16) -> Self {
        Reply::Json(status, serde_json::json!({}))
    }

    pub fn moderation(flagged: bool, scores: serde_json::Value) -> Self {
        Reply::Json(200, serde_json::json!({ "flagged": flagged, "scores": scores }))
    }
}

/// In-memory transport answering from per-route scripts.
///
/// When a script runs dry the health route answers 200 and the moderation
/// route answers an all-zero result.
#[derive(Default)]
pub struct ScriptedTransport {
    health: Mutex<VecDeque<Reply>>,
    moderation: Mutex<VecDeque<Reply>>,
    health_calls: AtomicUsize,
    moderation_calls: Mutex<Vec<HttpTransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_health(&self, replies: impl IntoIterator<Item = Reply>) {
        self.health.lock().expect("lock").extend(replies);
    }

    pub fn script_moderation(&self, replies: impl IntoIterator<Item = Reply>) {
        self.moderation.lock().expect("lock").extend(replies);
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn moderation_calls(&self) -> Vec<HttpTransportRequest> {
        self.moderation_calls.lock().expect("lock").clone()
    }

    async fn play(
        reply: Reply,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        let mut reply = reply;
        loop {
            match reply {
                Reply::Json(status, body) => {
                    return Ok(HttpTransportResponse {
                        status,
                        headers: HeaderMap::new(),
                        body: serde_json::to_vec(&body).expect("json bytes"),
                    });
                }
                Reply::Network => {
                    return Err(TransportError::Network("connection refused".to_string()));
                }
                Reply::Hang => {
                    cancel.cancelled().await;
                    return Err(TransportError::Cancelled);
                }
                Reply::Gated(gate, inner) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                        _ = gate.notified() => reply = *inner,
                    }
                }
            }
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post_json(
        &self,
        request: HttpTransportRequest,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        self.moderation_calls.lock().expect("lock").push(request);
        let reply = self
            .moderation
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Reply::moderation(false, serde_json::json!({})));
        Self::play(reply, cancel).await
    }

    async fn get(
        &self,
        _url: &str,
        cancel: CancelHandle,
    ) -> Result<HttpTransportResponse, TransportError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .health
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(Reply::ok);
        Self::play(reply, cancel).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Availability(AvailabilityState, bool),
    Started,
    Succeeded(AnalysisResult),
    Failed(ErrorKind, String),
    SlowBackend(AvailabilityState),
    Cleared,
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().expect("lock").clone()
    }

    /// Availability events that asked for a user notification.
    pub fn notifications(&self) -> Vec<AvailabilityState> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Availability(state, true) => Some(state),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.events.lock().expect("lock").push(event);
    }
}

impl PresentationSink for RecordingSink {
    fn on_availability_changed(&self, state: AvailabilityState, notify: bool) {
        self.push(SinkEvent::Availability(state, notify));
    }

    fn on_analysis_started(&self) {
        self.push(SinkEvent::Started);
    }

    fn on_analysis_succeeded(&self, result: &AnalysisResult) {
        self.push(SinkEvent::Succeeded(result.clone()));
    }

    fn on_analysis_failed(&self, kind: ErrorKind, message: &str) {
        self.push(SinkEvent::Failed(kind, message.to_string()));
    }

    fn on_slow_backend_warning(&self, state: AvailabilityState) {
        self.push(SinkEvent::SlowBackend(state));
    }

    fn on_cleared(&self) {
        self.push(SinkEvent::Cleared);
    }
}
