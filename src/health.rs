//! Health monitor
//!
//! Polls the liveness endpoint in the background and keeps the advisory
//! [`AvailabilityState`] in [`AppState`] current. Poll cadence follows the
//! state: the online interval while the backend answers, the offline
//! interval otherwise. Exactly one poll timer is armed at any time.

use crate::config::Config;
use crate::error::ModerationError;
use crate::execution::http::{HttpTransport, ReqwestTransport, TransportError};
use crate::sink::PresentationSink;
use crate::state::AppState;
use crate::types::{AvailabilityNotice, AvailabilityState, ProbeOutcome};
use crate::utils::{CancelHandle, Interrupted, run_with_deadline};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub struct HealthMonitor {
    inner: Arc<MonitorInner>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct MonitorInner {
    config: Arc<Config>,
    transport: Arc<dyn HttpTransport>,
    state: Arc<AppState>,
    sink: Arc<dyn PresentationSink>,
    /// Serializes probes so transitions apply in order
    probe_lock: tokio::sync::Mutex<()>,
    /// Re-arms the poll timer after a manual check
    rearm: Notify,
}

impl std::fmt::Debug for HealthMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthMonitor")
            .field("health_url", &self.inner.config.health_url)
            .field("state", &self.inner.state.availability())
            .field("running", &self.is_running())
            .finish()
    }
}

impl HealthMonitor {
    /// Create a monitor using the default `reqwest` transport.
    pub fn new(
        config: Arc<Config>,
        state: Arc<AppState>,
        sink: Arc<dyn PresentationSink>,
    ) -> Result<Self, ModerationError> {
        let transport = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transport(config, transport, state, sink))
    }

    /// Create a monitor over a custom transport.
    pub fn with_transport(
        config: Arc<Config>,
        transport: Arc<dyn HttpTransport>,
        state: Arc<AppState>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                config,
                transport,
                state,
                sink,
                probe_lock: tokio::sync::Mutex::new(()),
                rearm: Notify::new(),
            }),
            task: Mutex::new(None),
        }
    }

    /// Start the polling loop on the current Tokio runtime.
    ///
    /// The first probe runs immediately and never emits a notice. Calling
    /// `start` on a running monitor does nothing. The loop stops when the
    /// monitor is dropped.
    pub fn start(&self) -> Result<(), ModerationError> {
        let mut task = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            ModerationError::ConfigurationError(
                "health monitor must be started inside a Tokio runtime".to_string(),
            )
        })?;
        tracing::info!(url = %self.inner.config.health_url, "starting health monitor");
        *task = Some(runtime.spawn(self.inner.clone().run()));
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Probe now, apply the transition and re-arm the poll timer.
    pub async fn check_now(&self) -> AvailabilityState {
        let state = self.inner.probe(true).await;
        self.inner.rearm.notify_one();
        state
    }

    /// Last known availability.
    pub fn state(&self) -> AvailabilityState {
        self.inner.state.availability()
    }
}

impl Drop for HealthMonitor {
    fn drop(&mut self) {
        if let Some(task) = self
            .task
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

impl MonitorInner {
    async fn run(self: Arc<Self>) {
        let mut current = self.probe(false).await;
        loop {
            let delay = current.poll_interval(
                self.config.online_poll_interval,
                self.config.offline_poll_interval,
            );
            tracing::trace!(delay_ms = delay.as_millis() as u64, "next health check scheduled");

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    current = self.probe(true).await;
                }
                _ = self.rearm.notified() => {
                    current = self.state.availability();
                }
            }
        }
    }

    /// Run one probe and publish the resulting state.
    async fn probe(&self, notify: bool) -> AvailabilityState {
        let _serial = self.probe_lock.lock().await;

        let outcome = self.probe_once().await;
        let next = self.state.availability().after_probe(outcome);
        let previous = self.state.replace_availability(next);
        let notice = notify
            .then(|| AvailabilityNotice::between(previous, next))
            .flatten();

        if let Some(notice) = notice {
            tracing::info!(from = %previous, to = %next, "{}", notice.message());
        } else if previous != next {
            tracing::debug!(from = %previous, to = %next, "availability changed");
        }

        if previous != next || notice.is_some() {
            self.sink.on_availability_changed(next, notice.is_some());
        }
        next
    }

    async fn probe_once(&self) -> ProbeOutcome {
        let cancel = CancelHandle::new();
        let outcome = run_with_deadline(
            self.transport.get(&self.config.health_url, cancel.clone()),
            self.config.health_check_timeout,
            &cancel,
        )
        .await;

        match outcome {
            Ok(Ok(response)) if response.is_success() => ProbeOutcome::Healthy,
            Ok(Ok(response)) => {
                tracing::debug!(
                    status = response.status,
                    "health check returned non-success status"
                );
                ProbeOutcome::Failed
            }
            Ok(Err(TransportError::Network(detail))) => {
                tracing::debug!(error = %detail, "health check failed");
                ProbeOutcome::Failed
            }
            Ok(Err(TransportError::Cancelled))
            | Err(Interrupted::DeadlineElapsed)
            | Err(Interrupted::Cancelled) => {
                tracing::debug!(
                    timeout_ms = self.config.health_check_timeout.as_millis() as u64,
                    "health check timed out"
                );
                ProbeOutcome::TimedOut
            }
        }
    }
}
