//! Presentation sink
//!
//! The boundary between the orchestration core and whatever renders it.
//! Implementations must be cheap and non-blocking; they are called inline
//! from the health loop and the analysis path.

use crate::error::ErrorKind;
use crate::types::{AnalysisResult, AvailabilityNotice, AvailabilityState};

pub trait PresentationSink: Send + Sync {
    /// Availability changed or a transition notice is due (`notify`).
    fn on_availability_changed(&self, state: AvailabilityState, notify: bool);

    fn on_analysis_started(&self);

    fn on_analysis_succeeded(&self, result: &AnalysisResult);

    fn on_analysis_failed(&self, kind: ErrorKind, message: &str);

    /// The backend is waking up or offline; the request may be slow.
    fn on_slow_backend_warning(&self, _state: AvailabilityState) {}

    /// The last result was discarded by a new-analysis action.
    fn on_cleared(&self) {}
}

/// Sink that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl PresentationSink for NoopSink {
    fn on_availability_changed(&self, _state: AvailabilityState, _notify: bool) {}
    fn on_analysis_started(&self) {}
    fn on_analysis_succeeded(&self, _result: &AnalysisResult) {}
    fn on_analysis_failed(&self, _kind: ErrorKind, _message: &str) {}
}

/// Sink that reports every event through `tracing`. Handy for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn on_availability_changed(&self, state: AvailabilityState, notify: bool) {
        if notify {
            let message = match state {
                AvailabilityState::Online => AvailabilityNotice::BackOnline.message(),
                AvailabilityState::Waking => AvailabilityNotice::WakingUp.message(),
                AvailabilityState::Offline => AvailabilityNotice::WentOffline.message(),
                AvailabilityState::Unknown => "Server status unknown",
            };
            tracing::info!(state = %state, "{message}");
        } else {
            tracing::debug!(state = %state, "availability changed");
        }
    }

    fn on_analysis_started(&self) {
        tracing::debug!("analysis started");
    }

    fn on_analysis_succeeded(&self, result: &AnalysisResult) {
        tracing::info!(
            overall_score = result.overall_score,
            tier = %result.tier(),
            flagged_by_upstream = result.flagged_by_upstream,
            "analysis succeeded"
        );
    }

    fn on_analysis_failed(&self, kind: ErrorKind, message: &str) {
        tracing::warn!(kind = %kind, "analysis failed: {message}");
    }

    fn on_slow_backend_warning(&self, state: AvailabilityState) {
        tracing::warn!(state = %state, "backend may be slow to respond");
    }

    fn on_cleared(&self) {
        tracing::debug!("analysis result cleared");
    }
}
