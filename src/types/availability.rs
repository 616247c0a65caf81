//! Backend availability as seen by the health monitor.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Belief about backend reachability. Advisory only: it never blocks a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityState {
    /// No probe has completed yet
    #[default]
    Unknown,
    /// Last probe answered with a 2xx status
    Online,
    /// Last probe failed with a non-2xx status or a transport error
    Offline,
    /// Last probe timed out; the backend is likely cold-starting
    Waking,
}

/// Result of a single liveness probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Healthy,
    TimedOut,
    Failed,
}

impl AvailabilityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Waking => "waking",
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    /// Whether requests should expect extra latency or failure.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Offline | Self::Waking)
    }

    /// State after a probe completed with `outcome`.
    pub fn after_probe(self, outcome: ProbeOutcome) -> Self {
        match outcome {
            ProbeOutcome::Healthy => Self::Online,
            ProbeOutcome::TimedOut => Self::Waking,
            ProbeOutcome::Failed => Self::Offline,
        }
    }

    /// Delay before the next probe given the current state.
    pub fn poll_interval(&self, online: Duration, offline: Duration) -> Duration {
        if self.is_online() { online } else { offline }
    }
}

impl std::fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-facing notification emitted on a meaningful availability transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityNotice {
    BackOnline,
    WakingUp,
    WentOffline,
}

impl AvailabilityNotice {
    /// Notification owed for the transition `previous -> next`, if any.
    ///
    /// Repeated identical states never notify, and an offline notice only
    /// follows a known-online backend.
    pub fn between(previous: AvailabilityState, next: AvailabilityState) -> Option<Self> {
        use AvailabilityState::*;
        match (previous, next) {
            (Online, Online) => None,
            (_, Online) => Some(Self::BackOnline),
            (Online | Unknown, Waking) => Some(Self::WakingUp),
            (Online, Offline) => Some(Self::WentOffline),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::BackOnline => "Server is online",
            Self::WakingUp => "Server is starting up. The first analysis may take up to a minute",
            Self::WentOffline => "Server is offline. Retrying in the background",
        }
    }
}
