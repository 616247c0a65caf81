//! Shared application state
//!
//! One `AppState` is created per front-end session and handed to every
//! component as `Arc<AppState>`. The availability cell has a single writer
//! (the health monitor); readers may observe it change between read and use.

use crate::types::{AnalysisResult, AvailabilityState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::watch;

#[derive(Debug)]
pub struct AppState {
    availability: watch::Sender<AvailabilityState>,
    network_online: AtomicBool,
    analyzing: AtomicBool,
    last_result: RwLock<Option<AnalysisResult>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        let (availability, _) = watch::channel(AvailabilityState::Unknown);
        Self {
            availability,
            network_online: AtomicBool::new(true),
            analyzing: AtomicBool::new(false),
            last_result: RwLock::new(None),
        }
    }

    /// Last known availability.
    pub fn availability(&self) -> AvailabilityState {
        *self.availability.borrow()
    }

    /// Receiver notified on every availability change.
    pub fn subscribe_availability(&self) -> watch::Receiver<AvailabilityState> {
        self.availability.subscribe()
    }

    /// Replace the availability, returning the previous value.
    pub(crate) fn replace_availability(&self, next: AvailabilityState) -> AvailabilityState {
        self.availability.send_replace(next)
    }

    /// Local network connectivity flag, fed by the embedding front-end.
    pub fn is_network_online(&self) -> bool {
        self.network_online.load(Ordering::SeqCst)
    }

    pub fn set_network_online(&self, online: bool) {
        self.network_online.store(online, Ordering::SeqCst);
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.load(Ordering::SeqCst)
    }

    /// Claim the single analysis slot. `None` if an analysis is already in flight.
    pub(crate) fn try_begin_analysis(&self) -> Option<AnalysisGuard<'_>> {
        self.analyzing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| AnalysisGuard { state: self })
    }

    pub fn last_result(&self) -> Option<AnalysisResult> {
        self.last_result
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn store_result(&self, result: AnalysisResult) {
        *self
            .last_result
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(result);
    }

    pub(crate) fn clear_result(&self) -> Option<AnalysisResult> {
        self.last_result
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Releases the analysis slot when dropped.
#[derive(Debug)]
pub(crate) struct AnalysisGuard<'a> {
    state: &'a AppState,
}

impl Drop for AnalysisGuard<'_> {
    fn drop(&mut self) {
        self.state.analyzing.store(false, Ordering::SeqCst);
    }
}
