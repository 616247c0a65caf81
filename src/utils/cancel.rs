//! Cancellation utilities
//!
//! Provides first-class cancellation handles for in-flight HTTP operations.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    /// Create a new cancel handle.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. Transports observing this handle abandon the
    /// request, which drops the underlying HTTP connection.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// A handle cancelled together with this one, but cancellable on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}

/// Why [`run_with_deadline`] did not produce a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupted {
    /// The deadline elapsed; the handle was cancelled
    DeadlineElapsed,
    /// The handle was cancelled by someone else
    Cancelled,
}

/// Drive `operation` until it completes, `deadline` elapses or `cancel` fires.
///
/// On deadline the handle is cancelled so the operation can release its
/// resources; the operation future is dropped either way.
pub async fn run_with_deadline<F, T>(
    operation: F,
    deadline: Duration,
    cancel: &CancelHandle,
) -> Result<T, Interrupted>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Interrupted::Cancelled),
        _ = tokio::time::sleep(deadline) => {
            cancel.cancel();
            Err(Interrupted::DeadlineElapsed)
        }
        out = operation => Ok(out),
    }
}
