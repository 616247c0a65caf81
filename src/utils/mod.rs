//! Utility Module
//!
//! Contains cancellation primitives shared by the client and the health monitor.

pub mod cancel;

pub use cancel::{CancelHandle, Interrupted, run_with_deadline};
