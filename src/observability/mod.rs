//! Observability
//!
//! Installs the process-wide `tracing` subscriber. Library code only emits
//! events; embedders decide whether and how to collect them.

pub mod tracing;

pub use self::tracing::{OutputFormat, TracingConfig, init_tracing};
