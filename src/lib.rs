//! modlens
//!
//! Client-side orchestration for a text moderation front-end:
//! - [`health::HealthMonitor`] polls the backend and keeps an advisory availability state
//! - [`client::ModerationClient`] validates input and calls the moderation endpoint
//! - [`normalize`] folds upstream scores into six display categories and a verdict
//! - [`controller::AnalysisController`] is the command interface for the UI layer
//!
//! Rendering is delegated to a [`sink::PresentationSink`].
//!
//! # Example
//!
//! ```rust,ignore
//! use modlens::prelude::*;
//! use std::sync::Arc;
//!
//! let config = Arc::new(Config::for_backend("https://moderation-backend.example.com"));
//! config.validate()?;
//! let state = Arc::new(AppState::new());
//! let sink: Arc<dyn PresentationSink> = Arc::new(TracingSink);
//!
//! let monitor = HealthMonitor::new(config.clone(), state.clone(), sink.clone())?;
//! monitor.start()?;
//!
//! let client = ModerationClient::new(config, state.clone())?;
//! let controller = AnalysisController::new(client, state, sink);
//! if let SubmitOutcome::Completed(result) = controller.submit_analysis("some text").await {
//!     println!("{}", result.report());
//! }
//! ```
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod controller;
pub mod defaults;
pub mod error;
pub mod execution;
pub mod health;
pub mod normalize;
pub mod observability;
pub mod sink;
pub mod state;
pub mod types;
pub mod utils;

pub use error::ModerationError;

/// Commonly used items.
pub mod prelude {
    pub use crate::client::{ModerationClient, PreparedInput};
    pub use crate::config::{ApiMode, Config};
    pub use crate::controller::{AnalysisController, SubmitOutcome};
    pub use crate::error::{ErrorCategory, ErrorKind, ModerationError, summarize_error};
    pub use crate::execution::http::{HttpTransport, ReqwestTransport};
    pub use crate::health::HealthMonitor;
    pub use crate::normalize::{normalize, normalize_at};
    pub use crate::observability::{OutputFormat, TracingConfig, init_tracing};
    pub use crate::sink::{NoopSink, PresentationSink, TracingSink};
    pub use crate::state::AppState;
    pub use crate::types::{
        AnalysisResult, AvailabilityNotice, AvailabilityState, CategoryScores, CharacterBudget,
        DisplayCategory, FineCategory, RawModerationResponse, RiskTier,
    };
    pub use crate::utils::CancelHandle;
}
