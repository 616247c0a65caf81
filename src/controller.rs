//! Analysis controller
//!
//! The command interface exposed to the presentation layer. It owns the
//! "one analysis at a time" rule and routes every outcome to the sink.

use crate::client::ModerationClient;
use crate::normalize::normalize;
use crate::sink::PresentationSink;
use crate::state::AppState;
use crate::types::{AnalysisResult, CharacterBudget};
use std::sync::Arc;

/// What happened to a `submit_analysis` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another analysis was in flight; nothing was done
    Ignored,
    /// The analysis finished and the sink received the result
    Completed(AnalysisResult),
    /// The analysis failed and the sink received the error
    Failed(crate::error::ModerationError),
}

pub struct AnalysisController {
    client: ModerationClient,
    state: Arc<AppState>,
    sink: Arc<dyn PresentationSink>,
}

impl std::fmt::Debug for AnalysisController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisController")
            .field("client", &self.client)
            .field("analyzing", &self.state.is_analyzing())
            .finish_non_exhaustive()
    }
}

impl AnalysisController {
    pub fn new(
        client: ModerationClient,
        state: Arc<AppState>,
        sink: Arc<dyn PresentationSink>,
    ) -> Self {
        Self {
            client,
            state,
            sink,
        }
    }

    /// Analyze `text` unless an analysis is already running.
    ///
    /// Input errors reach the sink without an `on_analysis_started` call.
    /// The in-flight flag is released on every path, including when the
    /// returned future is dropped.
    pub async fn submit_analysis(&self, text: &str) -> SubmitOutcome {
        let Some(_guard) = self.state.try_begin_analysis() else {
            tracing::debug!("analysis already in flight; ignoring submit");
            return SubmitOutcome::Ignored;
        };

        let input = match self.client.prepare(text) {
            Ok(input) => input,
            Err(err) => {
                self.sink.on_analysis_failed(err.kind(), &err.to_string());
                return SubmitOutcome::Failed(err);
            }
        };

        self.sink.on_analysis_started();
        let availability = self.state.availability();
        if availability.is_degraded() {
            self.sink.on_slow_backend_warning(availability);
        }

        match self.client.send(&input).await {
            Ok(raw) => {
                let result = normalize(&raw, input.text());
                self.state.store_result(result.clone());
                self.sink.on_analysis_succeeded(&result);
                SubmitOutcome::Completed(result)
            }
            Err(err) => {
                self.sink.on_analysis_failed(err.kind(), &err.to_string());
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Discard the last result and return to the input state.
    pub fn new_analysis(&self) {
        if self.state.clear_result().is_some() {
            tracing::debug!("previous analysis result discarded");
        }
        self.sink.on_cleared();
    }

    /// Update the local connectivity flag.
    pub fn set_network_online(&self, online: bool) {
        tracing::debug!(online, "network connectivity changed");
        self.state.set_network_online(online);
    }

    pub fn last_result(&self) -> Option<AnalysisResult> {
        self.state.last_result()
    }

    pub fn is_analyzing(&self) -> bool {
        self.state.is_analyzing()
    }

    /// Character counter for a draft.
    pub fn character_budget(&self, text: &str) -> CharacterBudget {
        CharacterBudget::measure(text, self.client.config().max_input_chars)
    }
}
