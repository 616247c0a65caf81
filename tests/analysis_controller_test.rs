//! Analysis controller command flow: sink events, the single in-flight
//! analysis rule and the advisory slow-backend warning.

mod support;

use modlens::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use support::{RecordingSink, Reply, ScriptedTransport, SinkEvent};
use tokio::sync::Notify;

struct Harness {
    controller: Arc<AnalysisController>,
    transport: Arc<ScriptedTransport>,
    sink: Arc<RecordingSink>,
    state: Arc<AppState>,
    config: Arc<Config>,
}

fn harness_with(config: Config) -> Harness {
    let config = Arc::new(config);
    let transport = ScriptedTransport::new();
    let sink = RecordingSink::new();
    let state = Arc::new(AppState::new());
    let client = ModerationClient::with_transport(config.clone(), transport.clone(), state.clone());
    let controller = Arc::new(AnalysisController::new(client, state.clone(), sink.clone()));
    Harness {
        controller,
        transport,
        sink,
        state,
        config,
    }
}

fn harness() -> Harness {
    harness_with(Config::for_backend("http://backend.test"))
}

#[tokio::test]
async fn successful_analysis_reaches_the_sink() {
    let h = harness();
    h.transport.script_moderation([Reply::moderation(
        true,
        json!({ "violence": 0.81, "violence/graphic": 0.2, "hate": 0.05 }),
    )]);

    let outcome = h.controller.submit_analysis("  something violent  ").await;
    let SubmitOutcome::Completed(result) = outcome else {
        panic!("expected a completed analysis, got {outcome:?}");
    };
    assert_eq!(result.original_text, "something violent");
    assert_eq!(result.scores.violence, 81);
    assert_eq!(result.scores.hate, 5);
    assert_eq!(result.overall_score, 81);
    assert_eq!(result.tier(), RiskTier::High);
    assert!(result.flagged_by_upstream);

    let requests = h.transport.moderation_calls();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "http://backend.test/moderate");
    assert_eq!(requests[0].body, json!({ "text": "something violent" }));

    assert_eq!(
        h.sink.events(),
        vec![SinkEvent::Started, SinkEvent::Succeeded(result.clone())]
    );
    assert_eq!(h.controller.last_result(), Some(result));
    assert!(!h.controller.is_analyzing());
}

#[tokio::test]
async fn too_long_input_never_reaches_the_network() {
    let h = harness_with(Config::for_backend("http://backend.test").with_max_input_chars(10));

    let outcome = h.controller.submit_analysis("this is more than ten").await;
    assert!(matches!(
        outcome,
        SubmitOutcome::Failed(ModerationError::InputTooLong {
            limit: 10,
            actual: 21
        })
    ));
    assert!(h.transport.moderation_calls().is_empty());

    let events = h.sink.events();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        SinkEvent::Failed(ErrorKind::InputTooLong, _)
    ));
    assert!(!h.controller.is_analyzing());
}

#[tokio::test]
async fn empty_input_is_rejected_locally() {
    let h = harness();
    let outcome = h.controller.submit_analysis(" \n\t ").await;
    assert_eq!(outcome, SubmitOutcome::Failed(ModerationError::EmptyInput));
    assert!(h.transport.moderation_calls().is_empty());
    assert!(!h.sink.events().contains(&SinkEvent::Started));
}

#[tokio::test]
async fn offline_network_flag_blocks_submission() {
    let h = harness();
    h.controller.set_network_online(false);

    let outcome = h.controller.submit_analysis("hello").await;
    assert_eq!(outcome, SubmitOutcome::Failed(ModerationError::NoConnectivity));
    assert!(h.transport.moderation_calls().is_empty());
    assert!(matches!(
        h.sink.events().as_slice(),
        [SinkEvent::Failed(ErrorKind::NoConnectivity, _)]
    ));

    h.controller.set_network_online(true);
    assert!(matches!(
        h.controller.submit_analysis("hello").await,
        SubmitOutcome::Completed(_)
    ));
}

#[tokio::test]
async fn second_submit_is_ignored_while_one_is_in_flight() {
    let h = harness();
    let gate = Arc::new(Notify::new());
    h.transport.script_moderation([Reply::Gated(
        gate.clone(),
        Box::new(Reply::moderation(false, json!({ "sexual": 0.4 }))),
    )]);

    let first = tokio::spawn({
        let controller = h.controller.clone();
        async move { controller.submit_analysis("first").await }
    });
    while h.transport.moderation_calls().is_empty() {
        tokio::task::yield_now().await;
    }
    assert!(h.controller.is_analyzing());

    assert_eq!(
        h.controller.submit_analysis("second").await,
        SubmitOutcome::Ignored
    );
    assert_eq!(h.transport.moderation_calls().len(), 1);

    gate.notify_one();
    let outcome = first.await.unwrap();
    let SubmitOutcome::Completed(result) = outcome else {
        panic!("expected a completed analysis, got {outcome:?}");
    };
    assert_eq!(result.original_text, "first");
    assert_eq!(result.overall_score, 40);
    assert!(!h.controller.is_analyzing());

    // Slot is free again.
    assert!(matches!(
        h.controller.submit_analysis("third").await,
        SubmitOutcome::Completed(_)
    ));
    assert_eq!(h.transport.moderation_calls().len(), 2);
    let started = h
        .sink
        .events()
        .iter()
        .filter(|e| **e == SinkEvent::Started)
        .count();
    assert_eq!(started, 2);
}

#[tokio::test]
async fn degraded_backend_warns_but_still_sends() {
    let h = harness();
    let monitor = HealthMonitor::with_transport(
        h.config.clone(),
        h.transport.clone(),
        h.state.clone(),
        h.sink.clone(),
    );
    h.transport.script_health([Reply::status(500)]);
    assert_eq!(monitor.check_now().await, AvailabilityState::Offline);

    let outcome = h.controller.submit_analysis("hello").await;
    assert!(matches!(outcome, SubmitOutcome::Completed(_)));
    assert_eq!(h.transport.moderation_calls().len(), 1);

    let events = h.sink.events();
    let started = events.iter().position(|e| *e == SinkEvent::Started);
    let warned = events
        .iter()
        .position(|e| *e == SinkEvent::SlowBackend(AvailabilityState::Offline));
    assert!(started.is_some());
    assert!(warned > started);
}

#[tokio::test]
async fn unknown_availability_does_not_warn() {
    let h = harness();
    assert_eq!(h.state.availability(), AvailabilityState::Unknown);
    h.controller.submit_analysis("hello").await;
    assert!(
        !h.sink
            .events()
            .iter()
            .any(|e| matches!(e, SinkEvent::SlowBackend(_)))
    );
}

#[tokio::test(start_paused = true)]
async fn hung_request_times_out_and_releases_the_slot() {
    let h = harness();
    h.transport.script_moderation([Reply::Hang]);

    let outcome = h.controller.submit_analysis("hello").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(ModerationError::RequestTimeout {
            timeout: Duration::from_secs(40)
        })
    );
    assert!(!h.controller.is_analyzing());
    assert!(matches!(
        h.sink.events().last(),
        Some(SinkEvent::Failed(ErrorKind::RequestTimeout, _))
    ));
    assert_eq!(h.controller.last_result(), None);
}

#[tokio::test]
async fn http_errors_are_reported_with_their_kind() {
    let h = harness();
    h.transport
        .script_moderation([Reply::Json(429, json!({ "message": "slow down" }))]);

    let outcome = h.controller.submit_analysis("hello").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(ModerationError::RateLimited("slow down".to_string()))
    );
    assert_eq!(
        h.sink.events(),
        vec![
            SinkEvent::Started,
            SinkEvent::Failed(ErrorKind::RateLimited, "slow down".to_string()),
        ]
    );
}

#[tokio::test]
async fn new_analysis_clears_the_previous_result() {
    let h = harness();
    h.controller.submit_analysis("hello").await;
    assert!(h.controller.last_result().is_some());

    h.controller.new_analysis();
    assert_eq!(h.controller.last_result(), None);
    assert_eq!(h.sink.events().last(), Some(&SinkEvent::Cleared));
}

#[test]
fn character_budget_uses_configured_limit() {
    let h = harness_with(Config::for_backend("http://backend.test").with_max_input_chars(10));
    let budget = h.controller.character_budget("  123456789  ");
    assert_eq!(budget.used, 9);
    assert_eq!(budget.limit, 10);
    assert_eq!(budget.remaining, 1);
    assert!(budget.near_limit);
    assert!(!budget.over_limit);
}
