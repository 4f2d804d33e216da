mod common;

use std::time::Duration;

use common::{harness, params};
use seat_core::event::event_codes;
use seat_core::{CompletedStage, EngineScript, EventLog, ErrorKind, SessionConfig, Stage};
use tokio::time::Instant;
use tokio_test::assert_ok;

#[tokio::test(start_paused = true)]
async fn slow_queries_never_overlap() {
    let script = EngineScript { poll_delay: Duration::from_secs(5), ..Default::default() };
    let h = harness().with_script(script).mount().await;
    assert_ok!(h.handle.wait_for(|v| v.assets.is_some()).await);

    assert_ok!(h.handle.request_stage(Stage::Model, params(2)).await);
    assert_ok!(h.handle.wait_for(|v| v.is_idle() && v.completed == CompletedStage::Model).await);
    assert_eq!(h.engine.max_concurrent_polls(), 1);
}

#[tokio::test(start_paused = true)]
async fn first_query_waits_one_interval() {
    let h = harness().mount().await;
    assert_ok!(h.handle.wait_for(|v| v.assets.is_some()).await);
    let start = Instant::now();
    assert_ok!(h.handle.request_stage(Stage::Model, params(1)).await);
    assert_ok!(h.handle.wait_for(|v| v.snapshot.is_some()).await);
    assert!(start.elapsed() >= Duration::from_secs(2));
    assert_eq!(h.engine.poll_count().await, 1);
}

#[tokio::test(start_paused = true)]
async fn polling_stops_after_a_terminal_state() {
    let h = harness().mount().await;
    assert_ok!(h.handle.wait_for(|v| v.assets.is_some()).await);
    assert_ok!(h.handle.request_stage(Stage::Model, params(1)).await);
    assert_ok!(h.handle.wait_for(|v| v.is_idle() && v.completed == CompletedStage::Model).await);

    let polls = h.engine.poll_count().await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(h.engine.poll_count().await, polls);
}

#[tokio::test(start_paused = true)]
async fn transient_failures_below_the_threshold_stay_quiet() {
    let h = harness().mount().await;
    assert_ok!(h.handle.wait_for(|v| v.assets.is_some()).await);
    h.engine.fail_next_polls(3).await;

    assert_ok!(h.handle.request_stage(Stage::Model, params(1)).await);
    let view = assert_ok!(h.handle.wait_for(|v| v.is_idle() && v.completed == CompletedStage::Model).await);
    assert!(view.error.is_none());
    let trace = event_codes(&h.log.list(view.session_id));
    assert!(trace.contains("ppp"), "trace {trace}");
    assert!(!trace.contains('E'), "trace {trace}");
}

#[tokio::test(start_paused = true)]
async fn repeated_failures_escalate_and_recover() {
    let config = SessionConfig { max_consecutive_poll_failures: 5, ..SessionConfig::default() };
    let h = harness().with_config(config).mount().await;
    assert_ok!(h.handle.wait_for(|v| v.assets.is_some()).await);
    h.engine.fail_next_polls(6).await;

    assert_ok!(h.handle.request_stage(Stage::Model, params(1)).await);
    let view = assert_ok!(h.handle.wait_for(|v| v.error.is_some()).await);
    assert_eq!(view.error_kind(), Some(ErrorKind::Poll));
    assert_eq!(view.consecutive_poll_failures, 5);
    assert_eq!(view.active_stage, Some(Stage::Model));

    let view = assert_ok!(h.handle.wait_for(|v| v.is_idle() && v.completed == CompletedStage::Model).await);
    assert!(view.error.is_none());
    let trace = event_codes(&h.log.list(view.session_id));
    assert_eq!(trace.matches('E').count(), 1, "trace {trace}");
    assert!(trace.contains("pppppEpP"), "trace {trace}");
}
