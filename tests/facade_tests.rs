use std::sync::Arc;
use std::time::Duration;

use seatflow_rust::{
    spawn_session, CompletedStage, InMemoryAssetSource, InMemoryWorkflowEngine, LaunchParams,
    SectionConfig, SessionConfig, Stage, VenueId,
};
use tokio_test::assert_ok;

#[tokio::test(start_paused = true)]
async fn facade_runs_model_stage_in_memory() {
    let assets = InMemoryAssetSource::new();
    let engine = InMemoryWorkflowEngine::new(assets.clone());
    let handle = spawn_session(
        VenueId::new("facade"),
        Arc::new(engine),
        Arc::new(assets),
        SessionConfig { poll_interval: Duration::from_millis(100), ..SessionConfig::default() },
    );
    assert_ok!(handle.wait_for(|v| v.assets.is_some()).await);

    let sections = [("101".to_string(), SectionConfig::default())].into_iter().collect();
    assert_ok!(handle.request_stage(Stage::Model, LaunchParams { sections, ..LaunchParams::default() }).await);
    let view = assert_ok!(handle.wait_for(|v| v.completed == CompletedStage::Model && v.is_idle()).await);
    assert_eq!(view.progress.percent, 100.0);
    assert!(view.error.is_none());
}
