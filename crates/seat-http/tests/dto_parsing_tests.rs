use seat_core::{CompletedStage, RemoteStage};
use seat_http::dto::{AssetsResponse, CancelResponse, ErrorBody, ProgressResponse, StartResponse};
use seat_http::HttpError;

#[test]
fn start_response_carries_the_workflow_id() {
    let body = r#"{"workflow_id":"venue-pipeline-arena-1a2b3c4d","status":"started","message":"Pipeline started for venue arena"}"#;
    let parsed: StartResponse = serde_json::from_str(body).unwrap();
    assert_eq!(parsed.workflow_id.as_str(), "venue-pipeline-arena-1a2b3c4d");
}

#[test]
fn rendering_progress_uses_the_depth_counter() {
    let body = r#"{
        "workflow_id": "wf-1",
        "stage": "rendering_depths",
        "current_step": 2,
        "total_steps": 4,
        "message": "Rendering depth maps for 18 seats",
        "seats_generated": 1240,
        "depth_maps_rendered": 9,
        "images_generated": 0,
        "estimated_cost": 0.54,
        "actual_cost": 0.0,
        "failed_items": []
    }"#;
    let snapshot = serde_json::from_str::<ProgressResponse>(body).unwrap().into_snapshot();
    assert_eq!(snapshot.remote_stage, RemoteStage::RenderingDepths);
    assert_eq!((snapshot.items_done, snapshot.items_target), (9, 0));
    assert_eq!(snapshot.message, "Rendering depth maps for 18 seats");
}

#[test]
fn explicit_counters_win_over_stage_counters() {
    let body = r#"{"workflow_id":"wf-1","stage":"generating_images","images_generated":3,"items_done":4,"items_target":18}"#;
    let snapshot = serde_json::from_str::<ProgressResponse>(body).unwrap().into_snapshot();
    assert_eq!((snapshot.items_done, snapshot.items_target), (4, 18));
}

#[test]
fn terminal_fallback_bodies_parse() {
    let body = r#"{"workflow_id":"wf-1","stage":"completed","current_step":4,"total_steps":4,"message":"Pipeline completed"}"#;
    let snapshot = serde_json::from_str::<ProgressResponse>(body).unwrap().into_snapshot();
    assert!(snapshot.is_terminal());
    assert_eq!(snapshot.items_done, 0);
}

#[test]
fn unknown_remote_stage_is_kept() {
    let body = r#"{"workflow_id":"wf-1","stage":"upscaling","message":"Upscaling"}"#;
    let snapshot = serde_json::from_str::<ProgressResponse>(body).unwrap().into_snapshot();
    assert_eq!(snapshot.remote_stage, RemoteStage::Unknown("upscaling".into()));
}

#[test]
fn assets_body_maps_to_a_snapshot() {
    let body = r#"{"venue_id":"arena","has_model":true,"depth_map_count":12,"image_count":0,"model_url":"https://cdn/arena/venue_model.glb","preview_url":null}"#;
    let snapshot = serde_json::from_str::<AssetsResponse>(body).unwrap().into_snapshot().unwrap();
    assert_eq!(snapshot.completed_stage(), CompletedStage::Depths);
    assert_eq!(snapshot.model_url.as_deref(), Some("https://cdn/arena/venue_model.glb"));
}

#[test]
fn assets_body_with_error_is_a_fetch_failure() {
    let body = r#"{"venue_id":"arena","has_model":false,"depth_map_count":0,"image_count":0,"error":"storage unavailable"}"#;
    let err = serde_json::from_str::<AssetsResponse>(body).unwrap().into_snapshot().unwrap_err();
    assert!(matches!(err, HttpError::Remote(ref m) if m == "storage unavailable"));
    assert!(matches!(err.into_fetch(), seat_core::PipelineError::Fetch(_)));
}

#[test]
fn cancel_ack_parses() {
    let parsed: CancelResponse = serde_json::from_str(r#"{"status":"cancel_requested","workflow_id":"wf-1"}"#).unwrap();
    assert_eq!(parsed.status, "cancel_requested");
}

#[test]
fn error_detail_is_extracted() {
    assert_eq!(ErrorBody::detail_of(r#"{"detail":"Workflow not found: wf-9"}"#), "Workflow not found: wf-9");
    assert_eq!(ErrorBody::detail_of("Bad Gateway"), "Bad Gateway");
}
