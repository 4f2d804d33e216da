//! Demo local: recorre Model → Depths → Images contra el motor en memoria e
//! imprime la proyección de progreso y la traza de eventos de la sesión.
use std::sync::Arc;
use std::time::Duration;

use log::info;
use seatflow_rust::config::session_from_env;
use seatflow_rust::{
    event_codes, spawn_session_with_log, AppError, EventLog, InMemoryAssetSource, InMemoryWorkflowEngine,
    LaunchParams, PipelineError, SectionConfig, SectionMap, SessionHandle, SessionView, SharedEventLog, Stage, VenueId,
};

fn demo_sections() -> SectionMap {
    ["101", "102", "201", "202", "301"]
        .into_iter()
        .map(|id| {
            let tier = if id.starts_with('1') { "lower" } else if id.starts_with('2') { "mid" } else { "upper" };
            (id.to_string(), SectionConfig { tier: tier.to_string(), ..SectionConfig::default() })
        })
        .collect()
}

/// Sigue las vistas hasta que la sesión vuelve a idle tras `stage`.
async fn follow(handle: &SessionHandle, stage: Stage) -> Result<SessionView, AppError> {
    let mut views = handle.subscribe();
    let mut started = false;
    let mut last_label = String::new();
    loop {
        if views.changed().await.is_err() {
            return Err(PipelineError::Internal("session stopped unexpectedly".to_string()).into());
        }
        let view = views.borrow_and_update().clone();
        started |= view.active_stage.is_some();
        if view.progress.label != last_label {
            println!("  {:>5.1}%  {}", view.progress.percent, view.progress.label);
            last_label = view.progress.label.clone();
        }
        if view.is_idle() && (started || view.error.is_some() || view.completed.reaches(stage)) {
            return Ok(view);
        }
    }
}

async fn run_demo() -> Result<(), AppError> {
    let mut config = session_from_env()?;
    if std::env::var("SEATFLOW_POLL_INTERVAL_MS").is_err() {
        config.poll_interval = Duration::from_millis(50);
    }

    let assets = InMemoryAssetSource::new();
    let engine = InMemoryWorkflowEngine::new(assets.clone());
    let log = SharedEventLog::default();
    let handle = spawn_session_with_log(
        VenueId::new("demo-arena"),
        Arc::new(engine.clone()),
        Arc::new(assets.clone()),
        config,
        log.clone(),
    );

    let mounted = handle.wait_for(|v| v.assets.is_some() || v.error.is_some()).await?;
    println!("venue {} mounted at {}", mounted.venue_id, mounted.completed);
    let params = LaunchParams { sections: demo_sections(), ..LaunchParams::default() };

    for stage in Stage::ALL {
        println!("{stage}:");
        handle.request_stage(stage, params.clone()).await?;
        let view = follow(&handle, stage).await?;
        if let Some(error) = view.error {
            println!("  stopped: {error}");
            break;
        }
        if let Some(snapshot) = &view.assets {
            println!(
                "  assets: model={} depth_maps={} images={}",
                snapshot.has_model, snapshot.depth_map_count, snapshot.image_count
            );
        }
    }

    let last = handle.view();
    let _ = handle.shutdown().await;
    info!("demo:done venue={} completed={}", last.venue_id, last.completed);
    println!("completed stage: {}", last.completed);
    println!("event trace: {}", event_codes(&log.list(last.session_id)));
    Ok(())
}

#[tokio::main]
async fn main() {
    seat_http::init_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run_demo().await {
        eprintln!("[seatflow-demo] {err}");
        std::process::exit(err.exit_code());
    }
}
