use std::path::PathBuf;
use std::sync::Arc;
use clap::{Parser, Subcommand};
use log::debug;
use seat_core::{
    project, spawn_session, AiModel, AssetSource, GenerationParams, LaunchParams, PipelineError, SectionMap,
    SessionView, Stage, SurfaceType, VenueId, WorkflowClient, WorkflowId,
};
use seat_http::config::session_from_env;
use seat_http::{HttpError, HttpPipelineApi};

/// Operador del pipeline de vistas por asiento.
#[derive(Debug, Parser)]
#[command(name = "seat", version, about = "Drive the seat-view pipeline (3D model, depth maps, AI images)")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show persisted artifacts and the stage they imply.
    Assets { venue: String },
    /// Launch a stage and follow it until it ends.
    Run {
        venue: String,
        /// model | depths | images
        stage: Stage,
        /// JSON file with the section map (`{"101": {"tier": "lower", ...}}`).
        #[arg(long)]
        sections: PathBuf,
        /// Comma-separated section ids (default: all).
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        model: Option<AiModel>,
        #[arg(long)]
        strength: Option<f64>,
        #[arg(long)]
        surface: Option<SurfaceType>,
        #[arg(long)]
        event_type: Option<String>,
    },
    /// Follow an existing workflow until it reaches a terminal state.
    Watch { workflow: String },
    /// Request cancellation of a workflow.
    Cancel { workflow: String },
}

struct CliFailure {
    code: i32,
    message: String,
}

impl From<HttpError> for CliFailure {
    fn from(err: HttpError) -> Self { Self { code: 2, message: err.to_string() } }
}

impl From<PipelineError> for CliFailure {
    fn from(err: PipelineError) -> Self { Self { code: 3, message: err.to_string() } }
}

type CliResult = Result<(), CliFailure>;

fn print_view(view: &SessionView) {
    println!("{:>5.1}%  {}", view.progress.percent, view.progress.label);
}

async fn assets(api: &HttpPipelineApi, venue: String) -> CliResult {
    let snapshot = api.get_asset_snapshot(&VenueId::new(venue)).await?;
    let body = serde_json::to_string_pretty(&snapshot).map_err(|e| CliFailure { code: 1, message: e.to_string() })?;
    println!("{body}");
    println!("completed stage: {}", snapshot.completed_stage());
    if let Some(violation) = snapshot.invariant_violation() {
        println!("warning: {violation}");
    }
    Ok(())
}

fn launch_params(
    sections: PathBuf,
    select: Vec<String>,
    prompt: Option<String>,
    model: Option<AiModel>,
    strength: Option<f64>,
    surface: Option<SurfaceType>,
    event_type: Option<String>,
) -> Result<LaunchParams, CliFailure> {
    let raw = std::fs::read_to_string(&sections)
        .map_err(|e| CliFailure { code: 1, message: format!("{}: {e}", sections.display()) })?;
    let sections: SectionMap = serde_json::from_str(&raw)
        .map_err(|e| CliFailure { code: 1, message: format!("{}: {e}", sections.display()) })?;
    let defaults = GenerationParams::default();
    let generation = GenerationParams {
        prompt: prompt.unwrap_or(defaults.prompt),
        model: model.unwrap_or(defaults.model),
        strength: strength.unwrap_or(defaults.strength),
        surface_type: surface.unwrap_or(defaults.surface_type),
        event_type_id: event_type,
        ..GenerationParams::default()
    };
    Ok(LaunchParams { sections, selected_section_ids: select, generation })
}

async fn run(api: HttpPipelineApi, venue: String, stage: Stage, params: LaunchParams) -> CliResult {
    let api = Arc::new(api);
    let config = session_from_env()?;
    let handle = spawn_session(
        VenueId::new(venue),
        Arc::clone(&api) as Arc<dyn WorkflowClient>,
        api as Arc<dyn AssetSource>,
        config,
    );

    let view = handle.wait_for(|v| v.assets.is_some() || v.error.is_some()).await?;
    if let Some(error) = view.error {
        return Err(CliFailure { code: 3, message: error.to_string() });
    }
    println!("venue {} at {}; launching {}", view.venue_id, view.completed, stage);
    handle.request_stage(stage, params).await?;

    let mut views = handle.subscribe();
    let mut started = false;
    let mut last_label = String::new();
    let last = loop {
        if views.changed().await.is_err() {
            return Err(CliFailure { code: 3, message: "session stopped unexpectedly".to_string() });
        }
        let view = views.borrow_and_update().clone();
        started |= view.active_stage.is_some();
        if view.progress.label != last_label {
            print_view(&view);
            last_label = view.progress.label.clone();
        }
        if view.is_idle() && (started || view.error.is_some()) {
            break view;
        }
    };
    let _ = handle.shutdown().await;

    println!("completed stage: {}", last.completed);
    match last.error {
        Some(error) => Err(CliFailure { code: 3, message: error.to_string() }),
        None => Ok(()),
    }
}

async fn watch(api: &HttpPipelineApi, workflow: String) -> CliResult {
    let workflow_id = WorkflowId::new(workflow);
    let mut ticker = tokio::time::interval(session_from_env()?.poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        match api.get_progress(&workflow_id).await {
            Ok(snapshot) => {
                let projection = project(Some(&snapshot), None);
                println!("{:>5.1}%  [{}] {}", projection.percent, snapshot.remote_stage, projection.label);
                if snapshot.is_terminal() {
                    return Ok(());
                }
            }
            Err(err) => eprintln!("[seat watch] {err}"),
        }
    }
}

async fn cancel(api: &HttpPipelineApi, workflow: String) -> CliResult {
    let ack = api.cancel(&WorkflowId::new(workflow)).await?;
    println!("{} {}", ack.workflow_id, ack.status);
    Ok(())
}

async fn dispatch(cli: Cli) -> CliResult {
    let api = HttpPipelineApi::from_env()?;
    debug!("cli:api base_url={}", api.config().base_url);
    match cli.command {
        Command::Assets { venue } => assets(&api, venue).await,
        Command::Run { venue, stage, sections, select, prompt, model, strength, surface, event_type } => {
            let params = launch_params(sections, select, prompt, model, strength, surface, event_type)?;
            run(api, venue, stage, params).await
        }
        Command::Watch { workflow } => watch(&api, workflow).await,
        Command::Cancel { workflow } => cancel(&api, workflow).await,
    }
}

#[tokio::main]
async fn main() {
    // Cargar .env si existe para obtener SEATFLOW_API_URL
    seat_http::init_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(failure) = dispatch(cli).await {
        eprintln!("[seat] {}", failure.message);
        std::process::exit(failure.code);
    }
}
