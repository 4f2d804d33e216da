//! Motor de workflows simulado.
//!
//! Cada `start_pipeline` arma un guion de pasos a partir de los flags del
//! payload (modelo, depth maps, imágenes, cortes y reutilización). Cada
//! `get_progress` sirve el siguiente paso; los pasos que cierran un stage
//! escriben sus artifacts en la fuente de assets enlazada.
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Mutex;

use super::assets::InMemoryAssetSource;
use crate::errors::PipelineError;
use crate::model::{VenueId, WorkflowId};
use crate::ports::{CancelAck, WorkflowClient};
use crate::progress::{ProgressSnapshot, RemoteStage};
use crate::request::PipelineRequest;
use crate::stage::Stage;

/// Parámetros de la simulación.
#[derive(Debug, Clone)]
pub struct EngineScript {
    pub depth_maps_per_section: u32,
    /// Ítems que avanza cada paso dentro de una banda.
    pub batch: u32,
    /// El run falla al entrar a esta banda.
    pub fail_in: Option<Stage>,
    pub failure_message: String,
    /// Si es false, los pasos informan `items_target = 0`.
    pub report_targets: bool,
    /// Latencia de cada consulta de progreso.
    pub poll_delay: Duration,
}

impl Default for EngineScript {
    fn default() -> Self {
        Self {
            depth_maps_per_section: 2,
            batch: 4,
            fail_in: None,
            failure_message: "Pipeline failed".to_string(),
            report_targets: true,
            poll_delay: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Effect {
    Model,
    DepthMaps(u32),
    Images(u32),
}

#[derive(Debug, Clone)]
struct Step {
    stage: RemoteStage,
    done: u32,
    target: u32,
    message: String,
    effect: Option<Effect>,
}

impl Step {
    fn new(stage: RemoteStage, done: u32, target: u32, message: impl Into<String>) -> Self {
        Self { stage, done, target, message: message.into(), effect: None }
    }

    fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = Some(effect);
        self
    }
}

#[derive(Debug)]
struct SimRun {
    venue_id: VenueId,
    steps: VecDeque<Step>,
    last: Option<Step>,
    cancel_requested: bool,
}

impl SimRun {
    fn finished(&self) -> bool { self.last.as_ref().is_some_and(|s| s.stage.is_terminal()) }
}

#[derive(Debug, Default)]
struct EngineState {
    runs: HashMap<WorkflowId, SimRun>,
    started: Vec<PipelineRequest>,
    next_id: u32,
    reject_next_start: Option<String>,
    poll_failures_left: u32,
    paused: bool,
    polls: usize,
    cancels: usize,
}

#[derive(Debug, Clone)]
pub struct InMemoryWorkflowEngine {
    script: EngineScript,
    assets: InMemoryAssetSource,
    state: Arc<Mutex<EngineState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl InMemoryWorkflowEngine {
    pub fn new(assets: InMemoryAssetSource) -> Self { Self::with_script(assets, EngineScript::default()) }

    pub fn with_script(assets: InMemoryAssetSource, script: EngineScript) -> Self {
        Self {
            script,
            assets,
            state: Arc::new(Mutex::new(EngineState::default())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// El próximo lanzamiento se rechaza con `reason`.
    pub async fn reject_next_start(&self, reason: impl Into<String>) {
        self.state.lock().await.reject_next_start = Some(reason.into());
    }

    /// Las próximas `n` consultas de progreso fallan.
    pub async fn fail_next_polls(&self, n: u32) { self.state.lock().await.poll_failures_left = n; }

    /// En pausa, las consultas repiten el paso actual sin avanzar.
    pub async fn set_paused(&self, paused: bool) { self.state.lock().await.paused = paused; }

    /// Payloads recibidos, en orden.
    pub async fn started(&self) -> Vec<PipelineRequest> { self.state.lock().await.started.clone() }

    pub async fn poll_count(&self) -> usize { self.state.lock().await.polls }

    pub async fn cancel_count(&self) -> usize { self.state.lock().await.cancels }

    /// Máximo de consultas de progreso concurrentes observado.
    pub fn max_concurrent_polls(&self) -> usize { self.max_in_flight.load(Ordering::SeqCst) }

    fn band_steps(&self, stage: RemoteStage, total: u32, label: &str, effect: Effect) -> Vec<Step> {
        let batch = self.script.batch.max(1);
        let target = |t: u32| if self.script.report_targets { t } else { 0 };
        let mut steps = vec![Step::new(stage.clone(), 0, target(total), format!("{label}: starting"))];
        let mut done = 0;
        while done < total {
            done = (done + batch).min(total);
            steps.push(Step::new(stage.clone(), done, target(total), format!("{label}: {done}/{total}")));
        }
        if let Some(last) = steps.pop() {
            steps.push(last.with_effect(effect));
        }
        steps
    }

    fn failing(&self, band: Vec<Step>) -> Vec<Step> {
        let mut steps: Vec<Step> = band.into_iter().take(1).collect();
        steps.push(Step::new(RemoteStage::Failed, 0, 0, self.script.failure_message.clone()));
        steps
    }

    fn build_script(&self, request: &PipelineRequest, existing_depths: u32) -> VecDeque<Step> {
        let mut steps = vec![
            Step::new(RemoteStage::Pending, 0, 0, "Queued"),
            Step::new(RemoteStage::GeneratingSeats, 0, 0, "Generating seat positions"),
        ];
        let model = if request.skip_model_build {
            vec![Step::new(RemoteStage::BuildingModel, 1, 1, "Loading existing 3D model")]
        } else {
            vec![
                Step::new(RemoteStage::BuildingModel, 0, 1, "Building 3D model"),
                Step::new(RemoteStage::BuildingModel, 1, 1, "3D model ready").with_effect(Effect::Model),
            ]
        };
        if self.script.fail_in == Some(Stage::Model) {
            steps.extend(self.failing(model));
            return steps.into();
        }
        steps.extend(model);
        if request.stop_after_model {
            steps.push(Step::new(RemoteStage::Completed, 1, 1, "3D model complete"));
            return steps.into();
        }

        let depth_total = if request.skip_depth_render {
            existing_depths
        } else {
            request.sections.len() as u32 * self.script.depth_maps_per_section
        };
        let depths = if request.skip_depth_render {
            vec![Step::new(RemoteStage::RenderingDepths, depth_total, depth_total, "Loading existing depth maps")]
        } else {
            self.band_steps(RemoteStage::RenderingDepths, depth_total, "Rendering depth maps", Effect::DepthMaps(depth_total))
        };
        if self.script.fail_in == Some(Stage::Depths) {
            steps.extend(self.failing(depths));
            return steps.into();
        }
        steps.extend(depths);
        if request.stop_after_depths {
            steps.push(Step::new(RemoteStage::Completed, depth_total, depth_total, "Depth maps complete"));
            return steps.into();
        }

        let images = self.band_steps(RemoteStage::GeneratingImages, depth_total, "Generating images", Effect::Images(depth_total));
        if self.script.fail_in == Some(Stage::Images) {
            steps.extend(self.failing(images));
            return steps.into();
        }
        steps.extend(images);
        steps.push(Step::new(RemoteStage::Completed, depth_total, depth_total, "Pipeline complete!"));
        steps.into()
    }

    async fn apply(&self, venue_id: &VenueId, effect: Effect) {
        self.assets
            .update(venue_id, |snap| match effect {
                Effect::Model => {
                    snap.has_model = true;
                    snap.model_url = Some(format!("/output/{venue_id}/venue_model.glb"));
                }
                Effect::DepthMaps(n) => snap.depth_map_count = n,
                Effect::Images(n) => {
                    snap.image_count = n;
                    snap.preview_url = Some(format!("/output/{venue_id}/preview.jpg"));
                }
            })
            .await;
    }
}

struct InFlight<'a> {
    counter: &'a AtomicUsize,
}

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, max: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        max.fetch_max(now, Ordering::SeqCst);
        Self { counter }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) { self.counter.fetch_sub(1, Ordering::SeqCst); }
}

#[async_trait]
impl WorkflowClient for InMemoryWorkflowEngine {
    async fn start_pipeline(&self, request: &PipelineRequest) -> Result<WorkflowId, PipelineError> {
        let stage = request.stage();
        if request.sections.is_empty() {
            return Err(PipelineError::LaunchRejected { stage, reason: "no sections".to_string() });
        }
        let existing_depths = self.assets.get(&request.venue_id).await.depth_map_count;
        let mut state = self.state.lock().await;
        if let Some(reason) = state.reject_next_start.take() {
            return Err(PipelineError::LaunchRejected { stage, reason });
        }
        state.next_id += 1;
        let workflow_id = WorkflowId::new(format!("venue-pipeline-{}-{:04}", request.venue_id, state.next_id));
        let steps = self.build_script(request, existing_depths);
        debug!("memory:start workflow={} stage={} steps={}", workflow_id, stage, steps.len());
        state.started.push(request.clone());
        state.runs.insert(
            workflow_id.clone(),
            SimRun { venue_id: request.venue_id.clone(), steps, last: None, cancel_requested: false },
        );
        Ok(workflow_id)
    }

    async fn get_progress(&self, workflow_id: &WorkflowId) -> Result<ProgressSnapshot, PipelineError> {
        let _guard = InFlight::enter(&self.in_flight, &self.max_in_flight);
        if !self.script.poll_delay.is_zero() {
            tokio::time::sleep(self.script.poll_delay).await;
        }
        let (step, venue_id) = {
            let mut state = self.state.lock().await;
            state.polls += 1;
            if state.poll_failures_left > 0 {
                state.poll_failures_left -= 1;
                return Err(PipelineError::Poll(format!("progress query for {workflow_id} timed out")));
            }
            let paused = state.paused;
            let run = state
                .runs
                .get_mut(workflow_id)
                .ok_or_else(|| PipelineError::Poll(format!("workflow {workflow_id} not found")))?;
            let step = if run.cancel_requested && !run.finished() {
                // los depth maps ya renderizados quedan persistidos
                let partial = run
                    .last
                    .as_ref()
                    .filter(|s| s.stage == RemoteStage::RenderingDepths && s.done > 0)
                    .map(|s| s.done);
                run.steps.clear();
                let cancelled = Step::new(RemoteStage::Cancelled, 0, 0, "Cancelled by user");
                match partial {
                    Some(done) => cancelled.with_effect(Effect::DepthMaps(done)),
                    None => cancelled,
                }
            } else if paused || run.finished() {
                match run.last.clone().or_else(|| run.steps.front().cloned()) {
                    Some(step) => Step { effect: None, ..step },
                    None => Step::new(RemoteStage::Pending, 0, 0, "Queued"),
                }
            } else {
                match run.steps.pop_front() {
                    Some(step) => step,
                    None => Step::new(RemoteStage::Completed, 0, 0, "Pipeline complete!"),
                }
            };
            run.last = Some(Step { effect: None, ..step.clone() });
            (step, run.venue_id.clone())
        };
        if let Some(effect) = step.effect {
            self.apply(&venue_id, effect).await;
        }
        Ok(ProgressSnapshot::new(workflow_id.clone(), step.stage, step.done, step.target, step.message))
    }

    async fn cancel(&self, workflow_id: &WorkflowId) -> Result<CancelAck, PipelineError> {
        let mut state = self.state.lock().await;
        state.cancels += 1;
        let run = state
            .runs
            .get_mut(workflow_id)
            .ok_or_else(|| PipelineError::CancelRejected(format!("workflow {workflow_id} not found")))?;
        if run.finished() {
            return Err(PipelineError::CancelRejected(format!("workflow {workflow_id} already finished")));
        }
        run.cancel_requested = true;
        Ok(CancelAck { workflow_id: workflow_id.clone(), status: "cancelling".to_string() })
    }
}
