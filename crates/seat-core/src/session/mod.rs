//! `PipelineSession`: estado de orquestación de un venue, sin IO.
//!
//! Rol en el flujo:
//! - Es la única dueña de watermark, submission pendiente, handle, último
//!   snapshot y error visible. El driver (`engine`) le entrega los resultados
//!   de las llamadas remotas y publica `view()`.
//! - Cada transición queda registrada en el `EventLog`.
//!
//! Ciclo de un run:
//! ```text
//! Idle --begin_launch--> Submitting --launch_accepted--> Awaiting
//!   Awaiting --observe_progress--> Polling --(terminal completed)--> Reconciling
//!   Reconciling --apply_assets / assets_unavailable--> Idle
//!   Submitting --launch_failed--> Idle
//!   Awaiting|Polling --(terminal failed/cancelled)--> Idle
//! ```
//! Un rerun baja el watermark al stage anterior mientras corre. Si el run
//! falla, se cancela o no se puede reconciliar, se restaura el watermark
//! previo; si completa, se re-deriva del snapshot de assets refrescado.
//! El refresh que sigue a un fallo o cancelación sólo guarda el snapshot
//! (puede traer artifacts parciales) y no toca el watermark ni el error.
use std::collections::BTreeMap;

use log::{debug, info, warn};
use uuid::Uuid;

mod run;
mod view;

pub use run::TickOutcome;
pub use view::SessionView;

use self::run::{ActiveRun, RunPhase};
use crate::constants::DEFAULT_MAX_CONSECUTIVE_POLL_FAILURES;
use crate::errors::{ErrorKind, PipelineError, SessionError};
use crate::event::{EventLog, InMemoryEventLog, SessionEvent, SessionEventKind};
use crate::model::{AssetSnapshot, VenueId, WorkflowId};
use crate::progress::{project, ProgressSnapshot, RemoteStage};
use crate::request::{LaunchParams, PipelineRequest, StageRequest};
use crate::stage::{self, CompletedStage, GateInput, GateResult, Stage};

pub struct PipelineSession<E: EventLog = InMemoryEventLog> {
    id: Uuid,
    venue_id: VenueId,
    log: E,
    assets: Option<AssetSnapshot>,
    completed: CompletedStage,
    pending: Option<Stage>,
    run: Option<ActiveRun>,
    progress: Option<ProgressSnapshot>,
    error: Option<SessionError>,
    /// El próximo snapshot de assets no re-deriva el watermark (run fallido o
    /// cancelado).
    hold_watermark: bool,
    max_consecutive_poll_failures: u32,
}

impl PipelineSession<InMemoryEventLog> {
    pub fn new(venue_id: VenueId) -> Self { Self::with_log(venue_id, InMemoryEventLog::default()) }
}

impl<E: EventLog> PipelineSession<E> {
    pub fn with_log(venue_id: VenueId, log: E) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            venue_id,
            log,
            assets: None,
            completed: CompletedStage::None,
            pending: None,
            run: None,
            progress: None,
            error: None,
            hold_watermark: false,
            max_consecutive_poll_failures: DEFAULT_MAX_CONSECUTIVE_POLL_FAILURES,
        };
        session.record(SessionEventKind::SessionMounted { venue_id: session.venue_id.clone() });
        debug!("session:mounted id={} venue={}", session.id, session.venue_id);
        session
    }

    /// Umbral de fallos de polling consecutivos (mínimo 1).
    pub fn with_max_poll_failures(mut self, max: u32) -> Self {
        self.max_consecutive_poll_failures = max.max(1);
        self
    }

    fn record(&mut self, kind: SessionEventKind) { self.log.append_kind(self.id, kind); }

    pub fn id(&self) -> Uuid { self.id }
    pub fn venue_id(&self) -> &VenueId { &self.venue_id }
    pub fn completed(&self) -> CompletedStage { self.completed }
    pub fn pending(&self) -> Option<Stage> { self.pending }
    pub fn assets(&self) -> Option<&AssetSnapshot> { self.assets.as_ref() }
    pub fn progress(&self) -> Option<&ProgressSnapshot> { self.progress.as_ref() }
    pub fn error(&self) -> Option<&SessionError> { self.error.as_ref() }
    pub fn events(&self) -> Vec<SessionEvent> { self.log.list(self.id) }

    /// Stage objetivo del run en curso (incluye submission pendiente).
    pub fn active_stage(&self) -> Option<Stage> { self.run.as_ref().map(|r| r.stage) }

    pub fn workflow_id(&self) -> Option<&WorkflowId> { self.run.as_ref().and_then(|r| r.workflow_id.as_ref()) }

    /// Hay handle con progreso observado no terminal, o un completado en
    /// reconciliación.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|r| matches!(r.phase, RunPhase::Polling | RunPhase::Reconciling))
    }

    pub fn is_cancelling(&self) -> bool { self.run.as_ref().is_some_and(|r| r.cancelling) }

    /// Handle a consultar en el próximo tick. `None` detiene el poller.
    pub fn poll_target(&self) -> Option<&WorkflowId> { self.run.as_ref().and_then(ActiveRun::pollable) }

    pub fn is_reconciling(&self) -> bool { self.run.as_ref().is_some_and(|r| r.phase == RunPhase::Reconciling) }

    pub fn gate_input(&self) -> GateInput {
        GateInput {
            completed: self.completed,
            is_running: self.is_running(),
            active_stage: self.active_stage(),
            pending: self.pending,
            available_depth_maps: self.assets.as_ref().map_or(0, AssetSnapshot::effective_depth_map_count),
        }
    }

    pub fn gate(&self, stage: Stage) -> GateResult { stage::evaluate(stage, &self.gate_input()) }

    pub fn stage_states(&self) -> BTreeMap<Stage, GateResult> { stage::evaluate_all(&self.gate_input()) }

    // ---------------------------------------------------------------------
    // Assets
    // ---------------------------------------------------------------------

    /// Aplica un snapshot de assets. El watermark se re-deriva sólo sin run
    /// activo (montaje, refresh manual) o al reconciliar un completado;
    /// durante un run, o justo después de un fallo/cancelación, el snapshot
    /// sólo se guarda (flags y hint de totales).
    pub fn apply_assets(&mut self, snapshot: AssetSnapshot) {
        if let Some(violation) = snapshot.check() {
            self.record(SessionEventKind::InvariantViolated { violation });
        }
        let reconciling = self.is_reconciling();
        let held = std::mem::take(&mut self.hold_watermark);
        if held {
            debug!("assets:watermark_held venue={} completed={}", self.venue_id, self.completed);
        }
        if (self.run.is_none() && !held) || reconciling {
            let derived = snapshot.completed_stage();
            if reconciling {
                if let Some(run) = self.run.take() {
                    info!(
                        "session:reconciled venue={} stage={} watermark {} -> {}",
                        self.venue_id, run.stage, run.watermark_before, derived
                    );
                }
            }
            self.completed = derived;
            if self.error.as_ref().is_some_and(|e| e.kind == ErrorKind::Fetch) {
                self.error = None;
            }
        }
        self.record(SessionEventKind::AssetsResolved {
            completed: self.completed,
            depth_map_count: snapshot.depth_map_count,
            image_count: snapshot.image_count,
        });
        self.assets = Some(snapshot);
    }

    /// El fetch de assets falló: se conserva el watermark vigente. Si se
    /// estaba reconciliando, se vuelve al watermark previo al run. Un error
    /// de run fallido o cancelado no se reemplaza.
    pub fn assets_unavailable(&mut self, err: &PipelineError) {
        warn!("session:assets_unavailable venue={} err={}", self.venue_id, err);
        self.record(SessionEventKind::AssetsFetchFailed { reason: err.to_string() });
        self.hold_watermark = false;
        if self.is_reconciling() {
            if let Some(run) = self.run.take() {
                self.completed = run.watermark_before;
            }
        }
        if self.error.as_ref().is_some_and(|e| matches!(e.kind, ErrorKind::RunFailed | ErrorKind::RunCancelled)) {
            return;
        }
        let message = match err {
            PipelineError::Fetch(reason) => reason.clone(),
            other => other.to_string(),
        };
        self.error = Some(SessionError::new(ErrorKind::Fetch, None, message));
    }

    // ---------------------------------------------------------------------
    // Lanzamiento
    // ---------------------------------------------------------------------

    /// Valida el gate, arma el payload y marca la submission como pendiente.
    /// La marca se fija aquí, antes de cualquier IO, para que un segundo
    /// pedido encuentre el stage en `Running`.
    ///
    /// Un pedido mientras otro run está en curso se descarta sin tocar el
    /// error visible.
    pub fn begin_launch(&mut self, stage: Stage, params: &LaunchParams) -> Result<PipelineRequest, PipelineError> {
        if self.run.is_some() {
            debug!("launch:ignored venue={} stage={} (run in progress)", self.venue_id, stage);
            return Err(PipelineError::LaunchRejected { stage, reason: "another run is in progress".to_string() });
        }
        if !stage::can_request(stage, &self.gate_input()) {
            let err = PipelineError::LaunchRejected { stage, reason: format!("{} is not available yet", stage.label()) };
            return Err(self.reject(stage, err));
        }
        let assets = self.assets.clone().unwrap_or_else(|| AssetSnapshot::empty(self.venue_id.clone()));
        let wire = match StageRequest::assemble(stage, params, &assets) {
            Ok(request) => request.to_wire(&self.venue_id),
            Err(err) => return Err(self.reject(stage, err)),
        };
        let fingerprint = wire.fingerprint()?;

        let watermark_before = self.completed;
        if self.completed.reaches(stage) {
            self.completed = stage.below();
            info!("launch:rerun venue={} stage={} watermark {} -> {}", self.venue_id, stage, watermark_before, self.completed);
        }
        self.pending = Some(stage);
        self.hold_watermark = false;
        self.run = Some(ActiveRun::submitting(stage, watermark_before));
        self.progress = None;
        self.error = None;
        debug!("launch:start venue={} stage={} fingerprint={}", self.venue_id, stage, fingerprint);
        self.record(SessionEventKind::LaunchRequested { stage, fingerprint });
        Ok(wire)
    }

    fn reject(&mut self, stage: Stage, err: PipelineError) -> PipelineError {
        warn!("launch:rejected venue={} stage={} err={}", self.venue_id, stage, err);
        let reason = match &err {
            PipelineError::LaunchRejected { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.record(SessionEventKind::LaunchRejected { stage, reason });
        self.error = Some((&err).into());
        err
    }

    fn submitting(&self, stage: Stage) -> bool {
        self.run.as_ref().is_some_and(|r| r.stage == stage && r.phase == RunPhase::Submitting)
    }

    /// El motor aceptó la submission. Devuelve false si ya no había una
    /// submission de ese stage en vuelo.
    pub fn launch_accepted(&mut self, stage: Stage, workflow_id: WorkflowId) -> bool {
        if !self.submitting(stage) {
            warn!("launch:stale_accept venue={} stage={} workflow={}", self.venue_id, stage, workflow_id);
            return false;
        }
        if let Some(run) = self.run.as_mut() {
            run.workflow_id = Some(workflow_id.clone());
            run.phase = RunPhase::Awaiting;
        }
        info!("launch:accepted venue={} stage={} workflow={}", self.venue_id, stage, workflow_id);
        self.record(SessionEventKind::LaunchAccepted { stage, workflow_id });
        true
    }

    /// El motor rechazó la submission (o no respondió): se limpia la marca
    /// pendiente y se restaura el watermark.
    pub fn launch_failed(&mut self, stage: Stage, err: &PipelineError) {
        if !self.submitting(stage) {
            warn!("launch:stale_failure venue={} stage={} err={}", self.venue_id, stage, err);
            return;
        }
        if let Some(run) = self.run.take() {
            self.completed = run.watermark_before;
        }
        self.pending = None;
        let err = match err {
            PipelineError::LaunchRejected { .. } => err.clone(),
            other => PipelineError::LaunchRejected { stage, reason: other.to_string() },
        };
        self.reject(stage, err);
    }

    // ---------------------------------------------------------------------
    // Polling
    // ---------------------------------------------------------------------

    pub fn observe_progress(&mut self, snapshot: ProgressSnapshot) -> TickOutcome {
        let Some(stage) = self
            .run
            .as_ref()
            .filter(|r| r.pollable() == Some(&snapshot.workflow_id))
            .map(|r| r.stage)
        else {
            debug!("poll:stale workflow={} (ignored)", snapshot.workflow_id);
            return TickOutcome::Stale;
        };

        let hint = self.assets.as_ref().map_or(0, AssetSnapshot::effective_depth_map_count);
        let snapshot = snapshot.with_target_hint(hint);
        let workflow_id = snapshot.workflow_id.clone();
        let boundary = match (self.progress.as_ref().and_then(ProgressSnapshot::band), snapshot.band()) {
            (Some(from), Some(to)) if from != to => Some((from, to)),
            _ => None,
        };

        self.pending = None;
        if let Some(run) = self.run.as_mut() {
            run.consecutive_poll_failures = 0;
        }
        if self.error.as_ref().is_some_and(|e| e.kind == ErrorKind::Poll) {
            self.error = None;
        }
        debug!(
            "poll:observed workflow={} remote_stage={} items={}/{}",
            workflow_id, snapshot.remote_stage, snapshot.items_done, snapshot.items_target
        );
        self.record(SessionEventKind::ProgressObserved {
            workflow_id: workflow_id.clone(),
            remote_stage: snapshot.remote_stage.clone(),
            items_done: snapshot.items_done,
            items_target: snapshot.items_target,
        });
        if let Some((from, to)) = boundary {
            info!("poll:boundary workflow={} {} -> {}", workflow_id, from, to);
            self.record(SessionEventKind::StageBoundary { workflow_id: workflow_id.clone(), from, to });
        }

        let remote_stage = snapshot.remote_stage.clone();
        let message = snapshot.message.clone();
        self.progress = Some(snapshot);

        match remote_stage {
            RemoteStage::Completed => {
                if let Some(run) = self.run.as_mut() {
                    run.phase = RunPhase::Reconciling;
                    run.workflow_id = None;
                    run.cancelling = false;
                }
                info!("run:completed workflow={} stage={}", workflow_id, stage);
                self.record(SessionEventKind::RunCompleted { workflow_id, stage });
                TickOutcome::Completed
            }
            RemoteStage::Failed => {
                let message = if message.trim().is_empty() { "Pipeline failed".to_string() } else { message };
                self.settle(stage, ErrorKind::RunFailed, &message);
                warn!("run:failed workflow={} stage={} message={}", workflow_id, stage, message);
                self.record(SessionEventKind::RunFailed { workflow_id, stage, message });
                TickOutcome::Failed
            }
            RemoteStage::Cancelled => {
                let message = if message.trim().is_empty() { "Pipeline cancelled".to_string() } else { message };
                self.settle(stage, ErrorKind::RunCancelled, &message);
                info!("run:cancelled workflow={} stage={}", workflow_id, stage);
                self.record(SessionEventKind::RunCancelled { workflow_id, stage, message });
                TickOutcome::Cancelled
            }
            _ => {
                if let Some(run) = self.run.as_mut() {
                    run.phase = RunPhase::Polling;
                }
                if boundary.is_some() { TickOutcome::StageBoundary } else { TickOutcome::Progress }
            }
        }
    }

    /// Cierre no exitoso: se descarta el run y se restaura el watermark.
    fn settle(&mut self, stage: Stage, kind: ErrorKind, message: &str) {
        if let Some(run) = self.run.take() {
            self.completed = run.watermark_before;
        }
        self.pending = None;
        self.hold_watermark = true;
        self.error = Some(SessionError::new(kind, Some(stage), message));
    }

    /// Un tick falló. Devuelve true al alcanzar el umbral, momento en que se
    /// expone `PollError`. El polling continúa de todos modos.
    pub fn observe_poll_failure(&mut self, workflow_id: &WorkflowId, err: &PipelineError) -> bool {
        let Some(run) = self.run.as_mut().filter(|r| r.pollable() == Some(workflow_id)) else {
            debug!("poll:stale_failure workflow={} err={}", workflow_id, err);
            return false;
        };
        run.consecutive_poll_failures += 1;
        let (stage, consecutive) = (run.stage, run.consecutive_poll_failures);

        warn!("poll:failed workflow={} consecutive={} err={}", workflow_id, consecutive, err);
        self.record(SessionEventKind::PollFailed { workflow_id: workflow_id.clone(), consecutive, reason: err.to_string() });
        if consecutive != self.max_consecutive_poll_failures {
            return false;
        }
        self.record(SessionEventKind::PollEscalated { workflow_id: workflow_id.clone(), consecutive });
        self.error = Some(SessionError::new(
            ErrorKind::Poll,
            Some(stage),
            format!("progress unavailable after {consecutive} attempts: {err}"),
        ));
        true
    }

    // ---------------------------------------------------------------------
    // Cancelación
    // ---------------------------------------------------------------------

    /// Marca la cancelación y devuelve el handle a cancelar. Sin handle
    /// consultable es un no-op.
    pub fn begin_cancel(&mut self) -> Option<WorkflowId> {
        let Some(run) = self.run.as_mut() else {
            info!("cancel:noop venue={} (no active run)", self.venue_id);
            return None;
        };
        let Some(workflow_id) = run.pollable().cloned() else {
            info!("cancel:noop venue={} (no workflow handle yet)", self.venue_id);
            return None;
        };
        if run.cancelling {
            debug!("cancel:already_requested workflow={}", workflow_id);
            return None;
        }
        run.cancelling = true;
        info!("cancel:requested workflow={}", workflow_id);
        self.record(SessionEventKind::CancelRequested { workflow_id: workflow_id.clone() });
        Some(workflow_id)
    }

    /// El motor rechazó la cancelación (p. ej. el run ya terminó). No se
    /// expone error: el próximo tick refleja el estado real.
    pub fn cancel_rejected(&mut self, workflow_id: &WorkflowId, err: &PipelineError) {
        if let Some(run) = self.run.as_mut().filter(|r| r.workflow_id.as_ref() == Some(workflow_id)) {
            run.cancelling = false;
        }
        warn!("cancel:rejected workflow={} err={}", workflow_id, err);
        self.record(SessionEventKind::CancelRejected { workflow_id: workflow_id.clone(), reason: err.to_string() });
    }

    pub fn cancel_acknowledged(&mut self, workflow_id: &WorkflowId, status: &str) {
        debug!("cancel:acknowledged workflow={} status={}", workflow_id, status);
    }

    pub fn view(&self) -> SessionView {
        let input = self.gate_input();
        SessionView {
            session_id: self.id,
            venue_id: self.venue_id.clone(),
            completed: self.completed,
            stage_states: stage::evaluate_all(&input),
            progress: project(self.progress.as_ref(), self.active_stage()),
            pending: self.pending,
            active_stage: self.active_stage(),
            workflow_id: self.workflow_id().cloned(),
            cancelling: self.is_cancelling(),
            consecutive_poll_failures: self.run.as_ref().map_or(0, |r| r.consecutive_poll_failures),
            error: self.error.clone(),
            assets: self.assets.clone(),
            snapshot: self.progress.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::event_codes;
    use crate::model::SectionConfig;

    fn params() -> LaunchParams {
        LaunchParams {
            sections: [("101".to_string(), SectionConfig::default())].into_iter().collect(),
            ..LaunchParams::default()
        }
    }

    fn assets(has_model: bool, depths: u32, images: u32) -> AssetSnapshot {
        AssetSnapshot { has_model, depth_map_count: depths, image_count: images, ..AssetSnapshot::empty("arena".into()) }
    }

    fn snap(stage: &str, done: u32, target: u32) -> ProgressSnapshot {
        ProgressSnapshot::new("wf-1".into(), RemoteStage::parse(stage), done, target, "")
    }

    #[test]
    fn pending_is_set_before_any_io() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(false, 0, 0));
        let wire = s.begin_launch(Stage::Model, &params()).unwrap();
        assert!(wire.stop_after_model);
        assert_eq!(s.pending(), Some(Stage::Model));
        assert_eq!(s.gate(Stage::Model), GateResult::Running);
        let second = s.begin_launch(Stage::Model, &params());
        assert!(second.is_err());
        assert!(s.error().is_none());
    }

    #[test]
    fn first_snapshot_clears_pending() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(false, 0, 0));
        s.begin_launch(Stage::Model, &params()).unwrap();
        assert!(s.launch_accepted(Stage::Model, "wf-1".into()));
        assert_eq!(s.observe_progress(snap("building_model", 0, 0)), TickOutcome::Progress);
        assert_eq!(s.pending(), None);
        assert!(s.is_running());
        assert_eq!(s.gate(Stage::Model), GateResult::Running);
    }

    #[test]
    fn snapshots_for_other_handles_are_ignored() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(false, 0, 0));
        s.begin_launch(Stage::Model, &params()).unwrap();
        s.launch_accepted(Stage::Model, "wf-1".into());
        let other = ProgressSnapshot::new("wf-0".into(), RemoteStage::Completed, 0, 0, "");
        assert_eq!(s.observe_progress(other), TickOutcome::Stale);
        assert_eq!(s.pending(), Some(Stage::Model));
    }

    #[test]
    fn launch_failure_restores_the_rerun_watermark() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(true, 0, 0));
        s.begin_launch(Stage::Model, &params()).unwrap();
        assert_eq!(s.completed(), CompletedStage::None);
        s.launch_failed(Stage::Model, &PipelineError::Internal("connection refused".into()));
        assert_eq!(s.completed(), CompletedStage::Model);
        assert_eq!(s.pending(), None);
        let err = s.error().unwrap();
        assert_eq!(err.kind, ErrorKind::LaunchRejected);
        assert_eq!(err.stage, Some(Stage::Model));
        assert_eq!(event_codes(&s.events()), "MALJ");
    }

    #[test]
    fn escalation_happens_once_at_threshold() {
        let mut s = PipelineSession::new("arena".into()).with_max_poll_failures(2);
        s.apply_assets(assets(false, 0, 0));
        s.begin_launch(Stage::Model, &params()).unwrap();
        s.launch_accepted(Stage::Model, "wf-1".into());
        let err = PipelineError::Poll("502".into());
        let wf: WorkflowId = "wf-1".into();
        assert!(!s.observe_poll_failure(&wf, &err));
        assert!(s.observe_poll_failure(&wf, &err));
        assert!(!s.observe_poll_failure(&wf, &err));
        assert_eq!(s.error().map(|e| e.kind), Some(ErrorKind::Poll));
        s.observe_progress(snap("building_model", 1, 2));
        assert!(s.error().is_none());
        assert_eq!(s.view().consecutive_poll_failures, 0);
    }

    #[test]
    fn refresh_after_cancel_keeps_the_pre_run_watermark() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(true, 0, 0));
        s.begin_launch(Stage::Depths, &params()).unwrap();
        s.launch_accepted(Stage::Depths, "wf-1".into());
        s.observe_progress(snap("rendering_depths", 5, 10));
        assert_eq!(s.begin_cancel(), Some("wf-1".into()));
        let outcome = s.observe_progress(ProgressSnapshot::new("wf-1".into(), RemoteStage::Cancelled, 0, 0, "Cancelled by user"));
        assert_eq!(outcome, TickOutcome::Cancelled);
        assert!(outcome.needs_asset_refresh());

        // depth maps parciales persistidos antes de cancelar
        s.apply_assets(assets(true, 5, 0));
        assert_eq!(s.completed(), CompletedStage::Model);
        assert_eq!(s.gate(Stage::Images), GateResult::Disabled);
        assert_eq!(s.assets().map(|a| a.depth_map_count), Some(5));
        assert_eq!(s.error().map(|e| e.kind), Some(ErrorKind::RunCancelled));
    }

    #[test]
    fn failed_run_message_survives_a_failed_refresh() {
        let mut s = PipelineSession::new("arena".into());
        s.apply_assets(assets(true, 4, 0));
        s.begin_launch(Stage::Images, &params()).unwrap();
        s.launch_accepted(Stage::Images, "wf-1".into());
        let failed = ProgressSnapshot::new("wf-1".into(), RemoteStage::Failed, 0, 0, "GPU quota exceeded");
        assert_eq!(s.observe_progress(failed), TickOutcome::Failed);

        s.assets_unavailable(&PipelineError::Fetch("asset store down".into()));
        let err = s.error().unwrap();
        assert_eq!(err.kind, ErrorKind::RunFailed);
        assert_eq!(err.message, "GPU quota exceeded");
        assert_eq!(s.completed(), CompletedStage::Depths);
        assert!(event_codes(&s.events()).ends_with("XF"));

        // un refresh manual posterior vuelve a derivar el watermark
        s.apply_assets(assets(true, 4, 0));
        assert_eq!(s.completed(), CompletedStage::Depths);
    }

    #[test]
    fn cancel_without_handle_is_a_noop() {
        let mut s = PipelineSession::new("arena".into());
        assert_eq!(s.begin_cancel(), None);
        s.apply_assets(assets(false, 0, 0));
        s.begin_launch(Stage::Model, &params()).unwrap();
        assert_eq!(s.begin_cancel(), None);
        s.launch_accepted(Stage::Model, "wf-1".into());
        assert_eq!(s.begin_cancel(), Some("wf-1".into()));
        assert_eq!(s.begin_cancel(), None);
        s.cancel_rejected(&"wf-1".into(), &PipelineError::CancelRejected("already finished".into()));
        assert!(!s.is_cancelling());
        assert!(s.error().is_none());
    }
}
