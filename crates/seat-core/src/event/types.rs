//! Eventos de la sesión y estructura `SessionEvent`.
//!
//! Rol en el flujo:
//! - Cada transición de `PipelineSession` (montaje, lanzamiento, tick,
//!   terminal, cancelación, fallo de fetch) agrega un evento a un `EventLog`
//!   append-only.
//! - El log es diagnóstico: la sesión no se reconstruye desde él, pero permite
//!   auditar qué vio y decidió el orquestador y en qué orden.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{InvariantViolation, VenueId, WorkflowId};
use crate::progress::RemoteStage;
use crate::stage::{CompletedStage, Stage};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// Primer evento de una sesión.
    SessionMounted { venue_id: VenueId },
    /// Snapshot de assets aplicado. `completed` es el watermark vigente
    /// después de aplicarlo.
    AssetsResolved { completed: CompletedStage, depth_map_count: u32, image_count: u32 },
    AssetsFetchFailed { reason: String },
    InvariantViolated { violation: InvariantViolation },
    /// Submission armada y en vuelo. El fingerprint identifica el payload.
    LaunchRequested { stage: Stage, fingerprint: String },
    LaunchAccepted { stage: Stage, workflow_id: WorkflowId },
    LaunchRejected { stage: Stage, reason: String },
    ProgressObserved {
        workflow_id: WorkflowId,
        remote_stage: RemoteStage,
        items_done: u32,
        items_target: u32,
    },
    /// El stage remoto cambió de banda.
    StageBoundary { workflow_id: WorkflowId, from: Stage, to: Stage },
    PollFailed { workflow_id: WorkflowId, consecutive: u32, reason: String },
    /// Los fallos consecutivos alcanzaron el umbral; se expone `PollError`.
    PollEscalated { workflow_id: WorkflowId, consecutive: u32 },
    CancelRequested { workflow_id: WorkflowId },
    CancelRejected { workflow_id: WorkflowId, reason: String },
    RunCompleted { workflow_id: WorkflowId, stage: Stage },
    RunFailed { workflow_id: WorkflowId, stage: Stage, message: String },
    RunCancelled { workflow_id: WorkflowId, stage: Stage, message: String },
}

impl SessionEventKind {
    /// Código de una letra por variante, útil para comparar trazas en tests.
    pub fn code(&self) -> char {
        match self {
            Self::SessionMounted { .. } => 'M',
            Self::AssetsResolved { .. } => 'A',
            Self::AssetsFetchFailed { .. } => 'F',
            Self::InvariantViolated { .. } => 'V',
            Self::LaunchRequested { .. } => 'L',
            Self::LaunchAccepted { .. } => 'S',
            Self::LaunchRejected { .. } => 'J',
            Self::ProgressObserved { .. } => 'P',
            Self::StageBoundary { .. } => 'B',
            Self::PollFailed { .. } => 'p',
            Self::PollEscalated { .. } => 'E',
            Self::CancelRequested { .. } => 'c',
            Self::CancelRejected { .. } => 'r',
            Self::RunCompleted { .. } => 'C',
            Self::RunFailed { .. } => 'X',
            Self::RunCancelled { .. } => 'K',
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub seq: u64, // orden de append dentro de la sesión
    pub session_id: Uuid,
    pub kind: SessionEventKind,
    pub ts: DateTime<Utc>,
}

/// Traza compacta de una lista de eventos ("MALSP...").
pub fn event_codes(events: &[SessionEvent]) -> String { events.iter().map(|e| e.kind.code()).collect() }
