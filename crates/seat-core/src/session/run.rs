//! Run en curso dentro de una sesión.
use crate::model::WorkflowId;
use crate::stage::{CompletedStage, Stage};

/// Fase del run. Ver el diagrama en `session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunPhase {
    /// Submission en vuelo, sin handle.
    Submitting,
    /// Handle asignado, sin primer snapshot.
    Awaiting,
    Polling,
    /// Terminal `completed` observado; se espera el snapshot de assets que fija
    /// el watermark.
    Reconciling,
}

#[derive(Debug, Clone)]
pub(crate) struct ActiveRun {
    pub stage: Stage,
    pub phase: RunPhase,
    pub workflow_id: Option<WorkflowId>,
    /// Watermark previo al lanzamiento; se restaura si el run no termina bien.
    pub watermark_before: CompletedStage,
    pub consecutive_poll_failures: u32,
    pub cancelling: bool,
}

impl ActiveRun {
    pub fn submitting(stage: Stage, watermark_before: CompletedStage) -> Self {
        Self { stage, phase: RunPhase::Submitting, workflow_id: None, watermark_before, consecutive_poll_failures: 0, cancelling: false }
    }

    /// Handle al que se le puede consultar progreso.
    pub fn pollable(&self) -> Option<&WorkflowId> {
        match self.phase {
            RunPhase::Awaiting | RunPhase::Polling => self.workflow_id.as_ref(),
            RunPhase::Submitting | RunPhase::Reconciling => None,
        }
    }
}

/// Resultado de aplicar un snapshot de progreso.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// El snapshot no corresponde al handle actual; se ignoró.
    Stale,
    Progress,
    StageBoundary,
    Completed,
    Failed,
    Cancelled,
}

impl TickOutcome {
    pub fn is_terminal(self) -> bool { matches!(self, Self::Completed | Self::Failed | Self::Cancelled) }

    /// Los límites de stage y los terminales disparan un refresh de assets.
    pub fn needs_asset_refresh(self) -> bool { self == Self::StageBoundary || self.is_terminal() }
}
