//! Vista inmutable del estado de una sesión, publicada al consumidor.
use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ErrorKind, SessionError};
use crate::model::{AssetSnapshot, VenueId, WorkflowId};
use crate::progress::{ProgressSnapshot, Projection};
use crate::stage::{CompletedStage, GateResult, Stage};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub venue_id: VenueId,
    pub completed: CompletedStage,
    pub stage_states: BTreeMap<Stage, GateResult>,
    pub progress: Projection,
    pub pending: Option<Stage>,
    pub active_stage: Option<Stage>,
    pub workflow_id: Option<WorkflowId>,
    pub cancelling: bool,
    pub consecutive_poll_failures: u32,
    pub error: Option<SessionError>,
    pub assets: Option<AssetSnapshot>,
    pub snapshot: Option<ProgressSnapshot>,
}

impl SessionView {
    pub fn gate(&self, stage: Stage) -> GateResult { self.stage_states.get(&stage).copied().unwrap_or(GateResult::Disabled) }

    /// Stage en `Running`, si hay alguno.
    pub fn running_stage(&self) -> Option<Stage> {
        self.stage_states.iter().find(|(_, g)| **g == GateResult::Running).map(|(s, _)| *s)
    }

    pub fn is_idle(&self) -> bool { self.active_stage.is_none() }

    pub fn error_kind(&self) -> Option<ErrorKind> { self.error.as_ref().map(|e| e.kind) }
}
