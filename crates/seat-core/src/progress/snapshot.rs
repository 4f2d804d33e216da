//! Snapshot de progreso observado en un tick de polling.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::remote::RemoteStage;
use crate::model::WorkflowId;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub workflow_id: WorkflowId,
    pub remote_stage: RemoteStage,
    pub items_done: u32,
    /// 0 cuando el motor todavía no conoce el total.
    pub items_target: u32,
    pub message: String,
    #[serde(default)]
    pub failed_items: Vec<String>,
    pub observed_at: DateTime<Utc>, // metadato local
}

impl ProgressSnapshot {
    pub fn new(workflow_id: WorkflowId, remote_stage: RemoteStage, items_done: u32, items_target: u32, message: impl Into<String>) -> Self {
        Self {
            workflow_id,
            remote_stage,
            items_done,
            items_target,
            message: message.into(),
            failed_items: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool { self.remote_stage.is_terminal() }

    pub fn band(&self) -> Option<Stage> { self.remote_stage.band() }

    /// Completa `items_target` cuando el motor no lo informó. Sólo aplica a
    /// las bandas de depth maps e imágenes, que procesan un ítem por depth map.
    pub fn with_target_hint(mut self, depth_maps: u32) -> Self {
        if self.items_target == 0 && matches!(self.band(), Some(Stage::Depths | Stage::Images)) {
            self.items_target = depth_maps;
        }
        self
    }
}
