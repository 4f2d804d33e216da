//! Cuerpos de wire de la API y su mapeo a tipos del core.
//!
//! El progreso remoto trae contadores por stage (`depth_maps_rendered`,
//! `images_generated`) en vez de un par done/target; `items_done` se toma del
//! contador de la banda activa cuando el cuerpo no lo informa explícitamente.
use serde::{Deserialize, Serialize};

use seat_core::{AssetSnapshot, ProgressSnapshot, RemoteStage, VenueId, WorkflowId};

use crate::error::HttpError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StartResponse {
    pub workflow_id: WorkflowId,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProgressResponse {
    pub workflow_id: WorkflowId,
    pub stage: RemoteStage,
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub total_steps: u32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub seats_generated: u32,
    #[serde(default)]
    pub depth_maps_rendered: u32,
    #[serde(default)]
    pub images_generated: u32,
    #[serde(default)]
    pub estimated_cost: f64,
    #[serde(default)]
    pub actual_cost: f64,
    #[serde(default)]
    pub failed_items: Vec<String>,
    #[serde(default)]
    pub items_done: Option<u32>,
    #[serde(default)]
    pub items_target: Option<u32>,
}

impl ProgressResponse {
    pub fn items_done(&self) -> u32 {
        self.items_done.unwrap_or(match self.stage {
            RemoteStage::RenderingDepths => self.depth_maps_rendered,
            RemoteStage::GeneratingImages => self.images_generated,
            _ => 0,
        })
    }

    pub fn into_snapshot(self) -> ProgressSnapshot {
        let items_done = self.items_done();
        let mut snapshot = ProgressSnapshot::new(
            self.workflow_id,
            self.stage,
            items_done,
            self.items_target.unwrap_or(0),
            self.message,
        );
        snapshot.failed_items = self.failed_items;
        snapshot
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssetsResponse {
    pub venue_id: VenueId,
    #[serde(default)]
    pub has_model: bool,
    #[serde(default)]
    pub depth_map_count: u32,
    #[serde(default)]
    pub image_count: u32,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AssetsResponse {
    /// Un cuerpo con `error` es un fallo de lectura aunque el status sea 200.
    pub fn into_snapshot(self) -> Result<AssetSnapshot, HttpError> {
        if let Some(error) = self.error {
            return Err(HttpError::Remote(error));
        }
        Ok(AssetSnapshot {
            venue_id: self.venue_id,
            has_model: self.has_model,
            depth_map_count: self.depth_map_count,
            image_count: self.image_count,
            model_url: self.model_url,
            preview_url: self.preview_url,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CancelResponse {
    #[serde(default)]
    pub status: String,
    pub workflow_id: WorkflowId,
}

/// Cuerpo de error de la API (`{"detail": ...}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Extrae `detail` si el cuerpo tiene esa forma; si no, el texto crudo.
    pub fn detail_of(raw: &str) -> String {
        match serde_json::from_str::<ErrorBody>(raw) {
            Ok(ErrorBody { detail: serde_json::Value::String(s) }) => s,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) => raw.trim().to_string(),
        }
    }
}
