//! Payload de wire de `POST /pipelines/`.
use serde::{Deserialize, Serialize};

use crate::constants::REQUEST_FORMAT_VERSION;
use crate::errors::PipelineError;
use crate::hashing::hash_value;
use crate::model::{AiModel, SectionMap, SurfaceType, VenueId};
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub venue_id: VenueId,
    pub sections: SectionMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_section_ids: Option<Vec<String>>,
    pub surface_type: SurfaceType,
    pub prompt: String,
    pub model: AiModel,
    pub strength: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_image_b64: Option<String>,
    pub ip_adapter_scale: f64,
    pub stop_after_model: bool,
    pub stop_after_depths: bool,
    pub skip_model_build: bool,
    pub skip_depth_render: bool,
    pub skip_ai_generation: bool,
}

impl PipelineRequest {
    /// Stage objetivo según los flags de corte.
    pub fn stage(&self) -> Stage {
        if self.stop_after_model {
            Stage::Model
        } else if self.stop_after_depths {
            Stage::Depths
        } else {
            Stage::Images
        }
    }

    /// Hash estable del payload (versión de formato incluida).
    pub fn fingerprint(&self) -> Result<String, PipelineError> {
        let payload = serde_json::to_value(self).map_err(|e| PipelineError::Internal(e.to_string()))?;
        Ok(hash_value(&serde_json::json!({ "format": REQUEST_FORMAT_VERSION, "request": payload })))
    }
}
