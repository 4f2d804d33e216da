//! `StageRequest`: qué se pide para cada stage.
//!
//! Reglas de armado:
//! - Model: todas las secciones, parámetros de generación por defecto, corta
//!   después del modelo.
//! - Depths: secciones seleccionadas, reutiliza el modelo si existe, corta
//!   después de los depth maps.
//! - Images: secciones seleccionadas, parámetros de generación completos,
//!   reutiliza modelo y depth maps existentes.
//!
//! Los flags de reutilización salen del `AssetSnapshot` actual, nunca del
//! watermark.
use serde::Serialize;

use super::wire::PipelineRequest;
use crate::errors::PipelineError;
use crate::model::{select_sections, AssetSnapshot, GenerationParams, SectionMap, VenueId};
use crate::stage::Stage;

/// Entrada del usuario para un lanzamiento.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchParams {
    pub sections: SectionMap,
    /// Vacío = todas las secciones.
    pub selected_section_ids: Vec<String>,
    pub generation: GenerationParams,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageRequest {
    Model {
        sections: SectionMap,
        generation: GenerationParams,
    },
    Depths {
        sections: SectionMap,
        selected_section_ids: Vec<String>,
        generation: GenerationParams,
        skip_model_build: bool,
    },
    Images {
        sections: SectionMap,
        selected_section_ids: Vec<String>,
        generation: GenerationParams,
        skip_model_build: bool,
        skip_depth_render: bool,
    },
}

impl StageRequest {
    pub fn assemble(stage: Stage, params: &LaunchParams, assets: &AssetSnapshot) -> Result<Self, PipelineError> {
        if params.sections.is_empty() {
            return Err(PipelineError::LaunchRejected { stage, reason: "no sections configured".to_string() });
        }
        let generation = params.generation.clone().normalized();
        if stage == Stage::Model {
            return Ok(Self::Model { sections: params.sections.clone(), generation: generation.for_model_build() });
        }

        let sections = select_sections(&params.sections, &params.selected_section_ids);
        if sections.is_empty() {
            return Err(PipelineError::LaunchRejected { stage, reason: "selection matches no configured section".to_string() });
        }
        let selected_section_ids: Vec<String> = sections.keys().cloned().collect();
        Ok(match stage {
            Stage::Depths => Self::Depths {
                sections,
                selected_section_ids,
                generation: generation.for_model_build(),
                skip_model_build: assets.has_model,
            },
            _ => Self::Images {
                sections,
                selected_section_ids,
                generation,
                skip_model_build: assets.has_model,
                skip_depth_render: assets.depth_map_count > 0,
            },
        })
    }

    pub fn stage(&self) -> Stage {
        match self {
            Self::Model { .. } => Stage::Model,
            Self::Depths { .. } => Stage::Depths,
            Self::Images { .. } => Stage::Images,
        }
    }

    pub fn to_wire(&self, venue_id: &VenueId) -> PipelineRequest {
        let (sections, selected, generation) = match self {
            Self::Model { sections, generation } => (sections, None, generation),
            Self::Depths { sections, selected_section_ids, generation, .. }
            | Self::Images { sections, selected_section_ids, generation, .. } => {
                (sections, Some(selected_section_ids.clone()), generation)
            }
        };
        let (skip_model_build, skip_depth_render) = match self {
            Self::Model { .. } => (false, false),
            Self::Depths { skip_model_build, .. } => (*skip_model_build, false),
            Self::Images { skip_model_build, skip_depth_render, .. } => (*skip_model_build, *skip_depth_render),
        };
        PipelineRequest {
            venue_id: venue_id.clone(),
            sections: sections.clone(),
            event_type_id: generation.event_type_id.clone(),
            selected_section_ids: selected,
            surface_type: generation.surface_type,
            prompt: generation.prompt.clone(),
            model: generation.model,
            strength: generation.strength,
            reference_image_b64: generation.reference_image_b64.clone(),
            ip_adapter_scale: generation.ip_adapter_scale,
            stop_after_model: self.stage() == Stage::Model,
            stop_after_depths: self.stage() == Stage::Depths,
            skip_model_build,
            skip_depth_render,
            skip_ai_generation: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AiModel, SectionConfig};

    fn params() -> LaunchParams {
        let sections = ["101", "102", "103"].iter().map(|id| (id.to_string(), SectionConfig::default())).collect();
        LaunchParams {
            sections,
            selected_section_ids: vec!["102".into()],
            generation: GenerationParams { model: AiModel::Sdxl, prompt: "Hockey night".into(), ..Default::default() },
        }
    }

    fn assets(has_model: bool, depths: u32) -> AssetSnapshot {
        AssetSnapshot { has_model, depth_map_count: depths, ..AssetSnapshot::empty("arena".into()) }
    }

    #[test]
    fn model_request_uses_all_sections_and_default_generation() {
        let req = StageRequest::assemble(Stage::Model, &params(), &assets(false, 0)).unwrap();
        let wire = req.to_wire(&"arena".into());
        assert_eq!(wire.sections.len(), 3);
        assert!(wire.stop_after_model && !wire.stop_after_depths);
        assert_eq!(wire.model, AiModel::Flux);
        assert_eq!(wire.selected_section_ids, None);
    }

    #[test]
    fn depths_request_reuses_existing_model() {
        let wire = StageRequest::assemble(Stage::Depths, &params(), &assets(true, 0)).unwrap().to_wire(&"arena".into());
        assert!(wire.stop_after_depths && wire.skip_model_build && !wire.skip_depth_render);
        assert_eq!(wire.selected_section_ids, Some(vec!["102".to_string()]));
        assert_eq!(wire.sections.len(), 1);
    }

    #[test]
    fn images_request_skips_what_is_persisted() {
        let wire = StageRequest::assemble(Stage::Images, &params(), &assets(true, 24)).unwrap().to_wire(&"arena".into());
        assert!(!wire.stop_after_model && !wire.stop_after_depths);
        assert!(wire.skip_model_build && wire.skip_depth_render);
        assert_eq!(wire.prompt, "Hockey night");
        assert_eq!(wire.model, AiModel::Sdxl);
    }

    #[test]
    fn empty_section_map_is_rejected_locally() {
        let err = StageRequest::assemble(Stage::Model, &LaunchParams::default(), &assets(false, 0)).unwrap_err();
        assert!(matches!(err, PipelineError::LaunchRejected { stage: Stage::Model, .. }));
    }
}
