//! `AssetSnapshot`: lo que hay persistido para un venue.
//!
//! Es la fuente de verdad del watermark. Se deriva al montar la sesión y al
//! reconciliar después de un run completado; nunca desde el progreso remoto.
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use super::ids::VenueId;
use crate::stage::CompletedStage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSnapshot {
    pub venue_id: VenueId,
    pub has_model: bool,
    pub depth_map_count: u32,
    pub image_count: u32,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// Combinaciones que violan el orden de stages. Se registran y se degradan:
/// para el gate se confía en la señal de mayor conteo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvariantViolation {
    ImagesWithoutDepthMaps { image_count: u32 },
    DepthMapsWithoutModel { depth_map_count: u32 },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImagesWithoutDepthMaps { image_count } => {
                write!(f, "{image_count} images persisted without depth maps")
            }
            Self::DepthMapsWithoutModel { depth_map_count } => {
                write!(f, "{depth_map_count} depth maps persisted without a model")
            }
        }
    }
}

impl AssetSnapshot {
    pub fn empty(venue_id: VenueId) -> Self {
        Self { venue_id, has_model: false, depth_map_count: 0, image_count: 0, model_url: None, preview_url: None }
    }

    /// Watermark derivado: images > 0 ⇒ Images; depth maps > 0 ⇒ Depths;
    /// modelo ⇒ Model; si no, None.
    pub fn completed_stage(&self) -> CompletedStage {
        if self.image_count > 0 {
            CompletedStage::Images
        } else if self.depth_map_count > 0 {
            CompletedStage::Depths
        } else if self.has_model {
            CompletedStage::Model
        } else {
            CompletedStage::None
        }
    }

    pub fn invariant_violation(&self) -> Option<InvariantViolation> {
        if self.image_count > 0 && self.depth_map_count == 0 {
            Some(InvariantViolation::ImagesWithoutDepthMaps { image_count: self.image_count })
        } else if self.depth_map_count > 0 && !self.has_model {
            Some(InvariantViolation::DepthMapsWithoutModel { depth_map_count: self.depth_map_count })
        } else {
            None
        }
    }

    /// Depth maps utilizables para el gate de Images. Si hay imágenes sin
    /// depth maps, se toma el conteo de imágenes (una imagen por depth map).
    pub fn effective_depth_map_count(&self) -> u32 {
        if self.depth_map_count > 0 { self.depth_map_count } else { self.image_count }
    }

    /// Registra (warn) la violación si existe y la devuelve.
    pub fn check(&self) -> Option<InvariantViolation> {
        let violation = self.invariant_violation();
        if let Some(v) = violation {
            warn!("assets:invariant venue={} violation=\"{}\" (degrading to higher-count signal)", self.venue_id, v);
        }
        violation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(has_model: bool, depths: u32, images: u32) -> AssetSnapshot {
        AssetSnapshot { has_model, depth_map_count: depths, image_count: images, ..AssetSnapshot::empty("v1".into()) }
    }

    #[test]
    fn derivation_follows_highest_persisted_artifact() {
        assert_eq!(snap(false, 0, 0).completed_stage(), CompletedStage::None);
        assert_eq!(snap(true, 0, 0).completed_stage(), CompletedStage::Model);
        assert_eq!(snap(true, 24, 0).completed_stage(), CompletedStage::Depths);
        assert_eq!(snap(true, 24, 24).completed_stage(), CompletedStage::Images);
    }

    #[test]
    fn images_without_depths_degrade_to_image_count() {
        let s = snap(true, 0, 8);
        assert_eq!(s.completed_stage(), CompletedStage::Images);
        assert_eq!(s.check(), Some(InvariantViolation::ImagesWithoutDepthMaps { image_count: 8 }));
        assert_eq!(s.effective_depth_map_count(), 8);
    }

    #[test]
    fn consistent_snapshot_has_no_violation() {
        assert_eq!(snap(true, 4, 4).invariant_violation(), None);
        assert_eq!(snap(false, 3, 0).invariant_violation(), Some(InvariantViolation::DepthMapsWithoutModel { depth_map_count: 3 }));
    }
}
