//! Vocabulario de stages del motor remoto.
//!
//! El motor es la autoridad sobre estos strings; uno desconocido no rompe la
//! observación, se conserva como `Unknown` y el proyector cae a la banda del
//! stage activo.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteStage {
    Pending,
    GeneratingSeats,
    BuildingModel,
    RenderingDepths,
    GeneratingImages,
    Completed,
    Failed,
    Cancelled,
    Unknown(String),
}

impl RemoteStage {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "generating_seats" => Self::GeneratingSeats,
            "building_model" => Self::BuildingModel,
            "rendering_depths" => Self::RenderingDepths,
            "generating_images" => Self::GeneratingImages,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::GeneratingSeats => "generating_seats",
            Self::BuildingModel => "building_model",
            Self::RenderingDepths => "rendering_depths",
            Self::GeneratingImages => "generating_images",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
            Self::Unknown(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Self::Completed | Self::Failed | Self::Cancelled) }

    /// Banda local del stage remoto. Terminales y desconocidos no tienen banda.
    pub fn band(&self) -> Option<Stage> {
        match self {
            Self::Pending | Self::GeneratingSeats | Self::BuildingModel => Some(Stage::Model),
            Self::RenderingDepths => Some(Stage::Depths),
            Self::GeneratingImages => Some(Stage::Images),
            Self::Completed | Self::Failed | Self::Cancelled | Self::Unknown(_) => None,
        }
    }
}

impl From<&str> for RemoteStage {
    fn from(raw: &str) -> Self { Self::parse(raw) }
}

impl fmt::Display for RemoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl Serialize for RemoteStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> { serializer.serialize_str(self.as_str()) }
}

impl<'de> Deserialize<'de> for RemoteStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_stages_map_to_bands() {
        assert_eq!(RemoteStage::parse("generating_seats").band(), Some(Stage::Model));
        assert_eq!(RemoteStage::parse("rendering_depths").band(), Some(Stage::Depths));
        assert_eq!(RemoteStage::parse("generating_images").band(), Some(Stage::Images));
        assert!(RemoteStage::parse("completed").is_terminal());
    }

    #[test]
    fn unknown_stage_is_preserved() {
        let stage: RemoteStage = serde_json::from_str("\"upscaling\"").unwrap();
        assert_eq!(stage, RemoteStage::Unknown("upscaling".into()));
        assert_eq!(stage.band(), None);
        assert!(!stage.is_terminal());
        assert_eq!(serde_json::to_string(&stage).unwrap(), "\"upscaling\"");
    }
}
