//! `Stage` y `CompletedStage`.
//!
//! Orden total: `Model < Depths < Images`. `CompletedStage` agrega un mínimo
//! `None` y actúa como watermark: el stage más avanzado cuyos outputs están
//! persistidos.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Model,
    Depths,
    Images,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Model, Stage::Depths, Stage::Images];

    /// Posición en el pipeline (0-based). También es la banda del proyector.
    pub const fn index(self) -> usize {
        match self {
            Stage::Model => 0,
            Stage::Depths => 1,
            Stage::Images => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Stage::Model => "3D model",
            Stage::Depths => "Depth maps",
            Stage::Images => "AI images",
        }
    }

    /// Watermark que representa "este stage terminado".
    pub const fn as_completed(self) -> CompletedStage {
        match self {
            Stage::Model => CompletedStage::Model,
            Stage::Depths => CompletedStage::Depths,
            Stage::Images => CompletedStage::Images,
        }
    }

    /// Watermark inmediatamente inferior a este stage.
    pub const fn below(self) -> CompletedStage {
        match self {
            Stage::Model => CompletedStage::None,
            Stage::Depths => CompletedStage::Model,
            Stage::Images => CompletedStage::Depths,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Model => "model",
            Stage::Depths => "depths",
            Stage::Images => "images",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown stage '{0}' (expected model, depths or images)")]
pub struct ParseStageError(pub String);

impl FromStr for Stage {
    type Err = ParseStageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "model" => Ok(Stage::Model),
            "depths" | "depth" => Ok(Stage::Depths),
            "images" | "image" => Ok(Stage::Images),
            other => Err(ParseStageError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletedStage {
    #[default]
    None,
    Model,
    Depths,
    Images,
}

impl CompletedStage {
    /// true si el watermark alcanza (o supera) `stage`.
    pub fn reaches(self, stage: Stage) -> bool { self >= stage.as_completed() }

    pub fn stage(self) -> Option<Stage> {
        match self {
            CompletedStage::None => None,
            CompletedStage::Model => Some(Stage::Model),
            CompletedStage::Depths => Some(Stage::Depths),
            CompletedStage::Images => Some(Stage::Images),
        }
    }
}

impl fmt::Display for CompletedStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stage() {
            Some(stage) => stage.fmt(f),
            None => f.write_str("none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watermark_order_matches_stage_order() {
        assert!(CompletedStage::None < CompletedStage::Model);
        assert!(CompletedStage::Model < CompletedStage::Depths);
        assert!(CompletedStage::Depths < CompletedStage::Images);
        for stage in Stage::ALL {
            assert!(stage.below() < stage.as_completed());
            assert!(stage.as_completed().reaches(stage));
            assert!(!stage.below().reaches(stage));
        }
    }

    #[test]
    fn parses_cli_spellings() {
        assert_eq!("Depths".parse::<Stage>(), Ok(Stage::Depths));
        assert_eq!(" image ".parse::<Stage>(), Ok(Stage::Images));
        assert!("render".parse::<Stage>().is_err());
    }
}
