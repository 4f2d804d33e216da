//! Parámetros de generación de imágenes (superficie, prompt, modelo IA).
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_IP_ADAPTER_SCALE, DEFAULT_PROMPT, DEFAULT_STRENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceType {
    #[default]
    Rink,
    Court,
    Stage,
    Field,
}

impl FromStr for SurfaceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rink" => Ok(Self::Rink),
            "court" => Ok(Self::Court),
            "stage" => Ok(Self::Stage),
            "field" => Ok(Self::Field),
            other => Err(format!("unknown surface type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiModel {
    #[default]
    #[serde(rename = "flux")]
    Flux,
    #[serde(rename = "flux-schnell")]
    FluxSchnell,
    #[serde(rename = "flux-dev")]
    FluxDev,
    #[serde(rename = "sdxl")]
    Sdxl,
    #[serde(rename = "controlnet")]
    ControlNet,
    #[serde(rename = "ip_adapter")]
    IpAdapter,
}

impl AiModel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Flux => "flux",
            Self::FluxSchnell => "flux-schnell",
            Self::FluxDev => "flux-dev",
            Self::Sdxl => "sdxl",
            Self::ControlNet => "controlnet",
            Self::IpAdapter => "ip_adapter",
        }
    }
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for AiModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "flux" => Ok(Self::Flux),
            "flux-schnell" => Ok(Self::FluxSchnell),
            "flux-dev" => Ok(Self::FluxDev),
            "sdxl" => Ok(Self::Sdxl),
            "controlnet" => Ok(Self::ControlNet),
            "ip-adapter" => Ok(Self::IpAdapter),
            other => Err(format!("unknown model '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParams {
    pub surface_type: SurfaceType,
    pub event_type_id: Option<String>,
    pub prompt: String,
    pub model: AiModel,
    /// img2img strength, [0, 1].
    pub strength: f64,
    pub reference_image_b64: Option<String>,
    /// Sólo aplica a `AiModel::IpAdapter`, [0, 1].
    pub ip_adapter_scale: f64,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            surface_type: SurfaceType::default(),
            event_type_id: None,
            prompt: DEFAULT_PROMPT.to_string(),
            model: AiModel::default(),
            strength: DEFAULT_STRENGTH,
            reference_image_b64: None,
            ip_adapter_scale: DEFAULT_IP_ADAPTER_SCALE,
        }
    }
}

impl GenerationParams {
    /// Sanea rangos: escalas a [0, 1] (NaN vuelve al default) y prompt vacío
    /// vuelve al prompt por defecto.
    pub fn normalized(mut self) -> Self {
        self.strength = clamp_unit(self.strength, DEFAULT_STRENGTH);
        self.ip_adapter_scale = clamp_unit(self.ip_adapter_scale, DEFAULT_IP_ADAPTER_SCALE);
        if self.prompt.trim().is_empty() {
            self.prompt = DEFAULT_PROMPT.to_string();
        }
        self
    }

    /// Parámetros por defecto conservando superficie y tipo de evento, que
    /// también condicionan la geometría del modelo.
    pub fn for_model_build(&self) -> Self {
        Self { surface_type: self.surface_type, event_type_id: self.event_type_id.clone(), ..Self::default() }
    }
}

fn clamp_unit(value: f64, fallback: f64) -> f64 {
    if value.is_nan() { fallback } else { value.clamp(0.0, 1.0) }
}
