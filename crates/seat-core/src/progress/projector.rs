//! Proyección de un snapshot a un porcentaje global.
//!
//! Tres bandas de igual ancho (Model, Depths, Images). Dentro de la banda el
//! avance es `items_done / items_target` acotado a [0, 1], de modo que el
//! porcentaje nunca baja mientras el stage remoto no cambie y nunca supera 100.
use serde::{Deserialize, Serialize};

use super::remote::RemoteStage;
use super::snapshot::ProgressSnapshot;
use crate::constants::STAGE_BANDS;
use crate::stage::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub percent: f64,
    pub label: String,
}

impl Projection {
    pub fn idle() -> Self { Self { percent: 0.0, label: "Idle".to_string() } }

    fn at(percent: f64, label: impl Into<String>) -> Self { Self { percent, label: label.into() } }
}

fn message_or(snapshot: &ProgressSnapshot, fallback: &str) -> String {
    if snapshot.message.trim().is_empty() { fallback.to_string() } else { snapshot.message.clone() }
}

pub fn project(snapshot: Option<&ProgressSnapshot>, active_stage: Option<Stage>) -> Projection {
    let Some(snap) = snapshot else {
        return match active_stage {
            Some(stage) => Projection::at(0.0, format!("Starting {}...", stage.label())),
            None => Projection::idle(),
        };
    };
    match snap.remote_stage {
        RemoteStage::Completed => return Projection::at(100.0, message_or(snap, "Completed")),
        RemoteStage::Failed => return Projection::at(0.0, message_or(snap, "Failed")),
        RemoteStage::Cancelled => return Projection::at(0.0, message_or(snap, "Cancelled")),
        _ => {}
    }
    let Some(band) = snap.band().or(active_stage) else {
        return Projection::at(0.0, message_or(snap, snap.remote_stage.as_str()));
    };

    let width = 100.0 / STAGE_BANDS;
    let base = band.index() as f64 * width;
    let ratio = (f64::from(snap.items_done) / f64::from(snap.items_target.max(1))).clamp(0.0, 1.0);
    let percent = (base + ratio * width).min(100.0);

    let label = if snap.items_target > 0 {
        format!("{}: {}/{}", band.label(), snap.items_done.min(snap.items_target), snap.items_target)
    } else {
        message_or(snap, band.label())
    };
    Projection::at(percent, label)
}
