//! Constantes del orquestador.
//!
//! Los defaults de generación replican los del motor remoto para que un
//! payload armado sin overrides sea idéntico al que el motor asumiría.

use std::time::Duration;

/// Periodo de referencia entre consultas de progreso.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fallos de consulta consecutivos tolerados antes de escalar a `PollError`.
pub const DEFAULT_MAX_CONSECUTIVE_POLL_FAILURES: u32 = 5;

/// Cantidad de bandas del proyector: una por stage, de igual ancho.
pub const STAGE_BANDS: f64 = 3.0;

pub const DEFAULT_PROMPT: &str = "Arena view, empty arena";
pub const DEFAULT_STRENGTH: f64 = 0.75;
pub const DEFAULT_IP_ADAPTER_SCALE: f64 = 0.6;

/// Versión lógica del payload. Entra en el fingerprint de cada
/// `LaunchRequested`, de modo que un cambio de formato invalida fingerprints
/// previos aunque los parámetros no cambien.
pub const REQUEST_FORMAT_VERSION: &str = "S1.0";
