//! Stages del pipeline y gate de disponibilidad.
pub mod gate;
pub mod types;

pub use gate::{any_running, can_request, evaluate, evaluate_all, GateInput, GateResult};
pub use types::{CompletedStage, ParseStageError, Stage};
