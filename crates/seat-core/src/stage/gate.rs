//! Gate de disponibilidad: función pura de (watermark, run activo, submission
//! pendiente, depth maps disponibles) a un `GateResult` por stage.
//!
//! Precedencia: Running > Completed > Disabled (otro stage corre) >
//! Available/Disabled según precondiciones. Nunca hay dos stages en Running a
//! la vez porque la sesión sólo admite un run (pendiente o activo), y ese run
//! se atribuye siempre a su stage objetivo.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{CompletedStage, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateResult {
    Available,
    Completed,
    Running,
    Disabled,
}

/// Entrada del gate. La sesión la arma desde su estado.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GateInput {
    pub completed: CompletedStage,
    /// Hay handle y el último snapshot no es terminal (o se está reconciliando).
    pub is_running: bool,
    /// Stage objetivo del run en curso.
    pub active_stage: Option<Stage>,
    /// Submission lanzada y sin primer snapshot todavía.
    pub pending: Option<Stage>,
    pub available_depth_maps: u32,
}

/// `Running` se atribuye al stage objetivo del run, no a la banda remota en
/// curso; sólo difieren si los assets rompen el invariante de orden (p. ej.
/// un rerun de Images con `skip_depth_render = false` reporta
/// `rendering_depths`).
fn runs(stage: Stage, input: &GateInput) -> bool {
    input.pending == Some(stage) || (input.is_running && input.active_stage == Some(stage))
}

/// true si algún stage está corriendo o pendiente de submission.
pub fn any_running(input: &GateInput) -> bool {
    Stage::ALL.iter().any(|&stage| runs(stage, input))
}

pub fn evaluate(stage: Stage, input: &GateInput) -> GateResult {
    if runs(stage, input) {
        return GateResult::Running;
    }
    if input.completed.reaches(stage) {
        return GateResult::Completed;
    }
    if any_running(input) {
        return GateResult::Disabled;
    }
    let ready = match stage {
        Stage::Model => true,
        Stage::Depths => input.completed.reaches(Stage::Model),
        Stage::Images => input.completed.reaches(Stage::Depths) && input.available_depth_maps > 0,
    };
    if ready { GateResult::Available } else { GateResult::Disabled }
}

pub fn evaluate_all(input: &GateInput) -> BTreeMap<Stage, GateResult> {
    Stage::ALL.iter().map(|&stage| (stage, evaluate(stage, input))).collect()
}

/// Un stage se puede pedir si está `Available`, o si está `Completed` y nada
/// corre (rerun).
pub fn can_request(stage: Stage, input: &GateInput) -> bool {
    match evaluate(stage, input) {
        GateResult::Available => true,
        GateResult::Completed => !any_running(input),
        GateResult::Running | GateResult::Disabled => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(completed: CompletedStage, depths: u32) -> GateInput {
        GateInput { completed, available_depth_maps: depths, ..GateInput::default() }
    }

    #[test]
    fn fresh_venue_only_offers_model() {
        let states = evaluate_all(&idle(CompletedStage::None, 0));
        assert_eq!(states[&Stage::Model], GateResult::Available);
        assert_eq!(states[&Stage::Depths], GateResult::Disabled);
        assert_eq!(states[&Stage::Images], GateResult::Disabled);
    }

    #[test]
    fn images_need_persisted_depth_maps() {
        let input = idle(CompletedStage::Depths, 0);
        assert_eq!(evaluate(Stage::Images, &input), GateResult::Disabled);
        let input = idle(CompletedStage::Depths, 12);
        assert_eq!(evaluate(Stage::Images, &input), GateResult::Available);
    }

    #[test]
    fn pending_submission_counts_as_running() {
        let input = GateInput { pending: Some(Stage::Model), ..idle(CompletedStage::None, 0) };
        assert_eq!(evaluate(Stage::Model, &input), GateResult::Running);
        assert!(!can_request(Stage::Model, &input));
    }

    #[test]
    fn completed_stage_is_rerunnable_only_when_idle() {
        let input = idle(CompletedStage::Depths, 24);
        assert!(can_request(Stage::Model, &input));
        let busy = GateInput { is_running: true, active_stage: Some(Stage::Images), ..input };
        assert_eq!(evaluate(Stage::Model, &busy), GateResult::Completed);
        assert!(!can_request(Stage::Model, &busy));
    }
}
