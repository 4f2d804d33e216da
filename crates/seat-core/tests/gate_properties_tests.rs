use seat_core::stage::{any_running, can_request, evaluate, evaluate_all};
use seat_core::{CompletedStage, GateInput, GateResult, Stage};

const WATERMARKS: [CompletedStage; 4] =
    [CompletedStage::None, CompletedStage::Model, CompletedStage::Depths, CompletedStage::Images];

/// Gate inputs a session can produce: at most one run, and a pending
/// submission always belongs to the active run.
fn reachable_inputs() -> Vec<GateInput> {
    let mut inputs = Vec::new();
    for completed in WATERMARKS {
        for depths in [0, 1, 24] {
            let idle = GateInput { completed, available_depth_maps: depths, ..GateInput::default() };
            inputs.push(idle);
            for stage in Stage::ALL {
                inputs.push(GateInput { pending: Some(stage), active_stage: Some(stage), ..idle });
                inputs.push(GateInput { is_running: true, active_stage: Some(stage), ..idle });
            }
        }
    }
    inputs
}

#[test]
fn at_most_one_stage_is_running() {
    for input in reachable_inputs() {
        let running = evaluate_all(&input).values().filter(|g| **g == GateResult::Running).count();
        assert!(running <= 1, "more than one running stage for {input:?}");
        assert_eq!(running == 1, any_running(&input), "{input:?}");
    }
}

#[test]
fn depths_never_available_before_a_model() {
    for input in reachable_inputs().into_iter().filter(|i| i.completed < CompletedStage::Model) {
        assert_ne!(evaluate(Stage::Depths, &input), GateResult::Available, "{input:?}");
    }
}

#[test]
fn images_never_available_without_depth_maps() {
    for input in reachable_inputs().into_iter().filter(|i| i.available_depth_maps == 0) {
        assert_ne!(evaluate(Stage::Images, &input), GateResult::Available, "{input:?}");
    }
}

#[test]
fn nothing_is_requestable_while_a_run_is_active() {
    for input in reachable_inputs().into_iter().filter(any_running) {
        for stage in Stage::ALL {
            assert!(!can_request(stage, &input), "{stage} requestable during {input:?}");
        }
    }
}

#[test]
fn completed_stages_are_rerunnable_when_idle() {
    let input = GateInput { completed: CompletedStage::Images, available_depth_maps: 24, ..GateInput::default() };
    for stage in Stage::ALL {
        assert_eq!(evaluate(stage, &input), GateResult::Completed);
        assert!(can_request(stage, &input));
    }
}
