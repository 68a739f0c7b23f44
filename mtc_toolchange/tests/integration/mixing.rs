//! Integration test: mixing extruder virtual tools.
//!
//! Validates: selecting a virtual tool copies its blend row, issues no
//! drain or move, and leaves the active extruder alone.

use mtc_common::tool::ToolError;
use mtc_toolchange::{ActuatorKind, ChangeOutcome, ChangeRequest};
use proptest::prelude::*;

use super::common::{capture_logs, changer};

const FOUR_VIRTUAL: &str = r#"
[toolchange]
tool_count = 1

[toolchange.actuator]
kind = "mixing"
steppers = 3
virtual_tools = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.2, 0.3, 0.5],
    [0.0, 0.0, 1.0],
]
"#;

#[test]
fn virtual_tool_two_selects_its_row() {
    let mut tc = changer(FOUR_VIRTUAL);
    assert_eq!(tc.actuator_kind(), ActuatorKind::Mixing);

    let (out, logs) = capture_logs(|| tc.change(ChangeRequest::to(2)).unwrap());

    assert_eq!(out, ChangeOutcome::Blended { virtual_tool: 2 });
    assert_eq!(tc.mix_factors(), &[0.2, 0.3, 0.5]);
    assert!(tc.machine().events().is_empty());
    assert_eq!(tc.state().active_extruder, 0);
    assert!(logs.contains("Active color: 2"), "logs: {logs}");
}

#[test]
fn virtual_tool_beyond_table_rejected() {
    let mut tc = changer(FOUR_VIRTUAL);
    tc.change(ChangeRequest::to(1)).unwrap();
    let err = tc.change(ChangeRequest::to(4)).unwrap_err();
    assert_eq!(err, ToolError::InvalidToolIndex { index: 4, limit: 4 });
    assert_eq!(tc.mix_factors(), &[0.0, 1.0, 0.0]);
}

#[test]
fn reset_restores_first_row() {
    let mut tc = changer(FOUR_VIRTUAL);
    tc.change(ChangeRequest::to(3)).unwrap();
    tc.reset();
    assert_eq!(tc.mix_factors(), &[1.0, 0.0, 0.0]);
}

proptest! {
    #[test]
    fn blending_never_touches_the_machine(
        targets in prop::collection::vec(0u8..4, 1..10),
        force in any::<bool>(),
    ) {
        let mut tc = changer(FOUR_VIRTUAL);
        for t in targets {
            let req = if force { ChangeRequest::to(t).force() } else { ChangeRequest::to(t) };
            tc.change(req).unwrap();
        }
        prop_assert!(tc.machine().events().is_empty());
        prop_assert_eq!(tc.state().active_extruder, 0);
    }
}
