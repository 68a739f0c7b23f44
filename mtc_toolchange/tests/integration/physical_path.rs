//! Integration test: waypoint-driven physical tool swap.
//!
//! Validates: lift, target-tool waypoints with the switch offset and the
//! target tool's frame, clean-path gating, and the XY-then-Z return.

use mtc_common::hal::gateway::MotionGateway;
use mtc_common::tool::types::Xyz;
use mtc_hal::MachineEvent;
use mtc_toolchange::{ActuatorKind, ChangeRequest};

use super::common::changer;

pub const TOOL_CHANGER: &str = r#"
[toolchange]
tool_count = 2
hotend_offsets = [{}, { x = 10.0 }]
switch_offset = { x = 2.0, y = 0.0 }
switch_paths = [
    [{ x = 5.0, y = 190.0, feedrate = 100.0, switch_move = true }],
    [
        { x = 250.0, y = 190.0, feedrate = 100.0, switch_move = true },
        { x = 250.0, y = 150.0, feedrate = 50.0 },
        { x = 250.0, y = 120.0, feedrate = 0.0, switch_move = true },
    ],
]

[toolchange.actuator]
kind = "physical_path"
"#;

const START: Xyz = Xyz {
    x: 100.0,
    y: 100.0,
    z: 5.0,
};

#[test]
fn switch_path_then_xy_then_z() {
    let mut tc = changer(TOOL_CHANGER);
    assert_eq!(tc.actuator_kind(), ActuatorKind::PhysicalPath);
    tc.change(ChangeRequest::to(1)).unwrap();

    let m = tc.machine();
    assert_eq!(
        m.move_targets(),
        vec![
            Xyz::new(110.0, 100.0, 6.5),
            Xyz::new(262.0, 190.0, 6.5),
            Xyz::new(100.0, 100.0, 6.5),
            Xyz::new(100.0, 100.0, 5.0),
        ]
    );
    assert_eq!(m.current_position(), START);
    assert_eq!(tc.state().active_extruder, 1);
}

#[test]
fn waypoints_use_their_own_feedrate() {
    let mut tc = changer(TOOL_CHANGER);
    tc.change(ChangeRequest::to(1)).unwrap();
    let waypoint_feed = tc.machine().events().iter().find_map(|e| match e {
        MachineEvent::Move { target, feedrate } if target.y == 190.0 => Some(*feedrate),
        _ => None,
    });
    assert_eq!(waypoint_feed, Some(100.0));
}

#[test]
fn clean_path_adds_cleaning_waypoints() {
    let mut tc = changer(TOOL_CHANGER);
    tc.change(ChangeRequest::to(1).clean()).unwrap();

    let targets = tc.machine().move_targets();
    assert_eq!(targets.len(), 5);
    assert_eq!(targets[2], Xyz::new(260.0, 150.0, 6.5));
}

#[test]
fn inert_waypoints_skipped_even_when_cleaning() {
    let mut tc = changer(TOOL_CHANGER);
    tc.change(ChangeRequest::to(1).clean()).unwrap();
    assert!(
        tc.machine()
            .move_targets()
            .iter()
            .all(|t| t.y != 120.0)
    );
}

#[test]
fn return_to_tool_zero_uses_its_path() {
    let mut tc = changer(TOOL_CHANGER);
    tc.change(ChangeRequest::to(1).no_move()).unwrap();
    tc.machine_mut().clear_events();

    tc.change(ChangeRequest::to(0)).unwrap();
    let targets = tc.machine().move_targets();
    // Tool 0 has no offset: its waypoint lands at (5 + 2, 190).
    assert_eq!(targets[1], Xyz::new(7.0, 190.0, 6.5));
}
