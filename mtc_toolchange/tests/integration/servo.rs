//! Integration test: servo-driven swaps.
//!
//! Validates: the dondolo raise-swing-return sequence on two hotends and
//! the selector's motion-free switch on a shared nozzle.

use mtc_common::hal::gateway::MotionGateway;
use mtc_common::tool::types::Xyz;
use mtc_hal::MachineEvent;
use mtc_toolchange::{ChangeOutcome, ChangeRequest};

use super::common::changer_at;

const DONDOLO: &str = r#"
[toolchange]
tool_count = 2
hotend_offsets = [{}, { z = -0.5 }]

[toolchange.actuator]
kind = "servo"
layout = "dondolo"
servo_id = 0
angles = [120, 60]
"#;

const SELECTOR: &str = r#"
[toolchange]
tool_count = 3
hotend_count = 1

[toolchange.actuator]
kind = "servo"
layout = "selector"
servo_id = 1
angles = [0, 45, 90]
settle_ms = 300
"#;

#[test]
fn dondolo_raises_swings_and_returns() {
    let start = Xyz::new(50.0, 50.0, 10.0);
    let mut tc = changer_at(DONDOLO, start);
    tc.change(ChangeRequest::to(1)).unwrap();
    let m = tc.machine();

    // Raise by the extra drop (0.5) plus 1mm, no separate lift, then back.
    assert_eq!(
        m.move_targets(),
        vec![Xyz::new(50.0, 50.0, 11.5), start]
    );
    assert_eq!(m.io().servo_angle(0), Some(60));
    assert_eq!(m.current_position(), start);

    let servo = m
        .events()
        .iter()
        .position(|e| matches!(e, MachineEvent::MoveServo { .. }))
        .unwrap();
    let raise = m
        .events()
        .iter()
        .position(|e| matches!(e, MachineEvent::BufferLine { .. }))
        .unwrap();
    assert!(raise < servo);
}

#[test]
fn dondolo_lowers_z_when_moves_blocked() {
    let start = Xyz::new(50.0, 50.0, 10.0);
    let mut tc = changer_at(DONDOLO, start);
    tc.change(ChangeRequest::to(1).no_move()).unwrap();

    let m = tc.machine();
    assert_eq!(m.current_position(), start);
    assert_eq!(m.move_targets().last(), Some(&start));
}

#[test]
fn selector_switches_without_motion() {
    let mut tc = changer_at(SELECTOR, Xyz::new(20.0, 20.0, 1.0));
    let out = tc.change(ChangeRequest::to(2)).unwrap();

    assert_eq!(
        out,
        ChangeOutcome::Switched {
            from: 0,
            to: 2,
            driver: 0
        }
    );
    let m = tc.machine();
    assert_eq!(m.count_events(MachineEvent::is_motion), 0);
    assert_eq!(m.io().servo_angle(1), Some(90));
    assert_eq!(m.io().total_delay_ms(), 300);
    assert_eq!(m.events()[0], MachineEvent::Synchronize);
}
