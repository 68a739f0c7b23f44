//! Integration test: fiber cutting and wipe parking.
//!
//! Validates: the cut always ends with the fiber cut, park/unpark returns
//! to the first snapshot even when parked twice, and a switch started while
//! parked unparks on return.

use mtc_common::hal::gateway::MotionGateway;
use mtc_common::tool::types::Xyz;
use mtc_hal::MachineEvent;
use mtc_toolchange::ChangeRequest;
use proptest::prelude::*;

use super::common::changer;
use super::physical_path::TOOL_CHANGER;

const START: Xyz = Xyz {
    x: 100.0,
    y: 100.0,
    z: 5.0,
};

fn with_cutter() -> String {
    format!(
        "{TOOL_CHANGER}\n[toolchange.fiber_cutter]\nservo_id = 4\nneutral_angle = 10\nactive_angle = 95\n"
    )
}

#[test]
fn park_unpark_pair_restores_snapshot() {
    let mut tc = changer(TOOL_CHANGER);
    assert!(tc.park_to_wipe());
    assert!(tc.wipe().parked_near_wipe);
    assert_eq!(tc.wipe().return_position, START);
    assert_eq!(tc.machine().current_position(), Xyz::new(250.0, 190.0, 5.0));

    assert!(tc.unpark_from_wipe());
    assert!(!tc.wipe().parked_near_wipe);
    assert_eq!(tc.machine().current_position(), START);
}

#[test]
fn repeated_park_returns_to_first_snapshot() {
    let mut tc = changer(TOOL_CHANGER);
    assert!(tc.park_to_wipe());
    assert!(!tc.park_to_wipe());
    assert_eq!(tc.wipe().return_position, START);

    assert!(tc.unpark_from_wipe());
    assert_eq!(tc.machine().current_position(), START);
}

#[test]
fn unpark_without_park_does_nothing() {
    let mut tc = changer(TOOL_CHANGER);
    assert!(!tc.unpark_from_wipe());
    assert!(tc.machine().events().is_empty());
    assert_eq!(tc.machine().current_position(), START);
}

#[test]
fn change_while_parked_unparks_on_return() {
    let mut tc = changer(TOOL_CHANGER);
    tc.park_to_wipe();
    tc.change(ChangeRequest::to(1)).unwrap();

    assert!(!tc.wipe().parked_near_wipe);
    assert_eq!(tc.machine().current_position(), START);
    let targets = tc.machine().move_targets();
    assert_eq!(targets[targets.len() - 2], Xyz::new(100.0, 100.0, 6.5));
}

#[test]
fn cut_sequence_through_changer() {
    let mut tc = changer(&with_cutter());
    tc.cut_fiber().unwrap();
    assert_eq!(
        tc.machine().events(),
        &[
            MachineEvent::Synchronize,
            MachineEvent::MoveServo {
                servo_id: 4,
                angle: 95
            },
            MachineEvent::MoveServo {
                servo_id: 4,
                angle: 10
            },
        ]
    );
}

proptest! {
    #[test]
    fn cut_always_leaves_fiber_cut(loaded in any::<bool>(), cuts in 1usize..4) {
        let mut tc = changer(&with_cutter());
        if loaded {
            tc.fiber_mut().mark_fiber_loaded();
        }
        for _ in 0..cuts {
            tc.cut_fiber().unwrap();
            prop_assert!(tc.fiber().fiber_is_cut);
        }
    }
}
