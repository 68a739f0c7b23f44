//! Integration test: physical change sequence.
//!
//! Validates: offset application, return moves, queue drain, invalid index
//! handling, same-tool short circuit and the a→b→a round trip.

use mtc_common::hal::gateway::{LevelingGateway, MotionGateway};
use mtc_common::tool::types::Xyz;
use mtc_common::tool::ToolError;
use mtc_hal::{MachineEvent, SimulatedMachine};
use mtc_toolchange::{ChangeOutcome, ChangeRequest, ToolChanger};
use proptest::prelude::*;

use super::common::{approx_eq, capture_logs, changer, changer_at};

// ── Configs ─────────────────────────────────────────────────────────

const TWO_TOOLS: &str = r#"
[toolchange]
tool_count = 2
hotend_offsets = [{ x = 0.0 }, { x = 5.0 }]

[toolchange.actuator]
kind = "solenoid"
pins = [40, 41]
"#;

const FOUR_TOOLS: &str = r#"
[toolchange]
tool_count = 4

[toolchange.actuator]
kind = "solenoid"
pins = [40, 41, 42, 43]
"#;

fn solenoid_writes(tc: &ToolChanger<SimulatedMachine>) -> usize {
    tc.machine()
        .count_events(|e| matches!(e, MachineEvent::WritePin { .. }))
}

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn two_tools_shift_logical_x_and_drain() {
    let start = Xyz::new(10.0, 10.0, 10.0);
    let mut tc = changer_at(TWO_TOOLS, start);
    tc.machine_mut().queue_external_move(start, 50.0);
    assert_eq!(tc.machine().queue_depth(), 1);

    let out = tc.change(ChangeRequest::to(1).no_move()).unwrap();

    assert_eq!(
        out,
        ChangeOutcome::Switched {
            from: 0,
            to: 1,
            driver: 1
        }
    );
    assert_eq!(tc.state().active_extruder, 1);
    assert_eq!(tc.machine().current_position().x, 15.0);
    assert_eq!(tc.machine().queue_depth(), 0);
    assert_eq!(tc.machine().io().high_pins(), vec![41]);
}

#[test]
fn return_move_puts_new_nozzle_on_old_spot() {
    let start = Xyz::new(10.0, 10.0, 10.0);
    let mut tc = changer_at(TWO_TOOLS, start);
    tc.change(ChangeRequest::to(1)).unwrap();

    let m = tc.machine();
    assert_eq!(m.current_position(), start);
    // Lift happens in the new tool's frame, above the destination.
    assert_eq!(m.move_targets()[0], Xyz::new(15.0, 10.0, 11.5));
    // Drain comes after the last move, outputs switch after the drain.
    let last_sync = m
        .events()
        .iter()
        .rposition(|e| *e == MachineEvent::Synchronize)
        .unwrap();
    let last_move = m.events().iter().rposition(MachineEvent::is_motion).unwrap();
    let first_pin = m
        .events()
        .iter()
        .position(|e| matches!(e, MachineEvent::WritePin { .. }))
        .unwrap();
    assert!(last_move < last_sync);
    assert!(last_sync < first_pin);
}

#[test]
fn invalid_index_logged_and_rejected() {
    let mut tc = changer(FOUR_TOOLS);
    let (result, logs) = capture_logs(|| tc.change(ChangeRequest::to(9)));

    assert_eq!(result, Err(ToolError::InvalidToolIndex { index: 9, limit: 4 }));
    assert_eq!(tc.state().active_extruder, 0);
    assert!(tc.machine().events().is_empty());
    assert!(logs.contains("T9 invalid extruder"), "logs: {logs}");
}

#[test]
fn active_extruder_logged() {
    let mut tc = changer(FOUR_TOOLS);
    let (_, logs) = capture_logs(|| tc.change(ChangeRequest::to(3)).unwrap());
    assert!(logs.contains("Active extruder: 3"), "logs: {logs}");
}

#[test]
fn same_tool_skips_actuator_and_offsets() {
    let start = Xyz::new(10.0, 10.0, 10.0);
    let mut tc = changer_at(TWO_TOOLS, start);
    let out = tc.change(ChangeRequest::to(0)).unwrap();

    assert_eq!(out, ChangeOutcome::Unchanged { tool: 0 });
    assert_eq!(solenoid_writes(&tc), 0);
    assert_eq!(tc.machine().count_events(MachineEvent::is_motion), 0);
    assert_eq!(tc.machine().current_position(), start);
}

#[test]
fn forced_same_tool_runs_full_sequence() {
    let mut tc = changer(TWO_TOOLS);
    let out = tc.change(ChangeRequest::to(0).force()).unwrap();

    assert_eq!(
        out,
        ChangeOutcome::Switched {
            from: 0,
            to: 0,
            driver: 0
        }
    );
    assert_eq!(solenoid_writes(&tc), 3);
    assert_eq!(tc.machine().io().high_pins(), vec![40]);
}

#[test]
fn leveling_state_survives_change() {
    let loaded = mtc_toolchange::config::load_config_from_str(TWO_TOOLS).unwrap();
    for enabled in [false, true] {
        let machine = loaded.simulated_machine().with_leveling(enabled);
        let mut tc = ToolChanger::new(&loaded.toolchange, machine).unwrap();
        tc.change(ChangeRequest::to(1)).unwrap();
        assert_eq!(tc.machine().leveling_active(), enabled);
    }
}

#[test]
fn homing_precedes_everything_when_unhomed() {
    let loaded = mtc_toolchange::config::load_config_from_str(TWO_TOOLS).unwrap();
    let machine = loaded.simulated_machine().with_homed(false);
    let mut tc = ToolChanger::new(&loaded.toolchange, machine).unwrap();
    let (_, logs) = capture_logs(|| tc.change(ChangeRequest::to(1)).unwrap());

    assert_eq!(tc.machine().events()[0], MachineEvent::HomeAll);
    assert!(logs.contains("Homing before toolchange"), "logs: {logs}");
}

#[test]
fn one_high_solenoid_after_every_change() {
    let mut tc = changer(FOUR_TOOLS);
    for t in [2, 0, 3, 3, 1] {
        tc.change(ChangeRequest::to(t)).unwrap();
        assert_eq!(tc.machine().io().high_pins(), vec![40 + t]);
    }
}

proptest! {
    #[test]
    fn every_valid_target_becomes_active(targets in prop::collection::vec(0u8..4, 1..12)) {
        let mut tc = changer(FOUR_TOOLS);
        for t in targets {
            tc.change(ChangeRequest::to(t)).unwrap();
            prop_assert_eq!(tc.state().active_extruder, t);
        }
    }

    #[test]
    fn out_of_range_target_never_changes_state(prior in 0u8..4, bad in 4u8..=255) {
        let mut tc = changer(FOUR_TOOLS);
        tc.change(ChangeRequest::to(prior)).unwrap();
        let before = *tc.state();
        let result = tc.change(ChangeRequest::to(bad));
        prop_assert!(
            matches!(result, Err(ToolError::InvalidToolIndex { index, limit: 4 }) if index == bad),
            "unexpected result {:?}",
            result
        );
        prop_assert_eq!(*tc.state(), before);
    }

    #[test]
    fn round_trip_restores_position(
        x in 0.0f64..150.0,
        y in 0.0f64..150.0,
        z in 0.0f64..150.0,
        ox in -20.0f64..20.0,
        oy in -20.0f64..20.0,
        oz in -2.0f64..2.0,
        allow_move in any::<bool>(),
    ) {
        let toml = format!(
            "[toolchange]\ntool_count = 2\nhotend_offsets = [{{}}, {{ x = {ox}, y = {oy}, z = {oz} }}]\n\
             [toolchange.actuator]\nkind = \"solenoid\"\npins = [40, 41]\n"
        );
        let start = Xyz::new(x, y, z);
        let mut tc = changer_at(&toml, start);
        let request = |t| {
            let r = ChangeRequest::to(t);
            if allow_move { r } else { r.no_move() }
        };

        tc.change(request(1)).unwrap();
        tc.change(request(0)).unwrap();

        let end = tc.machine().current_position();
        prop_assert!(approx_eq(end, start), "start {:?} end {:?}", start, end);
        prop_assert_eq!(tc.state().active_extruder, 0);
        prop_assert_eq!(tc.state().previous_extruder, 1);
    }
}
