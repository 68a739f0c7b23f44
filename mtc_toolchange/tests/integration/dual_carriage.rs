//! Integration test: dual X-carriage modes through the orchestrator.
//!
//! Validates: auto-park retreat and return, full-control X bookkeeping
//! without moves, duplication positioning, mode switching, and carriage X
//! bookkeeping happening while leveling is still off.

use mtc_common::hal::gateway::{LevelingGateway, MotionGateway};
use mtc_common::tool::config::DualCarriageMode;
use mtc_common::tool::types::Xyz;
use mtc_hal::MachineEvent;
use mtc_toolchange::ChangeRequest;

use super::common::{approx_eq, changer_at};

const DXC: &str = r#"
[toolchange]
tool_count = 2
hotend_offsets = [{}, { y = 0.4, z = 0.1 }]

[toolchange.actuator]
kind = "dual_carriage"
x_home = [0.0, 300.0]
duplicate_x_offset = 150.0
"#;

#[test]
fn auto_park_parks_then_returns_incoming_head() {
    let start = Xyz::new(120.0, 50.0, 10.0);
    let mut tc = changer_at(DXC, start);
    tc.change(ChangeRequest::to(1)).unwrap();

    let m = tc.machine();
    let targets = m.move_targets();
    // Outgoing carriage: raise, retreat home, lower.
    assert_eq!(targets[0], Xyz::new(120.0, 50.0, 10.2));
    assert_eq!(targets[1], Xyz::new(0.0, 50.0, 10.2));
    assert_eq!(targets[2], Xyz::new(0.0, 50.0, 10.0));
    // Incoming carriage starts at its home X with the Y/Z offset applied
    // and lifts from there before returning to the destination.
    assert_eq!(targets[3], Xyz::new(300.0, 50.0 + 0.4, (10.0 + 0.1) + 1.5));
    assert_eq!(m.current_position(), start);

    let dxc = tc.dual_carriage().unwrap();
    assert!(dxc.active_parked());
    assert_eq!(
        dxc.raised_parked_position(),
        Xyz::new(300.0, 50.0 + 0.4, (10.0 + 0.1) + 1.0)
    );
}

#[test]
fn full_control_never_moves() {
    let start = Xyz::new(80.0, 50.0, 10.0);
    let mut tc = changer_at(DXC, start);
    tc.set_carriage_mode(DualCarriageMode::FullControl).unwrap();

    tc.change(ChangeRequest::to(1)).unwrap();
    assert_eq!(tc.machine().count_events(MachineEvent::is_motion), 0);
    assert!(approx_eq(
        tc.machine().current_position(),
        Xyz::new(300.0, 50.4, 10.1)
    ));
    assert_eq!(tc.dual_carriage().unwrap().inactive_x(), 80.0);

    tc.change(ChangeRequest::to(0)).unwrap();
    assert!(approx_eq(tc.machine().current_position(), start));
    assert_eq!(tc.state().active_extruder, 0);
}

#[test]
fn duplication_offsets_second_head() {
    let start = Xyz::new(40.0, 50.0, 10.0);
    let mut tc = changer_at(DXC, start);
    tc.set_carriage_mode(DualCarriageMode::Duplication).unwrap();

    tc.change(ChangeRequest::to(1)).unwrap();
    assert_eq!(tc.machine().current_position().x, 190.0);
    assert_eq!(tc.machine().count_events(MachineEvent::is_motion), 0);
    assert!(!tc.dual_carriage().unwrap().active_parked());

    tc.change(ChangeRequest::to(0)).unwrap();
    assert_eq!(tc.machine().current_position().x, 40.0);
    assert!(tc.dual_carriage().unwrap().active_parked());
}

#[test]
fn mode_change_clears_park() {
    let mut tc = changer_at(DXC, Xyz::new(120.0, 50.0, 10.0));
    tc.change(ChangeRequest::to(1)).unwrap();
    assert!(tc.dual_carriage().unwrap().active_parked());

    tc.set_carriage_mode(DualCarriageMode::AutoPark).unwrap();
    let dxc = tc.dual_carriage().unwrap();
    assert_eq!(dxc.mode(), DualCarriageMode::AutoPark);
    assert!(!dxc.active_parked());
}

#[test]
fn carriage_x_written_before_leveling_restored() {
    for mode in [
        DualCarriageMode::AutoPark,
        DualCarriageMode::FullControl,
        DualCarriageMode::Duplication,
    ] {
        let mut tc = changer_at(DXC, Xyz::new(120.0, 50.0, 10.0));
        tc.set_carriage_mode(mode).unwrap();
        tc.machine_mut().set_leveling_enabled(true);
        tc.machine_mut().clear_events();

        tc.change(ChangeRequest::to(1)).unwrap();

        let events = tc.machine().events();
        let position_writes: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| matches!(e, MachineEvent::SetPosition(_)))
            .map(|(i, _)| i)
            .collect();
        // Offset shift, then the carriage X bookkeeping.
        assert_eq!(position_writes.len(), 2, "{mode:?}");
        let leveling_off = events
            .iter()
            .position(|e| *e == MachineEvent::SetLeveling(false))
            .unwrap();
        let leveling_on = events
            .iter()
            .position(|e| *e == MachineEvent::SetLeveling(true))
            .unwrap();
        assert!(leveling_off < position_writes[0], "{mode:?}");
        assert!(position_writes[1] < leveling_on, "{mode:?}");
        assert!(tc.machine().leveling_active());
    }
}
