//! Integration test: configuration files.
//!
//! Validates: the shipped sample loads and drives a change, and invalid
//! actuator setups are rejected before any changer is built.

use std::path::PathBuf;

use mtc_common::config::{ConfigError, LogLevel};
use mtc_common::hal::gateway::MotionGateway;
use mtc_toolchange::config::{load_config, load_config_from_str};
use mtc_toolchange::{ActuatorKind, ChangeRequest, ToolChanger};

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/toolchange.toml")
}

fn rejected(toml: &str) -> bool {
    matches!(
        load_config_from_str(toml),
        Err(ConfigError::ValidationError(_))
    )
}

#[test]
fn sample_config_drives_a_round_trip() {
    let loaded = load_config(&sample_path()).unwrap();
    assert_eq!(loaded.shared.log_level, LogLevel::Info);
    assert_eq!(loaded.toolchange.tool_count, 2);

    let start = loaded.simulation.position;
    let mut tc = ToolChanger::new(&loaded.toolchange, loaded.simulated_machine()).unwrap();
    assert_eq!(tc.actuator_kind(), ActuatorKind::Solenoid);

    tc.change(ChangeRequest::to(1)).unwrap();
    tc.change(ChangeRequest::to(0)).unwrap();
    assert_eq!(tc.machine().current_position(), start);
    assert_eq!(tc.machine().feedrate(), loaded.simulation.feedrate);
}

#[test]
fn relay_duplicate_routes_rejected() {
    assert!(rejected(
        r#"
[toolchange]
tool_count = 2
hotend_count = 1

[toolchange.actuator]
kind = "relay"

[toolchange.actuator.topology]
select_lines = 1
entries = [{ pattern = 1 }, { pattern = 1 }]
"#
    ));
}

#[test]
fn relay_preset_capacity_enforced() {
    assert!(rejected(
        r#"
[toolchange]
tool_count = 3
hotend_count = 1

[toolchange.actuator]
kind = "relay"
preset = "mkr6_two_tools"
"#
    ));
}

#[test]
fn grouped_relay_needs_a_driver_per_bank() {
    let mkr12 = |drivers: &str| {
        format!(
            r#"
[toolchange]
tool_count = 6
hotend_count = 1
drivers = [{drivers}]

[toolchange.actuator]
kind = "relay"
preset = "mkr12"
"#
        )
    };
    // Tools 3..6 fall in the second bank, which needs driver 1.
    assert!(rejected(&mkr12("{ hotend = 0 }")));

    let loaded = load_config_from_str(&mkr12("{ hotend = 0 }, { hotend = 0 }")).unwrap();
    let mut tc = ToolChanger::new(&loaded.toolchange, loaded.simulated_machine()).unwrap();
    tc.change(ChangeRequest::to(4)).unwrap();
    assert_eq!(tc.state().active_driver, 1);
}

#[test]
fn dual_carriage_needs_two_tools() {
    assert!(rejected(
        r#"
[toolchange]
tool_count = 3

[toolchange.actuator]
kind = "dual_carriage"
x_home = [0.0, 300.0]
"#
    ));
}

#[test]
fn mixing_rows_must_match_steppers() {
    assert!(rejected(
        r#"
[toolchange]
tool_count = 1

[toolchange.actuator]
kind = "mixing"
steppers = 2
virtual_tools = [[1.0, 0.0], [0.5, 0.25, 0.25]]
"#
    ));
}

#[test]
fn physical_path_needs_path_per_tool() {
    assert!(rejected(
        r#"
[toolchange]
tool_count = 2
switch_paths = [[{ x = 5.0, y = 190.0, feedrate = 100.0 }]]

[toolchange.actuator]
kind = "physical_path"
"#
    ));
}

#[test]
fn unknown_actuator_kind_is_parse_error() {
    assert!(matches!(
        load_config_from_str("[toolchange]\ntool_count = 2\n[toolchange.actuator]\nkind = \"laser\"\n"),
        Err(ConfigError::ParseError(_))
    ));
}
