//! System-wide constants for the multi-tool controller workspace.
//!
//! Single source of truth for tool capacities and tool-change defaults.
//! Imported by all crates; values are not duplicated elsewhere.

use static_assertions::const_assert;

/// Maximum number of logical tools (extruders).
pub const MAX_TOOLS: usize = 8;

/// Maximum number of waypoints in one tool's switch path.
pub const MAX_SWITCH_MOVES: usize = 8;

/// Maximum number of co-extruding steppers in a mixing extruder.
pub const MAX_MIXING_STEPPERS: usize = 6;

/// Maximum number of virtual (blend) tools.
pub const MAX_VIRTUAL_TOOLS: usize = 16;

/// Maximum number of relay select lines.
pub const MAX_SELECT_LINES: usize = 4;

/// Maximum number of physical extruder drivers.
pub const MAX_DRIVERS: usize = 8;

/// Default travel feedrate for tool changes [mm/s] (XY probe feedrate, 8000 mm/min).
pub const DEFAULT_TRAVEL_FEEDRATE_MM_S: f64 = 8000.0 / 60.0;

/// Small Z lift applied before the return move [mm].
pub const DEFAULT_Z_LIFT: f64 = 1.5;

/// Minimum Z raise before a servo nozzle swap [mm].
pub const SERVO_SWAP_MIN_RAISE: f64 = 1.0;

/// Relay settle delay after asserting select lines [ms].
pub const RELAY_SETTLE_DELAY_MS: u64 = 500;

/// Default servo settle delay after a swap command [ms].
pub const SERVO_SETTLE_DELAY_MS: u64 = 500;

/// Default soft endstop maximum per axis [mm].
pub const DEFAULT_SOFT_MAX_MM: f64 = 200.0;

/// Default maximum XY feedrate [mm/s].
pub const DEFAULT_MAX_FEEDRATE_XY_MM_S: f64 = 300.0;

/// Default maximum Z feedrate [mm/s].
pub const DEFAULT_MAX_FEEDRATE_Z_MM_S: f64 = 5.0;

/// Z lift when parking the outgoing dual-carriage head [mm].
pub const TOOLCHANGE_PARK_ZLIFT: f64 = 0.2;

/// Z lift recorded for unparking the incoming dual-carriage head [mm].
pub const TOOLCHANGE_UNPARK_ZLIFT: f64 = 1.0;

/// Nominal filament diameter [mm].
pub const DEFAULT_NOMINAL_FILAMENT_DIA: f64 = 1.75;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/mtc/toolchange.toml";

// Tool and driver indices are carried as u8.
const_assert!(MAX_TOOLS <= u8::MAX as usize);
const_assert!(MAX_DRIVERS <= u8::MAX as usize);
const_assert!(MAX_VIRTUAL_TOOLS <= u8::MAX as usize);
// Select-line patterns and stepper masks are u8 bitflags.
const_assert!(MAX_SELECT_LINES <= 8);
const_assert!(MAX_DRIVERS <= 8);
