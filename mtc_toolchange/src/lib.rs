//! # Multi-Tool Tool-Change Orchestrator
//!
//! Switches the active print tool on multi-extruder machines. One
//! [`orchestrator::ToolChanger`] owns the tool state and drives a single
//! hardware backend selected from configuration:
//!
//! | Backend | Hardware |
//! |---------|----------|
//! | `null` | index swap only |
//! | `solenoid` | one digital output per tool |
//! | `relay` | relay-multiplexed driver sharing |
//! | `servo` | dondolo rocker or filament selector |
//! | `dual_carriage` | two independent X carriages |
//! | `mixing` | virtual blend tools |
//! | `physical_path` | waypoint-driven mechanical swap |
//!
//! Motion, leveling, run-state and outputs are reached only through the
//! collaborator traits in `mtc_common::hal::gateway`. All actuation is
//! open-loop: nothing reads back whether a switch physically happened.
//!
//! ## Concurrency
//!
//! Single cooperative context. A change is non-reentrant (`&mut self`);
//! the only waits are explicit queue drains and settle delays.

pub mod actuator;
pub mod config;
pub mod context;
pub mod fiber;
pub mod orchestrator;
pub mod wipe;

pub use actuator::{ActuatorKind, ToolActuator};
pub use context::ToolContext;
pub use orchestrator::{ChangeOutcome, ChangeRequest, ToolChanger};
