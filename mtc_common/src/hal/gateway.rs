//! Collaborator interfaces consumed by the tool-change core.
//!
//! The orchestrator never talks to hardware directly. Motion, leveling,
//! run-state and digital/servo/relay output all go through these traits so
//! the same core drives real firmware glue or the simulation in `mtc_hal`.
//!
//! # Blocking Contracts
//!
//! | Operation | Blocks until |
//! |-----------|--------------|
//! | `synchronize()` | motion queue empty |
//! | `do_blocking_move_to()` | move executed |
//! | `home_all()` | homing finished |
//! | `safe_delay()` | delay elapsed |
//! | `buffer_line()` | never (queues only) |

use crate::tool::types::{Axis, DriverIndex, Xyz};

/// Motion system: positions, feedrate register and queue control.
pub trait MotionGateway {
    /// Logical position of the active tool [mm].
    fn current_position(&self) -> Xyz;

    /// Overwrite the logical position (bookkeeping only, no motion).
    fn set_current_position(&mut self, position: Xyz);

    /// Position a pending move targets [mm].
    fn destination(&self) -> Xyz;

    fn set_destination(&mut self, position: Xyz);

    /// Current feedrate register [mm/s].
    fn feedrate(&self) -> f64;

    fn set_feedrate(&mut self, feedrate_mm_s: f64);

    /// Maximum feedrate of `axis` [mm/s].
    fn max_feedrate(&self, axis: Axis) -> f64;

    /// Upper software travel bound [mm].
    fn soft_endstop_max(&self) -> Xyz;

    /// Queue a straight move to `target` without waiting. The logical
    /// position follows the queued target.
    fn buffer_line(&mut self, target: Xyz, feedrate_mm_s: f64);

    /// Move to `target` and wait for completion.
    fn do_blocking_move_to(&mut self, target: Xyz, feedrate_mm_s: f64);

    /// Block until the motion queue is empty.
    fn synchronize(&mut self);

    /// Any axis lacks a trusted home position.
    fn axis_unhomed(&self) -> bool;

    /// Home every axis synchronously.
    fn home_all(&mut self);

    /// Tell the planner the logical position is where the machine is now.
    fn sync_plan_position(&mut self);

    /// Move Z only, keeping XY.
    fn do_blocking_move_to_z(&mut self, z: f64, feedrate_mm_s: f64) {
        let target = self.current_position().with_z(z);
        self.do_blocking_move_to(target, feedrate_mm_s);
    }

    /// Move XY only, keeping Z.
    fn do_blocking_move_to_xy(&mut self, x: f64, y: f64, feedrate_mm_s: f64) {
        let target = self.current_position().with_xy(x, y);
        self.do_blocking_move_to(target, feedrate_mm_s);
    }

    /// Snapshot the logical position as the destination.
    fn set_destination_to_current(&mut self) {
        let current = self.current_position();
        self.set_destination(current);
    }
}

/// Bed-leveling compensation toggle.
pub trait LevelingGateway {
    fn leveling_active(&self) -> bool;

    /// Enable or disable compensation. The logical position is re-derived
    /// by the collaborator.
    fn set_leveling_enabled(&mut self, enabled: bool);
}

/// Printer run-state gate.
pub trait RunState {
    /// Physical moves are allowed (not paused, not halted).
    fn is_running(&self) -> bool;
}

/// Digital, relay and servo outputs plus extruder stepper enables.
pub trait ToolIo {
    fn write_pin(&mut self, pin: u8, high: bool);

    /// Drive relay select line `line`.
    fn write_relay(&mut self, line: u8, high: bool);

    fn move_servo(&mut self, servo_id: u8, angle: i16);

    /// Wait without starving background tasks [ms].
    fn safe_delay(&mut self, ms: u64);

    fn disable_e_steppers(&mut self);

    fn enable_e_stepper(&mut self, driver: DriverIndex);
}

/// Everything the tool-change core needs from its environment.
pub trait Machine: MotionGateway + LevelingGateway + RunState + ToolIo {}

impl<T: MotionGateway + LevelingGateway + RunState + ToolIo> Machine for T {}
