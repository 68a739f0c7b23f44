//! Dual X-carriage switching.
//!
//! Two independent X carriages, each with its own home position. The mode
//! decides what happens to the outgoing head and how the logical X of the
//! incoming head is derived:
//!
//! | Mode | Outgoing head | Incoming X |
//! |------|---------------|------------|
//! | `FullControl` | stays where it is | remembered inactive X |
//! | `AutoPark` | parked at its home X | its home X |
//! | `Duplication` | mirrors the incoming head | inactive X or destination + offset |
//!
//! Offsets apply on Y and Z only; X comes from the carriage geometry.

use mtc_common::consts::{TOOLCHANGE_PARK_ZLIFT, TOOLCHANGE_UNPARK_ZLIFT};
use mtc_common::hal::gateway::{Machine, MotionGateway, RunState};
use mtc_common::tool::config::DualCarriageMode;
use mtc_common::tool::types::{Axis, DriverIndex, ToolIndex, Xyz};
use mtc_common::tool::ToolError;
use tracing::{debug, info};

use super::{ActuatorKind, OffsetApplication, SwitchStep, ToolActuator};

#[derive(Debug, Clone, PartialEq)]
pub struct DualCarriageActuator {
    mode: DualCarriageMode,
    x_home: [f64; 2],
    duplicate_x_offset: f64,
    /// Raw X of the carriage that is not active.
    inactive_x: f64,
    delayed_move: bool,
    active_parked: bool,
    raised_parked_position: Xyz,
    duplication_enabled: bool,
}

impl DualCarriageActuator {
    pub fn new(x_home: [f64; 2], mode: DualCarriageMode, duplicate_x_offset: f64) -> Self {
        Self {
            mode,
            x_home,
            duplicate_x_offset,
            inactive_x: x_home[1],
            delayed_move: false,
            active_parked: false,
            raised_parked_position: Xyz::ZERO,
            duplication_enabled: false,
        }
    }

    /// Switch operating mode. Clears park, pending-move and duplication
    /// state.
    pub fn set_mode(&mut self, mode: DualCarriageMode) {
        info!("Dual carriage mode {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
        self.active_parked = false;
        self.delayed_move = false;
        self.duplication_enabled = false;
    }

    /// Mark an unpark move as pending (set by the motion layer).
    pub fn set_delayed_move(&mut self, pending: bool) {
        self.delayed_move = pending;
    }

    /// Start mirroring moves on both heads. Only meaningful in
    /// `Duplication` mode.
    pub fn enable_duplication(&mut self, x_offset: f64) {
        self.duplicate_x_offset = x_offset;
        self.duplication_enabled = self.mode == DualCarriageMode::Duplication;
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn mode(&self) -> DualCarriageMode {
        self.mode
    }

    /// Home X of `carriage` (0 or 1).
    #[inline]
    pub fn x_home(&self, carriage: ToolIndex) -> f64 {
        self.x_home[usize::from(carriage.min(1))]
    }

    #[inline]
    pub fn inactive_x(&self) -> f64 {
        self.inactive_x
    }

    #[inline]
    pub fn delayed_move(&self) -> bool {
        self.delayed_move
    }

    #[inline]
    pub fn active_parked(&self) -> bool {
        self.active_parked
    }

    /// Position the parked head returns to on unpark.
    #[inline]
    pub fn raised_parked_position(&self) -> Xyz {
        self.raised_parked_position
    }

    #[inline]
    pub fn duplication_enabled(&self) -> bool {
        self.duplication_enabled
    }

    /// Raise, retreat the outgoing carriage to its home X, lower.
    fn park_outgoing<M>(&self, machine: &mut M, from: ToolIndex)
    where
        M: MotionGateway + ?Sized,
    {
        let cur = machine.current_position();
        let raised_z = (cur.z + TOOLCHANGE_PARK_ZLIFT).min(machine.soft_endstop_max().z);
        let home = self.x_home(from);
        let fz = machine.max_feedrate(Axis::Z);
        let fx = machine.max_feedrate(Axis::X);
        debug!("Parking carriage {} at X{:.3}", from, home);
        machine.buffer_line(Xyz::new(cur.x, cur.y, raised_z), fz);
        machine.buffer_line(Xyz::new(home, cur.y, raised_z), fx);
        machine.buffer_line(Xyz::new(home, cur.y, cur.z), fz);
        machine.synchronize();
    }
}

impl ToolActuator for DualCarriageActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::DualCarriage
    }

    fn offset_application(&self) -> OffsetApplication {
        OffsetApplication::YzOnly
    }

    fn engage(
        &mut self,
        machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        let away_from_home = machine.current_position().x != self.x_home(step.from);
        if self.mode == DualCarriageMode::AutoPark
            && machine.is_running()
            && (self.delayed_move || away_from_home)
        {
            self.park_outgoing(machine, step.from);
        }
        Ok(step.to)
    }

    fn after_offsets(&mut self, machine: &mut dyn Machine, step: &mut SwitchStep<'_>) {
        let mut cur = machine.current_position();
        cur.x = self.x_home(step.to);
        if self.mode != DualCarriageMode::AutoPark {
            step.allow_move = false;
        }

        match self.mode {
            DualCarriageMode::FullControl => {
                cur.x = self.inactive_x;
                self.inactive_x = step.destination.x;
            }
            DualCarriageMode::AutoPark => {
                let soft_max_z = machine.soft_endstop_max().z;
                self.raised_parked_position =
                    cur.with_z((cur.z + TOOLCHANGE_UNPARK_ZLIFT).min(soft_max_z));
                self.active_parked = true;
                self.delayed_move = false;
            }
            DualCarriageMode::Duplication => {
                self.active_parked = step.to == 0;
                cur.x = if self.active_parked {
                    self.inactive_x
                } else {
                    step.destination.x + self.duplicate_x_offset
                };
                self.inactive_x = step.destination.x;
                self.duplication_enabled = false;
            }
        }
        machine.set_current_position(cur);
    }

    fn as_dual_carriage(&self) -> Option<&DualCarriageActuator> {
        Some(self)
    }

    fn as_dual_carriage_mut(&mut self) -> Option<&mut DualCarriageActuator> {
        Some(self)
    }
}
