//! Composite fiber cutter.
//!
//! A servo-driven blade severs the reinforcing fiber of a composite head.
//! The cut is a fixed two-step open-loop sequence: active angle, then
//! neutral angle. Nothing reads back whether the blade moved.

use mtc_common::hal::gateway::{MotionGateway, ToolIo};
use mtc_common::tool::config::FiberCutterConfig;
use serde::Serialize;
use tracing::{debug, info};

/// Fiber feed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FiberState {
    /// Fiber is severed (no fiber in the nozzle path).
    pub fiber_is_cut: bool,
    /// The current job lays fiber.
    pub printing_with_fiber: bool,
}

impl Default for FiberState {
    fn default() -> Self {
        Self {
            fiber_is_cut: true,
            printing_with_fiber: false,
        }
    }
}

impl FiberState {
    pub fn set_printing_with_fiber(&mut self, enabled: bool) {
        self.printing_with_fiber = enabled;
    }

    /// Fiber has been fed through again after a cut.
    pub fn mark_fiber_loaded(&mut self) {
        self.fiber_is_cut = false;
    }
}

/// Cutter servo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiberCutter {
    pub servo_id: u8,
    pub neutral_angle: i16,
    pub active_angle: i16,
}

impl From<FiberCutterConfig> for FiberCutter {
    fn from(cfg: FiberCutterConfig) -> Self {
        Self {
            servo_id: cfg.servo_id,
            neutral_angle: cfg.neutral_angle,
            active_angle: cfg.active_angle,
        }
    }
}

impl FiberCutter {
    /// Drain the queue, swing the blade through and back, mark the fiber cut.
    pub fn cut<M>(&self, state: &mut FiberState, machine: &mut M)
    where
        M: MotionGateway + ToolIo + ?Sized,
    {
        machine.synchronize();
        debug!(
            "Cutting fiber: servo {} {} -> {}",
            self.servo_id, self.active_angle, self.neutral_angle
        );
        machine.move_servo(self.servo_id, self.active_angle);
        machine.move_servo(self.servo_id, self.neutral_angle);
        state.fiber_is_cut = true;
        info!("Fiber cut");
    }
}
