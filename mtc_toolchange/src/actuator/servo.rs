//! Servo-driven tool swap.
//!
//! Two layouts share the mechanism. A dondolo rocks two nozzles on one
//! servo and must lift Z first so the lowering nozzle clears the part. A
//! selector points one servo at the filament path of the target tool and
//! never moves the head.

use heapless::Vec;
use mtc_common::consts::{MAX_TOOLS, SERVO_SWAP_MIN_RAISE};
use mtc_common::hal::gateway::{Machine, MotionGateway, ToolIo};
use mtc_common::tool::config::ServoLayout;
use mtc_common::tool::types::{Axis, DriverIndex, ToolIndex};
use mtc_common::tool::ToolError;
use tracing::debug;

use super::{ActuatorKind, SwitchStep, ToolActuator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServoActuator {
    layout: ServoLayout,
    servo_id: u8,
    angles: Vec<i16, MAX_TOOLS>,
    settle_ms: u64,
}

impl ServoActuator {
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when more than `MAX_TOOLS` angles
    /// are given.
    pub fn new(
        layout: ServoLayout,
        servo_id: u8,
        angles: &[i16],
        settle_ms: u64,
    ) -> Result<Self, ToolError> {
        let angles = Vec::from_slice(angles).map_err(|_| ToolError::InvalidToolIndex {
            index: angles.len() as ToolIndex,
            limit: MAX_TOOLS as u8,
        })?;
        Ok(Self {
            layout,
            servo_id,
            angles,
            settle_ms,
        })
    }

    #[inline]
    pub fn layout(&self) -> ServoLayout {
        self.layout
    }

    fn angle(&self, tool: ToolIndex) -> Result<i16, ToolError> {
        self.angles
            .get(tool as usize)
            .copied()
            .ok_or(ToolError::InvalidToolIndex {
                index: tool,
                limit: self.angles.len() as u8,
            })
    }

    /// Drain, command the servo, wait for it to arrive.
    fn swing<M>(&self, machine: &mut M, angle: i16)
    where
        M: MotionGateway + ToolIo + ?Sized,
    {
        machine.synchronize();
        machine.move_servo(self.servo_id, angle);
        machine.safe_delay(self.settle_ms);
    }
}

/// Z clearance a dondolo swap needs: the extra drop of the incoming
/// nozzle plus a fixed margin.
#[inline]
pub fn dondolo_raise(from_z: f64, to_z: f64) -> f64 {
    (from_z - to_z).max(0.0) + SERVO_SWAP_MIN_RAISE
}

impl ToolActuator for ServoActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Servo
    }

    fn raises_z(&self) -> bool {
        self.layout == ServoLayout::Dondolo
    }

    fn engage(
        &mut self,
        machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        let angle = self.angle(step.to)?;
        if self.layout == ServoLayout::Dondolo {
            let raise = dondolo_raise(
                step.offsets.offset(step.from).z,
                step.offsets.offset(step.to).z,
            );
            let cur = machine.current_position();
            let fz = machine.max_feedrate(Axis::Z);
            debug!("Dondolo raise {:.3}mm before swap", raise);
            machine.buffer_line(cur.with_z(cur.z + raise), fz);
            machine.synchronize();
        }
        self.swing(machine, angle);
        Ok(0)
    }
}
