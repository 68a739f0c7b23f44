//! Solenoid-switched multi-hotend.
//!
//! One digital output per tool. Exactly one output is HIGH after a change
//! completes; the switch happens in `settle()` once motion has drained.

use heapless::Vec;
use mtc_common::consts::MAX_TOOLS;
use mtc_common::hal::gateway::{Machine, ToolIo};
use mtc_common::tool::types::{DriverIndex, ToolIndex};
use mtc_common::tool::ToolError;
use tracing::{debug, error};

use super::{ActuatorKind, SwitchStep, ToolActuator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolenoidActuator {
    pins: Vec<u8, MAX_TOOLS>,
}

impl SolenoidActuator {
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when more than `MAX_TOOLS` pins are given.
    pub fn new(pins: &[u8]) -> Result<Self, ToolError> {
        let pins = Vec::from_slice(pins).map_err(|_| ToolError::InvalidToolIndex {
            index: pins.len() as ToolIndex,
            limit: MAX_TOOLS as u8,
        })?;
        Ok(Self { pins })
    }

    #[inline]
    pub fn pins(&self) -> &[u8] {
        &self.pins
    }

    /// Drive the output of tool `index` HIGH.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidSolenoidIndex`] when no pin is configured for it.
    pub fn enable_solenoid<M: ToolIo + ?Sized>(
        &self,
        machine: &mut M,
        index: ToolIndex,
    ) -> Result<(), ToolError> {
        let pin = *self
            .pins
            .get(index as usize)
            .ok_or(ToolError::InvalidSolenoidIndex { index })?;
        debug!("Solenoid {} on (pin {})", index, pin);
        machine.write_pin(pin, true);
        Ok(())
    }

    /// Drive every configured output LOW.
    pub fn disable_all_solenoids<M: ToolIo + ?Sized>(&self, machine: &mut M) {
        for &pin in &self.pins {
            machine.write_pin(pin, false);
        }
    }
}

impl ToolActuator for SolenoidActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Solenoid
    }

    fn engage(
        &mut self,
        _machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        Ok(step.to)
    }

    fn settle(&mut self, machine: &mut dyn Machine, target: ToolIndex) {
        self.disable_all_solenoids(machine);
        if let Err(e) = self.enable_solenoid(machine, target) {
            error!("{}", e);
        }
    }
}
