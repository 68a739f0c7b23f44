//! Mixing extruder: virtual tools blending several co-extruding steppers.
//!
//! Selecting a virtual tool copies its blend row; nothing moves and no
//! output is touched, so `engage()` is never part of the flow.

use heapless::Vec;
use mtc_common::consts::{MAX_MIXING_STEPPERS, MAX_VIRTUAL_TOOLS};
use mtc_common::hal::gateway::Machine;
use mtc_common::tool::types::{DriverIndex, ToolIndex};
use mtc_common::tool::ToolError;

use super::{ActuatorKind, SwitchStep, ToolActuator};

type BlendRow = Vec<f64, MAX_MIXING_STEPPERS>;

#[derive(Debug, Clone, PartialEq)]
pub struct MixingActuator {
    steppers: u8,
    table: Vec<BlendRow, MAX_VIRTUAL_TOOLS>,
}

impl MixingActuator {
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when the table has more virtual
    /// tools or steppers than the fixed capacity.
    pub fn new(steppers: u8, virtual_tools: &[std::vec::Vec<f64>]) -> Result<Self, ToolError> {
        let mut table = Vec::new();
        for (vt, row) in virtual_tools.iter().enumerate() {
            let row = BlendRow::from_slice(row).map_err(|_| ToolError::InvalidToolIndex {
                index: vt as ToolIndex,
                limit: MAX_MIXING_STEPPERS as u8,
            })?;
            table.push(row).map_err(|_| ToolError::InvalidToolIndex {
                index: vt as ToolIndex,
                limit: MAX_VIRTUAL_TOOLS as u8,
            })?;
        }
        Ok(Self { steppers, table })
    }

    #[inline]
    pub fn steppers(&self) -> u8 {
        self.steppers
    }
}

impl ToolActuator for MixingActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Mixing
    }

    fn virtual_tool_count(&self) -> Option<u8> {
        Some(self.table.len() as u8)
    }

    fn blend(&self, virtual_tool: ToolIndex) -> Option<&[f64]> {
        self.table.get(virtual_tool as usize).map(|row| row.as_slice())
    }

    fn engage(
        &mut self,
        _machine: &mut dyn Machine,
        _step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        Err(ToolError::UnsupportedOperation(
            "mixing extruder selects virtual tools, not physical ones",
        ))
    }
}
