//! Multi-waypoint mechanical tool swap.
//!
//! The switch itself is nothing but motion: the orchestrator walks the
//! target tool's switch path on the way back to the destination. This
//! backend only selects that return path.

use mtc_common::hal::gateway::Machine;
use mtc_common::tool::types::DriverIndex;
use mtc_common::tool::ToolError;

use super::{ActuatorKind, ReturnPath, SwitchStep, ToolActuator};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhysicalPathActuator;

impl ToolActuator for PhysicalPathActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::PhysicalPath
    }

    fn return_path(&self) -> ReturnPath {
        ReturnPath::SwitchPath
    }

    fn engage(
        &mut self,
        _machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        Ok(step.to)
    }
}
