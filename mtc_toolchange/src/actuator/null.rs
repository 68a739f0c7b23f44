//! Index-only switching.

use mtc_common::hal::gateway::Machine;
use mtc_common::tool::types::DriverIndex;
use mtc_common::tool::ToolError;

use super::{ActuatorKind, SwitchStep, ToolActuator};

/// No switching hardware. On a shared nozzle every tool feeds driver 0;
/// otherwise each tool owns the driver of the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullActuator {
    shared_nozzle: bool,
}

impl NullActuator {
    pub fn new(shared_nozzle: bool) -> Self {
        Self { shared_nozzle }
    }

    #[inline]
    pub fn shared_nozzle(&self) -> bool {
        self.shared_nozzle
    }
}

impl ToolActuator for NullActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::Null
    }

    fn engage(
        &mut self,
        _machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        Ok(if self.shared_nozzle { 0 } else { step.to })
    }
}
