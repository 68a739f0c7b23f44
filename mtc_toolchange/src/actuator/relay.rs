//! Relay-multiplexed driver sharing.
//!
//! A handful of relays route one extruder driver to one of several tools
//! feeding a single nozzle. Switching is: drain, cut every E stepper,
//! drive the select lines, wait for the contacts to settle, then enable the
//! routed driver.

use mtc_common::hal::gateway::Machine;
use mtc_common::tool::relay::{RelayRoute, RelayTopology};
use mtc_common::tool::types::{DriverIndex, ToolIndex};
use mtc_common::tool::ToolError;
use tracing::debug;

use super::{ActuatorKind, SwitchStep, ToolActuator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMultiplexActuator {
    topology: RelayTopology,
    settle_ms: u64,
}

impl RelayMultiplexActuator {
    pub fn new(topology: RelayTopology, settle_ms: u64) -> Self {
        Self {
            topology,
            settle_ms,
        }
    }

    #[inline]
    pub fn topology(&self) -> &RelayTopology {
        &self.topology
    }

    /// Route for `tool` without touching any output.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when the table has no row for `tool`.
    pub fn route(&self, tool: ToolIndex) -> Result<RelayRoute, ToolError> {
        self.topology.resolve(tool)
    }
}

impl ToolActuator for RelayMultiplexActuator {
    fn kind(&self) -> ActuatorKind {
        ActuatorKind::RelayMultiplex
    }

    fn engage(
        &mut self,
        machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError> {
        // Resolve before touching outputs so a bad index leaves them alone.
        let route = self.route(step.to)?;
        debug!(
            "Relay route T{}: lines {:#06b}, driver E{}",
            step.to,
            route.lines.bits(),
            route.driver
        );

        machine.synchronize();
        machine.disable_e_steppers();
        for line in 0..self.topology.select_lines {
            machine.write_relay(line, route.lines.level(line));
        }
        machine.safe_delay(self.settle_ms);
        machine.enable_e_stepper(route.driver);
        Ok(route.driver)
    }
}
