//! Hardware switching backends.
//!
//! Exactly one [`ToolActuator`] is selected from configuration when the
//! orchestrator is built. The orchestrator drives every change through the
//! same hook sequence and each backend fills in the hooks it needs:
//!
//! | Hook | When |
//! |------|------|
//! | `engage()` | after leveling is disabled, before offsets |
//! | `after_offsets()` | right after the offset delta, before leveling is restored |
//! | `settle()` | after the final queue drain |
//!
//! Backends that only rename the active index (shared nozzle) see
//! `engage()` alone.

pub mod dual_carriage;
pub mod mixing;
pub mod null;
pub mod physical_path;
pub mod relay;
pub mod servo;
pub mod solenoid;

use std::fmt;

use mtc_common::hal::gateway::Machine;
use mtc_common::tool::config::{ActuatorConfig, ToolchangeConfig};
use mtc_common::tool::offsets::OffsetModel;
use mtc_common::tool::types::{DriverIndex, ToolIndex, Xyz};
use mtc_common::tool::ToolError;
use serde::Serialize;

pub use dual_carriage::DualCarriageActuator;
pub use mixing::MixingActuator;
pub use null::NullActuator;
pub use physical_path::PhysicalPathActuator;
pub use relay::RelayMultiplexActuator;
pub use servo::ServoActuator;
pub use solenoid::SolenoidActuator;

// ─── Hook Types ─────────────────────────────────────────────────────

/// Backend identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorKind {
    Null,
    Solenoid,
    RelayMultiplex,
    Servo,
    DualCarriage,
    Mixing,
    PhysicalPath,
}

impl fmt::Display for ActuatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Solenoid => "solenoid",
            Self::RelayMultiplex => "relay_multiplex",
            Self::Servo => "servo",
            Self::DualCarriage => "dual_carriage",
            Self::Mixing => "mixing",
            Self::PhysicalPath => "physical_path",
        };
        f.write_str(name)
    }
}

/// Axes the offset delta is added to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetApplication {
    /// X, Y and Z.
    Xyz,
    /// Y and Z; X comes from the carriage home position.
    YzOnly,
}

impl OffsetApplication {
    /// Add `delta` to `position` on the covered axes.
    #[inline]
    pub fn apply(self, position: Xyz, delta: Xyz) -> Xyz {
        match self {
            Self::Xyz => position + delta,
            Self::YzOnly => Xyz::new(position.x, position.y + delta.y, position.z + delta.z),
        }
    }
}

/// How the head gets back to the snapshot destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPath {
    /// Single move to the destination.
    Direct,
    /// Target tool's switch-path waypoints, then unpark or XY-then-Z.
    SwitchPath,
}

/// One in-flight change as seen by a backend.
#[derive(Debug)]
pub struct SwitchStep<'a> {
    /// Outgoing tool.
    pub from: ToolIndex,
    /// Incoming tool.
    pub to: ToolIndex,
    /// Position snapshot taken before the switch.
    pub destination: Xyz,
    /// Return moves are allowed. Backends may clear it.
    pub allow_move: bool,
    pub offsets: &'a OffsetModel,
}

// ─── Strategy Trait ─────────────────────────────────────────────────

/// Hardware-specific tool switching.
pub trait ToolActuator: fmt::Debug + Send {
    fn kind(&self) -> ActuatorKind;

    /// Virtual tool count when this backend blends instead of switching.
    fn virtual_tool_count(&self) -> Option<u8> {
        None
    }

    /// Blend row of `virtual_tool`.
    fn blend(&self, _virtual_tool: ToolIndex) -> Option<&[f64]> {
        None
    }

    fn offset_application(&self) -> OffsetApplication {
        OffsetApplication::Xyz
    }

    /// `engage()` lifts Z itself, so the orchestrator skips its own lift
    /// and lowers Z back when return moves are not allowed.
    fn raises_z(&self) -> bool {
        false
    }

    fn return_path(&self) -> ReturnPath {
        ReturnPath::Direct
    }

    /// Perform the physical switch. Returns the driver now routed to the
    /// incoming tool.
    fn engage(
        &mut self,
        machine: &mut dyn Machine,
        step: &mut SwitchStep<'_>,
    ) -> Result<DriverIndex, ToolError>;

    /// Bookkeeping that must run before leveling is restored.
    fn after_offsets(&mut self, _machine: &mut dyn Machine, _step: &mut SwitchStep<'_>) {}

    /// Final output state once the queue is drained.
    fn settle(&mut self, _machine: &mut dyn Machine, _target: ToolIndex) {}

    fn as_dual_carriage(&self) -> Option<&DualCarriageActuator> {
        None
    }

    fn as_dual_carriage_mut(&mut self) -> Option<&mut DualCarriageActuator> {
        None
    }
}

/// Build the backend named by `config.actuator`.
///
/// # Errors
///
/// [`ToolError::InvalidToolIndex`] when a table exceeds its fixed capacity,
/// [`ToolError::UnsupportedOperation`] for a relay backend with no topology.
pub fn build(config: &ToolchangeConfig) -> Result<Box<dyn ToolActuator>, ToolError> {
    let actuator: Box<dyn ToolActuator> = match &config.actuator {
        ActuatorConfig::Null => Box::new(NullActuator::new(config.hotends() <= 1)),
        ActuatorConfig::Solenoid { pins } => Box::new(SolenoidActuator::new(pins)?),
        ActuatorConfig::Relay { settle_ms, .. } => {
            let topology = config
                .relay_topology()
                .ok_or(ToolError::UnsupportedOperation("relay actuator without topology"))?;
            Box::new(RelayMultiplexActuator::new(topology, *settle_ms))
        }
        ActuatorConfig::Servo {
            layout,
            servo_id,
            angles,
            settle_ms,
        } => Box::new(ServoActuator::new(*layout, *servo_id, angles, *settle_ms)?),
        ActuatorConfig::DualCarriage {
            x_home,
            mode,
            duplicate_x_offset,
        } => Box::new(DualCarriageActuator::new(*x_home, *mode, *duplicate_x_offset)),
        ActuatorConfig::Mixing {
            steppers,
            virtual_tools,
        } => Box::new(MixingActuator::new(*steppers, virtual_tools)?),
        ActuatorConfig::PhysicalPath => Box::new(PhysicalPathActuator),
    };
    Ok(actuator)
}
