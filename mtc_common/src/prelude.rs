//! Prelude module for common re-exports.
//!
//! ```rust
//! use mtc_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};
pub use crate::tool::config::{
    ActuatorConfig, DualCarriageMode, FiberCutterConfig, MachineLimits, ServoLayout,
    ToolchangeConfig,
};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{MAX_DRIVERS, MAX_MIXING_STEPPERS, MAX_TOOLS, MAX_VIRTUAL_TOOLS};

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::gateway::{LevelingGateway, Machine, MotionGateway, RunState, ToolIo};

// ─── Tool Model ─────────────────────────────────────────────────────
pub use crate::tool::drivers::DriverMap;
pub use crate::tool::extrusion::ExtrusionModel;
pub use crate::tool::offsets::OffsetModel;
pub use crate::tool::relay::{RelayPreset, RelayRoute, RelayTopology, SelectLines};
pub use crate::tool::switch_path::{SwitchOffset, ToolSwitchPath, Waypoint};
pub use crate::tool::types::{ActiveToolState, Axis, DriverIndex, ToolIndex, Xyz};
pub use crate::tool::ToolError;
