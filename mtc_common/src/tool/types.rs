//! Core tool identifiers, the XYZ vector, and the active-tool state record.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Index, IndexMut, Sub};

/// Logical tool (extruder/hotend) index, valid in `[0, tool_count)`.
pub type ToolIndex = u8;

/// Physical stepper driver index. May differ from the tool index when
/// several tools share one driver through relays.
pub type DriverIndex = u8;

// ─── Axes ───────────────────────────────────────────────────────────

/// Cartesian axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    /// All axes in X, Y, Z order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

/// 3-axis position or offset vector [mm].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Xyz {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same vector with Z replaced.
    #[inline]
    pub const fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Same vector with X and Y replaced.
    #[inline]
    pub const fn with_xy(self, x: f64, y: f64) -> Self {
        Self { x, y, z: self.z }
    }
}

impl Index<Axis> for Xyz {
    type Output = f64;

    fn index(&self, axis: Axis) -> &f64 {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }
}

impl IndexMut<Axis> for Xyz {
    fn index_mut(&mut self, axis: Axis) -> &mut f64 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

impl Add for Xyz {
    type Output = Xyz;

    fn add(self, rhs: Xyz) -> Xyz {
        Xyz::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Xyz {
    fn add_assign(&mut self, rhs: Xyz) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Xyz {
    type Output = Xyz;

    fn sub(self, rhs: Xyz) -> Xyz {
        Xyz::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

// ─── Active Tool State ──────────────────────────────────────────────

/// Which tool is logically active.
///
/// Written only by the tool-change orchestrator; heater management, display
/// and planner read it between operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveToolState {
    /// Currently selected tool.
    pub active_extruder: ToolIndex,
    /// Tool selected before the last completed change.
    pub previous_extruder: ToolIndex,
    /// Physical driver currently routed to the active tool.
    pub active_driver: DriverIndex,
}

impl ActiveToolState {
    /// Record a completed change.
    #[inline]
    pub fn commit(&mut self, target: ToolIndex, driver: DriverIndex) {
        self.previous_extruder = self.active_extruder;
        self.active_extruder = target;
        self.active_driver = driver;
    }
}
