//! Per-tool switch-path waypoints for the physical-swap mechanism.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::error::ToolError;
use super::types::ToolIndex;
use crate::consts::{MAX_SWITCH_MOVES, MAX_TOOLS};

/// One waypoint of a tool's switch path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Target X in the reference (home) frame [mm].
    pub x: f64,
    /// Target Y in the reference (home) frame [mm].
    pub y: f64,
    /// Move feedrate [mm/s]. Zero or negative marks the waypoint inert.
    #[serde(default)]
    pub feedrate: f64,
    /// Part of the mechanical switch (as opposed to a cleaning move).
    #[serde(default)]
    pub switch_move: bool,
}

impl Waypoint {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.feedrate > 0.0
    }

    /// Target XY, shifted by `offset` when this is a switch move.
    #[inline]
    pub fn target_xy(&self, offset: SwitchOffset) -> (f64, f64) {
        if self.switch_move {
            (self.x + offset.x, self.y + offset.y)
        } else {
            (self.x, self.y)
        }
    }
}

/// Extra XY shift applied only to switch-move waypoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchOffset {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

/// Ordered waypoints for one tool.
pub type WaypointList = Vec<Waypoint, MAX_SWITCH_MOVES>;

/// Switch paths for every tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSwitchPath {
    paths: Vec<WaypointList, MAX_TOOLS>,
}

impl ToolSwitchPath {
    /// Build from per-tool waypoint slices.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when a tool or waypoint capacity is
    /// exceeded; `index` names the offending tool.
    pub fn new<P: AsRef<[Waypoint]>>(paths: &[P]) -> Result<Self, ToolError> {
        let mut out: Vec<WaypointList, MAX_TOOLS> = Vec::new();
        for (tool, path) in paths.iter().enumerate() {
            let overflow = ToolError::InvalidToolIndex {
                index: tool.min(u8::MAX as usize) as ToolIndex,
                limit: MAX_TOOLS as u8,
            };
            let list = WaypointList::from_slice(path.as_ref()).map_err(|_| overflow)?;
            out.push(list).map_err(|_| overflow)?;
        }
        Ok(Self { paths: out })
    }

    /// Number of tools with a path.
    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Waypoints of `tool` (empty when the tool has no path).
    #[inline]
    pub fn path(&self, tool: ToolIndex) -> &[Waypoint] {
        self.paths.get(tool as usize).map_or(&[], |p| p.as_slice())
    }

    /// First waypoint of `tool`, used as the wipe-park position.
    #[inline]
    pub fn first(&self, tool: ToolIndex) -> Option<&Waypoint> {
        self.path(tool).first()
    }
}
