//! Data-driven relay multiplex topology.
//!
//! A small set of relay select lines routes one physical extruder driver to
//! one of several tools. The topology is a table of `(pattern, driver)`
//! entries indexed by tool; bit `i` of `pattern` drives select line `i` HIGH.
//!
//! Grouped topologies (more tools than one relay bank can route) index the
//! table by `tool mod group_size` and derive the driver as
//! `tool / group_size`.

use bitflags::bitflags;
use heapless::Vec;
use serde::{Deserialize, Serialize};

use super::error::ToolError;
use super::types::{DriverIndex, ToolIndex};
use crate::consts::{MAX_SELECT_LINES, MAX_TOOLS};

bitflags! {
    /// Relay select-line levels. A set bit drives the line HIGH.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SelectLines: u8 {
        const LINE_0 = 0x01;
        const LINE_1 = 0x02;
        const LINE_2 = 0x04;
        const LINE_3 = 0x08;
    }
}

impl SelectLines {
    /// Level of select line `line`.
    #[inline]
    pub fn level(self, line: u8) -> bool {
        line < 8 && self.bits() & (1 << line) != 0
    }
}

/// One row of the topology table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayEntry {
    /// Select-line bit pattern.
    pub pattern: u8,
    /// Driver routed by this pattern. Ignored for grouped topologies.
    #[serde(default)]
    pub driver: DriverIndex,
}

impl RelayEntry {
    pub const fn new(pattern: u8, driver: DriverIndex) -> Self {
        Self { pattern, driver }
    }
}

/// Resolved relay state for one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelayRoute {
    pub lines: SelectLines,
    pub driver: DriverIndex,
}

/// Relay wiring descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayTopology {
    /// Number of select lines driven on every change.
    pub select_lines: u8,
    /// Tool-indexed (or group-indexed) routing table.
    pub entries: Vec<RelayEntry, MAX_TOOLS>,
    /// Group size for grouped topologies.
    #[serde(default)]
    pub group_size: Option<u8>,
}

impl RelayTopology {
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when `entries` exceeds `MAX_TOOLS`.
    pub fn new(
        select_lines: u8,
        entries: &[RelayEntry],
        group_size: Option<u8>,
    ) -> Result<Self, ToolError> {
        let entries = Vec::from_slice(entries).map_err(|_| ToolError::InvalidToolIndex {
            index: entries.len().min(u8::MAX as usize) as ToolIndex,
            limit: MAX_TOOLS as u8,
        })?;
        Ok(Self {
            select_lines,
            entries,
            group_size,
        })
    }

    /// Resolve the select-line pattern and driver for `tool`.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when the table has no row for `tool`.
    pub fn resolve(&self, tool: ToolIndex) -> Result<RelayRoute, ToolError> {
        let group = self.group_size.filter(|&g| g > 0);
        let row = group.map_or(tool, |g| tool % g);
        let entry = self
            .entries
            .get(row as usize)
            .ok_or(ToolError::InvalidToolIndex {
                index: tool,
                limit: self.entries.len() as u8,
            })?;
        let driver = group.map_or(entry.driver, |g| tool / g);
        Ok(RelayRoute {
            lines: SelectLines::from_bits_truncate(entry.pattern),
            driver,
        })
    }

    /// Check the table is well formed and maps `tool_count` tools to
    /// pairwise distinct `(pattern, driver)` routes on one of the
    /// `driver_count` configured drivers.
    ///
    /// # Errors
    ///
    /// A human-readable description of the first problem found.
    pub fn validate(&self, tool_count: u8, driver_count: u8) -> Result<(), String> {
        if self.select_lines == 0 || self.select_lines as usize > MAX_SELECT_LINES {
            return Err(format!(
                "relay select_lines must be in 1..={MAX_SELECT_LINES}, got {}",
                self.select_lines
            ));
        }
        let line_mask = ((1u16 << self.select_lines) - 1) as u8;
        for (i, entry) in self.entries.iter().enumerate() {
            if entry.pattern & !line_mask != 0 {
                return Err(format!(
                    "relay entry {i} pattern {:#04b} uses lines beyond select_lines={}",
                    entry.pattern, self.select_lines
                ));
            }
        }
        if self.group_size == Some(0) {
            return Err("relay group_size must be positive".to_string());
        }

        let mut seen: Vec<RelayRoute, MAX_TOOLS> = Vec::new();
        for tool in 0..tool_count {
            let route = self
                .resolve(tool)
                .map_err(|_| format!("relay topology has no route for tool {tool}"))?;
            if route.driver >= driver_count {
                return Err(format!(
                    "relay route for tool {tool} needs driver {} but only {driver_count} are configured",
                    route.driver
                ));
            }
            if seen.contains(&route) {
                return Err(format!(
                    "relay route for tool {tool} (pattern {:#04b}, driver {}) is not unique",
                    route.lines.bits(),
                    route.driver
                ));
            }
            seen.push(route)
                .map_err(|_| format!("relay topology exceeds {MAX_TOOLS} tools"))?;
        }
        Ok(())
    }
}

// ─── Presets ────────────────────────────────────────────────────────

/// Named wirings of the supported relay boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayPreset {
    /// Four tools on two drivers, lines E0E2 / E1E3.
    Mkr4FourTools,
    /// Three tools on two drivers, line E0E2.
    Mkr4ThreeTools,
    /// Two tools on one driver, line E0E1.
    Mkr4TwoTools,
    /// Two tools on one driver, line EX1.
    Mkr6TwoTools,
    /// Three tools on one driver, lines EX1 / EX2.
    Mkr6ThreeTools,
    /// Banks of three tools per driver, lines EX1 / EX2.
    Mkr12,
}

impl RelayPreset {
    pub fn topology(self) -> RelayTopology {
        let (lines, rows, group): (u8, &[RelayEntry], Option<u8>) = match self {
            Self::Mkr4FourTools => (
                2,
                &[
                    RelayEntry::new(0b00, 0),
                    RelayEntry::new(0b00, 1),
                    RelayEntry::new(0b01, 0),
                    RelayEntry::new(0b10, 1),
                ],
                None,
            ),
            Self::Mkr4ThreeTools => (
                1,
                &[
                    RelayEntry::new(0b0, 0),
                    RelayEntry::new(0b0, 1),
                    RelayEntry::new(0b1, 0),
                ],
                None,
            ),
            Self::Mkr4TwoTools | Self::Mkr6TwoTools => (
                1,
                &[RelayEntry::new(0b0, 0), RelayEntry::new(0b1, 0)],
                None,
            ),
            Self::Mkr6ThreeTools => (
                2,
                &[
                    RelayEntry::new(0b00, 0),
                    RelayEntry::new(0b01, 0),
                    RelayEntry::new(0b11, 0),
                ],
                None,
            ),
            Self::Mkr12 => (
                2,
                &[
                    RelayEntry::new(0b00, 0),
                    RelayEntry::new(0b01, 0),
                    RelayEntry::new(0b11, 0),
                ],
                Some(3),
            ),
        };
        let mut entries = Vec::new();
        for row in rows {
            let _ = entries.push(*row);
        }
        RelayTopology {
            select_lines: lines,
            entries,
            group_size: group,
        }
    }

    /// Largest tool count the preset can route.
    pub fn max_tools(self) -> u8 {
        match self {
            Self::Mkr4FourTools => 4,
            Self::Mkr4ThreeTools | Self::Mkr6ThreeTools => 3,
            Self::Mkr4TwoTools | Self::Mkr6TwoTools => 2,
            Self::Mkr12 => MAX_TOOLS as u8,
        }
    }
}
