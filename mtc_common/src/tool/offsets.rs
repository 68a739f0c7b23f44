//! Per-tool geometric offsets.
//!
//! Offsets are relative to a reference tool (conventionally tool 0 with a
//! zero offset, not enforced). A tool change never overwrites the logical
//! position with an absolute offset; it adds the delta between the outgoing
//! and incoming tools exactly once.

use heapless::Vec;

use super::error::ToolError;
use super::types::{Axis, ToolIndex, Xyz};
use crate::consts::MAX_TOOLS;

/// Hotend offsets for every configured tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetModel {
    offsets: Vec<Xyz, MAX_TOOLS>,
}

impl OffsetModel {
    /// Build from a slice of per-tool offsets.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidToolIndex`] if more than `MAX_TOOLS`
    /// offsets are supplied.
    pub fn new(offsets: &[Xyz]) -> Result<Self, ToolError> {
        let offsets = Vec::from_slice(offsets).map_err(|_| ToolError::InvalidToolIndex {
            index: offsets.len().min(u8::MAX as usize) as ToolIndex,
            limit: MAX_TOOLS as u8,
        })?;
        Ok(Self { offsets })
    }

    /// All-zero offsets for `count` tools.
    pub fn zeroed(count: u8) -> Self {
        let mut offsets = Vec::new();
        for _ in 0..(count as usize).min(MAX_TOOLS) {
            let _ = offsets.push(Xyz::ZERO);
        }
        Self { offsets }
    }

    /// Number of tools with an offset entry.
    #[inline]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset of `tool`. Tools without an entry read as zero.
    #[inline]
    pub fn offset(&self, tool: ToolIndex) -> Xyz {
        self.offsets.get(tool as usize).copied().unwrap_or_default()
    }

    /// Replace one axis of one tool's offset.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidToolIndex`] if `tool` has no entry.
    pub fn set_offset(&mut self, tool: ToolIndex, axis: Axis, value: f64) -> Result<(), ToolError> {
        let limit = self.offsets.len() as u8;
        let entry = self
            .offsets
            .get_mut(tool as usize)
            .ok_or(ToolError::InvalidToolIndex { index: tool, limit })?;
        entry[axis] = value;
        Ok(())
    }

    /// Offset delta for switching `from` → `to`: `offset[to] − offset[from]`.
    #[inline]
    pub fn delta(&self, from: ToolIndex, to: ToolIndex) -> Xyz {
        self.offset(to) - self.offset(from)
    }

    /// Transform a reference-frame (home) coordinate into `tool`'s frame.
    #[inline]
    pub fn home_to_tool(&self, tool: ToolIndex, axis: Axis, value: f64) -> f64 {
        value + self.offset(tool)[axis]
    }

    pub fn as_slice(&self) -> &[Xyz] {
        &self.offsets
    }
}
