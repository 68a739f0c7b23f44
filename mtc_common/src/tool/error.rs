//! Tool-change error types.
//!
//! All hardware actuation is open-loop, so the only failures modeled here
//! are bad indices and operations the configured backend cannot perform.

use thiserror::Error;

use super::types::ToolIndex;

/// Errors reported by tool-change operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Requested tool is outside the configured (or virtual) tool range.
    #[error("T{index} invalid extruder (limit {limit})")]
    InvalidToolIndex {
        /// Offending index.
        index: ToolIndex,
        /// Exclusive upper bound that was violated.
        limit: u8,
    },

    /// Solenoid selection outside the configured pin table.
    #[error("Invalid solenoid {index}")]
    InvalidSolenoidIndex {
        /// Offending index.
        index: ToolIndex,
    },

    /// No plastic driver is mapped to the tool.
    #[error("T{tool} invalid extruder (no plastic driver)")]
    NoPlasticDriver {
        /// Tool that was looked up.
        tool: ToolIndex,
    },

    /// The configured actuator does not support the operation.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(&'static str),
}
