//! # MTC HAL Library
//!
//! Simulated collaborators for the tool-change core.
//!
//! The core in `mtc_toolchange` is written against the traits in
//! `mtc_common::hal::gateway`. This crate provides a software implementation
//! of all of them so the core can run in tests, benches and the CLI without
//! firmware glue.
//!
//! # Module Structure
//!
//! - [`simulation`] - `SimulatedMachine`, motion and I/O simulators
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   mtc_hal (single crate)                 │
//! │  ┌─────────────────┐    ┌──────────────────────────────┐ │
//! │  │ MotionSimulator │◄──►│      SimulatedMachine        │ │
//! │  └─────────────────┘    │ MotionGateway  LevelingGateway│ │
//! │  ┌─────────────────┐    │ RunState       ToolIo        │ │
//! │  │   IoSimulator   │◄──►│ MachineEvent log             │ │
//! │  └─────────────────┘    └──────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod simulation;

// Re-export key types for convenience
pub use crate::simulation::{EStepperMask, MachineEvent, SimulatedMachine};
