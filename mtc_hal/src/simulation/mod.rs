//! Simulation module.
//!
//! This module provides a software stand-in for the motion, leveling and
//! tool I/O collaborators, for development and testing without hardware.

mod io;
mod machine;
mod motion;

pub use io::{EStepperMask, IoSimulator};
pub use machine::{MachineEvent, SimulatedMachine};
pub use motion::MotionSimulator;
