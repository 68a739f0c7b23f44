//! Hardware abstraction seams.
//!
//! This module contains the collaborator traits the tool-change core is
//! written against.

pub mod gateway;

pub use gateway::{LevelingGateway, Machine, MotionGateway, RunState, ToolIo};
