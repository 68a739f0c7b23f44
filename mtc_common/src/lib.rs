//! MTC Common Library
//!
//! This crate provides the shared tool data model, collaborator traits,
//! constants and configuration loading utilities for all workspace crates.
//!
//! # Module Structure
//!
//! - [`tool`] - Tool indices, offsets, extrusion, switch paths, relay topology, config
//! - [`hal`] - Collaborator traits (motion, leveling, run-state, tool I/O)
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - System-wide capacities and defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use mtc_common::prelude::*;
//!
//! let offsets = OffsetModel::new(&[Xyz::ZERO, Xyz::new(5.0, 0.0, 0.0)]).unwrap();
//! assert_eq!(offsets.delta(0, 1).x, 5.0);
//! ```

pub mod config;
pub mod consts;
pub mod hal;
pub mod prelude;
pub mod tool;
