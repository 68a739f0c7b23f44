//! Tool data model shared by the tool-change core and its collaborators.
//!
//! - [`types`] - Tool/driver indices, `Xyz`, `ActiveToolState`
//! - [`offsets`] - Per-tool hotend offsets
//! - [`extrusion`] - Flow, density and volumetric extrusion factors
//! - [`switch_path`] - Physical switch-path waypoints
//! - [`drivers`] - Composite driver topology
//! - [`relay`] - Relay multiplex topology descriptor
//! - [`config`] - TOML configuration
//! - [`error`] - `ToolError`

pub mod config;
pub mod drivers;
pub mod error;
pub mod extrusion;
pub mod offsets;
pub mod relay;
pub mod switch_path;
pub mod types;

pub use error::ToolError;
pub use types::{ActiveToolState, Axis, DriverIndex, ToolIndex, Xyz};
