//! Tool-change configuration structures.
//!
//! All config types use `serde::Deserialize` for TOML loading. Optional
//! fields use `#[serde(default)]`; the actuator section is internally tagged
//! by `kind`.
//!
//! ```toml
//! tool_count = 2
//! hotend_offsets = [{ x = 0.0 }, { x = 18.0, y = 0.2 }]
//!
//! [actuator]
//! kind = "solenoid"
//! pins = [40, 41]
//! ```

use serde::{Deserialize, Serialize};

use super::drivers::{DriverEntry, DriverMap};
use super::error::ToolError;
use super::extrusion::ExtrusionModel;
use super::offsets::OffsetModel;
use super::relay::{RelayPreset, RelayTopology};
use super::switch_path::{SwitchOffset, ToolSwitchPath, Waypoint};
use super::types::Xyz;
use crate::consts::{
    DEFAULT_MAX_FEEDRATE_XY_MM_S, DEFAULT_MAX_FEEDRATE_Z_MM_S, DEFAULT_SOFT_MAX_MM,
    DEFAULT_TRAVEL_FEEDRATE_MM_S, DEFAULT_Z_LIFT, MAX_DRIVERS, MAX_MIXING_STEPPERS,
    MAX_SWITCH_MOVES, MAX_TOOLS, MAX_VIRTUAL_TOOLS, RELAY_SETTLE_DELAY_MS, SERVO_SETTLE_DELAY_MS,
};

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete tool-change configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolchangeConfig {
    /// Number of logical tools.
    pub tool_count: u8,

    /// Number of physical hotends (1 = shared nozzle). Defaults to `tool_count`.
    #[serde(default)]
    pub hotend_count: Option<u8>,

    /// Per-hotend offsets. Empty means all zero.
    #[serde(default)]
    pub hotend_offsets: Vec<Xyz>,

    /// Travel feedrate used during a change when no override is given [mm/s].
    #[serde(default = "default_travel_feedrate")]
    pub travel_feedrate_mm_s: f64,

    /// Z lift before the return move [mm].
    #[serde(default = "default_z_lift")]
    pub z_lift: f64,

    /// Extra XY shift for switch-move waypoints.
    #[serde(default)]
    pub switch_offset: SwitchOffset,

    /// Per-tool switch-path waypoints.
    #[serde(default)]
    pub switch_paths: Vec<Vec<Waypoint>>,

    /// Physical driver topology. Empty means one plastic driver per tool.
    #[serde(default)]
    pub drivers: Vec<DriverEntry>,

    #[serde(default)]
    pub extrusion: ExtrusionConfig,

    /// Composite-fiber cutter, if fitted.
    #[serde(default)]
    pub fiber_cutter: Option<FiberCutterConfig>,

    #[serde(default)]
    pub machine: MachineLimits,

    /// Hardware switching backend.
    pub actuator: ActuatorConfig,
}

fn default_travel_feedrate() -> f64 {
    DEFAULT_TRAVEL_FEEDRATE_MM_S
}
fn default_z_lift() -> f64 {
    DEFAULT_Z_LIFT
}

// ─── Actuator Config ────────────────────────────────────────────────

/// Servo mechanism layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServoLayout {
    /// One motor rocking two nozzles (multi-hotend).
    Dondolo,
    /// Filament selector feeding a single nozzle.
    Selector,
}

/// Dual-carriage operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DualCarriageMode {
    /// Both heads independently commandable.
    FullControl,
    /// Inactive head parks automatically.
    #[default]
    AutoPark,
    /// Both heads mirror moves.
    Duplication,
}

/// Hardware switching backend selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActuatorConfig {
    /// Index swap only.
    Null,
    /// One digital output per tool.
    Solenoid {
        /// Output pin per tool.
        pins: Vec<u8>,
    },
    /// Relay-multiplexed driver sharing.
    Relay {
        #[serde(default)]
        preset: Option<RelayPreset>,
        #[serde(default)]
        topology: Option<RelayTopology>,
        #[serde(default = "default_relay_settle")]
        settle_ms: u64,
    },
    /// Servo-driven swap.
    Servo {
        layout: ServoLayout,
        servo_id: u8,
        /// Servo angle per tool [deg].
        angles: Vec<i16>,
        #[serde(default = "default_servo_settle")]
        settle_ms: u64,
    },
    /// Two independent X carriages.
    DualCarriage {
        /// Home X of each carriage [mm].
        x_home: [f64; 2],
        #[serde(default)]
        mode: DualCarriageMode,
        /// X distance between heads in duplication mode [mm].
        #[serde(default)]
        duplicate_x_offset: f64,
    },
    /// Virtual blend tools over co-extruding steppers.
    Mixing {
        steppers: u8,
        /// Mix factor rows, one per virtual tool.
        virtual_tools: Vec<Vec<f64>>,
    },
    /// Multi-waypoint mechanical swap.
    PhysicalPath,
}

fn default_relay_settle() -> u64 {
    RELAY_SETTLE_DELAY_MS
}
fn default_servo_settle() -> u64 {
    SERVO_SETTLE_DELAY_MS
}

// ─── Supporting Sections ────────────────────────────────────────────

/// Fiber cutter servo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiberCutterConfig {
    pub servo_id: u8,
    pub neutral_angle: i16,
    pub active_angle: i16,
}

/// Initial extrusion state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionConfig {
    #[serde(default)]
    pub volumetric_enabled: bool,
    /// Per-extruder flow [%]. Missing entries default to 100.
    #[serde(default)]
    pub flow_percentage: Vec<i16>,
    /// Per-extruder density [%]. Missing entries default to 100.
    #[serde(default)]
    pub density_percentage: Vec<i16>,
    /// Per-extruder filament diameter [mm]. Missing entries default to nominal.
    #[serde(default)]
    pub filament_size: Vec<f64>,
}

/// Motion envelope the orchestrator needs to bound its moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MachineLimits {
    #[serde(default = "default_soft_max")]
    pub soft_endstop_max: Xyz,
    #[serde(default = "default_max_feedrate")]
    pub max_feedrate_mm_s: Xyz,
    /// Delta printers only: Z above which moves are unsafe.
    #[serde(default)]
    pub delta_clip_start_height: Option<f64>,
}

fn default_soft_max() -> Xyz {
    Xyz::new(DEFAULT_SOFT_MAX_MM, DEFAULT_SOFT_MAX_MM, DEFAULT_SOFT_MAX_MM)
}
fn default_max_feedrate() -> Xyz {
    Xyz::new(
        DEFAULT_MAX_FEEDRATE_XY_MM_S,
        DEFAULT_MAX_FEEDRATE_XY_MM_S,
        DEFAULT_MAX_FEEDRATE_Z_MM_S,
    )
}

impl Default for MachineLimits {
    fn default() -> Self {
        Self {
            soft_endstop_max: default_soft_max(),
            max_feedrate_mm_s: default_max_feedrate(),
            delta_clip_start_height: None,
        }
    }
}

// ─── Derived Models ─────────────────────────────────────────────────

impl ToolchangeConfig {
    /// Effective number of physical hotends.
    #[inline]
    pub fn hotends(&self) -> u8 {
        self.hotend_count.unwrap_or(self.tool_count)
    }

    /// Offset model, zero-filled when no offsets are configured.
    ///
    /// # Errors
    ///
    /// Propagates capacity errors from [`OffsetModel::new`].
    pub fn offset_model(&self) -> Result<OffsetModel, ToolError> {
        if self.hotend_offsets.is_empty() {
            Ok(OffsetModel::zeroed(self.tool_count))
        } else {
            OffsetModel::new(&self.hotend_offsets)
        }
    }

    /// # Errors
    ///
    /// Propagates capacity errors from [`ToolSwitchPath::new`].
    pub fn switch_path(&self) -> Result<ToolSwitchPath, ToolError> {
        ToolSwitchPath::new(&self.switch_paths)
    }

    /// # Errors
    ///
    /// Propagates capacity errors from [`DriverMap::new`].
    pub fn driver_map(&self) -> Result<DriverMap, ToolError> {
        if self.drivers.is_empty() {
            Ok(DriverMap::identity(self.tool_count))
        } else {
            DriverMap::new(&self.drivers)
        }
    }

    /// Number of extruder drivers the extrusion model tracks.
    #[inline]
    pub fn driver_count(&self) -> u8 {
        if self.drivers.is_empty() {
            self.tool_count
        } else {
            self.drivers.len() as u8
        }
    }

    /// Extrusion model seeded from the `[extrusion]` section.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] when a per-extruder list is longer
    /// than the driver count.
    pub fn extrusion_model(&self) -> Result<ExtrusionModel, ToolError> {
        let cfg = &self.extrusion;
        let mut model = ExtrusionModel::new(self.driver_count(), cfg.volumetric_enabled);
        for (e, &pct) in cfg.flow_percentage.iter().enumerate() {
            model.set_flow_percentage(e as u8, pct)?;
        }
        for (e, &pct) in cfg.density_percentage.iter().enumerate() {
            model.set_density_percentage(e as u8, pct)?;
        }
        for (e, &d) in cfg.filament_size.iter().enumerate() {
            model.set_filament_size(e as u8, d)?;
        }
        Ok(model)
    }

    /// Relay topology for a relay actuator (preset or explicit table).
    pub fn relay_topology(&self) -> Option<RelayTopology> {
        match &self.actuator {
            ActuatorConfig::Relay {
                topology: Some(t), ..
            } => Some(t.clone()),
            ActuatorConfig::Relay {
                preset: Some(p), ..
            } => Some(p.topology()),
            _ => None,
        }
    }

    // ─── Validation ─────────────────────────────────────────────────

    /// Validate parameter bounds and actuator-specific constraints.
    pub fn validate(&self) -> Result<(), String> {
        if self.tool_count == 0 || self.tool_count as usize > MAX_TOOLS {
            return Err(format!(
                "tool_count {} out of range [1, {}]",
                self.tool_count, MAX_TOOLS
            ));
        }
        let hotends = self.hotends();
        if hotends != 1 && hotends != self.tool_count {
            return Err(format!(
                "hotend_count {} must be 1 or equal to tool_count {}",
                hotends, self.tool_count
            ));
        }
        if !self.hotend_offsets.is_empty() && self.hotend_offsets.len() != hotends as usize {
            return Err(format!(
                "hotend_offsets has {} entries, expected {}",
                self.hotend_offsets.len(),
                hotends
            ));
        }
        if !(self.travel_feedrate_mm_s > 0.0) {
            return Err(format!(
                "travel_feedrate_mm_s must be positive, got {}",
                self.travel_feedrate_mm_s
            ));
        }
        if !(self.z_lift >= 0.0) {
            return Err(format!("z_lift must be non-negative, got {}", self.z_lift));
        }
        if self.switch_paths.len() > self.tool_count as usize {
            return Err(format!(
                "switch_paths has {} entries for {} tools",
                self.switch_paths.len(),
                self.tool_count
            ));
        }
        if let Some(i) = self
            .switch_paths
            .iter()
            .position(|p| p.len() > MAX_SWITCH_MOVES)
        {
            return Err(format!(
                "switch path of tool {i} exceeds {MAX_SWITCH_MOVES} waypoints"
            ));
        }
        self.validate_drivers()?;
        self.validate_limits()?;
        self.validate_actuator()
    }

    fn validate_drivers(&self) -> Result<(), String> {
        if self.drivers.len() > MAX_DRIVERS {
            return Err(format!(
                "{} drivers configured, maximum is {}",
                self.drivers.len(),
                MAX_DRIVERS
            ));
        }
        if let Some(d) = self.drivers.iter().find(|d| d.hotend >= self.tool_count) {
            return Err(format!(
                "driver feeds hotend {} but only {} tools are configured",
                d.hotend, self.tool_count
            ));
        }
        let count = self.driver_count() as usize;
        let ext = &self.extrusion;
        if ext.flow_percentage.len() > count
            || ext.density_percentage.len() > count
            || ext.filament_size.len() > count
        {
            return Err(format!("extrusion lists exceed {count} extruder drivers"));
        }
        if ext.filament_size.iter().any(|&d| d < 0.0) {
            return Err("filament_size must be non-negative".to_string());
        }
        Ok(())
    }

    fn validate_limits(&self) -> Result<(), String> {
        let f = self.machine.max_feedrate_mm_s;
        if !(f.x > 0.0 && f.y > 0.0 && f.z > 0.0) {
            return Err("machine.max_feedrate_mm_s must be positive on every axis".to_string());
        }
        Ok(())
    }

    fn validate_actuator(&self) -> Result<(), String> {
        let tools = self.tool_count;
        let hotends = self.hotends();
        match &self.actuator {
            ActuatorConfig::Null => Ok(()),
            ActuatorConfig::Solenoid { pins } => {
                if hotends < 2 {
                    return Err("solenoid actuator needs more than one hotend".to_string());
                }
                if pins.is_empty() || pins.len() > tools as usize {
                    return Err(format!(
                        "solenoid pins count {} out of range [1, {}]",
                        pins.len(),
                        tools
                    ));
                }
                Ok(())
            }
            ActuatorConfig::Relay {
                preset, topology, ..
            } => {
                if hotends != 1 {
                    return Err("relay actuator drives a single shared hotend".to_string());
                }
                if preset.is_some() == topology.is_some() {
                    return Err("relay actuator needs exactly one of preset or topology".to_string());
                }
                if let Some(p) = preset {
                    if tools > p.max_tools() {
                        return Err(format!(
                            "relay preset {p:?} routes at most {} tools",
                            p.max_tools()
                        ));
                    }
                }
                match self.relay_topology() {
                    Some(t) => t.validate(tools, self.driver_count()),
                    None => Err("relay topology missing".to_string()),
                }
            }
            ActuatorConfig::Servo { layout, angles, .. } => {
                match layout {
                    ServoLayout::Dondolo if hotends != 2 => {
                        return Err("dondolo servo needs exactly two hotends".to_string());
                    }
                    ServoLayout::Selector if hotends != 1 => {
                        return Err("selector servo drives a single shared hotend".to_string());
                    }
                    _ => {}
                }
                if angles.len() < tools as usize {
                    return Err(format!(
                        "servo angles cover {} of {} tools",
                        angles.len(),
                        tools
                    ));
                }
                Ok(())
            }
            ActuatorConfig::DualCarriage { .. } => {
                if tools != 2 || hotends != 2 {
                    return Err("dual carriage needs exactly two tools and two hotends".to_string());
                }
                Ok(())
            }
            ActuatorConfig::Mixing {
                steppers,
                virtual_tools,
            } => {
                if *steppers == 0 || *steppers as usize > MAX_MIXING_STEPPERS {
                    return Err(format!(
                        "mixing steppers {} out of range [1, {}]",
                        steppers, MAX_MIXING_STEPPERS
                    ));
                }
                if virtual_tools.is_empty() || virtual_tools.len() > MAX_VIRTUAL_TOOLS {
                    return Err(format!(
                        "mixing virtual tool count {} out of range [1, {}]",
                        virtual_tools.len(),
                        MAX_VIRTUAL_TOOLS
                    ));
                }
                if let Some(i) = virtual_tools
                    .iter()
                    .position(|row| row.len() != *steppers as usize)
                {
                    return Err(format!(
                        "mixing virtual tool {i} must have {steppers} factors"
                    ));
                }
                Ok(())
            }
            ActuatorConfig::PhysicalPath => {
                if hotends < 2 {
                    return Err("physical path actuator needs more than one hotend".to_string());
                }
                if self.switch_paths.len() != tools as usize {
                    return Err(format!(
                        "physical path actuator needs a switch path for each of {tools} tools"
                    ));
                }
                Ok(())
            }
        }
    }
}
