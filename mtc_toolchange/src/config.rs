//! TOML configuration loader with validation.
//!
//! One file carries three sections:
//!
//! ```toml
//! [shared]
//! service_name = "mtc-toolchange"
//! log_level = "info"
//!
//! [toolchange]
//! tool_count = 2
//!
//! [toolchange.actuator]
//! kind = "solenoid"
//! pins = [40, 41]
//!
//! [simulation]
//! position = { x = 100.0, y = 100.0, z = 5.0 }
//! ```
//!
//! `[simulation]` only seeds the simulated machine the binary drives.

use std::path::Path;

use mtc_common::config::{ConfigError, ConfigLoader, SharedConfig};
use mtc_common::tool::config::ToolchangeConfig;
use mtc_common::tool::types::Xyz;
use mtc_hal::SimulatedMachine;
use serde::Deserialize;
use tracing::debug;

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Complete validated configuration, ready for runtime use.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoadedConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    pub toolchange: ToolchangeConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Initial state of the simulated machine.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub position: Xyz,
    #[serde(default = "default_true")]
    pub homed: bool,
    #[serde(default)]
    pub leveling: bool,
    #[serde(default = "default_true")]
    pub running: bool,
    /// Feedrate register at start-up [mm/s].
    #[serde(default = "default_feedrate")]
    pub feedrate: f64,
}

fn default_true() -> bool {
    true
}

fn default_feedrate() -> f64 {
    50.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            position: Xyz::ZERO,
            homed: true,
            leveling: false,
            running: true,
            feedrate: default_feedrate(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.feedrate.is_nan() || self.feedrate <= 0.0 {
            return Err(format!(
                "simulation feedrate must be positive, got {}",
                self.feedrate
            ));
        }
        Ok(())
    }
}

impl LoadedConfig {
    /// Simulated machine seeded from `[simulation]` and the configured
    /// motion limits.
    pub fn simulated_machine(&self) -> SimulatedMachine {
        let sim = &self.simulation;
        SimulatedMachine::new(&self.toolchange.machine)
            .with_position(sim.position)
            .with_homed(sim.homed)
            .with_leveling(sim.leveling)
            .with_running(sim.running)
            .with_feedrate(sim.feedrate)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.toolchange
            .validate()
            .map_err(ConfigError::ValidationError)?;
        self.simulation
            .validate()
            .map_err(ConfigError::ValidationError)?;
        Ok(())
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    debug!("Loading config from {}", path.display());
    let config = LoadedConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(toml: &str) -> Result<LoadedConfig, ConfigError> {
    let config = LoadedConfig::parse(toml)?;
    config.validate()?;
    Ok(config)
}
