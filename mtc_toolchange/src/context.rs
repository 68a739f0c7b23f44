//! Owned tool-change state.
//!
//! `ToolContext` gathers everything the orchestrator mutates: the active
//! tool record, offsets, extrusion factors, switch paths, fiber and
//! wipe-park state, and the current blend. Other subsystems read it through
//! shared references between operations.

use heapless::Vec;
use mtc_common::consts::MAX_MIXING_STEPPERS;
use mtc_common::tool::config::{ActuatorConfig, ToolchangeConfig};
use mtc_common::tool::drivers::DriverMap;
use mtc_common::tool::extrusion::ExtrusionModel;
use mtc_common::tool::offsets::OffsetModel;
use mtc_common::tool::switch_path::{SwitchOffset, ToolSwitchPath};
use mtc_common::tool::types::{ActiveToolState, DriverIndex, ToolIndex};
use mtc_common::tool::ToolError;
use tracing::info;

use crate::fiber::FiberState;
use crate::wipe::WipeParkState;

/// Per-stepper blend ratios of the selected virtual tool.
pub type MixFactors = Vec<f64, MAX_MIXING_STEPPERS>;

/// Values restored by [`ToolContext::reset`].
#[derive(Debug, Clone)]
struct Defaults {
    offsets: OffsetModel,
    extrusion: ExtrusionModel,
    mix_factors: MixFactors,
}

/// Process-wide tool state, owned by the orchestrator.
#[derive(Debug, Clone)]
pub struct ToolContext {
    tool_count: u8,
    hotend_count: u8,
    state: ActiveToolState,
    offsets: OffsetModel,
    extrusion: ExtrusionModel,
    switch_path: ToolSwitchPath,
    switch_offset: SwitchOffset,
    drivers: DriverMap,
    fiber: FiberState,
    wipe: WipeParkState,
    mix_factors: MixFactors,
    defaults: Defaults,
}

impl ToolContext {
    /// Build from a validated configuration. Tool 0 starts active.
    pub fn new(config: &ToolchangeConfig) -> Result<Self, ToolError> {
        let offsets = config.offset_model()?;
        let extrusion = config.extrusion_model()?;
        let mix_factors = initial_mix(config);
        Ok(Self {
            tool_count: config.tool_count,
            hotend_count: config.hotends(),
            state: ActiveToolState::default(),
            offsets: offsets.clone(),
            extrusion: extrusion.clone(),
            switch_path: config.switch_path()?,
            switch_offset: config.switch_offset,
            drivers: config.driver_map()?,
            fiber: FiberState::default(),
            wipe: WipeParkState::default(),
            mix_factors: mix_factors.clone(),
            defaults: Defaults {
                offsets,
                extrusion,
                mix_factors,
            },
        })
    }

    /// Restore the start-up state: tool 0 active, configured offsets and
    /// extrusion factors, fiber cut, not parked.
    pub fn reset(&mut self) {
        info!("Tool state reset to defaults");
        self.state = ActiveToolState::default();
        self.offsets = self.defaults.offsets.clone();
        self.extrusion = self.defaults.extrusion.clone();
        self.mix_factors = self.defaults.mix_factors.clone();
        self.fiber = FiberState::default();
        self.wipe = WipeParkState::default();
    }

    // ─── Read Access ────────────────────────────────────────────────

    #[inline]
    pub fn tool_count(&self) -> u8 {
        self.tool_count
    }

    #[inline]
    pub fn hotend_count(&self) -> u8 {
        self.hotend_count
    }

    #[inline]
    pub fn state(&self) -> &ActiveToolState {
        &self.state
    }

    #[inline]
    pub fn active_extruder(&self) -> ToolIndex {
        self.state.active_extruder
    }

    #[inline]
    pub fn previous_extruder(&self) -> ToolIndex {
        self.state.previous_extruder
    }

    #[inline]
    pub fn active_driver(&self) -> DriverIndex {
        self.state.active_driver
    }

    #[inline]
    pub fn offsets(&self) -> &OffsetModel {
        &self.offsets
    }

    #[inline]
    pub fn extrusion(&self) -> &ExtrusionModel {
        &self.extrusion
    }

    #[inline]
    pub fn switch_path(&self) -> &ToolSwitchPath {
        &self.switch_path
    }

    #[inline]
    pub fn switch_offset(&self) -> SwitchOffset {
        self.switch_offset
    }

    #[inline]
    pub fn drivers(&self) -> &DriverMap {
        &self.drivers
    }

    #[inline]
    pub fn fiber(&self) -> &FiberState {
        &self.fiber
    }

    #[inline]
    pub fn wipe(&self) -> &WipeParkState {
        &self.wipe
    }

    #[inline]
    pub fn mix_factors(&self) -> &[f64] {
        &self.mix_factors
    }

    // ─── Mutation ───────────────────────────────────────────────────

    /// Calibration hooks for the settings collaborator.
    pub fn offsets_mut(&mut self) -> &mut OffsetModel {
        &mut self.offsets
    }

    pub fn extrusion_mut(&mut self) -> &mut ExtrusionModel {
        &mut self.extrusion
    }

    pub fn fiber_mut(&mut self) -> &mut FiberState {
        &mut self.fiber
    }

    pub(crate) fn commit(&mut self, target: ToolIndex, driver: DriverIndex) {
        self.state.commit(target, driver);
    }

    pub(crate) fn set_mix_factors(&mut self, factors: &[f64]) {
        self.mix_factors.clear();
        for &f in factors.iter().take(MAX_MIXING_STEPPERS) {
            let _ = self.mix_factors.push(f);
        }
    }

    /// Wipe state with the path and offsets it reads.
    pub(crate) fn wipe_parts(&mut self) -> (&mut WipeParkState, &ToolSwitchPath, &OffsetModel) {
        (&mut self.wipe, &self.switch_path, &self.offsets)
    }
}

fn initial_mix(config: &ToolchangeConfig) -> MixFactors {
    let mut mix = MixFactors::new();
    if let ActuatorConfig::Mixing { virtual_tools, .. } = &config.actuator {
        if let Some(row) = virtual_tools.first() {
            for &f in row.iter().take(MAX_MIXING_STEPPERS) {
                let _ = mix.push(f);
            }
        }
    }
    mix
}
