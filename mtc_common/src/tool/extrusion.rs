//! Per-extruder extrusion scaling.
//!
//! `e_factor = flow_percentage × 0.01 × volumetric_multiplier`, where the
//! volumetric term is 1.0 unless volumetric extrusion is enabled. Every
//! setter refreshes the derived factors before returning so readers never
//! see a stale value.

use heapless::Vec;
use std::f64::consts::PI;

use super::error::ToolError;
use super::types::ToolIndex;
use crate::consts::{DEFAULT_NOMINAL_FILAMENT_DIA, MAX_DRIVERS};

/// Cross-section area of a circle with radius `r`.
#[inline]
fn circle_area(r: f64) -> f64 {
    PI * r * r
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ExtruderEntry {
    flow_percentage: i16,
    density_percentage: i16,
    filament_size: f64,
    volumetric_multiplier: f64,
    e_factor: f64,
}

impl Default for ExtruderEntry {
    fn default() -> Self {
        Self {
            flow_percentage: 100,
            density_percentage: 100,
            filament_size: DEFAULT_NOMINAL_FILAMENT_DIA,
            volumetric_multiplier: 1.0,
            e_factor: 1.0,
        }
    }
}

/// Flow, density and filament-diameter state for every extruder driver.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrusionModel {
    volumetric_enabled: bool,
    entries: Vec<ExtruderEntry, MAX_DRIVERS>,
}

impl ExtrusionModel {
    /// `count` extruders at 100 % flow with nominal filament.
    pub fn new(count: u8, volumetric_enabled: bool) -> Self {
        let mut entries = Vec::new();
        for _ in 0..(count as usize).min(MAX_DRIVERS) {
            let _ = entries.push(ExtruderEntry::default());
        }
        let mut model = Self {
            volumetric_enabled,
            entries,
        };
        model.calculate_volumetric_multipliers();
        model
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_mut(&mut self, e: ToolIndex) -> Result<&mut ExtruderEntry, ToolError> {
        let limit = self.entries.len() as u8;
        self.entries
            .get_mut(e as usize)
            .ok_or(ToolError::InvalidToolIndex { index: e, limit })
    }

    fn refresh_e_factor(&mut self, e: usize) {
        let volumetric = self.volumetric_enabled;
        if let Some(entry) = self.entries.get_mut(e) {
            let multiplier = if volumetric {
                entry.volumetric_multiplier
            } else {
                1.0
            };
            entry.e_factor = entry.flow_percentage as f64 * 0.01 * multiplier;
        }
    }

    fn volumetric_multiplier_for(&self, diameter: f64) -> f64 {
        if !self.volumetric_enabled || diameter == 0.0 {
            return 1.0;
        }
        1.0 / circle_area(diameter * 0.5)
    }

    /// Recompute every volumetric multiplier from the filament sizes and
    /// refresh all extrusion factors.
    pub fn calculate_volumetric_multipliers(&mut self) {
        for e in 0..self.entries.len() {
            let diameter = self.entries[e].filament_size;
            self.entries[e].volumetric_multiplier = self.volumetric_multiplier_for(diameter);
            self.refresh_e_factor(e);
        }
    }

    /// Toggle volumetric extrusion. Multipliers are recomputed.
    pub fn set_volumetric_enabled(&mut self, enabled: bool) {
        self.volumetric_enabled = enabled;
        self.calculate_volumetric_multipliers();
    }

    #[inline]
    pub fn volumetric_enabled(&self) -> bool {
        self.volumetric_enabled
    }

    /// Set the flow percentage of one extruder.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidToolIndex`] for an unknown extruder.
    pub fn set_flow_percentage(&mut self, e: ToolIndex, percentage: i16) -> Result<(), ToolError> {
        self.entry_mut(e)?.flow_percentage = percentage;
        self.refresh_e_factor(e as usize);
        Ok(())
    }

    /// Set the density percentage of one extruder.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidToolIndex`] for an unknown extruder.
    pub fn set_density_percentage(
        &mut self,
        e: ToolIndex,
        percentage: i16,
    ) -> Result<(), ToolError> {
        self.entry_mut(e)?.density_percentage = percentage;
        Ok(())
    }

    /// Set one filament diameter. Any extruder left with a zero diameter
    /// afterwards falls back to the nominal diameter.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidToolIndex`] for an unknown extruder.
    pub fn set_filament_size(&mut self, e: ToolIndex, diameter: f64) -> Result<(), ToolError> {
        self.entry_mut(e)?.filament_size = diameter;
        for entry in self.entries.iter_mut() {
            if entry.filament_size == 0.0 {
                entry.filament_size = DEFAULT_NOMINAL_FILAMENT_DIA;
            }
        }
        self.calculate_volumetric_multipliers();
        Ok(())
    }

    /// Combined extrusion factor of `e` (1.0 for unknown extruders).
    #[inline]
    pub fn e_factor(&self, e: ToolIndex) -> f64 {
        self.entries.get(e as usize).map_or(1.0, |x| x.e_factor)
    }

    #[inline]
    pub fn flow_percentage(&self, e: ToolIndex) -> Option<i16> {
        self.entries.get(e as usize).map(|x| x.flow_percentage)
    }

    #[inline]
    pub fn density_percentage(&self, e: ToolIndex) -> Option<i16> {
        self.entries.get(e as usize).map(|x| x.density_percentage)
    }

    #[inline]
    pub fn filament_size(&self, e: ToolIndex) -> Option<f64> {
        self.entries.get(e as usize).map(|x| x.filament_size)
    }

    #[inline]
    pub fn volumetric_multiplier(&self, e: ToolIndex) -> Option<f64> {
        self.entries.get(e as usize).map(|x| x.volumetric_multiplier)
    }

    /// Cross-section area of nominal filament [mm²].
    #[inline]
    pub fn volumetric_area_nominal(&self) -> f64 {
        circle_area(DEFAULT_NOMINAL_FILAMENT_DIA * 0.5)
    }
}
