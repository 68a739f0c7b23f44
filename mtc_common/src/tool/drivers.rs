//! Physical driver → hotend topology for composite (plastic + fiber) heads.
//!
//! Each extruder driver feeds one hotend and carries either plastic or a
//! reinforcing fiber. Several drivers may feed the same hotend.

use heapless::Vec;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::error::ToolError;
use super::types::{DriverIndex, ToolIndex};
use crate::consts::MAX_DRIVERS;

/// One physical extruder driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverEntry {
    /// Hotend this driver feeds.
    pub hotend: ToolIndex,
    /// Driver pushes plastic (false: fiber).
    #[serde(default = "default_plastic")]
    pub plastic: bool,
}

fn default_plastic() -> bool {
    true
}

/// Driver topology lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverMap {
    drivers: Vec<DriverEntry, MAX_DRIVERS>,
}

impl DriverMap {
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] if more than `MAX_DRIVERS` entries.
    pub fn new(drivers: &[DriverEntry]) -> Result<Self, ToolError> {
        let drivers = Vec::from_slice(drivers).map_err(|_| ToolError::InvalidToolIndex {
            index: drivers.len().min(u8::MAX as usize) as ToolIndex,
            limit: MAX_DRIVERS as u8,
        })?;
        Ok(Self { drivers })
    }

    /// One plastic driver per tool, driver `i` feeding hotend `i`.
    pub fn identity(tool_count: u8) -> Self {
        let mut drivers = Vec::new();
        for t in 0..(tool_count as usize).min(MAX_DRIVERS) {
            let _ = drivers.push(DriverEntry {
                hotend: t as ToolIndex,
                plastic: true,
            });
        }
        Self { drivers }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Driver carries plastic. Unknown drivers are not plastic.
    #[inline]
    pub fn driver_is_plastic(&self, driver: DriverIndex) -> bool {
        self.drivers
            .get(driver as usize)
            .is_some_and(|d| d.plastic)
    }

    /// Hotend fed by `driver`.
    #[inline]
    pub fn driver_to_extruder(&self, driver: DriverIndex) -> Option<ToolIndex> {
        self.drivers.get(driver as usize).map(|d| d.hotend)
    }

    /// First plastic driver feeding `tool`.
    ///
    /// # Errors
    ///
    /// [`ToolError::NoPlasticDriver`] (logged) when none is mapped.
    pub fn plastic_driver_of(&self, tool: ToolIndex) -> Result<DriverIndex, ToolError> {
        self.drivers
            .iter()
            .position(|d| d.hotend == tool && d.plastic)
            .map(|i| i as DriverIndex)
            .ok_or_else(|| {
                error!("T{} invalid extruder", tool);
                ToolError::NoPlasticDriver { tool }
            })
    }
}
