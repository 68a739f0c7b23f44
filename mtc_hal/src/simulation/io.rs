//! Tool I/O simulator.
//!
//! The `IoSimulator` tracks:
//! - Digital output levels (solenoids)
//! - Relay select-line levels
//! - Last commanded servo angle per servo
//! - Extruder stepper enable mask
//! - Accumulated settle delay

use bitflags::bitflags;
use mtc_common::tool::types::DriverIndex;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

bitflags! {
    /// Enabled extruder stepper drivers. Bit `n` is driver `n`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EStepperMask: u8 {
        /// Driver E0.
        const E0 = 0x01;
        /// Driver E1.
        const E1 = 0x02;
        /// Driver E2.
        const E2 = 0x04;
        /// Driver E3.
        const E3 = 0x08;
        /// Driver E4.
        const E4 = 0x10;
        /// Driver E5.
        const E5 = 0x20;
        /// Driver E6.
        const E6 = 0x40;
        /// Driver E7.
        const E7 = 0x80;
    }
}

impl EStepperMask {
    /// Mask with only `driver` set. Out-of-range drivers yield an empty mask.
    pub fn driver(driver: DriverIndex) -> Self {
        if driver < 8 {
            Self::from_bits_retain(1 << driver)
        } else {
            Self::empty()
        }
    }
}

/// Simulated digital, relay and servo outputs.
#[derive(Debug, Clone, Default)]
pub struct IoSimulator {
    /// Digital output levels by pin
    pins: BTreeMap<u8, bool>,
    /// Relay select-line levels by line
    relay_lines: BTreeMap<u8, bool>,
    /// Last angle commanded per servo
    servo_angles: BTreeMap<u8, i16>,
    /// Enabled extruder steppers
    e_steppers: EStepperMask,
    /// Total time spent in settle delays [ms]
    delay_ms: u64,
}

impl IoSimulator {
    /// Create an I/O simulator with all outputs low and steppers disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drive a digital output.
    pub fn write_pin(&mut self, pin: u8, high: bool) {
        trace!("DO pin {} -> {}", pin, if high { "HIGH" } else { "LOW" });
        self.pins.insert(pin, high);
    }

    /// Drive a relay select line.
    pub fn write_relay(&mut self, line: u8, high: bool) {
        debug!("Relay line {} -> {}", line, if high { "HIGH" } else { "LOW" });
        self.relay_lines.insert(line, high);
    }

    /// Command a servo angle.
    pub fn move_servo(&mut self, servo_id: u8, angle: i16) {
        debug!("Servo {} -> {} deg", servo_id, angle);
        self.servo_angles.insert(servo_id, angle);
    }

    /// Accumulate a settle delay.
    pub fn delay(&mut self, ms: u64) {
        trace!("Delay {} ms", ms);
        self.delay_ms = self.delay_ms.saturating_add(ms);
    }

    /// Disable every extruder stepper.
    pub fn disable_e_steppers(&mut self) {
        self.e_steppers = EStepperMask::empty();
    }

    /// Enable one extruder stepper.
    pub fn enable_e_stepper(&mut self, driver: DriverIndex) {
        let bit = EStepperMask::driver(driver);
        if bit.is_empty() {
            warn!("Ignoring enable for unknown driver E{}", driver);
            return;
        }
        self.e_steppers |= bit;
    }

    /// Level of a digital output (unwritten pins read low).
    pub fn pin(&self, pin: u8) -> bool {
        self.pins.get(&pin).copied().unwrap_or(false)
    }

    /// Pins currently driven high, ascending.
    pub fn high_pins(&self) -> Vec<u8> {
        self.pins
            .iter()
            .filter_map(|(&pin, &high)| high.then_some(pin))
            .collect()
    }

    /// Level of a relay select line (unwritten lines read low).
    pub fn relay_line(&self, line: u8) -> bool {
        self.relay_lines.get(&line).copied().unwrap_or(false)
    }

    /// Last commanded angle of a servo.
    pub fn servo_angle(&self, servo_id: u8) -> Option<i16> {
        self.servo_angles.get(&servo_id).copied()
    }

    /// Currently enabled extruder steppers.
    pub fn e_steppers(&self) -> EStepperMask {
        self.e_steppers
    }

    /// Total settle delay so far [ms].
    pub fn total_delay_ms(&self) -> u64 {
        self.delay_ms
    }
}
