//! Motion system simulator.
//!
//! Moves complete instantly: a blocking move sets the logical position and
//! leaves the queue empty, a buffered line bumps the queue depth until the
//! next `synchronize()`.

use mtc_common::tool::config::MachineLimits;
use mtc_common::tool::types::{Axis, Xyz};
use tracing::{debug, info, trace};

/// Simulated planner and stepper queue.
#[derive(Debug, Clone)]
pub struct MotionSimulator {
    /// Logical position
    current: Xyz,
    /// Destination register
    destination: Xyz,
    /// Feedrate register [mm/s]
    feedrate: f64,
    /// Position reached by homing
    home_position: Xyz,
    /// Per-axis maximum feedrate [mm/s]
    max_feedrate: Xyz,
    /// Upper travel bound [mm]
    soft_max: Xyz,
    /// Moves queued but not yet drained
    queue_depth: usize,
    /// All axes homed
    homed: bool,
}

impl MotionSimulator {
    /// Create a simulator at the origin, unhomed, with an empty queue.
    pub fn new(limits: &MachineLimits) -> Self {
        Self {
            current: Xyz::ZERO,
            destination: Xyz::ZERO,
            feedrate: 0.0,
            home_position: Xyz::ZERO,
            max_feedrate: limits.max_feedrate_mm_s,
            soft_max: limits.soft_endstop_max,
            queue_depth: 0,
            homed: false,
        }
    }

    /// Logical position.
    pub fn current(&self) -> Xyz {
        self.current
    }

    /// Overwrite the logical position.
    pub fn set_current(&mut self, position: Xyz) {
        self.current = position;
    }

    /// Destination register.
    pub fn destination(&self) -> Xyz {
        self.destination
    }

    /// Overwrite the destination register.
    pub fn set_destination(&mut self, position: Xyz) {
        self.destination = position;
    }

    /// Feedrate register [mm/s].
    pub fn feedrate(&self) -> f64 {
        self.feedrate
    }

    /// Overwrite the feedrate register.
    pub fn set_feedrate(&mut self, feedrate_mm_s: f64) {
        self.feedrate = feedrate_mm_s;
    }

    /// Maximum feedrate of `axis`.
    pub fn max_feedrate(&self, axis: Axis) -> f64 {
        self.max_feedrate[axis]
    }

    /// Upper travel bound.
    pub fn soft_max(&self) -> Xyz {
        self.soft_max
    }

    /// Position homing moves to.
    pub fn set_home_position(&mut self, position: Xyz) {
        self.home_position = position;
    }

    /// Queue a move.
    pub fn buffer_line(&mut self, target: Xyz, feedrate_mm_s: f64) {
        trace!(
            "Buffer line to ({:.3}, {:.3}, {:.3}) @ {:.1} mm/s",
            target.x, target.y, target.z, feedrate_mm_s
        );
        self.current = target;
        self.queue_depth += 1;
    }

    /// Execute a move and drain the queue.
    pub fn blocking_move(&mut self, target: Xyz, feedrate_mm_s: f64) {
        debug!(
            "Move to ({:.3}, {:.3}, {:.3}) @ {:.1} mm/s",
            target.x, target.y, target.z, feedrate_mm_s
        );
        self.current = target;
        self.queue_depth = 0;
    }

    /// Drain the queue.
    pub fn synchronize(&mut self) {
        self.queue_depth = 0;
    }

    /// Moves waiting in the queue.
    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    /// All axes homed.
    pub fn homed(&self) -> bool {
        self.homed
    }

    /// Mark the axes homed or unhomed without moving.
    pub fn set_homed(&mut self, homed: bool) {
        self.homed = homed;
    }

    /// Home every axis.
    pub fn home_all(&mut self) {
        info!("Homing all axes");
        self.queue_depth = 0;
        self.current = self.home_position;
        self.homed = true;
    }
}
