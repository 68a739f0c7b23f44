//! Simulated machine implementing every tool-change collaborator trait.
//!
//! `SimulatedMachine` composes the motion and I/O simulators with leveling
//! and run-state flags, and records each collaborator call as a
//! [`MachineEvent`] so callers can assert on exact command sequences.

use super::io::{EStepperMask, IoSimulator};
use super::motion::MotionSimulator;
use mtc_common::hal::gateway::{LevelingGateway, MotionGateway, RunState, ToolIo};
use mtc_common::tool::config::MachineLimits;
use mtc_common::tool::types::{Axis, DriverIndex, Xyz};
use tracing::debug;

/// One recorded collaborator call.
#[derive(Debug, Clone, PartialEq)]
pub enum MachineEvent {
    /// Move queued without waiting.
    BufferLine {
        /// Target position.
        target: Xyz,
        /// Feedrate [mm/s].
        feedrate: f64,
    },
    /// Move executed to completion.
    Move {
        /// Target position.
        target: Xyz,
        /// Feedrate [mm/s].
        feedrate: f64,
    },
    /// Motion queue drained.
    Synchronize,
    /// Full homing cycle.
    HomeAll,
    /// Logical position overwritten without motion.
    SetPosition(Xyz),
    /// Planner told the logical position.
    SyncPlanPosition,
    /// Leveling compensation toggled.
    SetLeveling(bool),
    /// Digital output written.
    WritePin {
        /// Pin number.
        pin: u8,
        /// Level.
        high: bool,
    },
    /// Relay select line written.
    WriteRelay {
        /// Line index.
        line: u8,
        /// Level.
        high: bool,
    },
    /// Servo commanded.
    MoveServo {
        /// Servo index.
        servo_id: u8,
        /// Angle [deg].
        angle: i16,
    },
    /// Settle delay.
    Delay(u64),
    /// All extruder steppers disabled.
    DisableESteppers,
    /// One extruder stepper enabled.
    EnableEStepper(DriverIndex),
}

impl MachineEvent {
    /// Event produces physical motion.
    pub fn is_motion(&self) -> bool {
        matches!(
            self,
            Self::BufferLine { .. } | Self::Move { .. } | Self::HomeAll
        )
    }

    /// Event touches tool I/O.
    pub fn is_tool_io(&self) -> bool {
        matches!(
            self,
            Self::WritePin { .. }
                | Self::WriteRelay { .. }
                | Self::MoveServo { .. }
                | Self::DisableESteppers
                | Self::EnableEStepper(_)
        )
    }
}

/// Software stand-in for the motion, leveling, run-state and I/O subsystems.
#[derive(Debug, Clone)]
pub struct SimulatedMachine {
    /// Motion simulator
    motion: MotionSimulator,
    /// Output simulator
    io: IoSimulator,
    /// Leveling compensation enabled
    leveling: bool,
    /// Printer running
    running: bool,
    /// Collaborator call log
    events: Vec<MachineEvent>,
}

impl SimulatedMachine {
    /// Create a simulated machine: at the origin, homed, running, leveling
    /// off.
    pub fn new(limits: &MachineLimits) -> Self {
        let mut motion = MotionSimulator::new(limits);
        motion.set_homed(true);
        Self {
            motion,
            io: IoSimulator::new(),
            leveling: false,
            running: true,
            events: Vec::new(),
        }
    }

    /// Start at `position` (logical and destination).
    pub fn with_position(mut self, position: Xyz) -> Self {
        self.motion.set_current(position);
        self.motion.set_destination(position);
        self
    }

    /// Set the homed flag.
    pub fn with_homed(mut self, homed: bool) -> Self {
        self.motion.set_homed(homed);
        self
    }

    /// Set the initial leveling state.
    pub fn with_leveling(mut self, enabled: bool) -> Self {
        self.leveling = enabled;
        self
    }

    /// Set the initial run-state.
    pub fn with_running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    /// Set the initial feedrate register.
    pub fn with_feedrate(mut self, feedrate_mm_s: f64) -> Self {
        self.motion.set_feedrate(feedrate_mm_s);
        self
    }

    /// Position homing moves to.
    pub fn with_home_position(mut self, position: Xyz) -> Self {
        self.motion.set_home_position(position);
        self
    }

    /// Change the run-state.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Queue a move on behalf of another subsystem (e.g. a print job).
    pub fn queue_external_move(&mut self, target: Xyz, feedrate_mm_s: f64) {
        self.motion.buffer_line(target, feedrate_mm_s);
    }

    // ─── Inspection ─────────────────────────────────────────────────

    /// Every collaborator call so far.
    pub fn events(&self) -> &[MachineEvent] {
        &self.events
    }

    /// Forget the call log.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Number of recorded events matching `pred`.
    pub fn count_events(&self, pred: impl Fn(&MachineEvent) -> bool) -> usize {
        self.events.iter().filter(|&e| pred(e)).count()
    }

    /// Recorded move targets (queued and blocking), in order.
    pub fn move_targets(&self) -> Vec<Xyz> {
        self.events
            .iter()
            .filter_map(|e| match e {
                MachineEvent::BufferLine { target, .. } | MachineEvent::Move { target, .. } => {
                    Some(*target)
                }
                _ => None,
            })
            .collect()
    }

    /// Moves waiting in the queue.
    pub fn queue_depth(&self) -> usize {
        self.motion.queue_depth()
    }

    /// Output simulator state.
    pub fn io(&self) -> &IoSimulator {
        &self.io
    }

    /// Currently enabled extruder steppers.
    pub fn e_steppers(&self) -> EStepperMask {
        self.io.e_steppers()
    }

    fn record(&mut self, event: MachineEvent) {
        self.events.push(event);
    }
}

impl MotionGateway for SimulatedMachine {
    fn current_position(&self) -> Xyz {
        self.motion.current()
    }

    fn set_current_position(&mut self, position: Xyz) {
        self.motion.set_current(position);
        self.record(MachineEvent::SetPosition(position));
    }

    fn destination(&self) -> Xyz {
        self.motion.destination()
    }

    fn set_destination(&mut self, position: Xyz) {
        self.motion.set_destination(position);
    }

    fn feedrate(&self) -> f64 {
        self.motion.feedrate()
    }

    fn set_feedrate(&mut self, feedrate_mm_s: f64) {
        self.motion.set_feedrate(feedrate_mm_s);
    }

    fn max_feedrate(&self, axis: Axis) -> f64 {
        self.motion.max_feedrate(axis)
    }

    fn soft_endstop_max(&self) -> Xyz {
        self.motion.soft_max()
    }

    fn buffer_line(&mut self, target: Xyz, feedrate_mm_s: f64) {
        self.motion.buffer_line(target, feedrate_mm_s);
        self.record(MachineEvent::BufferLine {
            target,
            feedrate: feedrate_mm_s,
        });
    }

    fn do_blocking_move_to(&mut self, target: Xyz, feedrate_mm_s: f64) {
        self.motion.blocking_move(target, feedrate_mm_s);
        self.record(MachineEvent::Move {
            target,
            feedrate: feedrate_mm_s,
        });
    }

    fn synchronize(&mut self) {
        self.motion.synchronize();
        self.record(MachineEvent::Synchronize);
    }

    fn axis_unhomed(&self) -> bool {
        !self.motion.homed()
    }

    fn home_all(&mut self) {
        self.motion.home_all();
        self.record(MachineEvent::HomeAll);
    }

    fn sync_plan_position(&mut self) {
        self.record(MachineEvent::SyncPlanPosition);
    }
}

impl LevelingGateway for SimulatedMachine {
    fn leveling_active(&self) -> bool {
        self.leveling
    }

    fn set_leveling_enabled(&mut self, enabled: bool) {
        debug!("Leveling {}", if enabled { "on" } else { "off" });
        self.leveling = enabled;
        self.record(MachineEvent::SetLeveling(enabled));
    }
}

impl RunState for SimulatedMachine {
    fn is_running(&self) -> bool {
        self.running
    }
}

impl ToolIo for SimulatedMachine {
    fn write_pin(&mut self, pin: u8, high: bool) {
        self.io.write_pin(pin, high);
        self.record(MachineEvent::WritePin { pin, high });
    }

    fn write_relay(&mut self, line: u8, high: bool) {
        self.io.write_relay(line, high);
        self.record(MachineEvent::WriteRelay { line, high });
    }

    fn move_servo(&mut self, servo_id: u8, angle: i16) {
        self.io.move_servo(servo_id, angle);
        self.record(MachineEvent::MoveServo { servo_id, angle });
    }

    fn safe_delay(&mut self, ms: u64) {
        self.io.delay(ms);
        self.record(MachineEvent::Delay(ms));
    }

    fn disable_e_steppers(&mut self) {
        self.io.disable_e_steppers();
        self.record(MachineEvent::DisableESteppers);
    }

    fn enable_e_stepper(&mut self, driver: DriverIndex) {
        self.io.enable_e_stepper(driver);
        self.record(MachineEvent::EnableEStepper(driver));
    }
}
