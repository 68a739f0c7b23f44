//! Tool-change orchestration.
//!
//! [`ToolChanger`] owns the tool context, the selected actuator backend and
//! the machine collaborator. Every change goes through [`ToolChanger::change`],
//! which picks one of three flows:
//!
//! - **Blend**: mixing backends copy a blend row. No motion.
//! - **Shared nozzle**: single-hotend machines engage the actuator and
//!   commit. No offsets, homing or lift.
//! - **Physical**: the full sequence below.
//!
//! ## Physical Sequence
//! 1. Save feedrate, select the travel (or override) feedrate.
//! 2. Same tool without `force`: drain, restore feedrate, done.
//! 3. Home if any axis is unhomed and moves are allowed.
//! 4. Snapshot the destination.
//! 5. Save and disable leveling.
//! 6. `engage()` the actuator.
//! 7. Apply the offset delta, then `after_offsets()`.
//! 8. Restore leveling, sync the planner position.
//! 9. Lift and return to the destination (gated by run-state and move
//!    permission).
//! 10. Drain, `settle()`, restore feedrate, commit the new active tool.
//!
//! Leveling is restored and the feedrate put back on every exit after
//! step 5, including actuator errors.

use mtc_common::hal::gateway::Machine;
use mtc_common::tool::config::{DualCarriageMode, ToolchangeConfig};
use mtc_common::tool::extrusion::ExtrusionModel;
use mtc_common::tool::offsets::OffsetModel;
use mtc_common::tool::types::{ActiveToolState, Axis, DriverIndex, ToolIndex, Xyz};
use mtc_common::tool::ToolError;
use tracing::{debug, error, info, warn};

use crate::actuator::{self, ActuatorKind, DualCarriageActuator, ReturnPath, SwitchStep, ToolActuator};
use crate::context::ToolContext;
use crate::fiber::{FiberCutter, FiberState};
use crate::wipe::{self, WipeParkState};

// ─── Request / Outcome ──────────────────────────────────────────────

/// Parameters of one tool change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeRequest {
    pub target: ToolIndex,
    /// Travel feedrate for the change [mm/s]. Ignored unless positive.
    pub feedrate_override: Option<f64>,
    /// Return moves are allowed.
    pub allow_move: bool,
    /// Run the full sequence even when `target` is already active.
    pub force: bool,
    /// Also run non-switch waypoints of the target's switch path.
    pub clean_path: bool,
}

impl ChangeRequest {
    /// Plain change to `target`.
    pub fn to(target: ToolIndex) -> Self {
        Self {
            target,
            feedrate_override: None,
            allow_move: true,
            force: false,
            clean_path: false,
        }
    }

    pub fn with_feedrate(mut self, feedrate_mm_s: f64) -> Self {
        self.feedrate_override = Some(feedrate_mm_s);
        self
    }

    pub fn no_move(mut self) -> Self {
        self.allow_move = false;
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn clean(mut self) -> Self {
        self.clean_path = true;
        self
    }
}

/// What a change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// A different tool is now active.
    Switched {
        from: ToolIndex,
        to: ToolIndex,
        driver: DriverIndex,
    },
    /// Target was already active; nothing was actuated.
    Unchanged { tool: ToolIndex },
    /// Blend row of a virtual tool selected.
    Blended { virtual_tool: ToolIndex },
}

// ─── Orchestrator ───────────────────────────────────────────────────

/// Tool-change orchestrator over a machine collaborator `M`.
#[derive(Debug)]
pub struct ToolChanger<M: Machine> {
    machine: M,
    ctx: ToolContext,
    actuator: Box<dyn ToolActuator>,
    fiber_cutter: Option<FiberCutter>,
    travel_feedrate: f64,
    z_lift: f64,
    delta_clip_start_height: Option<f64>,
}

impl<M: Machine> ToolChanger<M> {
    /// Build from configuration. The configuration is expected to have
    /// passed [`ToolchangeConfig::validate`].
    ///
    /// # Errors
    ///
    /// Capacity errors from the derived models or the actuator backend.
    pub fn new(config: &ToolchangeConfig, machine: M) -> Result<Self, ToolError> {
        let ctx = ToolContext::new(config)?;
        let actuator = actuator::build(config)?;
        info!(
            "Tool changer ready: {} tools, {} hotends, {} actuator",
            ctx.tool_count(),
            ctx.hotend_count(),
            actuator.kind()
        );
        Ok(Self {
            machine,
            ctx,
            actuator,
            fiber_cutter: config.fiber_cutter.map(FiberCutter::from),
            travel_feedrate: config.travel_feedrate_mm_s,
            z_lift: config.z_lift,
            delta_clip_start_height: config.machine.delta_clip_start_height,
        })
    }

    /// Select `request.target`.
    ///
    /// # Errors
    ///
    /// [`ToolError::InvalidToolIndex`] for an out-of-range target (state is
    /// left untouched), or whatever the actuator reports.
    pub fn change(&mut self, request: ChangeRequest) -> Result<ChangeOutcome, ToolError> {
        if let Some(count) = self.actuator.virtual_tool_count() {
            return self.select_virtual_tool(request.target, count);
        }

        let tool_count = self.ctx.tool_count();
        if request.target >= tool_count {
            error!("T{} invalid extruder", request.target);
            return Err(ToolError::InvalidToolIndex {
                index: request.target,
                limit: tool_count,
            });
        }

        if self.ctx.hotend_count() <= 1 {
            self.change_shared_nozzle(request)
        } else {
            self.change_physical(request)
        }
    }

    fn select_virtual_tool(
        &mut self,
        virtual_tool: ToolIndex,
        count: u8,
    ) -> Result<ChangeOutcome, ToolError> {
        let Some(row) = self.actuator.blend(virtual_tool) else {
            error!("T{} invalid extruder", virtual_tool);
            return Err(ToolError::InvalidToolIndex {
                index: virtual_tool,
                limit: count,
            });
        };
        self.ctx.set_mix_factors(row);
        info!("Active color: {}", virtual_tool);
        Ok(ChangeOutcome::Blended { virtual_tool })
    }

    fn change_shared_nozzle(&mut self, request: ChangeRequest) -> Result<ChangeOutcome, ToolError> {
        let from = self.ctx.active_extruder();
        let mut step = SwitchStep {
            from,
            to: request.target,
            destination: self.machine.current_position(),
            allow_move: false,
            offsets: self.ctx.offsets(),
        };
        let driver = self.actuator.engage(&mut self.machine, &mut step)?;
        self.ctx.commit(request.target, driver);
        info!("Active extruder: {}", request.target);
        Ok(ChangeOutcome::Switched {
            from,
            to: request.target,
            driver,
        })
    }

    fn change_physical(&mut self, request: ChangeRequest) -> Result<ChangeOutcome, ToolError> {
        let from = self.ctx.active_extruder();
        let target = request.target;

        let prior_feedrate = self.machine.feedrate();
        let feedrate = request
            .feedrate_override
            .filter(|&f| f > 0.0)
            .unwrap_or(self.travel_feedrate);
        self.machine.set_feedrate(feedrate);

        if target == from && !request.force {
            self.machine.synchronize();
            self.machine.set_feedrate(prior_feedrate);
            info!("Active extruder: {}", target);
            return Ok(ChangeOutcome::Unchanged { tool: target });
        }

        if request.allow_move && self.machine.axis_unhomed() {
            info!("Homing before toolchange");
            self.machine.home_all();
        }

        self.machine.set_destination_to_current();
        let destination = self.machine.destination();

        let leveling_was_active = self.machine.leveling_active();
        self.machine.set_leveling_enabled(false);

        let mut step = SwitchStep {
            from,
            to: target,
            destination,
            allow_move: request.allow_move,
            offsets: self.ctx.offsets(),
        };
        let driver = match self.actuator.engage(&mut self.machine, &mut step) {
            Ok(driver) => driver,
            Err(e) => {
                error!("T{} switch failed: {}", target, e);
                self.machine.set_leveling_enabled(leveling_was_active);
                self.machine.set_feedrate(prior_feedrate);
                return Err(e);
            }
        };

        let delta = step.offsets.delta(from, target);
        let shifted = self
            .actuator
            .offset_application()
            .apply(self.machine.current_position(), delta);
        debug!(
            "Offset delta T{}->T{}: ({:.3}, {:.3}, {:.3})",
            from, target, delta.x, delta.y, delta.z
        );
        self.machine.set_current_position(shifted);
        self.actuator.after_offsets(&mut self.machine, &mut step);
        let allow_move = step.allow_move;

        self.machine.set_leveling_enabled(leveling_was_active);
        self.machine.sync_plan_position();

        let raises_z = self.actuator.raises_z();
        if allow_move && self.machine.is_running() && self.safe_to_move() {
            if !raises_z {
                self.lift(destination);
            }
            match self.actuator.return_path() {
                ReturnPath::SwitchPath => {
                    self.run_switch_path(target, request.clean_path);
                    self.return_after_switch_path(target, destination);
                }
                ReturnPath::Direct => {
                    let fr = self.machine.feedrate();
                    self.machine.do_blocking_move_to(destination, fr);
                }
            }
        } else if raises_z {
            let fz = self.machine.max_feedrate(Axis::Z);
            self.machine.do_blocking_move_to_z(destination.z, fz);
        }

        self.machine.synchronize();
        self.actuator.settle(&mut self.machine, target);
        self.machine.set_feedrate(prior_feedrate);
        self.ctx.commit(target, driver);
        info!("Active extruder: {}", target);
        Ok(ChangeOutcome::Switched {
            from,
            to: target,
            driver,
        })
    }

    // ─── Motion Helpers ─────────────────────────────────────────────

    /// Delta machines refuse moves that start near the clip height.
    fn safe_to_move(&self) -> bool {
        let z = self.machine.current_position().z;
        self.delta_clip_start_height
            .is_none_or(|clip| z < clip - 1.0)
    }

    /// Raise Z above both the current and destination heights.
    fn lift(&mut self, destination: Xyz) {
        let soft_max_z = self.machine.soft_endstop_max().z;
        let lift = if destination.z + self.z_lift > soft_max_z {
            0.0
        } else {
            self.z_lift
        };
        let cur = self.machine.current_position();
        let fz = self.machine.max_feedrate(Axis::Z);
        self.machine
            .buffer_line(cur.with_z(destination.z.max(cur.z) + lift), fz);
    }

    /// Walk the target tool's waypoints at the current height.
    fn run_switch_path(&mut self, target: ToolIndex, clean_path: bool) {
        let switch_offset = self.ctx.switch_offset();
        let offsets = self.ctx.offsets();
        for wp in self.ctx.switch_path().path(target) {
            if !wp.is_active() || !(wp.switch_move || clean_path) {
                continue;
            }
            let (x, y) = wp.target_xy(switch_offset);
            let x = offsets.home_to_tool(target, Axis::X, x);
            let y = offsets.home_to_tool(target, Axis::Y, y);
            debug!("Switch waypoint ({:.3}, {:.3}) F{:.1}", x, y, wp.feedrate);
            self.machine.do_blocking_move_to_xy(x, y, wp.feedrate);
        }
    }

    fn return_after_switch_path(&mut self, target: ToolIndex, destination: Xyz) {
        if self.ctx.wipe().parked_near_wipe {
            let (state, paths, _) = self.ctx.wipe_parts();
            if wipe::unpark_from_wipe(state, paths, target, &mut self.machine) {
                return;
            }
            warn!("Wipe unpark unavailable for T{}, returning directly", target);
        }
        let fr = self.machine.feedrate();
        self.machine
            .do_blocking_move_to_xy(destination.x, destination.y, fr);
        let fz = self.machine.max_feedrate(Axis::Z);
        self.machine.do_blocking_move_to_z(destination.z, fz);
    }

    // ─── Auxiliary Operations ───────────────────────────────────────

    /// Park the head at the wipe station. Returns whether it moved.
    pub fn park_to_wipe(&mut self) -> bool {
        let active = self.ctx.active_extruder();
        let (state, paths, offsets) = self.ctx.wipe_parts();
        wipe::park_to_wipe(state, paths, offsets, active, &mut self.machine)
    }

    /// Return from the wipe station. Returns whether it moved.
    pub fn unpark_from_wipe(&mut self) -> bool {
        let active = self.ctx.active_extruder();
        let (state, paths, _) = self.ctx.wipe_parts();
        wipe::unpark_from_wipe(state, paths, active, &mut self.machine)
    }

    /// # Errors
    ///
    /// [`ToolError::UnsupportedOperation`] when no cutter is configured.
    pub fn cut_fiber(&mut self) -> Result<(), ToolError> {
        let cutter = self
            .fiber_cutter
            .ok_or(ToolError::UnsupportedOperation("no fiber cutter configured"))?;
        cutter.cut(self.ctx.fiber_mut(), &mut self.machine);
        Ok(())
    }

    /// # Errors
    ///
    /// [`ToolError::UnsupportedOperation`] unless the backend is a dual
    /// carriage.
    pub fn set_carriage_mode(&mut self, mode: DualCarriageMode) -> Result<(), ToolError> {
        let dxc = self
            .actuator
            .as_dual_carriage_mut()
            .ok_or(ToolError::UnsupportedOperation("carriage mode needs a dual carriage"))?;
        dxc.set_mode(mode);
        Ok(())
    }

    /// Restore start-up tool state (external reset).
    pub fn reset(&mut self) {
        self.ctx.reset();
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &ActiveToolState {
        self.ctx.state()
    }

    #[inline]
    pub fn offsets(&self) -> &OffsetModel {
        self.ctx.offsets()
    }

    pub fn offsets_mut(&mut self) -> &mut OffsetModel {
        self.ctx.offsets_mut()
    }

    #[inline]
    pub fn extrusion(&self) -> &ExtrusionModel {
        self.ctx.extrusion()
    }

    pub fn extrusion_mut(&mut self) -> &mut ExtrusionModel {
        self.ctx.extrusion_mut()
    }

    #[inline]
    pub fn fiber(&self) -> &FiberState {
        self.ctx.fiber()
    }

    pub fn fiber_mut(&mut self) -> &mut FiberState {
        self.ctx.fiber_mut()
    }

    #[inline]
    pub fn wipe(&self) -> &WipeParkState {
        self.ctx.wipe()
    }

    #[inline]
    pub fn mix_factors(&self) -> &[f64] {
        self.ctx.mix_factors()
    }

    #[inline]
    pub fn context(&self) -> &ToolContext {
        &self.ctx
    }

    #[inline]
    pub fn actuator_kind(&self) -> ActuatorKind {
        self.actuator.kind()
    }

    pub fn dual_carriage(&self) -> Option<&DualCarriageActuator> {
        self.actuator.as_dual_carriage()
    }

    #[inline]
    pub fn machine(&self) -> &M {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut M {
        &mut self.machine
    }

    pub fn into_machine(self) -> M {
        self.machine
    }
}
