//! Wipe-park position memory.
//!
//! Parking moves the head next to the alternate tool's first switch-path
//! waypoint (the wipe station) and remembers where it came from. Unparking
//! returns XY at the waypoint feedrate, then Z at the maximum Z feedrate.
//!
//! `parked_near_wipe` is true only between a park that actually moved and
//! its matching unpark.

use mtc_common::hal::gateway::MotionGateway;
use mtc_common::tool::offsets::OffsetModel;
use mtc_common::tool::switch_path::ToolSwitchPath;
use mtc_common::tool::types::{Axis, ToolIndex, Xyz};
use serde::Serialize;
use tracing::debug;

/// Park snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WipeParkState {
    /// Position to return to on unpark.
    pub return_position: Xyz,
    /// Head is parked at the wipe station.
    pub parked_near_wipe: bool,
}

/// Tool whose first waypoint marks the wipe station: 1 while tool 0 is
/// active, otherwise 0.
#[inline]
pub fn alternate_tool(active: ToolIndex) -> ToolIndex {
    if active == 0 { 1 } else { 0 }
}

/// Snapshot the position, drain, and move to the wipe station.
///
/// Returns whether the head parked. No move happens when the alternate
/// tool's first waypoint is missing or inert. A head already parked keeps
/// its original return position.
pub fn park_to_wipe<M>(
    state: &mut WipeParkState,
    paths: &ToolSwitchPath,
    offsets: &OffsetModel,
    active: ToolIndex,
    machine: &mut M,
) -> bool
where
    M: MotionGateway + ?Sized,
{
    if state.parked_near_wipe {
        debug!("Already parked near wipe");
        return false;
    }
    state.return_position = machine.current_position();
    machine.synchronize();

    let alternate = alternate_tool(active);
    let Some(wp) = paths.first(alternate).filter(|w| w.is_active()) else {
        debug!("No wipe station for T{}", alternate);
        return false;
    };
    let x = offsets.home_to_tool(active, Axis::X, wp.x);
    let y = offsets.home_to_tool(active, Axis::Y, wp.y);
    debug!("Parking near wipe at ({:.3}, {:.3})", x, y);
    machine.do_blocking_move_to_xy(x, y, wp.feedrate);
    state.parked_near_wipe = true;
    true
}

/// Return from the wipe station to the snapshot.
///
/// Returns whether the head unparked. A no-op unless parked.
pub fn unpark_from_wipe<M>(
    state: &mut WipeParkState,
    paths: &ToolSwitchPath,
    active: ToolIndex,
    machine: &mut M,
) -> bool
where
    M: MotionGateway + ?Sized,
{
    if !state.parked_near_wipe {
        return false;
    }
    machine.synchronize();

    let alternate = alternate_tool(active);
    let Some(wp) = paths.first(alternate).filter(|w| w.is_active()) else {
        return false;
    };
    let back = state.return_position;
    debug!(
        "Unparking from wipe to ({:.3}, {:.3}, {:.3})",
        back.x, back.y, back.z
    );
    machine.do_blocking_move_to_xy(back.x, back.y, wp.feedrate);
    let fz = machine.max_feedrate(Axis::Z);
    machine.do_blocking_move_to_z(back.z, fz);
    state.parked_near_wipe = false;
    true
}
