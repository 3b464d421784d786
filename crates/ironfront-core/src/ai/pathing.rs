//! Heuristic steering: direct approach and short waypoint paths.
//!
//! There is no graph search here. A path is at most two points long: the
//! target itself when the straight segment is clear, otherwise a detour point
//! beside the midpoint followed by the target.

use glam::{IVec2, Vec2};
use rubble::TileGrid;

use crate::entity::Direction;

/// Perpendicular detour distances tried, in cells.
const DETOUR_CELLS: [f32; 6] = [1.0, -1.0, 2.0, -2.0, 3.0, -3.0];

/// Direction for a single step from `from` towards `to`.
///
/// Closes the axis with the smaller offset first, unless that axis is already
/// within `tolerance`, in which case the other axis is closed. Returns `None`
/// when both axes are within tolerance.
///
/// ```
/// use glam::IVec2;
/// use ironfront_core::ai::pathing::approach;
/// use ironfront_core::entity::Direction;
///
/// // x is the smaller offset, so line up horizontally first.
/// assert_eq!(approach(IVec2::ZERO, IVec2::new(10, 50), 4), Some(Direction::Right));
/// // x already lined up: move on y.
/// assert_eq!(approach(IVec2::ZERO, IVec2::new(3, -50), 4), Some(Direction::Up));
/// assert_eq!(approach(IVec2::ZERO, IVec2::new(2, 2), 4), None);
/// ```
#[must_use]
pub fn approach(from: IVec2, to: IVec2, tolerance: i32) -> Option<Direction> {
    let offset = to - from;
    let (ax, ay) = (offset.x.abs(), offset.y.abs());
    if ax <= tolerance && ay <= tolerance {
        return None;
    }
    let horizontal = if ax <= ay { ax > tolerance } else { ay <= tolerance };
    if horizontal {
        Some(if offset.x < 0 { Direction::Left } else { Direction::Right })
    } else {
        Some(if offset.y < 0 { Direction::Up } else { Direction::Down })
    }
}

/// Plans a waypoint path from `from` to `to`, both tank centres.
///
/// Returns `[to]` when the straight segment is clear, `[detour, to]` for the
/// first perpendicular detour whose two legs are clear, or `[midpoint, to]`
/// when nothing is.
#[must_use]
pub fn plan_path(grid: &TileGrid, from: IVec2, to: IVec2) -> Vec<IVec2> {
    let step = (grid.cell_size() / 4).max(1);
    if grid.segment_clear(from, to, step) {
        return vec![to];
    }

    let a = from.as_vec2();
    let b = to.as_vec2();
    let mid = (a + b) * 0.5;
    let along = b - a;
    let normal = Vec2::new(-along.y, along.x).normalize_or_zero();
    #[allow(clippy::cast_precision_loss)]
    let cell = grid.cell_size() as f32;

    for k in DETOUR_CELLS {
        let detour = round(mid + normal * (k * cell));
        if grid.segment_clear(from, detour, step) && grid.segment_clear(detour, to, step) {
            return vec![detour, to];
        }
    }
    vec![round(mid), to]
}

#[allow(clippy::cast_possible_truncation)]
fn round(p: Vec2) -> IVec2 {
    IVec2::new(p.x.round() as i32, p.y.round() as i32)
}
