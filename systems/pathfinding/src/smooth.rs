//! Greedy farthest-visible-waypoint path simplification.

use office_spatial_core::{GridLine, GridPos};
use office_spatial_world::WalkabilityMask;

/// Reports whether every rasterized cell between `from` and `to` is walkable.
///
/// Both endpoints are included in the check, so an unwalkable endpoint
/// breaks line of sight.
#[must_use]
pub fn has_line_of_sight(mask: &WalkabilityMask, from: GridPos, to: GridPos) -> bool {
    GridLine::new(signed(from), signed(to)).all(|(x, z)| {
        match (u32::try_from(x), u32::try_from(z)) {
            (Ok(x), Ok(z)) => mask.is_walkable(GridPos::new(x, z)),
            _ => false,
        }
    })
}

/// Simplifies a raw path into fewer waypoints without crossing obstacles.
///
/// Starting from the current waypoint, candidates are scanned from the far
/// end of the path backwards and the first one with clear line of sight is
/// kept. The result is always an ordered subsequence of `raw` that keeps its
/// first and last nodes. Paths of length two or less are returned unchanged.
#[must_use]
pub fn smooth_path(raw: &[GridPos], mask: &WalkabilityMask) -> Vec<GridPos> {
    if raw.len() <= 2 {
        return raw.to_vec();
    }

    let last = raw.len() - 1;
    let mut smoothed = vec![raw[0]];
    let mut current = 0;

    while current < last {
        let mut next = current + 1;
        for candidate in (current + 2..=last).rev() {
            if has_line_of_sight(mask, raw[current], raw[candidate]) {
                next = candidate;
                break;
            }
        }
        smoothed.push(raw[next]);
        current = next;
    }

    tracing::trace!(raw = raw.len(), smoothed = smoothed.len(), "smoothed path");
    smoothed
}

fn signed(pos: GridPos) -> (i64, i64) {
    (i64::from(pos.x()), i64::from(pos.z()))
}
