#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic grid pathfinding: A* search and line-of-sight path smoothing.
//!
//! [`find_path`] runs A* with 8-directional movement over a
//! [`WalkabilityMask`]. Cardinal steps cost `1`, diagonal steps cost `√2`, and
//! a diagonal step is only allowed when both orthogonal cells beside it are
//! walkable so paths never clip through wall corners. The octile heuristic is
//! admissible and consistent for this cost model, so the first expansion of
//! the goal yields an optimal path.
//!
//! Open-set ties are broken by the lower heuristic (closer to the goal) and
//! then by row-major coordinate order, making results reproducible.
//!
//! [`smooth_path`] simplifies a raw path by keeping only the farthest
//! waypoints that remain mutually visible on the same mask.

use std::{cmp::Ordering, collections::BinaryHeap};

use office_spatial_core::{GridPos, CARDINAL_COST, DIAGONAL_COST};
use office_spatial_world::{WalkabilityMask, NEIGHBOR_OFFSETS};

mod smooth;

pub use smooth::{has_line_of_sight, smooth_path};

/// Finds the cheapest 8-connected path between two cells.
///
/// Returns the path from `start` to `goal` inclusive, a single-element path
/// when both are equal, and `None` when either endpoint is outside the mask
/// or unwalkable, or when the goal cannot be reached.
#[must_use]
pub fn find_path(mask: &WalkabilityMask, start: GridPos, goal: GridPos) -> Option<Vec<GridPos>> {
    if !mask.is_walkable(start) || !mask.is_walkable(goal) {
        tracing::debug!(%start, %goal, "path endpoints are not walkable");
        return None;
    }
    if start == goal {
        return Some(vec![start]);
    }

    let (columns, rows) = mask.dimensions();
    let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).ok()?;
    let start_index = mask.index(start)?;
    let goal_index = mask.index(goal)?;

    let mut g_score = vec![f32::INFINITY; cell_count];
    let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
    let mut closed = vec![false; cell_count];
    let mut open = BinaryHeap::new();
    let mut expanded = 0_usize;

    g_score[start_index] = 0.0;
    let h_start = octile_distance(start, goal);
    open.push(OpenEntry {
        f_score: h_start,
        h_score: h_start,
        pos: start,
        index: start_index,
    });

    while let Some(current) = open.pop() {
        if current.index == goal_index {
            tracing::trace!(%start, %goal, expanded, cost = g_score[goal_index], "path found");
            return Some(reconstruct_path(&came_from, goal_index, columns));
        }

        if closed[current.index] {
            continue;
        }
        closed[current.index] = true;
        expanded += 1;

        let current_g = g_score[current.index];
        for &(dx, dz) in &NEIGHBOR_OFFSETS {
            let Some(neighbor) = current.pos.offset(dx, dz) else {
                continue;
            };
            if !mask.is_walkable(neighbor) {
                continue;
            }

            let diagonal = dx != 0 && dz != 0;
            if diagonal && !corner_is_clear(mask, current.pos, dx, dz) {
                continue;
            }

            let Some(neighbor_index) = mask.index(neighbor) else {
                continue;
            };
            if closed[neighbor_index] {
                continue;
            }

            let step = if diagonal { DIAGONAL_COST } else { CARDINAL_COST };
            let tentative_g = current_g + step;
            if tentative_g < g_score[neighbor_index] {
                g_score[neighbor_index] = tentative_g;
                came_from[neighbor_index] = Some(current.index);
                let h_score = octile_distance(neighbor, goal);
                open.push(OpenEntry {
                    f_score: tentative_g + h_score,
                    h_score,
                    pos: neighbor,
                    index: neighbor_index,
                });
            }
        }
    }

    tracing::debug!(%start, %goal, expanded, "goal unreachable");
    None
}

/// Octile distance between two cells under the cardinal/diagonal cost model.
#[must_use]
pub fn octile_distance(a: GridPos, b: GridPos) -> f32 {
    let dx = a.x().abs_diff(b.x()) as f32;
    let dz = a.z().abs_diff(b.z()) as f32;
    dx.max(dz) + (DIAGONAL_COST - 1.0) * dx.min(dz)
}

/// Summed step cost of a path under the cardinal/diagonal cost model.
///
/// Steps between non-adjacent cells are priced by their octile distance.
#[must_use]
pub fn path_cost(path: &[GridPos]) -> f32 {
    path.windows(2)
        .map(|pair| octile_distance(pair[0], pair[1]))
        .sum()
}

/// Summed straight-line length of the segments of a path.
#[must_use]
pub fn path_length(path: &[GridPos]) -> f32 {
    path.windows(2)
        .map(|pair| pair[0].euclidean_distance(pair[1]))
        .sum()
}

/// Reports whether both orthogonal cells beside a diagonal step are walkable.
#[must_use]
pub fn corner_is_clear(mask: &WalkabilityMask, from: GridPos, dx: i32, dz: i32) -> bool {
    let horizontal = from.offset(dx, 0).map_or(false, |cell| mask.is_walkable(cell));
    let vertical = from.offset(0, dz).map_or(false, |cell| mask.is_walkable(cell));
    horizontal && vertical
}

fn reconstruct_path(came_from: &[Option<usize>], goal_index: usize, columns: u32) -> Vec<GridPos> {
    let mut path = Vec::new();
    let mut cursor = Some(goal_index);
    while let Some(index) = cursor {
        path.push(position_of(index, columns));
        cursor = came_from[index];
    }
    path.reverse();
    path
}

fn position_of(index: usize, columns: u32) -> GridPos {
    let columns = usize::try_from(columns.max(1)).unwrap_or(1);
    let x = u32::try_from(index % columns).unwrap_or(u32::MAX);
    let z = u32::try_from(index / columns).unwrap_or(u32::MAX);
    GridPos::new(x, z)
}

/// Entry in the A* open set (min-heap via reversed ordering).
#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    f_score: f32,
    h_score: f32,
    pos: GridPos,
    index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the smallest f, then the smallest h, then the first cell
        // in row-major order is the greatest element.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.h_score.total_cmp(&self.h_score))
            .then_with(|| other.pos.row_major_key().cmp(&self.pos.row_major_key()))
    }
}
