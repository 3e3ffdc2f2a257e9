#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Raycasting line-of-sight and field-of-view queries over a room grid.
//!
//! Angles are measured in radians in grid space: `0` faces east (`+x`) and
//! `π/2` faces south (`+z`). Walls always block sight; furniture blocks when
//! [`VisionConfig::furniture_blocks`] is set. Cells outside the grid block
//! every ray.

use std::f32::consts::{PI, TAU};

use office_spatial_core::{BlockReason, CellType, GridCell, GridLine, GridPos, VisionConfig};
use office_spatial_world::RoomGrid;

/// Outcome of a single visibility query.
#[derive(Clone, Debug, PartialEq)]
pub struct Sight {
    /// Whether the target can be seen.
    pub visible: bool,
    /// Straight-line distance between observer and target in grid units.
    pub distance: f32,
    /// Why the target cannot be seen, when it cannot.
    pub blocked_by: Option<BlockReason>,
    /// Cell that interrupted the ray, when an obstacle did.
    pub blocked_at: Option<GridPos>,
}

impl Sight {
    fn visible(distance: f32) -> Self {
        Self {
            visible: true,
            distance,
            blocked_by: None,
            blocked_at: None,
        }
    }

    fn blocked(distance: f32, reason: BlockReason, at: Option<GridPos>) -> Self {
        Self {
            visible: false,
            distance,
            blocked_by: Some(reason),
            blocked_at: at,
        }
    }
}

/// Prop anchor found inside an observer's field of view.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibleProp {
    /// Identifier of the prop.
    pub prop_id: String,
    /// Anchor cell of the prop footprint.
    pub anchor: GridPos,
    /// Cell type of the prop.
    pub kind: CellType,
    /// Distance from the observer to the anchor in grid units.
    pub distance: f32,
}

/// Vision queries bound to one room grid and one immutable configuration.
#[derive(Clone, Copy, Debug)]
pub struct VisionSystem<'grid> {
    grid: &'grid RoomGrid,
    config: VisionConfig,
}

impl<'grid> VisionSystem<'grid> {
    /// Creates a vision system over the provided grid.
    #[must_use]
    pub fn new(grid: &'grid RoomGrid, config: VisionConfig) -> Self {
        Self { grid, config }
    }

    /// Configuration the system was created with.
    #[must_use]
    pub const fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Determines whether `to` is visible from `from`.
    ///
    /// Checks run cheapest first: grid bounds, range, field of view (only
    /// when `facing` is given and the field of view is narrower than 360°),
    /// then a Bresenham raycast that ignores both endpoints.
    #[must_use]
    pub fn can_see(&self, from: GridPos, to: GridPos, facing: Option<f32>) -> Sight {
        let distance = from.euclidean_distance(to);

        if !self.grid.contains(from) || !self.grid.contains(to) {
            return Sight::blocked(distance, BlockReason::OutOfBounds, None);
        }

        if distance > self.config.range {
            return Sight::blocked(distance, BlockReason::OutOfRange, None);
        }

        if let Some(facing) = facing {
            if !self.config.is_omnidirectional() && from != to {
                let bearing = bearing(from, to);
                if angle_difference(bearing, facing).abs() > self.config.half_fov_radians() {
                    return Sight::blocked(distance, BlockReason::OutsideFov, None);
                }
            }
        }

        let mut ray = GridLine::new(signed(from), signed(to)).peekable();
        let _ = ray.next();
        while let Some((x, z)) = ray.next() {
            if ray.peek().is_none() {
                break;
            }
            let Some(pos) = self.in_grid(x, z) else {
                return Sight::blocked(distance, BlockReason::OutOfBounds, None);
            };
            let Some(cell) = self.grid.cell(pos) else {
                return Sight::blocked(distance, BlockReason::OutOfBounds, None);
            };
            if self.blocks(cell) {
                let reason = BlockReason::Obstacle {
                    kind: cell.kind(),
                    prop_id: cell.prop_id().map(str::to_owned),
                };
                return Sight::blocked(distance, reason, Some(pos));
            }
        }

        Sight::visible(distance)
    }

    /// Cells an observer at `from` facing `facing` can plausibly perceive.
    ///
    /// Casts [`VisionConfig::ray_count`] evenly spaced rays across the field
    /// of view out to the configured range. Each ray stops at, and includes,
    /// the first blocking cell. The result is the deduplicated union of all
    /// touched cells in first-touched order, starting with the observer's own
    /// cell.
    #[must_use]
    pub fn visible_cells(&self, from: GridPos, facing: f32) -> Vec<GridPos> {
        if !self.grid.contains(from) {
            return Vec::new();
        }

        let (columns, rows) = self.grid.dimensions();
        let cell_count = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        let mut seen = vec![false; cell_count];
        let mut visible = Vec::new();
        // Rays never need to reach past the far corner of the grid.
        let diagonal = (columns as f32).hypot(rows as f32);
        let range = self.config.range.max(0.0).min(diagonal);

        for angle in self.ray_angles(facing) {
            let end = (
                (from.x() as f32 + angle.cos() * range).round() as i64,
                (from.z() as f32 + angle.sin() * range).round() as i64,
            );
            for (x, z) in GridLine::new(signed(from), end) {
                let Some(pos) = self.in_grid(x, z) else {
                    break;
                };
                if from.euclidean_distance(pos) > range {
                    break;
                }
                let Some(cell) = self.grid.cell(pos) else {
                    break;
                };
                let index = (pos.z() * columns + pos.x()) as usize;
                if !seen[index] {
                    seen[index] = true;
                    visible.push(pos);
                }
                if pos != from && self.blocks(cell) {
                    break;
                }
            }
        }

        tracing::trace!(%from, facing, cells = visible.len(), "computed visible cells");
        visible
    }

    /// Props whose anchor cell is visible, nearest first.
    ///
    /// Span-child cells are skipped so each multi-cell prop is reported once.
    #[must_use]
    pub fn visible_props(&self, from: GridPos, facing: f32) -> Vec<VisibleProp> {
        let mut props: Vec<VisibleProp> = self
            .visible_cells(from, facing)
            .into_iter()
            .filter_map(|pos| {
                let cell = self.grid.cell(pos)?;
                if !cell.is_prop_anchor() {
                    return None;
                }
                Some(VisibleProp {
                    prop_id: cell.prop_id()?.to_owned(),
                    anchor: pos,
                    kind: cell.kind(),
                    distance: from.euclidean_distance(pos),
                })
            })
            .collect();
        props.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.anchor.row_major_key().cmp(&b.anchor.row_major_key()))
        });
        props
    }

    fn ray_angles(&self, facing: f32) -> Vec<f32> {
        let count = self.config.ray_count.max(1);
        if self.config.is_omnidirectional() {
            let step = TAU / count as f32;
            return (0..count).map(|i| facing + step * i as f32).collect();
        }
        if count == 1 {
            return vec![facing];
        }
        let fov = self.config.fov_degrees.max(0.0).to_radians();
        let start = facing - fov / 2.0;
        let step = fov / (count - 1) as f32;
        (0..count).map(|i| start + step * i as f32).collect()
    }

    fn blocks(&self, cell: &GridCell) -> bool {
        match cell.kind() {
            CellType::Wall => true,
            CellType::Furniture => self.config.furniture_blocks,
            CellType::Empty | CellType::Door | CellType::Decoration | CellType::Interaction => {
                false
            }
        }
    }

    fn in_grid(&self, x: i64, z: i64) -> Option<GridPos> {
        let pos = GridPos::new(u32::try_from(x).ok()?, u32::try_from(z).ok()?);
        self.grid.contains(pos).then_some(pos)
    }
}

/// Bearing from `from` to `to` in radians, `0` facing east.
#[must_use]
pub fn bearing(from: GridPos, to: GridPos) -> f32 {
    let dx = to.x() as f32 - from.x() as f32;
    let dz = to.z() as f32 - from.z() as f32;
    dz.atan2(dx)
}

/// Signed difference `a − b` normalised to `[−π, π]`.
#[must_use]
pub fn angle_difference(a: f32, b: f32) -> f32 {
    let mut diff = (a - b) % TAU;
    if diff > PI {
        diff -= TAU;
    } else if diff < -PI {
        diff += TAU;
    }
    diff
}

fn signed(pos: GridPos) -> (i64, i64) {
    (i64::from(pos.x()), i64::from(pos.z()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use office_spatial_world::PropPlacement;
    use std::f32::consts::FRAC_PI_2;

    fn open_room() -> RoomGrid {
        RoomGrid::bordered(12, 12, 1.0)
    }

    #[test]
    fn angle_difference_wraps_into_half_turns() {
        assert!((angle_difference(0.1, TAU - 0.1) - 0.2).abs() < 1e-5);
        assert!((angle_difference(-3.0, 3.0) - (TAU - 6.0)).abs() < 1e-5);
        assert!(angle_difference(PI, 0.0).abs() <= PI + 1e-6);
    }

    #[test]
    fn bearing_follows_grid_axes() {
        let origin = GridPos::new(5, 5);
        assert!(bearing(origin, GridPos::new(8, 5)).abs() < 1e-6);
        assert!((bearing(origin, GridPos::new(5, 9)) - FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn adjacent_and_self_targets_are_visible() {
        let grid = open_room();
        let vision = VisionSystem::new(&grid, VisionConfig::default());
        assert!(vision.can_see(GridPos::new(3, 3), GridPos::new(3, 3), Some(0.0)).visible);
        assert!(vision.can_see(GridPos::new(3, 3), GridPos::new(4, 4), None).visible);
    }

    #[test]
    fn furniture_blocking_follows_configuration() {
        let mut grid = open_room();
        grid.place_prop(&PropPlacement::new(
            "bookshelf",
            GridPos::new(5, 3),
            CellType::Furniture,
        ));
        let from = GridPos::new(2, 3);
        let to = GridPos::new(8, 3);

        let blocking = VisionSystem::new(&grid, VisionConfig::default());
        let sight = blocking.can_see(from, to, None);
        assert!(!sight.visible);
        assert_eq!(sight.blocked_at, Some(GridPos::new(5, 3)));
        assert_eq!(
            sight.blocked_by.map(|reason| reason.to_string()),
            Some("bookshelf".to_owned())
        );

        let config = VisionConfig {
            furniture_blocks: false,
            ..VisionConfig::default()
        };
        let see_through = VisionSystem::new(&grid, config);
        assert!(see_through.can_see(from, to, None).visible);
    }

    #[test]
    fn blocking_endpoints_do_not_hide_themselves() {
        let mut grid = open_room();
        grid.place_prop(&PropPlacement::new(
            "server-rack",
            GridPos::new(6, 6),
            CellType::Furniture,
        ));
        let vision = VisionSystem::new(&grid, VisionConfig::default());
        assert!(vision.can_see(GridPos::new(3, 6), GridPos::new(6, 6), None).visible);
    }
}
