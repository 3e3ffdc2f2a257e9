#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Navigation façade combining the room grid, A* search, path smoothing and
//! zone classification into a single query surface.
//!
//! A [`SpatialNavigator`] is built once per room. It derives its own
//! walkability mask from the grid and answers path requests towards points,
//! named props and zones, plus layout descriptions for text consumers.

use std::fmt::Write as _;

use office_spatial_core::{CellType, GridPos, InteractionKind, NavigationConfig, Span, Zone};
use office_spatial_system_pathfinding::{find_path, path_length, smooth_path};
use office_spatial_world::{DoorPolicy, RoomGrid, WalkabilityMask};

mod config;

pub use config::{ConfigError, SpatialConfig, DEFAULT_PROXIMITY_CELL_SIZE};

/// Result of a successful navigation request.
#[derive(Clone, Debug, PartialEq)]
pub struct NavigationPath {
    /// Waypoints to follow, starting at the requester's cell.
    pub waypoints: Vec<GridPos>,
    /// Unsmoothed 8-connected cell path the waypoints were derived from.
    pub raw: Vec<GridPos>,
    /// Cell the path ends at, after any walkable substitution.
    pub target: GridPos,
    /// Summed straight-line length of the waypoint segments in grid units.
    pub distance: f32,
    /// `distance / speed`; infinite for non-positive speeds.
    pub estimated_time: f32,
}

/// Prop anchor described for layout consumers.
#[derive(Clone, Debug, PartialEq)]
pub struct PropInfo {
    /// Identifier of the prop.
    pub prop_id: String,
    /// Anchor cell of the footprint.
    pub anchor: GridPos,
    /// Footprint size.
    pub span: Span,
    /// Cell type of the footprint.
    pub kind: CellType,
    /// Zone containing the anchor.
    pub zone: Zone,
    /// Interaction offered by the prop, if any.
    pub interaction: Option<InteractionKind>,
}

/// Path and layout queries for one room.
#[derive(Clone, Debug)]
pub struct SpatialNavigator<'grid> {
    grid: &'grid RoomGrid,
    mask: WalkabilityMask,
    config: NavigationConfig,
}

impl<'grid> SpatialNavigator<'grid> {
    /// Creates a navigator for the room.
    #[must_use]
    pub fn new(grid: &'grid RoomGrid, config: NavigationConfig) -> Self {
        // Agents never path through doorways inside a room; crossing into
        // another room is handled outside this crate.
        let mask = WalkabilityMask::from_grid(grid, DoorPolicy::Blocked);
        Self { grid, mask, config }
    }

    /// Grid the navigator was built over.
    #[must_use]
    pub const fn grid(&self) -> &'grid RoomGrid {
        self.grid
    }

    /// Walkability mask used for path requests, with doors blocked.
    #[must_use]
    pub const fn mask(&self) -> &WalkabilityMask {
        &self.mask
    }

    /// Configuration the navigator was created with.
    #[must_use]
    pub const fn config(&self) -> &NavigationConfig {
        &self.config
    }

    /// Plans a path from `from` to `to`.
    ///
    /// Both coordinates are clamped into the grid. An unwalkable target is
    /// replaced by the nearest walkable cell. Returns `None` when nothing is
    /// walkable, when no path exists, or when the raw path has more nodes than
    /// [`NavigationConfig::max_path_length`].
    #[must_use]
    pub fn navigate(&self, from: GridPos, to: GridPos, speed: f32) -> Option<NavigationPath> {
        let start = self.mask.clamp(from)?;
        let requested = self.mask.clamp(to)?;
        let target = self.mask.nearest_walkable(requested)?;
        if target != requested {
            tracing::debug!(%requested, %target, "substituted unwalkable navigation target");
        }

        let raw = find_path(&self.mask, start, target)?;
        if raw.len() > self.config.max_path_length {
            tracing::debug!(
                %start,
                %target,
                nodes = raw.len(),
                limit = self.config.max_path_length,
                "path exceeds maximum length"
            );
            return None;
        }

        let waypoints = if self.config.smoothing {
            smooth_path(&raw, &self.mask)
        } else {
            raw.clone()
        };
        let distance = path_length(&waypoints);
        let estimated_time = if speed > 0.0 {
            distance / speed
        } else {
            f32::INFINITY
        };

        Some(NavigationPath {
            waypoints,
            raw,
            target,
            distance,
            estimated_time,
        })
    }

    /// Plans a path to a cell next to the named prop.
    ///
    /// Every cell whose prop identifier contains `prop_id` (case-insensitive)
    /// is a match. The target is the walkable cell among the matches' eight
    /// neighbours that is closest to the requester, never a matching cell
    /// itself. Ties go to the first cell in row-major order.
    #[must_use]
    pub fn navigate_to_prop(
        &self,
        from: GridPos,
        prop_id: &str,
        speed: f32,
    ) -> Option<NavigationPath> {
        let Some(target) = self.stand_point(from, prop_id) else {
            tracing::debug!(%from, prop_id, "no reachable cell beside prop");
            return None;
        };
        self.navigate(from, target, speed)
    }

    /// Plans a path to the representative cell of a zone.
    #[must_use]
    pub fn navigate_to_zone(
        &self,
        from: GridPos,
        zone: Zone,
        speed: f32,
    ) -> Option<NavigationPath> {
        let (columns, rows) = self.grid.dimensions();
        self.navigate(from, zone.representative(columns, rows), speed)
    }

    /// Every prop anchor in row-major order.
    #[must_use]
    pub fn prop_layout(&self) -> Vec<PropInfo> {
        let (columns, rows) = self.grid.dimensions();
        self.grid
            .prop_anchors()
            .filter_map(|(anchor, cell)| {
                Some(PropInfo {
                    prop_id: cell.prop_id()?.to_owned(),
                    anchor,
                    span: cell.span().unwrap_or_default(),
                    kind: cell.kind(),
                    zone: Zone::classify(columns, rows, anchor),
                    interaction: cell.interaction(),
                })
            })
            .collect()
    }

    /// Compact description of the room's contents grouped by zone.
    ///
    /// For example `Lounge: desk, monitor (northwest corner), plant
    /// (southeast corner). Door: south.` Zones are listed in reading order
    /// and repeated props are collapsed into `name x2`.
    #[must_use]
    pub fn layout_summary(&self, room_name: Option<&str>) -> String {
        let layout = self.prop_layout();
        let mut groups = Vec::new();
        for zone in Zone::ALL {
            let mut names: Vec<(&str, usize)> = Vec::new();
            for prop in layout.iter().filter(|prop| prop.zone == zone) {
                match names.iter_mut().find(|(name, _)| *name == prop.prop_id) {
                    Some((_, count)) => *count += 1,
                    None => names.push((prop.prop_id.as_str(), 1)),
                }
            }
            if names.is_empty() {
                continue;
            }
            let listed: Vec<String> = names
                .into_iter()
                .map(|(name, count)| match count {
                    1 => name.to_owned(),
                    _ => format!("{name} x{count}"),
                })
                .collect();
            groups.push(format!("{} ({})", listed.join(", "), zone.label()));
        }

        let mut summary = String::new();
        if let Some(name) = room_name {
            summary.push_str(name);
            summary.push_str(": ");
        }
        if groups.is_empty() {
            summary.push_str("empty room.");
        } else {
            summary.push_str(&groups.join(", "));
            summary.push('.');
        }

        let doors = self.door_directions();
        if !doors.is_empty() {
            let heading = if doors.len() == 1 { "Door" } else { "Doors" };
            let _ = write!(summary, " {heading}: {}.", doors.join(", "));
        }
        summary
    }

    fn door_directions(&self) -> Vec<&'static str> {
        let (columns, rows) = self.grid.dimensions();
        let mut directions = Vec::new();
        for &door in self.grid.doors() {
            let direction = Zone::classify(columns, rows, door).direction();
            if !directions.contains(&direction) {
                directions.push(direction);
            }
        }
        directions
    }

    fn stand_point(&self, from: GridPos, prop_id: &str) -> Option<GridPos> {
        let needle = prop_id.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let matches = |pos: GridPos| {
            self.grid
                .cell(pos)
                .and_then(|cell| cell.prop_id())
                .is_some_and(|id| id.to_lowercase().contains(&needle))
        };

        let mut best: Option<(f32, GridPos)> = None;
        for (pos, _) in self.grid.cells().filter(|(pos, _)| matches(*pos)) {
            for neighbor in self.mask.neighbors(pos) {
                if !self.mask.is_walkable(neighbor) || matches(neighbor) {
                    continue;
                }
                let distance = from.euclidean_distance(neighbor);
                let better = best.map_or(true, |(best_distance, best_pos)| {
                    distance
                        .total_cmp(&best_distance)
                        .then_with(|| neighbor.row_major_key().cmp(&best_pos.row_major_key()))
                        .is_lt()
                });
                if better {
                    best = Some((distance, neighbor));
                }
            }
        }
        best.map(|(_, pos)| pos)
    }
}
