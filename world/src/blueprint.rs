//! Room blueprint documents and their conversion into [`RoomGrid`] values.
//!
//! Blueprints are the JSON documents produced by the room authoring pipeline.
//! They describe grid dimensions, placed props, doors and interaction points.
//! [`Blueprint::validate`] reports structural problems without failing fast,
//! and [`Blueprint::to_grid`] refuses any blueprint that has errors.

use std::{
    collections::{hash_map::Entry, HashMap},
    fs,
    path::{Path, PathBuf},
};

use office_spatial_core::{CellType, GridPos, InteractionKind, Span};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PropPlacement, RoomGrid, DEFAULT_CELL_SIZE};

/// Smallest accepted grid edge, in cells.
pub const MIN_GRID_SIZE: u32 = 4;
/// Largest accepted grid edge, in cells.
pub const MAX_GRID_SIZE: u32 = 40;

/// Prop identifiers shipped with the built-in registry.
///
/// Unknown identifiers only produce a warning because mods may add props.
pub const KNOWN_PROP_IDS: &[&str] = &[
    "desk-with-monitor",
    "desk-with-dual-monitors",
    "desk-small",
    "desk-large",
    "conference-table",
    "round-table",
    "chair",
    "office-chair",
    "couch",
    "couch-l-shaped",
    "bookshelf",
    "bookshelf-tall",
    "filing-cabinet",
    "locker",
    "wardrobe",
    "bed",
    "bunk-bed",
    "workbench",
    "standing-desk",
    "server-rack",
    "monitor-wall",
    "projector-screen",
    "cable-mess",
    "satellite-dish",
    "antenna",
    "router-hub",
    "plant",
    "plant-large",
    "plant-hanging",
    "flower-pot",
    "lamp",
    "lamp-floor",
    "lamp-desk",
    "ceiling-light",
    "rug",
    "rug-large",
    "painting",
    "notice-board",
    "whiteboard",
    "clock",
    "trophy",
    "globe",
    "coffee-machine",
    "water-cooler",
    "vending-machine",
    "fridge",
    "microwave",
    "work-point",
    "work-point-1",
    "work-point-2",
    "work-point-3",
    "work-point-4",
    "coffee-point",
    "sleep-corner",
];

/// Errors produced while loading or converting a blueprint.
#[derive(Debug, Error)]
pub enum BlueprintError {
    /// The blueprint file could not be read.
    #[error("failed to read blueprint {}: {source}", path.display())]
    Io {
        /// Path that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The blueprint document is not valid JSON for the expected schema.
    #[error("failed to parse blueprint: {0}")]
    Parse(#[from] serde_json::Error),
    /// The blueprint parsed but failed structural validation.
    #[error("blueprint failed validation: {}", errors.join("; "))]
    Invalid {
        /// Every validation error that was found.
        errors: Vec<String>,
    },
}

/// Grid point referenced by a blueprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintPoint {
    /// Column of the point.
    pub x: i64,
    /// Row of the point.
    pub z: i64,
}

/// Door entry of a blueprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintDoor {
    /// Column of the door cell.
    pub x: i64,
    /// Row of the door cell.
    pub z: i64,
    /// Direction the door faces, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<String>,
}

/// Single prop placement of a blueprint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlueprintPlacement {
    /// Identifier of the placed prop.
    pub prop_id: String,
    /// Column of the anchor cell.
    pub x: i64,
    /// Row of the anchor cell.
    pub z: i64,
    /// Placement type (`furniture`, `decoration`, `interaction`, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Interaction offered by the prop (`work`, `coffee`, `sleep`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<String>,
    /// Rotation of the prop in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<u16>,
    /// Footprint size; a single cell when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl BlueprintPlacement {
    /// Cell type the placement stamps onto the grid.
    #[must_use]
    pub fn cell_type(&self) -> CellType {
        match self.kind.as_deref() {
            Some("interaction") => CellType::Interaction,
            Some("decoration") => CellType::Decoration,
            Some("door") => CellType::Door,
            Some("wall") => CellType::Wall,
            _ => CellType::Furniture,
        }
    }

    fn span_or_unit(&self) -> Span {
        self.span.unwrap_or(Span::UNIT)
    }
}

/// Interaction points grouped by activity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintInteractionPoints {
    /// Desk work spots.
    pub work: Vec<BlueprintPoint>,
    /// Coffee and break spots.
    pub coffee: Vec<BlueprintPoint>,
    /// Resting spots.
    pub sleep: Vec<BlueprintPoint>,
}

/// Complete room blueprint document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    /// Identifier of the blueprint, if persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name of the room.
    pub name: String,
    /// Number of columns.
    pub grid_width: i64,
    /// Number of rows.
    pub grid_depth: i64,
    /// Side length of a cell in world units.
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
    /// Props placed in the room.
    #[serde(default)]
    pub placements: Vec<BlueprintPlacement>,
    /// Door cells.
    #[serde(default)]
    pub doors: Vec<BlueprintDoor>,
    /// Legacy door field kept for older documents.
    #[serde(default)]
    pub door_positions: Vec<BlueprintDoor>,
    /// Cell guaranteed to be reachable, used as a spawn point.
    pub walkable_center: BlueprintPoint,
    /// Interaction points grouped by activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_points: Option<BlueprintInteractionPoints>,
}

/// Outcome of [`Blueprint::validate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlueprintReport {
    /// Problems that make the blueprint unusable.
    pub errors: Vec<String>,
    /// Informational findings that do not block loading.
    pub warnings: Vec<String>,
}

impl BlueprintReport {
    /// Reports whether no errors were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Blueprint {
    /// Parses a blueprint from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, BlueprintError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a blueprint file.
    pub fn from_path(path: &Path) -> Result<Self, BlueprintError> {
        let json = fs::read_to_string(path).map_err(|source| BlueprintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Serialises the blueprint back into pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, BlueprintError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Walkable centre as a grid coordinate, if it lies inside the grid.
    #[must_use]
    pub fn walkable_center(&self) -> Option<GridPos> {
        self.point_in_grid(self.walkable_center.x, self.walkable_center.z)
    }

    /// Checks the blueprint for structural problems.
    #[must_use]
    pub fn validate(&self) -> BlueprintReport {
        let mut report = BlueprintReport::default();
        let width = self.grid_width;
        let depth = self.grid_depth;
        let size_range = i64::from(MIN_GRID_SIZE)..=i64::from(MAX_GRID_SIZE);

        if !size_range.contains(&width) {
            report.errors.push(format!(
                "gridWidth must be between {MIN_GRID_SIZE} and {MAX_GRID_SIZE}, got {width}"
            ));
        }
        if !size_range.contains(&depth) {
            report.errors.push(format!(
                "gridDepth must be between {MIN_GRID_SIZE} and {MAX_GRID_SIZE}, got {depth}"
            ));
        }

        if self.doors.is_empty() && self.door_positions.is_empty() {
            report
                .errors
                .push("blueprint must have at least one door".to_owned());
        }

        let center = self.walkable_center;
        if center.x < 0 || center.x >= width {
            report.errors.push(format!(
                "walkableCenter.x ({}) out of grid bounds (0-{})",
                center.x,
                width - 1
            ));
        }
        if center.z < 0 || center.z >= depth {
            report.errors.push(format!(
                "walkableCenter.z ({}) out of grid bounds (0-{})",
                center.z,
                depth - 1
            ));
        }

        let mut occupied: HashMap<(i64, i64), &str> = HashMap::new();
        for (index, placement) in self.placements.iter().enumerate() {
            let prop = placement.prop_id.as_str();
            if placement.x < 0 || placement.x >= width || placement.z < 0 || placement.z >= depth {
                report.errors.push(format!(
                    "placement [{index}] propId='{prop}' at ({},{}) is out of grid bounds",
                    placement.x, placement.z
                ));
                continue;
            }

            let span = placement.span_or_unit();
            if placement.x + i64::from(span.w) > width {
                report.errors.push(format!(
                    "placement [{index}] propId='{prop}' span exceeds grid width at x={}, span.w={}",
                    placement.x, span.w
                ));
            }
            if placement.z + i64::from(span.d) > depth {
                report.errors.push(format!(
                    "placement [{index}] propId='{prop}' span exceeds grid depth at z={}, span.d={}",
                    placement.z, span.d
                ));
            }

            if placement.cell_type() != CellType::Interaction {
                for dx in 0..i64::from(span.w) {
                    for dz in 0..i64::from(span.d) {
                        let cell = (placement.x + dx, placement.z + dz);
                        match occupied.entry(cell) {
                            Entry::Occupied(entry) => report.errors.push(format!(
                                "placement [{index}] propId='{prop}' overlaps with '{}' at cell ({},{})",
                                entry.get(),
                                cell.0,
                                cell.1
                            )),
                            Entry::Vacant(entry) => {
                                let _ = entry.insert(prop);
                            }
                        }
                    }
                }
            }

            if !KNOWN_PROP_IDS.contains(&prop) {
                report.warnings.push(format!(
                    "unknown propId '{prop}' in placement [{index}] (may be from a mod)"
                ));
            }

            if let Some(interaction) = placement.interaction_type.as_deref() {
                if interaction.parse::<InteractionKind>().is_err() {
                    report.errors.push(format!(
                        "placement [{index}] has unknown interactionType '{interaction}' (expected work, coffee or sleep)"
                    ));
                }
            }
        }

        for (label, doors) in [("doors", &self.doors), ("doorPositions", &self.door_positions)] {
            for (index, door) in doors.iter().enumerate() {
                let on_edge =
                    door.x == 0 || door.x == width - 1 || door.z == 0 || door.z == depth - 1;
                if !on_edge {
                    report.errors.push(format!(
                        "{label}[{index}] at ({},{}) must be on a wall edge (x=0, x={}, z=0, or z={})",
                        door.x,
                        door.z,
                        width - 1,
                        depth - 1
                    ));
                }
            }
        }

        if !self.doors.is_empty()
            && !self.door_positions.is_empty()
            && self.doors.len() != self.door_positions.len()
        {
            report.warnings.push(format!(
                "doors ({} entries) and doorPositions ({} entries) have different counts; consider using a single canonical field",
                self.doors.len(),
                self.door_positions.len()
            ));
        }

        report
    }

    /// Builds the room grid described by the blueprint.
    ///
    /// The grid receives a perimeter of walls, door cells for the union of
    /// both door lists, every placement and every interaction point.
    pub fn to_grid(&self) -> Result<RoomGrid, BlueprintError> {
        let report = self.validate();
        if !report.is_valid() {
            return Err(BlueprintError::Invalid {
                errors: report.errors,
            });
        }
        for warning in &report.warnings {
            tracing::debug!(blueprint = %self.name, %warning, "blueprint warning");
        }

        let columns = u32::try_from(self.grid_width).unwrap_or(0);
        let rows = u32::try_from(self.grid_depth).unwrap_or(0);
        let mut grid = RoomGrid::bordered(columns, rows, self.cell_size);

        for door in self.doors.iter().chain(&self.door_positions) {
            if let Some(pos) = self.point_in_grid(door.x, door.z) {
                grid.add_door(pos);
            }
        }

        for placement in &self.placements {
            let Some(anchor) = self.point_in_grid(placement.x, placement.z) else {
                continue;
            };
            let mut stamp =
                PropPlacement::new(placement.prop_id.as_str(), anchor, placement.cell_type())
                    .with_span(placement.span_or_unit());
            if let Some(interaction) = placement
                .interaction_type
                .as_deref()
                .and_then(|value| value.parse::<InteractionKind>().ok())
            {
                stamp = stamp.with_interaction(interaction);
            }
            if let Some(rotation) = placement.rotation {
                stamp = stamp.with_rotation(rotation);
            }
            grid.place_prop(&stamp);
        }

        if let Some(points) = &self.interaction_points {
            let groups = [
                (InteractionKind::Work, &points.work),
                (InteractionKind::Coffee, &points.coffee),
                (InteractionKind::Sleep, &points.sleep),
            ];
            for (interaction, group) in groups {
                for point in group {
                    let Some(pos) = self.point_in_grid(point.x, point.z) else {
                        continue;
                    };
                    let marker = format!("{}-point", interaction.name());
                    grid.place_prop(
                        &PropPlacement::new(marker, pos, CellType::Interaction)
                            .with_interaction(interaction),
                    );
                }
            }
        }

        tracing::debug!(
            blueprint = %self.name,
            columns,
            rows,
            placements = self.placements.len(),
            doors = grid.doors().len(),
            "built room grid from blueprint"
        );
        Ok(grid)
    }

    fn point_in_grid(&self, x: i64, z: i64) -> Option<GridPos> {
        if x < 0 || z < 0 || x >= self.grid_width || z >= self.grid_depth {
            return None;
        }
        Some(GridPos::new(u32::try_from(x).ok()?, u32::try_from(z).ok()?))
    }
}

fn default_cell_size() -> f32 {
    DEFAULT_CELL_SIZE
}
