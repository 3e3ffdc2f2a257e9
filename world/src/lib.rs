#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative room grid model for the office spatial awareness engine.
//!
//! A [`RoomGrid`] is the cell matrix of a single room, indexed `[z][x]`. It is
//! produced once per room (usually from a [`Blueprint`]) and handed by
//! reference to the query systems, which derive their own
//! [`WalkabilityMask`] from it and never mutate it.

use office_spatial_core::{CellType, GridCell, GridPos, InteractionKind, Span};

pub mod blueprint;
mod mask;

pub use blueprint::{Blueprint, BlueprintError, BlueprintReport};
pub use mask::{DoorPolicy, WalkabilityMask, NEIGHBOR_OFFSETS};

/// Side length of a grid cell in world units when a blueprint does not specify one.
pub const DEFAULT_CELL_SIZE: f32 = 0.6;

/// Request to stamp a prop onto a room grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PropPlacement {
    /// Identifier of the prop (for example `desk-with-monitor`).
    pub prop_id: String,
    /// Upper-left cell that anchors the prop footprint.
    pub anchor: GridPos,
    /// Cell type every footprint cell receives.
    pub kind: CellType,
    /// Interaction offered by the prop, if any.
    pub interaction: Option<InteractionKind>,
    /// Rotation of the prop in degrees, if recorded.
    pub rotation: Option<u16>,
    /// Size of the footprint in cells.
    pub span: Span,
}

impl PropPlacement {
    /// Creates a single-cell placement of the given type.
    #[must_use]
    pub fn new(prop_id: impl Into<String>, anchor: GridPos, kind: CellType) -> Self {
        Self {
            prop_id: prop_id.into(),
            anchor,
            kind,
            interaction: None,
            rotation: None,
            span: Span::UNIT,
        }
    }

    /// Replaces the footprint size.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Attaches an interaction to the placement.
    #[must_use]
    pub fn with_interaction(mut self, interaction: InteractionKind) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Attaches a rotation to the placement.
    #[must_use]
    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Rectangular matrix of cells describing one room.
#[derive(Clone, Debug, PartialEq)]
pub struct RoomGrid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<GridCell>,
    doors: Vec<GridPos>,
}

impl RoomGrid {
    /// Creates a grid of open, walkable floor.
    #[must_use]
    pub fn new(columns: u32, rows: u32, cell_size: f32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cell_size,
            cells: vec![GridCell::of(CellType::Empty); capacity],
            doors: Vec::new(),
        }
    }

    /// Creates an open grid surrounded by a one-cell perimeter of walls.
    #[must_use]
    pub fn bordered(columns: u32, rows: u32, cell_size: f32) -> Self {
        let mut grid = Self::new(columns, rows, cell_size);
        for z in 0..rows {
            for x in 0..columns {
                let on_edge = x == 0 || z == 0 || x + 1 == columns || z + 1 == rows;
                if on_edge {
                    grid.set_cell(GridPos::new(x, z), GridCell::of(CellType::Wall));
                }
            }
        }
        grid
    }

    /// Width and depth of the grid in cells.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Side length of a single cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Door cells registered on the grid, in insertion order.
    #[must_use]
    pub fn doors(&self) -> &[GridPos] {
        &self.doors
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x() < self.columns && pos.z() < self.rows
    }

    /// Cell stored at the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<&GridCell> {
        self.index(pos).and_then(|index| self.cells.get(index))
    }

    /// Replaces the cell at the coordinate. Out-of-bounds writes are ignored.
    pub fn set_cell(&mut self, pos: GridPos, cell: GridCell) {
        if let Some(slot) = self.index(pos).and_then(|index| self.cells.get_mut(index)) {
            *slot = cell;
        }
    }

    /// Iterates over every cell with its coordinate in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (GridPos, &GridCell)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().filter_map(move |(index, cell)| {
            let index = u32::try_from(index).ok()?;
            Some((GridPos::new(index % columns, index / columns), cell))
        })
    }

    /// Iterates over prop anchor cells in row-major order.
    pub fn prop_anchors(&self) -> impl Iterator<Item = (GridPos, &GridCell)> + '_ {
        self.cells().filter(|(_, cell)| cell.is_prop_anchor())
    }

    /// Marks a cell as a walkable doorway.
    pub fn add_door(&mut self, pos: GridPos) {
        if !self.contains(pos) {
            return;
        }
        self.set_cell(pos, GridCell::of(CellType::Door));
        if !self.doors.contains(&pos) {
            self.doors.push(pos);
        }
    }

    /// Stamps a prop onto its footprint.
    ///
    /// The anchor cell records the prop's identity, rotation and span; every
    /// other footprint cell records the same type and prop identifier plus a
    /// back-reference to the anchor. Footprints are clipped to the grid.
    /// Interaction markers placed over an occupied cell only attach their
    /// interaction and leave the cell's type untouched.
    pub fn place_prop(&mut self, placement: &PropPlacement) {
        let anchor = placement.anchor;
        for dz in 0..placement.span.d.max(1) {
            for dx in 0..placement.span.w.max(1) {
                let Some(x) = anchor.x().checked_add(dx) else {
                    continue;
                };
                let Some(z) = anchor.z().checked_add(dz) else {
                    continue;
                };
                let pos = GridPos::new(x, z);
                let Some(existing) = self.cell(pos) else {
                    continue;
                };

                if placement.kind == CellType::Interaction && existing.kind() != CellType::Empty {
                    if let Some(interaction) = placement.interaction {
                        let marked = existing.clone().with_interaction(interaction);
                        self.set_cell(pos, marked);
                    }
                    continue;
                }

                let mut cell = GridCell::of(placement.kind).with_prop(placement.prop_id.as_str());
                if let Some(interaction) = placement.interaction {
                    cell = cell.with_interaction(interaction);
                }
                if pos == anchor {
                    cell = cell.with_span(placement.span);
                    if let Some(rotation) = placement.rotation {
                        cell = cell.with_rotation(rotation);
                    }
                } else {
                    cell = cell.with_span_parent(anchor);
                }
                self.set_cell(pos, cell);
            }
        }
    }

    /// Anchor coordinate of the prop occupying the cell.
    ///
    /// Returns the coordinate itself for anchors, the recorded span parent for
    /// other footprint cells and `None` for cells without a prop.
    #[must_use]
    pub fn anchor_of(&self, pos: GridPos) -> Option<GridPos> {
        let cell = self.cell(pos)?;
        match cell.span_parent() {
            Some(anchor) => Some(anchor),
            None if cell.prop_id().is_some() => Some(pos),
            None => None,
        }
    }

    /// World-space centre of a cell, with the room centred on the origin.
    #[must_use]
    pub fn grid_to_world(&self, pos: GridPos) -> (f32, f32) {
        let x = (pos.x() as f32 - self.columns as f32 / 2.0 + 0.5) * self.cell_size;
        let z = (pos.z() as f32 - self.rows as f32 / 2.0 + 0.5) * self.cell_size;
        (x, z)
    }

    /// Cell containing a world-space point, if it lies inside the grid.
    #[must_use]
    pub fn world_to_grid(&self, x: f32, z: f32) -> Option<GridPos> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let column = (x / self.cell_size + self.columns as f32 / 2.0).floor();
        let row = (z / self.cell_size + self.rows as f32 / 2.0).floor();
        if column < 0.0 || row < 0.0 {
            return None;
        }
        let pos = GridPos::new(column as u32, row as u32);
        self.contains(pos).then_some(pos)
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let row = usize::try_from(pos.z()).ok()?;
        let column = usize::try_from(pos.x()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }
}
