//! Boolean walkability masks derived from room grids.

use std::collections::VecDeque;

use office_spatial_core::{CellType, GridPos};

use crate::RoomGrid;

/// Offsets of the eight neighbours of a cell, cardinals first.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// How door cells are treated when deriving a mask.
///
/// Every consumer picks exactly one policy at the call site that builds its
/// mask. Navigation inside a room uses [`DoorPolicy::Blocked`] so agents stop
/// at the room boundary; other consumers may let agents stand in doorways.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DoorPolicy {
    /// Door cells keep the walkability recorded on the grid.
    Walkable,
    /// Door cells are never walkable.
    Blocked,
}

/// Dense row-major matrix of walkable flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkabilityMask {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl WalkabilityMask {
    /// Creates a mask where every cell shares the provided walkability.
    #[must_use]
    pub fn filled(columns: u32, rows: u32, walkable: bool) -> Self {
        let cell_count = cell_count(columns, rows);
        Self {
            columns,
            rows,
            cells: vec![walkable; cell_count],
        }
    }

    /// Derives a mask from a room grid using the provided door policy.
    #[must_use]
    pub fn from_grid(grid: &RoomGrid, policy: DoorPolicy) -> Self {
        let (columns, rows) = grid.dimensions();
        let cells = grid
            .cells()
            .map(|(_, cell)| match cell.kind() {
                CellType::Door => policy == DoorPolicy::Walkable && cell.walkable(),
                CellType::Empty
                | CellType::Wall
                | CellType::Furniture
                | CellType::Decoration
                | CellType::Interaction => cell.walkable(),
            })
            .collect();
        Self {
            columns,
            rows,
            cells,
        }
    }

    /// Builds a mask from text rows where `#` marks a blocked cell.
    ///
    /// The first row fixes the width; missing characters in shorter rows are
    /// treated as blocked.
    #[must_use]
    pub fn from_ascii(lines: &[&str]) -> Self {
        let columns = lines.first().map_or(0, |line| line.chars().count());
        let rows = lines.len();
        let mut cells = Vec::with_capacity(columns * rows);
        for line in lines {
            let mut chars = line.chars();
            for _ in 0..columns {
                cells.push(chars.next().map_or(false, |c| c != '#'));
            }
        }
        Self {
            columns: u32::try_from(columns).unwrap_or(0),
            rows: u32::try_from(rows).unwrap_or(0),
            cells,
        }
    }

    /// Width and height of the mask in cells.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// Reports whether the coordinate lies inside the mask.
    #[must_use]
    pub const fn contains(&self, pos: GridPos) -> bool {
        pos.x() < self.columns && pos.z() < self.rows
    }

    /// Reports whether the coordinate is inside the mask and walkable.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.index(pos)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Overrides the walkability of a single cell. Out-of-bounds writes are ignored.
    pub fn set_walkable(&mut self, pos: GridPos, walkable: bool) {
        if let Some(slot) = self.index(pos).and_then(|index| self.cells.get_mut(index)) {
            *slot = walkable;
        }
    }

    /// Number of walkable cells in the mask.
    #[must_use]
    pub fn walkable_count(&self) -> usize {
        self.cells.iter().filter(|walkable| **walkable).count()
    }

    /// Iterates over every walkable coordinate in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        let columns = self.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, walkable)| **walkable)
            .filter_map(move |(index, _)| {
                let index = u32::try_from(index).ok()?;
                Some(GridPos::new(index % columns, index / columns))
            })
    }

    /// Clamps a coordinate onto the nearest cell inside the mask.
    ///
    /// Returns `None` for an empty mask.
    #[must_use]
    pub fn clamp(&self, pos: GridPos) -> Option<GridPos> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }
        Some(GridPos::new(
            pos.x().min(self.columns - 1),
            pos.z().min(self.rows - 1),
        ))
    }

    /// Finds the walkable cell closest to `target` by breadth-first search.
    ///
    /// The target is clamped into the mask first. The search expands over all
    /// eight neighbours, cardinals first, and visits each cell at most once, so
    /// it is bounded by the mask size. Returns `None` when no cell is walkable.
    #[must_use]
    pub fn nearest_walkable(&self, target: GridPos) -> Option<GridPos> {
        let start = self.clamp(target)?;
        if self.is_walkable(start) {
            return Some(start);
        }

        let mut visited = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        visited[self.index(start)?] = true;
        queue.push_back(start);

        while let Some(cell) = queue.pop_front() {
            if self.is_walkable(cell) {
                return Some(cell);
            }

            for neighbor in self.neighbors(cell) {
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if visited[index] {
                    continue;
                }
                visited[index] = true;
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// In-bounds neighbours of a cell in [`NEIGHBOR_OFFSETS`] order.
    pub fn neighbors(&self, cell: GridPos) -> impl Iterator<Item = GridPos> + '_ {
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(move |&(dx, dz)| cell.offset(dx, dz))
            .filter(move |neighbor| self.contains(*neighbor))
    }

    /// Row-major offset of the coordinate, if it lies inside the mask.
    #[must_use]
    pub fn index(&self, pos: GridPos) -> Option<usize> {
        if !self.contains(pos) {
            return None;
        }
        let column = usize::try_from(pos.x()).ok()?;
        let row = usize::try_from(pos.z()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }
}

fn cell_count(columns: u32, rows: u32) -> usize {
    let count = u64::from(columns) * u64::from(rows);
    usize::try_from(count).unwrap_or(0)
}
