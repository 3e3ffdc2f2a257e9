#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the office spatial awareness engine.
//!
//! This crate defines the value types that connect the room grid, the pure
//! query systems (pathfinding, vision, proximity) and the navigator facade.
//! Every type here is immutable data: grid coordinates, cell descriptors,
//! entity tags, zone symbols and the configuration objects supplied to the
//! systems at construction time. None of it performs I/O or holds state that
//! outlives a call.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

mod line;
mod zone;

pub use line::GridLine;
pub use zone::Zone;

/// Cost of a single cardinal step on the grid.
pub const CARDINAL_COST: f32 = 1.0;

/// Cost of a single diagonal step on the grid.
pub const DIAGONAL_COST: f32 = std::f32::consts::SQRT_2;

/// Location of a single grid cell expressed as column (`x`) and row (`z`).
///
/// Rows grow southward: `z == 0` is the northern edge of the room.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: u32,
    z: u32,
}

impl GridPos {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn z(&self) -> u32 {
        self.z
    }

    /// Computes the Manhattan distance between two coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.z.abs_diff(other.z)
    }

    /// Computes the Chebyshev (king-move) distance between two coordinates.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x).max(self.z.abs_diff(other.z))
    }

    /// Computes the straight-line distance between two coordinates in grid units.
    #[must_use]
    pub fn euclidean_distance(self, other: GridPos) -> f32 {
        let dx = self.x.abs_diff(other.x) as f32;
        let dz = self.z.abs_diff(other.z) as f32;
        (dx * dx + dz * dz).sqrt()
    }

    /// Returns the coordinate shifted by the provided offsets.
    ///
    /// Yields `None` when the shift would leave the non-negative quadrant.
    #[must_use]
    pub fn offset(self, dx: i32, dz: i32) -> Option<GridPos> {
        let x = self.x.checked_add_signed(dx)?;
        let z = self.z.checked_add_signed(dz)?;
        Some(GridPos::new(x, z))
    }

    /// Row-major ordering key (`z` first, then `x`) used for deterministic tie-breaks.
    #[must_use]
    pub const fn row_major_key(&self) -> (u32, u32) {
        (self.z, self.x)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Semantic classification of a single room cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellType {
    /// Open floor.
    #[default]
    Empty,
    /// Structural wall; never walkable.
    Wall,
    /// Doorway connecting the room to the rest of the building.
    Door,
    /// Solid furniture such as desks, shelves and tables.
    Furniture,
    /// Decorative objects such as plants and lamps.
    Decoration,
    /// Interaction marker (work spot, coffee point) that agents stand on.
    Interaction,
}

impl CellType {
    /// Walkability a freshly created cell of this type receives.
    #[must_use]
    pub const fn default_walkable(self) -> bool {
        match self {
            Self::Empty | Self::Door | Self::Interaction => true,
            Self::Wall | Self::Furniture | Self::Decoration => false,
        }
    }

    /// Lowercase name of the cell type.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Furniture => "furniture",
            Self::Decoration => "decoration",
            Self::Interaction => "interaction",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Activity an interaction marker offers to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
    /// Desk work spot.
    Work,
    /// Coffee or break point.
    Coffee,
    /// Resting corner.
    Sleep,
}

impl InteractionKind {
    /// Lowercase name of the interaction.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Coffee => "coffee",
            Self::Sleep => "sleep",
        }
    }
}

impl FromStr for InteractionKind {
    type Err = UnknownSymbol;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "work" => Ok(Self::Work),
            "coffee" => Ok(Self::Coffee),
            "sleep" => Ok(Self::Sleep),
            other => Err(UnknownSymbol(other.to_owned())),
        }
    }
}

/// Error produced when parsing a symbolic name that is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSymbol(pub String);

impl fmt::Display for UnknownSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown symbol '{}'", self.0)
    }
}

impl std::error::Error for UnknownSymbol {}

/// Footprint of a placed object measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Width of the footprint along `x`.
    #[serde(default = "one")]
    pub w: u32,
    /// Depth of the footprint along `z`.
    #[serde(default = "one")]
    pub d: u32,
}

impl Span {
    /// Single-cell footprint.
    pub const UNIT: Span = Span { w: 1, d: 1 };

    /// Creates a footprint with explicit dimensions.
    #[must_use]
    pub const fn new(w: u32, d: u32) -> Self {
        Self { w, d }
    }

    /// Reports whether the footprint covers more than one cell.
    #[must_use]
    pub const fn is_multi_cell(&self) -> bool {
        self.w > 1 || self.d > 1
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::UNIT
    }
}

const fn one() -> u32 {
    1
}

/// A single cell of a room grid.
///
/// Fields are private so that the wall invariant (`walkable` is always
/// `false` for [`CellType::Wall`]) holds for every constructed value.
/// Cells covered by a multi-cell prop other than its anchor carry a
/// `span_parent` pointing at the anchor coordinate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridCell {
    kind: CellType,
    walkable: bool,
    prop_id: Option<String>,
    interaction: Option<InteractionKind>,
    rotation: Option<u16>,
    span: Option<Span>,
    span_parent: Option<GridPos>,
}

impl GridCell {
    /// Creates a cell of the given type with an explicit walkability flag.
    ///
    /// Walls are forced to be non-walkable regardless of `walkable`.
    #[must_use]
    pub fn new(kind: CellType, walkable: bool) -> Self {
        Self {
            kind,
            walkable: walkable && kind != CellType::Wall,
            ..Self::default()
        }
    }

    /// Creates a cell of the given type using its default walkability.
    #[must_use]
    pub fn of(kind: CellType) -> Self {
        Self::new(kind, kind.default_walkable())
    }

    /// Attaches the identifier of the prop occupying the cell.
    #[must_use]
    pub fn with_prop(mut self, prop_id: impl Into<String>) -> Self {
        self.prop_id = Some(prop_id.into());
        self
    }

    /// Attaches the interaction offered by the cell.
    #[must_use]
    pub fn with_interaction(mut self, interaction: InteractionKind) -> Self {
        self.interaction = Some(interaction);
        self
    }

    /// Attaches the rotation of the prop anchored at the cell, in degrees.
    #[must_use]
    pub fn with_rotation(mut self, rotation: u16) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Marks the cell as the anchor of a footprint with the provided size.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Marks the cell as a non-anchor member of the footprint anchored at `anchor`.
    #[must_use]
    pub fn with_span_parent(mut self, anchor: GridPos) -> Self {
        self.span_parent = Some(anchor);
        self
    }

    /// Semantic type of the cell.
    #[must_use]
    pub const fn kind(&self) -> CellType {
        self.kind
    }

    /// Whether an agent may occupy the cell.
    #[must_use]
    pub const fn walkable(&self) -> bool {
        self.walkable
    }

    /// Identifier of the prop occupying the cell, if any.
    #[must_use]
    pub fn prop_id(&self) -> Option<&str> {
        self.prop_id.as_deref()
    }

    /// Interaction offered by the cell, if any.
    #[must_use]
    pub const fn interaction(&self) -> Option<InteractionKind> {
        self.interaction
    }

    /// Rotation of the anchored prop in degrees, if recorded.
    #[must_use]
    pub const fn rotation(&self) -> Option<u16> {
        self.rotation
    }

    /// Footprint size recorded on an anchor cell.
    #[must_use]
    pub const fn span(&self) -> Option<Span> {
        self.span
    }

    /// Anchor coordinate for cells that belong to another cell's footprint.
    #[must_use]
    pub const fn span_parent(&self) -> Option<GridPos> {
        self.span_parent
    }

    /// Reports whether the cell carries a prop and is that prop's anchor.
    #[must_use]
    pub fn is_prop_anchor(&self) -> bool {
        self.prop_id.is_some() && self.span_parent.is_none()
    }
}

/// Classification of an entity tracked by the proximity index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Animated agent avatar.
    Bot,
    /// Placed room object.
    Prop,
    /// Doorway.
    Door,
    /// Interaction marker.
    Interaction,
}

impl EntityKind {
    /// Lowercase name of the entity kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bot => "bot",
            Self::Prop => "prop",
            Self::Door => "door",
            Self::Interaction => "interaction",
        }
    }
}

impl FromStr for EntityKind {
    type Err = UnknownSymbol;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "bot" => Ok(Self::Bot),
            "prop" => Ok(Self::Prop),
            "door" => Ok(Self::Door),
            "interaction" => Ok(Self::Interaction),
            other => Err(UnknownSymbol(other.to_owned())),
        }
    }
}

/// Reason a visibility query failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    /// The target lies farther away than the configured vision range.
    OutOfRange,
    /// The target lies outside the observer's field of view.
    OutsideFov,
    /// The ray left the grid before reaching the target.
    OutOfBounds,
    /// A blocking cell interrupted the ray.
    Obstacle {
        /// Type of the blocking cell.
        kind: CellType,
        /// Identifier of the prop occupying the blocking cell, if any.
        prop_id: Option<String>,
    },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => f.write_str("out-of-range"),
            Self::OutsideFov => f.write_str("outside-fov"),
            Self::OutOfBounds => f.write_str("out-of-bounds"),
            Self::Obstacle {
                prop_id: Some(prop_id),
                ..
            } => f.write_str(prop_id),
            Self::Obstacle { kind, prop_id: None } => f.write_str(kind.name()),
        }
    }
}

/// Parameters controlling line-of-sight and field-of-view queries.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Maximum sight distance in grid units.
    pub range: f32,
    /// Angular width of the field of view in degrees; `360` disables the cone check.
    pub fov_degrees: f32,
    /// Number of rays cast by field-of-view scans.
    pub ray_count: u32,
    /// Whether furniture cells block sight (walls always do).
    pub furniture_blocks: bool,
}

impl VisionConfig {
    /// Half of the field of view expressed in radians.
    #[must_use]
    pub fn half_fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians() / 2.0
    }

    /// Reports whether the configuration describes an omnidirectional observer.
    #[must_use]
    pub fn is_omnidirectional(&self) -> bool {
        self.fov_degrees >= 360.0
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            range: 8.0,
            fov_degrees: 120.0,
            ray_count: 24,
            furniture_blocks: true,
        }
    }
}

/// Parameters controlling navigation requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Whether raw grid paths are simplified into fewer waypoints.
    pub smoothing: bool,
    /// Raw paths with more nodes than this are treated as unreachable.
    pub max_path_length: usize,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            smoothing: true,
            max_path_length: 200,
        }
    }
}
