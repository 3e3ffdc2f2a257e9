//! Nine-way partition of a room grid into coarse named regions.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{GridPos, UnknownSymbol};

/// One of nine coarse regions obtained by splitting a room into thirds on each axis.
///
/// North is the low-`z` edge and west is the low-`x` edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    /// Northwest corner.
    #[serde(rename = "nw")]
    NorthWest,
    /// North side.
    #[serde(rename = "n")]
    North,
    /// Northeast corner.
    #[serde(rename = "ne")]
    NorthEast,
    /// West side.
    #[serde(rename = "w")]
    West,
    /// Middle of the room.
    #[serde(rename = "center")]
    Center,
    /// East side.
    #[serde(rename = "e")]
    East,
    /// Southwest corner.
    #[serde(rename = "sw")]
    SouthWest,
    /// South side.
    #[serde(rename = "s")]
    South,
    /// Southeast corner.
    #[serde(rename = "se")]
    SouthEast,
}

impl Zone {
    /// Every zone in row-major order, northwest first.
    pub const ALL: [Zone; 9] = [
        Zone::NorthWest,
        Zone::North,
        Zone::NorthEast,
        Zone::West,
        Zone::Center,
        Zone::East,
        Zone::SouthWest,
        Zone::South,
        Zone::SouthEast,
    ];

    /// Classifies a coordinate of a `columns` × `rows` grid into its zone.
    #[must_use]
    pub fn classify(columns: u32, rows: u32, pos: GridPos) -> Zone {
        Self::from_thirds(third(pos.x(), columns), third(pos.z(), rows))
    }

    /// Deterministic representative coordinate of the zone within a grid.
    ///
    /// Each third is represented by its midpoint: `n/6`, `n/2` and `5n/6`.
    #[must_use]
    pub fn representative(self, columns: u32, rows: u32) -> GridPos {
        let (column_third, row_third) = self.thirds();
        GridPos::new(
            third_midpoint(column_third, columns),
            third_midpoint(row_third, rows),
        )
    }

    /// Short symbol of the zone (`nw`, `n`, ..., `se`).
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NorthWest => "nw",
            Self::North => "n",
            Self::NorthEast => "ne",
            Self::West => "w",
            Self::Center => "center",
            Self::East => "e",
            Self::SouthWest => "sw",
            Self::South => "s",
            Self::SouthEast => "se",
        }
    }

    /// Compass direction of the zone relative to the room centre.
    #[must_use]
    pub const fn direction(self) -> &'static str {
        match self {
            Self::NorthWest => "northwest",
            Self::North => "north",
            Self::NorthEast => "northeast",
            Self::West => "west",
            Self::Center => "center",
            Self::East => "east",
            Self::SouthWest => "southwest",
            Self::South => "south",
            Self::SouthEast => "southeast",
        }
    }

    /// Human-readable label used in layout descriptions.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NorthWest => "northwest corner",
            Self::North => "north side",
            Self::NorthEast => "northeast corner",
            Self::West => "west side",
            Self::Center => "center",
            Self::East => "east side",
            Self::SouthWest => "southwest corner",
            Self::South => "south side",
            Self::SouthEast => "southeast corner",
        }
    }

    const fn thirds(self) -> (u8, u8) {
        match self {
            Self::NorthWest => (0, 0),
            Self::North => (1, 0),
            Self::NorthEast => (2, 0),
            Self::West => (0, 1),
            Self::Center => (1, 1),
            Self::East => (2, 1),
            Self::SouthWest => (0, 2),
            Self::South => (1, 2),
            Self::SouthEast => (2, 2),
        }
    }

    const fn from_thirds(column_third: u8, row_third: u8) -> Zone {
        match (column_third, row_third) {
            (0, 0) => Self::NorthWest,
            (1, 0) => Self::North,
            (_, 0) => Self::NorthEast,
            (0, 1) => Self::West,
            (1, 1) => Self::Center,
            (_, 1) => Self::East,
            (0, _) => Self::SouthWest,
            (1, _) => Self::South,
            (_, _) => Self::SouthEast,
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Zone {
    type Err = UnknownSymbol;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|zone| zone.symbol() == normalized || zone.direction() == normalized)
            .ok_or_else(|| UnknownSymbol(value.to_owned()))
    }
}

fn third(value: u32, extent: u32) -> u8 {
    let scaled = u64::from(value) * 3;
    let extent = u64::from(extent);
    if scaled < extent {
        0
    } else if scaled < extent * 2 {
        1
    } else {
        2
    }
}

fn third_midpoint(third: u8, extent: u32) -> u32 {
    match third {
        0 => extent / 6,
        1 => extent / 2,
        _ => extent.saturating_mul(5) / 6,
    }
}

#[cfg(test)]
mod tests {
    use super::Zone;
    use crate::GridPos;
    use proptest::prelude::*;

    #[test]
    fn classify_partitions_twenty_cell_room_into_thirds() {
        assert_eq!(Zone::classify(20, 20, GridPos::new(0, 0)), Zone::NorthWest);
        assert_eq!(Zone::classify(20, 20, GridPos::new(6, 0)), Zone::NorthWest);
        assert_eq!(Zone::classify(20, 20, GridPos::new(7, 0)), Zone::North);
        assert_eq!(Zone::classify(20, 20, GridPos::new(13, 10)), Zone::Center);
        assert_eq!(Zone::classify(20, 20, GridPos::new(14, 10)), Zone::East);
        assert_eq!(Zone::classify(20, 20, GridPos::new(15, 15)), Zone::SouthEast);
        assert_eq!(Zone::classify(20, 20, GridPos::new(3, 19)), Zone::SouthWest);
    }

    #[test]
    fn representative_lands_inside_its_zone() {
        for (columns, rows) in [(20, 20), (12, 9), (6, 6), (40, 17)] {
            for zone in Zone::ALL {
                let pos = zone.representative(columns, rows);
                assert_eq!(Zone::classify(columns, rows, pos), zone, "{columns}x{rows}");
            }
        }
    }

    #[test]
    fn representative_uses_third_midpoints() {
        assert_eq!(Zone::NorthWest.representative(20, 20), GridPos::new(3, 3));
        assert_eq!(Zone::Center.representative(20, 20), GridPos::new(10, 10));
        assert_eq!(Zone::SouthEast.representative(20, 20), GridPos::new(16, 16));
    }

    #[test]
    fn parses_symbols_and_directions() {
        assert_eq!("se".parse::<Zone>(), Ok(Zone::SouthEast));
        assert_eq!("North".parse::<Zone>(), Ok(Zone::North));
        assert_eq!("center".parse::<Zone>(), Ok(Zone::Center));
        assert!("up".parse::<Zone>().is_err());
    }

    proptest! {
        // Below three cells per axis some thirds are empty.
        #[test]
        fn representatives_classify_back_to_their_zone(columns in 3u32..=40, rows in 3u32..=40) {
            for zone in Zone::ALL {
                let pos = zone.representative(columns, rows);
                prop_assert!(pos.x() < columns && pos.z() < rows);
                prop_assert_eq!(Zone::classify(columns, rows, pos), zone);
            }
        }
    }
}
