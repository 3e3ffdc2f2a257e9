//! Seeded tick loop that wanders bots between zones.
//!
//! Each tick moves every bot along its current waypoints, pushes the new
//! position into the proximity index and records which nearby bots it can see.
//! Bots without a route pick a random zone and ask the navigator for a path.

use std::{
    collections::{BTreeSet, VecDeque},
    fmt,
};

use anyhow::{bail, Result};
use glam::Vec2;
use office_spatial_core::{EntityKind, GridPos, Zone};
use office_spatial_system_navigator::{SpatialConfig, SpatialNavigator};
use office_spatial_system_proximity::{ProximityEntity, ProximityGrid, ProximityQuery};
use office_spatial_system_vision::VisionSystem;
use office_spatial_world::RoomGrid;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Distance a bot covers per tick, in cells.
const STEP_PER_TICK: f32 = 0.25;

/// Attempts at finding a reachable zone before a bot idles for a tick.
const ROUTE_ATTEMPTS: usize = 3;

struct Bot {
    id: String,
    position: Vec2,
    facing: f32,
    route: VecDeque<Vec2>,
    travelled: f32,
    trips: u32,
    seen: BTreeSet<String>,
}

impl Bot {
    fn cell(&self) -> GridPos {
        cell_of(self.position)
    }

    fn advance(&mut self, mut budget: f32) -> bool {
        while budget > 0.0 {
            let Some(&next) = self.route.front() else {
                return false;
            };
            let delta = next - self.position;
            let distance = delta.length();
            if distance > f32::EPSILON {
                self.facing = delta.y.atan2(delta.x);
            }
            if distance <= budget {
                self.position = next;
                self.travelled += distance;
                budget -= distance;
                let _ = self.route.pop_front();
                if self.route.is_empty() {
                    self.trips += 1;
                    return true;
                }
            } else {
                self.position += delta / distance * budget;
                self.travelled += budget;
                budget = 0.0;
            }
        }
        false
    }
}

/// Outcome of a simulation run, one line per bot.
pub(crate) struct SimulationReport {
    ticks: u32,
    bots: Vec<BotSummary>,
}

struct BotSummary {
    id: String,
    cell: GridPos,
    trips: u32,
    travelled: f32,
    seen: Vec<String>,
}

impl fmt::Display for SimulationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks: {}", self.ticks)?;
        for bot in &self.bots {
            let seen = if bot.seen.is_empty() {
                "nobody".to_owned()
            } else {
                bot.seen.join(", ")
            };
            writeln!(
                f,
                "{} at {} trips {} travelled {:.2} saw {seen}",
                bot.id, bot.cell, bot.trips, bot.travelled
            )?;
        }
        Ok(())
    }
}

/// Runs the tick loop and summarises every bot.
pub(crate) fn run(
    grid: &RoomGrid,
    config: &SpatialConfig,
    bot_count: usize,
    ticks: u32,
    seed: u64,
) -> Result<SimulationReport> {
    let navigator = SpatialNavigator::new(grid, config.navigation);
    let vision = VisionSystem::new(grid, config.vision);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let spawn_cells: Vec<GridPos> = navigator.mask().walkable_cells().collect();
    if spawn_cells.is_empty() {
        bail!("room has no walkable cells to spawn bots on");
    }

    let (columns, rows) = grid.dimensions();
    let mut proximity =
        ProximityGrid::new(config.proximity_cell_size, columns as f32, rows as f32);
    for (anchor, cell) in grid.prop_anchors() {
        if let Some(prop_id) = cell.prop_id() {
            let (x, z) = (anchor.x() as f32, anchor.z() as f32);
            proximity.insert(
                ProximityEntity::new(prop_id, x, z, EntityKind::Prop)
                    .with_meta("cell", cell.kind().name()),
            );
        }
    }
    for (index, door) in grid.doors().iter().enumerate() {
        proximity.insert(ProximityEntity::new(
            format!("door-{index}"),
            door.x() as f32,
            door.z() as f32,
            EntityKind::Door,
        ));
    }

    let mut bots: Vec<Bot> = (0..bot_count)
        .filter_map(|index| {
            let spawn = *spawn_cells.choose(&mut rng)?;
            Some(Bot {
                id: format!("bot-{}", index + 1),
                position: position_of(spawn),
                facing: 0.0,
                route: VecDeque::new(),
                travelled: 0.0,
                trips: 0,
                seen: BTreeSet::new(),
            })
        })
        .collect();
    for bot in &bots {
        proximity.insert(ProximityEntity::new(
            bot.id.as_str(),
            bot.position.x,
            bot.position.y,
            EntityKind::Bot,
        ));
    }

    for tick in 0..ticks {
        for bot in &mut bots {
            if bot.route.is_empty() {
                plan_route(&navigator, bot, &mut rng);
            }
            if bot.advance(STEP_PER_TICK) {
                tracing::debug!(tick, bot = %bot.id, cell = %bot.cell(), "bot arrived");
            }
            let _ = proximity.update(&bot.id, bot.position.x, bot.position.y);
        }

        for bot in &mut bots {
            let query = ProximityQuery::new(bot.position.x, bot.position.y, config.vision.range)
                .with_kind(EntityKind::Bot)
                .excluding(bot.id.as_str());
            for hit in proximity.query_radius(&query) {
                let other = cell_of(Vec2::new(hit.entity.x, hit.entity.z));
                if vision.can_see(bot.cell(), other, Some(bot.facing)).visible {
                    let _ = bot.seen.insert(hit.entity.id);
                }
            }
        }
    }

    let bots = bots
        .into_iter()
        .map(|bot| BotSummary {
            cell: bot.cell(),
            id: bot.id,
            trips: bot.trips,
            travelled: bot.travelled,
            seen: bot.seen.into_iter().collect(),
        })
        .collect();
    Ok(SimulationReport { ticks, bots })
}

fn plan_route(navigator: &SpatialNavigator<'_>, bot: &mut Bot, rng: &mut ChaCha8Rng) {
    let from = bot.cell();
    for _ in 0..ROUTE_ATTEMPTS {
        let zone = Zone::ALL[rng.gen_range(0..Zone::ALL.len())];
        let Some(path) = navigator.navigate_to_zone(from, zone, STEP_PER_TICK) else {
            continue;
        };
        if path.waypoints.len() < 2 {
            continue;
        }
        tracing::trace!(
            bot = %bot.id,
            %from,
            zone = zone.symbol(),
            waypoints = path.waypoints.len(),
            "planned route"
        );
        bot.route = path
            .waypoints
            .iter()
            .skip(1)
            .map(|&cell| position_of(cell))
            .collect();
        return;
    }
}

fn position_of(cell: GridPos) -> Vec2 {
    Vec2::new(cell.x() as f32, cell.z() as f32)
}

fn cell_of(position: Vec2) -> GridPos {
    let rounded = position.round().max(Vec2::ZERO);
    GridPos::new(rounded.x as u32, rounded.y as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> RoomGrid {
        RoomGrid::bordered(12, 10, 0.6)
    }

    #[test]
    fn runs_are_reproducible_for_a_seed() {
        let grid = room();
        let config = SpatialConfig::default();
        let first = run(&grid, &config, 3, 120, 7).expect("simulation").to_string();
        let second = run(&grid, &config, 3, 120, 7).expect("simulation").to_string();
        assert_eq!(first, second);
        assert_eq!(first.lines().count(), 4);
    }

    #[test]
    fn bots_stay_on_walkable_cells() {
        let grid = room();
        let config = SpatialConfig::default();
        let report = run(&grid, &config, 5, 300, 11).expect("simulation");
        for bot in &report.bots {
            let cell = grid.cell(bot.cell).expect("bot inside the room");
            assert!(cell.walkable(), "{} stands on {}", bot.id, bot.cell);
        }
        assert!(report.bots.iter().any(|bot| bot.trips > 0));
    }

    #[test]
    fn bots_follow_waypoints_at_a_fixed_pace() {
        let mut bot = Bot {
            id: "bot-1".to_owned(),
            position: Vec2::new(1.0, 1.0),
            facing: 0.0,
            route: VecDeque::from(vec![Vec2::new(2.0, 1.0), Vec2::new(2.0, 3.0)]),
            travelled: 0.0,
            trips: 0,
            seen: BTreeSet::new(),
        };
        assert!(!bot.advance(1.5));
        assert!((bot.position - Vec2::new(2.0, 1.5)).length() < 1e-5);
        assert!((bot.facing - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(bot.advance(5.0));
        assert_eq!(bot.position, Vec2::new(2.0, 3.0));
        assert_eq!(bot.trips, 1);
        assert!((bot.travelled - 3.0).abs() < 1e-5);
    }

    #[test]
    fn rooms_without_floor_are_rejected() {
        let grid = RoomGrid::bordered(2, 2, 1.0);
        assert!(run(&grid, &SpatialConfig::default(), 1, 1, 1).is_err());
    }
}
