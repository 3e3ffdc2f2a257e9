#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that loads a room blueprint and runs spatial queries
//! against it: layout summaries, path requests, sight checks and a seeded
//! wandering simulation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use office_spatial_core::{GridPos, Zone};
use office_spatial_system_navigator::{NavigationPath, SpatialConfig, SpatialNavigator};
use office_spatial_system_vision::VisionSystem;
use office_spatial_world::{Blueprint, RoomGrid};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod simulate;

/// Command line arguments for the office spatial tools.
#[derive(Debug, Parser)]
#[command(name = "office-spatial")]
#[command(about = "Spatial queries over office room blueprints")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Room inputs shared by every subcommand.
#[derive(Debug, Args)]
struct RoomArgs {
    /// Path to the room blueprint JSON document.
    #[arg(long)]
    blueprint: PathBuf,

    /// Optional TOML file overriding vision, navigation and proximity settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Describe the room contents grouped by zone.
    Summary {
        #[command(flatten)]
        room: RoomArgs,

        /// Name prefixed to the description; defaults to the blueprint name.
        #[arg(long)]
        room_name: Option<String>,
    },
    /// Plan a path to a cell, a prop or a zone.
    Path {
        #[command(flatten)]
        room: RoomArgs,

        /// Starting cell as `X,Z`.
        #[arg(long, value_parser = parse_cell)]
        from: GridPos,

        /// Target cell as `X,Z`.
        #[arg(long, value_parser = parse_cell)]
        to: Option<GridPos>,

        /// Prop identifier (or part of one) to walk up to.
        #[arg(long)]
        prop: Option<String>,

        /// Zone symbol (`nw`, `n`, `ne`, `w`, `center`, `e`, `sw`, `s`, `se`).
        #[arg(long)]
        zone: Option<Zone>,

        /// Walking speed in cells per second.
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        speed: f32,
    },
    /// Report what an observer can see.
    Look {
        #[command(flatten)]
        room: RoomArgs,

        /// Observer cell as `X,Z`.
        #[arg(long, value_parser = parse_cell)]
        from: GridPos,

        /// Facing in degrees, `0` towards +x and `90` towards +z.
        #[arg(long, allow_negative_numbers = true)]
        facing: Option<f32>,

        /// Single cell to test instead of scanning the field of view.
        #[arg(long, value_parser = parse_cell)]
        target: Option<GridPos>,
    },
    /// Run a seeded wandering simulation.
    Simulate {
        #[command(flatten)]
        room: RoomArgs,

        /// Number of bots to spawn.
        #[arg(long, default_value_t = 4)]
        bots: usize,

        /// Number of ticks to simulate.
        #[arg(long, default_value_t = 200)]
        ticks: u32,

        /// Random seed for reproducibility.
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

/// Loaded blueprint, grid and configuration for one room.
struct Room {
    blueprint: Blueprint,
    grid: RoomGrid,
    config: SpatialConfig,
}

/// Entry point for the office spatial command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "office_spatial=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::parse().command {
        Command::Summary { room, room_name } => summary(&load_room(&room)?, room_name.as_deref()),
        Command::Path {
            room,
            from,
            to,
            prop,
            zone,
            speed,
        } => path(&load_room(&room)?, from, Target::pick(to, prop, zone)?, speed),
        Command::Look {
            room,
            from,
            facing,
            target,
        } => look(&load_room(&room)?, from, facing, target),
        Command::Simulate {
            room,
            bots,
            ticks,
            seed,
        } => {
            let room = load_room(&room)?;
            let report = simulate::run(&room.grid, &room.config, bots, ticks, seed)?;
            print!("{report}");
            Ok(())
        }
    }
}

fn load_room(args: &RoomArgs) -> Result<Room> {
    let blueprint = Blueprint::from_path(&args.blueprint)
        .with_context(|| format!("loading blueprint {}", args.blueprint.display()))?;
    for warning in blueprint.validate().warnings {
        tracing::warn!(blueprint = %blueprint.name, %warning, "blueprint warning");
    }
    let grid = blueprint
        .to_grid()
        .with_context(|| format!("building room grid for '{}'", blueprint.name))?;
    let config = load_config(args.config.as_deref())?;

    let (columns, rows) = grid.dimensions();
    tracing::info!(room = %blueprint.name, columns, rows, "loaded room");
    Ok(Room {
        blueprint,
        grid,
        config,
    })
}

fn load_config(path: Option<&Path>) -> Result<SpatialConfig> {
    match path {
        Some(path) => SpatialConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(SpatialConfig::default()),
    }
}

fn summary(room: &Room, room_name: Option<&str>) -> Result<()> {
    let navigator = SpatialNavigator::new(&room.grid, room.config.navigation);
    let room_name = room_name.unwrap_or(room.blueprint.name.as_str());
    println!("{}", navigator.layout_summary(Some(room_name)));
    for prop in navigator.prop_layout() {
        let interaction = prop
            .interaction
            .map(|kind| format!(" [{}]", kind.name()))
            .unwrap_or_default();
        println!(
            "  {} at {} {}x{} {} ({}){interaction}",
            prop.prop_id,
            prop.anchor,
            prop.span.w,
            prop.span.d,
            prop.kind,
            prop.zone.symbol(),
        );
    }
    Ok(())
}

/// Destination of a `path` request.
enum Target {
    Cell(GridPos),
    Prop(String),
    Zone(Zone),
}

impl Target {
    fn pick(to: Option<GridPos>, prop: Option<String>, zone: Option<Zone>) -> Result<Self> {
        match (to, prop, zone) {
            (Some(cell), None, None) => Ok(Self::Cell(cell)),
            (None, Some(prop), None) => Ok(Self::Prop(prop)),
            (None, None, Some(zone)) => Ok(Self::Zone(zone)),
            _ => bail!("exactly one of --to, --prop or --zone is required"),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Cell(cell) => cell.to_string(),
            Self::Prop(prop) => format!("prop '{prop}'"),
            Self::Zone(zone) => format!("zone {}", zone.symbol()),
        }
    }
}

fn path(room: &Room, from: GridPos, target: Target, speed: f32) -> Result<()> {
    let navigator = SpatialNavigator::new(&room.grid, room.config.navigation);
    let planned = match &target {
        Target::Cell(cell) => navigator.navigate(from, *cell, speed),
        Target::Prop(prop) => navigator.navigate_to_prop(from, prop, speed),
        Target::Zone(zone) => navigator.navigate_to_zone(from, *zone, speed),
    };
    let Some(planned) = planned else {
        bail!("no path from {from} to {}", target.describe());
    };
    print_path(&room.grid, &planned);
    Ok(())
}

fn print_path(grid: &RoomGrid, planned: &NavigationPath) {
    println!("target: {}", planned.target);
    println!(
        "waypoints: {} (raw {})",
        planned.waypoints.len(),
        planned.raw.len()
    );
    for waypoint in &planned.waypoints {
        let (x, z) = grid.grid_to_world(*waypoint);
        println!("  {waypoint} world ({x:.2}, {z:.2})");
    }
    println!("distance: {:.2}", planned.distance);
    println!("estimated time: {:.2}", planned.estimated_time);
}

fn look(room: &Room, from: GridPos, facing: Option<f32>, target: Option<GridPos>) -> Result<()> {
    let vision = VisionSystem::new(&room.grid, room.config.vision);
    let facing = facing.map(f32::to_radians);

    if let Some(target) = target {
        let sight = vision.can_see(from, target, facing);
        match (&sight.blocked_by, sight.blocked_at) {
            (None, _) => println!("{target} is visible at distance {:.2}", sight.distance),
            (Some(reason), Some(at)) => println!("{target} is hidden: blocked by {reason} at {at}"),
            (Some(reason), None) => println!("{target} is hidden: {reason}"),
        }
        return Ok(());
    }

    if !room.grid.contains(from) {
        bail!("observer {from} lies outside the room");
    }
    let facing = facing.unwrap_or(0.0);
    let cells = vision.visible_cells(from, facing);
    println!("visible cells: {}", cells.len());
    for prop in vision.visible_props(from, facing) {
        println!("  {} at {} ({:.2})", prop.prop_id, prop.anchor, prop.distance);
    }
    Ok(())
}

fn parse_cell(value: &str) -> Result<GridPos, String> {
    let (x, z) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Z but got '{value}'"))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid x '{x}': {error}"))?;
    let z = z
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("invalid z '{z}': {error}"))?;
    Ok(GridPos::new(x, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_parse_from_comma_pairs() {
        assert_eq!(parse_cell("3, 4"), Ok(GridPos::new(3, 4)));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("-1,2").is_err());
    }

    #[test]
    fn exactly_one_path_target_is_accepted() {
        assert!(Target::pick(Some(GridPos::new(1, 1)), None, None).is_ok());
        assert!(Target::pick(None, None, Some(Zone::North)).is_ok());
        assert!(Target::pick(None, None, None).is_err());
        assert!(Target::pick(Some(GridPos::new(1, 1)), Some("desk".to_owned()), None).is_err());
    }

    #[test]
    fn command_line_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
