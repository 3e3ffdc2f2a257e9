use std::f32::consts::{FRAC_PI_2, PI};

use office_spatial_core::{BlockReason, CellType, GridPos, Span, VisionConfig};
use office_spatial_system_vision::VisionSystem;
use office_spatial_world::{PropPlacement, RoomGrid};
use proptest::prelude::*;

fn open_room(size: u32) -> RoomGrid {
    RoomGrid::bordered(size, size, 1.0)
}

fn config(range: f32, fov_degrees: f32, ray_count: u32) -> VisionConfig {
    VisionConfig {
        range,
        fov_degrees,
        ray_count,
        furniture_blocks: true,
    }
}

#[test]
fn range_is_checked_before_raycasting() {
    let mut grid = open_room(20);
    grid.place_prop(&PropPlacement::new("wall-panel", GridPos::new(6, 5), CellType::Wall));
    let vision = VisionSystem::new(&grid, config(3.0, 360.0, 8));

    let sight = vision.can_see(GridPos::new(2, 5), GridPos::new(12, 5), None);
    assert!(!sight.visible);
    assert_eq!(sight.blocked_by, Some(BlockReason::OutOfRange));
    assert_eq!(sight.blocked_at, None);
    assert!((sight.distance - 10.0).abs() < 1e-5);
}

#[test]
fn targets_behind_the_observer_are_outside_the_cone() {
    let grid = open_room(20);
    let vision = VisionSystem::new(&grid, config(10.0, 90.0, 8));
    let from = GridPos::new(10, 10);

    let ahead = vision.can_see(from, GridPos::new(14, 11), Some(0.0));
    assert!(ahead.visible);

    let behind = vision.can_see(from, GridPos::new(6, 10), Some(0.0));
    assert_eq!(behind.blocked_by, Some(BlockReason::OutsideFov));

    let no_facing = vision.can_see(from, GridPos::new(6, 10), None);
    assert!(no_facing.visible);

    let wrapped = vision.can_see(from, GridPos::new(6, 10), Some(PI - 0.1));
    assert!(wrapped.visible);
}

#[test]
fn omnidirectional_observers_ignore_facing() {
    let grid = open_room(20);
    let vision = VisionSystem::new(&grid, config(10.0, 360.0, 8));
    let sight = vision.can_see(GridPos::new(10, 10), GridPos::new(4, 10), Some(0.0));
    assert!(sight.visible);
}

#[test]
fn walls_block_and_report_their_position() {
    let mut grid = open_room(20);
    grid.place_prop(&PropPlacement::new("partition", GridPos::new(8, 4), CellType::Wall));
    let vision = VisionSystem::new(&grid, config(12.0, 360.0, 8));

    let sight = vision.can_see(GridPos::new(4, 4), GridPos::new(12, 4), None);
    assert!(!sight.visible);
    assert_eq!(sight.blocked_at, Some(GridPos::new(8, 4)));
    assert_eq!(
        sight.blocked_by,
        Some(BlockReason::Obstacle {
            kind: CellType::Wall,
            prop_id: Some("partition".to_owned()),
        })
    );
}

#[test]
fn out_of_bounds_endpoints_are_rejected() {
    let grid = open_room(10);
    let vision = VisionSystem::new(&grid, VisionConfig::default());
    let sight = vision.can_see(GridPos::new(2, 2), GridPos::new(30, 2), None);
    assert_eq!(sight.blocked_by, Some(BlockReason::OutOfBounds));
    assert!(vision.visible_cells(GridPos::new(30, 2), 0.0).is_empty());
}

#[test]
fn visible_cells_stop_at_the_first_blocking_cell() {
    let mut grid = open_room(20);
    for z in 1..19 {
        grid.place_prop(&PropPlacement::new("glass-wall", GridPos::new(8, z), CellType::Wall));
    }
    let vision = VisionSystem::new(&grid, config(10.0, 60.0, 16));
    let cells = vision.visible_cells(GridPos::new(4, 10), 0.0);

    assert_eq!(cells.first(), Some(&GridPos::new(4, 10)));
    assert!(cells.contains(&GridPos::new(8, 10)));
    assert!(cells.iter().all(|cell| cell.x() <= 8));

    let mut deduplicated = cells.clone();
    deduplicated.sort();
    deduplicated.dedup();
    assert_eq!(deduplicated.len(), cells.len());
}

#[test]
fn huge_ranges_scan_the_same_cells_as_the_grid_diagonal() {
    let mut grid = open_room(16);
    grid.place_prop(&PropPlacement::new("filing-cabinet", GridPos::new(9, 6), CellType::Furniture));
    let from = GridPos::new(4, 8);

    let unbounded = VisionSystem::new(&grid, config(1e19, 360.0, 32));
    let diagonal = VisionSystem::new(&grid, config(16.0f32.hypot(16.0), 360.0, 32));
    let cells = unbounded.visible_cells(from, 0.0);
    assert_eq!(cells, diagonal.visible_cells(from, 0.0));
    assert!(cells.contains(&GridPos::new(14, 8)));

    let infinite = VisionSystem::new(&grid, config(f32::INFINITY, 360.0, 32));
    assert_eq!(infinite.visible_cells(from, 0.0), cells);
}

#[test]
fn visible_cells_follow_the_facing_direction() {
    let grid = open_room(20);
    let vision = VisionSystem::new(&grid, config(6.0, 90.0, 24));
    let from = GridPos::new(10, 10);
    let cells = vision.visible_cells(from, FRAC_PI_2);

    assert!(cells.contains(&GridPos::new(10, 15)));
    assert!(cells.iter().all(|cell| cell.z() >= 10));
    assert!(cells.iter().all(|cell| from.euclidean_distance(*cell) <= 6.0));
}

#[test]
fn visible_props_report_each_anchor_once_nearest_first() {
    let mut grid = open_room(20);
    grid.place_prop(
        &PropPlacement::new("conference-table", GridPos::new(12, 9), CellType::Furniture)
            .with_span(Span::new(3, 3)),
    );
    grid.place_prop(&PropPlacement::new("plant", GridPos::new(7, 10), CellType::Decoration));
    let vision = VisionSystem::new(&grid, config(10.0, 360.0, 64));

    let props = vision.visible_props(GridPos::new(5, 10), 0.0);
    let ids: Vec<&str> = props.iter().map(|prop| prop.prop_id.as_str()).collect();
    assert_eq!(ids, vec!["plant", "conference-table"]);
    assert_eq!(props[1].anchor, GridPos::new(12, 9));
    assert!(props[0].distance <= props[1].distance);
}

proptest! {
    #[test]
    fn widening_range_past_distance_reveals_target(
        fx in 1u32..19,
        fz in 1u32..19,
        tx in 1u32..19,
        tz in 1u32..19,
    ) {
        let grid = open_room(20);
        let from = GridPos::new(fx, fz);
        let to = GridPos::new(tx, tz);
        let distance = from.euclidean_distance(to);
        prop_assume!(distance > 0.5);

        let short = VisionSystem::new(&grid, config(distance - 0.25, 360.0, 8));
        let sight = short.can_see(from, to, None);
        prop_assert!(!sight.visible);
        prop_assert_eq!(sight.blocked_by, Some(BlockReason::OutOfRange));

        let long = VisionSystem::new(&grid, config(distance + 0.25, 360.0, 8));
        prop_assert!(long.can_see(from, to, None).visible);
    }
}
