use office_spatial_core::EntityKind;
use office_spatial_system_proximity::{ProximityEntity, ProximityGrid, ProximityQuery};
use proptest::prelude::*;

#[test]
fn two_bots_in_one_bucket_are_returned_nearest_first() {
    let mut grid = ProximityGrid::new(4.0, 20.0, 20.0);
    grid.insert(ProximityEntity::new("bot-1", 5.0, 5.0, EntityKind::Bot));
    grid.insert(ProximityEntity::new("bot-2", 7.0, 5.0, EntityKind::Bot));

    let hits = grid.query_radius(&ProximityQuery::new(5.0, 5.0, 3.0));
    let summary: Vec<(&str, f32)> = hits
        .iter()
        .map(|hit| (hit.entity.id.as_str(), hit.distance))
        .collect();
    assert_eq!(summary, vec![("bot-1", 0.0), ("bot-2", 2.0)]);
}

#[test]
fn queries_reach_across_bucket_boundaries() {
    let mut grid = ProximityGrid::new(4.0, 20.0, 20.0);
    grid.insert(ProximityEntity::new("desk", 3.9, 3.9, EntityKind::Prop));
    grid.insert(ProximityEntity::new("door", 8.1, 4.0, EntityKind::Door));

    let hits = grid.query_radius(&ProximityQuery::new(4.1, 4.0, 4.0));
    let ids: Vec<&str> = hits.iter().map(|hit| hit.entity.id.as_str()).collect();
    assert_eq!(ids, vec!["desk", "door"]);

    let doors = grid.query_radius(&ProximityQuery::new(4.1, 4.0, 4.0).with_kind(EntityKind::Door));
    assert_eq!(doors.len(), 1);
}

#[test]
fn results_are_snapshots() {
    let mut grid = ProximityGrid::new(2.0, 10.0, 10.0);
    grid.insert(ProximityEntity::new("bot-1", 1.0, 1.0, EntityKind::Bot));
    let hits = grid.query_radius(&ProximityQuery::new(1.0, 1.0, 1.0));

    assert!(grid.update("bot-1", 9.0, 9.0));
    assert_eq!(hits[0].entity.x, 1.0);
    assert!(grid.query_radius(&ProximityQuery::new(1.0, 1.0, 1.0)).is_empty());
}

fn entities() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec((0.0f32..40.0, 0.0f32..40.0), 1..40)
}

proptest! {
    #[test]
    fn updated_entities_are_found_at_their_new_position(
        cell_size in 0.5f32..8.0,
        start in (0.0f32..40.0, 0.0f32..40.0),
        end in (0.0f32..40.0, 0.0f32..40.0),
    ) {
        let mut grid = ProximityGrid::new(cell_size, 40.0, 40.0);
        grid.insert(ProximityEntity::new("bot-7", start.0, start.1, EntityKind::Bot));
        prop_assert!(grid.update("bot-7", end.0, end.1));

        let hits = grid.query_radius(&ProximityQuery::new(end.0, end.1, 0.001));
        let matching: Vec<_> = hits.iter().filter(|hit| hit.entity.id == "bot-7").collect();
        prop_assert_eq!(matching.len(), 1);
        prop_assert!(matching[0].distance.abs() < 1e-6);
        prop_assert_eq!(grid.len(), 1);
    }

    #[test]
    fn radius_results_are_sorted_and_complete(
        positions in entities(),
        centre in (0.0f32..40.0, 0.0f32..40.0),
        radius in 0.0f32..25.0,
    ) {
        let mut grid = ProximityGrid::new(3.0, 40.0, 40.0);
        for (index, &(x, z)) in positions.iter().enumerate() {
            grid.insert(ProximityEntity::new(format!("e{index}"), x, z, EntityKind::Bot));
        }

        let hits = grid.query_radius(&ProximityQuery::new(centre.0, centre.1, radius));
        for pair in hits.windows(2) {
            prop_assert!(pair[0].distance <= pair[1].distance);
        }

        let expected = positions
            .iter()
            .filter(|&&(x, z)| {
                let dx = x - centre.0;
                let dz = z - centre.1;
                dx * dx + dz * dz <= radius * radius
            })
            .count();
        prop_assert_eq!(hits.len(), expected);
    }

    #[test]
    fn nearest_matches_a_brute_force_scan(
        positions in entities(),
        probe in (0.0f32..40.0, 0.0f32..40.0),
    ) {
        let mut grid = ProximityGrid::new(2.0, 40.0, 40.0);
        for (index, &(x, z)) in positions.iter().enumerate() {
            grid.insert(ProximityEntity::new(format!("e{index}"), x, z, EntityKind::Bot));
        }

        let best = positions
            .iter()
            .map(|&(x, z)| ((x - probe.0).powi(2) + (z - probe.1).powi(2)).sqrt())
            .fold(f32::INFINITY, f32::min);
        let hit = grid.find_nearest(probe.0, probe.1, None, None);
        prop_assert!(hit.is_some());
        if let Some(hit) = hit {
            prop_assert!((hit.distance - best).abs() < 1e-3);
        }
    }
}
