#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spatial hash index over continuously moving point entities.
//!
//! Positions are bucketed into square cells of side `cell_size`. Mutations
//! touch at most two buckets, and radius queries only visit the buckets whose
//! squares can intersect the query disc. Query results are snapshots: they own
//! copies of the matching entities and stay valid across later mutations.

use std::collections::{BTreeMap, HashMap};

use office_spatial_core::EntityKind;

/// Point entity tracked by the proximity index.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityEntity {
    /// Unique identifier of the entity.
    pub id: String,
    /// Horizontal position.
    pub x: f32,
    /// Depth position.
    pub z: f32,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Free-form metadata carried alongside the entity.
    pub meta: BTreeMap<String, String>,
}

impl ProximityEntity {
    /// Creates an entity without metadata.
    #[must_use]
    pub fn new(id: impl Into<String>, x: f32, z: f32, kind: EntityKind) -> Self {
        Self {
            id: id.into(),
            x,
            z,
            kind,
            meta: BTreeMap::new(),
        }
    }

    /// Attaches a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.meta.insert(key.into(), value.into());
        self
    }

    fn distance_squared(&self, x: f32, z: f32) -> f32 {
        let dx = self.x - x;
        let dz = self.z - z;
        dx * dx + dz * dz
    }
}

/// Disc query against the proximity index.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityQuery {
    /// Horizontal centre of the disc.
    pub x: f32,
    /// Depth centre of the disc.
    pub z: f32,
    /// Radius of the disc. Negative radii match nothing.
    pub radius: f32,
    /// Restricts matches to one entity kind.
    pub kind: Option<EntityKind>,
    /// Entity to leave out of the results, usually the requester.
    pub exclude_id: Option<String>,
    /// Maximum number of hits to return.
    pub limit: Option<usize>,
}

impl ProximityQuery {
    /// Creates an unfiltered query around a point.
    #[must_use]
    pub const fn new(x: f32, z: f32, radius: f32) -> Self {
        Self {
            x,
            z,
            radius,
            kind: None,
            exclude_id: None,
            limit: None,
        }
    }

    /// Restricts matches to the given kind.
    #[must_use]
    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Excludes the entity with the given identifier.
    #[must_use]
    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Caps the number of returned hits.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    fn accepts(&self, entity: &ProximityEntity) -> bool {
        if self.kind.is_some_and(|kind| kind != entity.kind) {
            return false;
        }
        self.exclude_id.as_deref() != Some(entity.id.as_str())
    }
}

/// Entity matched by a radius query together with its distance.
#[derive(Clone, Debug, PartialEq)]
pub struct ProximityHit {
    /// Snapshot of the matched entity.
    pub entity: ProximityEntity,
    /// Euclidean distance from the query centre.
    pub distance: f32,
}

type BucketKey = (i32, i32);

/// Spatial hash grid indexing entities by position.
#[derive(Clone, Debug)]
pub struct ProximityGrid {
    cell_size: f32,
    width: f32,
    depth: f32,
    buckets: HashMap<BucketKey, Vec<String>>,
    entities: HashMap<String, ProximityEntity>,
}

impl ProximityGrid {
    /// Creates an empty index covering a `width × depth` area.
    ///
    /// Non-positive or non-finite cell sizes fall back to `1.0`. The area only
    /// bounds how far [`ProximityGrid::find_nearest`] expands; entities outside
    /// it are still indexed.
    #[must_use]
    pub fn new(cell_size: f32, width: f32, depth: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            width: width.max(0.0),
            depth: depth.max(0.0),
            buckets: HashMap::new(),
            entities: HashMap::new(),
        }
    }

    /// Side length of one bucket.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Reports whether the index holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entity stored under the identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ProximityEntity> {
        self.entities.get(id)
    }

    /// Iterates over every indexed entity in unspecified order.
    pub fn entities(&self) -> impl Iterator<Item = &ProximityEntity> + '_ {
        self.entities.values()
    }

    /// Adds an entity, or moves it when its identifier is already present.
    pub fn insert(&mut self, entity: ProximityEntity) {
        if self.entities.contains_key(&entity.id) {
            let _ = self.remove(&entity.id);
        }
        let key = self.bucket_key(entity.x, entity.z);
        self.buckets.entry(key).or_default().push(entity.id.clone());
        let _ = self.entities.insert(entity.id.clone(), entity);
    }

    /// Removes an entity. Returns `false` when the identifier is unknown.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(entity) = self.entities.remove(id) else {
            return false;
        };
        let key = self.bucket_key(entity.x, entity.z);
        self.detach(key, id);
        true
    }

    /// Moves an entity. Returns `false` when the identifier is unknown.
    ///
    /// The bucket list is only edited when the entity crosses a cell boundary.
    pub fn update(&mut self, id: &str, x: f32, z: f32) -> bool {
        let new_key = self.bucket_key(x, z);
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        let old_key = bucket_key(self.cell_size, entity.x, entity.z);
        entity.x = x;
        entity.z = z;

        if old_key != new_key {
            self.detach(old_key, id);
            self.buckets.entry(new_key).or_default().push(id.to_owned());
        }
        true
    }

    /// Entities within the query disc, nearest first.
    ///
    /// Equal distances are ordered by identifier so results are reproducible.
    #[must_use]
    pub fn query_radius(&self, query: &ProximityQuery) -> Vec<ProximityHit> {
        if query.radius < 0.0 || query.limit == Some(0) {
            return Vec::new();
        }

        let (min_column, min_row) = self.bucket_key(query.x - query.radius, query.z - query.radius);
        let (max_column, max_row) = self.bucket_key(query.x + query.radius, query.z + query.radius);
        let radius_squared = query.radius * query.radius;

        let mut hits = Vec::new();
        for row in min_row..=max_row {
            for column in min_column..=max_column {
                let Some(bucket) = self.buckets.get(&(column, row)) else {
                    continue;
                };
                for id in bucket {
                    let Some(entity) = self.entities.get(id) else {
                        continue;
                    };
                    if !query.accepts(entity) {
                        continue;
                    }
                    let distance_squared = entity.distance_squared(query.x, query.z);
                    if distance_squared <= radius_squared {
                        hits.push(ProximityHit {
                            entity: entity.clone(),
                            distance: distance_squared.sqrt(),
                        });
                    }
                }
            }
        }

        hits.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.entity.id.cmp(&b.entity.id))
        });
        if let Some(limit) = query.limit {
            hits.truncate(limit);
        }
        hits
    }

    /// Closest entity to a point, optionally filtered by kind and excluding one id.
    ///
    /// The search radius starts at one cell and grows one cell at a time
    /// until a match appears or the radius exceeds the diagonal of the
    /// indexed area, so any entity inside the area is reachable from any
    /// point inside it.
    #[must_use]
    pub fn find_nearest(
        &self,
        x: f32,
        z: f32,
        kind: Option<EntityKind>,
        exclude_id: Option<&str>,
    ) -> Option<ProximityHit> {
        if self.entities.is_empty() {
            return None;
        }

        let extent = self.width.hypot(self.depth);
        let mut query = ProximityQuery {
            x,
            z,
            radius: self.cell_size,
            kind,
            exclude_id: exclude_id.map(str::to_owned),
            limit: Some(1),
        };

        loop {
            if let Some(hit) = self.query_radius(&query).into_iter().next() {
                tracing::trace!(radius = query.radius, id = %hit.entity.id, "nearest entity found");
                return Some(hit);
            }
            if query.radius > extent {
                return None;
            }
            query.radius += self.cell_size;
            tracing::trace!(radius = query.radius, "growing nearest search radius");
        }
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.entities.clear();
    }

    fn bucket_key(&self, x: f32, z: f32) -> BucketKey {
        bucket_key(self.cell_size, x, z)
    }

    fn detach(&mut self, key: BucketKey, id: &str) {
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return;
        };
        if let Some(position) = bucket.iter().position(|entry| entry == id) {
            let _ = bucket.swap_remove(position);
        }
        if bucket.is_empty() {
            let _ = self.buckets.remove(&key);
        }
    }
}

fn bucket_key(cell_size: f32, x: f32, z: f32) -> BucketKey {
    ((x / cell_size).floor() as i32, (z / cell_size).floor() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(id: &str, x: f32, z: f32) -> ProximityEntity {
        ProximityEntity::new(id, x, z, EntityKind::Bot)
    }

    fn bucket_sizes(grid: &ProximityGrid) -> usize {
        grid.buckets.values().map(Vec::len).sum()
    }

    #[test]
    fn reinserting_moves_instead_of_duplicating() {
        let mut grid = ProximityGrid::new(4.0, 20.0, 20.0);
        grid.insert(bot("bot-1", 1.0, 1.0));
        grid.insert(bot("bot-1", 13.0, 9.0));

        assert_eq!(grid.len(), 1);
        assert_eq!(bucket_sizes(&grid), 1);
        assert!(grid.buckets.contains_key(&(3, 2)));
        assert_eq!(grid.get("bot-1").map(|entity| (entity.x, entity.z)), Some((13.0, 9.0)));
    }

    #[test]
    fn update_rebuckets_only_across_cell_boundaries() {
        let mut grid = ProximityGrid::new(4.0, 20.0, 20.0);
        grid.insert(bot("bot-1", 1.0, 1.0));

        assert!(grid.update("bot-1", 3.5, 0.5));
        assert_eq!(grid.buckets.get(&(0, 0)).map(Vec::len), Some(1));

        assert!(grid.update("bot-1", 4.5, 0.5));
        assert!(!grid.buckets.contains_key(&(0, 0)));
        assert_eq!(grid.buckets.get(&(1, 0)).map(Vec::len), Some(1));

        assert!(!grid.update("ghost", 0.0, 0.0));
    }

    #[test]
    fn remove_reports_unknown_ids() {
        let mut grid = ProximityGrid::new(2.0, 10.0, 10.0);
        grid.insert(bot("bot-1", 1.0, 1.0));
        assert!(grid.remove("bot-1"));
        assert!(!grid.remove("bot-1"));
        assert!(grid.is_empty());
        assert!(grid.buckets.is_empty());
    }

    #[test]
    fn negative_coordinates_hash_below_zero() {
        assert_eq!(bucket_key(2.0, -0.5, 3.9), (-1, 1));
    }

    #[test]
    fn degenerate_cell_sizes_fall_back_to_unit_cells() {
        assert_eq!(ProximityGrid::new(0.0, 5.0, 5.0).cell_size(), 1.0);
        assert_eq!(ProximityGrid::new(f32::NAN, 5.0, 5.0).cell_size(), 1.0);
    }

    #[test]
    fn query_filters_and_limits() {
        let mut grid = ProximityGrid::new(2.0, 20.0, 20.0);
        grid.insert(bot("bot-1", 5.0, 5.0));
        grid.insert(bot("bot-2", 6.0, 5.0));
        grid.insert(
            ProximityEntity::new("plant", 5.5, 5.0, EntityKind::Prop).with_meta("zone", "center"),
        );

        let query = ProximityQuery::new(5.0, 5.0, 3.0).with_kind(EntityKind::Bot);
        let bots = grid.query_radius(&query);
        assert_eq!(bots.len(), 2);

        let others = grid.query_radius(&ProximityQuery::new(5.0, 5.0, 3.0).excluding("bot-1"));
        let ids: Vec<&str> = others.iter().map(|hit| hit.entity.id.as_str()).collect();
        assert_eq!(ids, vec!["plant", "bot-2"]);
        assert_eq!(others[0].entity.meta.get("zone").map(String::as_str), Some("center"));

        let first = grid.query_radius(&ProximityQuery::new(5.0, 5.0, 3.0).with_limit(1));
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].entity.id, "bot-1");
    }

    #[test]
    fn nearest_search_expands_until_a_match() {
        let mut grid = ProximityGrid::new(1.0, 20.0, 20.0);
        grid.insert(bot("far", 15.0, 15.0));
        grid.insert(bot("self", 1.0, 1.0));

        let hit = grid.find_nearest(1.0, 1.0, None, Some("self")).expect("far bot");
        assert_eq!(hit.entity.id, "far");
        assert!((hit.distance - 14.0 * std::f32::consts::SQRT_2).abs() < 1e-4);

        assert!(grid.find_nearest(1.0, 1.0, Some(EntityKind::Door), None).is_none());
    }

    #[test]
    fn clear_empties_the_index() {
        let mut grid = ProximityGrid::new(1.0, 4.0, 4.0);
        grid.insert(bot("bot-1", 1.0, 1.0));
        grid.clear();
        assert_eq!(grid.len(), 0);
        assert!(grid.find_nearest(1.0, 1.0, None, None).is_none());
    }
}
