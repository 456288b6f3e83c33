//! Spatial Query Index
//!
//! A per-tick index of entity positions answering bounded radius queries.
//! This is the simulation's stand-in for the host's world spatial-query
//! service: both controllers call it, neither mutates it structurally.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::listener::Position;

/// Maximum candidates examined by a single radius query. Bounds per-tick
/// cost regardless of world population.
pub const MAX_SCAN_CANDIDATES: usize = 16;

/// Resource: Positions of all entities, rebuilt each tick.
#[derive(Resource, Debug, Default)]
pub struct SpatialIndex {
    entries: Vec<(Entity, Vec3)>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all entries (called before rebuilding)
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, entity: Entity, position: Vec3) {
        self.entries.push((entity, position));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve an entity's position. A `None` means the reference has gone
    /// stale and the caller should evict it.
    pub fn position_of(&self, entity: Entity) -> Option<Vec3> {
        self.entries
            .iter()
            .find(|(e, _)| *e == entity)
            .map(|(_, p)| *p)
    }

    /// Entities within `radius` of `center`, excluding `exclude`. At most
    /// `max_candidates` entries are examined, so entries past the cap are
    /// never considered even when they would match.
    pub fn within_radius(
        &self,
        center: Vec3,
        radius: f32,
        max_candidates: usize,
        exclude: Option<Entity>,
    ) -> Vec<(Entity, Vec3)> {
        let radius_sq = radius * radius;
        self.entries
            .iter()
            .take(max_candidates)
            .filter(|(e, p)| Some(*e) != exclude && p.distance_squared(center) <= radius_sq)
            .copied()
            .collect()
    }
}

/// System: Rebuild the spatial index from entity positions.
/// Runs early so that all controllers query a consistent snapshot.
pub fn build_spatial_index(mut index: ResMut<SpatialIndex>, query: Query<(Entity, &Position)>) {
    index.clear();
    for (entity, position) in query.iter() {
        index.insert(entity, position.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(points: &[(u32, Vec3)]) -> SpatialIndex {
        let mut index = SpatialIndex::new();
        for (raw, p) in points {
            index.insert(Entity::from_raw(*raw), *p);
        }
        index
    }

    #[test]
    fn test_within_radius() {
        let index = index_with(&[
            (1, Vec3::new(1.0, 0.0, 0.0)),
            (2, Vec3::new(10.0, 0.0, 0.0)),
            (3, Vec3::new(0.0, 0.0, 4.0)),
        ]);

        let found = index.within_radius(Vec3::ZERO, 5.0, 16, None);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|(e, _)| *e != Entity::from_raw(2)));
    }

    #[test]
    fn test_exclude_self() {
        let index = index_with(&[(1, Vec3::ZERO), (2, Vec3::new(1.0, 0.0, 0.0))]);

        let found = index.within_radius(Vec3::ZERO, 5.0, 16, Some(Entity::from_raw(1)));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, Entity::from_raw(2));
    }

    #[test]
    fn test_result_cap() {
        let points: Vec<(u32, Vec3)> = (0..100)
            .map(|i| (i, Vec3::new(i as f32 * 0.01, 0.0, 0.0)))
            .collect();
        let index = index_with(&points);

        let found = index.within_radius(Vec3::ZERO, 10.0, MAX_SCAN_CANDIDATES, None);
        assert_eq!(found.len(), MAX_SCAN_CANDIDATES);
    }

    #[test]
    fn test_cap_bounds_examined_candidates() {
        // Cap-many misses first, then a hit the scan must never reach
        let mut points: Vec<(u32, Vec3)> = (0..MAX_SCAN_CANDIDATES as u32)
            .map(|i| (i, Vec3::new(100.0 + i as f32, 0.0, 0.0)))
            .collect();
        points.push((99, Vec3::ZERO));
        let index = index_with(&points);

        let found = index.within_radius(Vec3::ZERO, 5.0, MAX_SCAN_CANDIDATES, None);
        assert!(found.is_empty());
    }

    #[test]
    fn test_stale_reference_resolves_to_none() {
        let index = index_with(&[(1, Vec3::ZERO)]);
        assert!(index.position_of(Entity::from_raw(1)).is_some());
        assert!(index.position_of(Entity::from_raw(42)).is_none());
    }
}
