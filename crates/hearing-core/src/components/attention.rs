//! Spatial Attention Components
//!
//! State for the continuous spatial/selective filter ("BOSSA"): the bounded
//! table of currently relevant sound sources plus the cached and learned
//! parameters of the listener's attention cone.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// One currently-relevant sound emitting entity.
///
/// The entity reference is weak: the table never owns the entity's
/// lifetime, and a reference that no longer resolves is evicted on the
/// next refresh.
#[derive(Debug, Clone, Copy)]
pub struct TrackedSource {
    pub entity: Entity,
    /// Last known distance in meters
    pub distance: f32,
    /// Angle from the listener's facing direction in degrees
    pub angle_deg: f32,
    /// Derived intensity scalar (inverse-distance falloff with category
    /// boosts, not physical sound pressure)
    pub intensity: f32,
    /// Important category: voice, movement, or combat
    pub important: bool,
    /// Specifically a footstep/movement source
    pub footstep: bool,
    /// Simulated seconds of the last refresh
    pub last_update: f32,
}

/// Component: Per-listener spatial attention filter state.
#[derive(Component, Debug, Clone)]
pub struct SpatialAttention {
    /// Bounded table of tracked sources, at most one entry per entity
    pub sources: Vec<TrackedSource>,
    /// Cached forward vector, refreshed at a lower rate
    pub cached_facing: Vec3,
    /// Simulated seconds of the last facing refresh
    pub last_facing_refresh: f32,
    /// Counter for staggered full refreshes of the source table
    pub stagger: u32,
    /// Attention-cone angle adjusted by adaptive learning (degrees)
    pub learned_cone_angle: f32,
    /// Enhancement level adjusted by adaptive learning
    pub learned_enhancement: f32,
    /// Directional factor computed by spatial filtering this tick
    pub spatial_factor: f32,
    /// Highest-priority source this tick (advisory/diagnostic)
    pub dominant: Option<Entity>,
    /// Last dominant source reported to telemetry
    pub last_reported_dominant: Option<Entity>,
}

impl SpatialAttention {
    /// Filter state as entered on attach: learned parameters start at the
    /// configured ones, the facing cache is seeded from the listener.
    pub fn new(facing: Vec3, cone_angle: f32, enhancement: f32) -> Self {
        Self {
            sources: Vec::new(),
            cached_facing: facing,
            last_facing_refresh: 0.0,
            stagger: 0,
            learned_cone_angle: cone_angle,
            learned_enhancement: enhancement,
            spatial_factor: 1.0,
            dominant: None,
            last_reported_dominant: None,
        }
    }

    pub fn find_mut(&mut self, entity: Entity) -> Option<&mut TrackedSource> {
        self.sources.iter_mut().find(|s| s.entity == entity)
    }

    pub fn is_tracked(&self, entity: Entity) -> bool {
        self.sources.iter().any(|s| s.entity == entity)
    }

    /// Insert or update a source, honoring the capacity bound. Returns
    /// false when the table is full and the entity was not already tracked.
    pub fn upsert(&mut self, source: TrackedSource, max_sources: usize) -> bool {
        if let Some(existing) = self.find_mut(source.entity) {
            *existing = source;
            return true;
        }
        if self.sources.len() >= max_sources {
            return false;
        }
        self.sources.push(source);
        true
    }

    /// Evict entries older than `max_age` seconds.
    pub fn evict_stale(&mut self, now: f32, max_age: f32) {
        self.sources.retain(|s| now - s.last_update <= max_age);
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(raw: u32, last_update: f32) -> TrackedSource {
        TrackedSource {
            entity: Entity::from_raw(raw),
            distance: 10.0,
            angle_deg: 0.0,
            intensity: 0.5,
            important: false,
            footstep: false,
            last_update,
        }
    }

    #[test]
    fn test_capacity_bound() {
        let mut attention = SpatialAttention::new(Vec3::Z, 45.0, 2.0);

        for i in 0..20 {
            attention.upsert(source(i, 1.0), 10);
        }
        assert_eq!(attention.len(), 10);

        // Updating an already-tracked entity succeeds even at capacity
        assert!(attention.upsert(source(3, 2.0), 10));
        assert_eq!(attention.len(), 10);

        // A new entity is rejected
        assert!(!attention.upsert(source(99, 2.0), 10));
    }

    #[test]
    fn test_one_entry_per_entity() {
        let mut attention = SpatialAttention::new(Vec3::Z, 45.0, 2.0);
        attention.upsert(source(1, 1.0), 10);
        attention.upsert(source(1, 2.0), 10);

        assert_eq!(attention.len(), 1);
        assert_eq!(attention.sources[0].last_update, 2.0);
    }

    #[test]
    fn test_evict_stale() {
        let mut attention = SpatialAttention::new(Vec3::Z, 45.0, 2.0);
        attention.upsert(source(1, 1.0), 10);
        attention.upsert(source(2, 4.9), 10);

        // max_age of 2x a 0.1s temporal window
        attention.evict_stale(5.0, 0.2);
        assert_eq!(attention.len(), 1);
        assert_eq!(attention.sources[0].entity, Entity::from_raw(2));
    }
}
