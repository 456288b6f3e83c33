//! World Setup
//!
//! Resource initialization and entity spawning helpers shared by the demo
//! binary and the integration tests.

use bevy_ecs::prelude::*;
use glam::Vec3;

use crate::components::emitter::{Character, Mobility, Projectile, WeaponEmitter};
use crate::components::listener::{Facing, ListenerId, Perception, Position};
use crate::config::HearingConfig;
use crate::systems::attachment::{EquipmentQueue, ListenerRegistry};
use crate::systems::clock::SimClock;
use crate::systems::dampening::ExplosionQueue;
use crate::systems::spatial::SpatialIndex;
use crate::telemetry::RangeLog;

/// Insert all resources the tick schedule expects.
///
/// The telemetry log defaults to the null writer; replace it afterwards to
/// capture a JSONL stream.
pub fn init_resources(world: &mut World, config: HearingConfig) {
    world.insert_resource(SimClock::new(config.clock.tick_seconds));
    world.insert_resource(SpatialIndex::new());
    world.insert_resource(EquipmentQueue::new());
    world.insert_resource(ListenerRegistry::new());
    world.insert_resource(ExplosionQueue::new());
    world.insert_resource(RangeLog::null());
    world.insert_resource(config);
}

/// Spawn a listener with a perception capability.
pub fn spawn_listener(
    world: &mut World,
    id: impl Into<String>,
    position: Vec3,
    facing: Vec3,
    auditory_range: f32,
) -> Entity {
    world
        .spawn((
            ListenerId::new(id),
            Position(position),
            Facing::new(facing),
            Perception::new(auditory_range),
            Character,
            Mobility,
        ))
        .id()
}

/// Spawn a walking character (footstep source).
pub fn spawn_character(world: &mut World, position: Vec3) -> Entity {
    world.spawn((Position(position), Character, Mobility)).id()
}

/// Spawn a character that is standing still (voice source, no footsteps).
pub fn spawn_idle_character(world: &mut World, position: Vec3) -> Entity {
    world.spawn((Position(position), Character)).id()
}

/// Spawn an armed character (combat and footstep source).
pub fn spawn_shooter(world: &mut World, position: Vec3) -> Entity {
    world
        .spawn((Position(position), Character, Mobility, WeaponEmitter))
        .id()
}

/// Spawn a standalone weapon emitter (e.g. a static gun emplacement).
pub fn spawn_weapon(world: &mut World, position: Vec3) -> Entity {
    world.spawn((Position(position), WeaponEmitter)).id()
}

/// Spawn a projectile near a weapon's muzzle.
pub fn spawn_projectile(world: &mut World, position: Vec3) -> Entity {
    world.spawn((Position(position), Projectile)).id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_resources() {
        let mut world = World::new();
        init_resources(&mut world, HearingConfig::default());

        assert!(world.get_resource::<SimClock>().is_some());
        assert!(world.get_resource::<SpatialIndex>().is_some());
        assert!(world.get_resource::<HearingConfig>().is_some());
        assert!(world.get_resource::<ListenerRegistry>().is_some());
    }

    #[test]
    fn test_spawn_listener_components() {
        let mut world = World::new();
        let listener = spawn_listener(&mut world, "listener_0001", Vec3::ZERO, Vec3::Z, 50.0);

        let perception = world.get::<Perception>(listener).unwrap();
        assert_eq!(perception.auditory_range(), 50.0);
        assert!(world.get::<Facing>(listener).is_some());
    }
}
