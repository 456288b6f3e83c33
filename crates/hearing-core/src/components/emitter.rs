//! Sound Emitter Components
//!
//! Marker components describing what kinds of sound an entity can produce.
//! The attention filter tracks any character (footsteps, voices) and any
//! entity carrying a weapon emitter (combat sounds); the dampening
//! controller polls weapon emitters for recent discharges.

use bevy_ecs::prelude::*;

/// Marker: A character entity (produces footsteps, voices, combat sounds)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Character;

/// Marker: Entity has movement capability and therefore produces footsteps
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Mobility;

/// Marker: Entity can discharge a weapon (combat sound emitter)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct WeaponEmitter;

/// Marker: A live projectile, used by the cheap proximity probe that
/// detects a weapon the instant it fires
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Projectile;
