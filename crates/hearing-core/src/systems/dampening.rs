//! Transient Dampening Systems
//!
//! Event- and poll-driven safety response to explosions and nearby weapon
//! discharges. On a trigger the listener's dampening contribution drops to
//! the dampen multiplier for a short episode, then returns to the
//! quiet-period boost. Missing dependencies make every operation a silent
//! no-op; this layer is cosmetic, not safety-critical.

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::debug;

use crate::components::dampening::{DampenCause, DampeningState, TransientDampening};
use crate::components::emitter::{Projectile, WeaponEmitter};
use crate::components::listener::{Position, RangeContributions};
use crate::config::HearingConfig;
use crate::systems::clock::SimClock;
use crate::systems::spatial::{SpatialIndex, MAX_SCAN_CANDIDATES};

/// Constants for weapon-sound detection
pub mod fire_constants {
    /// A weapon counts as "just fired" if a record exists within this window (seconds)
    pub const RECENT_FIRE_WINDOW: f32 = 0.3;
    /// Radius of the cheap projectile probe around a weapon's position (meters)
    pub const PROJECTILE_PROBE_RADIUS: f32 = 2.0;
    /// Fire records older than this are purged (seconds)
    pub const FIRE_RECORD_TTL: f32 = 2.0;
    /// Interval between purge passes (seconds)
    pub const PURGE_INTERVAL: f32 = 1.0;
}

/// Type of explosion reported by the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionKind {
    Grenade,
    Shell,
    Mine,
    Other,
}

/// A world-level explosion notification.
#[derive(Debug, Clone)]
pub struct ExplosionNotice {
    /// Entity that caused the explosion, if known
    pub source: Option<Entity>,
    pub position: Vec3,
    pub raw_damage: f32,
    pub radius: f32,
    pub kind: ExplosionKind,
}

/// Resource: Queue of explosion notices to process.
#[derive(Resource, Debug, Default)]
pub struct ExplosionQueue {
    pub notices: Vec<ExplosionNotice>,
}

impl ExplosionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: ExplosionNotice) {
        self.notices.push(notice);
    }

    pub fn drain(&mut self) -> Vec<ExplosionNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

/// System: React to explosion notices.
///
/// An explosion within the trigger radius of a listener starts a dampening
/// episode, provided the shared cooldown has elapsed. Triggers arriving
/// during the cooldown are silently dropped (anti-flicker, not a failure).
pub fn process_explosions(
    clock: Res<SimClock>,
    config: Res<HearingConfig>,
    mut queue: ResMut<ExplosionQueue>,
    mut listeners: Query<(&Position, &mut TransientDampening, &mut RangeContributions)>,
) {
    let notices = queue.drain();
    if notices.is_empty() {
        return;
    }

    let now = clock.now();
    for notice in &notices {
        for (position, mut dampening, mut contributions) in listeners.iter_mut() {
            if !dampening.can_trigger(now, config.dampening.cooldown) {
                continue;
            }

            let distance = position.distance_to(notice.position);
            if distance <= config.dampening.explosion_trigger_radius {
                dampening.trigger(now, config.dampening.explosion_duration, DampenCause::Explosion);
                contributions.dampening = config.dampening.dampen_multiplier;
                debug!(distance, kind = ?notice.kind, "explosion triggered dampening");
            }
        }
    }
}

/// System: Poll for nearby weapon discharges.
///
/// For each weapon-bearing entity within the trigger radius, a recent fire
/// record or a projectile near the weapon's position counts as "just
/// fired" and starts a weapon-sound dampening episode. Scans are capped at
/// [`MAX_SCAN_CANDIDATES`] per call.
pub fn poll_weapon_sounds(
    clock: Res<SimClock>,
    config: Res<HearingConfig>,
    index: Res<SpatialIndex>,
    weapons: Query<(), With<WeaponEmitter>>,
    projectiles: Query<(), With<Projectile>>,
    mut listeners: Query<(Entity, &Position, &mut TransientDampening, &mut RangeContributions)>,
) {
    if !config.dampening.detect_weapon_sounds {
        return;
    }
    if !clock.interval_elapsed(config.dampening.poll_interval) {
        return;
    }

    let now = clock.now();
    for (listener, position, mut dampening, mut contributions) in listeners.iter_mut() {
        if !dampening.can_trigger(now, config.dampening.cooldown) {
            continue;
        }

        let candidates = index.within_radius(
            position.0,
            config.dampening.weapon_trigger_radius,
            MAX_SCAN_CANDIDATES,
            Some(listener),
        );

        for (candidate, weapon_pos) in candidates {
            if weapons.get(candidate).is_err() {
                continue;
            }

            // A recent fire record triggers immediately
            if dampening.fired_recently(candidate, now, fire_constants::RECENT_FIRE_WINDOW) {
                dampening.trigger(now, config.dampening.weapon_duration, DampenCause::WeaponFire);
                contributions.dampening = config.dampening.dampen_multiplier;
                debug!(weapon = ?candidate, "recent weapon fire triggered dampening");
                break;
            }

            // Otherwise probe a small radius around the weapon for a projectile
            let probe = index.within_radius(
                weapon_pos,
                fire_constants::PROJECTILE_PROBE_RADIUS,
                MAX_SCAN_CANDIDATES,
                Some(candidate),
            );
            if probe.iter().any(|(e, _)| projectiles.get(*e).is_ok()) {
                dampening.record_fire(candidate, now);
                dampening.trigger(now, config.dampening.weapon_duration, DampenCause::WeaponFire);
                contributions.dampening = config.dampening.dampen_multiplier;
                debug!(weapon = ?candidate, "projectile probe triggered dampening");
                break;
            }
        }
    }
}

/// System: End dampening episodes whose deadline has passed.
///
/// A deadline firing after teardown is harmless: the controller component
/// is gone, so there is nothing to restore.
pub fn expire_dampening(
    clock: Res<SimClock>,
    config: Res<HearingConfig>,
    mut listeners: Query<(&mut TransientDampening, &mut RangeContributions)>,
) {
    let now = clock.now();
    for (mut dampening, mut contributions) in listeners.iter_mut() {
        if dampening.try_restore(now) {
            contributions.dampening = config.dampening.boost_multiplier;
            debug!("dampening episode ended, boost restored");
        }
    }
}

/// System: Periodically evict stale weapon-fire records.
pub fn purge_stale_fire_records(clock: Res<SimClock>, mut listeners: Query<&mut TransientDampening>) {
    if !clock.interval_elapsed(fire_constants::PURGE_INTERVAL) {
        return;
    }

    let now = clock.now();
    for mut dampening in listeners.iter_mut() {
        if dampening.state == DampeningState::Inactive {
            continue;
        }
        dampening.purge_fire_records(now, fire_constants::FIRE_RECORD_TTL);
    }
}
