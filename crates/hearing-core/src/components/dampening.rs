//! Transient Dampening Components
//!
//! State for the event-driven controller that boosts ambience during quiet
//! periods and sharply suppresses hearing after loud transient events.

use bevy_ecs::prelude::*;
use std::collections::HashMap;

/// Lifecycle state of a transient dampening controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DampeningState {
    /// Not initialized or torn down
    #[default]
    Inactive,
    /// Listening for triggers; quiet-period boost applied
    Active,
    /// Temporarily suppressed after a loud event
    Dampened,
}

/// What triggered a dampening episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DampenCause {
    Explosion,
    WeaponFire,
}

impl DampenCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DampenCause::Explosion => "explosion",
            DampenCause::WeaponFire => "weapon_fire",
        }
    }
}

/// Component: Per-listener transient dampening controller state.
///
/// Mutated only by the dampening systems. The recent-fire table debounces
/// repeated weapon-sound triggers; it is owned exclusively by this
/// controller instance and cleared entirely on deactivation.
#[derive(Component, Debug, Clone)]
pub struct TransientDampening {
    pub state: DampeningState,
    /// Simulated seconds of the last accepted trigger
    pub last_trigger: f32,
    /// Deadline (simulated seconds) at which the current episode ends
    pub restore_at: Option<f32>,
    /// Cause of the current or most recent episode
    pub last_cause: Option<DampenCause>,
    /// Weapon entity -> last observed fire time
    pub recent_fire: HashMap<Entity, f32>,
}

impl TransientDampening {
    /// Controller in the Active state, as entered on successful attach.
    pub fn active() -> Self {
        Self {
            state: DampeningState::Active,
            // Allow a trigger immediately after activation
            last_trigger: f32::NEG_INFINITY,
            restore_at: None,
            last_cause: None,
            recent_fire: HashMap::new(),
        }
    }

    /// True when a new trigger is allowed: the controller is initialized
    /// and the shared cooldown since the previous trigger has elapsed.
    pub fn can_trigger(&self, now: f32, cooldown: f32) -> bool {
        self.state != DampeningState::Inactive && now - self.last_trigger >= cooldown
    }

    /// Enter the Dampened state for `duration` seconds.
    pub fn trigger(&mut self, now: f32, duration: f32, cause: DampenCause) {
        self.state = DampeningState::Dampened;
        self.last_trigger = now;
        self.restore_at = Some(now + duration);
        self.last_cause = Some(cause);
    }

    /// If the current episode has run its course, return to Active.
    /// Returns true when a restore happened this call.
    pub fn try_restore(&mut self, now: f32) -> bool {
        if self.state != DampeningState::Dampened {
            return false;
        }
        match self.restore_at {
            Some(deadline) if now >= deadline => {
                self.state = DampeningState::Active;
                self.restore_at = None;
                true
            }
            _ => false,
        }
    }

    /// Record a weapon discharge observation.
    pub fn record_fire(&mut self, weapon: Entity, now: f32) {
        self.recent_fire.insert(weapon, now);
    }

    /// True when the weapon fired within `window` seconds of `now`.
    pub fn fired_recently(&self, weapon: Entity, now: f32, window: f32) -> bool {
        self.recent_fire
            .get(&weapon)
            .is_some_and(|&t| now - t < window)
    }

    /// Evict fire records older than `ttl` seconds.
    pub fn purge_fire_records(&mut self, now: f32, ttl: f32) {
        self.recent_fire.retain(|_, &mut t| now - t <= ttl);
    }

    /// Tear down: cancel the pending restore and clear auxiliary tables.
    pub fn deactivate(&mut self) {
        self.state = DampeningState::Inactive;
        self.restore_at = None;
        self.last_cause = None;
        self.recent_fire.clear();
    }
}
