//! Listener Components
//!
//! Components for the simulated agent whose hearing is being modulated:
//! its spatial state, its host-owned perception capability, and the
//! per-listener context captured when the controllers attach.

use bevy_ecs::prelude::*;
use glam::Vec3;

/// Component: Stable string identifier for a listener
#[derive(Component, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerId(pub String);

impl ListenerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Component: An entity's position in world space (meters)
#[derive(Component, Debug, Clone, Copy)]
pub struct Position(pub Vec3);

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Vec3::new(x, y, z))
    }

    pub fn distance_to(&self, other: Vec3) -> f32 {
        self.0.distance(other)
    }
}

/// Component: A listener's facing direction (unit vector)
#[derive(Component, Debug, Clone, Copy)]
pub struct Facing(pub Vec3);

impl Facing {
    pub fn new(dir: Vec3) -> Self {
        Self(dir.normalize_or_zero())
    }

    /// Default forward direction along +Z.
    pub fn forward() -> Self {
        Self(Vec3::Z)
    }
}

/// Component: The host-owned perception capability.
///
/// Exposes get/set of the effective auditory range. The controllers call
/// it; they never own it. Lookup goes through a typed component query
/// rather than a nullable cast chain.
#[derive(Component, Debug, Clone, Copy)]
pub struct Perception {
    auditory_range: f32,
}

impl Perception {
    pub fn new(auditory_range: f32) -> Self {
        Self { auditory_range }
    }

    pub fn auditory_range(&self) -> f32 {
        self.auditory_range
    }

    pub fn set_auditory_range(&mut self, range: f32) {
        self.auditory_range = range;
    }
}

/// Component: Per-listener context captured once at activation.
///
/// The baseline range is immutable for the lifetime of the attachment;
/// teardown restores the capability to exactly this value.
#[derive(Component, Debug, Clone, Copy)]
pub struct ListenerContext {
    /// Auditory range captured at attach time
    pub baseline: f32,
    /// Simulated seconds at attach time
    pub activated_at: f32,
}

impl ListenerContext {
    pub fn new(baseline: f32, activated_at: f32) -> Self {
        Self {
            baseline,
            activated_at,
        }
    }
}

/// The factors last folded into the perception capability, kept so the
/// combiner only writes (and logs) on change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedRange {
    pub dampening: f32,
    pub attention: f32,
    pub range: f32,
}

/// Component: Named range contributions from the two controllers.
///
/// The dampening controller and the attention filter each own one factor;
/// neither writes the perception capability directly. A single combiner
/// system computes `baseline * dampening * attention` once per tick, which
/// makes the final value deterministic regardless of controller ordering.
#[derive(Component, Debug, Clone)]
pub struct RangeContributions {
    /// Transient dampening factor (boost during quiet periods, dampen after
    /// loud events)
    pub dampening: f32,
    /// Spatial attention factor (directional enhancement/suppression plus
    /// selective boosts)
    pub attention: f32,
    /// What the combiner last applied, if anything
    pub applied: Option<AppliedRange>,
}

impl RangeContributions {
    pub fn new(dampening: f32) -> Self {
        Self {
            dampening,
            attention: 1.0,
            applied: None,
        }
    }

    /// The combined factor against baseline.
    pub fn combined(&self) -> f32 {
        self.dampening * self.attention
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perception_get_set() {
        let mut perception = Perception::new(50.0);
        assert_eq!(perception.auditory_range(), 50.0);

        perception.set_auditory_range(87.5);
        assert_eq!(perception.auditory_range(), 87.5);
    }

    #[test]
    fn test_facing_normalizes() {
        let facing = Facing::new(Vec3::new(0.0, 0.0, 10.0));
        assert!((facing.0.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_contributions_combined() {
        let mut contributions = RangeContributions::new(1.75);
        assert!((contributions.combined() - 1.75).abs() < 1e-6);

        contributions.dampening = 0.25;
        contributions.attention = 2.0;
        assert!((contributions.combined() - 0.5).abs() < 1e-6);
    }
}
