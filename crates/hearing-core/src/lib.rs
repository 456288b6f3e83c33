//! Auditory perception modulation engine.
//!
//! Two cooperating controllers shape a simulated listener's effective
//! hearing range each tick: a transient dampening controller that boosts
//! quiet ambience and sharply suppresses after loud events, and a spatial
//! attention filter ("BOSSA") that biases the range toward sound sources
//! inside the listener's forward attention cone.
//!
//! Both controllers publish named contributions which a single combiner
//! folds into one range write per tick.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod components;
pub mod config;
pub mod setup;
pub mod systems;
pub mod telemetry;

pub use components::*;
pub use config::HearingConfig;
pub use telemetry::RangeLog;

/// Seeded random number generator resource
#[derive(Resource)]
pub struct SimRng(pub SmallRng);
