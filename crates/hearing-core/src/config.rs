//! Configuration loading for the hearing controllers.
//!
//! All externally supplied settings are loaded from a TOML configuration
//! file; every field has a default matching the shipped tuning.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Complete configuration for both controllers.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HearingConfig {
    /// Simulation timing
    pub clock: ClockConfig,
    /// Transient dampening controller settings
    pub dampening: DampeningConfig,
    /// Spatial attention filter settings
    pub attention: AttentionConfig,
}

impl HearingConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Serializes this configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Simulation clock settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one simulation tick in seconds
    pub tick_seconds: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { tick_seconds: 0.05 }
    }
}

/// Transient dampening controller configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DampeningConfig {
    /// Auditory range multiplier during quiet periods
    pub boost_multiplier: f32,
    /// Auditory range multiplier while dampened after a loud event
    pub dampen_multiplier: f32,
    /// Maximum distance (meters) from an explosion that triggers dampening
    pub explosion_trigger_radius: f32,
    /// How long explosion dampening lasts (seconds)
    pub explosion_duration: f32,
    /// Enable the weapon-discharge detection poll
    pub detect_weapon_sounds: bool,
    /// Maximum distance (meters) from weapon fire that triggers dampening
    pub weapon_trigger_radius: f32,
    /// How long weapon-sound dampening lasts (seconds)
    pub weapon_duration: f32,
    /// Minimum time between dampening triggers (seconds), shared by both
    /// trigger paths to prevent rapid toggling
    pub cooldown: f32,
    /// Interval between weapon-sound polls (seconds)
    pub poll_interval: f32,
}

impl Default for DampeningConfig {
    fn default() -> Self {
        Self {
            boost_multiplier: 1.75,
            dampen_multiplier: 0.25,
            explosion_trigger_radius: 25.0,
            explosion_duration: 0.4,
            detect_weapon_sounds: true,
            weapon_trigger_radius: 15.0,
            weapon_duration: 0.2,
            cooldown: 0.5,
            poll_interval: 0.05,
        }
    }
}

/// Spatial attention filter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AttentionConfig {
    /// Attention cone angle in degrees; sounds within the half-angle of the
    /// facing direction count as foreground
    pub cone_angle: f32,
    /// Enhancement multiplier for sounds in the attention cone
    pub front_multiplier: f32,
    /// Suppression floor for sounds outside the attention cone
    pub background_multiplier: f32,
    /// Enhance voice/communication sounds
    pub enhance_voices: bool,
    /// Enhance footsteps and movement sounds
    pub enhance_movement: bool,
    /// Enhance combat sounds
    pub enhance_combat: bool,
    /// Multiplier for important sound categories
    pub important_multiplier: f32,
    /// Inhibitory strength for competing sounds (0 = none, 1 = maximum)
    pub inhibitory_strength: f32,
    /// Maximum number of concurrently tracked sound sources
    pub max_tracked_sources: usize,
    /// Temporal analysis window in seconds; entries older than twice this
    /// are evicted
    pub temporal_window: f32,
    /// Enhance sounds that persist over time (currently a documented knob
    /// with no effect on the algorithm)
    pub use_temporal_coherence: bool,
    /// Enable adaptive learning of the attention cone
    pub adaptive_learning: bool,
    /// Adaptation rate for learned parameters (0 = frozen, 1 = instant)
    pub adaptation_rate: f32,
}

impl Default for AttentionConfig {
    fn default() -> Self {
        Self {
            cone_angle: 45.0,
            front_multiplier: 2.0,
            background_multiplier: 0.5,
            enhance_voices: true,
            enhance_movement: true,
            enhance_combat: true,
            important_multiplier: 1.5,
            inhibitory_strength: 0.7,
            max_tracked_sources: 10,
            temporal_window: 0.1,
            use_temporal_coherence: true,
            adaptive_learning: false,
            adaptation_rate: 0.3,
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// Error serializing TOML config
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Generates a default configuration file content.
pub fn default_config_toml() -> String {
    r#"# Hearing Controller Configuration

[clock]
tick_seconds = 0.05

[dampening]
boost_multiplier = 1.75
dampen_multiplier = 0.25
explosion_trigger_radius = 25.0
explosion_duration = 0.4
detect_weapon_sounds = true
weapon_trigger_radius = 15.0
weapon_duration = 0.2
cooldown = 0.5
poll_interval = 0.05

[attention]
cone_angle = 45.0
front_multiplier = 2.0
background_multiplier = 0.5
enhance_voices = true
enhance_movement = true
enhance_combat = true
important_multiplier = 1.5
inhibitory_strength = 0.7
max_tracked_sources = 10
temporal_window = 0.1
use_temporal_coherence = true
adaptive_learning = false
adaptation_rate = 0.3
"#
    .to_string()
}
