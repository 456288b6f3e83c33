//! Spatial Attention Systems ("BOSSA")
//!
//! Biologically-inspired spatial and selective filtering: tracks nearby
//! sound sources, enhances those inside the listener's forward attention
//! cone, suppresses background noise through inhibitory filtering, boosts
//! important categories (footsteps above all), and optionally adapts the
//! cone toward where important sounds actually occur.

use bevy_ecs::prelude::*;
use glam::Vec3;
use tracing::trace;

use crate::components::attention::{SpatialAttention, TrackedSource};
use crate::components::emitter::{Character, Mobility, WeaponEmitter};
use crate::components::listener::{Facing, ListenerContext, Position, RangeContributions};
use crate::config::{AttentionConfig, HearingConfig};
use crate::systems::clock::SimClock;
use crate::systems::spatial::SpatialIndex;

/// Constants for the attention pipeline
pub mod attention_constants {
    /// Full source-table refreshes happen every Nth tick
    pub const STAGGER_INTERVAL: u32 = 3;
    /// Cached facing direction refresh interval (seconds)
    pub const FACING_REFRESH_INTERVAL: f32 = 0.1;
    /// Existing sources are refreshed off-stagger when their distance
    /// moved by more than this (meters)
    pub const DISTANCE_REFRESH_THRESHOLD: f32 = 2.0;
    /// Discovery search radius = baseline range times this factor
    pub const SEARCH_RADIUS_FACTOR: f32 = 1.5;
    /// Candidates processed per discovery scan
    pub const DISCOVERY_SCAN_CAP: usize = 32;
    /// Intensity boost for footstep sources
    pub const FOOTSTEP_INTENSITY_BOOST: f32 = 2.5;
    /// Additional boost for footsteps closer than `NEAR_FOOTSTEP_RANGE`
    pub const NEAR_FOOTSTEP_BOOST: f32 = 1.3;
    pub const NEAR_FOOTSTEP_RANGE: f32 = 30.0;
    /// Intensity boost for other important sources
    pub const IMPORTANT_INTENSITY_BOOST: f32 = 1.5;
    /// Extra selective-attention factor on top of the important multiplier
    /// when an in-cone footstep exists
    pub const FOOTSTEP_ATTENTION_EXTRA: f32 = 1.4;
    /// Dominance ranking weights
    pub const DOMINANT_FOOTSTEP_WEIGHT: f32 = 3.0;
    pub const DOMINANT_IMPORTANT_WEIGHT: f32 = 2.0;
    pub const DOMINANT_CONE_WEIGHT: f32 = 1.5;
    /// Bounds for the learned attention cone (degrees)
    pub const MIN_LEARNED_CONE: f32 = 30.0;
    pub const MAX_LEARNED_CONE: f32 = 90.0;
}

use attention_constants::*;

/// Angle in degrees between a listener's facing direction and the
/// direction toward a source position.
///
/// Degenerate inputs (zero-length vectors) fall back to 0 degrees.
pub fn angle_from_facing(facing: Vec3, listener_pos: Vec3, source_pos: Vec3) -> f32 {
    let to_source = source_pos - listener_pos;
    if to_source.length_squared() < 1e-6 || facing.length_squared() < 1e-6 {
        return 0.0;
    }
    let dot = to_source.normalize().dot(facing.normalize());
    dot.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Simplified inverse-distance intensity with category boosts. Not
/// physical sound pressure.
pub fn source_intensity(distance: f32, footstep: bool, important: bool) -> f32 {
    let mut intensity = 1.0 / (1.0 + distance * 0.1);
    if footstep {
        intensity *= FOOTSTEP_INTENSITY_BOOST;
        if distance < NEAR_FOOTSTEP_RANGE {
            intensity *= NEAR_FOOTSTEP_BOOST;
        }
    } else if important {
        intensity *= IMPORTANT_INTENSITY_BOOST;
    }
    intensity
}

/// Emitter capability flags resolved for one candidate entity.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitterFlags {
    pub character: bool,
    pub mobility: bool,
    pub weapon: bool,
}

impl EmitterFlags {
    /// Can this entity produce sound at all?
    pub fn produces_sound(&self) -> bool {
        self.character || self.weapon
    }

    /// Footstep classification under the given enhancement toggles.
    pub fn is_footstep(&self, config: &AttentionConfig) -> bool {
        config.enhance_movement && self.character && self.mobility
    }

    /// Importance classification (voice/movement/combat) under the given
    /// enhancement toggles.
    pub fn is_important(&self, config: &AttentionConfig) -> bool {
        if self.character
            && (config.enhance_voices || config.enhance_movement || config.enhance_combat)
        {
            return true;
        }
        self.weapon && config.enhance_combat
    }
}

fn tracked_source(
    entity: Entity,
    flags: EmitterFlags,
    listener_pos: Vec3,
    facing: Vec3,
    source_pos: Vec3,
    now: f32,
    config: &AttentionConfig,
) -> TrackedSource {
    let distance = listener_pos.distance(source_pos);
    let footstep = flags.is_footstep(config);
    let important = flags.is_important(config);
    TrackedSource {
        entity,
        distance,
        angle_deg: angle_from_facing(facing, listener_pos, source_pos),
        intensity: source_intensity(distance, footstep, important),
        important,
        footstep,
        last_update: now,
    }
}

/// System: Refresh each listener's cached forward vector at a lower rate.
pub fn refresh_facing(clock: Res<SimClock>, mut listeners: Query<(&Facing, &mut SpatialAttention)>) {
    let now = clock.now();
    for (facing, mut attention) in listeners.iter_mut() {
        if now - attention.last_facing_refresh > FACING_REFRESH_INTERVAL {
            attention.cached_facing = facing.0;
            attention.last_facing_refresh = now;
        }
    }
}

/// System: Refresh the tracked source table.
///
/// Every tick: evict entries that have gone stale (older than twice the
/// temporal window) or whose entity no longer resolves, then refresh
/// existing entries that moved more than the distance threshold.
/// On the staggered sub-tick additionally run the discovery scan while the
/// table is below capacity.
pub fn refresh_tracked_sources(
    clock: Res<SimClock>,
    config: Res<HearingConfig>,
    index: Res<SpatialIndex>,
    emitters: Query<(Option<&Character>, Option<&Mobility>, Option<&WeaponEmitter>)>,
    mut listeners: Query<(Entity, &Position, &ListenerContext, &mut SpatialAttention)>,
) {
    let now = clock.now();
    let attention_config = &config.attention;

    for (listener, position, context, mut attention) in listeners.iter_mut() {
        attention.stagger += 1;
        let full_scan = attention.stagger >= STAGGER_INTERVAL;
        if full_scan {
            attention.stagger = 0;
        }

        // Evict: temporal staleness and unresolvable weak references
        let max_age = attention_config.temporal_window * 2.0;
        attention
            .sources
            .retain(|s| now - s.last_update <= max_age && index.position_of(s.entity).is_some());

        if full_scan {
            let search_radius = context.baseline * SEARCH_RADIUS_FACTOR;
            let candidates =
                index.within_radius(position.0, search_radius, DISCOVERY_SCAN_CAP, Some(listener));

            let facing = attention.cached_facing;
            for (candidate, candidate_pos) in candidates {
                // A full table still refreshes what it already tracks
                if attention.len() >= attention_config.max_tracked_sources
                    && !attention.is_tracked(candidate)
                {
                    continue;
                }

                let flags = match emitters.get(candidate) {
                    Ok((character, mobility, weapon)) => EmitterFlags {
                        character: character.is_some(),
                        mobility: mobility.is_some(),
                        weapon: weapon.is_some(),
                    },
                    Err(_) => continue,
                };
                if !flags.produces_sound() {
                    continue;
                }

                let source = tracked_source(
                    candidate,
                    flags,
                    position.0,
                    facing,
                    candidate_pos,
                    now,
                    attention_config,
                );
                attention.upsert(source, attention_config.max_tracked_sources);
            }
        }

        // Refresh existing entries whose distance changed significantly
        let facing = attention.cached_facing;
        let listener_pos = position.0;
        for source in attention.sources.iter_mut() {
            let Some(source_pos) = index.position_of(source.entity) else {
                continue;
            };
            let distance = listener_pos.distance(source_pos);
            if (distance - source.distance).abs() > DISTANCE_REFRESH_THRESHOLD {
                source.distance = distance;
                source.angle_deg = angle_from_facing(facing, listener_pos, source_pos);
                source.intensity = source_intensity(distance, source.footstep, source.important);
                source.last_update = now;
            }
        }
    }
}

/// System: Directional enhancement and inhibitory background suppression.
///
/// Sources inside the attention cone's half-angle raise the enhancement
/// factor; background sources pull it down through inhibitory suppression,
/// clamped so the factor never drops below the background multiplier.
pub fn apply_spatial_filtering(
    config: Res<HearingConfig>,
    mut listeners: Query<&mut SpatialAttention>,
) {
    let attention_config = &config.attention;

    for mut attention in listeners.iter_mut() {
        let cone_angle = if attention_config.adaptive_learning {
            attention.learned_cone_angle
        } else {
            attention_config.cone_angle
        };
        let half_angle = cone_angle / 2.0;

        let mut front_count = 0usize;
        let mut back_count = 0usize;
        let mut back_intensity = 0.0f32;
        for source in &attention.sources {
            if source.angle_deg <= half_angle {
                front_count += 1;
            } else {
                back_count += 1;
                back_intensity += source.intensity;
            }
        }

        let mut factor = 1.0;
        if front_count > 0 {
            factor = if attention_config.adaptive_learning {
                attention.learned_enhancement
            } else {
                attention_config.front_multiplier
            };
        }

        if back_count > 0 && attention_config.inhibitory_strength > 0.0 {
            let avg_background = back_intensity / (back_count as f32 + 1.0);
            let suppression = 1.0
                - avg_background
                    * attention_config.inhibitory_strength
                    * attention_config.background_multiplier;
            factor *= suppression.clamp(attention_config.background_multiplier, 1.0);
        }

        attention.spatial_factor = factor;
    }
}

/// System: Identify the single highest-priority tracked source.
///
/// Advisory only: the winner is exposed for telemetry; the suppression
/// effect is already folded into the spatial filtering factor.
pub fn select_dominant_source(
    config: Res<HearingConfig>,
    mut listeners: Query<&mut SpatialAttention>,
) {
    let attention_config = &config.attention;
    if attention_config.inhibitory_strength <= 0.0 {
        // Disabled: drop any winner picked under an earlier config
        for mut attention in listeners.iter_mut() {
            attention.dominant = None;
        }
        return;
    }
    let half_angle = attention_config.cone_angle / 2.0;

    for mut attention in listeners.iter_mut() {
        let mut best: Option<(Entity, f32)> = None;
        for source in &attention.sources {
            let mut priority = source.intensity;
            if source.footstep {
                priority *= DOMINANT_FOOTSTEP_WEIGHT;
            } else if source.important {
                priority *= DOMINANT_IMPORTANT_WEIGHT;
            }
            if source.angle_deg <= half_angle {
                priority *= DOMINANT_CONE_WEIGHT;
            }
            if best.map_or(true, |(_, p)| priority > p) {
                best = Some((source.entity, priority));
            }
        }
        attention.dominant = best.map(|(e, _)| e);
    }
}

/// System: Selective attention boost for important in-cone categories.
///
/// Composes on top of the spatial filtering factor: in-cone footsteps win
/// over other important sounds and receive the extra footstep factor.
/// The result becomes the filter's contribution for this tick.
pub fn apply_selective_attention(
    config: Res<HearingConfig>,
    mut listeners: Query<(&SpatialAttention, &mut RangeContributions)>,
) {
    let attention_config = &config.attention;
    let half_angle = attention_config.cone_angle / 2.0;

    for (attention, mut contributions) in listeners.iter_mut() {
        let mut footstep_count = 0usize;
        let mut important_count = 0usize;
        for source in &attention.sources {
            if source.angle_deg > half_angle {
                continue;
            }
            if source.footstep {
                footstep_count += 1;
            } else if source.important {
                important_count += 1;
            }
        }

        let boost = if footstep_count > 0 {
            attention_config.important_multiplier * FOOTSTEP_ATTENTION_EXTRA
        } else if important_count > 0 {
            attention_config.important_multiplier
        } else {
            1.0
        };

        contributions.attention = attention.spatial_factor * boost;
        trace!(
            spatial = attention.spatial_factor,
            boost,
            footsteps = footstep_count,
            "attention contribution updated"
        );
    }
}

/// System: Adaptive learning of the attention cone (staggered, optional).
///
/// Nudges the learned cone angle toward twice the mean angle of the
/// currently-important sources with exponential smoothing, clamped to the
/// learned-cone bounds.
pub fn adapt_attention_cone(
    config: Res<HearingConfig>,
    mut listeners: Query<&mut SpatialAttention>,
) {
    let attention_config = &config.attention;
    if !attention_config.adaptive_learning {
        return;
    }

    for mut attention in listeners.iter_mut() {
        // Only on the staggered sub-tick, right after a full refresh
        if attention.stagger != 0 {
            continue;
        }

        let mut angle_sum = 0.0f32;
        let mut important_count = 0usize;
        for source in &attention.sources {
            if source.important {
                angle_sum += source.angle_deg;
                important_count += 1;
            }
        }
        if important_count == 0 {
            continue;
        }

        let target = (angle_sum / important_count as f32) * 2.0;
        let lerp_factor = attention_config.adaptation_rate * 0.1;
        let learned = attention.learned_cone_angle;
        attention.learned_cone_angle =
            (learned + (target - learned) * lerp_factor).clamp(MIN_LEARNED_CONE, MAX_LEARNED_CONE);
    }
}
