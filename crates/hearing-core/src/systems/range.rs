//! Range Combiner
//!
//! The single authoritative writer of the perception capability. Both
//! controllers publish named contributions; once per tick this system
//! folds them into `baseline * dampening * attention` and applies the
//! result. Because neither controller writes the capability directly, the
//! final value is deterministic regardless of controller ordering.

use bevy_ecs::prelude::*;
use hearing_events::{DominantSourceRecord, RangeEvent, RangeEventKind};
use tracing::debug;

use crate::components::attention::SpatialAttention;
use crate::components::dampening::TransientDampening;
use crate::components::listener::{
    AppliedRange, ListenerContext, ListenerId, Perception, RangeContributions,
};
use crate::systems::clock::SimClock;
use crate::telemetry::RangeLog;

/// System: Fold both contributions into one range write per listener.
pub fn combine_range(
    clock: Res<SimClock>,
    mut log: ResMut<RangeLog>,
    mut listeners: Query<(
        &ListenerId,
        &ListenerContext,
        &TransientDampening,
        &mut RangeContributions,
        &mut Perception,
    )>,
) {
    for (listener_id, context, dampening, mut contributions, mut perception) in listeners.iter_mut()
    {
        let effective = context.baseline * contributions.combined();

        let unchanged = contributions.applied.as_ref().is_some_and(|applied| {
            applied.dampening == contributions.dampening
                && applied.attention == contributions.attention
        });
        if unchanged {
            continue;
        }

        let previous = perception.auditory_range();
        perception.set_auditory_range(effective);

        let (kind, cause) = classify(&contributions, dampening);
        let event_id = log.next_id();
        log.record(RangeEvent::new(
            event_id,
            clock.timestamp(),
            listener_id.0.clone(),
            kind,
            cause,
            context.baseline,
            previous,
            effective,
            contributions.dampening,
            contributions.attention,
        ));
        debug!(
            listener = %listener_id.0,
            previous,
            effective,
            ?kind,
            "auditory range updated"
        );

        contributions.applied = Some(AppliedRange {
            dampening: contributions.dampening,
            attention: contributions.attention,
            range: effective,
        });
    }
}

/// Classify a range write for telemetry from how the contributions moved.
fn classify(
    contributions: &RangeContributions,
    dampening: &TransientDampening,
) -> (RangeEventKind, &'static str) {
    match &contributions.applied {
        None => (RangeEventKind::Activated, "equipped"),
        Some(applied) if contributions.dampening < applied.dampening => {
            let cause = dampening
                .last_cause
                .map(|c| c.as_str())
                .unwrap_or("explosion");
            (RangeEventKind::Dampened, cause)
        }
        Some(applied) if contributions.dampening > applied.dampening => {
            (RangeEventKind::Restored, "timer_expired")
        }
        Some(_) => (RangeEventKind::Filtered, "spatial_filter"),
    }
}

/// System: Report dominant-source changes to telemetry.
pub fn report_dominant_source(
    clock: Res<SimClock>,
    mut log: ResMut<RangeLog>,
    mut listeners: Query<(&ListenerId, &mut SpatialAttention)>,
) {
    for (listener_id, mut attention) in listeners.iter_mut() {
        if attention.dominant == attention.last_reported_dominant {
            continue;
        }
        attention.last_reported_dominant = attention.dominant;

        let Some(entity) = attention.dominant else {
            continue;
        };
        let Some(source) = attention.sources.iter().find(|s| s.entity == entity) else {
            continue;
        };

        log.record_dominant(DominantSourceRecord {
            timestamp: clock.timestamp(),
            listener_id: listener_id.0.clone(),
            source_id: Some(format!("{:?}", entity)),
            distance: source.distance,
            angle_deg: source.angle_deg,
            intensity: source.intensity,
            footstep: source.footstep,
            important: source.important,
        });
    }
}
