//! Event Types
//!
//! Telemetry record definitions matching the simulation's JSONL output schema.
//! Every write to a listener's auditory range is recorded as a [`RangeEvent`];
//! the spatial attention filter additionally reports the currently dominant
//! sound source as a [`DominantSourceRecord`].

use serde::{Deserialize, Serialize};

use crate::timestamp::SimTimestamp;

/// Categories of auditory range changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeEventKind {
    /// Controllers attached; the quiet-period boost was applied
    Activated,
    /// A loud transient event suppressed the range
    Dampened,
    /// A dampening episode expired and the boost returned
    Restored,
    /// The spatial attention filter adjusted the range
    Filtered,
    /// Controllers detached; the captured baseline was restored
    Deactivated,
}

impl RangeEventKind {
    /// Returns the valid cause strings for this event kind.
    pub fn valid_causes(&self) -> &'static [&'static str] {
        match self {
            RangeEventKind::Activated => &["equipped"],
            RangeEventKind::Dampened => &["explosion", "weapon_fire"],
            RangeEventKind::Restored => &["timer_expired"],
            RangeEventKind::Filtered => &["spatial_filter"],
            RangeEventKind::Deactivated => &["unequipped", "listener_removed"],
        }
    }

    /// Checks whether the given cause is valid for this kind.
    pub fn is_valid_cause(&self, cause: &str) -> bool {
        self.valid_causes().contains(&cause)
    }

    /// Returns all event kind variants.
    pub fn all() -> &'static [RangeEventKind] {
        &[
            RangeEventKind::Activated,
            RangeEventKind::Dampened,
            RangeEventKind::Restored,
            RangeEventKind::Filtered,
            RangeEventKind::Deactivated,
        ]
    }
}

/// One write to a listener's effective auditory range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeEvent {
    /// Unique event identifier (e.g. "hear_00000001")
    pub event_id: String,
    /// When the write happened
    pub timestamp: SimTimestamp,
    /// Listener whose range changed
    pub listener_id: String,
    /// What kind of change this was
    pub kind: RangeEventKind,
    /// Cause string (see [`RangeEventKind::valid_causes`])
    pub cause: String,
    /// The immutable baseline captured at activation
    pub baseline: f32,
    /// Range value before this write
    pub previous_range: f32,
    /// Range value after this write
    pub new_range: f32,
    /// Dampening controller contribution at write time
    pub dampening_factor: f32,
    /// Attention filter contribution at write time
    pub attention_factor: f32,
}

impl RangeEvent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        event_id: impl Into<String>,
        timestamp: SimTimestamp,
        listener_id: impl Into<String>,
        kind: RangeEventKind,
        cause: impl Into<String>,
        baseline: f32,
        previous_range: f32,
        new_range: f32,
        dampening_factor: f32,
        attention_factor: f32,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            listener_id: listener_id.into(),
            kind,
            cause: cause.into(),
            baseline,
            previous_range,
            new_range,
            dampening_factor,
            attention_factor,
        }
    }
}

/// Advisory telemetry: the highest-priority tracked sound source for a
/// listener this tick. Diagnostic only; it never feeds back into the range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DominantSourceRecord {
    /// When the source became dominant
    pub timestamp: SimTimestamp,
    /// Listener doing the tracking
    pub listener_id: String,
    /// Stable identifier of the source entity, if it carries one
    pub source_id: Option<String>,
    /// Last known distance in meters
    pub distance: f32,
    /// Angle from the listener's facing direction in degrees
    pub angle_deg: f32,
    /// Derived intensity scalar
    pub intensity: f32,
    /// True when classified as a footstep source
    pub footstep: bool,
    /// True when classified as important (voice/movement/combat)
    pub important: bool,
}

/// Generates a sequential event ID.
pub fn generate_event_id(sequence: u64) -> String {
    format!("hear_{:08}", sequence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_event_id() {
        assert_eq!(generate_event_id(1), "hear_00000001");
        assert_eq!(generate_event_id(284), "hear_00000284");
    }

    #[test]
    fn test_valid_causes() {
        assert!(RangeEventKind::Dampened.is_valid_cause("explosion"));
        assert!(RangeEventKind::Dampened.is_valid_cause("weapon_fire"));
        assert!(!RangeEventKind::Dampened.is_valid_cause("equipped"));
        assert!(RangeEventKind::Deactivated.is_valid_cause("unequipped"));
    }

    #[test]
    fn test_all_kinds_have_causes() {
        for kind in RangeEventKind::all() {
            assert!(!kind.valid_causes().is_empty());
        }
    }

    #[test]
    fn test_range_event_serde_round_trip() {
        let event = RangeEvent::new(
            generate_event_id(1),
            SimTimestamp::new(8, 0.4),
            "listener_0001",
            RangeEventKind::Dampened,
            "explosion",
            50.0,
            87.5,
            12.5,
            0.25,
            1.0,
        );

        let json = serde_json::to_string(&event).unwrap();
        let parsed: RangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_id, "hear_00000001");
        assert_eq!(parsed.kind, RangeEventKind::Dampened);
        assert!(parsed.kind.is_valid_cause(&parsed.cause));
        assert!((parsed.new_range - 12.5).abs() < 1e-6);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&RangeEventKind::Dampened).unwrap();
        assert_eq!(json, "\"dampened\"");
    }
}
