//! ECS Systems
//!
//! All per-tick systems: clock, spatial index, equipment attachment, the
//! transient dampening controller, the spatial attention pipeline, and the
//! range combiner.

pub mod attachment;
pub mod attention;
pub mod clock;
pub mod dampening;
pub mod range;
pub mod spatial;

// Re-export commonly used systems and resources
pub use attachment::{
    process_equipment_queue, EquipmentChange, EquipmentNotice, EquipmentQueue, ListenerRecord,
    ListenerRegistry,
};
pub use attention::{
    adapt_attention_cone, angle_from_facing, apply_selective_attention, apply_spatial_filtering,
    attention_constants, refresh_facing, refresh_tracked_sources, select_dominant_source,
    source_intensity, EmitterFlags,
};
pub use clock::{advance_clock, SimClock};
pub use dampening::{
    expire_dampening, fire_constants, poll_weapon_sounds, process_explosions,
    purge_stale_fire_records, ExplosionKind, ExplosionNotice, ExplosionQueue,
};
pub use range::{combine_range, report_dominant_source};
pub use spatial::{build_spatial_index, SpatialIndex, MAX_SCAN_CANDIDATES};

use bevy_ecs::prelude::*;

/// Builds the per-tick schedule with all systems in their required order.
///
/// One `Schedule::run` is one simulation tick. The combiner runs last so
/// that the perception capability sees exactly one write per tick.
pub fn tick_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            advance_clock,
            build_spatial_index,
            process_equipment_queue,
            process_explosions,
            poll_weapon_sounds,
            expire_dampening,
            purge_stale_fire_records,
            refresh_facing,
            refresh_tracked_sources,
            apply_spatial_filtering,
            select_dominant_source,
            apply_selective_attention,
            adapt_attention_cone,
            combine_range,
            report_dominant_source,
        )
            .chain(),
    );
    schedule
}
