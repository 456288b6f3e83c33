//! Equipment Attachment
//!
//! Binds one transient dampening controller and one spatial attention
//! filter per listener when head equipment is equipped, and tears both
//! down when it is removed.
//!
//! The registry is maintained incrementally from equip/unequip notices
//! rather than by scanning the world population, so attachment cost is
//! proportional to equipment churn, not to the number of entities.

use bevy_ecs::prelude::*;
use glam::Vec3;
use hearing_events::{RangeEvent, RangeEventKind};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::components::attention::SpatialAttention;
use crate::components::dampening::TransientDampening;
use crate::components::listener::{Facing, ListenerContext, ListenerId, Perception, RangeContributions};
use crate::config::HearingConfig;
use crate::systems::clock::SimClock;
use crate::telemetry::RangeLog;

/// Kind of equipment change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipmentChange {
    Equipped,
    Unequipped,
}

/// A head-equipment change notice from the host inventory layer.
#[derive(Debug, Clone)]
pub struct EquipmentNotice {
    /// Listener wearing (or removing) the item
    pub listener: Entity,
    /// Identifier of the worn item
    pub item_id: String,
    pub change: EquipmentChange,
}

/// Resource: Queue of equipment change notices to process.
#[derive(Resource, Debug, Default)]
pub struct EquipmentQueue {
    pub notices: Vec<EquipmentNotice>,
}

impl EquipmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: EquipmentNotice) {
        self.notices.push(notice);
    }

    pub fn drain(&mut self) -> Vec<EquipmentNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

/// Record of an instrumented listener.
#[derive(Debug, Clone)]
pub struct ListenerRecord {
    pub listener_id: String,
    pub item_id: String,
    pub baseline: f32,
}

/// Resource: Registry of listeners that currently carry the controller pair.
#[derive(Resource, Debug, Default)]
pub struct ListenerRegistry {
    active: HashMap<Entity, ListenerRecord>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, listener: Entity) -> bool {
        self.active.contains_key(&listener)
    }

    pub fn get(&self, listener: Entity) -> Option<&ListenerRecord> {
        self.active.get(&listener)
    }

    pub fn activate(&mut self, listener: Entity, record: ListenerRecord) {
        self.active.insert(listener, record);
    }

    pub fn deactivate(&mut self, listener: Entity) -> Option<ListenerRecord> {
        self.active.remove(&listener)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// System: Process equipment notices, attaching and detaching controllers.
///
/// Attachment is idempotent: a second equip notice for an already
/// instrumented listener is a no-op. A listener whose perception capability
/// cannot be resolved, or whose baseline cannot be captured, is left
/// uninstrumented until a later re-equip.
pub fn process_equipment_queue(
    mut commands: Commands,
    config: Res<HearingConfig>,
    clock: Res<SimClock>,
    mut queue: ResMut<EquipmentQueue>,
    mut registry: ResMut<ListenerRegistry>,
    mut log: ResMut<RangeLog>,
    mut query: Query<(&ListenerId, &mut Perception, Option<&Facing>)>,
) {
    for notice in queue.drain() {
        match notice.change {
            EquipmentChange::Equipped => {
                if registry.is_active(notice.listener) {
                    debug!(item = %notice.item_id, "already instrumented, ignoring re-equip");
                    continue;
                }

                let Ok((listener_id, perception, facing)) = query.get_mut(notice.listener) else {
                    debug!(item = %notice.item_id, "listener or perception capability not found");
                    continue;
                };

                let baseline = perception.auditory_range();
                if !baseline.is_finite() || baseline <= 0.0 {
                    debug!(listener = %listener_id.0, baseline, "cannot capture baseline range");
                    continue;
                }

                let facing_dir = facing.map(|f| f.0).unwrap_or(Vec3::Z);
                commands.entity(notice.listener).insert((
                    ListenerContext::new(baseline, clock.now()),
                    RangeContributions::new(config.dampening.boost_multiplier),
                    TransientDampening::active(),
                    SpatialAttention::new(
                        facing_dir,
                        config.attention.cone_angle,
                        config.attention.front_multiplier,
                    ),
                ));

                registry.activate(
                    notice.listener,
                    ListenerRecord {
                        listener_id: listener_id.0.clone(),
                        item_id: notice.item_id.clone(),
                        baseline,
                    },
                );

                info!(
                    listener = %listener_id.0,
                    item = %notice.item_id,
                    baseline,
                    "hearing controllers attached"
                );
            }
            EquipmentChange::Unequipped => {
                let Some(record) = registry.deactivate(notice.listener) else {
                    debug!(item = %notice.item_id, "unequip for uninstrumented listener");
                    continue;
                };

                // Restore the capability to exactly the captured baseline
                let (previous, cause) = match query.get_mut(notice.listener) {
                    Ok((_, mut perception, _)) => {
                        let previous = perception.auditory_range();
                        perception.set_auditory_range(record.baseline);
                        (previous, "unequipped")
                    }
                    Err(_) => (record.baseline, "listener_removed"),
                };
                let event_id = log.next_id();
                log.record(RangeEvent::new(
                    event_id,
                    clock.timestamp(),
                    record.listener_id.clone(),
                    RangeEventKind::Deactivated,
                    cause,
                    record.baseline,
                    previous,
                    record.baseline,
                    1.0,
                    1.0,
                ));

                if let Some(mut entity) = commands.get_entity(notice.listener) {
                    entity.remove::<(
                        ListenerContext,
                        RangeContributions,
                        TransientDampening,
                        SpatialAttention,
                    )>();
                }

                info!(
                    listener = %record.listener_id,
                    item = %record.item_id,
                    cause,
                    "hearing controllers detached, baseline restored"
                );
            }
        }
    }
}
