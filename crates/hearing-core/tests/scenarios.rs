//! End-to-end scenarios for the hearing controllers.
//!
//! Each test builds a world, runs the tick schedule, and checks the
//! auditory range timeline against the expected controller behavior.

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::Schedule;
use glam::Vec3;

use hearing_core::components::attention::SpatialAttention;
use hearing_core::components::listener::{ListenerId, Perception, Position};
use hearing_core::config::HearingConfig;
use hearing_core::setup;
use hearing_core::systems::{
    tick_schedule, EquipmentChange, EquipmentNotice, EquipmentQueue, ExplosionKind,
    ExplosionNotice, ExplosionQueue, ListenerRegistry,
};

const BASELINE: f32 = 50.0;
const BOOSTED: f32 = 87.5; // 50 * 1.75
const DAMPENED: f32 = 12.5; // 50 * 0.25

struct Harness {
    world: World,
    schedule: Schedule,
    listener: Entity,
}

impl Harness {
    fn new(config: HearingConfig) -> Self {
        let mut world = World::new();
        setup::init_resources(&mut world, config);
        let listener = setup::spawn_listener(&mut world, "listener_0001", Vec3::ZERO, Vec3::Z, BASELINE);
        Self {
            world,
            schedule: tick_schedule(),
            listener,
        }
    }

    fn equip(&mut self) {
        let listener = self.listener;
        self.world
            .resource_mut::<EquipmentQueue>()
            .push(EquipmentNotice {
                listener,
                item_id: "headset_0001".to_string(),
                change: EquipmentChange::Equipped,
            });
    }

    fn unequip(&mut self) {
        let listener = self.listener;
        self.world
            .resource_mut::<EquipmentQueue>()
            .push(EquipmentNotice {
                listener,
                item_id: "headset_0001".to_string(),
                change: EquipmentChange::Unequipped,
            });
    }

    fn explode_at(&mut self, position: Vec3) {
        self.world
            .resource_mut::<ExplosionQueue>()
            .push(ExplosionNotice {
                source: None,
                position,
                raw_damage: 120.0,
                radius: 12.0,
                kind: ExplosionKind::Grenade,
            });
    }

    fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.schedule.run(&mut self.world);
        }
    }

    fn range(&self) -> f32 {
        self.world
            .get::<Perception>(self.listener)
            .unwrap()
            .auditory_range()
    }

    /// Place a source at `angle_deg` from the listener's +Z facing,
    /// `distance` meters out, in the horizontal plane.
    fn position_at_angle(angle_deg: f32, distance: f32) -> Vec3 {
        let rad = angle_deg.to_radians();
        Vec3::new(rad.sin() * distance, 0.0, rad.cos() * distance)
    }
}

fn approx(actual: f32, expected: f32) -> bool {
    (actual - expected).abs() < 0.01
}

#[test]
fn activation_applies_boost() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);

    assert!(
        approx(h.range(), BOOSTED),
        "expected {}, got {}",
        BOOSTED,
        h.range()
    );
    assert_eq!(h.world.resource::<ListenerRegistry>().len(), 1);
}

#[test]
fn reattachment_is_idempotent() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);
    // Second equip of the same item: must not re-capture a boosted baseline
    h.equip();
    h.run_ticks(1);

    assert!(approx(h.range(), BOOSTED), "got {}", h.range());
    assert_eq!(h.world.resource::<ListenerRegistry>().len(), 1);
}

#[test]
fn attach_without_perception_is_noop() {
    let mut world = World::new();
    setup::init_resources(&mut world, HearingConfig::default());
    // A listener without a perception capability cannot be instrumented
    let listener = world
        .spawn((ListenerId::new("listener_0002"), Position(Vec3::ZERO)))
        .id();
    world.resource_mut::<EquipmentQueue>().push(EquipmentNotice {
        listener,
        item_id: "headset_0002".to_string(),
        change: EquipmentChange::Equipped,
    });

    let mut schedule = tick_schedule();
    schedule.run(&mut world);

    assert!(world.resource::<ListenerRegistry>().is_empty());
}

#[test]
fn explosion_dampens_then_restores() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);

    // Explosion 5m away, well inside the 25m trigger radius
    h.explode_at(Vec3::new(5.0, 0.0, 0.0));
    h.run_ticks(1);
    assert!(approx(h.range(), DAMPENED), "got {}", h.range());

    // 0.4s episode = 8 ticks at 50ms; still dampened just before expiry
    h.run_ticks(7);
    assert!(approx(h.range(), DAMPENED), "got {}", h.range());

    h.run_ticks(2);
    assert!(approx(h.range(), BOOSTED), "got {}", h.range());
}

#[test]
fn distant_explosion_is_ignored() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);

    h.explode_at(Vec3::new(100.0, 0.0, 0.0));
    h.run_ticks(1);
    assert!(approx(h.range(), BOOSTED), "got {}", h.range());
}

#[test]
fn cooldown_suppresses_second_trigger() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);

    // First explosion
    h.explode_at(Vec3::new(5.0, 0.0, 0.0));
    h.run_ticks(1);
    assert!(approx(h.range(), DAMPENED));

    // Second explosion 0.2s later, inside the 0.5s cooldown
    h.run_ticks(3);
    h.explode_at(Vec3::new(5.0, 0.0, 0.0));

    // Sample the range each tick and count restore transitions
    let mut episodes_ended = 0;
    let mut previous = h.range();
    for _ in 0..20 {
        h.run_ticks(1);
        let current = h.range();
        if approx(previous, DAMPENED) && approx(current, BOOSTED) {
            episodes_ended += 1;
        }
        previous = current;
    }

    assert_eq!(episodes_ended, 1, "exactly one dampening episode expected");
    assert!(approx(h.range(), BOOSTED));
}

#[test]
fn weapon_fire_dampens_briefly() {
    let mut h = Harness::new(HearingConfig::default());
    let shooter = setup::spawn_shooter(&mut h.world, Vec3::new(5.0, 0.0, 3.0));
    h.equip();
    h.run_ticks(1);
    assert!(approx(h.range(), BOOSTED));

    // A projectile near the muzzle marks the weapon as just fired
    let muzzle = h.world.get::<Position>(shooter).unwrap().0;
    setup::spawn_projectile(&mut h.world, muzzle + Vec3::new(0.5, 0.0, 0.5));
    h.run_ticks(1);
    assert!(approx(h.range(), DAMPENED), "got {}", h.range());

    // 0.2s episode = 4 ticks at 50ms
    h.run_ticks(5);
    assert!(approx(h.range(), BOOSTED), "got {}", h.range());
}

#[test]
fn teardown_restores_baseline_exactly() {
    let mut h = Harness::new(HearingConfig::default());
    h.equip();
    h.run_ticks(1);

    // Tear down mid-episode: the pending restore must not resurrect
    h.explode_at(Vec3::new(5.0, 0.0, 0.0));
    h.run_ticks(1);
    assert!(approx(h.range(), DAMPENED));

    h.unequip();
    h.run_ticks(1);
    assert_eq!(h.range(), BASELINE);
    assert!(h.world.resource::<ListenerRegistry>().is_empty());

    // Ticks long past the original episode deadline leave it untouched
    h.run_ticks(20);
    assert_eq!(h.range(), BASELINE);
}

#[test]
fn equip_unequip_cycles_always_restore() {
    let mut h = Harness::new(HearingConfig::default());
    for _ in 0..3 {
        h.equip();
        h.run_ticks(3);
        h.explode_at(Vec3::new(5.0, 0.0, 0.0));
        h.run_ticks(2);
        h.unequip();
        h.run_ticks(1);
        assert_eq!(h.range(), BASELINE);
    }
}

#[test]
fn tracked_sources_respect_capacity() {
    let mut h = Harness::new(HearingConfig::default());
    // Far more candidates than the table admits
    for i in 0..30 {
        let angle = i as f32 * 12.0;
        let position = Harness::position_at_angle(angle, 10.0 + i as f32);
        setup::spawn_character(&mut h.world, position);
    }
    h.equip();
    // Several staggered refresh cycles
    h.run_ticks(9);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert!(attention.len() <= 10, "table holds {}", attention.len());
    assert!(!attention.is_empty());
}

#[test]
fn despawned_source_is_evicted() {
    let mut h = Harness::new(HearingConfig::default());
    let walker = setup::spawn_character(&mut h.world, Vec3::new(0.0, 0.0, 10.0));
    h.equip();
    h.run_ticks(6);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert_eq!(attention.len(), 1);

    h.world.despawn(walker);
    h.run_ticks(1);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert!(attention.is_empty());
}

/// Config used by the deterministic attention-math scenarios: inhibitory
/// suppression off so the expected factors compose exactly.
fn plain_suppression_config() -> HearingConfig {
    let mut config = HearingConfig::default();
    config.attention.inhibitory_strength = 0.0;
    config
}

#[test]
fn in_cone_footstep_gets_extra_boost() {
    let mut h = Harness::new(plain_suppression_config());
    // Footstep source at 20 degrees (inside the 22.5 degree half-cone)
    setup::spawn_character(&mut h.world, Harness::position_at_angle(20.0, 20.0));
    // Combat source at 100 degrees (background)
    setup::spawn_weapon(&mut h.world, Harness::position_at_angle(100.0, 20.0));

    h.equip();
    h.run_ticks(9);

    // front 2.0 * (important 1.5 * footstep extra 1.4) on top of boost 1.75
    let expected = BASELINE * 1.75 * 2.0 * 1.5 * 1.4;
    assert!(
        (h.range() - expected).abs() < 0.5,
        "expected {}, got {}",
        expected,
        h.range()
    );
}

#[test]
fn in_cone_important_without_footstep_gets_plain_boost() {
    let mut h = Harness::new(plain_suppression_config());
    // Combat source ahead, footstep source behind
    setup::spawn_weapon(&mut h.world, Harness::position_at_angle(10.0, 20.0));
    setup::spawn_character(&mut h.world, Harness::position_at_angle(100.0, 20.0));

    h.equip();
    h.run_ticks(9);

    let expected = BASELINE * 1.75 * 2.0 * 1.5;
    assert!(
        (h.range() - expected).abs() < 0.5,
        "expected {}, got {}",
        expected,
        h.range()
    );
}

#[test]
fn dampening_and_attention_compose_multiplicatively() {
    let mut h = Harness::new(plain_suppression_config());
    setup::spawn_character(&mut h.world, Harness::position_at_angle(20.0, 20.0));
    setup::spawn_weapon(&mut h.world, Harness::position_at_angle(100.0, 20.0));

    h.equip();
    h.run_ticks(9);

    let attention_factor = 2.0 * 1.5 * 1.4;
    assert!((h.range() - BASELINE * 1.75 * attention_factor).abs() < 0.5);

    // During a dampening episode the same attention factor applies against
    // the dampen multiplier, not on top of a stale range value
    h.explode_at(Vec3::new(5.0, 0.0, 0.0));
    h.run_ticks(1);
    let expected = BASELINE * 0.25 * attention_factor;
    assert!(
        (h.range() - expected).abs() < 0.5,
        "expected {}, got {}",
        expected,
        h.range()
    );

    // After the episode the boosted value returns
    h.run_ticks(12);
    assert!((h.range() - BASELINE * 1.75 * attention_factor).abs() < 0.5);
}

#[test]
fn background_suppression_lowers_enhancement() {
    // Full inhibitory strength with only a background source present
    let mut h = Harness::new(HearingConfig::default());
    setup::spawn_weapon(&mut h.world, Harness::position_at_angle(120.0, 20.0));

    h.equip();
    h.run_ticks(9);

    // No front sources: factor is pure suppression, clamped to >= 0.5
    // intensity = 1/(1+2) * 1.5 = 0.5; avg = 0.5/2; suppression = 1 - 0.25*0.7*0.5
    let suppression: f32 = 1.0 - (0.5 / 2.0) * 0.7 * 0.5;
    let expected = BASELINE * 1.75 * suppression.clamp(0.5, 1.0);
    assert!(
        (h.range() - expected).abs() < 0.5,
        "expected {}, got {}",
        expected,
        h.range()
    );
}

#[test]
fn disabling_suppression_clears_dominant_source() {
    let mut h = Harness::new(HearingConfig::default());
    setup::spawn_character(&mut h.world, Harness::position_at_angle(10.0, 15.0));
    h.equip();
    h.run_ticks(6);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert!(attention.dominant.is_some());

    // Turning inhibitory filtering off must not leave the old winner behind
    h.world.insert_resource(plain_suppression_config());
    h.run_ticks(1);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert!(attention.dominant.is_none());
}

#[test]
fn adaptive_learning_stays_within_bounds() {
    let mut config = HearingConfig::default();
    config.attention.adaptive_learning = true;
    config.attention.adaptation_rate = 1.0;

    let mut h = Harness::new(config);
    // Important sources far off-axis pull the cone outward
    setup::spawn_character(&mut h.world, Harness::position_at_angle(80.0, 15.0));
    setup::spawn_character(&mut h.world, Harness::position_at_angle(-80.0, 15.0));

    h.equip();
    h.run_ticks(60);

    let attention = h.world.get::<SpatialAttention>(h.listener).unwrap();
    assert!(attention.learned_cone_angle >= 30.0);
    assert!(attention.learned_cone_angle <= 90.0);
    // It should have moved off the configured 45 degrees toward the sources
    assert!(attention.learned_cone_angle > 45.0);
}
