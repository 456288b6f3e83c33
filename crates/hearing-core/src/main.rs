//! Hearing Simulation Demo
//!
//! Runs a scripted firefight scenario around one instrumented listener and
//! prints the resulting auditory range timeline.

use bevy_ecs::prelude::*;
use clap::Parser;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::path::PathBuf;

use hearing_core::components::listener::{Perception, Position};
use hearing_core::config::{default_config_toml, HearingConfig};
use hearing_core::setup;
use hearing_core::systems::{
    tick_schedule, EquipmentChange, EquipmentNotice, EquipmentQueue, ExplosionKind,
    ExplosionNotice, ExplosionQueue,
};
use hearing_core::telemetry::RangeLog;
use hearing_core::SimRng;

/// Command line arguments for the demo
#[derive(Parser, Debug)]
#[command(name = "hearing_sim")]
#[command(about = "Auditory perception modulation demo")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Tick at which a grenade goes off near the listener
    #[arg(long, default_value_t = 200)]
    explosion_tick: u64,

    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write JSONL telemetry to this path
    #[arg(long)]
    telemetry: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return;
    }

    let config = match &args.config {
        Some(path) => match HearingConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => HearingConfig::default(),
    };

    println!("Hearing Simulation Demo");
    println!("=======================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!("Explosion at tick: {}", args.explosion_tick);
    println!();

    let mut world = World::new();
    setup::init_resources(&mut world, config);
    world.insert_resource(SimRng(SmallRng::seed_from_u64(args.seed)));

    if let Some(path) = &args.telemetry {
        match RangeLog::new(path) {
            Ok(log) => world.insert_resource(log),
            Err(e) => {
                eprintln!("Failed to open telemetry log {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    // One listener at the origin facing +Z, and a handful of sound sources
    let listener = setup::spawn_listener(&mut world, "listener_0001", Vec3::ZERO, Vec3::Z, 50.0);
    let shooter = setup::spawn_shooter(&mut world, Vec3::new(6.0, 0.0, 8.0));
    let mut walkers = Vec::new();
    for i in 0..6 {
        let angle = i as f32 * std::f32::consts::TAU / 6.0;
        let position = Vec3::new(angle.cos() * 30.0, 0.0, angle.sin() * 30.0);
        walkers.push(setup::spawn_character(&mut world, position));
    }

    // Equip the head item on the first tick
    world
        .resource_mut::<EquipmentQueue>()
        .push(EquipmentNotice {
            listener,
            item_id: "headset_0001".to_string(),
            change: EquipmentChange::Equipped,
        });

    let mut schedule = tick_schedule();
    let mut timeline: Vec<(u64, f32)> = Vec::new();
    let mut last_range = f32::NAN;
    let mut pending_projectile: Option<(Entity, u64)> = None;

    for tick in 1..=args.ticks {
        // Scripted events
        if tick == args.explosion_tick {
            world
                .resource_mut::<ExplosionQueue>()
                .push(ExplosionNotice {
                    source: None,
                    position: Vec3::new(8.0, 0.0, 4.0),
                    raw_damage: 120.0,
                    radius: 12.0,
                    kind: ExplosionKind::Grenade,
                });
        }

        // The shooter fires a short burst every ~4 seconds
        if tick % 80 == 0 {
            let muzzle = world.get::<Position>(shooter).map(|p| p.0).unwrap_or(Vec3::ZERO);
            let projectile = setup::spawn_projectile(&mut world, muzzle + Vec3::new(0.5, 0.0, 0.5));
            pending_projectile = Some((projectile, tick + 2));
        }
        if let Some((projectile, despawn_at)) = pending_projectile {
            if tick >= despawn_at {
                world.despawn(projectile);
                pending_projectile = None;
            }
        }

        // Walkers wander
        {
            let mut steps = Vec::new();
            {
                let mut rng = world.resource_mut::<SimRng>();
                for _ in &walkers {
                    let step = Vec3::new(
                        rng.0.gen_range(-0.2..0.2),
                        0.0,
                        rng.0.gen_range(-0.2..0.2),
                    );
                    steps.push(step);
                }
            }
            for (walker, step) in walkers.iter().zip(steps) {
                if let Some(mut position) = world.get_mut::<Position>(*walker) {
                    position.0 += step;
                }
            }
        }

        schedule.run(&mut world);

        let range = world
            .get::<Perception>(listener)
            .map(|p| p.auditory_range())
            .unwrap_or(f32::NAN);
        if (range - last_range).abs() > 1e-3 || last_range.is_nan() {
            timeline.push((tick, range));
            last_range = range;
        }
    }

    // Unequip and run one final tick so teardown restores the baseline
    world
        .resource_mut::<EquipmentQueue>()
        .push(EquipmentNotice {
            listener,
            item_id: "headset_0001".to_string(),
            change: EquipmentChange::Unequipped,
        });
    schedule.run(&mut world);

    let final_range = world
        .get::<Perception>(listener)
        .map(|p| p.auditory_range())
        .unwrap_or(f32::NAN);

    println!("Range timeline ({} changes):", timeline.len());
    for (tick, range) in &timeline {
        println!("  tick {:>6}: {:>8.2} m", tick, range);
    }
    println!();
    println!("Final range after teardown: {:.2} m", final_range);

    if let Some(mut log) = world.remove_resource::<RangeLog>() {
        if let Err(e) = log.flush() {
            eprintln!("Failed to flush telemetry: {}", e);
        }
        println!("Telemetry events written: {}", log.event_count());
    }
}
