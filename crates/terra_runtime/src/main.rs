//! Terra Runtime
//!
//! Headless binary: walks a player across procedurally generated terrain,
//! firing boxes on a fixed cadence, then reports what the world holds.
//!
//! Usage: `terra [settings.json]`. Log level follows `RUST_LOG`.

use anyhow::{Context, Result};
use std::path::Path;
use std::rc::Rc;
use terra_core::ecs::EntityManager;
use terra_core::glam::Vec3;
use terra_core::time::SimulationTime;
use terra_game::{
    spawn_player, CollisionSystem, HeadlessPhysics, InputHandlerSystem, LifetimeSystem, PhysicsWorld, Player,
    SyncRigidBodySystem, BOX_BULLET, PLAYER,
};
use terra_landscape::{
    spawn_world_entity_spawner, LandscapeEventSystem, LandscapeGenerator, WorldEntityGenerator,
    REGION_ANCHOR,
};
use terra_metrics::FrameTimer;
use terra_services::{InputEvent, InputKind, Settings};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Terra v{}", terra_core::VERSION);

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(Path::new(&path))
            .with_context(|| format!("loading settings from {path}"))?,
        None => Settings::default(),
    };

    let mut manager = EntityManager::new();
    let physics: Rc<dyn PhysicsWorld> = Rc::new(HeadlessPhysics);

    manager.register_system("lifetime", LifetimeSystem::new())?;
    manager.register_system("collision", CollisionSystem::new(Rc::clone(&physics)))?;
    manager.register_system("syncPhysics", SyncRigidBodySystem::new(Rc::clone(&physics)))?;
    let input = InputHandlerSystem::new();
    let input_events = input.events();
    manager.register_system("input", input)?;
    let landscape_events = LandscapeEventSystem::new();
    let generator_queue = landscape_events.queue();
    manager.register_system("landscapeEvents", landscape_events)?;

    let mut generator = LandscapeGenerator::new(settings.landscape.clone(), generator_queue)
        .context("starting landscape workers")?;

    let player = spawn_player(
        &mut manager,
        Vec3::ZERO,
        settings.spawner.clone(),
        Rc::clone(&physics),
    );
    let walk = Vec3::new(1.0, 0.0, 1.0).normalize() * settings.simulation.walk_speed;
    manager
        .cast_to::<Player>(player, PLAYER)
        .context("player component missing")?
        .walk = walk;
    spawn_world_entity_spawner(&mut manager, WorldEntityGenerator::new())
        .context("spawning world entity spawner")?;

    tracing::info!(
        systems = ?manager.system_names().collect::<Vec<_>>(),
        frames = settings.simulation.frames,
        "simulation starting"
    );

    let mut time = SimulationTime::new();
    let mut timer = FrameTimer::new(120);
    let fire_interval = settings.simulation.fire_interval;

    for frame in 0..settings.simulation.frames {
        timer.begin();

        if let Some(position) = manager.node(player).map(|node| node.transform.position) {
            generator.set_position(position);
        }
        if fire_interval > 0 && frame % fire_interval == 0 {
            input_events.push(InputEvent::pressed(InputKind::PrimaryAction));
        }
        manager.update(time.advance_tick());

        timer.end();
    }

    // Let in-flight tiles land, then deliver their events.
    generator.wait_idle();
    manager.update(time.advance_tick());

    let position = manager
        .node(player)
        .map(|node| node.transform.position)
        .unwrap_or_default();
    tracing::info!(
        frames = manager.frame(),
        simulated_secs = time.elapsed().as_secs_f32(),
        live = manager.live_count(),
        scene_nodes = manager.scene_root().children().count(),
        anchors = manager.get_components(REGION_ANCHOR).len(),
        bullets = manager.get_components(BOX_BULLET).len(),
        tiles = generator.ready_tiles(),
        ?position,
        ground = ?generator.height_at(position.x, position.z),
        "simulation finished"
    );
    tracing::info!(
        "frame time {:.3}ms avg, {:.3}ms worst",
        timer.frame_time_ms(),
        timer.worst_frame_ms()
    );
    for (name, timing) in manager.profiler().report() {
        tracing::info!(system = %name, calls = timing.calls, total = ?timing.total, "system timing");
    }

    Ok(())
}
