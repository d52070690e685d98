use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use rusted_arena::engine::config::IDLE_ANIMATION;
use rusted_arena::game::characters::definition::STANDARD_DEFINITION;
use rusted_arena::{AnimationEngine, AnimationRegistry, CombatEvent, EngineConfig, Facing, Vector2};

/// Headless arena demo: one fighter keeps shooting at a training dummy
#[derive(Debug, Parser)]
#[command(name = "rusted-arena", version, about)]
struct Args {
    /// Animation registry JSON (defaults to the built-in table)
    #[arg(long)]
    registry: Option<PathBuf>,

    /// Engine config JSON; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated wall-clock time to run (ms)
    #[arg(long, default_value_t = 2000.0)]
    duration_ms: f64,

    /// Interval between host frames (ms)
    #[arg(long, default_value_t = 16.0)]
    tick_ms: f64,
}

fn load_registry(path: Option<&PathBuf>) -> Result<AnimationRegistry> {
    match path {
        Some(path) => AnimationRegistry::from_json_file(path)
            .with_context(|| format!("loading animations from {}", path.display())),
        None => Ok(AnimationRegistry::standard()),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}

fn log_event(event: &CombatEvent, registry: &AnimationRegistry) {
    match event {
        CombatEvent::PlaySfx { source, sfx } => info!("{source}: play sound {}", sfx.sound),
        CombatEvent::CameraShake { source, shake } => info!(
            "{source}: camera shake {} for {}ms",
            shake.intensity, shake.duration
        ),
        CombatEvent::DealDamage { source, damage } => {
            info!("{source}: damage window for {}", damage.amount)
        }
        CombatEvent::ProjectileSpawned {
            projectile,
            owner,
            position,
        } => info!("{owner}: fired {projectile} from {position}"),
        CombatEvent::ProjectileHit {
            projectile,
            target,
            damage,
            knockback,
            ..
        } => info!("{projectile} hit {target} for {damage} (knockback {knockback})"),
        CombatEvent::AnimationComplete { entity, animation } => info!(
            "{entity}: finished {}",
            registry.name(*animation).unwrap_or("?")
        ),
    }
}

fn main() -> Result<()> {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    anyhow::ensure!(
        args.tick_ms.is_finite() && args.tick_ms > 0.0,
        "--tick-ms must be positive"
    );

    info!("Starting Rusted Arena...");

    let registry = load_registry(args.registry.as_ref())?;
    let config = load_config(args.config.as_ref())?;
    info!("Loaded {} animations", registry.len());

    let mut engine = AnimationEngine::with_config(registry, config);
    engine.create_character("fighter", Vector2::new(100.0, 200.0), Facing::Right)?;
    engine.create_character("dummy", Vector2::new(400.0, 200.0), Facing::Left)?;
    engine.set_character_definition("fighter", STANDARD_DEFINITION);
    engine.start();

    let mut now = 0.0;
    while now <= args.duration_ms {
        let idle = engine.character("fighter").is_some_and(|state| {
            engine.registry().name(state.current_animation) == Some(IDLE_ANIMATION)
        });
        if idle && engine.projectiles().count() == 0 {
            engine.play_animation("fighter", "ranged")?;
        }

        engine.update(now);
        for event in engine.drain_events() {
            log_event(&event, engine.registry());
        }
        now += args.tick_ms;
    }

    engine.stop();
    let clock = engine.clock();
    info!(
        "Ran {} steps over {} host frames ({:.1}ms simulated), {} projectiles and {} effects alive",
        clock.update_count(),
        clock.frame_count(),
        engine.global_time(),
        engine.projectiles().count(),
        engine.effects().count()
    );

    Ok(())
}
