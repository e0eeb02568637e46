//! Sprite Engine demo
//!
//! Headless run: seeds a scene with random sprites, ticks it through the
//! fixed-timestep driver and logs collisions and removals.
//!
//! Usage: `sprite-engine [settings.json] [ticks] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sprite Engine (native) starting...");

    if let Err(e) = demo::run(std::env::args().skip(1).collect()) {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use sprite_engine::sim::{BoundAction, EngineEvent, EntityBuilder, EventKind, Game, Kinematics};
    use sprite_engine::{EngineError, Result, Settings};

    const DEFAULT_TICKS: u32 = 600;
    const DEFAULT_SEED: u64 = 12345;
    const SPRITE_COUNT: usize = 12;

    fn parse<T: std::str::FromStr>(arg: Option<&String>, default: T, what: &str) -> Result<T> {
        match arg {
            Some(s) => s
                .parse()
                .map_err(|_| EngineError::InvalidArgument(format!("bad {what}: {s}"))),
            None => Ok(default),
        }
    }

    pub fn run(args: Vec<String>) -> Result<()> {
        let settings = match args.first() {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let ticks: u32 = parse(args.get(1), DEFAULT_TICKS, "tick count")?;
        let seed: u64 = parse(args.get(2), DEFAULT_SEED, "seed")?;

        let mut game = Game::new(settings.clone())?;
        let scene = game.make_scene("demo")?;
        scene.on(EventKind::Collision, |e| {
            if let EngineEvent::Collision { first, second } = e {
                log::info!("Collision: {first} hit {second}");
            }
        });
        scene.on(EventKind::MarkedForDeletion, |e| {
            if let EngineEvent::MarkedForDeletion(id) = e {
                log::info!("Sprite {id} left the scene");
            }
        });

        let mut rng = Pcg32::seed_from_u64(seed);
        log::info!("Spawning {SPRITE_COUNT} sprites with seed: {seed}");
        let actions = [
            BoundAction::Wrap,
            BoundAction::Bounce,
            BoundAction::Destroy,
            BoundAction::None,
        ];

        for i in 0..SPRITE_COUNT {
            let size: f32 = rng.random_range(8.0..32.0);
            let x = rng.random_range(0.0..settings.scene_width);
            let y = rng.random_range(0.0..settings.scene_height);
            let kinematics = Kinematics::new()
                .with_velocity(rng.random_range(-4.0..4.0), rng.random_range(-4.0..4.0))
                .with_bound_action(actions[i % actions.len()]);
            let builder = EntityBuilder::new(size, size)
                .named(format!("sprite-{i}"))
                .at(x, y)
                .heading(rng.random_range(0.0..360.0))
                .kinematic(kinematics);
            if let Err(e) = scene.spawn(builder) {
                log::warn!("Skipping sprite {i}: {e}");
            }
        }

        // A fixed obstacle in the middle
        scene.spawn(
            EntityBuilder::new(40.0, 40.0)
                .named("obstacle")
                .at(settings.scene_width / 2.0, settings.scene_height / 2.0)
                .heading(45.0),
        )?;

        game.start();
        let frame = settings.tick_dt();
        while game.ticks() < u64::from(ticks) {
            game.advance(frame);
            let Some(scene) = game.scene("demo") else {
                break;
            };
            if scene.is_empty() {
                log::info!("Scene emptied after {} ticks", game.ticks());
                break;
            }
        }
        game.stop();
        report(&game)
    }

    fn report(game: &Game) -> Result<()> {
        for scene in game.scenes() {
            log::info!("Scene {}: {} entities remain", scene.name(), scene.len());
            for entity in scene.entities().iter().filter(|e| e.colliding()) {
                log::info!(
                    "  {} {} is colliding at {}",
                    entity.id(),
                    entity.name().unwrap_or("-"),
                    entity.position()
                );
            }
            let roster = serde_json::to_string_pretty(scene.entities())?;
            println!("{roster}");
        }
        Ok(())
    }
}
