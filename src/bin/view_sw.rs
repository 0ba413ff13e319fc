use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use tracing::info;

use dungeon_caster::{
    assets::{self, manifest},
    engine::{Engine, FrameInput},
    renderer::Software,
    world::{SpriteRecord, TextureStore},
};

/// First-person dungeon viewer
#[derive(Parser, Debug)]
#[command(name = "view_sw")]
struct Args {
    /// Level JSON; the built-in training room is used when missing or broken
    #[arg(long)]
    map: Option<PathBuf>,

    /// Asset root holding `textures/`, `textures/depth/` and `sprites/`
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Engine config JSON
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    #[arg(long, default_value_t = 960)]
    width: usize,

    #[arg(long, default_value_t = 600)]
    height: usize,

    /// Start with debug mode on
    #[arg(long)]
    debug: bool,

    /// Override the depth overlay seed
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = assets::load_config(&args.config)
        .with_context(|| format!("reading {}", args.config.display()))?;
    if let Some(seed) = args.seed {
        config.depth_textures.random_seed = seed;
    }

    let mut textures = TextureStore::new();
    let requests = manifest::requests(&args.assets);
    let wanted = requests.len();
    let loaded = textures.load_many(requests);
    info!(loaded, wanted, root = %args.assets.display(), "assets loaded");

    let map = match &args.map {
        Some(path) => assets::load_map_or_fallback(path),
        None => dungeon_caster::world::GridMap::fallback(),
    };
    let enemies: Vec<SpriteRecord> = map
        .enemy_spawns()
        .iter()
        .map(SpriteRecord::from_spawn)
        .collect();

    let (w, h) = (args.width, args.height);
    let mut engine = Engine::new(Software::new(), textures, config, w, h);
    engine.set_map(map);
    engine.set_debug(args.debug);

    let mut win = Window::new("Dungeon Caster", w, h, WindowOptions::default())?;
    win.set_target_fps(60);

    let start = Instant::now();
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut sprites: Vec<SpriteRecord> = Vec::new();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let t0 = Instant::now();

        /* movement --------------------------------------------------------- */
        if win.is_key_down(Key::Up) || win.is_key_down(Key::W) {
            engine.move_player(1.0);
        }
        if win.is_key_down(Key::Down) || win.is_key_down(Key::S) {
            engine.move_player(-1.0);
        }
        if win.is_key_down(Key::Left) {
            engine.rotate_player(-1.0);
        }
        if win.is_key_down(Key::Right) {
            engine.rotate_player(1.0);
        }
        if win.is_key_down(Key::A) {
            engine.strafe_player(-1.0);
        }
        if win.is_key_down(Key::D) {
            engine.strafe_player(1.0);
        }

        /* actions ---------------------------------------------------------- */
        if win.is_key_pressed(Key::E, KeyRepeat::No) {
            match engine.interact() {
                Some(hit) => info!(symbol = %hit.symbol, outcome = ?hit.outcome, "interacted"),
                None => info!("nothing to use here"),
            }
        }
        if win.is_key_pressed(Key::Tab, KeyRepeat::No) {
            let on = engine.toggle_debug();
            info!(on, "debug mode");
        }
        let attacking = win.is_key_down(Key::Space);

        /* sprites: enemies are fixed, chests and pickups follow the map ---- */
        sprites.clear();
        sprites.extend(enemies.iter().cloned());
        sprites.extend(SpriteRecord::scan_items(engine.map()));

        /* draw ------------------------------------------------------------- */
        let input = FrameInput {
            sprites: &sprites,
            attacking,
            time_ms: start.elapsed().as_millis() as u64,
        };
        let mut shown = Ok(());
        engine.render(input, |fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames.max(1) as f64;
            info!("avg frame: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}
