//! gen_textures.rs - writes the placeholder art set the viewer loads.
//!
//! USAGE:
//! ```bash
//! cargo run --bin gen_textures -- --out ./assets
//! ```
//!
//! Layout produced (matches `assets::manifest`):
//! ```text
//! <out>/textures/*.png         walls and doors
//! <out>/textures/depth/*.png   depth overlays
//! <out>/sprites/*.png          billboards and the first-person hand
//! ```

use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use image::{Rgba, RgbaImage};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// Asset root receiving `textures/` and `sprites/`
    #[arg(long, value_name = "DIR", default_value = "./assets")]
    out: PathBuf,

    /// Seed for the stone speckle
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

/*──────────────────────────── Canvas ───────────────────────────────*/

/// Just enough of a 2D canvas for flat-colour placeholder art.
struct Canvas(RgbaImage);

const fn hex(rgb: u32) -> Rgba<u8> {
    Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF])
}

const fn with_alpha(c: Rgba<u8>, a: u8) -> Rgba<u8> {
    Rgba([c.0[0], c.0[1], c.0[2], a])
}

impl Canvas {
    /// Fully transparent canvas.
    fn new(size: u32) -> Self {
        Self(RgbaImage::new(size, size))
    }

    fn filled(size: u32, c: Rgba<u8>) -> Self {
        Self(RgbaImage::from_pixel(size, size, c))
    }

    fn rect(&mut self, x: u32, y: u32, w: u32, h: u32, c: Rgba<u8>) -> &mut Self {
        let (iw, ih) = self.0.dimensions();
        for py in y..(y + h).min(ih) {
            for px in x..(x + w).min(iw) {
                self.put(px, py, c);
            }
        }
        self
    }

    fn circle(&mut self, cx: i32, cy: i32, r: i32, c: Rgba<u8>) -> &mut Self {
        let (iw, ih) = self.0.dimensions();
        for py in (cy - r).max(0)..(cy + r + 1).min(ih as i32) {
            for px in (cx - r).max(0)..(cx + r + 1).min(iw as i32) {
                let (dx, dy) = (px - cx, py - cy);
                if dx * dx + dy * dy <= r * r {
                    self.put(px as u32, py as u32, c);
                }
            }
        }
        self
    }

    /// Source-over for translucent paint, plain store otherwise.
    fn put(&mut self, x: u32, y: u32, c: Rgba<u8>) {
        let a = c.0[3];
        if a == 0xFF {
            self.0.put_pixel(x, y, c);
            return;
        }
        let dst = self.0.get_pixel(x, y).0;
        let (fa, fd) = (a as u32, 255 - a as u32);
        let mix = |s: u8, d: u8| ((s as u32 * fa + d as u32 * fd) / 255) as u8;
        let out_a = (fa + dst[3] as u32 * fd / 255).min(255) as u8;
        self.0.put_pixel(
            x,
            y,
            Rgba([mix(c.0[0], dst[0]), mix(c.0[1], dst[1]), mix(c.0[2], dst[2]), out_a]),
        );
    }
}

/*──────────────────────────── Walls ────────────────────────────────*/

fn stone(rng: &mut ChaCha8Rng) -> Canvas {
    let mut c = Canvas::filled(64, hex(0x555555));
    for y in 0..4 {
        for x in 0..4 {
            let inset = if (x + y) % 2 == 0 { 1 } else { 2 };
            c.rect(x * 16 + inset, y * 16 + inset, 16 - 2 * inset, 16 - 2 * inset, hex(0x777777));
        }
    }
    for _ in 0..100 {
        let (x, y) = (rng.gen_range(0..64), rng.gen_range(0..64));
        c.rect(x, y, 1, 1, hex(0x666666));
    }
    c
}

fn secret(rng: &mut ChaCha8Rng) -> Canvas {
    let mut c = stone(rng);
    c.circle(32, 32, 8, hex(0x888888));
    c
}

fn brick() -> Canvas {
    let mut c = Canvas::filled(64, hex(0xA52A2A));
    let mortar = hex(0x8B0000);
    for y in (0..64).step_by(16) {
        c.rect(0, y, 64, 2, mortar);
    }
    for x in (0..64).step_by(16) {
        c.rect(x, 0, 2, 64, mortar);
    }
    for y in (0..64).step_by(32) {
        c.rect(8, y + 16, 64, 2, mortar);
    }
    c
}

fn wood() -> Canvas {
    let mut c = Canvas::filled(64, hex(0x8B4513));
    for i in 0..8 {
        c.rect(0, i * 8, 64, 4, hex(0xA0522D));
    }
    c.circle(16, 16, 4, hex(0x654321))
        .circle(48, 40, 5, hex(0x654321));
    c
}

fn door_frame(c: &mut Canvas) {
    let frame = hex(0x654321);
    c.rect(0, 0, 64, 4, frame)
        .rect(0, 60, 64, 4, frame)
        .rect(0, 0, 4, 64, frame)
        .rect(60, 0, 4, 64, frame);
}

fn door_closed() -> Canvas {
    let mut c = Canvas::filled(64, hex(0x8B4513));
    door_frame(&mut c);
    c.circle(52, 32, 4, hex(0xFFD700));
    c
}

fn door_open() -> Canvas {
    let mut c = Canvas::filled(64, hex(0x000000));
    door_frame(&mut c);
    c
}

/*──────────────────────────── Overlays ─────────────────────────────*/

fn torch() -> Canvas {
    let mut c = Canvas::new(64);
    c.rect(29, 30, 6, 22, hex(0x654321))
        .circle(32, 24, 7, with_alpha(hex(0xFF8C00), 0xC0))
        .circle(32, 22, 4, hex(0xFFD700));
    c
}

fn moss(rng: &mut ChaCha8Rng) -> Canvas {
    let mut c = Canvas::new(64);
    for _ in 0..40 {
        let (x, y) = (rng.gen_range(0..64), rng.gen_range(40..64));
        let r = rng.gen_range(2..5);
        c.circle(x, y, r, with_alpha(hex(0x2E6B2E), 0xB0));
    }
    c
}

fn skull() -> Canvas {
    let mut c = Canvas::new(64);
    c.circle(32, 28, 12, hex(0xF8F8FF))
        .rect(24, 36, 16, 8, hex(0xF8F8FF))
        .circle(27, 27, 3, hex(0x000000))
        .circle(37, 27, 3, hex(0x000000))
        .rect(27, 40, 2, 4, hex(0x000000))
        .rect(31, 40, 2, 4, hex(0x000000))
        .rect(35, 40, 2, 4, hex(0x000000));
    c
}

/*──────────────────────────── Sprites ──────────────────────────────*/

fn player_hand() -> Canvas {
    let mut c = Canvas::new(64);
    c.rect(24, 32, 16, 32, hex(0xFFDAB9))
        .rect(28, 16, 8, 16, hex(0x8B4513))
        .rect(28, 0, 8, 16, hex(0xC0C0C0));
    c
}

fn skeleton() -> Canvas {
    let bone = hex(0xF8F8FF);
    let mut c = Canvas::new(64);
    c.circle(32, 16, 12, bone)
        .rect(24, 28, 16, 24, bone)
        .rect(16, 28, 8, 16, bone)
        .rect(40, 28, 8, 16, bone)
        .rect(24, 52, 8, 12, bone)
        .rect(32, 52, 8, 12, bone)
        .circle(28, 14, 2, hex(0x000000))
        .circle(36, 14, 2, hex(0x000000));
    c
}

fn key(metal: Rgba<u8>) -> Canvas {
    let mut c = Canvas::new(32);
    c.circle(10, 10, 6, metal)
        .circle(10, 10, 2, hex(0x000000))
        .rect(16, 8, 12, 4, metal)
        .rect(22, 12, 2, 4, metal)
        .rect(26, 12, 2, 6, metal);
    c
}

fn chest(open: bool) -> Canvas {
    let mut c = Canvas::new(64);
    c.rect(8, 24, 48, 32, hex(0x8B4513));
    if open {
        c.rect(8, 8, 48, 8, hex(0xA0522D))
            .rect(28, 8, 8, 4, hex(0xFFD700));
    } else {
        c.rect(8, 16, 48, 8, hex(0xA0522D))
            .rect(28, 20, 8, 4, hex(0xFFD700));
    }
    c.rect(8, 40, 48, 2, hex(0x654321))
        .rect(16, 24, 2, 32, hex(0x654321))
        .rect(46, 24, 2, 32, hex(0x654321));
    if open {
        c.rect(10, 26, 44, 14, hex(0x000000))
            .rect(16, 30, 32, 6, with_alpha(hex(0xFFD700), 0x80));
    }
    c
}

fn health_potion() -> Canvas {
    let mut c = Canvas::new(32);
    c.rect(10, 12, 12, 16, hex(0x8B0000))
        .rect(12, 8, 8, 4, hex(0xA52A2A))
        .rect(12, 4, 8, 4, hex(0xFFD700))
        .rect(14, 14, 4, 8, with_alpha(hex(0xFFFFFF), 0x80));
    c
}

/*====================================================================*/

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let opts = Opts::parse();
    let mut rng = ChaCha8Rng::seed_from_u64(opts.seed);

    let textures = opts.out.join("textures");
    let depth = textures.join("depth");
    let sprites = opts.out.join("sprites");

    let set: Vec<(PathBuf, Canvas)> = vec![
        (textures.join("stone_wall.png"), stone(&mut rng)),
        (textures.join("secret_wall.png"), secret(&mut rng)),
        (textures.join("brick_wall.png"), brick()),
        (textures.join("wood_wall.png"), wood()),
        (textures.join("door_closed.png"), door_closed()),
        (textures.join("door_open.png"), door_open()),
        (depth.join("torch.png"), torch()),
        (depth.join("moss.png"), moss(&mut rng)),
        (depth.join("skull.png"), skull()),
        (sprites.join("player_hand.png"), player_hand()),
        (sprites.join("skeleton_idle.png"), skeleton()),
        (sprites.join("key_gold.png"), key(hex(0xFFD700))),
        (sprites.join("key_silver.png"), key(hex(0xC0C0C0))),
        (sprites.join("chest_closed.png"), chest(false)),
        (sprites.join("chest_open.png"), chest(true)),
        (sprites.join("health_potion.png"), health_potion()),
    ];

    for dir in [&textures, &depth, &sprites] {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    for (path, canvas) in &set {
        canvas
            .0
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    info!(count = set.len(), out = %opts.out.display(), "textures written");
    Ok(())
}
