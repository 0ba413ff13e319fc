//! Screen-space layers drawn after the 3D view: weapon, debug map, text.

use glam::Vec2;

use crate::{
    engine::raycast::cast_ray,
    renderer::{RenderContext, Rgba, font, rgb, software::Software},
    world::{Cell, GridMap},
};

/// Length of one full swing.
pub const ATTACK_CYCLE_MS: u64 = 500;

/// Image used for the first-person hand when it is loaded.
const HAND_TEXTURE: &str = "player_hand";

const BLADE: Rgba = rgb(0xC0, 0xC0, 0xC8);
const HILT: Rgba = rgb(0x8B, 0x5A, 0x2B);
const TEXT: Rgba = rgb(0xFF, 0xFF, 0xFF);

const MAP_BG: Rgba = rgb(0x00, 0x00, 0x00);
const MAP_WALL: Rgba = rgb(0xAA, 0xAA, 0xAA);
const MAP_SECRET: Rgba = rgb(0xFF, 0x40, 0x40);
const MAP_DOOR: Rgba = rgb(0x8B, 0x5A, 0x2B);
const MAP_OBJECT: Rgba = rgb(0xFF, 0xD7, 0x00);
const MAP_PLAYER: Rgba = rgb(0x00, 0xFF, 0x00);
const MAP_RAY: Rgba = rgb(0x40, 0x80, 0xFF);

/// Where the weapon is in its swing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackPhase {
    Idle,
    /// Progress `0..1` through the forward stroke.
    Forward(f32),
    /// Progress `0..1` back to rest.
    Back(f32),
}

impl AttackPhase {
    /// Phase for a frame at `time_ms`; only the time inside the current
    /// 500 ms cycle matters.
    pub fn at(attacking: bool, time_ms: u64) -> Self {
        if !attacking {
            return AttackPhase::Idle;
        }
        let t = (time_ms % ATTACK_CYCLE_MS) as f32 / ATTACK_CYCLE_MS as f32;
        if t < 0.25 {
            AttackPhase::Forward(t / 0.25)
        } else if t < 0.5 {
            AttackPhase::Back((t - 0.25) / 0.25)
        } else {
            AttackPhase::Idle
        }
    }

    /// Weapon displacement as a fraction of its size: `(left, up)`.
    fn offset(self) -> (f32, f32) {
        match self {
            AttackPhase::Idle => (0.0, 0.0),
            AttackPhase::Forward(p) => (0.5 * p, 0.3 * p),
            AttackPhase::Back(p) => (0.5 * (1.0 - p), 0.3 * (1.0 - p)),
        }
    }
}

impl Software {
    /// First-person hand in the lower right, pushed up and left mid-swing.
    pub(super) fn draw_weapon(&mut self, ctx: &RenderContext<'_>) {
        let (w, h) = (self.width as f32, self.height as f32);
        let size = (h / 3.0).max(1.0);
        let (dx, dy) = AttackPhase::at(ctx.attacking, ctx.time_ms).offset();
        let x0 = (w * 0.75 - size * 0.5 - dx * size) as i32;
        let y0 = (h - size - dy * size * 0.5) as i32;
        let s = size as i32;

        if let Some(tex) = ctx.textures.pixel_data(HAND_TEXTURE) {
            for y in 0..s {
                let ty = (y as usize * tex.h) / s as usize;
                for x in 0..s {
                    let tx = (x as usize * tex.w) / s as usize;
                    match tex.texel(tx, ty) {
                        Some(t) if t[3] > 0 => self.fb.put(x0 + x, y0 + y, rgb(t[0], t[1], t[2])),
                        _ => {}
                    }
                }
            }
            return;
        }

        // no image: a plain sword, blade up
        let blade_w = (s / 8).max(1);
        let cx = x0 + s / 2;
        self.fb
            .fill_rect(cx - blade_w / 2, y0, blade_w, s * 2 / 3, BLADE);
        self.fb
            .fill_rect(cx - s / 4, y0 + s * 2 / 3, s / 2, (s / 12).max(1), HILT);
        self.fb.fill_rect(
            cx - blade_w / 2,
            y0 + s * 2 / 3,
            blade_w,
            s - s * 2 / 3,
            HILT,
        );
    }

    /// Top-down map with walls, doors, objects, the player and a ray fan.
    pub(super) fn draw_debug_map(&mut self, ctx: &RenderContext<'_>) {
        let map = ctx.map;
        let longest = map.width().max(map.height()).max(1) as i32;
        let budget = (self.width.min(self.height) as i32) / 3;
        let cell = (budget / longest).max(2);
        let (ox, oy) = (4, 12);

        self.fb.fill_rect(
            ox - 1,
            oy - 1,
            map.width() as i32 * cell + 2,
            map.height() as i32 * cell + 2,
            MAP_BG,
        );
        for gy in 0..map.height() as i32 {
            for gx in 0..map.width() as i32 {
                let colour = match map.cell(gx, gy) {
                    Some(Cell::Wall) if map.is_secret(gx, gy) => MAP_SECRET,
                    Some(Cell::Wall) => MAP_WALL,
                    Some(Cell::Door) => MAP_DOOR,
                    Some(Cell::Object(_)) => MAP_OBJECT,
                    _ => continue,
                };
                self.fb
                    .fill_rect(ox + gx * cell, oy + gy * cell, cell, cell, colour);
            }
        }

        let to_screen = |p: Vec2| {
            (
                ox + (p.x * cell as f32) as i32,
                oy + (p.y * cell as f32) as i32,
            )
        };
        let (px, py) = to_screen(ctx.pose.pos);

        // a fan of rays, every eighth column
        let fov = ctx.config.fov();
        let rays = (self.width / 8).max(2);
        let start = ctx.pose.angle() - fov * 0.5;
        for i in 0..=rays {
            let angle = start + fov * i as f32 / rays as f32;
            let hit = cast_ray(ctx.pose.pos, angle, map, ctx.tint_secrets());
            let end = ctx.pose.pos + Vec2::from_angle(angle) * hit.distance;
            let (ex, ey) = to_screen(end);
            self.fb.draw_line(px, py, ex, ey, MAP_RAY);
        }

        self.fb.fill_rect(px - 1, py - 1, 3, 3, MAP_PLAYER);
        let (fx, fy) = to_screen(ctx.pose.pos + ctx.pose.forward() * 0.8);
        self.fb.draw_line(px, py, fx, fy, MAP_PLAYER);
    }

    /// Pose readout, plus a debug marker while debug mode is on.
    pub(super) fn draw_diagnostics(&mut self, ctx: &RenderContext<'_>) {
        let p = ctx.pose;
        let (gx, gy) = GridMap::grid_of(p.pos);
        let line = format!(
            "X {:.1} Y {:.1} A {:.0} [{gx},{gy}]",
            p.pos.x,
            p.pos.y,
            p.angle().to_degrees()
        );
        self.fb.draw_text(&line, 2, 2, 1, TEXT);
        if !ctx.debug.is_empty() {
            let label = "DEBUG";
            let x = self.width as i32 - font::text_width(label, 1) - 2;
            self.fb.draw_text(label, x, 2, 1, MAP_SECRET);
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
