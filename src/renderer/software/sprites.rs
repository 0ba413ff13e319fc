use glam::{Vec2, vec2};
use tracing::debug;

use crate::{
    renderer::{RenderContext, RenderError, Rgba, rgb, software::Software},
    world::{SpriteKind, SpriteRecord, Texture},
};

/// Chests closer than this ignore the z-buffer and glow.
const CHEST_ALWAYS_VISIBLE: f32 = 3.0;
/// Chests closer than this show the interaction hint.
const CHEST_HINT: f32 = 1.5;

const PLACEHOLDER: Rgba = rgb(0xFF, 0x00, 0x00);
const PLACEHOLDER_ALPHA: f32 = 0.5;
const GLOW: Rgba = rgb(0xFF, 0xD7, 0x00);
const HINT: Rgba = rgb(0xFF, 0xFF, 0xFF);

/// A sprite after projection into screen space.
#[derive(Clone, Copy, Debug)]
struct VisSprite<'a> {
    rec: &'a SpriteRecord,
    /// Camera-space depth.
    depth: f32,
    /// Projected centre column.
    screen_x: f32,
    /// Square on-screen size in pixels.
    size: f32,
}

impl VisSprite<'_> {
    fn x_range(&self, width: usize) -> (i32, i32) {
        let x0 = (self.screen_x - self.size * 0.5) as i32;
        let x1 = (self.screen_x + self.size * 0.5) as i32;
        (x0.max(0), x1.min(width as i32))
    }

    #[inline]
    fn is_close_chest(&self) -> bool {
        self.rec.kind == SpriteKind::Chest && self.depth < CHEST_ALWAYS_VISIBLE
    }
}

/// Camera basis for billboard projection.
#[derive(Clone, Copy, Debug)]
struct Basis {
    dir: Vec2,
    plane: Vec2,
    inv_det: f32,
}

impl Basis {
    fn new(angle: f32, fov: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let dir = vec2(c, s);
        let plane = vec2(-dir.y, dir.x) * (fov * 0.5).tan();
        let inv_det = 1.0 / (plane.x * dir.y - dir.x * plane.y);
        Self { dir, plane, inv_det }
    }

    /// `(transform_x, transform_y)`: lateral offset and depth.
    fn to_camera(&self, rel: Vec2) -> Vec2 {
        vec2(
            self.inv_det * (self.dir.y * rel.x - self.dir.x * rel.y),
            self.inv_det * (-self.plane.y * rel.x + self.plane.x * rel.y),
        )
    }
}

impl Software {
    /// Far to near, clipped against the wall z-buffer.
    pub(super) fn draw_sprites(&mut self, ctx: &RenderContext<'_>) {
        let eye = ctx.pose.pos;
        let basis = Basis::new(ctx.pose.angle(), ctx.config.fov());
        let (w, h) = (self.width as f32, self.height as f32);

        let mut order: Vec<(f32, &SpriteRecord)> = Vec::with_capacity(ctx.sprites.len());
        for rec in ctx.sprites {
            if !rec.pos.is_finite() {
                let err = RenderError::BadSprite {
                    x: rec.pos.x,
                    y: rec.pos.y,
                };
                debug!(%err, "sprite skipped");
                continue;
            }
            order.push((eye.distance_squared(rec.pos), rec));
        }
        order.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, rec) in order {
            let t = basis.to_camera(rec.pos - eye);
            if t.y <= 0.0 {
                continue;
            }
            let vis = VisSprite {
                rec,
                depth: t.y,
                screen_x: w * 0.5 * (1.0 + t.x / t.y),
                size: (h / t.y).abs(),
            };

            if vis.is_close_chest() {
                self.draw_chest_glow(&vis, ctx.time_ms);
            }

            let image = rec
                .texture
                .as_deref()
                .and_then(|name| ctx.textures.pixel_data(name));
            let drawn = match image {
                Some(tex) => self.draw_billboard(&vis, tex),
                None => Err(RenderError::EmptyTexture {
                    name: rec.kind.label().to_owned(),
                }),
            };
            if let Err(err) = drawn {
                if !matches!(err, RenderError::EmptyTexture { .. }) {
                    debug!(kind = rec.kind.label(), %err, "sprite fell back to placeholder");
                }
                self.draw_placeholder(&vis);
            }

            if vis.is_close_chest() && vis.depth < CHEST_HINT && !rec.opened {
                let y = (self.half_h + vis.size * 0.5).min(self.height as f32) as i32 + 4;
                self.fb
                    .draw_text_centered("PRESS E", vis.screen_x as i32, y, 1, HINT);
            }
        }
    }

    #[inline]
    fn column_visible(&self, vis: &VisSprite<'_>, x: i32) -> bool {
        vis.is_close_chest() || vis.depth < self.zbuf[x as usize]
    }

    fn draw_billboard(&mut self, vis: &VisSprite<'_>, tex: &Texture) -> Result<(), RenderError> {
        if tex.w == 0 || tex.h == 0 {
            return Err(RenderError::EmptyTexture {
                name: tex.name.clone(),
            });
        }
        let left = vis.screen_x - vis.size * 0.5;
        let top = self.half_h - vis.size * 0.5;
        let (x0, x1) = vis.x_range(self.width);
        let step = tex.h as f32 / vis.size;
        // screen rows covered, clamped in f32 so huge near sprites stay in range
        let y0 = top.max(0.0) as i32;
        let y1 = (top + vis.size).min(self.height as f32) as i32;

        for x in x0..x1 {
            if !self.column_visible(vis, x) {
                continue;
            }
            let tx = (((x as f32 - left) * tex.w as f32 / vis.size) as usize).min(tex.w - 1);
            for y in y0..y1 {
                let ty = (((y as f32 - top) * step) as usize).min(tex.h - 1);
                let texel = tex.texel(tx, ty).ok_or_else(|| RenderError::TexelOutOfRange {
                    name: tex.name.clone(),
                    x: tx,
                    y: ty,
                })?;
                if texel[3] == 0 {
                    continue;
                }
                self.fb.put(x, y, rgb(texel[0], texel[1], texel[2]));
            }
        }
        Ok(())
    }

    /// Translucent red box with the sprite kind written on it.
    fn draw_placeholder(&mut self, vis: &VisSprite<'_>) {
        let top = (self.half_h - vis.size * 0.5).max(0.0);
        let bottom = (self.half_h + vis.size * 0.5).min(self.height as f32);
        let rows = (bottom - top) as i32;
        let top = top as i32;
        let (x0, x1) = vis.x_range(self.width);
        let mut any = false;
        for x in x0..x1 {
            if self.column_visible(vis, x) {
                self.fb
                    .blend_rect(x, top, 1, rows, PLACEHOLDER, PLACEHOLDER_ALPHA);
                any = true;
            }
        }
        if any {
            let scale = if vis.size >= 48.0 { 2 } else { 1 };
            self.fb.draw_text_centered(
                vis.rec.kind.label(),
                vis.screen_x as i32,
                self.half_h as i32 - 2 * scale,
                scale,
                HINT,
            );
        }
    }

    /// Pulsing halo behind a nearby chest.
    fn draw_chest_glow(&mut self, vis: &VisSprite<'_>, time_ms: u64) {
        let t = time_ms as f32;
        let intensity = 0.25 + 0.15 * (t / 200.0).sin();
        let grow = 1.2 + 0.1 * (t / 300.0).sin();
        let half = vis.size * grow * 0.5;
        let (w, h) = (self.width as f32, self.height as f32);
        let x0 = (vis.screen_x - half).clamp(0.0, w);
        let x1 = (vis.screen_x + half).clamp(0.0, w);
        let y0 = (self.half_h - half).clamp(0.0, h);
        let y1 = (self.half_h + half).clamp(0.0, h);
        self.fb.blend_rect(
            x0 as i32,
            y0 as i32,
            (x1 - x0) as i32,
            (y1 - y0) as i32,
            GLOW,
            intensity,
        );
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
