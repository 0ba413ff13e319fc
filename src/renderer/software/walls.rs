use tracing::debug;

use crate::{
    engine::raycast::{MAX_DISTANCE, RayHit, Side, cast_ray},
    renderer::{RenderContext, RenderError, Rgba, rgb, software::Software},
    world::{CELL_SIZE, DepthOverlaySection, Texture},
};

/// Multiplier for faces hit on a Y step.
pub const Y_SIDE_SHADE: f32 = 0.7;
/// Untextured fallback base colour for X-side faces.
pub const FLAT_X_SIDE: u8 = 200;
/// Untextured fallback base colour for Y-side faces.
pub const FLAT_Y_SIDE: u8 = 150;

/// Linear distance fade, 1 at the eye and 0 at `MAX_DISTANCE`.
#[inline]
pub fn brightness(distance: f32) -> f32 {
    (1.0 - distance / MAX_DISTANCE).clamp(0.0, 1.0)
}

#[inline(always)]
fn scale_channel(c: u8, f: f32) -> u8 {
    (c as f32 * f) as u8
}

#[inline(always)]
fn shade(rgba: [u8; 4], f: f32) -> Rgba {
    rgb(
        scale_channel(rgba[0], f),
        scale_channel(rgba[1], f),
        scale_channel(rgba[2], f),
    )
}

/// Vertical extent of one wall slice on screen.
#[derive(Clone, Copy, Debug)]
struct Slice {
    top: f32,
    height: f32,
}

impl Software {
    /// One ray per column, left to right; fills the z-buffer.
    pub(super) fn draw_walls(&mut self, ctx: &RenderContext<'_>) {
        let fov = ctx.config.fov();
        let step = fov / self.width as f32;
        let start = ctx.pose.angle() - fov * 0.5;
        let debug = ctx.tint_secrets();

        for col in 0..self.width {
            let hit = cast_ray(ctx.pose.pos, start + col as f32 * step, ctx.map, debug);
            self.zbuf[col] = hit.distance;
            self.draw_column(col, &hit, ctx);
        }
    }

    fn draw_column(&mut self, col: usize, hit: &RayHit, ctx: &RenderContext<'_>) {
        let h = self.height as f32;
        let height = (CELL_SIZE * h / hit.distance).min(h);
        let slice = Slice {
            top: self.half_h - height * 0.5,
            height,
        };
        let light = brightness(hit.distance);
        let side_shade = match hit.side {
            Side::X => 1.0,
            Side::Y => Y_SIDE_SHADE,
        };

        let textured = match ctx.textures.pixel_data(hit.texture) {
            Some(tex) => self.textured_strip(col, slice, hit.texture_x, tex, light * side_shade),
            None => Err(RenderError::EmptyTexture {
                name: hit.texture.to_owned(),
            }),
        };
        if let Err(err) = textured {
            if !matches!(err, RenderError::EmptyTexture { .. }) {
                debug!(col, %err, "wall column fell back to flat shading");
            }
            self.flat_strip(col, slice, hit.side, light * side_shade);
        }

        if hit.solid && ctx.config.depth_textures.visible_at(hit.distance) {
            let u = hit.u();
            if let Some(section) = ctx.overlays.find(hit.map_x, hit.map_y, hit.face(), u) {
                if let Err(err) = self.overlay_strip(col, slice, section, ctx, light) {
                    debug!(col, %err, "depth overlay skipped");
                }
            }
        }
    }

    fn flat_strip(&mut self, col: usize, slice: Slice, side: Side, factor: f32) {
        let base = match side {
            Side::X => FLAT_X_SIDE,
            Side::Y => FLAT_Y_SIDE,
        };
        let c = scale_channel(base, factor);
        let rows = slice.height as i32;
        self.fb
            .fill_rect(col as i32, slice.top as i32, 1, rows, rgb(c, c, c));
    }

    /// Nearest-neighbour copy of texture column `tex_x` into screen column `col`.
    fn textured_strip(
        &mut self,
        col: usize,
        slice: Slice,
        tex_x: usize,
        tex: &Texture,
        factor: f32,
    ) -> Result<(), RenderError> {
        if tex.w == 0 || tex.h == 0 {
            return Err(RenderError::EmptyTexture {
                name: tex.name.clone(),
            });
        }
        let tx = tex_x % tex.w;
        let rows = slice.height as usize;
        let top = slice.top as i32;
        let v_step = tex.h as f32 / slice.height;

        for y in 0..rows {
            let ty = (y as f32 * v_step) as usize;
            let texel = tex.texel(tx, ty).ok_or_else(|| RenderError::TexelOutOfRange {
                name: tex.name.clone(),
                x: tx,
                y: ty,
            })?;
            self.fb.put(col as i32, top + y as i32, shade(texel, factor));
        }
        Ok(())
    }

    /// Second pass over the slice: overlay texels replace wall pixels
    /// wherever their alpha is non-zero. No side shading.
    fn overlay_strip(
        &mut self,
        col: usize,
        slice: Slice,
        section: &DepthOverlaySection,
        ctx: &RenderContext<'_>,
        light: f32,
    ) -> Result<(), RenderError> {
        let Some(tex) = ctx.textures.pixel_data(&section.texture) else {
            return Ok(());
        };
        if tex.w == 0 || tex.h == 0 {
            return Err(RenderError::EmptyTexture {
                name: tex.name.clone(),
            });
        }

        let height = slice.height * section.scale;
        let top = (self.half_h - height * 0.5) as i32;
        let tx = ((section.position * tex.w as f32) as usize).min(tex.w - 1);
        let v_step = tex.h as f32 / height;

        for y in 0..height as usize {
            let ty = ((y as f32 * v_step) as usize).min(tex.h - 1);
            let texel = tex.texel(tx, ty).ok_or_else(|| RenderError::TexelOutOfRange {
                name: tex.name.clone(),
                x: tx,
                y: ty,
            })?;
            if texel[3] == 0 {
                continue;
            }
            self.fb.put(col as i32, top + y as i32, shade(texel, light));
        }
        Ok(())
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::renderer::{DebugFlags, Renderer, channels};
    use crate::world::{Face, GridMap, OverlayLayer, Pose, TextureKind, TextureStore, names};
    use glam::vec2;
    use std::collections::HashMap;

    const W: usize = 40;
    const H: usize = 40;

    // player in the only open cell, east wall half a cell away
    fn pocket() -> GridMap {
        GridMap::from_rows(&["WWW", "W.W", "WWW"], HashMap::new()).unwrap()
    }

    fn render(
        map: &GridMap,
        textures: &TextureStore,
        overlays: &OverlayLayer,
        config: &EngineConfig,
        angle: f32,
    ) -> Software {
        let ctx = RenderContext {
            pose: Pose::new(vec2(1.5, 1.5), angle),
            map,
            sprites: &[],
            textures,
            overlays,
            config,
            debug: DebugFlags::empty(),
            attacking: false,
            time_ms: 0,
        };
        let mut sw = Software::new();
        sw.begin_frame(W, H);
        sw.draw_background();
        sw.draw_walls(&ctx);
        sw
    }

    fn px(sw: &Software, x: usize, y: usize) -> [u8; 3] {
        channels(sw.fb.pixels()[y * W + x])
    }

    #[test]
    fn brightness_curve() {
        assert_eq!(brightness(0.0), 1.0);
        assert_eq!(brightness(10.0), 0.5);
        assert_eq!(brightness(25.0), 0.0);
    }

    #[test]
    fn flat_fallback_when_no_texture() {
        let (map, cfg) = (pocket(), EngineConfig::default());
        let sw = render(&map, &TextureStore::new(), &OverlayLayer::default(), &cfg, 0.0);
        // centre column hits the X-side east wall at 0.5; full-height slice
        let c = scale_channel(FLAT_X_SIDE, brightness(0.5));
        assert_eq!(px(&sw, W / 2, 0), [c, c, c]);
        assert_eq!(px(&sw, W / 2, H - 1), [c, c, c]);

        let sw = render(&map, &TextureStore::new(), &OverlayLayer::default(), &cfg, 1.5708);
        let c = scale_channel(FLAT_Y_SIDE, brightness(0.5) * Y_SIDE_SHADE);
        assert_eq!(px(&sw, W / 2, H / 2), [c, c, c]);
    }

    #[test]
    fn textured_column_is_shaded() {
        let map = pocket();
        let mut textures = TextureStore::new();
        textures.insert(
            names::STONE_WALL,
            TextureKind::Wall,
            Texture::solid(names::STONE_WALL, 64, 64, [100, 200, 40, 255]),
        );
        let cfg = EngineConfig::default();
        let sw = render(&map, &textures, &OverlayLayer::default(), &cfg, 0.0);
        let f = brightness(0.5);
        assert_eq!(
            px(&sw, W / 2, H / 2),
            [
                scale_channel(100, f),
                scale_channel(200, f),
                scale_channel(40, f)
            ]
        );
    }

    #[test]
    fn corrupt_texture_degrades_to_flat() {
        let map = pocket();
        let mut textures = TextureStore::new();
        let broken = Texture {
            name: names::STONE_WALL.into(),
            w: 64,
            h: 64,
            pixels: vec![255; 16],
        };
        textures.insert(names::STONE_WALL, TextureKind::Wall, broken);
        let cfg = EngineConfig::default();
        let sw = render(&map, &textures, &OverlayLayer::default(), &cfg, 0.0);
        let c = scale_channel(FLAT_X_SIDE, brightness(0.5));
        assert_eq!(px(&sw, W / 2, H / 2), [c, c, c]);
    }

    #[test]
    fn overlay_replaces_opaque_texels_only() {
        let map = pocket();
        let mut textures = TextureStore::new();
        textures.insert(
            names::STONE_WALL,
            TextureKind::Wall,
            Texture::solid(names::STONE_WALL, 64, 64, [10, 10, 10, 255]),
        );
        // top half transparent, bottom half opaque white
        let mut pixels = Vec::new();
        for y in 0..8 {
            let a = if y < 4 { 0 } else { 255 };
            for _ in 0..8 {
                pixels.extend_from_slice(&[255, 255, 255, a]);
            }
        }
        textures.insert(
            "torch",
            TextureKind::Overlay,
            Texture::from_rgba("torch", 8, 8, pixels).unwrap(),
        );
        let overlays = OverlayLayer::new(vec![DepthOverlaySection {
            x: 2,
            y: 1,
            face: Face::West,
            position: 0.5,
            texture: "torch".into(),
            scale: 1.0,
        }]);
        let cfg = EngineConfig::default();
        let sw = render(&map, &textures, &overlays, &cfg, 0.0);

        let f = brightness(0.5);
        let wall = scale_channel(10, f);
        let lit = scale_channel(255, f);
        assert_eq!(px(&sw, W / 2, 2), [wall, wall, wall]);
        assert_eq!(px(&sw, W / 2, H - 2), [lit, lit, lit]);

        // out of the visibility window: plain wall
        let mut far = EngineConfig::default();
        far.depth_textures.min_distance = 1.0;
        let sw = render(&map, &textures, &overlays, &far, 0.0);
        assert_eq!(px(&sw, W / 2, H - 2), [wall, wall, wall]);
    }

    fn grey_wall_white_torch() -> TextureStore {
        let mut textures = TextureStore::new();
        textures.insert(
            names::STONE_WALL,
            TextureKind::Wall,
            Texture::solid(names::STONE_WALL, 64, 64, [10, 10, 10, 255]),
        );
        textures.insert(
            "torch",
            TextureKind::Overlay,
            Texture::solid("torch", 8, 8, [255, 255, 255, 255]),
        );
        textures
    }

    #[test]
    fn overlay_height_follows_scale() {
        let overlays = OverlayLayer::new(vec![DepthOverlaySection {
            x: 2,
            y: 1,
            face: Face::West,
            position: 0.5,
            texture: "torch".into(),
            scale: 0.5,
        }]);
        let cfg = EngineConfig::default();
        let sw = render(&pocket(), &grey_wall_white_torch(), &overlays, &cfg, 0.0);

        // full-height slice, so the overlay spans the middle 20 rows
        let f = brightness(0.5);
        let wall = scale_channel(10, f);
        let lit = scale_channel(255, f);
        assert_eq!(px(&sw, W / 2, 9), [wall, wall, wall]);
        assert_eq!(px(&sw, W / 2, 10), [lit, lit, lit]);
        assert_eq!(px(&sw, W / 2, 29), [lit, lit, lit]);
        assert_eq!(px(&sw, W / 2, 30), [wall, wall, wall]);
    }

    #[test]
    fn overlay_skips_side_shade() {
        // facing south: the wall below is a Y-side hit on its north face
        let overlays = OverlayLayer::new(vec![DepthOverlaySection {
            x: 1,
            y: 2,
            face: Face::North,
            position: 0.5,
            texture: "torch".into(),
            scale: 1.0,
        }]);
        let cfg = EngineConfig::default();
        let sw = render(&pocket(), &grey_wall_white_torch(), &overlays, &cfg, 1.5708);

        let f = brightness(0.5);
        let lit = scale_channel(255, f);
        assert_ne!(lit, scale_channel(255, f * Y_SIDE_SHADE));
        assert_eq!(px(&sw, W / 2, H / 2), [lit, lit, lit]);
        let wall = scale_channel(10, f * Y_SIDE_SHADE);
        let bare = OverlayLayer::default();
        let sw = render(&pocket(), &grey_wall_white_torch(), &bare, &cfg, 1.5708);
        assert_eq!(px(&sw, W / 2, H / 2), [wall, wall, wall]);
    }
}
