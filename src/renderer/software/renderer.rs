use tracing::trace;

use crate::renderer::{
    DebugFlags, Framebuffer, RenderContext, RenderError, Renderer, Rgba, rgb,
};

pub const CEILING: Rgba = rgb(0x33, 0x33, 0x33);
pub const FLOOR: Rgba = rgb(0x55, 0x55, 0x55);

const BANNER_BG: Rgba = rgb(0x60, 0x00, 0x00);
const BANNER_FG: Rgba = rgb(0xFF, 0xFF, 0xFF);

#[derive(Default)]
pub struct Software {
    pub(super) fb: Framebuffer,
    /// Wall distance per screen column, written by the wall pass.
    pub(super) zbuf: Vec<f32>,

    pub(super) width: usize,
    pub(super) height: usize,
    pub(super) half_h: f32,
}

impl Software {
    pub fn new() -> Self {
        Self::default()
    }

    /// The finished (or in-progress) frame.
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Per-column wall distances from the last frame.
    pub fn depth(&self) -> &[f32] {
        &self.zbuf
    }

    fn check_inputs(&self, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::NoViewport {
                width: self.width,
                height: self.height,
            });
        }
        let p = ctx.pose;
        if !(p.pos.is_finite() && p.angle().is_finite()) {
            return Err(RenderError::BadPose {
                x: p.pos.x,
                y: p.pos.y,
                angle: p.angle(),
            });
        }
        Ok(())
    }

    pub(super) fn draw_background(&mut self) {
        let half = self.height as i32 / 2;
        let w = self.width as i32;
        self.fb.clear(0);
        self.fb.fill_rect(0, 0, w, half, CEILING);
        self.fb.fill_rect(0, half, w, self.height as i32 - half, FLOOR);
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize) {
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.half_h = h as f32 * 0.5;
            self.fb.resize(w, h);
            self.zbuf.resize(w, 0.0);
        }
        self.fb.clear(0);
        self.zbuf.fill(f32::INFINITY);
    }

    /// Background, walls, sprites, weapon, optional debug map, text.
    fn draw_frame(&mut self, ctx: &RenderContext<'_>) -> Result<(), RenderError> {
        self.check_inputs(ctx)?;

        self.draw_background();
        self.draw_walls(ctx);
        self.draw_sprites(ctx);
        self.draw_weapon(ctx);

        if ctx.debug.contains(DebugFlags::MAP_OVERLAY) {
            self.draw_debug_map(ctx);
        }
        self.draw_diagnostics(ctx);

        trace!(w = self.width, h = self.height, "frame drawn");
        Ok(())
    }

    fn draw_error(&mut self, message: &str) {
        let (w, h) = (self.width as i32, self.height as i32);
        if w == 0 || h == 0 {
            return;
        }
        let scale = if w >= 320 { 2 } else { 1 };
        let line = 7 * scale;
        let top = h / 2 - line;
        self.fb.fill_rect(0, top - 4, w, line * 2 + 8, BANNER_BG);
        self.fb
            .draw_text_centered("RENDER ERROR", w / 2, top, scale, BANNER_FG);
        self.fb
            .draw_text_centered(&message.to_uppercase(), w / 2, top + line, 1, BANNER_FG);
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(self.fb.pixels(), self.width, self.height);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
