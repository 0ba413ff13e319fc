//! Rendering abstraction layer.
//!
//! *The engine never touches a pixel buffer directly.* Each frame it
//! builds a [`RenderContext`] (pose, map, sprites, textures, flags) and
//! hands it to a type implementing [`Renderer`].
//!
//! * All inputs are passed explicitly; nothing is read from globals, so the
//!   same context always produces the same pixels.
//! * Failures inside the frame come back as [`RenderError`] so the caller
//!   can log them and draw an error banner instead of dropping the loop.

use bitflags::bitflags;
use thiserror::Error;

use crate::{
    config::EngineConfig,
    world::{GridMap, OverlayLayer, Pose, SpriteRecord, TextureStore},
};

pub mod font;
pub mod framebuffer;
pub mod software;

pub use framebuffer::Framebuffer;
pub use software::Software;

/// Pixel format of the software frame-buffer (0x00RRGGBB).
pub type Rgba = u32;

#[inline(always)]
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

#[inline(always)]
pub const fn channels(c: Rgba) -> [u8; 3] {
    [(c >> 16) as u8, (c >> 8) as u8, c as u8]
}

bitflags! {
    /// Debug switches; the viewer's toggle sets or clears all of them.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DebugFlags: u8 {
        /// Red-tinted textures on secret walls and doors.
        const TINT_SECRETS = 0b0000_0001;
        /// 2D map with player and ray fan in the top-left corner.
        const MAP_OVERLAY  = 0b0000_0010;
    }
}

/// Everything a renderer may read while drawing one frame.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub pose: Pose,
    pub map: &'a GridMap,
    pub sprites: &'a [SpriteRecord],
    pub textures: &'a TextureStore,
    pub overlays: &'a OverlayLayer,
    pub config: &'a EngineConfig,
    pub debug: DebugFlags,
    /// Drives the weapon swing; the swing phase comes from `time_ms`.
    pub attacking: bool,
    /// Frame time in milliseconds, used for animation only.
    pub time_ms: u64,
}

impl RenderContext<'_> {
    #[inline]
    pub fn tint_secrets(&self) -> bool {
        self.debug.contains(DebugFlags::TINT_SECRETS)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("texture `{name}` has no texel at ({x}, {y})")]
    TexelOutOfRange { name: String, x: usize, y: usize },

    #[error("texture `{name}` is empty")]
    EmptyTexture { name: String },

    #[error("sprite at ({x}, {y}) has a non-finite position")]
    BadSprite { x: f32, y: f32 },

    #[error("player pose is not finite: ({x}, {y}) @ {angle}")]
    BadPose { x: f32, y: f32, angle: f32 },

    #[error("frame buffer is {width}×{height}")]
    NoViewport { width: usize, height: usize },
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and clear it.
    fn begin_frame(&mut self, width: usize, height: usize);

    /// Draw the whole scene for `ctx` into the scratch buffer.
    fn draw_frame(&mut self, ctx: &RenderContext<'_>) -> Result<(), RenderError>;

    /// Replace the frame with an on-screen error message.
    fn draw_error(&mut self, message: &str);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}
