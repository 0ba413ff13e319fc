//! ---------------------------------------------------------------------------
//! Software (CPU) raycasting back-end
//!
//! * Fills an owned [`Framebuffer`](crate::renderer::Framebuffer) in
//!   **0x00RRGGBB** format.
//! * One ray per screen column; each column's hit distance lands in a
//!   per-column z-buffer that sprite drawing reads afterwards.
//! * Columns and sprites fail independently: a bad texel degrades only the
//!   column (flat colour) or sprite (labelled placeholder) it belongs to.
//! ---------------------------------------------------------------------------

mod hud;
mod renderer;
mod sprites;
mod walls;

pub use hud::{ATTACK_CYCLE_MS, AttackPhase};
pub use renderer::{CEILING, FLOOR, Software};
pub use walls::{FLAT_X_SIDE, FLAT_Y_SIDE, Y_SIDE_SHADE, brightness};
