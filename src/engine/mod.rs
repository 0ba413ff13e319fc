//! Raycasting core: the DDA, player interaction and the [`Engine`] façade
//! that ties map, pose, textures and a [`Renderer`](crate::renderer::Renderer)
//! together.

#[allow(clippy::module_inception)]
mod engine;
pub mod interact;
pub mod raycast;

pub use engine::{Engine, FrameInput};
pub use interact::{Interaction, Outcome};
pub use raycast::{MAX_DISTANCE, RayHit, Side, cast_probe, cast_ray};
