//! Grid raycaster: DDA walls, depth-overlay decorations on wall faces,
//! billboard sprites and a first-person HUD, drawn into a software
//! frame-buffer.
//!
//! * [`world`]    – map, pose, textures, overlay placement, sprite records
//! * [`engine`]   – ray casting, interaction and the [`Engine`](engine::Engine) façade
//! * [`renderer`] – [`Renderer`](renderer::Renderer) trait and the CPU back-end
//! * [`assets`]   – JSON level / config loading and the image manifest
//! * [`config`]   – tunables with serde defaults

pub mod assets;
pub mod config;
pub mod engine;
pub mod renderer;
pub mod world;
