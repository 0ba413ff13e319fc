//! Everything read from disk: level JSON, engine config and the image
//! manifest fed to [`TextureStore::load_many`](crate::world::TextureStore::load_many).

mod loader;
pub mod manifest;

pub use loader::{LoadError, load_config, load_map, load_map_or_fallback, parse_map};
