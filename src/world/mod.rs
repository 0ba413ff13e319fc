mod map;
pub mod overlay;
mod pose;
mod sprite;
mod texture;

pub use map::{CELL_SIZE, Cell, EnemySpawn, GridMap, MapError, ObjectKind, ObjectState};

pub use overlay::{DepthOverlaySection, Face, OverlayLayer};

pub use pose::{Pose, normalize_angle};

pub use sprite::{SpriteKind, SpriteRecord};

pub use texture::{
    FallbackCategory, LOAD_TIMEOUT, LoadRequest, TEXTURE_SIZE, Texture, TextureError,
    TextureKind, TextureStore, names,
};
