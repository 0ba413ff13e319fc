//! Seeded placement of decorative textures (torches, moss, skulls …) on
//! wall faces.
//!
//! Placement runs once per map load. The same map, seed and overlay set
//! always produce the same section list.

use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{info, warn};

use crate::config::OverlayConfig;
use crate::world::map::GridMap;

/// How far (in normalised texture units) a column may be from a section's
/// `position` and still show it.
pub const POSITION_TOLERANCE: f32 = 0.2;

/// Cardinal face of a wall cell. Y grows "south" (down the screen).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Face {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::North, Face::East, Face::South, Face::West];

    pub fn from_index(i: usize) -> Self {
        Self::ALL[i & 3]
    }
}

/// One decoration pinned to a wall face.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepthOverlaySection {
    pub x: i32,
    pub y: i32,
    pub face: Face,
    /// Offset along the face, `[0, 1)`.
    pub position: f32,
    pub texture: String,
    /// Height multiplier relative to the wall slice, `[0.5, 1.5)`.
    pub scale: f32,
}

/// Generate sections for `map`.
///
/// Per section the generator draws, in order: wall cell index, texture,
/// face, position, scale. Sections are not deduplicated.
pub fn generate(
    map: &GridMap,
    config: &OverlayConfig,
    overlay_textures: &[&str],
) -> Vec<DepthOverlaySection> {
    if !config.enabled {
        info!("depth overlays disabled");
        return Vec::new();
    }
    if overlay_textures.is_empty() {
        warn!("no depth overlay textures loaded, skipping placement");
        return Vec::new();
    }

    let walls = map.wall_cells();
    let density = config.density.clamp(0.0, 1.0);
    let count = (walls.len() as f64 * f64::from(density)).floor() as usize;
    if count == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(config.random_seed);
    let sections: Vec<_> = (0..count)
        .map(|_| {
            let (x, y) = walls[rng.gen_range(0..walls.len())];
            let texture = overlay_textures[rng.gen_range(0..overlay_textures.len())];
            DepthOverlaySection {
                x,
                y,
                texture: texture.to_owned(),
                face: Face::from_index(rng.gen_range(0..4)),
                position: rng.gen_range(0.0..1.0),
                scale: rng.gen_range(0.5..1.5),
            }
        })
        .collect();

    info!(
        walls = walls.len(),
        sections = sections.len(),
        seed = config.random_seed,
        "placed depth overlays"
    );
    sections
}

/// Sections grouped by `(x, y, face)`; each bucket keeps list order.
#[derive(Clone, Debug, Default)]
pub struct OverlayLayer {
    sections: Vec<DepthOverlaySection>,
    by_face: HashMap<(i32, i32, Face), SmallVec<[usize; 4]>>,
}

impl OverlayLayer {
    pub fn new(sections: Vec<DepthOverlaySection>) -> Self {
        let mut by_face: HashMap<_, SmallVec<[usize; 4]>> = HashMap::new();
        for (i, s) in sections.iter().enumerate() {
            by_face.entry((s.x, s.y, s.face)).or_default().push(i);
        }
        Self { sections, by_face }
    }

    pub fn sections(&self) -> &[DepthOverlaySection] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// First section (in generation order) on this face whose `position`
    /// lies within [`POSITION_TOLERANCE`] of `u`.
    pub fn find(&self, x: i32, y: i32, face: Face, u: f32) -> Option<&DepthOverlaySection> {
        self.by_face
            .get(&(x, y, face))?
            .iter()
            .map(|&i| &self.sections[i])
            .find(|s| (s.position - u).abs() <= POSITION_TOLERANCE)
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
