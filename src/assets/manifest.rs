//! Which image files make up a game's asset directory.
//!
//! ```text
//! <root>/textures/<wall>.png       fixed wall / door set
//! <root>/textures/depth/*.png      every file is a depth overlay
//! <root>/sprites/*.png             every file is a sprite
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::world::{LoadRequest, TextureKind, names};

/// Wall and door textures the renderer asks for by name.
pub const WALL_TEXTURES: [&str; 6] = [
    names::STONE_WALL,
    names::SECRET_WALL,
    names::DOOR_OPEN,
    names::DOOR_CLOSED,
    "brick_wall",
    "wood_wall",
];

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Every load request for an asset root, walls first, then overlays and
/// sprites in file-name order.
pub fn requests(root: impl AsRef<Path>) -> Vec<LoadRequest> {
    let root = root.as_ref();
    let textures = root.join("textures");

    let mut out: Vec<LoadRequest> = WALL_TEXTURES
        .iter()
        .map(|name| LoadRequest::new(*name, textures.join(format!("{name}.png")), TextureKind::Wall))
        .collect();

    for (name, path) in images_in(&textures.join("depth")) {
        out.push(LoadRequest::new(name, path, TextureKind::Overlay));
    }
    for (name, path) in images_in(&root.join("sprites")) {
        out.push(LoadRequest::new(name, path, TextureKind::Sprite));
    }
    out
}

/// `(stem, path)` for each image file directly inside `dir`, sorted by stem.
/// A missing directory is simply empty.
fn images_in(dir: &Path) -> Vec<(String, PathBuf)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), %err, "asset directory not readable");
            return Vec::new();
        }
    };

    let mut found: Vec<(String, PathBuf)> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .filter_map(|p| {
            let stem = p.file_stem()?.to_str()?.to_owned();
            Some((stem, p))
        })
        .collect();
    found.sort_by(|a, b| a.0.cmp(&b.0));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_overlays_and_sprites() {
        let dir = tempfile::tempdir().unwrap();
        let depth = dir.path().join("textures/depth");
        let sprites = dir.path().join("sprites");
        std::fs::create_dir_all(&depth).unwrap();
        std::fs::create_dir_all(&sprites).unwrap();
        for f in ["torch.png", "moss.png", "readme.txt"] {
            std::fs::write(depth.join(f), b"x").unwrap();
        }
        std::fs::write(sprites.join("skeleton_idle.PNG"), b"x").unwrap();

        let reqs = requests(dir.path());
        assert_eq!(reqs.len(), WALL_TEXTURES.len() + 3);
        assert!(reqs[..WALL_TEXTURES.len()]
            .iter()
            .all(|r| r.kind == TextureKind::Wall));

        let overlays: Vec<_> = reqs
            .iter()
            .filter(|r| r.kind == TextureKind::Overlay)
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(overlays, ["moss", "torch"]);
        assert_eq!(reqs.last().unwrap().name, "skeleton_idle");
    }

    #[test]
    fn empty_root_still_asks_for_walls() {
        let dir = tempfile::tempdir().unwrap();
        let reqs = requests(dir.path());
        assert_eq!(reqs.len(), WALL_TEXTURES.len());
        assert!(reqs[0].path.ends_with("textures/stone_wall.png"));
    }
}
