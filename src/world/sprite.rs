use glam::Vec2;

use crate::world::map::{EnemySpawn, GridMap, ObjectKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteKind {
    Enemy,
    Chest,
    Key,
    Item,
}

impl SpriteKind {
    /// Text drawn on the placeholder when the image is missing.
    pub fn label(self) -> &'static str {
        match self {
            SpriteKind::Enemy => "ENEMY",
            SpriteKind::Chest => "CHEST",
            SpriteKind::Key => "KEY",
            SpriteKind::Item => "ITEM",
        }
    }
}

/// Read-only billboard description handed to the renderer each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteRecord {
    pub kind: SpriteKind,
    pub pos: Vec2,
    /// Image name in the texture store; `None` draws the placeholder.
    pub texture: Option<String>,
    /// Chest lid state.
    pub opened: bool,
}

impl SpriteRecord {
    pub fn new(kind: SpriteKind, pos: Vec2, texture: Option<String>) -> Self {
        Self {
            kind,
            pos,
            texture,
            opened: false,
        }
    }

    /// Enemy billboard using the `<type>_idle` image.
    pub fn enemy(enemy_type: &str, pos: Vec2) -> Self {
        let texture = match enemy_type {
            "goblin" => "goblin_idle",
            "wizard" => "dark_wizard_idle",
            "boss" => "boss_idle",
            _ => "skeleton_idle",
        };
        Self::new(SpriteKind::Enemy, pos, Some(texture.to_owned()))
    }

    pub fn from_spawn(spawn: &EnemySpawn) -> Self {
        Self::enemy(&spawn.enemy_type, spawn.pos)
    }

    /// Chests, keys and loose items found in the map layout.
    pub fn scan_items(map: &GridMap) -> Vec<SpriteRecord> {
        map.object_cells()
            .filter_map(|(gx, gy, _, obj)| {
                let pos = GridMap::cell_centre(gx, gy);
                let sprite = match obj.kind {
                    ObjectKind::Chest => {
                        let texture = if obj.opened { "chest_open" } else { "chest_closed" };
                        SpriteRecord {
                            opened: obj.opened,
                            ..Self::new(SpriteKind::Chest, pos, Some(texture.to_owned()))
                        }
                    }
                    ObjectKind::Key => {
                        let texture = obj.texture.clone().unwrap_or_else(|| {
                            match obj.key_type.as_deref() {
                                Some("silver") => "key_silver".into(),
                                _ => "key_gold".into(),
                            }
                        });
                        Self::new(SpriteKind::Key, pos, Some(texture))
                    }
                    ObjectKind::Item => Self::new(SpriteKind::Item, pos, obj.texture.clone()),
                    _ => return None,
                };
                Some(sprite)
            })
            .collect()
    }
}
