//! Static tile grid plus the per-symbol object table.
//!
//! * `layout[y][x]` is a [`Cell`]; anything that is not floor / wall / door
//!   is an object symbol whose metadata lives in the object table.
//! * Secret walls (and secret doors) are a set of grid coordinates.
//! * World → grid conversion is always `floor(coord / CELL_SIZE)`.
//!
//! The grid itself never changes after load; only [`ObjectState`]s are
//! mutated, and only by interaction calls between frames.

use std::collections::{HashMap, HashSet};

use glam::{IVec2, Vec2, vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::texture::names;

/// Edge length of one grid cell in world units.
pub const CELL_SIZE: f32 = 1.0;

/*──────────────────────────── cells ─────────────────────────────────*/

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    Floor,
    Wall,
    Door,
    /// Symbol with an entry in the object table (chest, lever, enemy …).
    Object(char),
}

impl Cell {
    pub fn from_symbol(c: char) -> Self {
        match c {
            '.' => Cell::Floor,
            'W' => Cell::Wall,
            'D' => Cell::Door,
            other => Cell::Object(other),
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Cell::Floor => '.',
            Cell::Wall => 'W',
            Cell::Door => 'D',
            Cell::Object(c) => c,
        }
    }
}

/*──────────────────────────── objects ───────────────────────────────*/

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Door,
    Chest,
    Lever,
    Key,
    Item,
    Enemy,
    #[default]
    #[serde(other)]
    Other,
}

/// Mutable metadata attached to one object symbol.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectState {
    #[serde(rename = "type", default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub open: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub opened: bool,
    #[serde(default)]
    pub activated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_type: Option<String>,
    /// Optional sprite override for items / enemies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

impl ObjectState {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }
}

/// Enemy placement discovered in the layout.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemySpawn {
    pub symbol: char,
    pub enemy_type: String,
    /// Cell centre in world units.
    pub pos: Vec2,
}

/*──────────────────────────── errors ────────────────────────────────*/

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map has no cells ({width}×{height})")]
    Empty { width: usize, height: usize },

    #[error("layout has {found} rows, header says {expected}")]
    RowCount { expected: usize, found: usize },

    #[error("layout row {row} has {found} cells, header says {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Every object symbol in the layout needs metadata.
    #[error("symbol `{symbol}` at ({x}, {y}) has no entry in `objects`")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
}

/*──────────────────────────── grid ──────────────────────────────────*/

#[derive(Clone, Debug)]
pub struct GridMap {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    objects: HashMap<char, ObjectState>,
    secrets: HashSet<(i32, i32)>,
    player_start: Option<IVec2>,
}

impl GridMap {
    /// Build a map from row-major `rows`, validating the object invariant.
    pub fn new(
        width: usize,
        height: usize,
        rows: Vec<Vec<char>>,
        objects: HashMap<char, ObjectState>,
        secrets: HashSet<(i32, i32)>,
        player_start: Option<IVec2>,
    ) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty { width, height });
        }
        if rows.len() != height {
            return Err(MapError::RowCount {
                expected: height,
                found: rows.len(),
            });
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MapError::RowWidth {
                    row: y,
                    expected: width,
                    found: row.len(),
                });
            }
            for (x, &symbol) in row.iter().enumerate() {
                let cell = Cell::from_symbol(symbol);
                if let Cell::Object(c) = cell {
                    if !objects.contains_key(&c) {
                        return Err(MapError::UnknownSymbol { symbol: c, x, y });
                    }
                }
                cells.push(cell);
            }
        }

        Ok(Self {
            width,
            height,
            cells,
            objects,
            secrets,
            player_start,
        })
    }

    /// Convenience constructor from text rows; width/height come from the rows.
    pub fn from_rows(
        rows: &[&str],
        objects: HashMap<char, ObjectState>,
    ) -> Result<Self, MapError> {
        let grid: Vec<Vec<char>> = rows.iter().map(|r| r.chars().collect()).collect();
        let width = grid.first().map_or(0, Vec::len);
        Self::new(width, grid.len(), grid, objects, HashSet::new(), None)
    }

    /// The 10×10 training room used when a level file cannot be loaded.
    pub fn fallback() -> Self {
        const ROWS: [&str; 10] = [
            "WWWWWWWWWW",
            "W........W",
            "W.WW..WW.W",
            "W.W....W.W",
            "W...WW...W",
            "W...WW...W",
            "W.W....W.W",
            "W.WW..WW.W",
            "W........W",
            "WWWWWWWWWW",
        ];
        Self {
            width: 10,
            height: 10,
            cells: ROWS
                .iter()
                .flat_map(|r| r.chars())
                .map(Cell::from_symbol)
                .collect(),
            objects: HashMap::new(),
            secrets: HashSet::new(),
            player_start: Some(IVec2::new(1, 1)),
        }
    }

    pub fn with_secrets(mut self, secrets: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.secrets.extend(secrets);
        self
    }

    pub fn with_player_start(mut self, start: IVec2) -> Self {
        self.player_start = Some(start);
        self
    }

    /*──────────────────────── queries ──────────────────────────────*/

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn player_start(&self) -> Option<IVec2> {
        self.player_start
    }

    #[inline]
    pub fn in_bounds(&self, gx: i32, gy: i32) -> bool {
        gx >= 0 && gy >= 0 && (gx as usize) < self.width && (gy as usize) < self.height
    }

    /// Cell at grid coordinates, `None` outside the map.
    #[inline]
    pub fn cell(&self, gx: i32, gy: i32) -> Option<Cell> {
        self.in_bounds(gx, gy)
            .then(|| self.cells[gy as usize * self.width + gx as usize])
    }

    /// Grid coordinates containing a world-space point.
    #[inline]
    pub fn grid_of(p: Vec2) -> (i32, i32) {
        (
            (p.x / CELL_SIZE).floor() as i32,
            (p.y / CELL_SIZE).floor() as i32,
        )
    }

    /// World-space centre of a grid cell.
    #[inline]
    pub fn cell_centre(gx: i32, gy: i32) -> Vec2 {
        vec2(
            gx as f32 * CELL_SIZE + CELL_SIZE * 0.5,
            gy as f32 * CELL_SIZE + CELL_SIZE * 0.5,
        )
    }

    pub fn is_door_open(&self) -> bool {
        self.objects.get(&'D').is_some_and(|o| o.open)
    }

    /// True for walls, closed doors and anything outside the grid.
    pub fn blocks(&self, gx: i32, gy: i32) -> bool {
        match self.cell(gx, gy) {
            None | Some(Cell::Wall) => true,
            Some(Cell::Door) => !self.is_door_open(),
            Some(_) => false,
        }
    }

    /// World-space wall test used by collision.
    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        let (gx, gy) = Self::grid_of(vec2(x, y));
        self.blocks(gx, gy)
    }

    pub fn is_secret(&self, gx: i32, gy: i32) -> bool {
        self.secrets.contains(&(gx, gy))
    }

    pub fn is_secret_wall(&self, gx: i32, gy: i32) -> bool {
        self.cell(gx, gy) == Some(Cell::Wall) && self.is_secret(gx, gy)
    }

    /// Texture name for the wall face at a grid cell.
    ///
    /// Secret walls only differ from ordinary stone while `debug` is set.
    pub fn wall_texture_name_at(&self, gx: i32, gy: i32, debug: bool) -> &'static str {
        match self.cell(gx, gy) {
            Some(Cell::Wall) if debug && self.is_secret(gx, gy) => names::SECRET_WALL_DEBUG,
            Some(Cell::Door) => {
                let secret = debug && self.is_secret(gx, gy);
                match (self.is_door_open(), secret) {
                    (true, false) => names::DOOR_OPEN,
                    (false, false) => names::DOOR_CLOSED,
                    (true, true) => names::DOOR_OPEN_DEBUG,
                    (false, true) => names::DOOR_CLOSED_DEBUG,
                }
            }
            _ => names::STONE_WALL,
        }
    }

    /// Row-major list of every `W` cell.
    pub fn wall_cells(&self) -> Vec<(i32, i32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Wall)
            .map(|(i, _)| ((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    /// Metadata for an object symbol; doors are keyed by `D`.
    pub fn object(&self, symbol: char) -> Option<&ObjectState> {
        self.objects.get(&symbol)
    }

    pub fn object_mut(&mut self, symbol: char) -> Option<&mut ObjectState> {
        self.objects.get_mut(&symbol)
    }

    /// Object symbol at a cell, if it has metadata (doors included).
    pub fn object_symbol_at(&self, gx: i32, gy: i32) -> Option<char> {
        match self.cell(gx, gy)? {
            Cell::Floor | Cell::Wall => None,
            c => self.objects.contains_key(&c.symbol()).then_some(c.symbol()),
        }
    }

    /// Clear the `locked` flag of an object; returns whether it was locked.
    pub fn unlock(&mut self, symbol: char) -> bool {
        match self.objects.get_mut(&symbol) {
            Some(obj) if obj.locked => {
                obj.locked = false;
                true
            }
            _ => false,
        }
    }

    /// Iterate `(gx, gy, symbol, state)` for every object cell, row-major.
    pub fn object_cells(&self) -> impl Iterator<Item = (i32, i32, char, &ObjectState)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            let Cell::Object(symbol) = *cell else {
                return None;
            };
            let state = self.objects.get(&symbol)?;
            Some(((i % self.width) as i32, (i / self.width) as i32, symbol, state))
        })
    }

    /// Enemy markers in the layout, spawned at cell centres.
    pub fn enemy_spawns(&self) -> Vec<EnemySpawn> {
        self.object_cells()
            .filter(|(_, _, _, obj)| obj.kind == ObjectKind::Enemy)
            .map(|(gx, gy, symbol, obj)| EnemySpawn {
                symbol,
                enemy_type: obj.enemy_type.clone().unwrap_or_else(|| "skeleton".into()),
                pos: Self::cell_centre(gx, gy),
            })
            .collect()
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn door(open: bool) -> HashMap<char, ObjectState> {
        HashMap::from([(
            'D',
            ObjectState {
                open,
                ..ObjectState::new(ObjectKind::Door)
            },
        )])
    }

    fn corridor(open: bool) -> GridMap {
        GridMap::from_rows(&["WWWWW", "W.D.W", "WWWWW"], door(open)).unwrap()
    }

    #[test]
    fn out_of_bounds_is_wall() {
        let map = corridor(false);
        assert!(map.is_wall(-0.5, 1.5));
        assert!(map.is_wall(1.5, 99.0));
        assert!(!map.is_wall(1.5, 1.5));
    }

    #[test]
    fn closed_door_blocks_open_door_does_not() {
        assert!(corridor(false).is_wall(2.5, 1.5));
        assert!(!corridor(true).is_wall(2.5, 1.5));
    }

    #[test]
    fn unknown_symbol_rejected() {
        let err = GridMap::from_rows(&["W?W"], HashMap::new()).unwrap_err();
        assert_eq!(
            err,
            MapError::UnknownSymbol {
                symbol: '?',
                x: 1,
                y: 0
            }
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = GridMap::from_rows(&["WWW", "W."], HashMap::new()).unwrap_err();
        assert!(matches!(err, MapError::RowWidth { row: 1, .. }));
    }

    #[test]
    fn secret_wall_texture_depends_on_debug() {
        let map = corridor(false).with_secrets([(0, 1)]);
        assert!(map.is_secret_wall(0, 1));
        assert!(!map.is_secret_wall(1, 1));
        assert_eq!(map.wall_texture_name_at(0, 1, false), names::STONE_WALL);
        assert_eq!(map.wall_texture_name_at(0, 1, true), names::SECRET_WALL_DEBUG);
        assert_eq!(map.wall_texture_name_at(4, 1, true), names::STONE_WALL);
    }

    #[test]
    fn door_texture_names() {
        assert_eq!(corridor(false).wall_texture_name_at(2, 1, false), names::DOOR_CLOSED);
        assert_eq!(corridor(true).wall_texture_name_at(2, 1, false), names::DOOR_OPEN);
        let secret = corridor(false).with_secrets([(2, 1)]);
        assert_eq!(secret.wall_texture_name_at(2, 1, true), names::DOOR_CLOSED_DEBUG);
        assert_eq!(secret.wall_texture_name_at(2, 1, false), names::DOOR_CLOSED);
    }

    #[test]
    fn wall_cells_row_major() {
        let map = GridMap::from_rows(&["W.", ".W"], HashMap::new()).unwrap();
        assert_eq!(map.wall_cells(), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn enemy_spawns_at_cell_centres() {
        let objects = HashMap::from([(
            'S',
            ObjectState {
                enemy_type: Some("goblin".into()),
                ..ObjectState::new(ObjectKind::Enemy)
            },
        )]);
        let map = GridMap::from_rows(&["WWW", "WSW", "WWW"], objects).unwrap();
        let spawns = map.enemy_spawns();
        assert_eq!(spawns.len(), 1);
        assert_eq!(spawns[0].enemy_type, "goblin");
        assert_eq!(spawns[0].pos, vec2(1.5, 1.5));
    }

    #[test]
    fn fallback_room_has_start() {
        let map = GridMap::fallback();
        assert_eq!(map.width(), 10);
        assert_eq!(map.player_start(), Some(IVec2::new(1, 1)));
        assert!(!map.blocks(1, 1));
    }
}
