//! Grid DDA ray marching.
//!
//! * Rays step cell by cell along whichever axis reaches its next grid
//!   line first.
//! * Walls, closed doors and anything outside the map stop the ray.
//! * The reported distance comes from the grid line that was crossed last
//!   (`(map - pos + (1 - step) / 2) / dir`); with a unit direction that is
//!   the length of the ray up to the wall.

use glam::{IVec2, Vec2};

use crate::world::{CELL_SIZE, Cell, Face, GridMap, TEXTURE_SIZE, names, normalize_angle};

/// Longest march along either axis, in cells.
pub const MAX_DISTANCE: f32 = 20.0;

/// Which grid axis was stepped on the final DDA iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Crossed a vertical grid line (E/W face).
    X = 0,
    /// Crossed a horizontal grid line (N/S face); drawn darker.
    Y = 1,
}

/// Everything a column needs to know about one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub side: Side,
    pub map_x: i32,
    pub map_y: i32,
    /// Texel column `0..TEXTURE_SIZE` on the hit face.
    pub texture_x: usize,
    pub texture: &'static str,
    /// Step direction on each axis (±1).
    pub step: IVec2,
    /// False when the march ran out of range instead of hitting something.
    pub solid: bool,
}

impl RayHit {
    /// Face of the hit cell that the ray struck.
    pub fn face(&self) -> Face {
        match (self.side, self.step.x > 0, self.step.y > 0) {
            (Side::X, true, _) => Face::West,
            (Side::X, false, _) => Face::East,
            (Side::Y, _, true) => Face::North,
            (Side::Y, _, false) => Face::South,
        }
    }

    /// `texture_x` as a fraction of the face width.
    #[inline]
    pub fn u(&self) -> f32 {
        self.texture_x as f32 / TEXTURE_SIZE as f32
    }
}

/// Cast from `origin` along `angle` until a wall or closed door.
pub fn cast_ray(origin: Vec2, angle: f32, map: &GridMap, debug: bool) -> RayHit {
    march(origin, angle, map, MAX_DISTANCE, debug, |map, x, y| {
        map.blocks(x, y)
    })
}

/// Like [`cast_ray`] but stops at any non-floor cell (objects included)
/// within `range` cells. Used for interaction.
pub fn cast_probe(origin: Vec2, angle: f32, map: &GridMap, range: f32) -> RayHit {
    march(origin, angle, map, range, false, |map, x, y| {
        !matches!(map.cell(x, y), Some(Cell::Floor))
    })
}

fn march(
    origin: Vec2,
    angle: f32,
    map: &GridMap,
    range: f32,
    debug: bool,
    stops: impl Fn(&GridMap, i32, i32) -> bool,
) -> RayHit {
    let angle = normalize_angle(angle);
    let (sin, cos) = angle.sin_cos();
    let dir = Vec2::new(cos, sin);

    let start = IVec2::new(
        (origin.x / CELL_SIZE).floor() as i32,
        (origin.y / CELL_SIZE).floor() as i32,
    );

    // a zero component gives an infinite delta: that axis is never stepped
    let delta = Vec2::new((1.0 / dir.x).abs(), (1.0 / dir.y).abs()) * CELL_SIZE;
    let step = IVec2::new(
        if dir.x >= 0.0 { 1 } else { -1 },
        if dir.y >= 0.0 { 1 } else { -1 },
    );

    let mut side_dist = Vec2::new(
        if dir.x < 0.0 {
            (origin.x - start.x as f32 * CELL_SIZE) * delta.x / CELL_SIZE
        } else {
            ((start.x + 1) as f32 * CELL_SIZE - origin.x) * delta.x / CELL_SIZE
        },
        if dir.y < 0.0 {
            (origin.y - start.y as f32 * CELL_SIZE) * delta.y / CELL_SIZE
        } else {
            ((start.y + 1) as f32 * CELL_SIZE - origin.y) * delta.y / CELL_SIZE
        },
    );
    // 0 × ∞ is NaN when the origin sits on a grid line the ray runs along
    if dir.x == 0.0 {
        side_dist.x = f32::INFINITY;
    }
    if dir.y == 0.0 {
        side_dist.y = f32::INFINITY;
    }

    let mut cell = start;
    let mut side = Side::X;
    let mut solid = false;
    let limit = range.ceil() as i32;

    while (cell.x - start.x).abs() < limit && (cell.y - start.y).abs() < limit {
        if side_dist.x < side_dist.y {
            side_dist.x += delta.x;
            cell.x += step.x;
            side = Side::X;
        } else {
            side_dist.y += delta.y;
            cell.y += step.y;
            side = Side::Y;
        }
        if stops(map, cell.x, cell.y) {
            solid = true;
            break;
        }
    }

    // distance to the crossed grid line, measured along the ray
    let mut distance = match side {
        Side::X => {
            ((cell.x as f32 - origin.x / CELL_SIZE) + (1 - step.x) as f32 * 0.5) * CELL_SIZE
                / dir.x
        }
        Side::Y => {
            ((cell.y as f32 - origin.y / CELL_SIZE) + (1 - step.y) as f32 * 0.5) * CELL_SIZE
                / dir.y
        }
    };
    if !solid || !distance.is_finite() {
        distance = distance.min(range);
    }
    if !distance.is_finite() {
        distance = range;
    }

    // fractional hit position along the face, from the other axis
    let along = match side {
        Side::X => origin.y + distance * dir.y,
        Side::Y => origin.x + distance * dir.x,
    };
    let wall_x = along.rem_euclid(CELL_SIZE) / CELL_SIZE;
    let texture_x = ((wall_x * TEXTURE_SIZE as f32).floor() as usize).min(TEXTURE_SIZE - 1);

    let texture = if solid {
        map.wall_texture_name_at(cell.x, cell.y, debug)
    } else {
        names::STONE_WALL
    };

    RayHit {
        distance,
        side,
        map_x: cell.x,
        map_y: cell.y,
        texture_x,
        texture,
        step,
        solid,
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
