use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, vec2};

use crate::world::map::GridMap;

/// Player view-point on the grid.
///
/// * `pos` is in grid units (cell `(x, y)` spans `x..x+1`, `y..y+1`).
/// * `angle` is kept in `[0, 2π)`; 0 looks along +X, positive angles turn
///   towards +Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    angle: f32,
}

/// Wrap any angle into `[0, 2π)`.
#[inline]
pub fn normalize_angle(a: f32) -> f32 {
    let r = a.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if r >= TAU { 0.0 } else { r }
}

impl Pose {
    pub fn new(pos: Vec2, angle: f32) -> Self {
        Self {
            pos,
            angle: normalize_angle(angle),
        }
    }

    /// Centre of a grid cell, facing `angle`.
    pub fn at_cell(gx: i32, gy: i32, angle: f32) -> Self {
        Self::new(GridMap::cell_centre(gx, gy), angle)
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /*──────────────────────── derived vectors ───────────────────────*/

    /// Unit vector pointing where the player looks.
    #[inline(always)]
    pub fn forward(self) -> Vec2 {
        let (s, c) = self.angle.sin_cos();
        vec2(c, s)
    }

    /// Unit vector for strafing right (`angle + π/2`).
    #[inline(always)]
    pub fn right(self) -> Vec2 {
        let (s, c) = (self.angle + FRAC_PI_2).sin_cos();
        vec2(c, s)
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Rotate by `delta` radians (positive = towards +Y).
    pub fn turn(&mut self, delta: f32) {
        self.angle = normalize_angle(self.angle + delta);
    }

    /// Walk `distance` along the facing direction.
    pub fn advance(&mut self, map: &GridMap, distance: f32) {
        let d = self.forward() * distance;
        self.slide(map, d);
    }

    /// Sidestep `distance` to the right (negative = left).
    pub fn strafe(&mut self, map: &GridMap, distance: f32) {
        let d = self.right() * distance;
        self.slide(map, d);
    }

    /// Apply `delta` one axis at a time; an axis whose destination is a
    /// wall keeps its old coordinate.
    fn slide(&mut self, map: &GridMap, delta: Vec2) {
        let nx = self.pos.x + delta.x;
        if !map.is_wall(nx, self.pos.y) {
            self.pos.x = nx;
        }
        let ny = self.pos.y + delta.y;
        if !map.is_wall(self.pos.x, ny) {
            self.pos.y = ny;
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::f32::consts::PI;

    fn room() -> GridMap {
        GridMap::from_rows(&["WWWW", "W..W", "W..W", "WWWW"], HashMap::new()).unwrap()
    }

    #[test]
    fn angle_is_normalized() {
        assert!((Pose::new(Vec2::ZERO, -FRAC_PI_2).angle() - 1.5 * PI).abs() < 1e-5);
        assert!((Pose::new(Vec2::ZERO, 5.0 * PI).angle() - PI).abs() < 1e-4);
        let mut p = Pose::default();
        p.turn(-1e-9);
        assert!(p.angle() >= 0.0 && p.angle() < TAU);
    }

    #[test]
    fn forward_and_right_are_orthonormal() {
        let p = Pose::new(Vec2::ZERO, 0.3);
        assert!((p.forward().length() - 1.0).abs() < 1e-5);
        assert!(p.forward().dot(p.right()).abs() < 1e-5);
    }

    #[test]
    fn walking_into_wall_keeps_axis() {
        let map = room();
        let mut p = Pose::new(vec2(2.8, 1.5), 0.0);
        p.advance(&map, 0.5); // x would land in column 3 (wall)
        assert_eq!(p.pos.x, 2.8);
        assert_eq!(p.pos.y, 1.5);
    }

    #[test]
    fn diagonal_slides_along_wall() {
        let map = room();
        // facing 45° towards the east wall while y is free
        let mut p = Pose::new(vec2(2.9, 1.5), PI / 4.0);
        p.advance(&map, 0.3);
        assert_eq!(p.pos.x, 2.9);
        assert!(p.pos.y > 1.5);
    }

    #[test]
    fn strafe_moves_sideways() {
        let map = room();
        let mut p = Pose::new(vec2(1.5, 1.5), 0.0);
        p.strafe(&map, 0.5); // right of +X is +Y
        assert!((p.pos.x - 1.5).abs() < 1e-5);
        assert!((p.pos.y - 2.0).abs() < 1e-5);
    }
}
