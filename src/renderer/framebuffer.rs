//! Owned `0x00RRGGBB` pixel buffer with clipped drawing primitives.
//!
//! Every primitive clips against the buffer edges, so callers may pass any
//! coordinates (negative, past the edge, huge sprite rectangles).

use crate::renderer::{Rgba, channels, font, rgb};

#[derive(Clone, Debug, Default)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    /// Reallocate for a new resolution; contents are unspecified afterwards.
    pub fn resize(&mut self, width: usize, height: usize) {
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.pixels.resize(width * height, 0);
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn clear(&mut self, colour: Rgba) {
        self.pixels.fill(colour);
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        ((0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y))
            .then(|| y as usize * self.width + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, colour: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = colour;
        }
    }

    /// Source-over blend of `colour` with coverage `alpha` in `[0, 1]`.
    pub fn blend(&mut self, x: i32, y: i32, colour: Rgba, alpha: f32) {
        let Some(i) = self.index(x, y) else { return };
        let a = alpha.clamp(0.0, 1.0);
        let [sr, sg, sb] = channels(colour);
        let [dr, dg, db] = channels(self.pixels[i]);
        let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
        self.pixels[i] = rgb(mix(sr, dr), mix(sg, dg), mix(sb, db));
    }

    /// Clip `x..x+w`, `y..y+h` to the buffer; `None` when nothing is left.
    fn clip_rect(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(usize, usize, usize, usize)> {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(self.width as i32);
        let y1 = y.saturating_add(h).min(self.height as i32);
        (x0 < x1 && y0 < y1).then(|| (x0 as usize, y0 as usize, x1 as usize, y1 as usize))
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgba) {
        let Some((x0, y0, x1, y1)) = self.clip_rect(x, y, w, h) else {
            return;
        };
        for row in y0..y1 {
            let base = row * self.width;
            self.pixels[base + x0..base + x1].fill(colour);
        }
    }

    pub fn blend_rect(&mut self, x: i32, y: i32, w: i32, h: i32, colour: Rgba, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.clip_rect(x, y, w, h) else {
            return;
        };
        for row in y0..y1 {
            for col in x0..x1 {
                self.blend(col as i32, row as i32, colour, alpha);
            }
        }
    }

    /// Bresenham, clipped per pixel.
    pub fn draw_line(&mut self, mut x0: i32, mut y0: i32, x1: i32, y1: i32, colour: Rgba) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.put(x0, y0, colour);
            if x0 == x1 && y0 == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                if x0 == x1 {
                    break;
                }
                err += dy;
                x0 += sx;
            }
            if e2 <= dx {
                if y0 == y1 {
                    break;
                }
                err += dx;
                y0 += sy;
            }
        }
    }

    /// 3×5 bitmap text with its top-left corner at `(x, y)`.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, colour: Rgba) {
        font::rasterize(text, scale, |dx, dy| {
            self.put(x.saturating_add(dx), y.saturating_add(dy), colour)
        });
    }

    /// Text horizontally centred on `cx`.
    pub fn draw_text_centered(&mut self, text: &str, cx: i32, y: i32, scale: i32, colour: Rgba) {
        let x = cx.saturating_sub(font::text_width(text, scale) / 2);
        self.draw_text(text, x, y, scale, colour);
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_clip_at_edges() {
        let mut fb = Framebuffer::new(8, 4);
        fb.fill_rect(-5, -5, 100, 100, 0x00FF_0000);
        assert!(fb.pixels().iter().all(|&p| p == 0x00FF_0000));

        fb.clear(0);
        fb.put(-1, 0, 1);
        fb.put(8, 0, 1);
        fb.fill_rect(6, 2, 10, 10, 7);
        assert_eq!(fb.get(7, 3), Some(7));
        assert_eq!(fb.get(5, 3), Some(0));
        assert_eq!(fb.get(8, 3), None);
        assert_eq!(fb.pixels().iter().filter(|&&p| p == 7).count(), 4);
    }

    #[test]
    fn blend_halfway() {
        let mut fb = Framebuffer::new(1, 1);
        fb.clear(rgb(0, 0, 0));
        fb.blend(0, 0, rgb(200, 100, 50), 0.5);
        assert_eq!(fb.get(0, 0), Some(rgb(100, 50, 25)));
        fb.blend(0, 0, rgb(255, 255, 255), 0.0);
        assert_eq!(fb.get(0, 0), Some(rgb(100, 50, 25)));
    }

    #[test]
    fn line_endpoints_drawn() {
        let mut fb = Framebuffer::new(10, 10);
        fb.draw_line(1, 1, 8, 5, 9);
        assert_eq!(fb.get(1, 1), Some(9));
        assert_eq!(fb.get(8, 5), Some(9));
        // partly off-screen line must not panic
        fb.draw_line(-20, -3, 30, 12, 9);
    }

    #[test]
    fn text_lands_inside_box() {
        let mut fb = Framebuffer::new(32, 8);
        fb.draw_text("HI", 1, 1, 1, 5);
        let lit: Vec<_> = (0..8)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter(|&(x, y)| fb.get(x, y) == Some(5))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| (1..8).contains(&x) && (1..6).contains(&y)));
    }

    #[test]
    fn text_at_extreme_anchors_clips() {
        let mut fb = Framebuffer::new(8, 8);
        fb.draw_text_centered("PRESS E", i32::MIN, i32::MAX, 1, 0x00FF_FFFF);
        fb.draw_text_centered("PRESS E", i32::MAX, i32::MIN, 2, 0x00FF_FFFF);
        assert!(fb.pixels().iter().all(|&p| p == 0));
    }
}
