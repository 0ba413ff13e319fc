//! Tiny 3×5 bitmap font for HUD text and placeholder labels.
//!
//! Lower-case input is drawn with the upper-case glyphs; characters without
//! a glyph advance the pen like a space.

pub const GLYPH_W: i32 = 3;
pub const GLYPH_H: i32 = 5;
/// Horizontal pen advance per character, in unscaled pixels.
pub const ADVANCE: i32 = 4;

const DIGITS: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b010, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

const LETTERS: [[u8; 5]; 26] = [
    [0b010, 0b101, 0b111, 0b101, 0b101], // A
    [0b110, 0b101, 0b110, 0b101, 0b110], // B
    [0b011, 0b100, 0b100, 0b100, 0b011], // C
    [0b110, 0b101, 0b101, 0b101, 0b110], // D
    [0b111, 0b100, 0b110, 0b100, 0b111], // E
    [0b111, 0b100, 0b110, 0b100, 0b100], // F
    [0b011, 0b100, 0b101, 0b101, 0b011], // G
    [0b101, 0b101, 0b111, 0b101, 0b101], // H
    [0b111, 0b010, 0b010, 0b010, 0b111], // I
    [0b001, 0b001, 0b001, 0b101, 0b010], // J
    [0b101, 0b110, 0b100, 0b110, 0b101], // K
    [0b100, 0b100, 0b100, 0b100, 0b111], // L
    [0b101, 0b111, 0b111, 0b101, 0b101], // M
    [0b110, 0b101, 0b101, 0b101, 0b101], // N
    [0b010, 0b101, 0b101, 0b101, 0b010], // O
    [0b110, 0b101, 0b110, 0b100, 0b100], // P
    [0b010, 0b101, 0b101, 0b111, 0b011], // Q
    [0b110, 0b101, 0b110, 0b101, 0b101], // R
    [0b011, 0b100, 0b010, 0b001, 0b110], // S
    [0b111, 0b010, 0b010, 0b010, 0b010], // T
    [0b101, 0b101, 0b101, 0b101, 0b111], // U
    [0b101, 0b101, 0b101, 0b101, 0b010], // V
    [0b101, 0b101, 0b111, 0b111, 0b101], // W
    [0b101, 0b101, 0b010, 0b101, 0b101], // X
    [0b101, 0b101, 0b010, 0b010, 0b010], // Y
    [0b111, 0b001, 0b010, 0b100, 0b111], // Z
];

fn glyph(c: char) -> Option<[u8; 5]> {
    match c {
        '0'..='9' => Some(DIGITS[c as usize - '0' as usize]),
        'A'..='Z' => Some(LETTERS[c as usize - 'A' as usize]),
        'a'..='z' => Some(LETTERS[c as usize - 'a' as usize]),
        '.' => Some([0b000, 0b000, 0b000, 0b000, 0b010]),
        ',' => Some([0b000, 0b000, 0b000, 0b010, 0b100]),
        ':' => Some([0b000, 0b010, 0b000, 0b010, 0b000]),
        '-' => Some([0b000, 0b000, 0b111, 0b000, 0b000]),
        '/' => Some([0b001, 0b001, 0b010, 0b100, 0b100]),
        '!' => Some([0b010, 0b010, 0b010, 0b000, 0b010]),
        '[' => Some([0b110, 0b100, 0b100, 0b100, 0b110]),
        ']' => Some([0b011, 0b001, 0b001, 0b001, 0b011]),
        _ => None,
    }
}

/// Width in pixels of `text` rendered at `scale`.
pub fn text_width(text: &str, scale: i32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        (n * ADVANCE - (ADVANCE - GLYPH_W)) * scale
    }
}

/// Call `plot(dx, dy)` for every lit pixel of `text`, relative to the
/// top-left corner of the first glyph.
pub fn rasterize(text: &str, scale: i32, mut plot: impl FnMut(i32, i32)) {
    let scale = scale.max(1);
    let mut pen = 0;
    for ch in text.chars() {
        if let Some(rows) = glyph(ch) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (0b100 >> col) == 0 {
                        continue;
                    }
                    for sy in 0..scale {
                        for sx in 0..scale {
                            plot(pen + col * scale + sx, row as i32 * scale + sy);
                        }
                    }
                }
            }
        }
        pen += ADVANCE * scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_of_empty_and_single() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("A", 1), GLYPH_W);
        assert_eq!(text_width("AB", 2), (ADVANCE + GLYPH_W) * 2);
    }

    #[test]
    fn rasterize_stays_in_box() {
        let mut lit = 0;
        rasterize("MISSING", 2, |x, y| {
            assert!(x >= 0 && x < text_width("MISSING", 2));
            assert!(y >= 0 && y < GLYPH_H * 2);
            lit += 1;
        });
        assert!(lit > 0);
    }

    #[test]
    fn unknown_chars_advance_only() {
        let mut lit = 0;
        rasterize("~~", 1, |_, _| lit += 1);
        assert_eq!(lit, 0);
    }
}
