//! Embedded bitmap face used when no TrueType font can be loaded
//!
//! Glyphs are 5x7 cells scaled up by an integer factor. Only the characters a
//! timestamp label needs are drawn; anything else renders as a hollow box.

use image::{Rgba, RgbaImage};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_SPACING: u32 = 1;

const MISSING: [u8; 7] = [
    0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111,
];

fn glyph_rows(ch: char) -> [u8; 7] {
    match ch {
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        ' ' => [0; 7],
        _ => MISSING,
    }
}

/// Built-in face at a fixed integer scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapFace {
    scale: u32,
}

impl BitmapFace {
    /// Picks the integer scale whose glyph height is closest to `px_height`
    pub fn for_height(px_height: f32) -> Self {
        let scale = (px_height / GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        Self { scale }
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Horizontal distance between the origins of two neighbouring glyphs
    pub fn advance(&self) -> u32 {
        (GLYPH_WIDTH + GLYPH_SPACING) * self.scale
    }

    pub fn line_height(&self) -> u32 {
        GLYPH_HEIGHT * self.scale
    }

    /// Exact pixel footprint of `text`, without trailing spacing
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let count = text.chars().count() as u32;
        if count == 0 {
            return (0, self.line_height());
        }
        (count * self.advance() - GLYPH_SPACING * self.scale, self.line_height())
    }

    /// Draws `text` with its top-left corner at (`x`, `y`), clipped to the canvas
    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i64, y: i64, text: &str) {
        let scale = self.scale as i64;
        for (index, ch) in text.chars().enumerate() {
            let origin_x = x + index as i64 * self.advance() as i64;
            for (row, bits) in glyph_rows(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let cell_x = origin_x + col as i64 * scale;
                    let cell_y = y + row as i64 * scale;
                    fill_cell(canvas, color, cell_x, cell_y, scale);
                }
            }
        }
    }
}

fn fill_cell(canvas: &mut RgbaImage, color: Rgba<u8>, x: i64, y: i64, size: i64) {
    let (width, height) = (canvas.width() as i64, canvas.height() as i64);
    for py in y.max(0)..(y + size).min(height) {
        for px in x.max(0)..(x + size).min(width) {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}
