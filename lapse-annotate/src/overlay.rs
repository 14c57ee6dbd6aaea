//! Alpha compositing of the label backdrop

use image::{Rgba, RgbaImage};

/// Inclusive pixel rectangle; corners may lie outside the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

/// Blends a solid `color` over `region` of `base` using the color's alpha
pub fn blend_region(base: &mut RgbaImage, region: Region, color: Rgba<u8>) {
    let base_width = base.width() as i64;
    let base_height = base.height() as i64;

    // Calculate the part of the region that lands on the canvas
    let x_start = region.left.max(0);
    let y_start = region.top.max(0);
    let x_end = (region.right + 1).min(base_width);
    let y_end = (region.bottom + 1).min(base_height);

    if x_start >= x_end || y_start >= y_end {
        return; // Nothing to overlay
    }

    let alpha = color[3] as f32 / 255.0;
    let inv_alpha = 1.0 - alpha;

    for y in y_start..y_end {
        for x in x_start..x_end {
            let base_pixel = base.get_pixel(x as u32, y as u32);
            let base_alpha = base_pixel[3] as f32 / 255.0;

            let blended = Rgba([
                (color[0] as f32 * alpha + base_pixel[0] as f32 * inv_alpha).round() as u8,
                (color[1] as f32 * alpha + base_pixel[1] as f32 * inv_alpha).round() as u8,
                (color[2] as f32 * alpha + base_pixel[2] as f32 * inv_alpha).round() as u8,
                ((alpha + base_alpha * inv_alpha) * 255.0).round() as u8,
            ]);

            base.put_pixel(x as u32, y as u32, blended);
        }
    }
}
