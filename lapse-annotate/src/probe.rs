//! Runtime check that the image codecs the pipeline relies on work

use crate::{Error, Result};
use image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use image::{DynamicImage, Rgb, RgbImage};
use std::io::Cursor;

/// Encodes and decodes a one-pixel JPEG in memory
pub fn check_jpeg_codec() -> Result<()> {
    let pixel = RgbImage::from_pixel(1, 1, Rgb([128, 128, 128]));

    let mut bytes = Vec::new();
    pixel
        .write_with_encoder(JpegEncoder::new(&mut bytes))
        .map_err(|e| Error::DependencyMissing(format!("JPEG encoding unavailable: {}", e)))?;

    let decoder = JpegDecoder::new(Cursor::new(&bytes))
        .map_err(|e| Error::DependencyMissing(format!("JPEG decoding unavailable: {}", e)))?;
    let decoded = DynamicImage::from_decoder(decoder)
        .map_err(|e| Error::DependencyMissing(format!("JPEG decoding unavailable: {}", e)))?;

    if decoded.width() != 1 || decoded.height() != 1 {
        return Err(Error::DependencyMissing(
            "JPEG round trip changed the image size".to_string(),
        ));
    }
    Ok(())
}
