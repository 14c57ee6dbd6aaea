//! Timestamp label rendering onto a single frame

use crate::font::{load_label_font, LabelFont};
use crate::measure::{MeasureChain, TextExtent};
use crate::overlay::{blend_region, Region};
use crate::Result;
use ab_glyph::PxScale;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbImage, RgbaImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Anything that can turn one source image into one annotated frame.
///
/// Returns `false` on failure; the error has already been logged.
pub trait Annotate {
    fn annotate(&self, source: &Path, destination: &Path, label: &str) -> bool;
}

/// Geometry and colors of the label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStyle {
    /// Text height in pixels
    pub font_size: f32,
    /// Distance of the text from the left edge
    pub left_margin: i64,
    /// Distance of the backdrop from the bottom edge
    pub bottom_margin: i64,
    /// Backdrop padding around the text
    pub padding: i64,
    pub text_color: Rgba<u8>,
    pub backdrop_color: Rgba<u8>,
    pub jpeg_quality: u8,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            left_margin: 10,
            bottom_margin: 10,
            padding: 5,
            text_color: Rgba([255, 255, 255, 255]),
            backdrop_color: Rgba([0, 0, 0, 128]),
            jpeg_quality: 90,
        }
    }
}

impl LabelStyle {
    /// Top-left corner of the text for a frame of `frame_height` pixels
    pub fn text_origin(&self, frame_height: u32, extent: TextExtent) -> (i64, i64) {
        let x = self.left_margin;
        let y = frame_height as i64 - extent.height as i64 - self.bottom_margin - self.padding;
        (x, y)
    }

    /// Backdrop rectangle around text drawn at `origin`
    pub fn backdrop(&self, origin: (i64, i64), extent: TextExtent) -> Region {
        let (x, y) = origin;
        Region {
            left: x - self.padding,
            top: y - self.padding,
            right: x + extent.width as i64 + self.padding,
            bottom: y + extent.height as i64 + self.padding,
        }
    }
}

/// Draws the timestamp label in the lower-left corner of each frame
pub struct FrameAnnotator {
    font: LabelFont,
    style: LabelStyle,
    measures: MeasureChain,
}

impl FrameAnnotator {
    /// Creates an annotator with an already selected font
    pub fn new(font: LabelFont, style: LabelStyle) -> Self {
        Self {
            font,
            style,
            measures: MeasureChain::default(),
        }
    }

    /// Creates an annotator using the font at `font_path`, or the built-in
    /// face when it cannot be loaded
    pub fn with_font_path(font_path: impl Into<PathBuf>, style: LabelStyle) -> Self {
        let font = load_label_font(font_path, style.font_size);
        Self::new(font, style)
    }

    /// Replaces the measurement strategies
    pub fn with_measures(mut self, measures: MeasureChain) -> Self {
        self.measures = measures;
        self
    }

    pub fn font(&self) -> &LabelFont {
        &self.font
    }

    pub fn style(&self) -> &LabelStyle {
        &self.style
    }

    /// Renders `label` onto `image`, returning an opaque RGB frame of the
    /// same size
    pub fn render(&self, image: &DynamicImage, label: &str) -> RgbImage {
        let mut canvas: RgbaImage = image.to_rgba8();
        let extent = self.measures.measure(&self.font, self.style.font_size, label);

        let origin = self.style.text_origin(canvas.height(), extent);
        let backdrop = self.style.backdrop(origin, extent);
        blend_region(&mut canvas, backdrop, self.style.backdrop_color);

        self.draw_text(&mut canvas, origin, label);

        DynamicImage::ImageRgba8(canvas).to_rgb8()
    }

    fn draw_text(&self, canvas: &mut RgbaImage, origin: (i64, i64), label: &str) {
        if label.is_empty() {
            return;
        }
        let (x, y) = origin;
        match &self.font {
            LabelFont::Outline(font) => imageproc::drawing::draw_text_mut(
                canvas,
                self.style.text_color,
                x as i32,
                y as i32,
                PxScale::from(self.style.font_size),
                font,
                label,
            ),
            LabelFont::Bitmap(face) => face.draw(canvas, self.style.text_color, x, y, label),
        }
    }

    /// Annotates one file, propagating any failure
    pub fn try_annotate(&self, source: &Path, destination: &Path, label: &str) -> Result<()> {
        let image = image::open(source)?;
        let frame = self.render(&image, label);

        let writer = BufWriter::new(File::create(destination)?);
        let encoder = JpegEncoder::new_with_quality(writer, self.style.jpeg_quality);
        frame.write_with_encoder(encoder)?;
        Ok(())
    }
}

impl Annotate for FrameAnnotator {
    fn annotate(&self, source: &Path, destination: &Path, label: &str) -> bool {
        match self.try_annotate(source, destination, label) {
            Ok(()) => true,
            Err(e) => {
                log::error!(
                    "Failed to draw label on {} -> {}: {}",
                    source.display(),
                    destination.display(),
                    e
                );
                false
            }
        }
    }
}
