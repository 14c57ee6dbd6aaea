//! Text footprint measurement
//!
//! The label box is sized from the rendered text, but not every font offers
//! the same metrics. Strategies are tried from most to least precise; each
//! runs behind its own panic boundary and may decline by returning `None`.
//! The fixed heuristic at the end always answers.

use crate::font::LabelFont;
use ab_glyph::{point, Font, PxScale, Rect, ScaleFont};
use std::panic::{self, AssertUnwindSafe};

/// Width per character assumed when nothing better is known
pub const FALLBACK_CHAR_WIDTH: u32 = 12;
/// Line height assumed when nothing better is known
pub const FALLBACK_LINE_HEIGHT: u32 = 24;

/// Pixel width and height of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextExtent {
    pub width: u32,
    pub height: u32,
}

impl TextExtent {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A way of measuring text with a given font
pub trait TextMeasure {
    fn name(&self) -> &'static str;
    fn measure(&self, font: &LabelFont, px_height: f32, text: &str) -> Option<TextExtent>;
}

/// Tight bounding box of the outlined glyphs
pub struct GlyphBounds;

impl TextMeasure for GlyphBounds {
    fn name(&self) -> &'static str {
        "glyph bounds"
    }

    fn measure(&self, font: &LabelFont, px_height: f32, text: &str) -> Option<TextExtent> {
        let LabelFont::Outline(font) = font else {
            return None;
        };
        let scale = PxScale::from(px_height);
        let scaled = font.as_scaled(scale);

        let mut caret = 0.0f32;
        let mut previous = None;
        let mut bounds: Option<Rect> = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = font.outline_glyph(glyph) {
                let px = outlined.px_bounds();
                bounds = Some(match bounds {
                    None => px,
                    Some(b) => Rect {
                        min: point(b.min.x.min(px.min.x), b.min.y.min(px.min.y)),
                        max: point(b.max.x.max(px.max.x), b.max.y.max(px.max.y)),
                    },
                });
            }
        }

        let bounds = bounds?;
        Some(TextExtent::new(
            (bounds.max.x - bounds.min.x).ceil().max(0.0) as u32,
            (bounds.max.y - bounds.min.y).ceil().max(0.0) as u32,
        ))
    }
}

/// Advance-based layout size as computed by the drawing library
pub struct LayoutAdvance;

impl TextMeasure for LayoutAdvance {
    fn name(&self) -> &'static str {
        "layout advance"
    }

    fn measure(&self, font: &LabelFont, px_height: f32, text: &str) -> Option<TextExtent> {
        let LabelFont::Outline(font) = font else {
            return None;
        };
        let (width, height) = imageproc::drawing::text_size(PxScale::from(px_height), font, text);
        Some(TextExtent::new(width, height))
    }
}

/// Exact metrics of the built-in bitmap face
pub struct BitmapMetrics;

impl TextMeasure for BitmapMetrics {
    fn name(&self) -> &'static str {
        "bitmap metrics"
    }

    fn measure(&self, font: &LabelFont, _px_height: f32, text: &str) -> Option<TextExtent> {
        let LabelFont::Bitmap(face) = font else {
            return None;
        };
        let (width, height) = face.text_size(text);
        Some(TextExtent::new(width, height))
    }
}

/// Fixed per-character estimate
pub struct FixedHeuristic;

impl TextMeasure for FixedHeuristic {
    fn name(&self) -> &'static str {
        "fixed heuristic"
    }

    fn measure(&self, _font: &LabelFont, _px_height: f32, text: &str) -> Option<TextExtent> {
        Some(heuristic_extent(text))
    }
}

/// The extent used when no strategy answers
pub fn heuristic_extent(text: &str) -> TextExtent {
    TextExtent::new(
        text.chars().count() as u32 * FALLBACK_CHAR_WIDTH,
        FALLBACK_LINE_HEIGHT,
    )
}

/// Ordered list of measurement strategies
pub struct MeasureChain {
    strategies: Vec<Box<dyn TextMeasure + Send + Sync>>,
}

impl Default for MeasureChain {
    fn default() -> Self {
        Self::new(vec![
            Box::new(GlyphBounds),
            Box::new(LayoutAdvance),
            Box::new(BitmapMetrics),
            Box::new(FixedHeuristic),
        ])
    }
}

impl MeasureChain {
    pub fn new(strategies: Vec<Box<dyn TextMeasure + Send + Sync>>) -> Self {
        Self { strategies }
    }

    /// Measures `text`, returning the first answer and the strategy that gave it
    pub fn measure_with(&self, font: &LabelFont, px_height: f32, text: &str) -> (TextExtent, &'static str) {
        for strategy in &self.strategies {
            let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
                strategy.measure(font, px_height, text)
            }));
            match attempt {
                Ok(Some(extent)) => return (extent, strategy.name()),
                Ok(None) => continue,
                Err(_) => {
                    log::warn!(
                        "Text measurement via {} failed, trying the next method",
                        strategy.name()
                    );
                }
            }
        }
        (heuristic_extent(text), FixedHeuristic.name())
    }

    pub fn measure(&self, font: &LabelFont, px_height: f32, text: &str) -> TextExtent {
        self.measure_with(font, px_height, text).0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap_font::BitmapFace;

    fn builtin() -> LabelFont {
        LabelFont::Bitmap(BitmapFace::for_height(24.0))
    }

    #[test]
    fn test_bitmap_font_uses_exact_metrics() {
        let chain = MeasureChain::default();
        let (extent, via) = chain.measure_with(&builtin(), 24.0, "09:00");
        assert_eq!(via, "bitmap metrics");
        assert_eq!(extent, TextExtent::new(5 * 18 - 3, 21));
    }

    #[test]
    fn test_outline_strategies_decline_bitmap_font() {
        assert!(GlyphBounds.measure(&builtin(), 24.0, "12:00").is_none());
        assert!(LayoutAdvance.measure(&builtin(), 24.0, "12:00").is_none());
    }

    #[test]
    fn test_heuristic_extent() {
        assert_eq!(heuristic_extent("2024-01-01 09:00"), TextExtent::new(16 * 12, 24));
        assert_eq!(heuristic_extent(""), TextExtent::new(0, 24));
    }

    struct Panicking;

    impl TextMeasure for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn measure(&self, _font: &LabelFont, _px_height: f32, _text: &str) -> Option<TextExtent> {
            panic!("measurement API missing");
        }
    }

    struct Declining;

    impl TextMeasure for Declining {
        fn name(&self) -> &'static str {
            "declining"
        }

        fn measure(&self, _font: &LabelFont, _px_height: f32, _text: &str) -> Option<TextExtent> {
            None
        }
    }

    #[test]
    fn test_panicking_strategy_falls_through() {
        let chain = MeasureChain::new(vec![Box::new(Panicking), Box::new(FixedHeuristic)]);
        let (extent, via) = chain.measure_with(&builtin(), 24.0, "abc");
        assert_eq!(via, "fixed heuristic");
        assert_eq!(extent, TextExtent::new(36, 24));
    }

    #[test]
    fn test_exhausted_chain_uses_heuristic() {
        let chain = MeasureChain::new(vec![Box::new(Declining), Box::new(Panicking)]);
        assert_eq!(chain.measure(&builtin(), 24.0, "ab"), TextExtent::new(24, 24));
    }
}
