//! Label font selection
//!
//! Sources are tried in order and the first one that loads wins. The built-in
//! bitmap face closes every chain, so selection itself cannot fail.

use crate::bitmap_font::BitmapFace;
use crate::{Error, Result};
use ab_glyph::FontVec;
use std::fmt;
use std::path::PathBuf;

/// A font the annotator can draw with
pub enum LabelFont {
    /// Scalable TrueType/OpenType outlines
    Outline(FontVec),
    /// Embedded fallback face
    Bitmap(BitmapFace),
}

impl LabelFont {
    pub fn is_builtin(&self) -> bool {
        matches!(self, LabelFont::Bitmap(_))
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelFont::Outline(_) => f.write_str("LabelFont::Outline"),
            LabelFont::Bitmap(face) => write!(f, "LabelFont::Bitmap(scale={})", face.scale()),
        }
    }
}

/// One place a label font may come from
pub trait FontSource {
    fn describe(&self) -> String;
    fn load(&self, px_height: f32) -> Result<LabelFont>;
}

/// A font file on disk
pub struct FontFile(pub PathBuf);

impl FontSource for FontFile {
    fn describe(&self) -> String {
        format!("font file {}", self.0.display())
    }

    fn load(&self, _px_height: f32) -> Result<LabelFont> {
        let bytes = std::fs::read(&self.0)?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| Error::Font(format!("{}: {}", self.0.display(), e)))?;
        Ok(LabelFont::Outline(font))
    }
}

/// The embedded bitmap face
pub struct BuiltinFont;

impl FontSource for BuiltinFont {
    fn describe(&self) -> String {
        "built-in bitmap font".to_string()
    }

    fn load(&self, px_height: f32) -> Result<LabelFont> {
        Ok(LabelFont::Bitmap(BitmapFace::for_height(px_height)))
    }
}

/// Loads the first available font from `sources`, falling back to the
/// built-in face when all of them fail.
pub fn select_font(sources: &[Box<dyn FontSource>], px_height: f32) -> LabelFont {
    for (index, source) in sources.iter().enumerate() {
        match source.load(px_height) {
            Ok(font) => {
                if index > 0 {
                    log::info!("Using {} for labels", source.describe());
                }
                return font;
            }
            Err(e) => {
                log::warn!(
                    "Label font unavailable, trying the next one: {} ({})",
                    source.describe(),
                    e
                );
            }
        }
    }
    log::warn!("No configured label font could be loaded, using the built-in bitmap font");
    LabelFont::Bitmap(BitmapFace::for_height(px_height))
}

/// Standard chain: the configured font file, then the built-in face
pub fn load_label_font(font_path: impl Into<PathBuf>, px_height: f32) -> LabelFont {
    let sources: Vec<Box<dyn FontSource>> =
        vec![Box::new(FontFile(font_path.into())), Box::new(BuiltinFont)];
    select_font(&sources, px_height)
}
