//! Font loading, metrics, and glyph painting.
//!
//! The layout engine only sees the [`FontMetrics`] trait; the compositor
//! only sees [`GlyphPainter`]. [`FontLibrary`] implements both over
//! `ab_glyph`, with `imageproc` doing the actual rasterization. Loaded once
//! at startup and shared read-only across requests.

use std::path::Path;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::{
    color::Rgb,
    error::{CardError, CardResult},
    layout::{FontMetrics, TextStyle},
};

/// Line height as a multiple of the style's pixel size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.3;

/// Pixel size for a style at scale 1.0.
pub fn px_size(style: TextStyle) -> f32 {
    match style {
        TextStyle::Heading1 => 72.0,
        TextStyle::Heading2 => 54.0,
        TextStyle::Body | TextStyle::BodyBold | TextStyle::BodyItalic => 36.0,
        TextStyle::Code => 34.0,
    }
}

/// Candidate proportional faces, searched in order when no path is given.
const TEXT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Candidate monospace faces for code spans.
const MONO_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Paints already-positioned spans onto the canvas.
pub trait GlyphPainter: FontMetrics {
    fn draw_span(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        text: &str,
        style: TextStyle,
        scale: f32,
        color: Rgb,
    );
}

#[derive(Debug)]
pub struct FontLibrary {
    text: FontArc,
    mono: FontArc,
}

impl FontLibrary {
    /// Load the text and mono faces from explicit paths, falling back to the
    /// system search lists. With no mono face anywhere, code reuses the text
    /// face.
    pub fn load(text_path: Option<&Path>, mono_path: Option<&Path>) -> CardResult<Self> {
        let text = match text_path {
            Some(path) => load_font(path)?,
            None => discover(TEXT_FONT_PATHS)
                .ok_or_else(|| CardError::font("no usable text font found on this system"))?,
        };
        let mono = match mono_path {
            Some(path) => load_font(path)?,
            None => discover(MONO_FONT_PATHS).unwrap_or_else(|| text.clone()),
        };
        Ok(Self { text, mono })
    }

    pub fn from_fonts(text: FontArc, mono: FontArc) -> Self {
        Self { text, mono }
    }

    fn face(&self, style: TextStyle) -> &FontArc {
        match style {
            TextStyle::Code => &self.mono,
            _ => &self.text,
        }
    }
}

fn load_font(path: &Path) -> CardResult<FontArc> {
    let bytes = std::fs::read(path)
        .map_err(|e| CardError::font(format!("read font '{}': {e}", path.display())))?;
    FontArc::try_from_vec(bytes)
        .map_err(|e| CardError::font(format!("parse font '{}': {e}", path.display())))
}

fn discover(candidates: &[&str]) -> Option<FontArc> {
    candidates
        .iter()
        .map(Path::new)
        .filter(|p| p.exists())
        .find_map(|p| load_font(p).ok())
}

/// Advance-plus-kerning width of `text` at `px` pixels.
fn string_width(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }
    width
}

impl FontMetrics for FontLibrary {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        string_width(self.face(style), text, px_size(style))
    }

    fn line_height(&self, style: TextStyle) -> f32 {
        px_size(style) * LINE_HEIGHT_FACTOR
    }
}

impl GlyphPainter for FontLibrary {
    fn draw_span(
        &self,
        canvas: &mut RgbaImage,
        x: i32,
        y: i32,
        text: &str,
        style: TextStyle,
        scale: f32,
        color: Rgb,
    ) {
        let px = PxScale::from(px_size(style) * scale);
        let fill = Rgba([color.r, color.g, color.b, 255]);
        let font = self.face(style);
        draw_text_mut(canvas, fill, x, y, px, font, text);
        if style == TextStyle::BodyBold {
            // Synthetic bold: double-strike one pixel over.
            draw_text_mut(canvas, fill, x + 1, y, px, font, text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_sizes_rank_headings_first() {
        assert!(px_size(TextStyle::Heading1) > px_size(TextStyle::Heading2));
        assert!(px_size(TextStyle::Heading2) > px_size(TextStyle::Body));
        assert_eq!(px_size(TextStyle::Body), px_size(TextStyle::BodyBold));
    }

    #[test]
    fn missing_explicit_font_is_a_font_error() {
        let err = FontLibrary::load(Some(Path::new("/no/such/font.ttf")), None).unwrap_err();
        assert!(matches!(err, CardError::Font(_)));
        assert!(err.to_string().contains("/no/such/font.ttf"));
    }
}
