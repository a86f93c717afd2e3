//! One-shot render pipeline.
//!
//! [`render_card`] is the primary API for producing pixels from a
//! [`RenderRequest`]:
//!
//! 1. [`parse_markdown`](crate::markdown::parse_markdown)
//! 2. [`GradientField::generate`](crate::gradient::GradientField::generate)
//! 3. [`layout_blocks`](crate::layout::layout_blocks)
//! 4. [`compose_card`](crate::compose::compose_card)
//!
//! The pipeline is pure and re-entrant: it reads only the request and the
//! caller's font handles, allocates its own buffers, and produces identical
//! bytes for identical requests.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::{
    color::Rgb,
    compose::{compose_card, PanelGeometry},
    error::{CardError, CardResult},
    fonts::GlyphPainter,
    gradient::{Direction, GradientField},
    layout::layout_blocks,
    markdown::parse_markdown,
};

pub const CANVAS_WIDTH: u32 = 1080;
pub const CANVAS_HEIGHT: u32 = 1920;

#[derive(Clone, Debug)]
pub struct RenderRequest {
    pub colors: Vec<Rgb>,
    pub markdown: String,
    /// Panel fill; defaults to white.
    pub background: Rgb,
    /// Gradient axis; defaults to bottom-right.
    pub direction: Direction,
}

impl RenderRequest {
    pub fn new(colors: Vec<Rgb>, markdown: impl Into<String>) -> Self {
        Self {
            colors,
            markdown: markdown.into(),
            background: Rgb::new(0xFF, 0xFF, 0xFF),
            direction: Direction::default(),
        }
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Render a request into an opaque 1080x1920 RGBA canvas.
///
/// Every fallible step runs before compositing begins; on error no canvas is
/// allocated, so callers never observe a partially painted card.
#[tracing::instrument(skip_all, fields(direction = %request.direction, colors = request.colors.len()))]
pub fn render_card<P: GlyphPainter>(request: &RenderRequest, painter: &P) -> CardResult<RgbaImage> {
    let blocks = parse_markdown(&request.markdown)?;
    let field = GradientField::generate(
        &request.colors,
        CANVAS_WIDTH,
        CANVAS_HEIGHT,
        request.direction,
    )?;

    let geometry = PanelGeometry::for_canvas(CANVAS_WIDTH, CANVAS_HEIGHT);
    let layout = layout_blocks(
        &blocks,
        painter,
        geometry.text_width() as f32,
        geometry.text_height() as f32,
    );
    tracing::debug!(
        lines = layout.lines.len(),
        scale = layout.scale,
        truncated = layout.truncated,
        "panel layout ready"
    );

    Ok(compose_card(&field, request.background, &layout, painter))
}

/// Render and PNG-encode in one step.
pub fn render_card_png<P: GlyphPainter>(
    request: &RenderRequest,
    painter: &P,
) -> CardResult<Vec<u8>> {
    let image = render_card(request, painter)?;
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| CardError::encode(e.to_string()))?;
    Ok(bytes)
}
