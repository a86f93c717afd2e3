#![forbid(unsafe_code)]

pub mod color;
pub mod compose;
pub mod error;
pub mod fonts;
pub mod gradient;
pub mod layout;
pub mod markdown;
pub mod palette;
pub mod pipeline;
pub mod service;

pub use color::{contrasting_text_color, parse_hex, relative_luminance, Rgb, LINK_COLOR};
pub use error::{CardError, CardResult};
pub use fonts::{FontLibrary, GlyphPainter};
pub use gradient::{Direction, GradientField};
pub use layout::{layout_blocks, FontMetrics, LayoutLine, PanelLayout, TextStyle};
pub use markdown::{parse_markdown, Block, BlockKind, InlineSpan, SpanStyle};
pub use palette::{ColorCombination, Palette};
pub use pipeline::{
    render_card, render_card_png, RenderRequest, CANVAS_HEIGHT, CANVAS_WIDTH,
};
pub use service::{serve, AppState};
