//! Compositing: gradient background, glow, panel, text.
//!
//! Paint order is fixed: the gradient field fills the canvas, a blurred glow
//! sits behind the panel, the opaque rounded panel goes on top, then every
//! positioned span. All inputs are computed before the first pixel is
//! written, so a failed request never leaves a partial image.

use image::{Rgba, RgbaImage};
use kurbo::{Point, RoundedRect, Shape};

use crate::{
    color::{contrasting_text_color, is_light, Rgb, LINK_COLOR},
    fonts::GlyphPainter,
    gradient::GradientField,
    layout::PanelLayout,
    markdown::SpanStyle,
};

/// Panel size as a fraction of the canvas on each axis.
const PANEL_RATIO: f64 = 0.8;

/// Corner radius of the panel, in pixels.
pub const PANEL_RADIUS: f64 = 50.0;

/// Padding between the panel's rounded corner zone and the text area.
pub const PANEL_PADDING: f64 = 50.0;

/// How far the glow rectangle extends past the panel on each side.
const GLOW_MARGIN: f64 = 10.0;
const GLOW_ALPHA: u8 = 100;
const GLOW_BLUR_SIGMA: f32 = 6.0;

/// Fixed, centered panel placement for a given canvas.
#[derive(Clone, Copy, Debug)]
pub struct PanelGeometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PanelGeometry {
    pub fn for_canvas(canvas_width: u32, canvas_height: u32) -> Self {
        let width = (f64::from(canvas_width) * PANEL_RATIO).floor();
        let height = (f64::from(canvas_height) * PANEL_RATIO).floor();
        Self {
            x: ((f64::from(canvas_width) - width) / 2.0).floor(),
            y: ((f64::from(canvas_height) - height) / 2.0).floor(),
            width,
            height,
        }
    }

    /// Inset from the panel edge to the text area on every side.
    pub fn text_inset() -> f64 {
        PANEL_RADIUS + PANEL_PADDING
    }

    pub fn text_origin(&self) -> (f64, f64) {
        (self.x + Self::text_inset(), self.y + Self::text_inset())
    }

    pub fn text_width(&self) -> f64 {
        self.width - 2.0 * Self::text_inset()
    }

    pub fn text_height(&self) -> f64 {
        self.height - 2.0 * Self::text_inset()
    }

    fn rect(&self) -> RoundedRect {
        RoundedRect::new(
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
            PANEL_RADIUS,
        )
    }

    fn glow_rect(&self) -> RoundedRect {
        RoundedRect::new(
            self.x - GLOW_MARGIN,
            self.y - GLOW_MARGIN,
            self.x + self.width + GLOW_MARGIN,
            self.y + self.height + GLOW_MARGIN,
            PANEL_RADIUS + GLOW_MARGIN,
        )
    }
}

/// Paint everything into one opaque RGBA canvas sized like the field.
pub fn compose_card(
    field: &GradientField,
    panel_bg: Rgb,
    layout: &PanelLayout,
    painter: &dyn GlyphPainter,
) -> RgbaImage {
    let (width, height) = (field.width(), field.height());
    let mut canvas = RgbaImage::from_fn(width, height, |x, y| {
        let c = field.pixel(x, y);
        Rgba([c.r, c.g, c.b, 255])
    });

    let geometry = PanelGeometry::for_canvas(width, height);

    // Glow behind the panel; tint follows the panel background so the halo
    // reads on both light and dark cards.
    let tint = if is_light(panel_bg) { 255 } else { 0 };
    let mut glow = RgbaImage::new(width, height);
    fill_rounded_rect(
        &mut glow,
        &geometry.glow_rect(),
        Rgba([tint, tint, tint, GLOW_ALPHA]),
    );
    let glow = image::imageops::blur(&glow, GLOW_BLUR_SIGMA);
    blend_over(&mut canvas, &glow);

    fill_rounded_rect(
        &mut canvas,
        &geometry.rect(),
        Rgba([panel_bg.r, panel_bg.g, panel_bg.b, 255]),
    );

    let (origin_x, origin_y) = geometry.text_origin();
    for line in &layout.lines {
        for positioned in &line.spans {
            let color = match positioned.span.style {
                SpanStyle::Link => LINK_COLOR,
                _ => contrasting_text_color(panel_bg),
            };
            painter.draw_span(
                &mut canvas,
                (origin_x + f64::from(positioned.x)).round() as i32,
                (origin_y + f64::from(line.y)).round() as i32,
                &positioned.span.text,
                positioned.style,
                layout.scale,
                color,
            );
        }
    }

    canvas
}

/// Hard-edged rounded rect fill by pixel-center containment.
fn fill_rounded_rect(img: &mut RgbaImage, rect: &RoundedRect, color: Rgba<u8>) {
    let bbox = rect.bounding_box();
    let x0 = bbox.x0.floor().max(0.0) as u32;
    let y0 = bbox.y0.floor().max(0.0) as u32;
    let x1 = (bbox.x1.ceil() as i64).clamp(0, i64::from(img.width())) as u32;
    let y1 = (bbox.y1.ceil() as i64).clamp(0, i64::from(img.height())) as u32;
    for y in y0..y1 {
        for x in x0..x1 {
            let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if rect.contains(center) {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Straight-alpha source-over onto an opaque destination.
fn blend_over(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (dst, src) in base.pixels_mut().zip(overlay.pixels()) {
        let sa = u16::from(src[3]);
        if sa == 0 {
            continue;
        }
        let inv = 255 - sa;
        for i in 0..3 {
            dst[i] = mul_div255(u16::from(src[i]), sa)
                .saturating_add(mul_div255(u16::from(dst[i]), inv));
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        color::parse_hex,
        gradient::Direction,
        layout::{layout_blocks, FontMetrics, TextStyle},
        markdown::parse_markdown,
    };

    /// Metrics-only stand-in; draws nothing so pixel checks stay exact.
    struct NullPainter;

    impl FontMetrics for NullPainter {
        fn measure(&self, text: &str, _style: TextStyle) -> f32 {
            text.chars().count() as f32 * 10.0
        }

        fn line_height(&self, _style: TextStyle) -> f32 {
            20.0
        }
    }

    impl GlyphPainter for NullPainter {
        fn draw_span(
            &self,
            _canvas: &mut RgbaImage,
            _x: i32,
            _y: i32,
            _text: &str,
            _style: TextStyle,
            _scale: f32,
            _color: Rgb,
        ) {
        }
    }

    fn small_card(panel_bg: &str) -> RgbaImage {
        let colors = [
            parse_hex("#00416A").unwrap(),
            parse_hex("#E4E5E6").unwrap(),
        ];
        let field = GradientField::generate(&colors, 270, 480, Direction::Vertical).unwrap();
        let geometry = PanelGeometry::for_canvas(270, 480);
        let blocks = parse_markdown("# T").unwrap();
        let layout = layout_blocks(
            &blocks,
            &NullPainter,
            geometry.text_width() as f32,
            geometry.text_height() as f32,
        );
        compose_card(&field, parse_hex(panel_bg).unwrap(), &layout, &NullPainter)
    }

    fn close(actual: &Rgba<u8>, expected: [u8; 3]) -> bool {
        actual[0].abs_diff(expected[0]) <= 3
            && actual[1].abs_diff(expected[1]) <= 3
            && actual[2].abs_diff(expected[2]) <= 3
    }

    #[test]
    fn corners_show_the_gradient() {
        // Tolerance absorbs the faint glow tail on a small canvas.
        let img = small_card("#FFFFFF");
        assert!(close(img.get_pixel(0, 0), [0x00, 0x41, 0x6A]));
        assert!(close(img.get_pixel(0, 479), [0xE4, 0xE5, 0xE6]));
    }

    #[test]
    fn panel_center_is_background_color() {
        let img = small_card("#FFFFFF");
        assert_eq!(img.get_pixel(135, 240), &Rgba([255, 255, 255, 255]));
        let dark = small_card("#101010");
        assert_eq!(dark.get_pixel(135, 240), &Rgba([0x10, 0x10, 0x10, 255]));
    }

    #[test]
    fn panel_edges_and_corner_notches() {
        let geometry = PanelGeometry::for_canvas(270, 480);
        let img = small_card("#FFFFFF");
        // A pixel just inside the straight panel edge is panel-colored; the
        // square corner outside the rounding is not.
        let edge_x = geometry.x as u32 + 2;
        let mid_y = (geometry.y + geometry.height / 2.0) as u32;
        assert_eq!(img.get_pixel(edge_x, mid_y), &Rgba([255, 255, 255, 255]));
        let corner = img.get_pixel(geometry.x as u32, geometry.y as u32);
        assert_ne!(corner, &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn geometry_centers_the_panel() {
        let g = PanelGeometry::for_canvas(1080, 1920);
        assert_eq!(g.width, 864.0);
        assert_eq!(g.height, 1536.0);
        assert_eq!(g.x, 108.0);
        assert_eq!(g.y, 192.0);
        assert!(g.text_width() > 0.0 && g.text_height() > 0.0);
    }

    #[test]
    fn mul_div255_bounds() {
        assert_eq!(mul_div255(255, 255), 255);
        assert_eq!(mul_div255(0, 255), 0);
        assert_eq!(mul_div255(255, 0), 0);
        assert_eq!(mul_div255(128, 255), 128);
    }

    #[test]
    fn blend_over_ignores_transparent_and_applies_opaque() {
        let mut base = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let mut overlay = RgbaImage::new(2, 1);
        overlay.put_pixel(1, 0, Rgba([200, 200, 200, 255]));
        blend_over(&mut base, &overlay);
        assert_eq!(base.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(base.get_pixel(1, 0), &Rgba([200, 200, 200, 255]));
    }
}
