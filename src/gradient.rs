//! Gradient field generation.
//!
//! A [`GradientField`] is a width x height grid of colors produced by
//! interpolating an ordered list of 2+ stops along one of four axes. The
//! field depends only on (colors, width, height, direction); generating it
//! twice yields identical buffers.

use crate::{
    color::Rgb,
    error::{CardError, CardResult},
};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Direction {
    Vertical,
    Horizontal,
    Diagonal,
    #[default]
    BottomRight,
}

impl Direction {
    /// Parse the wire/CLI spelling of a direction.
    pub fn parse(s: &str) -> CardResult<Self> {
        match s {
            "vertical" => Ok(Self::Vertical),
            "horizontal" => Ok(Self::Horizontal),
            "diagonal" => Ok(Self::Diagonal),
            "bottom-right" => Ok(Self::BottomRight),
            other => Err(CardError::UnsupportedDirection(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::Diagonal => "diagonal",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Progress in [0, 1] along the gradient axis for pixel (x, y).
    ///
    /// Bottom-right takes the max of both axis fractions, so the final stop
    /// is reached first along the right and bottom edges and the corner at
    /// (w-1, h-1) is exactly the last color.
    fn progress(self, x: u32, y: u32, width: u32, height: u32) -> f64 {
        let axis = |v: u32, len: u32| {
            if len <= 1 {
                0.0
            } else {
                f64::from(v) / f64::from(len - 1)
            }
        };
        match self {
            Self::Vertical => axis(y, height),
            Self::Horizontal => axis(x, width),
            Self::Diagonal => {
                let span = width + height;
                if span <= 2 {
                    0.0
                } else {
                    f64::from(x + y) / f64::from(span - 2)
                }
            }
            Self::BottomRight => axis(x, width).max(axis(y, height)),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major per-pixel color buffer, immutable after generation.
#[derive(Clone, Debug)]
pub struct GradientField {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
}

impl GradientField {
    pub fn generate(
        colors: &[Rgb],
        width: u32,
        height: u32,
        direction: Direction,
    ) -> CardResult<Self> {
        if colors.len() < 2 {
            return Err(CardError::InsufficientColors(colors.len()));
        }
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let t = direction.progress(x, y, width, height);
                pixels.push(color_at(colors, t));
            }
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        debug_assert!(x < self.width && y < self.height);
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Color at progress `t` along a multi-stop ramp.
///
/// `t` maps onto N-1 equal segments; each boundary belongs to the segment it
/// starts, so t = 0.5 over three stops is exactly the middle stop. Two stops
/// reduce to a plain lerp.
pub fn color_at(colors: &[Rgb], t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let segments = colors.len() - 1;
    let pos = t * segments as f64;
    let idx = (pos.floor() as usize).min(segments - 1);
    let local = pos - idx as f64;
    lerp(colors[idx], colors[idx + 1], local)
}

fn lerp(a: Rgb, b: Rgb, t: f64) -> Rgb {
    let ch = |a: u8, b: u8| {
        (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8
    };
    Rgb::new(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVY: Rgb = Rgb::new(0x00, 0x41, 0x6A);
    const SILVER: Rgb = Rgb::new(0xE4, 0xE5, 0xE6);

    #[test]
    fn rejects_fewer_than_two_colors() {
        assert!(matches!(
            GradientField::generate(&[NAVY], 4, 4, Direction::Vertical),
            Err(CardError::InsufficientColors(1))
        ));
        assert!(matches!(
            GradientField::generate(&[], 4, 4, Direction::Vertical),
            Err(CardError::InsufficientColors(0))
        ));
    }

    #[test]
    fn vertical_endpoints_and_monotone_rows() {
        let field =
            GradientField::generate(&[NAVY, SILVER], 8, 64, Direction::Vertical).unwrap();
        assert_eq!(field.pixel(0, 0), NAVY);
        assert_eq!(field.pixel(0, 63), SILVER);
        // Each channel interpolates monotonically down the column.
        let mut prev = field.pixel(0, 0);
        for y in 1..64 {
            let cur = field.pixel(0, y);
            assert!(cur.r >= prev.r && cur.g >= prev.g && cur.b >= prev.b);
            // Rows are constant for a vertical gradient.
            assert_eq!(cur, field.pixel(7, y));
            prev = cur;
        }
    }

    #[test]
    fn three_stop_midpoint_is_exact() {
        let mid = Rgb::new(10, 200, 30);
        assert_eq!(color_at(&[NAVY, mid, SILVER], 0.5), mid);

        // On a 5x5 field the center pixel sits at t = 0.5 for every mode.
        for direction in [
            Direction::Vertical,
            Direction::Horizontal,
            Direction::Diagonal,
            Direction::BottomRight,
        ] {
            let field = GradientField::generate(&[NAVY, mid, SILVER], 5, 5, direction).unwrap();
            assert_eq!(field.pixel(2, 2), mid, "{direction}");
        }
    }

    #[test]
    fn two_stop_reduces_to_plain_lerp() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(200, 100, 50);
        assert_eq!(color_at(&[a, b], 0.5), Rgb::new(100, 50, 25));
        assert_eq!(color_at(&[a, b], 0.0), a);
        assert_eq!(color_at(&[a, b], 1.0), b);
    }

    #[test]
    fn bottom_right_pins_both_corners() {
        let field =
            GradientField::generate(&[NAVY, SILVER], 32, 48, Direction::BottomRight).unwrap();
        assert_eq!(field.pixel(0, 0), NAVY);
        assert_eq!(field.pixel(31, 47), SILVER);
        // Right and bottom edges are already at the final stop.
        assert_eq!(field.pixel(31, 0), SILVER);
        assert_eq!(field.pixel(0, 47), SILVER);
    }

    #[test]
    fn diagonal_corners() {
        let field =
            GradientField::generate(&[NAVY, SILVER], 16, 16, Direction::Diagonal).unwrap();
        assert_eq!(field.pixel(0, 0), NAVY);
        assert_eq!(field.pixel(15, 15), SILVER);
    }

    #[test]
    fn generation_is_deterministic() {
        let a = GradientField::generate(&[NAVY, SILVER], 20, 30, Direction::Diagonal).unwrap();
        let b = GradientField::generate(&[NAVY, SILVER], 20, 30, Direction::Diagonal).unwrap();
        for y in 0..30 {
            for x in 0..20 {
                assert_eq!(a.pixel(x, y), b.pixel(x, y));
            }
        }
    }

    #[test]
    fn direction_parse_round_trips() {
        for s in ["vertical", "horizontal", "diagonal", "bottom-right"] {
            assert_eq!(Direction::parse(s).unwrap().as_str(), s);
        }
        assert!(matches!(
            Direction::parse("sideways"),
            Err(CardError::UnsupportedDirection(_))
        ));
    }

    #[test]
    fn degenerate_single_pixel_axis_uses_first_stop() {
        let field =
            GradientField::generate(&[NAVY, SILVER], 1, 1, Direction::BottomRight).unwrap();
        assert_eq!(field.pixel(0, 0), NAVY);
    }
}
