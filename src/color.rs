//! Color parsing and contrast selection.
//!
//! Every color in the system is an 8-bit RGB triple derived from a 6-digit
//! hex string. Foreground selection is luminance-driven: dark panel
//! backgrounds get near-white text, light ones get dark gray.

use crate::error::{CardError, CardResult};

/// Luminance below this gets light text, at or above it dark text.
///
/// This is the single tunable of the contrast policy. 0.55 keeps mid-tone
/// backgrounds readable with either variant; both sides of the boundary are
/// pinned by tests.
pub const LUMINANCE_THRESHOLD: f64 = 0.55;

/// Text color on dark backgrounds. Near-white, not pure white.
pub const LIGHT_TEXT: Rgb = Rgb::new(0xF5, 0xF5, 0xF5);

/// Text color on light backgrounds. Dark gray, never pure black.
pub const DARK_TEXT: Rgb = Rgb::new(0x33, 0x33, 0x33);

/// Accent used for every link span, independent of the panel background.
pub const LINK_COLOR: Rgb = Rgb::new(0x00, 0x66, 0xCC);

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::str::FromStr for Rgb {
    type Err = CardError;

    fn from_str(s: &str) -> CardResult<Self> {
        parse_hex(s)
    }
}

// On the wire and in the palette file a color is its "#RRGGBB" string.
impl serde::Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a 6-hex-digit color, with or without a leading `#`.
pub fn parse_hex(s: &str) -> CardResult<Rgb> {
    let digits = s.strip_prefix('#').unwrap_or(s);
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CardError::InvalidColorFormat(s.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| CardError::InvalidColorFormat(s.to_string()))
    };
    Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Rec. 709 relative luminance in [0, 1]. Green dominates, blue counts least.
pub fn relative_luminance(c: Rgb) -> f64 {
    (0.2126 * f64::from(c.r) + 0.7152 * f64::from(c.g) + 0.0722 * f64::from(c.b)) / 255.0
}

/// True when the background reads as light to the eye.
pub fn is_light(background: Rgb) -> bool {
    relative_luminance(background) >= LUMINANCE_THRESHOLD
}

/// Readable foreground for the given background.
pub fn contrasting_text_color(background: Rgb) -> Rgb {
    if is_light(background) {
        DARK_TEXT
    } else {
        LIGHT_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_round_trips() {
        for s in ["#00416A", "E4E5E6", "#ffffff", "000000", "#0066cc"] {
            let c = parse_hex(s).unwrap();
            let canonical = s.strip_prefix('#').unwrap_or(s);
            assert!(c.to_hex()[1..].eq_ignore_ascii_case(canonical));
        }
    }

    #[test]
    fn parse_hex_rejects_malformed() {
        for s in ["", "#fff", "fffffff", "#GGGGGG", "12345g", "# 12345"] {
            assert!(matches!(
                parse_hex(s),
                Err(CardError::InvalidColorFormat(_))
            ));
        }
    }

    #[test]
    fn luminance_weights_bias_green() {
        let g = relative_luminance(Rgb::new(0, 255, 0));
        let r = relative_luminance(Rgb::new(255, 0, 0));
        let b = relative_luminance(Rgb::new(0, 0, 255));
        assert!(g > r && r > b);
        assert!((relative_luminance(Rgb::new(255, 255, 255)) - 1.0).abs() < 1e-9);
        assert_eq!(relative_luminance(Rgb::new(0, 0, 0)), 0.0);
    }

    #[test]
    fn contrast_flips_exactly_at_threshold() {
        // Gray 140 sits just below 0.55, gray 141 just above.
        let below = Rgb::new(140, 140, 140);
        let above = Rgb::new(141, 141, 141);
        assert!(relative_luminance(below) < LUMINANCE_THRESHOLD);
        assert!(relative_luminance(above) >= LUMINANCE_THRESHOLD);
        assert_eq!(contrasting_text_color(below), LIGHT_TEXT);
        assert_eq!(contrasting_text_color(above), DARK_TEXT);
    }

    #[test]
    fn text_variants_avoid_extremes() {
        assert_ne!(DARK_TEXT, Rgb::new(0, 0, 0));
        assert_eq!(contrasting_text_color(Rgb::new(255, 255, 255)), DARK_TEXT);
        assert_eq!(contrasting_text_color(Rgb::new(0, 0, 0)), LIGHT_TEXT);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Rgb = serde_json::from_str("\"#00416a\"").unwrap();
        assert_eq!(c, Rgb::new(0x00, 0x41, 0x6A));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#00416A\"");
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }
}
