//! Accent colours
//!
//! Stored as plain RGB and serialized as `#RRGGBB` strings so configuration
//! JSON reads the same as the page's CSS tokens.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque sRGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RRGGBB`, `RRGGBB` or the short `#RGB` form
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let channel = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
        match hex.len() {
            6 => Some(Self::new(channel(0, 2)?, channel(2, 2)?, channel(4, 2)?)),
            3 => {
                let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
                Some(Self::new(r * 17, g * 17, b * 17))
            }
            _ => None,
        }
    }

    /// CSS colour string, with alpha when not fully opaque
    pub fn css(&self, alpha: f32) -> String {
        if alpha >= 1.0 {
            self.to_string()
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                alpha.clamp(0.0, 1.0)
            )
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for Rgb {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Rgb::from_hex(&s).ok_or_else(|| format!("invalid colour {s:?}"))
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accents() {
        assert_eq!(Rgb::from_hex("#00BFFF"), Some(Rgb::new(0, 191, 255)));
        assert_eq!(Rgb::from_hex("FF0033"), Some(Rgb::new(255, 0, 51)));
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#GG0000"), None);
    }

    #[test]
    fn test_css_strings() {
        let c = Rgb::new(0, 191, 255);
        assert_eq!(c.css(1.0), "#00BFFF");
        assert_eq!(Rgb::BLACK.css(0.05), "rgba(0, 0, 0, 0.05)");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgb::new(255, 0, 51)).unwrap();
        assert_eq!(json, "\"#FF0033\"");
        let back: Rgb = serde_json::from_str("\"#00bfff\"").unwrap();
        assert_eq!(back, Rgb::new(0, 191, 255));
        assert!(serde_json::from_str::<Rgb>("\"blue\"").is_err());
    }
}
