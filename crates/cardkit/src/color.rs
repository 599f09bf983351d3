//! RGBA colors as authored in the catalog (sRGB, straight alpha).

use crate::error::ViewerError;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(1.0, 1.0, 1.0);
    pub const BLACK: Rgba = Rgba::opaque(0.0, 0.0, 0.0);

    #[inline]
    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Builds a color from 8-bit channels.
    #[inline]
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Linear interpolation of the color channels towards `other`; alpha is kept.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        Rgba {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a,
        }
    }

    /// Moves the color towards white by `t`.
    #[inline]
    pub fn lighten(self, t: f32) -> Rgba {
        self.lerp(Rgba::WHITE, t)
    }

    /// Euclidean distance to white over the RGB channels.
    pub fn distance_to_white(self) -> f32 {
        let (dr, dg, db) = (1.0 - self.r, 1.0 - self.g, 1.0 - self.b);
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    /// Channels converted to linear light for shading; alpha untouched.
    pub fn to_linear(self) -> [f32; 4] {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        [decode(self.r), decode(self.g), decode(self.b), self.a]
    }

    fn from_hex(hex: &str) -> Option<Self> {
        let nibble = |i: usize| u8::from_str_radix(hex.get(i..i + 1)?, 16).ok();
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

        match hex.len() {
            3 => Some(Self::from_rgba8(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
                255,
            )),
            6 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, 255)),
            8 => Some(Self::from_rgba8(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    fn from_keyword(name: &str) -> Option<Self> {
        let [r, g, b] = match name.to_ascii_lowercase().as_str() {
            "white" => [255, 255, 255],
            "black" => [0, 0, 0],
            "red" => [255, 0, 0],
            "green" => [0, 128, 0],
            "lime" => [0, 255, 0],
            "blue" => [0, 0, 255],
            "lightblue" => [173, 216, 230],
            "navy" => [0, 0, 128],
            "yellow" => [255, 255, 0],
            "orange" => [255, 165, 0],
            "purple" => [128, 0, 128],
            "magenta" | "fuchsia" => [255, 0, 255],
            "cyan" | "aqua" => [0, 255, 255],
            "gray" | "grey" => [128, 128, 128],
            "lightgray" | "lightgrey" => [211, 211, 211],
            _ => return None,
        };
        Some(Self::from_rgba8(r, g, b, 255))
    }
}

impl FromStr for Rgba {
    type Err = ViewerError;

    /// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa` and a small set of CSS keywords.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let parsed = match s.strip_prefix('#') {
            Some(hex) => Self::from_hex(hex),
            None => Self::from_keyword(s),
        };
        parsed.ok_or_else(|| ViewerError::InvalidColor(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Rgba {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_forms() {
        let c: Rgba = "#61DAFB".parse().unwrap();
        assert_eq!(c.to_rgba8(), [0x61, 0xda, 0xfb, 0xff]);

        let short: Rgba = "#ccc".parse().unwrap();
        assert_eq!(short.to_rgba8(), [0xcc, 0xcc, 0xcc, 0xff]);

        let with_alpha: Rgba = "#E10098aa".parse().unwrap();
        assert_eq!(with_alpha.to_rgba8(), [0xe1, 0x00, 0x98, 0xaa]);
    }

    #[test]
    fn parses_keywords_case_insensitively() {
        let c: Rgba = "LightBlue".parse().unwrap();
        assert_eq!(c.to_rgba8(), [173, 216, 230, 255]);
        assert!("orange".parse::<Rgba>().is_ok());
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            "#12345".parse::<Rgba>(),
            Err(ViewerError::InvalidColor(_))
        ));
        assert!("chartreuse-ish".parse::<Rgba>().is_err());
        assert!("#zzzzzz".parse::<Rgba>().is_err());
    }

    #[test]
    fn lighten_moves_towards_white_and_keeps_alpha() {
        let c = Rgba { r: 0.2, g: 0.4, b: 0.0, a: 0.5 };
        let l = c.lighten(0.4);
        assert!(l.distance_to_white() < c.distance_to_white());
        assert_eq!(l.a, 0.5);
        assert_eq!(Rgba::WHITE.lighten(0.4), Rgba::WHITE);
    }

    #[test]
    fn display_round_trips_through_parse() {
        let c: Rgba = "#3178c6".parse().unwrap();
        assert_eq!(c.to_string(), "#3178c6");
    }
}
