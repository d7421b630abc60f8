//! Palette registers and conversion of shades to display colors.
//!
//! A palette register maps each raw 2-bit tile color to one of four shades:
//!
//! ```text
//! 7  bit  0
//! ---- ----
//! 3322 1100
//! |||| ||++- Shade for raw color 0
//! |||| ++--- Shade for raw color 1
//! ||++------ Shade for raw color 2
//! ++-------- Shade for raw color 3
//! ```
use std::fmt::Display;
use std::fmt::Formatter;

use intbits::Bits;
use serde::Deserialize;
use serde::Serialize;

use crate::common::image::Rgb;

pub const SHADE_NAMES: [&str; 4] = ["White", "Light Gray", "Dark Gray", "Black"];

pub fn decode_palette(value: u8) -> [u8; 4] {
    [0_usize, 1, 2, 3].map(|i| value.bits(i * 2..i * 2 + 2))
}

/// Maps a raw tile color through a decoded palette. Raw colors above 3 are clamped to 3.
pub fn apply_palette(raw_color: u8, palette: &[u8; 4]) -> u8 {
    palette[raw_color.min(3) as usize]
}

/// Sprite pixels with raw color 0 are never drawn, whatever the palette maps it to.
pub fn is_transparent(raw_color: u8) -> bool {
    raw_color == 0
}

pub fn to_display_color(color: u8, scheme: ColorScheme) -> Rgb {
    scheme.to_rgb(color)
}

/// Value of one of the BGP, OBP0 or OBP1 registers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Palette(pub u8);

impl Palette {
    pub fn decode(self) -> [u8; 4] {
        decode_palette(self.0)
    }

    pub fn apply(self, raw_color: u8) -> u8 {
        apply_palette(raw_color, &self.decode())
    }
}

impl Display for Palette {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self
            .decode()
            .iter()
            .map(|shade| SHADE_NAMES[*shade as usize])
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Fixed RGB tables used to show the four shades, lightest first.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ColorScheme {
    /// The green tint of the original LCD.
    #[default]
    Green,
    Grayscale,
}

impl ColorScheme {
    pub fn colors(self) -> [Rgb; 4] {
        match self {
            ColorScheme::Green => [
                Rgb::new(155, 188, 15),
                Rgb::new(139, 172, 15),
                Rgb::new(48, 98, 48),
                Rgb::new(15, 56, 15),
            ],
            ColorScheme::Grayscale => [
                Rgb::new(255, 255, 255),
                Rgb::new(170, 170, 170),
                Rgb::new(85, 85, 85),
                Rgb::new(0, 0, 0),
            ],
        }
    }

    /// Display color of a shade. Shades above 3 clamp to the darkest entry.
    pub fn to_rgb(self, color: u8) -> Rgb {
        self.colors()[color.min(3) as usize]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_decode_palette() {
        assert_eq!(decode_palette(0xE4), [0, 1, 2, 3]);
        assert_eq!(decode_palette(0x1B), [3, 2, 1, 0]);
        assert_eq!(decode_palette(0b1100_0011), [3, 0, 0, 3]);
    }

    #[test]
    fn test_apply_palette_clamps() {
        let palette = decode_palette(0x1B);
        assert_eq!(apply_palette(0, &palette), 3);
        assert_eq!(apply_palette(3, &palette), 0);
        assert_eq!(apply_palette(200, &palette), 0);
        assert_eq!(Palette(0x1B).apply(1), 2);
    }

    #[test]
    fn test_transparency_ignores_palette() {
        assert!(is_transparent(0));
        assert!(!is_transparent(1));
        // Raw color 0 is transparent even when the palette maps it to black.
        assert_eq!(Palette(0x03).apply(0), 3);
    }

    #[test]
    fn test_display_colors() {
        assert_eq!(to_display_color(0, ColorScheme::Green), Rgb::new(155, 188, 15));
        assert_eq!(to_display_color(3, ColorScheme::Green), Rgb::new(15, 56, 15));
        assert_eq!(to_display_color(2, ColorScheme::Grayscale), Rgb::new(85, 85, 85));
        assert_eq!(to_display_color(7, ColorScheme::Grayscale), Rgb::new(0, 0, 0));
    }

    #[test]
    fn test_palette_display() {
        assert_eq!(
            Palette(0xE4).to_string(),
            "White, Light Gray, Dark Gray, Black"
        );
        assert_eq!(Palette(0x00).to_string(), "White, White, White, White");
    }

    #[test]
    fn test_color_scheme_names() {
        assert_eq!(ColorScheme::from_str("Grayscale").unwrap(), ColorScheme::Grayscale);
        assert_eq!(ColorScheme::Green.to_string(), "green");
        assert_eq!(
            serde_json::to_string(&ColorScheme::Grayscale).unwrap(),
            "\"grayscale\""
        );
        let scheme: ColorScheme = serde_json::from_str("\"green\"").unwrap();
        assert_eq!(scheme, ColorScheme::Green);
    }
}
