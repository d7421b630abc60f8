use serde::Deserialize;
use serde::Serialize;

/// 24-bit RGB color as produced by a color scheme.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// 32-bit RGBA format used on modern machines for interop with image-rs
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rgba32(pub [u8; 4]);

impl From<Rgb> for Rgba32 {
    fn from(value: Rgb) -> Self {
        Self([value.r, value.g, value.b, 255])
    }
}

impl From<Rgba32> for Rgb {
    fn from(value: Rgba32) -> Self {
        Self::new(value.0[0], value.0[1], value.0[2])
    }
}

/// Abstract interface for image::RgbaImage (used in tests and the PNG frontend) or any other
/// pixel sink a frontend wants to render into.
pub trait Image {
    fn new(width: u32, height: u32) -> Self;
    fn set_pixel(&mut self, index: (u32, u32), value: Rgba32);
}
