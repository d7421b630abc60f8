use super::palette::ColorScheme;
use crate::common::image::Image;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 144;

/// The 160x144 screen as final shades (0 = lightest, 3 = darkest), stored row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer(Vec<u8>);

impl Framebuffer {
    /// Shade at (x, y). Coordinates outside the screen read as 0.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return 0;
        }
        self.0[y * SCREEN_WIDTH + x]
    }

    /// Sets the shade at (x, y), clamped to 3. Coordinates outside the screen are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u8) {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        self.0[y * SCREEN_WIDTH + x] = color.min(3);
    }

    pub fn scanline(&self, y: usize) -> &[u8] {
        &self.0[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
    }

    pub(crate) fn scanline_mut(&mut self, y: usize) -> &mut [u8] {
        &mut self.0[y * SCREEN_WIDTH..(y + 1) * SCREEN_WIDTH]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.0.chunks_exact(SCREEN_WIDTH)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
        self.0.iter().enumerate().map(|(idx, pixel)| {
            (
                (idx % SCREEN_WIDTH) as u32,
                (idx / SCREEN_WIDTH) as u32,
                *pixel,
            )
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn fill(&mut self, color: u8) {
        self.0.fill(color.min(3));
    }

    pub fn to_rgba<ImageT: Image>(&self, scheme: ColorScheme) -> ImageT {
        let colors = scheme.colors();
        let mut image = ImageT::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
        for (x, y, pixel) in self.iter() {
            image.set_pixel((x, y), colors[pixel as usize].into());
        }
        image
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self(vec![0; SCREEN_WIDTH * SCREEN_HEIGHT])
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Framebuffer({}x{})", SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl std::ops::Index<(u32, u32)> for Framebuffer {
    type Output = u8;

    fn index(&self, index: (u32, u32)) -> &Self::Output {
        &self.0[index.0 as usize + index.1 as usize * SCREEN_WIDTH]
    }
}

impl std::ops::IndexMut<(u32, u32)> for Framebuffer {
    fn index_mut(&mut self, index: (u32, u32)) -> &mut Self::Output {
        &mut self.0[index.0 as usize + index.1 as usize * SCREEN_WIDTH]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::image::Rgba32;

    struct TestImage {
        width: u32,
        pixels: Vec<Rgba32>,
    }

    impl Image for TestImage {
        fn new(width: u32, height: u32) -> Self {
            Self {
                width,
                pixels: vec![Rgba32::default(); (width * height) as usize],
            }
        }

        fn set_pixel(&mut self, index: (u32, u32), value: Rgba32) {
            self.pixels[(index.1 * self.width + index.0) as usize] = value;
        }
    }

    #[test]
    fn test_pixel_bounds() {
        let mut framebuffer = Framebuffer::default();
        framebuffer.set_pixel(159, 143, 2);
        framebuffer.set_pixel(160, 0, 3);
        framebuffer.set_pixel(0, 0, 9);
        assert_eq!(framebuffer.pixel(159, 143), 2);
        assert_eq!(framebuffer.pixel(160, 0), 0);
        assert_eq!(framebuffer.pixel(0, 144), 0);
        assert_eq!(framebuffer.pixel(0, 0), 3);
        assert_eq!(framebuffer[(159, 143)], 2);
    }

    #[test]
    fn test_scanlines() {
        let mut framebuffer = Framebuffer::default();
        framebuffer.scanline_mut(10).fill(1);
        assert_eq!(framebuffer.scanline(10), &[1; SCREEN_WIDTH][..]);
        assert_eq!(framebuffer.pixel(0, 9), 0);
        assert_eq!(framebuffer.pixel(0, 11), 0);
        assert_eq!(framebuffer.rows().count(), SCREEN_HEIGHT);
        assert_eq!(framebuffer.rows().nth(10), Some(&[1; SCREEN_WIDTH][..]));
    }

    #[test]
    fn test_to_rgba() {
        let mut framebuffer = Framebuffer::default();
        framebuffer[(3, 4)] = 3;
        let image: TestImage = framebuffer.to_rgba(ColorScheme::Grayscale);
        assert_eq!(image.pixels.len(), SCREEN_WIDTH * SCREEN_HEIGHT);
        assert_eq!(image.pixels[0], Rgba32([255, 255, 255, 255]));
        assert_eq!(image.pixels[4 * SCREEN_WIDTH + 3], Rgba32([0, 0, 0, 255]));
    }
}
