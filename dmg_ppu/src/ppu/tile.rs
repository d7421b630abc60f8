//! 2bpp planar tile codec.
//!
//! Each 8x8 tile takes 16 bytes in VRAM, two bytes per row:
//!
//! ```text
//! byte 2r     low bit plane   7654 3210  <- bit 7 is the leftmost pixel
//! byte 2r+1   high bit plane  7654 3210
//! pixel c = low.bit(7-c) | high.bit(7-c) << 1
//! ```
use std::fmt::Display;
use std::fmt::Formatter;

use intbits::Bits;

pub const TILE_WIDTH: usize = 8;
pub const TILE_HEIGHT: usize = 8;
/// Bytes per tile in VRAM.
pub const TILE_BYTES: u16 = 16;

/// Raw tile as stored in VRAM.
pub type TileData = [u8; 16];

/// Characters used to render color indices 0..=3 as text, lightest first.
pub const SHADE_CHARS: [char; 4] = [' ', '░', '▒', '█'];

/// A decoded 8x8 grid of 2-bit color indices, stored row-major.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Tile {
    pixels: [[u8; TILE_WIDTH]; TILE_HEIGHT],
}

impl Tile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(data: &TileData) -> Self {
        let mut tile = Tile::new();
        for (y, row) in tile.pixels.iter_mut().enumerate() {
            let tile_row = TileRow::new(data[y * 2], data[y * 2 + 1]);
            for (x, pixel) in row.iter_mut().enumerate() {
                *pixel = tile_row.pixel(x as u32);
            }
        }
        tile
    }

    /// Inverse of `decode`. Pixels are always within 0..=3 because `set_pixel` clamps.
    pub fn encode(&self) -> TileData {
        let mut data = [0; 16];
        for (y, row) in self.pixels.iter().enumerate() {
            let tile_row = TileRow::encode(row);
            data[y * 2] = tile_row.planes[0];
            data[y * 2 + 1] = tile_row.planes[1];
        }
        data
    }

    /// Color index at (x, y). Coordinates outside the tile read as 0.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        if x >= TILE_WIDTH || y >= TILE_HEIGHT {
            return 0;
        }
        self.pixels[y][x]
    }

    /// Sets the color index at (x, y), clamped to 3. Coordinates outside the tile are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u8) {
        if x >= TILE_WIDTH || y >= TILE_HEIGHT {
            return;
        }
        self.pixels[y][x] = color.min(3);
    }

    pub fn fill(&mut self, color: u8) {
        self.pixels = [[color.min(3); TILE_WIDTH]; TILE_HEIGHT];
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.iter().flatten().all(|pixel| *pixel == 0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8; TILE_WIDTH]> {
        self.pixels.iter()
    }

    pub fn flip_horizontal(&self) -> Self {
        let mut flipped = *self;
        for row in flipped.pixels.iter_mut() {
            row.reverse();
        }
        flipped
    }

    pub fn flip_vertical(&self) -> Self {
        let mut flipped = *self;
        flipped.pixels.reverse();
        flipped
    }

    pub fn flip_both(&self) -> Self {
        self.flip_horizontal().flip_vertical()
    }

    /// Number of pixels using each color index.
    pub fn color_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for pixel in self.pixels.iter().flatten() {
            counts[*pixel as usize] += 1;
        }
        counts
    }

    /// Builds a tile from a text pattern read row by row.
    ///
    /// `' '` = 0, `'.'` = 1, `'o'` = 2, `'#'` = 3. Line breaks are skipped, any other character
    /// is color 0 and characters beyond the 64th are ignored.
    pub fn from_pattern(pattern: &str) -> Self {
        let mut tile = Tile::new();
        let pixels = pattern.chars().filter(|c| *c != '\n' && *c != '\r');
        for (idx, c) in pixels.take(TILE_WIDTH * TILE_HEIGHT).enumerate() {
            let color = match c {
                '.' => 1,
                'o' => 2,
                '#' => 3,
                _ => 0,
            };
            tile.set_pixel(idx % TILE_WIDTH, idx / TILE_WIDTH, color);
        }
        tile
    }

    pub fn test_pattern(pattern: TestPattern) -> Self {
        let mut tile = Tile::new();
        for y in 0..TILE_HEIGHT {
            for x in 0..TILE_WIDTH {
                let color = match pattern {
                    TestPattern::Solid0 => 0,
                    TestPattern::Solid3 => 3,
                    TestPattern::Checkerboard => {
                        if (x + y) % 2 == 0 {
                            0
                        } else {
                            3
                        }
                    }
                    TestPattern::Gradient => ((x + y) % 4) as u8,
                    TestPattern::Border => {
                        if x == 0 || y == 0 || x == TILE_WIDTH - 1 || y == TILE_HEIGHT - 1 {
                            3
                        } else {
                            0
                        }
                    }
                };
                tile.set_pixel(x, y, color);
            }
        }
        tile
    }
}

impl Display for Tile {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for row in self.pixels.iter() {
            let line: String = row.iter().map(|pixel| SHADE_CHARS[*pixel as usize]).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum TestPattern {
    Solid0,
    Solid3,
    Checkerboard,
    Gradient,
    Border,
}

/// A single row of a tile as the two bit planes stored in VRAM.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileRow {
    planes: [u8; 2],
}

impl TileRow {
    pub fn new(low: u8, high: u8) -> Self {
        Self { planes: [low, high] }
    }

    /// Raw color index of column `x` (0 = leftmost).
    pub fn pixel(&self, x: u32) -> u8 {
        let bit = 7 - (x & 7);
        self.planes[0].bit(bit) as u8 | ((self.planes[1].bit(bit) as u8) << 1)
    }

    pub fn pixels(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        (0..8).map(|x| (x, self.pixel(x)))
    }

    pub fn encode(pixels: &[u8; TILE_WIDTH]) -> Self {
        let mut planes = [0_u8; 2];
        for (x, pixel) in pixels.iter().enumerate() {
            let color = (*pixel).min(3);
            let bit = 7 - x;
            planes[0].set_bit(bit, color.bit(0));
            planes[1].set_bit(bit, color.bit(1));
        }
        Self { planes }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_decode_msb_first() {
        // Row 0: low = 0b1000_0001, high = 0b1000_0000
        // Leftmost pixel has both planes set (3), rightmost only the low plane (1).
        let mut data = [0; 16];
        data[0] = 0x81;
        data[1] = 0x80;
        let tile = Tile::decode(&data);
        assert_eq!(tile.pixel(0, 0), 3);
        assert_eq!(tile.pixel(7, 0), 1);
        assert_eq!(tile.pixel(3, 0), 0);
        assert_eq!(tile.pixel(0, 1), 0);
    }

    #[test]
    fn test_decode_known_tile() {
        // The classic "A" tile from the Pan Docs tile data example.
        let data: TileData = [
            0x3C, 0x7E, 0x42, 0x42, 0x42, 0x42, 0x42, 0x42, 0x7E, 0x5E, 0x7E, 0x0A, 0x7C, 0x56,
            0x38, 0x7C,
        ];
        let tile = Tile::decode(&data);
        let rows: Vec<[u8; 8]> = tile.rows().copied().collect();
        assert_eq!(rows[0], [0, 2, 3, 3, 3, 3, 2, 0]);
        assert_eq!(rows[1], [0, 3, 0, 0, 0, 0, 3, 0]);
        assert_eq!(rows[4], [0, 3, 1, 3, 3, 3, 3, 0]);
        assert_eq!(rows[7], [0, 2, 3, 3, 3, 2, 0, 0]);
        assert_eq!(tile.encode(), data);
    }

    #[test]
    fn test_encode_inverts_decode_for_patterns() {
        for pattern in [
            TestPattern::Solid0,
            TestPattern::Solid3,
            TestPattern::Checkerboard,
            TestPattern::Gradient,
            TestPattern::Border,
        ] {
            let tile = Tile::test_pattern(pattern);
            assert_eq!(Tile::decode(&tile.encode()), tile, "{pattern}");
        }
    }

    #[test]
    fn test_every_row_round_trips() {
        // 4^8 possible rows, and since each tile row is encoded independently this covers
        // every tile.
        for value in 0..=u16::MAX as u32 {
            let pixels: [u8; TILE_WIDTH] = std::array::from_fn(|x| (value >> (2 * x)) as u8 & 3);
            let row = TileRow::encode(&pixels);
            let decoded: Vec<u8> = row.pixels().map(|(_, pixel)| pixel).collect();
            assert_eq!(decoded, pixels.to_vec(), "row {value:04X}");

            let mut tile = Tile::new();
            for (x, pixel) in pixels.iter().enumerate() {
                tile.set_pixel(x, value as usize % TILE_HEIGHT, *pixel);
            }
            assert_eq!(Tile::decode(&tile.encode()), tile, "row {value:04X}");
        }
    }

    #[test]
    fn test_every_plane_pair_decodes_to_its_own_encoding() {
        for low in 0..=u8::MAX {
            for high in 0..=u8::MAX {
                let row = TileRow::new(low, high);
                let mut pixels = [0; TILE_WIDTH];
                for (x, pixel) in row.pixels() {
                    pixels[x as usize] = pixel;
                }
                assert_eq!(TileRow::encode(&pixels), row);
            }
        }
    }

    #[test]
    fn test_set_pixel_clamps_and_ignores_out_of_range() {
        let mut tile = Tile::new();
        tile.set_pixel(2, 3, 9);
        tile.set_pixel(8, 0, 1);
        tile.set_pixel(0, 8, 1);
        assert_eq!(tile.pixel(2, 3), 3);
        assert_eq!(tile.pixel(8, 0), 0);
        assert_eq!(tile.color_counts(), [63, 0, 0, 1]);
    }

    #[test]
    fn test_flips() {
        let tile = Tile::from_pattern(
            "#.      \n\
             o       \n\
             \n\
             \n\
             \n\
             \n\
             \n\
             \n",
        );
        assert_eq!(tile.pixel(0, 0), 3);
        assert_eq!(tile.pixel(1, 0), 1);
        assert_eq!(tile.pixel(0, 1), 2);

        let h = tile.flip_horizontal();
        assert_eq!(h.pixel(7, 0), 3);
        assert_eq!(h.pixel(6, 0), 1);

        let v = tile.flip_vertical();
        assert_eq!(v.pixel(0, 7), 3);
        assert_eq!(v.pixel(0, 6), 2);

        assert_eq!(tile.flip_both().pixel(7, 7), 3);
        assert_eq!(tile.flip_both().flip_both(), tile);
    }

    #[test]
    fn test_from_pattern_skips_newlines() {
        let tile = Tile::from_pattern("########\n........\noooooooo");
        assert_eq!(tile.color_counts(), [40, 8, 8, 8]);
        assert!(!tile.is_empty());
        assert!(Tile::from_pattern("").is_empty());
    }

    #[test]
    fn test_display() {
        let tile = Tile::test_pattern(TestPattern::Border);
        let text = tile.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "████████");
        assert_eq!(lines[1], "█      █");
    }

    #[test]
    fn test_tile_row() {
        let row = TileRow::new(0b0101_0000, 0b0011_0000);
        let pixels: Vec<u8> = row.pixels().map(|(_, pixel)| pixel).collect();
        assert_eq!(pixels, vec![0, 1, 2, 3, 0, 0, 0, 0]);
        assert_eq!(TileRow::encode(&[0, 1, 2, 3, 0, 0, 0, 0]), row);
    }
}
