//! Implementation of sprite (OBJ) scanning and compositing.
use std::fmt::Display;
use std::fmt::Formatter;

use itertools::Itertools;
use packed_struct::prelude::*;

use super::framebuffer::SCREEN_WIDTH;
use super::memory::VideoMemory;
use super::oam::Oam;
use super::oam::OAM_ENTRY_COUNT;
use super::palette::is_transparent;
use super::registers::Registers;
use super::vram::tile_address;
use super::vram::TileAddressing;

/// Hardware limit of sprites drawn on a single scanline.
pub const MAX_SPRITES_PER_LINE: usize = 10;

/// Byte 3 of an OAM entry: sprite attributes
/// 7  bit  0
/// ---- ----
/// BYXP ....
/// |||| ||||
/// |||| ++++- CGB only (ignored)
/// |||+------ Palette (0 = OBP0, 1 = OBP1)
/// ||+------- Horizontal flip
/// |+-------- Vertical flip
/// +--------- Behind background colors 1-3
#[derive(PackedStruct, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[packed_struct(bit_numbering = "msb0")]
pub struct SpriteFlags {
    pub behind_background: bool,
    pub flip_y: bool,
    pub flip_x: bool,
    pub palette: bool,
    pub cgb_bank: bool,
    pub cgb_palette_2: bool,
    pub cgb_palette_1: bool,
    pub cgb_palette_0: bool,
}

impl From<u8> for SpriteFlags {
    fn from(value: u8) -> Self {
        SpriteFlags::unpack(&[value]).unwrap()
    }
}

impl From<SpriteFlags> for u8 {
    fn from(value: SpriteFlags) -> Self {
        value.pack().unwrap()[0]
    }
}

/// A decoded OAM entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sprite {
    pub oam_index: usize,
    pub y: u8,
    pub x: u8,
    pub tile: u8,
    pub flags: SpriteFlags,
}

impl Sprite {
    pub fn new(oam_index: usize, data: [u8; 4]) -> Self {
        Self {
            oam_index,
            y: data[0],
            x: data[1],
            tile: data[2],
            flags: SpriteFlags::from(data[3]),
        }
    }

    /// Top edge on screen. OAM Y stores screen Y + 16.
    pub fn screen_y(&self) -> i32 {
        self.y as i32 - 16
    }

    /// Left edge on screen. OAM X stores screen X + 8.
    pub fn screen_x(&self) -> i32 {
        self.x as i32 - 8
    }

    pub fn is_on_scanline(&self, ly: u8, height: u32) -> bool {
        let ly = ly as i32;
        ly >= self.screen_y() && ly < self.screen_y() + height as i32
    }

    /// Tile index and row within that tile covering scanline `ly`, vertical flip applied.
    ///
    /// 8x16 sprites use the tile with bit 0 cleared for the top half and set for the bottom half.
    pub fn tile_row(&self, ly: u8, height: u32) -> (u8, u32) {
        let mut row = (ly as i32 - self.screen_y()).clamp(0, height as i32 - 1) as u32;
        if self.flags.flip_y {
            row = height - 1 - row;
        }
        if height == 16 {
            if row < 8 {
                (self.tile & 0xFE, row)
            } else {
                (self.tile | 0x01, row - 8)
            }
        } else {
            (self.tile, row)
        }
    }
}

impl Display for Sprite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sprite {:02}: Tile{:02X} at ({}, {}) OBP{}{}{}{}",
            self.oam_index,
            self.tile,
            self.screen_x(),
            self.screen_y(),
            self.flags.palette as u8,
            if self.flags.behind_background {
                " BehindBG"
            } else {
                ""
            },
            if self.flags.flip_x { " HFlip" } else { "" },
            if self.flags.flip_y { " VFlip" } else { "" },
        )
    }
}

/// Holds the sprites captured by the latest OAM scan and composites them onto scanlines.
pub struct SpriteRenderer {
    sprites: [Sprite; OAM_ENTRY_COUNT],
}

impl SpriteRenderer {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            sprites: [Sprite::default(); OAM_ENTRY_COUNT],
        }
    }

    /// Rebuilds all 40 sprite records from OAM.
    pub fn scan<MemoryT: VideoMemory>(&mut self, memory: &MemoryT) {
        for (index, sprite) in self.sprites.iter_mut().enumerate() {
            let base = Oam::entry_address(index);
            let data = [0, 1, 2, 3].map(|offset| memory.read_oam(base + offset));
            *sprite = Sprite::new(index, data);
        }
    }

    pub fn sprites(&self) -> &[Sprite; OAM_ENTRY_COUNT] {
        &self.sprites
    }

    /// Sprites covering `ly` in priority order (highest first), at most 10.
    ///
    /// Lower X wins. Sprites sharing an X are ordered by OAM index.
    pub fn sprites_on_scanline(&self, ly: u8, height: u32) -> Vec<Sprite> {
        self.sprites
            .iter()
            .filter(|sprite| sprite.is_on_scanline(ly, height))
            .sorted_by_key(|sprite| (sprite.x, sprite.oam_index))
            .take(MAX_SPRITES_PER_LINE)
            .copied()
            .collect()
    }

    /// Composites the sprites of scanline `ly` onto `line`, which already holds the background
    /// and window shades.
    pub fn render_line<MemoryT: VideoMemory>(
        &self,
        registers: &Registers,
        memory: &MemoryT,
        ly: u8,
        line: &mut [u8],
    ) {
        if !registers.lcdc().sprite_enable() {
            return;
        }
        let height = registers.sprite_height();
        // Lowest priority first so higher priority sprites overwrite it.
        for sprite in self.sprites_on_scanline(ly, height).iter().rev() {
            let (tile, row) = sprite.tile_row(ly, height);
            let tile_row = memory.tile_row(tile_address(tile, TileAddressing::Unsigned), row);
            let palette = registers.sprite_palette(sprite.flags.palette);

            for col in 0..8 {
                let screen_x = sprite.screen_x() + col;
                if screen_x < 0 || screen_x >= SCREEN_WIDTH as i32 {
                    continue;
                }
                let tile_x = if sprite.flags.flip_x { 7 - col } else { col };
                let raw_color = tile_row.pixel(tile_x as u32);
                if is_transparent(raw_color) {
                    continue;
                }
                let pixel = &mut line[screen_x as usize];
                if sprite.flags.behind_background && *pixel != 0 {
                    continue;
                }
                *pixel = palette.apply(raw_color);
            }
        }
    }
}
