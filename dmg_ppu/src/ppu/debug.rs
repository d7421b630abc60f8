use std::fmt::Write;

use super::memory::VideoMemory;
use super::palette::ColorScheme;
use super::sprite::Sprite;
use super::tile::TILE_BYTES;
use super::vram::TileMap;
use super::vram::TILE_MAP_HEIGHT;
use super::vram::TILE_MAP_WIDTH;
use super::Ppu;
use crate::common::address::PpuRegister;
use crate::common::address::TILE_DATA_UNSIGNED_BASE;
use crate::common::image::Image;

/// Number of tiles in the pattern tables at $8000-$97FF.
pub const TILE_DATA_COUNT: u32 = 384;
const TILES_PER_ROW: u32 = 16;

pub struct PpuDebug<'a, MemoryT: VideoMemory>(pub &'a Ppu<MemoryT>);

impl<MemoryT: VideoMemory> PpuDebug<'_, MemoryT> {
    /// Sprites captured by the latest OAM scan.
    pub fn sprites(&self) -> Vec<Sprite> {
        self.0.sprites.sprites().to_vec()
    }

    pub fn sprite_info(&self, index: usize) -> String {
        match self.0.sprites.sprites().get(index) {
            Some(sprite) => sprite.to_string(),
            None => format!("Sprite {index:02}: out of range"),
        }
    }

    pub fn window_line_counter(&self) -> u8 {
        self.0.window.line_counter()
    }

    pub fn window_active(&self) -> bool {
        self.0.window.is_active()
    }

    pub fn register_dump(&self) -> String {
        let registers = &self.0.registers;
        let mut dump = String::new();
        for register in PpuRegister::ALL {
            let _ = writeln!(
                dump,
                "{:<4} ${:04X} = {:02X}",
                register.to_string(),
                register.address(),
                registers.read(register)
            );
        }
        let _ = writeln!(dump, "Mode {}", registers.mode());
        let _ = writeln!(dump, "BGP  {}", registers.bgp());
        let _ = writeln!(dump, "OBP0 {}", registers.obp0());
        let _ = write!(dump, "OBP1 {}", registers.obp1());
        dump
    }

    /// All 384 tiles of $8000-$97FF, 16 tiles per row, shown with raw colors.
    pub fn render_tile_data<ImageT: Image>(&self, scheme: ColorScheme) -> ImageT {
        let rows = TILE_DATA_COUNT / TILES_PER_ROW;
        let mut image = ImageT::new(TILES_PER_ROW * 8, rows * 8);
        for tile_idx in 0..TILE_DATA_COUNT {
            let coarse_x = tile_idx % TILES_PER_ROW;
            let coarse_y = tile_idx / TILES_PER_ROW;
            let tile_addr = TILE_DATA_UNSIGNED_BASE + tile_idx as u16 * TILE_BYTES;
            for fine_y in 0..8 {
                let row = self.0.memory.tile_row(tile_addr, fine_y);
                for (fine_x, pixel) in row.pixels() {
                    image.set_pixel(
                        (coarse_x * 8 + fine_x, coarse_y * 8 + fine_y),
                        scheme.to_rgb(pixel).into(),
                    );
                }
            }
        }
        image
    }

    /// The full 256x256 tile map using the current tile addressing mode and BGP.
    pub fn render_tile_map<ImageT: Image>(&self, map: TileMap, scheme: ColorScheme) -> ImageT {
        let registers = &self.0.registers;
        let memory = &self.0.memory;
        let palette = registers.bgp();
        let mut image = ImageT::new(TILE_MAP_WIDTH as u32 * 8, TILE_MAP_HEIGHT as u32 * 8);
        for map_y in 0..TILE_MAP_HEIGHT {
            for map_x in 0..TILE_MAP_WIDTH {
                let tile = memory.tile_from_map(map_x, map_y, map, registers.tile_addressing());
                for (fine_y, row) in tile.rows().enumerate() {
                    for (fine_x, pixel) in row.iter().enumerate() {
                        image.set_pixel(
                            (
                                (map_x * 8 + fine_x) as u32,
                                (map_y * 8 + fine_y) as u32,
                            ),
                            scheme.to_rgb(palette.apply(*pixel)).into(),
                        );
                    }
                }
            }
        }
        image
    }

    /// Reports window positions that leave the window partly or fully off screen.
    pub fn validate_window_position(&self) -> Result<(), String> {
        let registers = &self.0.registers;
        let mut issues = Vec::new();
        if registers.wx() < 7 {
            issues.push(format!(
                "WX={} is less than 7, the window is clipped on the left",
                registers.wx()
            ));
        }
        if registers.wx() > 166 {
            issues.push(format!(
                "WX={} is greater than 166, the window is off screen",
                registers.wx()
            ));
        }
        if registers.wy() > 143 {
            issues.push(format!(
                "WY={} is greater than 143, the window is off screen",
                registers.wy()
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues.join("; "))
        }
    }
}
