//! Background layer renderer.
use super::memory::VideoMemory;
use super::registers::Registers;
use super::tile::TileRow;
use super::vram::tile_address;
use super::vram::TileAddressing;
use super::vram::TileMap;
use super::vram::TILE_MAP_WIDTH;

/// Fetches tile rows along one row of a tile map, reusing the last row while consecutive pixels
/// stay in the same map column.
pub(super) struct MapRowFetcher<'a, MemoryT: VideoMemory> {
    memory: &'a MemoryT,
    map: TileMap,
    addressing: TileAddressing,
    map_y: usize,
    fine_y: u32,
    cached: Option<(usize, TileRow)>,
}

impl<'a, MemoryT: VideoMemory> MapRowFetcher<'a, MemoryT> {
    /// Fetcher for pixel row `y` (0..256) of `map`.
    pub fn new(memory: &'a MemoryT, map: TileMap, addressing: TileAddressing, y: u32) -> Self {
        Self {
            memory,
            map,
            addressing,
            map_y: (y / 8) as usize % TILE_MAP_WIDTH,
            fine_y: y % 8,
            cached: None,
        }
    }

    /// Raw color of the pixel at map pixel column `x` (0..256).
    pub fn pixel(&mut self, x: u32) -> u8 {
        let map_x = (x / 8) as usize % TILE_MAP_WIDTH;
        let tile_row = match self.cached {
            Some((cached_x, tile_row)) if cached_x == map_x => tile_row,
            _ => {
                let index = self.memory.tile_index(map_x, self.map_y, self.map);
                let tile_row = self
                    .memory
                    .tile_row(tile_address(index, self.addressing), self.fine_y);
                self.cached = Some((map_x, tile_row));
                tile_row
            }
        };
        tile_row.pixel(x % 8)
    }
}

/// Renders the background for scanline `ly` into `line`.
///
/// The 256x256 background wraps around in both directions. A disabled background leaves the
/// line at shade 0.
pub fn render_line<MemoryT: VideoMemory>(
    registers: &Registers,
    memory: &MemoryT,
    ly: u8,
    line: &mut [u8],
) {
    if !registers.lcdc().bg_enable() {
        line.fill(0);
        return;
    }

    let palette = registers.bgp();
    let bg_y = registers.scy().wrapping_add(ly);
    let mut fetcher = MapRowFetcher::new(
        memory,
        registers.bg_tile_map(),
        registers.tile_addressing(),
        bg_y as u32,
    );
    for (screen_x, pixel) in line.iter_mut().enumerate() {
        let bg_x = registers.scx().wrapping_add(screen_x as u8);
        *pixel = palette.apply(fetcher.pixel(bg_x as u32));
    }
}
