//! Interface between the PPU and the memory holding tile, map and sprite data.
use super::oam::Oam;
use super::tile::Tile;
use super::tile::TileRow;
use super::vram::tile_address;
use super::vram::tile_map_address;
use super::vram::TileAddressing;
use super::vram::TileMap;
use super::vram::Vram;

/// Byte access to VRAM ($8000-$9FFF) and OAM ($FE00-$FE9F) using hardware addresses.
///
/// Implementations must be total: reads outside a region return $FF and writes outside a region
/// are ignored. The provided methods build every tile lookup used by the renderers on top of
/// the four byte accessors.
pub trait VideoMemory {
    fn read_vram(&self, addr: u16) -> u8;
    fn write_vram(&mut self, addr: u16, value: u8);
    fn read_oam(&self, addr: u16) -> u8;
    fn write_oam(&mut self, addr: u16, value: u8);

    /// Row `row` (0..8) of the tile starting at `tile_addr`.
    fn tile_row(&self, tile_addr: u16, row: u32) -> TileRow {
        let row_addr = tile_addr.wrapping_add((row as u16 & 7) * 2);
        TileRow::new(
            self.read_vram(row_addr),
            self.read_vram(row_addr.wrapping_add(1)),
        )
    }

    fn tile(&self, index: u8, addressing: TileAddressing) -> Tile {
        let base = tile_address(index, addressing);
        let mut data = [0; 16];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.read_vram(base + i as u16);
        }
        Tile::decode(&data)
    }

    /// Tile index at map position (x, y), 0 for positions outside the 32x32 map.
    fn tile_index(&self, map_x: usize, map_y: usize, map: TileMap) -> u8 {
        match tile_map_address(map_x, map_y, map) {
            Some(addr) => self.read_vram(addr),
            None => 0,
        }
    }

    /// Decoded tile at logical map position (x, y).
    fn tile_from_map(
        &self,
        map_x: usize,
        map_y: usize,
        map: TileMap,
        addressing: TileAddressing,
    ) -> Tile {
        self.tile(self.tile_index(map_x, map_y, map), addressing)
    }
}

/// The default video memory: 8 KiB of VRAM and 160 bytes of OAM.
pub struct VideoRam {
    pub vram: Vram,
    pub oam: Oam,
}

impl VideoRam {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            vram: Vram::new(),
            oam: Oam::new(),
        }
    }
}

impl VideoMemory for VideoRam {
    fn read_vram(&self, addr: u16) -> u8 {
        self.vram.read(addr)
    }

    fn write_vram(&mut self, addr: u16, value: u8) {
        self.vram.write(addr, value)
    }

    fn read_oam(&self, addr: u16) -> u8 {
        self.oam.read(addr)
    }

    fn write_oam(&mut self, addr: u16, value: u8) {
        self.oam.write(addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::tile::TestPattern;

    #[test]
    fn test_routes_to_regions() {
        let mut memory = VideoRam::new();
        memory.write_vram(0x8000, 1);
        memory.write_oam(0xFE00, 2);
        // Each family only reaches its own region.
        memory.write_vram(0xFE01, 3);
        memory.write_oam(0x8001, 4);
        assert_eq!(memory.read_vram(0x8000), 1);
        assert_eq!(memory.read_oam(0xFE00), 2);
        assert_eq!(memory.read_oam(0xFE01), 0);
        assert_eq!(memory.read_vram(0x8001), 0);
        assert_eq!(memory.read_vram(0xFE00), 0xFF);
        assert_eq!(memory.read_oam(0x8000), 0xFF);
    }

    #[test]
    fn test_tile_from_map() {
        let mut memory = VideoRam::new();
        let tile = Tile::test_pattern(TestPattern::Gradient);
        memory.vram.set_tile(0x80, TileAddressing::Unsigned, &tile);
        memory.vram.set_tile_index(4, 5, TileMap::Map1, 0x80);

        assert_eq!(
            memory.tile_from_map(4, 5, TileMap::Map1, TileAddressing::Unsigned),
            tile
        );
        // $8800 addressing resolves index $80 to the same bytes.
        assert_eq!(
            memory.tile_from_map(4, 5, TileMap::Map1, TileAddressing::Signed),
            tile
        );
        assert!(memory
            .tile_from_map(4, 5, TileMap::Map0, TileAddressing::Unsigned)
            .is_empty());
    }

    #[test]
    fn test_tile_row_matches_decoded_tile() {
        let mut memory = VideoRam::new();
        let tile = Tile::test_pattern(TestPattern::Gradient);
        memory.vram.set_tile(3, TileAddressing::Unsigned, &tile);
        let tile_addr = tile_address(3, TileAddressing::Unsigned);
        for y in 0..8 {
            let row = memory.tile_row(tile_addr, y as u32);
            for x in 0..8 {
                assert_eq!(row.pixel(x as u32), tile.pixel(x, y));
            }
        }
    }
}
