//! Implementation of VRAM containing tile data and tile maps.
//!
//! ```text
//! $8000-$87FF  tiles 0..=127 (unsigned)
//! $8800-$8FFF  tiles 128..=255 (unsigned) / -128..=-1 (signed)
//! $9000-$97FF  tiles 0..=127 (signed)
//! $9800-$9BFF  tile map 0 (32x32)
//! $9C00-$9FFF  tile map 1 (32x32)
//! ```
use std::fmt::Write;

use super::tile::Tile;
use super::tile::TileData;
use super::tile::TILE_BYTES;
use crate::common::address::vram_offset;
use crate::common::address::TILE_DATA_SIGNED_BASE;
use crate::common::address::TILE_DATA_UNSIGNED_BASE;
use crate::common::address::TILE_MAP_0_START;
use crate::common::address::TILE_MAP_1_START;
use crate::common::address::VRAM_SIZE;
use crate::common::address::VRAM_START;

pub const TILE_MAP_WIDTH: usize = 32;
pub const TILE_MAP_HEIGHT: usize = 32;
pub const TILE_MAP_SIZE: usize = TILE_MAP_WIDTH * TILE_MAP_HEIGHT;

/// Screen size in whole tiles.
pub const SCREEN_TILES_WIDTH: usize = 20;
pub const SCREEN_TILES_HEIGHT: usize = 18;

/// Size of the tile data region ($8000-$97FF).
const PATTERN_REGION_SIZE: usize = 0x1800;

/// Selects how a tile index from a tile map is turned into a tile data address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum TileAddressing {
    /// $8000 method: tile 0 at $8000, indices 0..=255 ascend.
    #[default]
    Unsigned,
    /// $8800 method: tile 0 at $9000, the index is an i8.
    Signed,
}

/// One of the two 32x32 tile maps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum TileMap {
    /// $9800-$9BFF
    #[default]
    Map0,
    /// $9C00-$9FFF
    Map1,
}

impl TileMap {
    pub fn base_address(self) -> u16 {
        match self {
            TileMap::Map0 => TILE_MAP_0_START,
            TileMap::Map1 => TILE_MAP_1_START,
        }
    }
}

/// Address of the first byte of tile `index`.
pub fn tile_address(index: u8, addressing: TileAddressing) -> u16 {
    match addressing {
        TileAddressing::Unsigned => TILE_DATA_UNSIGNED_BASE + index as u16 * TILE_BYTES,
        TileAddressing::Signed => {
            TILE_DATA_SIGNED_BASE.wrapping_add_signed(index as i8 as i16 * TILE_BYTES as i16)
        }
    }
}

/// Address of the tile map entry at (x, y). None if outside the 32x32 map.
pub fn tile_map_address(x: usize, y: usize, map: TileMap) -> Option<u16> {
    if x >= TILE_MAP_WIDTH || y >= TILE_MAP_HEIGHT {
        return None;
    }
    Some(map.base_address() + (y * TILE_MAP_WIDTH + x) as u16)
}

pub struct Vram {
    memory: Vec<u8>,
}

impl Vram {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            memory: vec![0; VRAM_SIZE],
        }
    }

    /// Reads the byte at hardware address `addr`. Addresses outside VRAM read as $FF.
    pub fn read(&self, addr: u16) -> u8 {
        match vram_offset(addr) {
            Some(offset) => self.memory[offset],
            None => 0xFF,
        }
    }

    /// Writes the byte at hardware address `addr`. Addresses outside VRAM are ignored.
    pub fn write(&mut self, addr: u16, value: u8) {
        if let Some(offset) = vram_offset(addr) {
            self.memory[offset] = value;
        }
    }

    /// Little-endian word read.
    pub fn read_word(&self, addr: u16) -> u16 {
        u16::from_le_bytes([self.read(addr), self.read(addr.wrapping_add(1))])
    }

    pub fn write_word(&mut self, addr: u16, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.write(addr, low);
        self.write(addr.wrapping_add(1), high);
    }

    pub fn clear(&mut self, value: u8) {
        self.memory.fill(value);
    }

    pub fn tile_data(&self, index: u8, addressing: TileAddressing) -> TileData {
        let base = tile_address(index, addressing);
        let mut data = [0; 16];
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.read(base + i as u16);
        }
        data
    }

    pub fn set_tile_data(&mut self, index: u8, addressing: TileAddressing, data: &TileData) {
        let base = tile_address(index, addressing);
        for (i, byte) in data.iter().enumerate() {
            self.write(base + i as u16, *byte);
        }
    }

    pub fn tile(&self, index: u8, addressing: TileAddressing) -> Tile {
        Tile::decode(&self.tile_data(index, addressing))
    }

    pub fn set_tile(&mut self, index: u8, addressing: TileAddressing, tile: &Tile) {
        self.set_tile_data(index, addressing, &tile.encode());
    }

    /// Stores consecutive tiles starting at `start`. The index wraps after 255.
    pub fn load_tiles(&mut self, start: u8, addressing: TileAddressing, tiles: &[TileData]) {
        for (i, data) in tiles.iter().enumerate() {
            self.set_tile_data(start.wrapping_add(i as u8), addressing, data);
        }
    }

    /// Tile index stored in `map` at (x, y). Coordinates outside the map read as tile 0.
    pub fn tile_index(&self, x: usize, y: usize, map: TileMap) -> u8 {
        match tile_map_address(x, y, map) {
            Some(addr) => self.read(addr),
            None => 0,
        }
    }

    pub fn set_tile_index(&mut self, x: usize, y: usize, map: TileMap, index: u8) {
        if let Some(addr) = tile_map_address(x, y, map) {
            self.write(addr, index);
        }
    }

    pub fn tile_index_linear(&self, position: usize, map: TileMap) -> u8 {
        if position >= TILE_MAP_SIZE {
            return 0;
        }
        self.tile_index(position % TILE_MAP_WIDTH, position / TILE_MAP_WIDTH, map)
    }

    pub fn set_tile_index_linear(&mut self, position: usize, map: TileMap, index: u8) {
        if position < TILE_MAP_SIZE {
            self.set_tile_index(position % TILE_MAP_WIDTH, position / TILE_MAP_WIDTH, map, index);
        }
    }

    pub fn fill_map(&mut self, map: TileMap, index: u8) {
        let start = map.base_address() - VRAM_START;
        let range = start as usize..start as usize + TILE_MAP_SIZE;
        self.memory[range].fill(index);
    }

    /// Copies `data` into `map` row by row. Anything past 1024 entries is dropped.
    pub fn load_map_data(&mut self, map: TileMap, data: &[u8]) {
        for (position, index) in data.iter().take(TILE_MAP_SIZE).enumerate() {
            self.set_tile_index_linear(position, map, *index);
        }
    }

    pub fn map_data(&self, map: TileMap) -> Vec<u8> {
        (0..TILE_MAP_SIZE)
            .map(|position| self.tile_index_linear(position, map))
            .collect()
    }

    /// Tile indices of the 20x18 tiles visible with the given scroll, wrapping around the map.
    pub fn visible_region(
        &self,
        map: TileMap,
        scroll_x: u8,
        scroll_y: u8,
    ) -> [[u8; SCREEN_TILES_WIDTH]; SCREEN_TILES_HEIGHT] {
        let start_x = scroll_x as usize / 8;
        let start_y = scroll_y as usize / 8;
        let mut region = [[0; SCREEN_TILES_WIDTH]; SCREEN_TILES_HEIGHT];
        for (y, row) in region.iter_mut().enumerate() {
            for (x, index) in row.iter_mut().enumerate() {
                *index = self.tile_index(
                    (start_x + x) % TILE_MAP_WIDTH,
                    (start_y + y) % TILE_MAP_HEIGHT,
                    map,
                );
            }
        }
        region
    }

    /// All (x, y) map positions referencing tile `index`.
    pub fn find_tile_usage(&self, map: TileMap, index: u8) -> Vec<(usize, usize)> {
        let mut positions = Vec::new();
        for y in 0..TILE_MAP_HEIGHT {
            for x in 0..TILE_MAP_WIDTH {
                if self.tile_index(x, y, map) == index {
                    positions.push((x, y));
                }
            }
        }
        positions
    }

    pub fn stats(&self) -> VramStats {
        let (pattern, maps) = self.memory.split_at(PATTERN_REGION_SIZE);
        VramStats {
            total_size: self.memory.len(),
            pattern_bytes_used: pattern.iter().filter(|b| **b != 0).count(),
            map_bytes_used: maps.iter().filter(|b| **b != 0).count(),
        }
    }

    /// Hex dump of the top-left `rows` x `cols` entries of a map.
    pub fn dump_map(&self, map: TileMap, rows: usize, cols: usize) -> String {
        let rows = rows.min(TILE_MAP_HEIGHT);
        let cols = cols.min(TILE_MAP_WIDTH);
        let mut dump = format!("{} ({}x{}):\n", map, cols, rows);
        for y in 0..rows {
            for x in 0..cols {
                // Writing into a String cannot fail.
                let _ = write!(dump, "{:02X} ", self.tile_index(x, y, map));
            }
            dump.push('\n');
        }
        dump
    }
}

/// Usage counts of non-zero bytes, split by region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VramStats {
    pub total_size: usize,
    pub pattern_bytes_used: usize,
    pub map_bytes_used: usize,
}

impl VramStats {
    pub fn percent_used(&self) -> f64 {
        (self.pattern_bytes_used + self.map_bytes_used) as f64 / self.total_size as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ppu::tile::TestPattern;

    #[test]
    fn test_out_of_range_access() {
        let mut vram = Vram::new();
        vram.write(0x7FFF, 0x12);
        vram.write(0xA000, 0x34);
        assert_eq!(vram.read(0x7FFF), 0xFF);
        assert_eq!(vram.read(0xA000), 0xFF);
        assert_eq!(vram.stats().pattern_bytes_used, 0);
        assert_eq!(vram.stats().map_bytes_used, 0);

        vram.write(0x9FFF, 0x56);
        assert_eq!(vram.read(0x9FFF), 0x56);
    }

    #[test]
    fn test_tile_address_modes() {
        assert_eq!(tile_address(0, TileAddressing::Unsigned), 0x8000);
        assert_eq!(tile_address(1, TileAddressing::Unsigned), 0x8010);
        assert_eq!(tile_address(255, TileAddressing::Unsigned), 0x8FF0);
        assert_eq!(tile_address(0, TileAddressing::Signed), 0x9000);
        assert_eq!(tile_address(127, TileAddressing::Signed), 0x97F0);
        assert_eq!(tile_address(128, TileAddressing::Signed), 0x8800);
        assert_eq!(tile_address(255, TileAddressing::Signed), 0x8FF0);
    }

    #[test]
    fn test_signed_and_unsigned_tables_alias() {
        let mut vram = Vram::new();
        let tile = Tile::test_pattern(TestPattern::Checkerboard);
        vram.set_tile(200, TileAddressing::Unsigned, &tile);
        assert_eq!(vram.tile(200, TileAddressing::Signed), tile);
        // Tile 0 differs between the two modes.
        vram.set_tile(0, TileAddressing::Signed, &tile);
        assert!(vram.tile(0, TileAddressing::Unsigned).is_empty());
    }

    #[test]
    fn test_tile_map_address() {
        assert_eq!(tile_map_address(0, 0, TileMap::Map0), Some(0x9800));
        assert_eq!(tile_map_address(31, 31, TileMap::Map0), Some(0x9BFF));
        assert_eq!(tile_map_address(1, 2, TileMap::Map1), Some(0x9C41));
        assert_eq!(tile_map_address(32, 0, TileMap::Map0), None);
        assert_eq!(tile_map_address(0, 32, TileMap::Map1), None);
    }

    #[test]
    fn test_tile_index_out_of_range_is_zero() {
        let mut vram = Vram::new();
        vram.fill_map(TileMap::Map0, 7);
        assert_eq!(vram.tile_index(31, 31, TileMap::Map0), 7);
        assert_eq!(vram.tile_index(32, 0, TileMap::Map0), 0);
        assert_eq!(vram.tile_index(0, 0, TileMap::Map1), 0);
    }

    #[test]
    fn test_map_data() {
        let mut vram = Vram::new();
        let data: Vec<u8> = (0..2000).map(|i| (i % 256) as u8).collect();
        vram.load_map_data(TileMap::Map1, &data);
        assert_eq!(vram.map_data(TileMap::Map1), data[..TILE_MAP_SIZE].to_vec());
        assert_eq!(vram.tile_index(1, 1, TileMap::Map1), 33);
        // Map 0 is untouched
        assert!(vram.map_data(TileMap::Map0).iter().all(|i| *i == 0));
    }

    #[test]
    fn test_visible_region_wraps() {
        let mut vram = Vram::new();
        for y in 0..32 {
            for x in 0..32 {
                vram.set_tile_index(x, y, TileMap::Map0, (y * 32 + x) as u8);
            }
        }
        let region = vram.visible_region(TileMap::Map0, 248, 0);
        assert_eq!(region[0][0], 31);
        assert_eq!(region[0][1], 0);
        let region = vram.visible_region(TileMap::Map0, 0, 248);
        assert_eq!(region[0][0], (31 * 32) as u8);
        assert_eq!(region[1][0], 0);
    }

    #[test]
    fn test_find_tile_usage_and_stats() {
        let mut vram = Vram::new();
        vram.set_tile_index(3, 4, TileMap::Map0, 9);
        vram.set_tile_index(5, 0, TileMap::Map0, 9);
        assert_eq!(
            vram.find_tile_usage(TileMap::Map0, 9),
            vec![(5, 0), (3, 4)]
        );
        vram.set_tile(1, TileAddressing::Unsigned, &Tile::test_pattern(TestPattern::Solid3));
        let stats = vram.stats();
        assert_eq!(stats.pattern_bytes_used, 16);
        assert_eq!(stats.map_bytes_used, 2);
        assert_eq!(stats.total_size, 0x2000);
        assert!((stats.percent_used() - 18.0 * 100.0 / 8192.0).abs() < 1e-9);

        vram.clear(0);
        assert_eq!(vram.stats().percent_used(), 0.0);
        vram.clear(0xFF);
        assert_eq!(vram.stats().percent_used(), 100.0);
    }

    #[test]
    fn test_words_and_clear() {
        let mut vram = Vram::new();
        vram.write_word(0x8000, 0xBEEF);
        assert_eq!(vram.read(0x8000), 0xEF);
        assert_eq!(vram.read(0x8001), 0xBE);
        assert_eq!(vram.read_word(0x8000), 0xBEEF);
        vram.clear(0x11);
        assert_eq!(vram.read_word(0x9FFE), 0x1111);
    }

    #[test]
    fn test_dump_map() {
        let mut vram = Vram::new();
        vram.set_tile_index(1, 0, TileMap::Map0, 0xAB);
        assert_eq!(vram.dump_map(TileMap::Map0, 2, 2), "Map0 (2x2):\n00 AB \n00 00 \n");
    }
}
