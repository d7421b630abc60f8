//! Register state of the PPU and the write policies applied to external writes.
use bilge::prelude::*;

use super::palette::Palette;
use super::vram::TileAddressing;
use super::vram::TileMap;
use crate::common::address::PpuRegister;

/// Register FF40: LCDC - LCD control
/// 7  bit  0
/// ---- ----
/// LWwB AOSb
/// |||| ||||
/// |||| |||+- BG and window enable
/// |||| ||+-- Sprite enable
/// |||| |+--- Sprite size (0 = 8x8, 1 = 8x16)
/// |||| +---- BG tile map (0 = $9800, 1 = $9C00)
/// |||+------ BG and window tile data (0 = $8800 signed, 1 = $8000 unsigned)
/// ||+------- Window enable
/// |+-------- Window tile map (0 = $9800, 1 = $9C00)
/// +--------- LCD enable
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Lcdc {
    pub bg_enable: bool,
    pub sprite_enable: bool,
    pub tall_sprites: bool,
    pub bg_tile_map: bool,
    pub unsigned_tile_data: bool,
    pub window_enable: bool,
    pub window_tile_map: bool,
    pub lcd_enable: bool,
}

/// Register FF41: STAT - LCD status
/// 7  bit  0
/// ---- ----
/// xLOV HCMM
///  ||| ||||
///  ||| ||++- Mode (read-only)
///  ||| |+--- LYC == LY (read-only)
///  ||| +---- H-Blank interrupt enable
///  ||+------ V-Blank interrupt enable
///  |+------- OAM scan interrupt enable
///  +-------- LYC interrupt enable
#[bitsize(8)]
#[derive(Clone, Copy, DebugBits, FromBits, PartialEq)]
pub struct Stat {
    pub mode: u2,
    pub lyc_match: bool,
    pub hblank_interrupt: bool,
    pub vblank_interrupt: bool,
    pub oam_interrupt: bool,
    pub lyc_interrupt: bool,
    pub unused: bool,
}

/// Bits of STAT that can be changed by external writes.
const STAT_WRITABLE_MASK: u8 = 0x78;

/// Power-on value of LCDC: LCD, BG and $8000 tile data enabled.
pub const LCDC_POWER_ON: u8 = 0x91;
/// Power-on value of all three palettes (identity mapping).
pub const PALETTE_POWER_ON: u8 = 0xE4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum PpuMode {
    #[default]
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Drawing = 3,
}

impl From<u2> for PpuMode {
    fn from(value: u2) -> Self {
        match value.value() {
            0 => PpuMode::HBlank,
            1 => PpuMode::VBlank,
            2 => PpuMode::OamScan,
            _ => PpuMode::Drawing,
        }
    }
}

/// All memory mapped PPU registers.
///
/// Fields are private so LY and the read-only STAT bits can only be changed through the
/// methods used by the PPU timing logic.
#[derive(Clone, Debug, PartialEq)]
pub struct Registers {
    lcdc: Lcdc,
    stat: Stat,
    scy: u8,
    scx: u8,
    ly: u8,
    lyc: u8,
    bgp: Palette,
    obp0: Palette,
    obp1: Palette,
    wy: u8,
    wx: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self {
            lcdc: Lcdc::from(LCDC_POWER_ON),
            stat: Stat::from(0_u8),
            scy: 0,
            scx: 0,
            ly: 0,
            lyc: 0,
            bgp: Palette(PALETTE_POWER_ON),
            obp0: Palette(PALETTE_POWER_ON),
            obp1: Palette(PALETTE_POWER_ON),
            wy: 0,
            wx: 0,
        }
    }
}

impl Registers {
    pub fn read(&self, register: PpuRegister) -> u8 {
        match register {
            PpuRegister::Lcdc => u8::from(self.lcdc),
            PpuRegister::Stat => u8::from(self.stat),
            PpuRegister::Scy => self.scy,
            PpuRegister::Scx => self.scx,
            PpuRegister::Ly => self.ly,
            PpuRegister::Lyc => self.lyc,
            PpuRegister::Bgp => self.bgp.0,
            PpuRegister::Obp0 => self.obp0.0,
            PpuRegister::Obp1 => self.obp1.0,
            PpuRegister::Wy => self.wy,
            PpuRegister::Wx => self.wx,
        }
    }

    /// Applies an external write. Returns false if the register ignores external writes (LY).
    ///
    /// Only bits 3-6 of STAT are taken from `value`, the mode and LYC flag are preserved.
    pub fn write(&mut self, register: PpuRegister, value: u8) -> bool {
        match register {
            PpuRegister::Lcdc => self.lcdc = Lcdc::from(value),
            PpuRegister::Stat => {
                let preserved = u8::from(self.stat) & 0x07;
                self.stat = Stat::from((value & STAT_WRITABLE_MASK) | preserved);
            }
            PpuRegister::Scy => self.scy = value,
            PpuRegister::Scx => self.scx = value,
            PpuRegister::Ly => return false,
            PpuRegister::Lyc => self.lyc = value,
            PpuRegister::Bgp => self.bgp = Palette(value),
            PpuRegister::Obp0 => self.obp0 = Palette(value),
            PpuRegister::Obp1 => self.obp1 = Palette(value),
            PpuRegister::Wy => self.wy = value,
            PpuRegister::Wx => self.wx = value,
        }
        true
    }

    pub fn lcdc(&self) -> Lcdc {
        self.lcdc
    }

    pub fn stat(&self) -> Stat {
        self.stat
    }

    pub fn scx(&self) -> u8 {
        self.scx
    }

    pub fn scy(&self) -> u8 {
        self.scy
    }

    pub fn ly(&self) -> u8 {
        self.ly
    }

    pub fn lyc(&self) -> u8 {
        self.lyc
    }

    pub fn wx(&self) -> u8 {
        self.wx
    }

    pub fn wy(&self) -> u8 {
        self.wy
    }

    pub fn bgp(&self) -> Palette {
        self.bgp
    }

    pub fn obp0(&self) -> Palette {
        self.obp0
    }

    pub fn obp1(&self) -> Palette {
        self.obp1
    }

    /// OBP1 if `palette_1` is set, OBP0 otherwise.
    pub fn sprite_palette(&self, palette_1: bool) -> Palette {
        if palette_1 {
            self.obp1
        } else {
            self.obp0
        }
    }

    pub fn mode(&self) -> PpuMode {
        PpuMode::from(self.stat.mode())
    }

    pub fn tile_addressing(&self) -> TileAddressing {
        if self.lcdc.unsigned_tile_data() {
            TileAddressing::Unsigned
        } else {
            TileAddressing::Signed
        }
    }

    pub fn bg_tile_map(&self) -> TileMap {
        if self.lcdc.bg_tile_map() {
            TileMap::Map1
        } else {
            TileMap::Map0
        }
    }

    pub fn window_tile_map(&self) -> TileMap {
        if self.lcdc.window_tile_map() {
            TileMap::Map1
        } else {
            TileMap::Map0
        }
    }

    /// 8 or 16 pixels depending on LCDC bit 2.
    pub fn sprite_height(&self) -> u32 {
        if self.lcdc.tall_sprites() {
            16
        } else {
            8
        }
    }

    pub(crate) fn set_ly(&mut self, ly: u8) {
        self.ly = ly;
    }

    pub(crate) fn set_mode(&mut self, mode: PpuMode) {
        self.stat.set_mode(u2::new(mode as u8));
    }

    /// Updates the STAT LYC flag from LY and LYC.
    ///
    /// Returns true if LY matches LYC and the LYC interrupt is enabled.
    pub(crate) fn compare_lyc(&mut self) -> bool {
        let matches = self.ly == self.lyc;
        self.stat.set_lyc_match(matches);
        matches && self.stat.lyc_interrupt()
    }

    /// True if the STAT interrupt source for the current mode is enabled. Drawing has none.
    pub fn mode_interrupt_enabled(&self) -> bool {
        match self.mode() {
            PpuMode::HBlank => self.stat.hblank_interrupt(),
            PpuMode::VBlank => self.stat.vblank_interrupt(),
            PpuMode::OamScan => self.stat.oam_interrupt(),
            PpuMode::Drawing => false,
        }
    }
}
