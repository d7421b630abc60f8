//! Decoding of bus addresses into the regions owned by the PPU.
//!
//! All range checks on hardware addresses go through this module so the boundaries are defined
//! in exactly one place.
use std::fmt::Display;
use std::fmt::Formatter;

pub const VRAM_START: u16 = 0x8000;
pub const VRAM_END: u16 = 0x9FFF;
pub const VRAM_SIZE: usize = 0x2000;

pub const OAM_START: u16 = 0xFE00;
pub const OAM_END: u16 = 0xFE9F;
pub const OAM_SIZE: usize = 0xA0;

/// Base address of the unsigned ($8000) tile addressing mode.
pub const TILE_DATA_UNSIGNED_BASE: u16 = 0x8000;
/// Tile 0 of the signed ($8800) tile addressing mode.
pub const TILE_DATA_SIGNED_BASE: u16 = 0x9000;

pub const TILE_MAP_0_START: u16 = 0x9800;
pub const TILE_MAP_1_START: u16 = 0x9C00;

/// The memory mapped PPU registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum PpuRegister {
    Lcdc,
    Stat,
    Scy,
    Scx,
    Ly,
    Lyc,
    Bgp,
    Obp0,
    Obp1,
    Wy,
    Wx,
}

impl PpuRegister {
    pub const ALL: [PpuRegister; 11] = [
        PpuRegister::Lcdc,
        PpuRegister::Stat,
        PpuRegister::Scy,
        PpuRegister::Scx,
        PpuRegister::Ly,
        PpuRegister::Lyc,
        PpuRegister::Bgp,
        PpuRegister::Obp0,
        PpuRegister::Obp1,
        PpuRegister::Wy,
        PpuRegister::Wx,
    ];

    pub fn address(self) -> u16 {
        match self {
            PpuRegister::Lcdc => 0xFF40,
            PpuRegister::Stat => 0xFF41,
            PpuRegister::Scy => 0xFF42,
            PpuRegister::Scx => 0xFF43,
            PpuRegister::Ly => 0xFF44,
            PpuRegister::Lyc => 0xFF45,
            PpuRegister::Bgp => 0xFF47,
            PpuRegister::Obp0 => 0xFF48,
            PpuRegister::Obp1 => 0xFF49,
            PpuRegister::Wy => 0xFF4A,
            PpuRegister::Wx => 0xFF4B,
        }
    }

    /// Returns None for FF46 (OAM DMA, not owned by the PPU) and anything outside FF40-FF4B.
    pub fn from_address(addr: u16) -> Option<Self> {
        match addr {
            0xFF40 => Some(PpuRegister::Lcdc),
            0xFF41 => Some(PpuRegister::Stat),
            0xFF42 => Some(PpuRegister::Scy),
            0xFF43 => Some(PpuRegister::Scx),
            0xFF44 => Some(PpuRegister::Ly),
            0xFF45 => Some(PpuRegister::Lyc),
            0xFF47 => Some(PpuRegister::Bgp),
            0xFF48 => Some(PpuRegister::Obp0),
            0xFF49 => Some(PpuRegister::Obp1),
            0xFF4A => Some(PpuRegister::Wy),
            0xFF4B => Some(PpuRegister::Wx),
            _ => None,
        }
    }
}

/// A bus address decoded into the PPU region it belongs to.
///
/// VRAM and OAM variants carry the offset relative to the start of the region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryRegion {
    Vram(u16),
    Oam(u16),
    Register(PpuRegister),
    Unmapped(u16),
}

impl MemoryRegion {
    pub fn decode(addr: u16) -> Self {
        match addr {
            VRAM_START..=VRAM_END => MemoryRegion::Vram(addr - VRAM_START),
            OAM_START..=OAM_END => MemoryRegion::Oam(addr - OAM_START),
            _ => match PpuRegister::from_address(addr) {
                Some(register) => MemoryRegion::Register(register),
                None => MemoryRegion::Unmapped(addr),
            },
        }
    }
}

impl Display for MemoryRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MemoryRegion::Vram(offset) => write!(f, "VRAM+{:04X}", offset),
            MemoryRegion::Oam(offset) => write!(f, "OAM+{:02X}", offset),
            MemoryRegion::Register(register) => {
                write!(f, "{} (${:04X})", register, register.address())
            }
            MemoryRegion::Unmapped(addr) => write!(f, "${:04X}", addr),
        }
    }
}

/// Offset into VRAM for a hardware address, None if outside $8000-$9FFF.
pub fn vram_offset(addr: u16) -> Option<usize> {
    match MemoryRegion::decode(addr) {
        MemoryRegion::Vram(offset) => Some(offset as usize),
        _ => None,
    }
}

/// Offset into OAM for a hardware address, None if outside $FE00-$FE9F.
pub fn oam_offset(addr: u16) -> Option<usize> {
    match MemoryRegion::decode(addr) {
        MemoryRegion::Oam(offset) => Some(offset as usize),
        _ => None,
    }
}
