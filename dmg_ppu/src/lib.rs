//! Game Boy (DMG) picture processing unit.
//!
//! The [`ppu::Ppu`] owns the PPU registers and the 160x144 framebuffer and renders each visible
//! scanline from tile and sprite data provided by a [`ppu::VideoMemory`] implementation.
pub mod common;
pub mod ppu;

pub use ppu::Framebuffer;
pub use ppu::Ppu;
pub use ppu::VideoMemory;
pub use ppu::VideoRam;
