//! Presentation frontends for the DMG PPU.
//!
//! The viewer plays the part of the timing driver: it programs a [`dmg_ppu::Ppu`] with one of
//! the demo [`scene::Scene`]s, runs it a frame at a time and hands each finished framebuffer to
//! a [`display::Display`] backend.
pub mod display;
pub mod scene;
pub mod util;
