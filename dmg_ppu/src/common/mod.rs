//! Types shared by all parts of the PPU and by presentation frontends.

pub mod address;
pub mod image;
pub mod logging;
