//! Demo scenes that program the PPU the way a game would, through its bus interface.
use dmg_ppu::common::address::PpuRegister;
use dmg_ppu::common::address::OAM_START;
use dmg_ppu::common::address::TILE_DATA_UNSIGNED_BASE;
use dmg_ppu::common::address::TILE_MAP_0_START;
use dmg_ppu::common::address::TILE_MAP_1_START;
use dmg_ppu::ppu::tile::TestPattern;
use dmg_ppu::ppu::tile::Tile;
use dmg_ppu::ppu::tile::TILE_BYTES;
use dmg_ppu::ppu::vram::TILE_MAP_HEIGHT;
use dmg_ppu::ppu::vram::TILE_MAP_WIDTH;
use dmg_ppu::Framebuffer;
use dmg_ppu::Ppu;
use dmg_ppu::VideoRam;

use crate::display::checkerboard_frame;
use crate::display::solid_frame;

const CHECKER_TILE: u8 = 1;
const GRADIENT_TILE: u8 = 2;
const BORDER_TILE: u8 = 3;
const SPRITE_TILE: u8 = 4;

const SPRITE_COUNT: u8 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Scene {
    /// Four solid shades followed by a checkerboard, bypassing the PPU.
    Patterns,
    /// Tiled background scrolling diagonally.
    #[default]
    Scroll,
    /// Window sliding in from the right over a static background.
    Window,
    /// A row of sprites moving across a blank background.
    Sprites,
}

impl Scene {
    pub const ALL: [Scene; 4] = [Scene::Patterns, Scene::Scroll, Scene::Window, Scene::Sprites];

    fn setup(self, ppu: &mut Ppu<VideoRam>) {
        if self == Scene::Patterns {
            return;
        }
        write_tile(ppu, CHECKER_TILE, &Tile::test_pattern(TestPattern::Checkerboard));
        write_tile(ppu, GRADIENT_TILE, &Tile::test_pattern(TestPattern::Gradient));
        write_tile(ppu, BORDER_TILE, &Tile::test_pattern(TestPattern::Border));
        write_tile(
            ppu,
            SPRITE_TILE,
            &Tile::from_pattern(
                &[
                    "  ####  ",
                    " #oooo# ",
                    "#o.oo.o#",
                    "#oooooo#",
                    "#o.oo.o#",
                    "#oo..oo#",
                    " #oooo# ",
                    "  ####  ",
                ]
                .concat(),
            ),
        );
        ppu.bus_write(PpuRegister::Bgp.address(), 0xE4);
        ppu.bus_write(PpuRegister::Obp0.address(), 0xE4);
        ppu.bus_write(PpuRegister::Obp1.address(), 0xD2);

        match self {
            Scene::Patterns => {}
            Scene::Scroll => {
                fill_map_diagonal(ppu, TILE_MAP_0_START);
                ppu.bus_write(PpuRegister::Lcdc.address(), 0x91);
            }
            Scene::Window => {
                fill_map_diagonal(ppu, TILE_MAP_0_START);
                for offset in 0..(TILE_MAP_WIDTH * TILE_MAP_HEIGHT) as u16 {
                    ppu.bus_write(TILE_MAP_1_START + offset, BORDER_TILE);
                }
                ppu.bus_write(PpuRegister::Wy.address(), 40);
                ppu.bus_write(PpuRegister::Lcdc.address(), 0xF1);
            }
            Scene::Sprites => {
                ppu.bus_write(PpuRegister::Lcdc.address(), 0x93);
            }
        }
    }

    /// Moves scroll, window or sprites into their position for `frame`.
    fn update(self, ppu: &mut Ppu<VideoRam>, frame: u32) {
        match self {
            Scene::Patterns => {}
            Scene::Scroll => {
                ppu.bus_write(PpuRegister::Scx.address(), frame as u8);
                ppu.bus_write(PpuRegister::Scy.address(), (frame / 2) as u8);
            }
            Scene::Window => {
                let wx = 166 - (frame * 2) % 160;
                ppu.bus_write(PpuRegister::Wx.address(), wx as u8);
            }
            Scene::Sprites => {
                for slot in 0..SPRITE_COUNT {
                    let x = 8 + (slot as u32 * 16 + frame) % 168;
                    let flags = if slot % 2 == 1 { 0x30 } else { 0x00 };
                    let base = OAM_START + slot as u16 * 4;
                    for (offset, byte) in [80, x as u8, SPRITE_TILE, flags].iter().enumerate() {
                        ppu.bus_write(base + offset as u16, *byte);
                    }
                }
            }
        }
    }
}

/// Drives a PPU through a scene one frame at a time.
pub struct SceneRunner {
    scene: Scene,
    ppu: Ppu<VideoRam>,
    frame: u32,
}

impl SceneRunner {
    pub fn new(scene: Scene) -> Self {
        let mut ppu = Ppu::new(VideoRam::new());
        scene.setup(&mut ppu);
        log::debug!("Scene {scene}:\n{}", ppu.debug().register_dump());
        Self {
            scene,
            ppu,
            frame: 0,
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn ppu(&self) -> &Ppu<VideoRam> {
        &self.ppu
    }

    /// Number of frames produced so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn next_frame(&mut self) -> Framebuffer {
        let frame = self.frame;
        self.frame += 1;
        if self.scene == Scene::Patterns {
            return match frame % 5 {
                shade @ 0..=3 => solid_frame(shade as u8),
                _ => checkerboard_frame(),
            };
        }
        self.scene.update(&mut self.ppu, frame);
        self.ppu.run_frame();
        if self.ppu.consume_vblank_interrupt() {
            log::trace!("V-Blank after frame {frame}");
        }
        self.ppu.snapshot()
    }
}

fn write_tile(ppu: &mut Ppu<VideoRam>, index: u8, tile: &Tile) {
    let base = TILE_DATA_UNSIGNED_BASE + index as u16 * TILE_BYTES;
    for (offset, byte) in tile.encode().iter().enumerate() {
        ppu.bus_write(base + offset as u16, *byte);
    }
}

/// Cycles the three background tiles along the map diagonals.
fn fill_map_diagonal(ppu: &mut Ppu<VideoRam>, base: u16) {
    for y in 0..TILE_MAP_HEIGHT {
        for x in 0..TILE_MAP_WIDTH {
            let index = CHECKER_TILE + ((x + y) % 3) as u8;
            ppu.bus_write(base + (y * TILE_MAP_WIDTH + x) as u16, index);
        }
    }
}
