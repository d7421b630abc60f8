//! Implementation of the Picture Processing Unit
pub mod background;
pub mod debug;
pub mod framebuffer;
pub mod memory;
pub mod oam;
pub mod palette;
pub mod registers;
pub mod sprite;
pub mod tile;
pub mod vram;
pub mod window;

pub use self::debug::PpuDebug;
pub use self::framebuffer::Framebuffer;
pub use self::framebuffer::SCREEN_HEIGHT;
pub use self::framebuffer::SCREEN_WIDTH;
pub use self::memory::VideoMemory;
pub use self::memory::VideoRam;
pub use self::registers::PpuMode;
pub use self::registers::Registers;
use self::sprite::SpriteRenderer;
use self::window::Window;
use crate::common::address::MemoryRegion;
use crate::common::address::PpuRegister;

pub const OAM_SCAN_DOTS: u32 = 80;
pub const DRAWING_DOTS: u32 = 172;
pub const HBLANK_DOTS: u32 = 204;
pub const DOTS_PER_LINE: u32 = OAM_SCAN_DOTS + DRAWING_DOTS + HBLANK_DOTS;
/// Number of lines drawn to the screen. V-Blank starts when LY reaches this value.
pub const VISIBLE_LINES: u8 = SCREEN_HEIGHT as u8;
pub const LINES_PER_FRAME: u8 = 154;
pub const DOTS_PER_FRAME: u32 = DOTS_PER_LINE * LINES_PER_FRAME as u32;
/// Frames per second of the DMG LCD.
pub const REFRESH_RATE: f64 = 59.7275;

/// The DMG picture processing unit.
///
/// Owns the register state and the framebuffer. Tile, map and sprite data are read from the
/// `MemoryT` collaborator, which is handed to the renderers for the duration of each scanline.
///
/// Time is driven from outside, either dot by dot through `advance` or by calling the mode
/// transitions (`enter_oam_scan`, `enter_drawing`, `enter_hblank`, `finish_line`) directly.
/// Each of them returns true if it raised an interrupt condition. Raised interrupts are also
/// latched until consumed by the interrupt controller.
pub struct Ppu<MemoryT: VideoMemory> {
    registers: Registers,
    memory: MemoryT,
    framebuffer: Framebuffer,
    window: Window,
    sprites: SpriteRenderer,
    /// Dots spent in the current mode.
    dots: u32,
    frame_ready: bool,
    vblank_interrupt: bool,
    stat_interrupt: bool,
}

impl<MemoryT: VideoMemory> Ppu<MemoryT> {
    pub fn new(memory: MemoryT) -> Self {
        let mut ppu = Self {
            registers: Registers::default(),
            memory,
            framebuffer: Framebuffer::default(),
            window: Window::new(),
            sprites: SpriteRenderer::new(),
            dots: 0,
            frame_ready: false,
            vblank_interrupt: false,
            stat_interrupt: false,
        };
        ppu.reset();
        ppu
    }

    /// Restores power-on register state and clears the framebuffer. Video memory is kept.
    pub fn reset(&mut self) {
        self.registers = Registers::default();
        self.registers.set_mode(PpuMode::OamScan);
        self.framebuffer = Framebuffer::default();
        self.window.reset();
        self.sprites.scan(&self.memory);
        self.dots = 0;
        self.frame_ready = false;
        self.vblank_interrupt = false;
        self.stat_interrupt = false;
    }

    pub fn memory(&self) -> &MemoryT {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryT {
        &mut self.memory
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Copy of the current framebuffer contents.
    pub fn snapshot(&self) -> Framebuffer {
        self.framebuffer.clone()
    }

    /// Final shade at (x, y), 0 outside the screen.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.framebuffer.pixel(x, y)
    }

    pub fn mode(&self) -> PpuMode {
        self.registers.mode()
    }

    pub fn ly(&self) -> u8 {
        self.registers.ly()
    }

    pub fn debug(&self) -> PpuDebug<'_, MemoryT> {
        PpuDebug(self)
    }

    pub fn bus_read(&self, addr: u16) -> u8 {
        match MemoryRegion::decode(addr) {
            MemoryRegion::Vram(_) => self.memory.read_vram(addr),
            MemoryRegion::Oam(_) => self.memory.read_oam(addr),
            MemoryRegion::Register(register) => self.read_register(register),
            region @ MemoryRegion::Unmapped(_) => {
                log::warn!("PPU: Unhandled read from {}", region);
                0xFF
            }
        }
    }

    pub fn bus_peek(&self, addr: u16) -> Option<u8> {
        match MemoryRegion::decode(addr) {
            MemoryRegion::Vram(_) => Some(self.memory.read_vram(addr)),
            MemoryRegion::Oam(_) => Some(self.memory.read_oam(addr)),
            MemoryRegion::Register(register) => Some(self.read_register(register)),
            MemoryRegion::Unmapped(_) => None,
        }
    }

    pub fn bus_write(&mut self, addr: u16, value: u8) {
        match MemoryRegion::decode(addr) {
            MemoryRegion::Vram(_) => self.memory.write_vram(addr, value),
            MemoryRegion::Oam(_) => self.memory.write_oam(addr, value),
            MemoryRegion::Register(register) => self.write_register(register, value),
            region @ MemoryRegion::Unmapped(_) => {
                log::warn!("PPU: Unhandled write to {} = {:02X}", region, value)
            }
        }
    }

    pub fn read_register(&self, register: PpuRegister) -> u8 {
        self.registers.read(register)
    }

    pub fn write_register(&mut self, register: PpuRegister, value: u8) {
        match register {
            PpuRegister::Lcdc => self.write_lcdc(value),
            PpuRegister::Lyc => {
                self.registers.write(register, value);
                let raised = self.registers.compare_lyc();
                self.latch_stat_interrupt(raised);
            }
            _ => {
                if !self.registers.write(register, value) {
                    log::warn!("PPU: Ignored write to read-only {} = {:02X}", register, value);
                }
            }
        }
    }

    /// Register FF40: LCDC
    ///
    /// Turning the LCD off stops the timing state machine at LY 0 in H-Blank. Turning it back on
    /// restarts from LY 0 in OAM scan. Toggling the window enable bit restarts the window at
    /// its first row.
    fn write_lcdc(&mut self, value: u8) {
        log::info!("LCDC = {:08b}", value);
        let previous = self.registers.lcdc();
        self.registers.write(PpuRegister::Lcdc, value);
        let current = self.registers.lcdc();

        if previous.window_enable() != current.window_enable() {
            self.window.reset();
        }
        match (previous.lcd_enable(), current.lcd_enable()) {
            (true, false) => {
                log::info!("LCD disabled");
                self.registers.set_ly(0);
                self.registers.set_mode(PpuMode::HBlank);
                self.dots = 0;
                self.window.reset();
                let raised = self.registers.compare_lyc();
                self.latch_stat_interrupt(raised);
            }
            (false, true) => {
                log::info!("LCD enabled");
                self.registers.set_ly(0);
                self.registers.set_mode(PpuMode::OamScan);
                self.dots = 0;
                self.sprites.scan(&self.memory);
                let raised = self.registers.compare_lyc();
                self.latch_stat_interrupt(raised);
            }
            _ => (),
        }
    }

    /// Advances the state machine by `dots` dots, performing every mode transition that
    /// falls within them. Does nothing while the LCD is off.
    ///
    /// Returns true if any interrupt condition was raised.
    pub fn advance(&mut self, dots: u32) -> bool {
        if !self.registers.lcdc().lcd_enable() {
            return false;
        }
        let mut raised = false;
        self.dots += dots;
        loop {
            let duration = match self.mode() {
                PpuMode::OamScan => OAM_SCAN_DOTS,
                PpuMode::Drawing => DRAWING_DOTS,
                PpuMode::HBlank => HBLANK_DOTS,
                PpuMode::VBlank => DOTS_PER_LINE,
            };
            if self.dots < duration {
                break;
            }
            self.dots -= duration;
            raised |= match self.mode() {
                PpuMode::OamScan => self.enter_drawing(),
                PpuMode::Drawing => self.enter_hblank(),
                PpuMode::HBlank | PpuMode::VBlank => self.finish_line(),
            };
        }
        raised
    }

    /// Runs until the next V-Blank starts. Returns immediately while the LCD is off.
    pub fn run_frame(&mut self) {
        if !self.registers.lcdc().lcd_enable() {
            return;
        }
        self.frame_ready = false;
        while !self.frame_ready {
            self.advance(DOTS_PER_LINE);
        }
    }

    /// Starts OAM scan for the current line and captures the sprite table.
    pub fn enter_oam_scan(&mut self) -> bool {
        self.sprites.scan(&self.memory);
        self.set_mode(PpuMode::OamScan)
    }

    /// Starts pixel transfer and renders the current line.
    pub fn enter_drawing(&mut self) -> bool {
        let raised = self.set_mode(PpuMode::Drawing);
        self.render_scanline(self.registers.ly());
        raised
    }

    pub fn enter_hblank(&mut self) -> bool {
        self.set_mode(PpuMode::HBlank)
    }

    /// Completes the current line: advances LY and enters the mode of the next line.
    ///
    /// Entering line 144 starts V-Blank and completes the frame. Line 154 wraps to line 0 of
    /// the next frame.
    pub fn finish_line(&mut self) -> bool {
        let next_line = self.registers.ly() + 1;
        if next_line >= LINES_PER_FRAME {
            self.registers.set_ly(0);
            self.window.reset();
        } else {
            self.registers.set_ly(next_line);
        }
        let mut raised = self.registers.compare_lyc();
        self.latch_stat_interrupt(raised);

        let ly = self.registers.ly();
        if ly == VISIBLE_LINES {
            raised |= self.enter_vblank();
        } else if ly < VISIBLE_LINES {
            raised |= self.enter_oam_scan();
        }
        raised
    }

    fn enter_vblank(&mut self) -> bool {
        self.set_mode(PpuMode::VBlank);
        self.frame_ready = true;
        self.vblank_interrupt = true;
        true
    }

    /// Renders background, window and sprites of scanline `ly` in that order.
    pub fn render_scanline(&mut self, ly: u8) {
        if ly >= VISIBLE_LINES {
            return;
        }
        let line = self.framebuffer.scanline_mut(ly as usize);
        background::render_line(&self.registers, &self.memory, ly, line);
        self.window
            .render_line(&self.registers, &self.memory, ly, line);
        self.sprites
            .render_line(&self.registers, &self.memory, ly, line);
        log::trace!("Scanline {} rendered", ly);
    }

    fn set_mode(&mut self, mode: PpuMode) -> bool {
        log::debug!("LY={} {} -> {}", self.registers.ly(), self.mode(), mode);
        self.registers.set_mode(mode);
        let raised = self.registers.mode_interrupt_enabled();
        self.latch_stat_interrupt(raised);
        raised
    }

    fn latch_stat_interrupt(&mut self, raised: bool) {
        if raised {
            self.stat_interrupt = true;
        }
    }

    pub fn frame_ready(&self) -> bool {
        self.frame_ready
    }

    pub fn clear_frame_ready(&mut self) {
        self.frame_ready = false;
    }

    pub fn consume_vblank_interrupt(&mut self) -> bool {
        let value = self.vblank_interrupt;
        self.vblank_interrupt = false;
        value
    }

    pub fn consume_stat_interrupt(&mut self) -> bool {
        let value = self.stat_interrupt;
        self.stat_interrupt = false;
        value
    }
}
