//! Window layer renderer.
use super::background::MapRowFetcher;
use super::framebuffer::SCREEN_WIDTH;
use super::memory::VideoMemory;
use super::registers::Registers;

/// WX stores the screen column of the window's left edge plus 7.
pub const WINDOW_X_OFFSET: i32 = 7;

/// Window layer state: the internal line counter selecting which window row is drawn next.
///
/// The counter only advances on scanlines where the window was drawn, so a window that starts
/// mid-frame begins at its first row regardless of LY.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Window {
    line_counter: u8,
    active: bool,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.line_counter = 0;
        self.active = false;
    }

    pub fn line_counter(&self) -> u8 {
        self.line_counter
    }

    /// True if the window has been drawn on at least one line since the last reset.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_visible(registers: &Registers, ly: u8) -> bool {
        registers.lcdc().window_enable() && ly >= registers.wy()
    }

    /// Draws the window over the background already in `line`. Returns true if the window was
    /// visible on this line.
    ///
    /// A window placed right of the screen draws nothing but still consumes a window row.
    pub fn render_line<MemoryT: VideoMemory>(
        &mut self,
        registers: &Registers,
        memory: &MemoryT,
        ly: u8,
        line: &mut [u8],
    ) -> bool {
        if !Self::is_visible(registers, ly) {
            return false;
        }
        let start_x = registers.wx() as i32 - WINDOW_X_OFFSET;
        let palette = registers.bgp();
        let mut fetcher = MapRowFetcher::new(
            memory,
            registers.window_tile_map(),
            registers.tile_addressing(),
            self.line_counter as u32,
        );
        for screen_x in start_x.max(0)..SCREEN_WIDTH as i32 {
            let window_x = (screen_x - start_x) as u32;
            line[screen_x as usize] = palette.apply(fetcher.pixel(window_x));
        }

        log::trace!(
            "Window line {} drawn at LY={} from X={}",
            self.line_counter,
            ly,
            start_x
        );
        self.line_counter = self.line_counter.wrapping_add(1);
        self.active = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::common::address::PpuRegister;
    use crate::ppu::memory::VideoRam;
    use crate::ppu::tile::Tile;
    use crate::ppu::vram::TileAddressing;
    use crate::ppu::vram::TileMap;

    fn setup() -> (Registers, VideoRam) {
        let mut registers = Registers::default();
        // LCD on, window on with $9C00 map, BG on
        registers.write(PpuRegister::Lcdc, 0xF1);
        let mut memory = VideoRam::new();
        let mut tile = Tile::new();
        tile.fill(3);
        memory.vram.set_tile(1, TileAddressing::Unsigned, &tile);
        memory.vram.fill_map(TileMap::Map1, 1);
        (registers, memory)
    }

    #[test]
    fn test_hidden_above_wy() {
        let (mut registers, memory) = setup();
        registers.write(PpuRegister::Wy, 10);
        registers.write(PpuRegister::Wx, 7);
        let mut window = Window::new();

        let mut line = [0; SCREEN_WIDTH];
        assert!(!window.render_line(&registers, &memory, 9, &mut line));
        assert_eq!(line, [0; SCREEN_WIDTH]);
        assert_eq!(window.line_counter(), 0);
        assert!(!window.is_active());

        assert!(window.render_line(&registers, &memory, 10, &mut line));
        assert_eq!(line, [3; SCREEN_WIDTH]);
        assert_eq!(window.line_counter(), 1);
        assert!(window.is_active());
    }

    #[test]
    fn test_horizontal_placement() {
        let (mut registers, memory) = setup();
        registers.write(PpuRegister::Wx, 87);
        let mut window = Window::new();

        let mut line = [1; SCREEN_WIDTH];
        window.render_line(&registers, &memory, 0, &mut line);
        assert!(line[..80].iter().all(|pixel| *pixel == 1));
        assert!(line[80..].iter().all(|pixel| *pixel == 3));
    }

    #[test]
    fn test_negative_start_is_clipped() {
        let (mut registers, mut memory) = setup();
        registers.write(PpuRegister::Wx, 3);
        let tile = Tile::from_pattern("....####");
        memory.vram.set_tile(2, TileAddressing::Unsigned, &tile);
        memory.vram.set_tile_index(0, 0, TileMap::Map1, 2);
        let mut window = Window::new();

        let mut line = [0; SCREEN_WIDTH];
        window.render_line(&registers, &memory, 0, &mut line);
        // Window column 4 lands on screen column 0.
        assert_eq!(&line[0..4], &[3; 4]);
        assert_eq!(&line[4..8], &[3; 4]);
    }

    #[test]
    fn test_off_screen_still_advances_counter() {
        let (mut registers, memory) = setup();
        registers.write(PpuRegister::Wx, 167);
        let mut window = Window::new();

        let mut line = [0; SCREEN_WIDTH];
        assert!(window.render_line(&registers, &memory, 0, &mut line));
        assert_eq!(window.line_counter(), 1);
        assert_eq!(line, [0; SCREEN_WIDTH]);

        registers.write(PpuRegister::Wx, 255);
        window.render_line(&registers, &memory, 1, &mut line);
        assert_eq!(window.line_counter(), 2);
        assert_eq!(line, [0; SCREEN_WIDTH]);
    }

    #[test]
    fn test_uses_line_counter_not_ly() {
        let (mut registers, mut memory) = setup();
        registers.write(PpuRegister::Wy, 100);
        registers.write(PpuRegister::Wx, 7);
        let mut striped = Tile::new();
        for x in 0..8 {
            striped.set_pixel(x, 0, 2);
            striped.set_pixel(x, 1, 1);
        }
        memory.vram.set_tile(2, TileAddressing::Unsigned, &striped);
        memory.vram.fill_map(TileMap::Map1, 2);
        let mut window = Window::new();

        let mut line = [0; SCREEN_WIDTH];
        window.render_line(&registers, &memory, 100, &mut line);
        assert_eq!(line[0], 2);
        window.render_line(&registers, &memory, 101, &mut line);
        assert_eq!(line[0], 1);
    }

    #[test]
    fn test_reset() {
        let (registers, memory) = setup();
        let mut window = Window::new();
        let mut line = [0; SCREEN_WIDTH];
        for ly in 0..5 {
            window.render_line(&registers, &memory, ly, &mut line);
        }
        assert_eq!(window.line_counter(), 5);
        window.reset();
        assert_eq!(window.line_counter(), 0);
        assert!(!window.is_active());
    }
}
