//! Display backends that present finished PPU frames.
//!
//! A backend receives the [`Framebuffer`] of shades once per frame. The [`ConsoleDisplay`]
//! draws it as block characters, the [`PngDisplay`] saves every frame as an image.
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use dmg_ppu::ppu::palette::ColorScheme;
use dmg_ppu::ppu::tile::SHADE_CHARS;
use dmg_ppu::ppu::REFRESH_RATE;
use dmg_ppu::ppu::SCREEN_HEIGHT;
use dmg_ppu::ppu::SCREEN_WIDTH;
use dmg_ppu::Framebuffer;
use image::imageops::FilterType;
use serde::Deserialize;
use serde::Serialize;

use crate::util::RgbaImageImpl;
use crate::util::RingBuffer;

pub const MAX_SCALE_FACTOR: u32 = 8;

#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ScalingMode {
    /// Pixel exact, every screen pixel becomes a square block.
    #[default]
    Nearest,
    Linear,
}

impl ScalingMode {
    fn filter(self) -> FilterType {
        match self {
            ScalingMode::Nearest => FilterType::Nearest,
            ScalingMode::Linear => FilterType::Triangle,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub scale_factor: u32,
    pub scaling_mode: ScalingMode,
    pub color_scheme: ColorScheme,
    pub vsync: bool,
    pub show_fps: bool,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale_factor: 1,
            scaling_mode: ScalingMode::Nearest,
            color_scheme: ColorScheme::Green,
            vsync: true,
            show_fps: false,
            title: "DMG PPU".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SCALE_FACTOR).contains(&self.scale_factor) {
            bail!(
                "Invalid scale factor {}, expected 1 to {}",
                self.scale_factor,
                MAX_SCALE_FACTOR
            );
        }
        Ok(())
    }

    /// Loads a config from JSON. Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DisplayConfig =
            serde_json::from_str(json).context("Cannot parse display config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read display config {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    pub fn scaled_size(&self) -> (u32, u32) {
        (
            SCREEN_WIDTH as u32 * self.scale_factor,
            SCREEN_HEIGHT as u32 * self.scale_factor,
        )
    }
}

/// A frontend able to show PPU frames.
pub trait Display {
    fn initialize(&mut self, config: &DisplayConfig) -> Result<()>;

    /// Shows one finished frame.
    fn present(&mut self, framebuffer: &Framebuffer) -> Result<()>;

    fn set_title(&mut self, title: &str) -> Result<()>;

    fn should_close(&self) -> bool;

    /// Processes pending window or input events.
    fn poll_events(&mut self);

    fn cleanup(&mut self) -> Result<()>;
}

/// Renders frames as block characters into any writer, one character per shade.
pub struct ConsoleDisplay<W: Write> {
    writer: W,
    config: DisplayConfig,
    frame_count: u64,
    clear_screen: bool,
}

impl ConsoleDisplay<std::io::Stdout> {
    /// Draws to the terminal, clearing it before every frame.
    pub fn stdout() -> Self {
        let mut display = Self::new(std::io::stdout());
        display.clear_screen = true;
        display
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            config: DisplayConfig::default(),
            frame_count: 0,
            clear_screen: false,
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn border(&self) -> String {
        format!(
            "+{}+",
            "-".repeat(SCREEN_WIDTH * self.config.scale_factor as usize)
        )
    }
}

impl<W: Write> Display for ConsoleDisplay<W> {
    fn initialize(&mut self, config: &DisplayConfig) -> Result<()> {
        config.validate().context("Console display")?;
        self.config = config.clone();
        self.frame_count = 0;
        log::info!(
            "Console display: {}x{}, scale {}x",
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            config.scale_factor
        );
        Ok(())
    }

    fn present(&mut self, framebuffer: &Framebuffer) -> Result<()> {
        self.frame_count += 1;
        let scale = self.config.scale_factor as usize;
        let mut out = String::new();
        if self.clear_screen {
            out.push_str("\x1b[2J\x1b[H");
        }
        out.push_str(&format!(
            "Frame #{} | {}x{} | Scale: {}x\n",
            self.frame_count, SCREEN_WIDTH, SCREEN_HEIGHT, scale
        ));
        out.push_str(&self.border());
        out.push('\n');
        for row in framebuffer.rows() {
            let line: String = row
                .iter()
                .flat_map(|shade| {
                    std::iter::repeat(SHADE_CHARS[(*shade).min(3) as usize]).take(scale)
                })
                .collect();
            for _ in 0..scale {
                out.push('|');
                out.push_str(&line);
                out.push_str("|\n");
            }
        }
        out.push_str(&self.border());
        out.push('\n');
        self.writer
            .write_all(out.as_bytes())
            .context("Cannot write frame to console")?;
        self.writer.flush()?;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.config.title = title.to_string();
        writeln!(self.writer, "Title: {title}")?;
        Ok(())
    }

    /// The console never asks to close, interrupting the process ends it.
    fn should_close(&self) -> bool {
        false
    }

    fn poll_events(&mut self) {}

    fn cleanup(&mut self) -> Result<()> {
        writeln!(
            self.writer,
            "Console display closed after {} frames",
            self.frame_count
        )?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Saves each presented frame as `frame_NNNN.png` in an output directory.
pub struct PngDisplay {
    output_dir: PathBuf,
    frame_limit: Option<u32>,
    frames_written: u32,
    config: DisplayConfig,
}

impl PngDisplay {
    /// `frame_limit` is the number of frames after which the display asks to be closed.
    pub fn new(output_dir: impl Into<PathBuf>, frame_limit: Option<u32>) -> Self {
        Self {
            output_dir: output_dir.into(),
            frame_limit,
            frames_written: 0,
            config: DisplayConfig::default(),
        }
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    pub fn frame_path(&self, frame: u32) -> PathBuf {
        self.output_dir.join(format!("frame_{frame:04}.png"))
    }

    /// Converts a framebuffer into an image with the configured colors and scaling.
    pub fn render(&self, framebuffer: &Framebuffer) -> image::RgbaImage {
        let image = framebuffer
            .to_rgba::<RgbaImageImpl>(self.config.color_scheme)
            .inner;
        if self.config.scale_factor == 1 {
            return image;
        }
        let (width, height) = self.config.scaled_size();
        image::imageops::resize(&image, width, height, self.config.scaling_mode.filter())
    }
}

impl Display for PngDisplay {
    fn initialize(&mut self, config: &DisplayConfig) -> Result<()> {
        config.validate().context("PNG display")?;
        self.config = config.clone();
        self.frames_written = 0;
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Cannot create output directory {}", self.output_dir.display())
        })?;
        log::info!("Writing frames to {}", self.output_dir.display());
        Ok(())
    }

    fn present(&mut self, framebuffer: &Framebuffer) -> Result<()> {
        let path = self.frame_path(self.frames_written);
        self.render(framebuffer)
            .save(&path)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        log::debug!("Wrote {}", path.display());
        self.frames_written += 1;
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        log::info!("{title}");
        self.config.title = title.to_string();
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.frame_limit
            .is_some_and(|limit| self.frames_written >= limit)
    }

    fn poll_events(&mut self) {}

    fn cleanup(&mut self) -> Result<()> {
        log::info!(
            "Wrote {} frames to {}",
            self.frames_written,
            self.output_dir.display()
        );
        Ok(())
    }
}

/// Keeps presentation at the hardware refresh rate and measures the achieved frame rate.
pub struct FramePacer {
    vsync: bool,
    frame_time: Duration,
    last_frame: Option<Instant>,
    past_frame_times: RingBuffer<Duration, 60>,
}

impl FramePacer {
    pub fn new(vsync: bool) -> Self {
        Self {
            vsync,
            frame_time: Duration::from_secs_f64(1.0 / REFRESH_RATE),
            last_frame: None,
            past_frame_times: RingBuffer::default(),
        }
    }

    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    pub fn set_frame_rate(&mut self, fps: f64) {
        if fps > 0.0 {
            self.frame_time = Duration::from_secs_f64(1.0 / fps);
        }
    }

    /// Called once per presented frame. With vsync, sleeps for whatever is left of the frame
    /// time since the previous call.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if let Some(last_frame) = self.last_frame {
            let elapsed = now.duration_since(last_frame);
            if self.vsync && elapsed < self.frame_time {
                thread::sleep(self.frame_time - elapsed);
            }
            let now = Instant::now();
            self.past_frame_times.push(now.duration_since(last_frame));
            self.last_frame = Some(now);
        } else {
            self.last_frame = Some(now);
        }
    }

    /// Average frame rate over the last 60 frames.
    pub fn fps(&self) -> f64 {
        if self.past_frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.past_frame_times.iter().sum();
        if total.is_zero() {
            return 0.0;
        }
        self.past_frame_times.len() as f64 / total.as_secs_f64()
    }
}

/// 8x8 checkerboard with diagonal shade stripes in alternating directions.
pub fn checkerboard_frame() -> Framebuffer {
    let mut frame = Framebuffer::default();
    for y in 0..SCREEN_HEIGHT {
        for x in 0..SCREEN_WIDTH {
            let shade = if (x / 8 + y / 8) % 2 == 0 {
                (x + y) % 4
            } else {
                (x + SCREEN_WIDTH * 4 - y) % 4
            };
            frame.set_pixel(x, y, shade as u8);
        }
    }
    frame
}

pub fn solid_frame(color: u8) -> Framebuffer {
    let mut frame = Framebuffer::default();
    frame.fill(color);
    frame
}
