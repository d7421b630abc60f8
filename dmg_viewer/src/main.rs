use std::path::PathBuf;

use anyhow::Result;
use argh::FromArgs;
use dmg_ppu::common::logging;
use dmg_ppu::ppu::palette::ColorScheme;
use dmg_viewer::display::ConsoleDisplay;
use dmg_viewer::display::Display;
use dmg_viewer::display::DisplayConfig;
use dmg_viewer::display::FramePacer;
use dmg_viewer::display::PngDisplay;
use dmg_viewer::scene::Scene;
use dmg_viewer::scene::SceneRunner;

/// Runs the DMG PPU on a demo scene and presents the frames
#[derive(FromArgs)]
struct ViewerArgs {
    /// number of frames to run
    #[argh(option, default = "60")]
    frames: u32,

    /// directory to write frame_NNNN.png files to (default: frames)
    #[argh(option)]
    output: Option<PathBuf>,

    /// draw frames in the terminal instead of writing PNG files
    #[argh(switch)]
    console: bool,

    /// integer scale factor from 1 to 8
    #[argh(option)]
    scale: Option<u32>,

    /// color scheme, green or grayscale
    #[argh(option)]
    scheme: Option<ColorScheme>,

    /// display config as JSON, command line options take precedence
    #[argh(option)]
    config: Option<PathBuf>,

    /// demo scene: patterns, scroll, window or sprites
    #[argh(option, default = "Scene::default()")]
    scene: Scene,
}

impl ViewerArgs {
    fn display_config(&self) -> Result<DisplayConfig> {
        let mut config = match &self.config {
            Some(path) => DisplayConfig::from_json_file(path)?,
            None => DisplayConfig::default(),
        };
        if let Some(scale) = self.scale {
            config.scale_factor = scale;
        }
        if let Some(scheme) = self.scheme {
            config.color_scheme = scheme;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run(display: &mut dyn Display, config: &DisplayConfig, args: &ViewerArgs) -> Result<()> {
    display.initialize(config)?;
    display.set_title(&format!("{} - {}", config.title, args.scene))?;

    let mut runner = SceneRunner::new(args.scene);
    let mut pacer = FramePacer::new(config.vsync);
    while runner.frame() < args.frames && !display.should_close() {
        let frame = runner.next_frame();
        display.present(&frame)?;
        display.poll_events();
        pacer.wait();
        if config.show_fps && runner.frame() % 60 == 0 {
            display.set_title(&format!(
                "{} - {} - {:.1} FPS",
                config.title,
                args.scene,
                pacer.fps()
            ))?;
        }
    }
    display.cleanup()
}

fn main() -> Result<()> {
    logging::init();
    let args: ViewerArgs = argh::from_env();
    let config = args.display_config()?;
    log::info!(
        "Running scene {} for {} frames (available: {:?})",
        args.scene,
        args.frames,
        Scene::ALL.map(|scene| scene.to_string())
    );

    if args.console {
        run(&mut ConsoleDisplay::stdout(), &config, &args)
    } else {
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from("frames"));
        run(&mut PngDisplay::new(output, Some(args.frames)), &config, &args)
    }
}
