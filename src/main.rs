// Emulator display - Main entry point
//
// Runs the test-pattern core through the frame pacer and presentation
// pipeline, either in a window or headless for a fixed number of frames.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use emu_present::display::{run_windowed, Display, HeadlessPresenter};
use emu_present::{DisplayConfig, Region, SkipPolicy, SystemClock, TestPatternCore};

#[derive(Parser, Debug)]
#[command(name = "emu-present")]
#[command(about = "Frame pacing and presentation for an emulator frontend")]
struct Cli {
    /// Configuration file (created with defaults if missing)
    #[arg(short, long, default_value = emu_present::config::CONFIG_FILE)]
    config: PathBuf,

    /// Output scale (1-8)
    #[arg(short, long)]
    scale: Option<u32>,

    /// Emulated region: ntsc or pal
    #[arg(short, long)]
    region: Option<Region>,

    /// Frame skip: auto or a number of frames to skip between renders
    #[arg(short, long)]
    frameskip: Option<SkipPolicy>,

    /// Fullscreen mode
    #[arg(long)]
    fullscreen: bool,

    /// Run without a window for the given number of frames
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Save a screenshot after a headless run
    #[arg(long, requires = "headless")]
    screenshot: bool,
}

impl Cli {
    fn apply(&self, mut config: DisplayConfig) -> DisplayConfig {
        if let Some(scale) = self.scale {
            config = config.with_scale(scale);
        }
        if let Some(region) = self.region {
            config = config.with_region(region);
        }
        if let Some(skip_policy) = self.frameskip {
            config = config.with_skip_policy(skip_policy);
        }
        if self.fullscreen {
            config = config.with_fullscreen(true);
        }
        config
    }
}

fn run_headless(
    config: &DisplayConfig,
    frames: u64,
    screenshot: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let presenter = HeadlessPresenter::new(config.video.surface_format);
    let mut display = Display::new(config, presenter, SystemClock::new());
    let mut core = TestPatternCore::new();

    if let Err(e) = display.initialize() {
        display.report_fatal_display_error(&e.to_string());
    }

    let start = Instant::now();
    for _ in 0..frames {
        if let Err(e) = display.render_and_present_frame(&mut core) {
            if e.is_fatal() {
                display.report_fatal_display_error(&e.to_string());
            }
            return Err(e.into());
        }
    }
    let elapsed = start.elapsed();

    let stats = display.pacer().stats();
    log::info!(
        "{} frames in {:.2}s: {} rendered, {} skipped, {} resyncs",
        frames,
        elapsed.as_secs_f64(),
        stats.rendered,
        stats.skipped,
        stats.resyncs
    );

    if screenshot {
        let path = display.capture_screenshot()?;
        log::info!("Screenshot saved: {}", path.display());
    }

    display.deinitialize_display();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.apply(DisplayConfig::load_or_default(&cli.config));

    match cli.headless {
        Some(frames) => run_headless(&config, frames, cli.screenshot),
        None => {
            log::info!("Press Escape or close the window to exit, F9 for a screenshot.");
            run_windowed(config, TestPatternCore::new())
        }
    }
}
