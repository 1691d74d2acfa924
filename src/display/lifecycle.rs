// Display lifecycle - Owns every display resource and runs one tick at a time
//
// Initialization order is: allocate the frame buffer, set up the converter,
// open the presenter. Teardown releases them in reverse. A failure part way
// through initialization releases whatever was already acquired, so the
// display is only ever observed as `Uninitialized` or `Ready`.

use std::path::PathBuf;

use super::buffer::{
    PixelBufferManager, PixelFormat, SNES_HEIGHT, SNES_HEIGHT_EXTENDED, SNES_WIDTH,
};
use super::convert::FormatConverter;
use super::present::Presenter;
use super::screenshot::{save_screenshot, ScreenshotError};
use crate::config::{DisplayConfig, Region, ScreenshotConfig, VideoConfig, MAX_SCALE, MIN_SCALE};
use crate::emulation::EmulationCore;
use crate::error::DisplayError;
use crate::timing::{Clock, FramePacer, RenderDecision};

/// Longest info message kept for display, in characters
pub const INFO_STRING_MAX: usize = 36 * 3;

/// Externally observable lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Ready,
}

/// Display context
///
/// Replaces process-wide display state: each instance owns its buffer,
/// converter, presenter and pacer.
pub struct Display<P: Presenter, C: Clock> {
    video: VideoConfig,
    screenshot: ScreenshotConfig,
    state: LifecycleState,
    buffers: PixelBufferManager,
    converter: Option<FormatConverter>,
    presenter: P,
    pacer: FramePacer<C>,
    info: String,
}

impl<P: Presenter, C: Clock> Display<P, C> {
    /// Create an uninitialized display
    pub fn new(config: &DisplayConfig, presenter: P, clock: C) -> Self {
        let config = config.clone().sanitized();
        let pacer = FramePacer::new(clock, config.video.region, config.video.skip_policy);
        Self {
            video: config.video,
            screenshot: config.screenshot,
            state: LifecycleState::Uninitialized,
            buffers: PixelBufferManager::new(),
            converter: None,
            presenter,
            pacer,
            info: String::new(),
        }
    }

    /// Acquire all resources. Tears down first when already `Ready`.
    pub fn initialize(&mut self) -> Result<(), DisplayError> {
        if self.state == LifecycleState::Ready {
            self.teardown();
        }

        let scale = self.video.scale as usize;
        if let Err(e) = self.acquire(scale) {
            log::error!("Display initialization failed: {}", e);
            self.release();
            return Err(e);
        }

        self.pacer.reset();
        self.state = LifecycleState::Ready;
        log::info!(
            "Display ready: {}x{} at {}x, {:?}, frame skip {:?}",
            SNES_WIDTH,
            SNES_HEIGHT,
            scale,
            self.video.region,
            self.video.skip_policy
        );
        Ok(())
    }

    fn acquire(&mut self, scale: usize) -> Result<(), DisplayError> {
        self.buffers
            .allocate(SNES_WIDTH, SNES_HEIGHT_EXTENDED, scale, PixelFormat::Rgb565)?;
        self.converter = Some(FormatConverter::new(scale));
        self.presenter.open(
            SNES_WIDTH * scale,
            SNES_HEIGHT * scale,
            self.video.fullscreen,
        )?;
        Ok(())
    }

    fn release(&mut self) {
        self.presenter.close();
        self.converter = None;
        self.buffers.release();
    }

    /// Release all resources. No-op when `Uninitialized`.
    pub fn teardown(&mut self) {
        if self.state == LifecycleState::Uninitialized {
            return;
        }
        self.release();
        self.state = LifecycleState::Uninitialized;
        log::info!("Display torn down");
    }

    /// Initialize for a scale and region
    ///
    /// # Arguments
    ///
    /// * `scale` - Output resolution multiple, clamped to 1-8
    /// * `region` - Emulated TV standard selecting the frame interval
    ///
    /// # Returns
    ///
    /// `Ok(())` once the display is `Ready`. On error every resource
    /// acquired so far has been released and the display is `Uninitialized`.
    pub fn initialize_display(&mut self, scale: u32, region: Region) -> Result<(), DisplayError> {
        self.video.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self.video.region = region;
        self.pacer.set_region(region);
        self.initialize()
    }

    /// Tear the display down; safe to call repeatedly
    pub fn deinitialize_display(&mut self) {
        self.teardown();
    }

    /// Change scale or region at runtime (full teardown, then initialize)
    pub fn reconfigure(&mut self, scale: u32, region: Region) -> Result<(), DisplayError> {
        self.teardown();
        self.initialize_display(scale, region)
    }

    /// Run one full tick: pace, emulate, and (on rendered ticks) convert and present
    ///
    /// The pacer's wait happens inside this call, so calling it in a loop
    /// runs the core at the region's frame rate.
    ///
    /// # Arguments
    ///
    /// * `core` - The emulation core; it draws only on rendered ticks
    ///
    /// # Returns
    ///
    /// The pacer's decision for this tick, or `NotInitialized` when the
    /// display is not `Ready`
    pub fn render_and_present_frame<E: EmulationCore>(
        &mut self,
        core: &mut E,
    ) -> Result<RenderDecision, DisplayError> {
        if self.state != LifecycleState::Ready {
            return Err(DisplayError::NotInitialized);
        }

        let decision = self.pacer.tick();
        if !decision.is_render() {
            core.run_frame(None);
            return Ok(decision);
        }

        let converter = self.converter.ok_or(DisplayError::NotInitialized)?;
        let buffer = self
            .buffers
            .buffer_mut()
            .ok_or(DisplayError::NotInitialized)?;

        core.run_frame(Some(buffer.view_mut()));
        let (width, height) = core.frame_size();

        let mut surface = self
            .presenter
            .surface_mut()
            .ok_or(DisplayError::NotInitialized)?;
        converter.convert(&buffer.view(), &mut surface, width, height)?;

        self.presenter.present()?;
        Ok(decision)
    }

    /// Log a fatal error, release everything, and exit the process
    ///
    /// # Arguments
    ///
    /// * `message` - Shown to the user before exiting with status 1
    pub fn report_fatal_display_error(&mut self, message: &str) -> ! {
        self.release_after_fatal(message);
        std::process::exit(1);
    }

    /// The non-exiting half of [`Self::report_fatal_display_error`]
    pub fn release_after_fatal(&mut self, message: &str) {
        log::error!("{}", message);
        self.teardown();
    }

    /// Show a message on the info line, truncated to [`INFO_STRING_MAX`] characters
    pub fn message(&mut self, text: &str) {
        log::info!("{}", text);
        self.info = text.chars().take(INFO_STRING_MAX).collect();
    }

    /// Current info line
    pub fn info_string(&self) -> &str {
        &self.info
    }

    /// Save the visible surface as a PNG
    pub fn capture_screenshot(&self) -> Result<PathBuf, ScreenshotError> {
        let surface = self.presenter.surface().ok_or(ScreenshotError::NoFrame)?;
        save_screenshot(&surface, &self.screenshot)
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    pub fn video_config(&self) -> &VideoConfig {
        &self.video
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn pacer(&self) -> &FramePacer<C> {
        &self.pacer
    }

    pub fn pacer_mut(&mut self) -> &mut FramePacer<C> {
        &mut self.pacer
    }

    pub fn buffers(&self) -> &PixelBufferManager {
        &self.buffers
    }
}

impl<P: Presenter, C: Clock> Drop for Display<P, C> {
    fn drop(&mut self) {
        self.teardown();
    }
}
