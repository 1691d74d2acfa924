// Presenter - Makes converted frames visible
//
// A presenter owns the host surface. The display lifecycle opens it once,
// converts into `surface_mut()` on rendered ticks, then calls `present()`.
// Skipped ticks never reach the presenter.

use super::buffer::PixelFormat;
use super::surface::PresentationSurface;
use super::view::{FrameView, FrameViewMut};
use crate::error::DisplayError;

/// Display device seam
pub trait Presenter {
    /// Create the host surface (`width`×`height` pixels)
    fn open(&mut self, width: usize, height: usize, fullscreen: bool) -> Result<(), DisplayError>;

    /// Destroy the host surface. Safe to call when not open.
    fn close(&mut self);

    /// Whether a surface currently exists
    fn is_open(&self) -> bool;

    /// Destination for the next converted frame
    fn surface_mut(&mut self) -> Option<FrameViewMut<'_>>;

    /// The currently visible pixels
    fn surface(&self) -> Option<FrameView<'_>>;

    /// Show the most recently converted frame, replacing the previous one
    fn present(&mut self) -> Result<(), DisplayError>;
}

/// Presenter that keeps frames in memory
///
/// Used for headless runs and tests. Counts surfaces and presents so callers
/// can verify lifecycle balance.
#[derive(Debug)]
pub struct HeadlessPresenter {
    format: PixelFormat,
    surface: Option<PresentationSurface>,
    fullscreen: bool,
    presented: u64,
    opened: u64,
    closed: u64,
}

impl HeadlessPresenter {
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            surface: None,
            fullscreen: false,
            presented: 0,
            opened: 0,
            closed: 0,
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// The owned surface, if open
    pub fn presentation_surface(&self) -> Option<&PresentationSurface> {
        self.surface.as_ref()
    }

    /// Frames presented since creation
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    pub fn open_count(&self) -> u64 {
        self.opened
    }

    pub fn close_count(&self) -> u64 {
        self.closed
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }
}

impl Default for HeadlessPresenter {
    fn default() -> Self {
        Self::new(PixelFormat::Rgba8888)
    }
}

impl Presenter for HeadlessPresenter {
    fn open(&mut self, width: usize, height: usize, fullscreen: bool) -> Result<(), DisplayError> {
        self.close();
        self.surface = Some(PresentationSurface::new(width, height, self.format)?);
        self.fullscreen = fullscreen;
        self.opened += 1;
        Ok(())
    }

    fn close(&mut self) {
        if self.surface.take().is_some() {
            self.closed += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    fn surface_mut(&mut self) -> Option<FrameViewMut<'_>> {
        self.surface.as_mut().map(PresentationSurface::view_mut)
    }

    fn surface(&self) -> Option<FrameView<'_>> {
        self.surface.as_ref().map(PresentationSurface::view)
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        if self.surface.is_none() {
            return Err(DisplayError::NotInitialized);
        }
        self.presented += 1;
        Ok(())
    }
}
