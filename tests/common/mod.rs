// Common test utilities for display pipeline integration tests
//
// Scripted clocks, presenters and cores that let the pipeline run
// deterministically without a window or real time passing.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use emu_present::display::{FrameView, FrameViewMut, PixelFormat, PresentationSurface};
use emu_present::{Clock, DisplayError, EmulationCore, Presenter};

/// Clock whose sleeps return after only a fraction of the requested time
///
/// Exercises the pacer's re-arming loop: a single sleep is never enough to
/// reach the deadline.
#[derive(Debug, Clone, Default)]
pub struct ShortSleepClock {
    now: Rc<Cell<Duration>>,
    sleeps: Rc<Cell<u64>>,
}

impl ShortSleepClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, duration: Duration) {
        self.now.set(self.now.get() + duration);
    }

    pub fn sleep_count(&self) -> u64 {
        self.sleeps.get()
    }
}

impl Clock for ShortSleepClock {
    fn now(&self) -> Duration {
        self.now.get()
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.set(self.sleeps.get() + 1);
        // Wake up at a third of the way, but always make some progress
        let slept = (duration / 3).max(Duration::from_nanos(1));
        self.advance(slept);
    }
}

/// Shared open/close counters for a [`RecordingPresenter`]
#[derive(Debug, Default)]
pub struct PresenterLog {
    pub opened: Cell<u64>,
    pub closed: Cell<u64>,
    pub presented: Cell<u64>,
}

/// Presenter that records lifecycle calls and can be told to fail on open
pub struct RecordingPresenter {
    log: Rc<PresenterLog>,
    surface: Option<PresentationSurface>,
    format: PixelFormat,
    fail_open: bool,
}

impl RecordingPresenter {
    pub fn new(format: PixelFormat) -> (Self, Rc<PresenterLog>) {
        let log = Rc::new(PresenterLog::default());
        let presenter = Self {
            log: Rc::clone(&log),
            surface: None,
            format,
            fail_open: false,
        };
        (presenter, log)
    }

    /// A presenter whose `open` always fails with a device error
    pub fn failing() -> (Self, Rc<PresenterLog>) {
        let (mut presenter, log) = Self::new(PixelFormat::Rgba8888);
        presenter.fail_open = true;
        (presenter, log)
    }
}

impl Presenter for RecordingPresenter {
    fn open(&mut self, width: usize, height: usize, _fullscreen: bool) -> Result<(), DisplayError> {
        if self.fail_open {
            return Err(DisplayError::DeviceInitFailure(
                "no display device".to_string(),
            ));
        }
        self.surface = Some(PresentationSurface::new(width, height, self.format)?);
        self.log.opened.set(self.log.opened.get() + 1);
        Ok(())
    }

    fn close(&mut self) {
        if self.surface.take().is_some() {
            self.log.closed.set(self.log.closed.get() + 1);
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
        self.log.presented.set(self.log.presented.get() + 1);
        Ok(())
    }
}

/// Core that fills every rendered frame with one colour
#[derive(Debug)]
pub struct SolidColorCore {
    pub color: [u8; 3],
    pub frames: u64,
    pub drawn: u64,
}

impl SolidColorCore {
    pub fn new(color: [u8; 3]) -> Self {
        Self {
            color,
            frames: 0,
            drawn: 0,
        }
    }
}

impl EmulationCore for SolidColorCore {
    fn run_frame(&mut self, frame: Option<FrameViewMut<'_>>) {
        if let Some(mut frame) = frame {
            frame.fill_rgb(self.color);
            self.drawn += 1;
        }
        self.frames += 1;
    }
}
