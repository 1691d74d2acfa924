// Window module - winit + pixels presenter and the windowed driver loop
//
// The event loop runs in `Poll` mode and performs one display tick per
// redraw. The frame pacer's wait happens inside that tick, so the loop is
// paced by the emulated frame rate rather than by VSync.

use std::sync::Arc;

use pixels::{Pixels, SurfaceTexture};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use super::buffer::{PixelFormat, SNES_HEIGHT, SNES_WIDTH};
use super::lifecycle::Display;
use super::present::Presenter;
use super::view::{FrameView, FrameViewMut};
use crate::config::DisplayConfig;
use crate::emulation::EmulationCore;
use crate::error::DisplayError;
use crate::timing::SystemClock;

/// Presenter backed by a `pixels` surface in a winit window
pub struct PixelsPresenter {
    window: Arc<Window>,
    pixels: Option<Pixels<'static>>,
    width: usize,
    height: usize,
}

impl PixelsPresenter {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            pixels: None,
            width: 0,
            height: 0,
        }
    }

    /// Follow a window resize
    pub fn resize_surface(&mut self, width: u32, height: u32) -> Result<(), DisplayError> {
        if let Some(pixels) = &mut self.pixels {
            pixels
                .resize_surface(width, height)
                .map_err(|e| DisplayError::PresentFailure(e.to_string()))?;
        }
        Ok(())
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Presenter for PixelsPresenter {
    fn open(&mut self, width: usize, height: usize, fullscreen: bool) -> Result<(), DisplayError> {
        self.close();

        if fullscreen {
            self.window.set_fullscreen(Some(Fullscreen::Borderless(None)));
        } else {
            self.window.set_fullscreen(None);
        }

        let window_size = self.window.inner_size();
        let surface_texture =
            SurfaceTexture::new(window_size.width, window_size.height, self.window.clone());
        let pixels = Pixels::new(width as u32, height as u32, surface_texture)
            .map_err(|e| DisplayError::DeviceInitFailure(e.to_string()))?;

        self.pixels = Some(pixels);
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn close(&mut self) {
        self.pixels = None;
    }

    fn is_open(&self) -> bool {
        self.pixels.is_some()
    }

    fn surface_mut(&mut self) -> Option<FrameViewMut<'_>> {
        let (width, height) = (self.width, self.height);
        self.pixels.as_mut().map(|pixels| {
            FrameViewMut::new(
                pixels.frame_mut(),
                width,
                height,
                width * 4,
                PixelFormat::Rgba8888,
            )
        })
    }

    fn surface(&self) -> Option<FrameView<'_>> {
        let (width, height) = (self.width, self.height);
        self.pixels.as_ref().map(|pixels| {
            FrameView::new(
                pixels.frame(),
                width,
                height,
                width * 4,
                PixelFormat::Rgba8888,
            )
        })
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        match &self.pixels {
            Some(pixels) => Ok(pixels.render()?),
            None => Err(DisplayError::NotInitialized),
        }
    }
}

/// winit application driving a display and an emulation core
struct WindowedApp<E: EmulationCore> {
    config: DisplayConfig,
    core: E,
    display: Option<Display<PixelsPresenter, SystemClock>>,
    fatal: Option<DisplayError>,
}

impl<E: EmulationCore> WindowedApp<E> {
    fn new(config: DisplayConfig, core: E) -> Self {
        Self {
            config,
            core,
            display: None,
            fatal: None,
        }
    }

    /// Remember a fatal error raised before a display existed
    fn record_fatal(&mut self, error: DisplayError) {
        log::error!("{}", error);
        self.fatal = Some(error);
    }

    /// Outcome of the event loop once it has returned
    fn into_result(self) -> Result<(), DisplayError> {
        match self.fatal {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn request_redraw(&self) {
        if let Some(display) = &self.display {
            display.presenter().window().request_redraw();
        }
    }

    fn handle_key(&mut self, key: KeyCode, event_loop: &ActiveEventLoop) {
        let Some(display) = self.display.as_mut() else {
            return;
        };

        match key {
            KeyCode::Escape => {
                display.deinitialize_display();
                event_loop.exit();
            }
            KeyCode::F9 => match display.capture_screenshot() {
                Ok(path) => display.message(&format!("Screenshot saved: {}", path.display())),
                Err(e) => log::warn!("Screenshot failed: {}", e),
            },
            _ => {}
        }
    }
}

impl<E: EmulationCore> ApplicationHandler for WindowedApp<E> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.display.is_some() {
            return;
        }

        let scale = self.config.video.scale;
        let (width, height) = (SNES_WIDTH as u32 * scale, SNES_HEIGHT as u32 * scale);
        let window_attributes = Window::default_attributes()
            .with_title(format!("emu-present - {}x{}", width, height))
            .with_inner_size(LogicalSize::new(width, height))
            .with_resizable(true);

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.record_fatal(DisplayError::from(e));
                event_loop.exit();
                return;
            }
        };

        let mut display = Display::new(
            &self.config,
            PixelsPresenter::new(window),
            SystemClock::new(),
        );
        if let Err(e) = display.initialize() {
            display.report_fatal_display_error(&e.to_string());
        }

        self.display = Some(display);
        self.request_redraw();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                if let Some(display) = self.display.as_mut() {
                    display.deinitialize_display();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(display) = self.display.as_mut() {
                    if let Err(e) = display
                        .presenter_mut()
                        .resize_surface(size.width, size.height)
                    {
                        log::warn!("Resize failed: {}", e);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(key, event_loop),
            WindowEvent::RedrawRequested => {
                if let Some(display) = self.display.as_mut().filter(|d| d.is_ready()) {
                    match display.render_and_present_frame(&mut self.core) {
                        Ok(_) => {}
                        Err(e) if e.is_fatal() => {
                            display.report_fatal_display_error(&e.to_string())
                        }
                        Err(e) => {
                            log::error!("Render error: {}", e);
                            display.deinitialize_display();
                            event_loop.exit();
                            return;
                        }
                    }
                }
                self.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.request_redraw();
    }
}

/// Run the emulation core in a window until it is closed
pub fn run_windowed<E: EmulationCore>(
    config: DisplayConfig,
    core: E,
) -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let scale = config.video.scale;
    log::info!("Starting display window...");
    log::info!("  Resolution: {}x{}", SNES_WIDTH, SNES_HEIGHT);
    log::info!(
        "  Window size: {}x{}",
        SNES_WIDTH as u32 * scale,
        SNES_HEIGHT as u32 * scale
    );
    log::info!("  Region: {:?}", config.video.region);
    log::info!("  Frame skip: {:?}", config.video.skip_policy);

    let mut app = WindowedApp::new(config, core);
    event_loop.run_app(&mut app)?;

    // Window creation failures end the loop early; report them as errors
    app.into_result()?;
    Ok(())
}
