// Display module - Frame buffer, conversion, and presentation
//
// This module provides:
// - The emulated-frame pixel buffer and its manager
// - Pixel-format conversion with integer scaling
// - The presenter seam, a headless presenter, and a winit + pixels window
// - The display lifecycle that ties them to the frame pacer
// - PNG screenshots of the visible surface

pub mod buffer;
pub mod convert;
pub mod lifecycle;
pub mod present;
pub mod screenshot;
pub mod surface;
pub mod view;
pub mod window;

pub use buffer::{
    PixelBuffer, PixelBufferManager, PixelFormat, FILTER_HEADROOM, PADDING_ROWS_ABOVE,
    PADDING_ROWS_BELOW, SNES_HEIGHT, SNES_HEIGHT_EXTENDED, SNES_WIDTH,
};
pub use convert::FormatConverter;
pub use lifecycle::{Display, LifecycleState, INFO_STRING_MAX};
pub use present::{HeadlessPresenter, Presenter};
pub use screenshot::{save_screenshot, ScreenshotError};
pub use surface::PresentationSurface;
pub use view::{FrameView, FrameViewMut};
pub use window::{run_windowed, PixelsPresenter};
