// Emulator display core
// Frame pacing and the presentation pipeline that feeds the screen

// Public modules
pub mod config;
pub mod display;
pub mod emulation;
pub mod error;
pub mod timing;

// Re-export main types for convenience
pub use config::{DisplayConfig, Region, ScreenshotConfig, SkipPolicy, VideoConfig};
pub use display::{
    Display, FormatConverter, FrameView, FrameViewMut, HeadlessPresenter, LifecycleState,
    PixelBuffer, PixelBufferManager, PixelFormat, PixelsPresenter, PresentationSurface, Presenter,
};
pub use emulation::{EmulationCore, TestPatternCore};
pub use error::DisplayError;
pub use timing::{Clock, FramePacer, ManualClock, PacingState, RenderDecision, SystemClock};
