// Timing module - Wall-clock source and frame pacing
//
// This module provides:
// - A `Clock` seam over wall-clock time and sleeping
// - The frame pacer that decides render/skip once per emulated frame

pub mod clock;
pub mod pacer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use pacer::{
    FramePacer, PacingState, PacingStats, RenderDecision, AUTO_SKIP_LIMIT_AHEAD,
    AUTO_SKIP_LIMIT_BEHIND, RESYNC_THRESHOLD,
};
