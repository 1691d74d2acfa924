// Display errors
//
// Every failure the presentation pipeline can report. Allocation and device
// failures are fatal to the display; a bounds violation is a caller defect.

use std::fmt;

/// Errors produced by the display pipeline
#[derive(Debug)]
pub enum DisplayError {
    /// A pixel buffer or presentation surface could not be allocated
    AllocationFailure {
        /// Which resource was being allocated
        what: &'static str,
        /// Requested size in bytes
        bytes: usize,
    },

    /// The display device (window, GPU surface) could not be opened
    DeviceInitFailure(String),

    /// The converter was handed dimensions that do not fit its source or destination
    ConversionBoundsViolation(String),

    /// The device failed while presenting a frame
    PresentFailure(String),

    /// A frame was requested before the display was initialized
    NotInitialized,
}

impl DisplayError {
    /// Whether this error must terminate the presentation subsystem
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DisplayError::AllocationFailure { .. } | DisplayError::DeviceInitFailure(_)
        )
    }
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::AllocationFailure { what, bytes } => {
                write!(f, "Failed to allocate {} ({} bytes)", what, bytes)
            }
            DisplayError::DeviceInitFailure(e) => {
                write!(f, "Failed to initialize display device: {}", e)
            }
            DisplayError::ConversionBoundsViolation(e) => {
                write!(f, "Conversion bounds violation: {}", e)
            }
            DisplayError::PresentFailure(e) => write!(f, "Present failed: {}", e),
            DisplayError::NotInitialized => write!(f, "Display is not initialized"),
        }
    }
}

impl std::error::Error for DisplayError {}

impl From<pixels::Error> for DisplayError {
    fn from(e: pixels::Error) -> Self {
        DisplayError::PresentFailure(e.to_string())
    }
}

impl From<winit::error::OsError> for DisplayError {
    fn from(e: winit::error::OsError) -> Self {
        DisplayError::DeviceInitFailure(e.to_string())
    }
}
