// Presentation surface - Host-side displayable pixels
//
// Always sized to the base emulated resolution times the configured scale.

use super::buffer::{PixelFormat, SNES_HEIGHT, SNES_WIDTH};
use super::view::{FrameView, FrameViewMut};
use crate::error::DisplayError;

/// Owned displayable surface
#[derive(Debug, Clone)]
pub struct PresentationSurface {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
}

impl PresentationSurface {
    /// Allocate a black surface with tightly packed rows
    pub fn new(width: usize, height: usize, format: PixelFormat) -> Result<Self, DisplayError> {
        let sizes = width
            .checked_mul(format.bytes_per_pixel())
            .and_then(|stride| Some((stride, stride.checked_mul(height)?)));
        let Some((stride, bytes)) = sizes else {
            return Err(DisplayError::AllocationFailure {
                what: "presentation surface",
                bytes: usize::MAX,
            });
        };

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(bytes)
            .map_err(|_| DisplayError::AllocationFailure {
                what: "presentation surface",
                bytes,
            })?;
        pixels.resize(bytes, 0);

        Ok(Self {
            pixels,
            width,
            height,
            stride,
            format,
        })
    }

    /// Surface for the base emulated resolution at `scale`
    pub fn for_scale(scale: usize, format: PixelFormat) -> Result<Self, DisplayError> {
        let width = SNES_WIDTH.saturating_mul(scale);
        let height = SNES_HEIGHT.saturating_mul(scale);
        Self::new(width, height, format)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row pitch in bytes
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(
            &self.pixels,
            self.width,
            self.height,
            self.stride,
            self.format,
        )
    }

    pub fn view_mut(&mut self) -> FrameViewMut<'_> {
        FrameViewMut::new(
            &mut self.pixels,
            self.width,
            self.height,
            self.stride,
            self.format,
        )
    }

    /// Pixel (x, y) expanded to 8-bit RGB
    pub fn rgb_at(&self, x: usize, y: usize) -> [u8; 3] {
        self.format.decode(self.view().pixel(x, y))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}
