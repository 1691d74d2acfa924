// Pixel buffer - Storage for the emulated frame
//
// The emulation core renders 16-bit RGB565 pixels into a buffer that is
// larger than the visible picture: rows are twice as wide as needed so that
// 2x filters can upsample in place, and two padding rows sit above and below
// the visible region for filters that sample neighbouring lines.
//
// Layout (per scale step):
//
//   row 0..2                 padding above
//   row 2..2+height          visible region, origin at column 0
//   row 2+height..+2         padding below

use serde::{Deserialize, Serialize};

use super::view::{FrameView, FrameViewMut};
use crate::error::DisplayError;

/// Emulated screen width in pixels
pub const SNES_WIDTH: usize = 256;

/// Emulated screen height in pixels (normal)
pub const SNES_HEIGHT: usize = 224;

/// Emulated screen height in pixels (overscan)
pub const SNES_HEIGHT_EXTENDED: usize = 239;

/// Padding rows above the visible region (per scale step)
pub const PADDING_ROWS_ABOVE: usize = 2;

/// Padding rows below the visible region (per scale step)
pub const PADDING_ROWS_BELOW: usize = 2;

/// Row width multiplier reserved for 2x upsampling filters
pub const FILTER_HEADROOM: usize = 2;

/// Pixel formats understood by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 16-bit 5:6:5, little-endian
    Rgb565,

    /// 32-bit R, G, B, A bytes
    Rgba8888,
}

impl PixelFormat {
    /// Size of one pixel in bytes
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
            PixelFormat::Rgba8888 => 4,
        }
    }

    /// Bits per pixel
    pub const fn depth(self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    /// Expand one pixel to 8-bit RGB
    #[inline]
    pub fn decode(self, px: &[u8]) -> [u8; 3] {
        match self {
            PixelFormat::Rgb565 => rgb565_to_rgb888(u16::from_le_bytes([px[0], px[1]])),
            PixelFormat::Rgba8888 => [px[0], px[1], px[2]],
        }
    }

    /// Store 8-bit RGB as one pixel of this format
    #[inline]
    pub fn encode(self, rgb: [u8; 3], px: &mut [u8]) {
        match self {
            PixelFormat::Rgb565 => px[..2].copy_from_slice(&rgb888_to_rgb565(rgb).to_le_bytes()),
            PixelFormat::Rgba8888 => px[..4].copy_from_slice(&[rgb[0], rgb[1], rgb[2], 0xFF]),
        }
    }
}

/// Pack 8-bit RGB into RGB565
#[inline]
pub fn rgb888_to_rgb565(rgb: [u8; 3]) -> u16 {
    ((rgb[0] as u16 >> 3) << 11) | ((rgb[1] as u16 >> 2) << 5) | (rgb[2] as u16 >> 3)
}

/// Expand RGB565 to 8-bit RGB, replicating high bits into the low bits
#[inline]
pub fn rgb565_to_rgb888(px: u16) -> [u8; 3] {
    let r = ((px >> 11) & 0x1F) as u8;
    let g = ((px >> 5) & 0x3F) as u8;
    let b = (px & 0x1F) as u8;
    [
        (r << 3) | (r >> 2),
        (g << 2) | (g >> 4),
        (b << 3) | (b >> 2),
    ]
}

/// Emulated-frame pixel storage
///
/// Owned by [`PixelBufferManager`]; other components only ever see a
/// [`FrameView`]/[`FrameViewMut`] of the visible region.
#[derive(Debug)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
    padding_above: usize,
    padding_below: usize,
}

impl PixelBuffer {
    /// Allocate a zeroed buffer for a `width`×`height` picture at `scale`
    fn allocate(
        width: usize,
        height: usize,
        scale: usize,
        format: PixelFormat,
    ) -> Result<Self, DisplayError> {
        let scale = scale.max(1);
        let Some((stride, bytes)) = Self::geometry(width, height, scale, format) else {
            return Err(DisplayError::AllocationFailure {
                what: "pixel buffer",
                bytes: usize::MAX,
            });
        };
        let padding_above = PADDING_ROWS_ABOVE * scale;
        let padding_below = PADDING_ROWS_BELOW * scale;

        let mut data = Vec::new();
        data.try_reserve_exact(bytes)
            .map_err(|_| DisplayError::AllocationFailure {
                what: "pixel buffer",
                bytes,
            })?;
        data.resize(bytes, 0);

        Ok(Self {
            data,
            width,
            height,
            stride,
            format,
            padding_above,
            padding_below,
        })
    }

    /// Row stride and total size in bytes, or `None` if either overflows
    fn geometry(
        width: usize,
        height: usize,
        scale: usize,
        format: PixelFormat,
    ) -> Option<(usize, usize)> {
        let stride = width
            .checked_mul(format.bytes_per_pixel() * FILTER_HEADROOM)?
            .checked_mul(scale)?;
        let padding_rows = (PADDING_ROWS_ABOVE + PADDING_ROWS_BELOW).checked_mul(scale)?;
        let rows = height.checked_mul(scale)?.checked_add(padding_rows)?;
        Some((stride, stride.checked_mul(rows)?))
    }

    /// Visible width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Visible height in pixels
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

    /// Padding rows above the visible region
    pub fn padding_above(&self) -> usize {
        self.padding_above
    }

    /// Padding rows below the visible region
    pub fn padding_below(&self) -> usize {
        self.padding_below
    }

    /// Total allocation in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte offset of the visible-region origin from the buffer start
    pub fn origin(&self) -> usize {
        self.padding_above * self.stride
    }

    /// Read-only view of the visible region
    pub fn view(&self) -> FrameView<'_> {
        FrameView::new(
            &self.data[self.origin()..],
            self.width,
            self.height,
            self.stride,
            self.format,
        )
    }

    /// Writable view of the visible region
    pub fn view_mut(&mut self) -> FrameViewMut<'_> {
        let origin = self.origin();
        FrameViewMut::new(
            &mut self.data[origin..],
            self.width,
            self.height,
            self.stride,
            self.format,
        )
    }

    /// Zero the whole allocation, padding included
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Entire allocation, padding included
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Owner of the emulated-frame buffer
///
/// `release` is idempotent so teardown can run after a partial initialization.
#[derive(Debug, Default)]
pub struct PixelBufferManager {
    buffer: Option<PixelBuffer>,
    allocations: u64,
    releases: u64,
}

impl PixelBufferManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the frame buffer, replacing (and releasing) any previous one
    ///
    /// # Arguments
    ///
    /// * `width` - Visible width in pixels
    /// * `height` - Visible height in pixels, before scaling
    /// * `scale` - Integer scale applied to rows, padding and stride
    /// * `format` - Pixel format of the buffer
    ///
    /// # Returns
    ///
    /// The new buffer, or `AllocationFailure` if it cannot be sized or reserved
    pub fn allocate(
        &mut self,
        width: usize,
        height: usize,
        scale: usize,
        format: PixelFormat,
    ) -> Result<&mut PixelBuffer, DisplayError> {
        self.release();

        let buffer = PixelBuffer::allocate(width, height, scale, format)?;
        log::debug!(
            "Allocated pixel buffer: {}x{} {:?}, stride {}, {} bytes",
            width,
            height,
            format,
            buffer.stride(),
            buffer.len()
        );

        self.allocations += 1;
        Ok(self.buffer.insert(buffer))
    }

    /// Free the frame buffer. No-op when nothing is allocated.
    pub fn release(&mut self) {
        if self.buffer.take().is_some() {
            self.releases += 1;
            log::debug!("Released pixel buffer");
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut PixelBuffer> {
        self.buffer.as_mut()
    }

    /// Number of successful allocations
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Number of buffers actually freed
    pub fn release_count(&self) -> u64 {
        self.releases
    }
}
