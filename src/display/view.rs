// Borrowed pixel views
//
// A view is the (slice, stride, format) triple lent to the emulation core for
// writing and to the converter for reading. Views never own their pixels and
// never outlive the tick that borrowed them.

use super::buffer::PixelFormat;

/// Read-only view of a pixel region
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
}

/// Writable view of a pixel region
#[derive(Debug)]
pub struct FrameViewMut<'a> {
    data: &'a mut [u8],
    width: usize,
    height: usize,
    stride: usize,
    format: PixelFormat,
}

/// Bytes a region of `height` rows needs when the last row holds only `width` pixels
#[inline]
fn required_len(width: usize, height: usize, stride: usize, format: PixelFormat) -> usize {
    if height == 0 {
        0
    } else {
        (height - 1) * stride + width * format.bytes_per_pixel()
    }
}

impl<'a> FrameView<'a> {
    /// Wrap a slice as a view
    ///
    /// # Panics
    /// Panics if the stride is narrower than a row or the slice is too short
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        assert!(
            stride >= width * format.bytes_per_pixel(),
            "Stride {} narrower than a {}-pixel row",
            stride,
            width
        );
        assert!(
            data.len() >= required_len(width, height, stride, format),
            "View slice too short for {}x{}",
            width,
            height
        );
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
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

    /// The visible bytes of row `y`
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        let start = y * self.stride;
        &self.data[start..start + self.width * self.format.bytes_per_pixel()]
    }

    /// Raw bytes of pixel (x, y)
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &'a [u8] {
        let bpp = self.format.bytes_per_pixel();
        &self.row(y)[x * bpp..(x + 1) * bpp]
    }
}

impl<'a> FrameViewMut<'a> {
    /// Wrap a mutable slice as a view
    ///
    /// # Panics
    /// Panics if the stride is narrower than a row or the slice is too short
    pub fn new(
        data: &'a mut [u8],
        width: usize,
        height: usize,
        stride: usize,
        format: PixelFormat,
    ) -> Self {
        assert!(
            stride >= width * format.bytes_per_pixel(),
            "Stride {} narrower than a {}-pixel row",
            stride,
            width
        );
        assert!(
            data.len() >= required_len(width, height, stride, format),
            "View slice too short for {}x{}",
            width,
            height
        );
        Self {
            data,
            width,
            height,
            stride,
            format,
        }
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

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> FrameView<'_> {
        FrameView {
            data: &*self.data,
            width: self.width,
            height: self.height,
            stride: self.stride,
            format: self.format,
        }
    }

    /// Mutable visible bytes of row `y`
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [u8] {
        let start = y * self.stride;
        let len = self.width * self.format.bytes_per_pixel();
        &mut self.data[start..start + len]
    }

    /// Copy the visible bytes of row `from` over row `to`
    #[inline]
    pub fn copy_row_within(&mut self, from: usize, to: usize) {
        let len = self.width * self.format.bytes_per_pixel();
        let start = from * self.stride;
        self.data.copy_within(start..start + len, to * self.stride);
    }

    /// Write one pixel from 8-bit RGB components
    ///
    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_rgb(&mut self, x: usize, y: usize, rgb: [u8; 3]) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        let format = self.format;
        let bpp = format.bytes_per_pixel();
        let row = self.row_mut(y);
        format.encode(rgb, &mut row[x * bpp..(x + 1) * bpp]);
    }

    /// Fill the visible region with one colour
    pub fn fill_rgb(&mut self, rgb: [u8; 3]) {
        let format = self.format;
        let bpp = format.bytes_per_pixel();
        for y in 0..self.height {
            for px in self.row_mut(y).chunks_exact_mut(bpp) {
                format.encode(rgb, px);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_respect_stride() {
        let mut data = vec![0u8; 3 * 16];
        let mut view = FrameViewMut::new(&mut data, 4, 3, 16, PixelFormat::Rgb565);

        view.row_mut(1).fill(0xAA);
        assert_eq!(view.as_view().row(1).len(), 8);
        assert!(data[16..24].iter().all(|&b| b == 0xAA));
        // Padding after the visible row is untouched
        assert!(data[24..32].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_copy_row_within() {
        let mut data = vec![0u8; 2 * 8];
        let mut view = FrameViewMut::new(&mut data, 2, 2, 8, PixelFormat::Rgb565);
        view.row_mut(0).copy_from_slice(&[1, 2, 3, 4]);
        view.copy_row_within(0, 1);
        assert_eq!(view.as_view().row(1), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_last_row_may_be_short() {
        let data = vec![0u8; 16 + 8];
        let view = FrameView::new(&data, 4, 2, 16, PixelFormat::Rgb565);
        assert_eq!(view.row(1).len(), 8);
    }

    #[test]
    fn test_set_rgb_encodes_format() {
        let mut data = vec![0u8; 2 * 4];
        let mut view = FrameViewMut::new(&mut data, 2, 1, 8, PixelFormat::Rgba8888);
        view.set_rgb(1, 0, [1, 2, 3]);
        assert_eq!(view.as_view().pixel(1, 0), &[1, 2, 3, 0xFF]);
    }

    #[test]
    #[should_panic(expected = "narrower")]
    fn test_stride_too_small() {
        let data = vec![0u8; 64];
        FrameView::new(&data, 8, 2, 8, PixelFormat::Rgba8888);
    }

    #[test]
    #[should_panic(expected = "too short")]
    fn test_slice_too_short() {
        let data = vec![0u8; 10];
        FrameView::new(&data, 4, 2, 8, PixelFormat::Rgb565);
    }

    #[test]
    #[should_panic]
    fn test_set_rgb_out_of_bounds() {
        let mut data = vec![0u8; 8];
        let mut view = FrameViewMut::new(&mut data, 2, 2, 4, PixelFormat::Rgb565);
        view.set_rgb(2, 0, [0, 0, 0]);
    }
}
