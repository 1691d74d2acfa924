// Format converter - Internal frame buffer to host surface
//
// Converts the emulated RGB565 picture into the presenter's pixel format and
// replicates each pixel `scale` times in both directions (nearest neighbour).
// Source and destination strides are honoured independently.

use super::view::{FrameView, FrameViewMut};
use crate::error::DisplayError;

/// Pixel-format converter with integer upscaling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatConverter {
    scale: usize,
}

impl FormatConverter {
    /// Create a converter for an integer scale (minimum 1)
    pub fn new(scale: usize) -> Self {
        Self {
            scale: scale.max(1),
        }
    }

    pub fn scale(&self) -> usize {
        self.scale
    }

    /// Check that a `width`×`height` region fits both sides
    pub fn check_bounds(
        &self,
        src: &FrameView<'_>,
        dst: &FrameViewMut<'_>,
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError> {
        if width > src.width() || height > src.height() {
            return Err(DisplayError::ConversionBoundsViolation(format!(
                "{}x{} exceeds source {}x{}",
                width,
                height,
                src.width(),
                src.height()
            )));
        }

        let scaled_width = width.checked_mul(self.scale);
        let scaled_height = height.checked_mul(self.scale);
        match (scaled_width, scaled_height) {
            (Some(w), Some(h)) if w <= dst.width() && h <= dst.height() => Ok(()),
            _ => Err(DisplayError::ConversionBoundsViolation(format!(
                "{}x{} at {}x exceeds destination {}x{}",
                width,
                height,
                self.scale,
                dst.width(),
                dst.height()
            ))),
        }
    }

    /// Convert a `width`×`height` region of `src` into the top-left of `dst`
    ///
    /// Mismatched dimensions are a caller defect: debug builds panic, release
    /// builds return `ConversionBoundsViolation` without touching `dst`.
    pub fn convert(
        &self,
        src: &FrameView<'_>,
        dst: &mut FrameViewMut<'_>,
        width: usize,
        height: usize,
    ) -> Result<(), DisplayError> {
        if let Err(e) = self.check_bounds(src, dst, width, height) {
            if cfg!(debug_assertions) {
                panic!("{}", e);
            }
            return Err(e);
        }

        let scale = self.scale;
        let src_format = src.format();
        let dst_format = dst.format();
        let src_bpp = src_format.bytes_per_pixel();
        let dst_bpp = dst_format.bytes_per_pixel();
        let out_len = width * scale * dst_bpp;

        for y in 0..height {
            let src_row = &src.row(y)[..width * src_bpp];
            let dst_y = y * scale;
            let dst_row = &mut dst.row_mut(dst_y)[..out_len];

            if src_format == dst_format && scale == 1 {
                dst_row.copy_from_slice(src_row);
            } else if src_format == dst_format {
                for (px, out) in src_row
                    .chunks_exact(src_bpp)
                    .zip(dst_row.chunks_exact_mut(dst_bpp * scale))
                {
                    for copy in out.chunks_exact_mut(dst_bpp) {
                        copy.copy_from_slice(px);
                    }
                }
            } else {
                for (px, out) in src_row
                    .chunks_exact(src_bpp)
                    .zip(dst_row.chunks_exact_mut(dst_bpp * scale))
                {
                    let rgb = src_format.decode(px);
                    for copy in out.chunks_exact_mut(dst_bpp) {
                        dst_format.encode(rgb, copy);
                    }
                }
            }

            for extra in 1..scale {
                dst.copy_row_within(dst_y, dst_y + extra);
            }
        }

        Ok(())
    }
}

impl Default for FormatConverter {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{PixelFormat, PresentationSurface};

    fn source(width: usize, height: usize, stride: usize) -> Vec<u8> {
        let mut data = vec![0u8; stride * height];
        let mut view = FrameViewMut::new(&mut data, width, height, stride, PixelFormat::Rgb565);
        for y in 0..height {
            for x in 0..width {
                view.set_rgb(x, y, [(x * 8) as u8, (y * 4) as u8, 0xF8]);
            }
        }
        data
    }

    #[test]
    fn test_rgb565_to_rgba8888() {
        let data = source(4, 3, 32);
        let src = FrameView::new(&data, 4, 3, 32, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(4, 3, PixelFormat::Rgba8888).unwrap();

        FormatConverter::new(1)
            .convert(&src, &mut surface.view_mut(), 4, 3)
            .unwrap();

        for y in 0..3 {
            for x in 0..4 {
                let expected = PixelFormat::Rgb565.decode(src.pixel(x, y));
                assert_eq!(surface.rgb_at(x, y), expected);
                assert_eq!(surface.view().pixel(x, y)[3], 0xFF);
            }
        }
    }

    #[test]
    fn test_same_format_copies_with_stride() {
        let data = source(4, 2, 20);
        let src = FrameView::new(&data, 4, 2, 20, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(4, 2, PixelFormat::Rgb565).unwrap();

        FormatConverter::new(1)
            .convert(&src, &mut surface.view_mut(), 4, 2)
            .unwrap();

        assert_eq!(surface.view().row(0), src.row(0));
        assert_eq!(surface.view().row(1), src.row(1));
    }

    #[test]
    fn test_integer_scaling_replicates_pixels() {
        let data = source(2, 2, 4);
        let src = FrameView::new(&data, 2, 2, 4, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(6, 6, PixelFormat::Rgba8888).unwrap();

        FormatConverter::new(3)
            .convert(&src, &mut surface.view_mut(), 2, 2)
            .unwrap();

        for y in 0..6 {
            for x in 0..6 {
                let expected = PixelFormat::Rgb565.decode(src.pixel(x / 3, y / 3));
                assert_eq!(surface.rgb_at(x, y), expected, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_scaling_same_format() {
        let data = source(2, 1, 4);
        let src = FrameView::new(&data, 2, 1, 4, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(4, 2, PixelFormat::Rgb565).unwrap();

        FormatConverter::new(2)
            .convert(&src, &mut surface.view_mut(), 2, 1)
            .unwrap();

        assert_eq!(surface.view().pixel(1, 1), src.pixel(0, 0));
        assert_eq!(surface.view().pixel(3, 0), src.pixel(1, 0));
    }

    #[test]
    fn test_partial_region_leaves_rest_untouched() {
        let data = source(4, 4, 8);
        let src = FrameView::new(&data, 4, 4, 8, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(4, 4, PixelFormat::Rgba8888).unwrap();

        FormatConverter::new(1)
            .convert(&src, &mut surface.view_mut(), 2, 2)
            .unwrap();

        assert_eq!(surface.view().pixel(3, 3), &[0, 0, 0, 0]);
        assert_eq!(surface.view().pixel(2, 0), &[0, 0, 0, 0]);
        assert_eq!(surface.view().pixel(1, 1)[3], 0xFF);
    }

    #[test]
    fn test_bounds_check() {
        let data = source(4, 4, 8);
        let src = FrameView::new(&data, 4, 4, 8, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(6, 6, PixelFormat::Rgba8888).unwrap();
        let dst = surface.view_mut();
        let converter = FormatConverter::new(2);

        assert!(converter.check_bounds(&src, &dst, 3, 3).is_ok());
        assert!(converter.check_bounds(&src, &dst, 4, 3).is_err());
        assert!(converter.check_bounds(&src, &dst, 5, 1).is_err());
        assert!(converter.check_bounds(&src, &dst, usize::MAX, 0).is_err());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "exceeds destination"))]
    fn test_convert_rejects_oversized_region() {
        let data = source(4, 4, 8);
        let src = FrameView::new(&data, 4, 4, 8, PixelFormat::Rgb565);
        let mut surface = PresentationSurface::new(4, 4, PixelFormat::Rgba8888).unwrap();

        let result = FormatConverter::new(2).convert(&src, &mut surface.view_mut(), 4, 4);
        assert!(matches!(
            result,
            Err(DisplayError::ConversionBoundsViolation(_))
        ));
        assert!(surface.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_scale_minimum() {
        assert_eq!(FormatConverter::new(0).scale(), 1);
    }
}
