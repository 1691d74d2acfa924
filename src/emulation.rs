// Emulation core seam
//
// The display drives the emulation core once per tick. On rendered ticks the
// core receives a view of the visible frame region to draw into; on skipped
// ticks it receives `None` and only advances its state.

use crate::display::{FrameViewMut, SNES_HEIGHT, SNES_WIDTH};

/// Something that produces one emulated frame per tick
pub trait EmulationCore {
    /// Advance one frame, drawing into `frame` when it is provided
    fn run_frame(&mut self, frame: Option<FrameViewMut<'_>>);

    /// Size of the picture produced by the last rendered frame
    fn frame_size(&self) -> (usize, usize) {
        (SNES_WIDTH, SNES_HEIGHT)
    }
}

/// Colour bars used by the test pattern, left to right
const BARS: [[u8; 3]; 8] = [
    [0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0x00],
    [0x00, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00],
    [0xFF, 0x00, 0xFF],
    [0xFF, 0x00, 0x00],
    [0x00, 0x00, 0xFF],
    [0x00, 0x00, 0x00],
];

/// Demo core that draws scrolling colour bars over a gradient
///
/// Stands in for a real emulator when running the frontend on its own.
#[derive(Debug, Default)]
pub struct TestPatternCore {
    frame: u64,
    drawn: u64,
}

impl TestPatternCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames emulated, rendered or not
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Frames actually drawn
    pub fn drawn_count(&self) -> u64 {
        self.drawn
    }

    fn draw(&self, frame: &mut FrameViewMut<'_>) {
        let width = frame.width();
        let height = frame.height();
        let bar_width = (width / BARS.len()).max(1);
        let offset = self.frame as usize;
        let bars_end = height * 3 / 4;

        for y in 0..height {
            for x in 0..width {
                let rgb = if y < bars_end {
                    BARS[((x + offset) / bar_width) % BARS.len()]
                } else {
                    // Horizontal grey ramp
                    let level = (x * 256 / width) as u8;
                    [level, level, level]
                };
                frame.set_rgb(x, y, rgb);
            }
        }
    }
}

impl EmulationCore for TestPatternCore {
    fn run_frame(&mut self, frame: Option<FrameViewMut<'_>>) {
        if let Some(mut frame) = frame {
            self.draw(&mut frame);
            self.drawn += 1;
        }
        self.frame += 1;
    }
}
