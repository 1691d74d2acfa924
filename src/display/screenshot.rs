// Screenshot functionality
//
// Captures the visible presentation surface and saves it as a PNG file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::view::FrameView;
use crate::config::ScreenshotConfig;

/// Highest sequence number tried for untimestamped screenshots
const MAX_SEQUENCE: u32 = 999;

/// Errors that can occur during screenshot operations
#[derive(Debug)]
pub enum ScreenshotError {
    /// I/O error
    Io(io::Error),

    /// PNG encoding error
    PngEncoding(png::EncodingError),

    /// Nothing has been presented yet
    NoFrame,

    /// Every untimestamped file name is already taken
    SequenceFull,
}

impl std::fmt::Display for ScreenshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScreenshotError::Io(e) => write!(f, "I/O error: {}", e),
            ScreenshotError::PngEncoding(e) => write!(f, "PNG encoding error: {}", e),
            ScreenshotError::NoFrame => write!(f, "No frame to capture"),
            ScreenshotError::SequenceFull => write!(f, "No free screenshot number left"),
        }
    }
}

impl std::error::Error for ScreenshotError {}

impl From<io::Error> for ScreenshotError {
    fn from(e: io::Error) -> Self {
        ScreenshotError::Io(e)
    }
}

impl From<png::EncodingError> for ScreenshotError {
    fn from(e: png::EncodingError) -> Self {
        ScreenshotError::PngEncoding(e)
    }
}

/// Save a screenshot of a surface
///
/// Files are named `screenshot_<timestamp>.png` with millisecond precision,
/// or `screenshot.NNN.png` with the first unused sequence number when
/// timestamps are disabled. Existing files are never overwritten.
///
/// # Arguments
///
/// * `surface` - The visible surface to capture
/// * `config` - Screenshot directory and naming settings
///
/// # Returns
///
/// Result containing the path to the saved screenshot or an error
pub fn save_screenshot(
    surface: &FrameView<'_>,
    config: &ScreenshotConfig,
) -> Result<PathBuf, ScreenshotError> {
    fs::create_dir_all(&config.screenshot_directory)?;

    let file_path = if config.include_timestamp {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
        unused_timestamp_path(&config.screenshot_directory, &timestamp.to_string())
    } else {
        next_sequence_path(&config.screenshot_directory)?
    };

    let rgb_data = surface_to_rgb(surface);
    save_png(
        &file_path,
        &rgb_data,
        surface.width() as u32,
        surface.height() as u32,
    )?;

    log::info!("Screenshot saved to {}", file_path.display());
    Ok(file_path)
}

/// `screenshot_<timestamp>.png`, with a `_N` suffix if that name is taken
fn unused_timestamp_path(dir: &Path, timestamp: &str) -> PathBuf {
    let path = dir.join(format!("screenshot_{}.png", timestamp));
    if !path.exists() {
        return path;
    }

    (1u32..)
        .map(|n| dir.join(format!("screenshot_{}_{}.png", timestamp, n)))
        .find(|path| !path.exists())
        .unwrap_or(path)
}

/// First `screenshot.NNN.png` in `dir` that doesn't exist yet
fn next_sequence_path(dir: &Path) -> Result<PathBuf, ScreenshotError> {
    (0..=MAX_SEQUENCE)
        .map(|i| dir.join(format!("screenshot.{:03}.png", i)))
        .find(|path| !path.exists())
        .ok_or(ScreenshotError::SequenceFull)
}

/// Flatten a surface of any format to tightly packed RGB888
fn surface_to_rgb(surface: &FrameView<'_>) -> Vec<u8> {
    let format = surface.format();
    let bpp = format.bytes_per_pixel();
    let mut rgb_data = Vec::with_capacity(surface.width() * surface.height() * 3);

    for y in 0..surface.height() {
        for px in surface.row(y).chunks_exact(bpp) {
            rgb_data.extend_from_slice(&format.decode(px));
        }
    }

    rgb_data
}

/// Save RGB data as a PNG file
fn save_png(path: &Path, data: &[u8], width: u32, height: u32) -> Result<(), ScreenshotError> {
    let file = fs::File::create(path)?;
    let w = io::BufWriter::new(file);

    let mut encoder = png::Encoder::new(w, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);

    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;

    Ok(())
}
