// Configuration management
//
// Handles display configuration: output scale, emulated TV region, frame-skip
// policy, fullscreen, and screenshot settings. Persisted as TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::display::PixelFormat;

/// Default configuration file path
pub const CONFIG_FILE: &str = "display_config.toml";

/// Smallest accepted output scale
pub const MIN_SCALE: u32 = 1;

/// Largest accepted output scale
pub const MAX_SCALE: u32 = 8;

/// NTSC frame interval (~60.0 Hz)
pub const NTSC_FRAME_TIME: Duration = Duration::from_micros(16_667);

/// PAL frame interval (50 Hz)
pub const PAL_FRAME_TIME: Duration = Duration::from_micros(20_000);

/// Display configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Screenshot settings
    pub screenshot: ScreenshotConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Output resolution multiple (1-8)
    pub scale: u32,

    /// Emulated TV standard, selects the target frame interval
    pub region: Region,

    /// Frame-skip policy
    pub skip_policy: SkipPolicy,

    /// Enable fullscreen (affects only the presenter's surface mode)
    pub fullscreen: bool,

    /// Surface format used by the headless presenter
    pub surface_format: PixelFormat,
}

/// Screenshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenshotConfig {
    /// Screenshot directory
    pub screenshot_directory: PathBuf,

    /// Include timestamp in filename
    pub include_timestamp: bool,
}

/// Emulated display standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// 60 Hz
    Ntsc,

    /// 50 Hz
    Pal,
}

impl Region {
    /// Target wall-clock interval between emulated frames
    pub fn frame_interval(self) -> Duration {
        match self {
            Region::Ntsc => NTSC_FRAME_TIME,
            Region::Pal => PAL_FRAME_TIME,
        }
    }
}

impl std::str::FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ntsc" => Ok(Region::Ntsc),
            "pal" => Ok(Region::Pal),
            other => Err(format!("unknown region '{}', expected ntsc or pal", other)),
        }
    }
}

/// Frame-skip policy
///
/// `Fixed(n)` skips `n` frames between each rendered frame. `Auto` renders
/// every frame while the host keeps up and throttles rendering when it falls
/// behind schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkipPolicy {
    /// Rate-adaptive
    Auto,

    /// Skip a fixed number of frames between renders
    Fixed(u32),
}

impl std::str::FromStr for SkipPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(SkipPolicy::Auto);
        }
        s.parse::<u32>()
            .map(SkipPolicy::Fixed)
            .map_err(|_| format!("invalid frame skip '{}', expected auto or a count", s))
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        VideoConfig {
            scale: 2,
            region: Region::Ntsc,
            skip_policy: SkipPolicy::Auto,
            fullscreen: false,
            surface_format: PixelFormat::Rgba8888,
        }
    }
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        ScreenshotConfig {
            screenshot_directory: PathBuf::from("screenshots"),
            include_timestamp: true,
        }
    }
}

impl DisplayConfig {
    /// Load configuration from file or create default
    ///
    /// If the configuration file doesn't exist, a default configuration is
    /// written to `path` and returned. A file that exists but can't be read
    /// or parsed is left untouched and the defaults are used for this run.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    ///
    /// The loaded (sanitized) configuration, or the defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::info!(
                    "No display configuration at {}, writing defaults",
                    path.display()
                );
                let config = Self::default();
                // Try to save the default config, but don't fail if we can't
                if let Err(e) = config.save(path) {
                    log::warn!("Could not write {}: {}", path.display(), e);
                }
                config
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable display configuration {}: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(config.sanitized())
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }

    /// Clamp out-of-range values into their accepted ranges
    pub fn sanitized(mut self) -> Self {
        self.video.scale = self.video.scale.clamp(MIN_SCALE, MAX_SCALE);
        self
    }

    /// Set the output scale (clamped to 1-8)
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.video.scale = scale.clamp(MIN_SCALE, MAX_SCALE);
        self
    }

    /// Set the emulated region
    pub fn with_region(mut self, region: Region) -> Self {
        self.video.region = region;
        self
    }

    /// Set the frame-skip policy
    pub fn with_skip_policy(mut self, skip_policy: SkipPolicy) -> Self {
        self.video.skip_policy = skip_policy;
        self
    }

    /// Enable or disable fullscreen
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.video.fullscreen = fullscreen;
        self
    }

    /// Set the headless surface format
    pub fn with_surface_format(mut self, format: PixelFormat) -> Self {
        self.video.surface_format = format;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();
        assert_eq!(config.video.scale, 2);
        assert_eq!(config.video.region, Region::Ntsc);
        assert_eq!(config.video.skip_policy, SkipPolicy::Auto);
        assert!(!config.video.fullscreen);
        assert!(config.screenshot.include_timestamp);
    }

    #[test]
    fn test_region_intervals() {
        assert_eq!(Region::Ntsc.frame_interval().as_micros(), 16_667);
        assert_eq!(Region::Pal.frame_interval().as_micros(), 20_000);
    }

    #[test]
    fn test_scale_clamping() {
        let config = DisplayConfig::default().with_scale(100);
        assert_eq!(config.video.scale, 8);

        let config = DisplayConfig::default().with_scale(0);
        assert_eq!(config.video.scale, 1);
    }

    #[test]
    fn test_parse_cli_values() {
        assert_eq!("PAL".parse::<Region>(), Ok(Region::Pal));
        assert!("secam".parse::<Region>().is_err());
        assert_eq!("auto".parse::<SkipPolicy>(), Ok(SkipPolicy::Auto));
        assert_eq!("3".parse::<SkipPolicy>(), Ok(SkipPolicy::Fixed(3)));
        assert!("-1".parse::<SkipPolicy>().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = DisplayConfig::default()
            .with_region(Region::Pal)
            .with_skip_policy(SkipPolicy::Fixed(2));
        let toml_str = toml::to_string(&config).expect("Failed to serialize");
        let deserialized: DisplayConfig = toml::from_str(&toml_str).expect("Failed to parse");

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: DisplayConfig = toml::from_str(
            r#"
            [video]
            scale = 4
            skip_policy = { fixed = 1 }
            "#,
        )
        .expect("Failed to parse");

        assert_eq!(config.video.scale, 4);
        assert_eq!(config.video.skip_policy, SkipPolicy::Fixed(1));
        assert_eq!(config.video.region, Region::Ntsc);
        assert_eq!(
            config.screenshot.screenshot_directory,
            PathBuf::from("screenshots")
        );
    }

    #[test]
    fn test_load_clamps_scale() {
        let path = std::env::temp_dir().join(format!(
            "emu_present_config_clamp_{}.toml",
            std::process::id()
        ));
        fs::write(&path, "[video]\nscale = 40\n").expect("Failed to write config");

        let config = DisplayConfig::load(&path).expect("Failed to load config");
        assert_eq!(config.video.scale, MAX_SCALE);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_or_default_writes_defaults() {
        let path = std::env::temp_dir().join(format!(
            "emu_present_config_default_{}.toml",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        let config = DisplayConfig::load_or_default(&path);
        assert_eq!(config, DisplayConfig::default());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_or_default_keeps_malformed_file() {
        let path = std::env::temp_dir().join(format!(
            "emu_present_config_malformed_{}.toml",
            std::process::id()
        ));
        let contents = "[video]\nscale = 3\nregion = \"pal\"\nskip_policy = \"sometimes\"\n";
        fs::write(&path, contents).expect("Failed to write config");

        let config = DisplayConfig::load_or_default(&path);
        assert_eq!(config, DisplayConfig::default());

        let after = fs::read_to_string(&path).expect("Failed to read config");
        assert_eq!(after, contents);

        let _ = fs::remove_file(&path);
    }
}
