//! Persistent settings for partbox.
//!
//! Settings are kept between runs as a plain `key value` snapshot written on
//! exit, and can also be exported to and imported from JSON.

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_ANGPIX, DEFAULT_BOX_SIZE, DEFAULT_BRUSH_SIZE, DEFAULT_SOURCE_SIZE};
use crate::model::{BoxSize, ImageCalibration, ModelError};

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Get the name used in settings files.
    pub fn name(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Current settings file format version.
/// Increment this when making breaking changes to the JSON layout.
pub const SETTINGS_VERSION: u32 = 1;

/// Last-used calibration and tool state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Version of the settings format
    pub version: u32,

    /// Source raster width in pixels
    #[serde(default = "default_source_size")]
    pub source_width: u32,

    /// Source raster height in pixels
    #[serde(default = "default_source_size")]
    pub source_height: u32,

    /// Ångström per source pixel
    #[serde(default = "default_angpix")]
    pub angpix: f64,

    /// Erase brush side length in preview pixels
    #[serde(default = "default_brush_size")]
    pub brush_size: u32,

    /// Box size for images that have no box file yet
    #[serde(default = "default_box_size")]
    pub box_size: u32,

    /// Base name of the image open when the settings were saved
    #[serde(default)]
    pub last_image: Option<String>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_source_size() -> u32 {
    DEFAULT_SOURCE_SIZE
}

fn default_angpix() -> f64 {
    DEFAULT_ANGPIX
}

fn default_brush_size() -> u32 {
    DEFAULT_BRUSH_SIZE
}

fn default_box_size() -> u32 {
    DEFAULT_BOX_SIZE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            source_width: default_source_size(),
            source_height: default_source_size(),
            angpix: default_angpix(),
            brush_size: default_brush_size(),
            box_size: default_box_size(),
            last_image: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Calibration for a preview of the given size using the stored source dimensions.
    pub fn calibration(&self, preview_width: u32, preview_height: u32) -> Result<ImageCalibration, ModelError> {
        ImageCalibration::new(
            i64::from(self.source_width),
            i64::from(self.source_height),
            i64::from(preview_width),
            i64::from(preview_height),
        )
    }

    /// The stored default box size, falling back to the built-in default if it is invalid.
    pub fn default_box_size(&self) -> BoxSize {
        BoxSize::new(i64::from(self.box_size)).unwrap_or_else(|e| {
            log::warn!("{}; using {}", e, BoxSize::DEFAULT);
            BoxSize::DEFAULT
        })
    }

    /// Parse a `key value` snapshot.
    ///
    /// Lines whose first token contains `#` are comments. Unknown keys are
    /// ignored; values that fail to parse are logged and left at their default.
    pub fn from_snapshot(text: &str) -> Self {
        let mut settings = Self::default();

        for line in text.lines() {
            let mut tokens = line.split_whitespace();
            let Some(key) = tokens.next() else {
                continue;
            };
            if key.contains('#') {
                continue;
            }
            let Some(value) = tokens.next() else {
                log::warn!("Settings key '{}' has no value", key);
                continue;
            };

            let applied = match key {
                "mrc_pixel_size_x" => parse_into(value, &mut settings.source_width),
                "mrc_pixel_size_y" => parse_into(value, &mut settings.source_height),
                "angpix" => parse_into(value, &mut settings.angpix),
                "brush_size" => parse_into(value, &mut settings.brush_size),
                "box_size" => parse_into(value, &mut settings.box_size),
                "log_level" => parse_into(value, &mut settings.log_level),
                "img_on_save" => {
                    settings.last_image = Some(value.to_string());
                    true
                }
                other => {
                    log::debug!("Ignoring unknown settings key '{}'", other);
                    true
                }
            };
            if !applied {
                log::warn!("Invalid value '{}' for settings key '{}', keeping default", value, key);
            }
        }

        settings
    }

    /// Render as a `key value` snapshot.
    pub fn to_snapshot(&self) -> String {
        let mut out = String::from("## Last used settings for partbox\n");
        out.push_str(&format!("mrc_pixel_size_x {}\n", self.source_width));
        out.push_str(&format!("mrc_pixel_size_y {}\n", self.source_height));
        out.push_str(&format!("angpix {}\n", self.angpix));
        out.push_str(&format!("brush_size {}\n", self.brush_size));
        out.push_str(&format!("box_size {}\n", self.box_size));
        out.push_str(&format!("log_level {}\n", self.log_level.name()));
        if let Some(image) = &self.last_image {
            out.push_str(&format!("img_on_save {}\n", image));
        }
        out
    }

    /// Load a snapshot file. A missing file yields the defaults.
    pub fn load_snapshot(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No settings file found at {:?}", path);
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        log::info!("Loaded settings from {:?}", path);
        Ok(Self::from_snapshot(&text))
    }

    /// Overwrite the snapshot file at `path`.
    pub fn save_snapshot(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_snapshot())?;
        log::info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Serialize the settings to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize settings from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;

        if settings.version > SETTINGS_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: settings.version,
                supported_version: SETTINGS_VERSION,
            });
        }

        Ok(settings)
    }
}

fn parse_into<T: FromStr>(value: &str, slot: &mut T) -> bool {
    match value.parse() {
        Ok(v) => {
            *slot = v;
            true
        }
        Err(_) => false,
    }
}

/// Errors that can occur when loading settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse settings: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Settings version is newer than supported
    #[error(
        "Settings file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing settings
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
