//! Sub-configuration structs with defaults matching the stock settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Input discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Descend into subdirectories of an input directory
    pub recursive: bool,

    /// Explode `.ico` containers into frames and rebuild them afterwards
    pub icons: bool,
}

/// Pipeline execution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Files processed concurrently within one stage (1 = strictly sequential)
    pub workers: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

/// Stage A: grayscale/threshold/quantize raster filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub enabled: bool,
    pub grayscale: bool,
    pub auto_level: bool,
    pub contrast_stretch: bool,

    /// Contrast-stretch black clip, percent
    pub black_clip: f32,

    /// Contrast-stretch white clip, percent
    pub white_clip: f32,

    /// Median filter radius (0 = off)
    pub median: u32,

    /// Gaussian blur sigma (0.0 = off)
    pub blur: f32,

    pub negate: bool,

    /// Finish treatment: "none", "threshold" or "quantize"
    pub finish_mode: String,

    /// Threshold cutoff, percent (clamped to 0..=100)
    pub threshold_percent: i32,

    /// Palette size for quantize (clamped to 2..=256)
    pub quantize_levels: i32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            grayscale: true,
            auto_level: true,
            contrast_stretch: true,
            black_clip: 0.5,
            white_clip: 0.5,
            median: 1,
            blur: 0.0,
            negate: false,
            finish_mode: "none".to_string(),
            threshold_percent: 45,
            quantize_levels: 8,
        }
    }
}

/// Stage B: square-canvas padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    pub enabled: bool,

    /// Edge length of the square canvas in pixels
    pub size: u32,

    /// Canvas fill: "white", "black" or "transparent"
    pub background: String,

    /// Output format: "png" or "jpg"
    pub format: String,

    /// JPEG quality (1-100), used when format is jpg
    pub jpeg_quality: u8,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: 512,
            background: "white".to_string(),
            format: "jpg".to_string(),
            jpeg_quality: 95,
        }
    }
}

/// Stage C: raster → SVG tracing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    pub enabled: bool,

    /// Binarization cutoff, percent (clamped to 0..=100)
    pub cutoff_percent: i32,

    /// Negate before thresholding
    pub invert: bool,

    /// Suppress connected components up to this many pixels
    pub speck_size: u32,

    /// Curve-fitted output when true, polygons when false
    pub smooth: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff_percent: 45,
            invert: false,
            speck_size: 8,
            smooth: true,
        }
    }
}

/// Stage D: SVG → PNG export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub enabled: bool,

    /// Output width in pixels (height follows the aspect ratio)
    pub width: u32,

    /// Crop to the drawing's bounding box instead of the page
    pub area_drawing: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            width: 512,
            area_drawing: true,
        }
    }
}

/// External tool locations. Unset entries are looked up on `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// ImageMagick `magick` binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magick: Option<PathBuf>,

    /// `potrace` binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub potrace: Option<PathBuf>,

    /// Inkscape binary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inkscape: Option<PathBuf>,

    /// Directory holding bundled binaries. Defaults to `bin/` next to the executable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bundled_dir: Option<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,

    /// Directory for per-run log files
    pub dir: PathBuf,

    /// Write a per-run log file
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            dir: PathBuf::from("logs"),
            file: true,
        }
    }
}
