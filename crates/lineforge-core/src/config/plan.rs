//! Typed per-run snapshot of the stage settings.
//!
//! The TOML config keeps enumerations as strings; `RunPlan::from_config`
//! parses and clamps them once, before any external tool runs.

use std::str::FromStr;

use crate::error::{PipelineError, PipelineResult};
use crate::types::StageKind;

use super::Config;

/// Final preprocessing treatment, as named in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishMode {
    None,
    Threshold,
    Quantize,
}

impl FromStr for FinishMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "threshold" => Ok(Self::Threshold),
            "quantize" => Ok(Self::Quantize),
            _ => Err(PipelineError::InvalidParameter {
                name: "preprocess.finish_mode",
                value: s.to_string(),
                expected: "none, threshold or quantize",
            }),
        }
    }
}

/// Resolved finish treatment with its clamped argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Finish {
    None,
    /// Two-tone cut at this percentage
    Threshold { percent: u8 },
    /// Grayscale palette of this many levels, no dithering
    Quantize { levels: u16 },
}

/// Canvas fill for the pad stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    White,
    Black,
    Transparent,
}

impl Background {
    /// RGBA fill. Transparent only survives in PNG output.
    pub fn rgba(self) -> [u8; 4] {
        match self {
            Self::White => [255, 255, 255, 255],
            Self::Black => [0, 0, 0, 255],
            Self::Transparent => [0, 0, 0, 0],
        }
    }
}

impl FromStr for Background {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "white" => Ok(Self::White),
            "black" => Ok(Self::Black),
            "transparent" => Ok(Self::Transparent),
            _ => Err(PipelineError::InvalidParameter {
                name: "pad.background",
                value: s.to_string(),
                expected: "white, black or transparent",
            }),
        }
    }
}

/// Output format of the pad stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadFormat {
    Png,
    Jpg,
}

impl PadFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
        }
    }
}

impl FromStr for PadFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpg),
            _ => Err(PipelineError::InvalidParameter {
                name: "pad.format",
                value: s.to_string(),
                expected: "png or jpg",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessParams {
    pub grayscale: bool,
    pub auto_level: bool,
    /// Black and white clip percentages when contrast stretch is on
    pub contrast_stretch: Option<(f32, f32)>,
    pub median: u32,
    pub blur: f32,
    pub negate: bool,
    pub finish: Finish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadParams {
    pub size: u32,
    pub background: Background,
    pub format: PadFormat,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceParams {
    pub cutoff_percent: u8,
    pub invert: bool,
    pub speck_size: u32,
    pub smooth: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportParams {
    pub width: u32,
    pub area_drawing: bool,
}

/// Immutable snapshot of everything one run needs. `None` marks a disabled stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub recursive: bool,
    pub icons: bool,
    pub workers: usize,
    pub preprocess: Option<PreprocessParams>,
    pub pad: Option<PadParams>,
    pub trace: Option<TraceParams>,
    pub export: Option<ExportParams>,
}

fn clamp_percent(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}

impl RunPlan {
    /// Parse and clamp the stage settings of `config`.
    ///
    /// Settings of disabled stages are still checked so a bad value never
    /// hides until the stage is switched on.
    pub fn from_config(config: &Config) -> PipelineResult<Self> {
        let pre = &config.preprocess;
        let finish = match pre.finish_mode.parse::<FinishMode>()? {
            FinishMode::None => Finish::None,
            FinishMode::Threshold => Finish::Threshold {
                percent: clamp_percent(pre.threshold_percent),
            },
            FinishMode::Quantize => Finish::Quantize {
                levels: pre.quantize_levels.clamp(2, 256) as u16,
            },
        };
        let preprocess = PreprocessParams {
            grayscale: pre.grayscale,
            auto_level: pre.auto_level,
            contrast_stretch: pre
                .contrast_stretch
                .then_some((pre.black_clip, pre.white_clip)),
            median: pre.median,
            blur: pre.blur.max(0.0),
            negate: pre.negate,
            finish,
        };

        let pad = PadParams {
            size: config.pad.size.max(1),
            background: config.pad.background.parse()?,
            format: config.pad.format.parse()?,
            jpeg_quality: config.pad.jpeg_quality.clamp(1, 100),
        };

        let trace = TraceParams {
            cutoff_percent: clamp_percent(config.trace.cutoff_percent),
            invert: config.trace.invert,
            speck_size: config.trace.speck_size,
            smooth: config.trace.smooth,
        };

        let export = ExportParams {
            width: config.export.width.max(1),
            area_drawing: config.export.area_drawing,
        };

        Ok(Self {
            recursive: config.input.recursive,
            icons: config.input.icons,
            workers: config.pipeline.workers.max(1),
            preprocess: pre.enabled.then_some(preprocess),
            pad: config.pad.enabled.then_some(pad),
            trace: config.trace.enabled.then_some(trace),
            export: config.export.enabled.then_some(export),
        })
    }

    pub fn is_enabled(&self, stage: StageKind) -> bool {
        match stage {
            StageKind::Preprocess => self.preprocess.is_some(),
            StageKind::Pad => self.pad.is_some(),
            StageKind::Trace => self.trace.is_some(),
            StageKind::Export => self.export.is_some(),
        }
    }

    /// Extension written by `stage` under this plan.
    pub fn output_extension(&self, stage: StageKind) -> &'static str {
        match stage {
            StageKind::Preprocess | StageKind::Export => "png",
            StageKind::Pad => self.pad.map_or("png", |p| p.format.extension()),
            StageKind::Trace => "svg",
        }
    }
}
