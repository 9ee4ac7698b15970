//! Core data types shared by the pipeline stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// One of the four ordered transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Preprocess,
    Pad,
    Trace,
    Export,
}

impl StageKind {
    /// Fixed execution order.
    pub const ORDER: [StageKind; 4] = [Self::Preprocess, Self::Pad, Self::Trace, Self::Export];

    /// Output directory name, relative to the run's output root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Preprocess => "01_preprocessed",
            Self::Pad => "02_padded",
            Self::Trace => "03_svg",
            Self::Export => "04_export_png",
        }
    }

    /// Single-letter tag used in progress output (`[A] Preprocess`).
    pub fn letter(self) -> char {
        match self {
            Self::Preprocess => 'A',
            Self::Pad => 'B',
            Self::Trace => 'C',
            Self::Export => 'D',
        }
    }

    /// Whether this stage writes vector files.
    pub fn emits_vectors(self) -> bool {
        matches!(self, Self::Trace)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Preprocess => "Preprocess",
            Self::Pad => "Pad",
            Self::Trace => "Trace",
            Self::Export => "Export",
        };
        f.write_str(name)
    }
}

/// Classification of a located file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// Ordinary single-frame raster
    Raster,
    /// Multi-frame `.ico` container
    IconContainer,
    /// SVG produced by the trace stage
    Vector,
}

/// A located, classified input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Path to the file
    pub path: PathBuf,

    /// Lowercase extension without the dot
    pub extension: String,

    /// What the file is
    pub kind: ImageKind,
}

impl ImageRef {
    /// Classify a path by its extension. Returns `None` without one.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let extension = path.extension()?.to_str()?.to_lowercase();
        let kind = match extension.as_str() {
            "ico" => ImageKind::IconContainer,
            "svg" => ImageKind::Vector,
            _ => ImageKind::Raster,
        };
        Some(Self {
            path,
            extension,
            kind,
        })
    }

    /// File stem as a string (lossy for non-UTF-8 names).
    pub fn stem(&self) -> String {
        file_stem(&self.path)
    }

    /// File name for progress output.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn is_icon_container(&self) -> bool {
        self.kind == ImageKind::IconContainer
    }
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Frames extracted from one icon container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSet {
    /// The container the frames came from
    pub source: PathBuf,

    /// Container stem; every frame stem starts with `<stem>_frame_`
    pub stem: String,

    /// Extracted frames in index order
    pub frames: Vec<PathBuf>,
}

impl FrameSet {
    /// File name of frame `index` for a container stem.
    pub fn frame_file_name(stem: &str, index: usize) -> String {
        format!("{stem}_frame_{index:03}.png")
    }

    /// Prefix shared by every frame of a container stem.
    pub fn frame_prefix(stem: &str) -> String {
        format!("{stem}_frame_")
    }

    /// Stems of the frames, in order.
    pub fn frame_stems(&self) -> impl Iterator<Item = String> + '_ {
        self.frames.iter().map(|f| file_stem(f))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Container stem → extracted frames, for one run.
pub type IconMap = BTreeMap<String, FrameSet>;

/// Output count of one stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: StageKind,
    pub directory: PathBuf,
    /// Files found in the stage directory after the re-scan
    pub outputs: usize,
}

/// What a finished run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Output root of the run
    pub output_root: PathBuf,

    /// Files found by the resolver
    pub inputs: usize,

    /// Icon containers successfully expanded
    pub containers_expanded: usize,

    /// Frames extracted across all containers
    pub frames_extracted: usize,

    /// Stages that ran, in order
    pub stages: Vec<StageOutcome>,

    /// Icons written to `05_ico`
    pub icons_rebuilt: Vec<PathBuf>,

    /// Container stems that could not be rebuilt
    pub icons_skipped: Vec<String>,

    /// Wall-clock duration of the run
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Ok(Duration::from_secs_f64(secs.max(0.0)))
    }
}
