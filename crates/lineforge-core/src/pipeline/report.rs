//! Progress notifications from a running pipeline.
//!
//! The reporter is the only coupling to presentation. Closures implement
//! [`Reporter`], and [`NoopReporter`] discards everything.

use std::path::PathBuf;

use crate::types::{RunSummary, StageKind};

/// Something the pipeline wants the caller to know about.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Inputs resolved
    RunStarted { input: PathBuf, files: usize },

    /// Icon extraction begins
    IconsExpanding { containers: usize },

    /// One container produced frames
    IconExpanded { container: String, frames: usize },

    /// A container was skipped during extraction
    IconExpandSkipped { container: String, reason: String },

    /// A stage begins writing into `directory`
    StageStarted {
        stage: StageKind,
        directory: PathBuf,
        total: usize,
    },

    /// A file enters a stage (`index` is 1-based)
    FileStarted {
        stage: StageKind,
        index: usize,
        total: usize,
        file: String,
    },

    /// A stage finished; `outputs` is the re-scanned count
    StageFinished { stage: StageKind, outputs: usize },

    /// A disabled stage was passed through
    StageSkipped { stage: StageKind },

    /// Icon reassembly begins
    IconsRebuilding {
        directory: PathBuf,
        source: PathBuf,
    },

    /// One icon written
    IconRebuilt { icon: PathBuf, frames: usize },

    /// A container could not be rebuilt
    IconRebuildSkipped { container: String, reason: String },

    /// The run completed
    RunFinished(RunSummary),
}

impl ProgressEvent {
    /// One-line human rendering, matching the log file format.
    pub fn message(&self) -> String {
        match self {
            Self::RunStarted { input, files } => {
                format!("Found {} image(s) in {}", files, input.display())
            }
            Self::IconsExpanding { containers } => {
                format!("[ICO] Extracting frames from {containers} icon(s)...")
            }
            Self::IconExpanded { container, frames } => {
                format!("  {container}: {frames} frame(s)")
            }
            Self::IconExpandSkipped { container, reason } => {
                format!("  {container}: {reason} (skipped)")
            }
            Self::StageStarted {
                stage, directory, ..
            } => format!("[{}] {} -> {}", stage.letter(), stage, directory.display()),
            Self::FileStarted {
                index, total, file, ..
            } => format!("  [{index}/{total}] {file}"),
            Self::StageFinished { stage, outputs } => {
                format!("[{}] {} done: {} file(s)", stage.letter(), stage, outputs)
            }
            Self::StageSkipped { stage } => {
                format!("[{}] {} disabled, passing files through", stage.letter(), stage)
            }
            Self::IconsRebuilding { directory, source } => format!(
                "[ICO] Rebuilding icons -> {} (frames from {})",
                directory.display(),
                source.display()
            ),
            Self::IconRebuilt { icon, frames } => {
                let name = icon
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("  OK: {name} ({frames} frame(s))")
            }
            Self::IconRebuildSkipped { container, reason } => {
                format!("  {container}.ico: {reason} (skipped)")
            }
            Self::RunFinished(summary) => format!(
                "DONE in {:.1}s -> {}",
                summary.elapsed.as_secs_f64(),
                summary.output_root.display()
            ),
        }
    }

    /// Whether the event reports a tolerated failure.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Self::IconExpandSkipped { .. } | Self::IconRebuildSkipped { .. }
        )
    }
}

/// Receives progress events. Must tolerate being called from stage workers.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> Reporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn report(&self, _event: &ProgressEvent) {}
}
