//! Icon container expansion before the stages and reassembly after them.
//!
//! Both sides tolerate per-container failure: a container that cannot be
//! split or rebuilt is skipped and the run goes on.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::RunPlan;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{file_stem, FrameSet, IconMap, ImageRef, StageKind};

use super::backend::IconCodec;
use super::layout::{ensure_dir, RunLayout};
use super::report::{ProgressEvent, Reporter};

/// Extensions probed, in order, when looking for a processed frame.
pub const FRAME_PROBE_EXTENSIONS: [&str; 2] = ["png", "jpg"];

/// Stages whose output may serve as the reassembly source, most downstream first.
const RASTER_SOURCE_ORDER: [StageKind; 3] = [StageKind::Export, StageKind::Pad, StageKind::Preprocess];

/// Result of expanding every container of a run.
#[derive(Debug, Default)]
pub struct Expansion {
    pub map: IconMap,
    /// All extracted frames, in container then index order
    pub frames: Vec<ImageRef>,
}

/// Result of rebuilding every container of a run.
#[derive(Debug, Default)]
pub struct Reassembly {
    pub rebuilt: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

fn is_frame_of(path: &Path, prefix: &str) -> bool {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    is_png
        && path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(prefix))
}

/// Frames `<stem>_frame_*.png` present in `dir`, sorted by name.
pub(crate) fn list_frames(dir: &Path, stem: &str) -> PipelineResult<Vec<PathBuf>> {
    let prefix = FrameSet::frame_prefix(stem);
    let mut frames = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| PipelineError::io(dir, e.into()))?;
        if entry.file_type().is_file() && is_frame_of(entry.path(), &prefix) {
            frames.push(entry.into_path());
        }
    }
    frames.sort();
    Ok(frames)
}

fn clear_stale_frames(dir: &Path, stem: &str) -> PipelineResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for frame in list_frames(dir, stem)? {
        std::fs::remove_file(&frame).map_err(|e| PipelineError::io(&frame, e))?;
    }
    Ok(())
}

/// Split each container into `_ico_frames/<stem>/`.
///
/// Containers whose split fails or yields no frames are skipped, as are
/// containers repeating a stem already seen in this run.
pub async fn expand(
    containers: &[ImageRef],
    layout: &RunLayout,
    codec: &dyn IconCodec,
    reporter: &dyn Reporter,
) -> PipelineResult<Expansion> {
    reporter.report(&ProgressEvent::IconsExpanding {
        containers: containers.len(),
    });

    let mut expansion = Expansion::default();
    let mut seen = HashSet::new();

    for container in containers {
        let stem = container.stem();
        let skip = |reason: String| {
            tracing::debug!("Skipping {}: {}", container.path.display(), reason);
            reporter.report(&ProgressEvent::IconExpandSkipped {
                container: container.file_name(),
                reason,
            });
        };

        if !seen.insert(stem.clone()) {
            skip(format!("another container named '{stem}' was already expanded"));
            continue;
        }

        let dir = layout.frames_dir(&stem);
        clear_stale_frames(&dir, &stem)?;
        ensure_dir(&dir)?;

        let frames = match codec.split(&container.path, &dir, &stem).await {
            Ok(frames) => frames,
            Err(e) if e.is_external_operation() => {
                skip(e.to_string());
                continue;
            }
            Err(e) => return Err(e),
        };

        if frames.is_empty() {
            skip("no frames extracted".to_string());
            continue;
        }

        reporter.report(&ProgressEvent::IconExpanded {
            container: container.file_name(),
            frames: frames.len(),
        });
        expansion
            .frames
            .extend(frames.iter().filter_map(|f| ImageRef::from_path(f.clone())));
        expansion.map.insert(
            stem.clone(),
            FrameSet {
                source: container.path.clone(),
                stem,
                frames,
            },
        );
    }

    Ok(expansion)
}

/// Most downstream enabled stage directory that exists and holds rasters,
/// else the output root.
pub fn choose_raster_source(layout: &RunLayout, plan: &RunPlan) -> PathBuf {
    RASTER_SOURCE_ORDER
        .iter()
        .filter(|stage| plan.is_enabled(**stage))
        .map(|stage| layout.stage_dir(*stage))
        .find(|dir| dir.is_dir())
        .unwrap_or_else(|| layout.root().to_path_buf())
}

/// Processed counterpart of `frame` in `source_dir`, probing `png` then `jpg`.
fn find_processed(source_dir: &Path, frame: &Path) -> Option<PathBuf> {
    let stem = file_stem(frame);
    FRAME_PROBE_EXTENSIONS
        .iter()
        .map(|ext| source_dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Rebuild `05_ico/<stem>.ico` for each container from its processed frames.
pub async fn rebuild(
    map: &IconMap,
    layout: &RunLayout,
    plan: &RunPlan,
    codec: &dyn IconCodec,
    reporter: &dyn Reporter,
) -> PipelineResult<Reassembly> {
    let source_dir = choose_raster_source(layout, plan);
    let icon_dir = layout.icon_dir();
    ensure_dir(&icon_dir)?;

    reporter.report(&ProgressEvent::IconsRebuilding {
        directory: icon_dir.clone(),
        source: source_dir.clone(),
    });

    let mut outcome = Reassembly::default();

    for (stem, set) in map {
        let mut resolved = Vec::with_capacity(set.len());
        for frame in &set.frames {
            match find_processed(&source_dir, frame) {
                Some(path) => resolved.push(path),
                None => tracing::warn!(
                    "{}.ico: no processed frame for {} in {}",
                    stem,
                    file_stem(frame),
                    source_dir.display()
                ),
            }
        }

        let skip = |reason: String, outcome: &mut Reassembly| {
            reporter.report(&ProgressEvent::IconRebuildSkipped {
                container: stem.clone(),
                reason,
            });
            outcome.skipped.push(stem.clone());
        };

        if resolved.is_empty() {
            skip("no processed frames found".to_string(), &mut outcome);
            continue;
        }
        if resolved.len() < set.len() {
            tracing::warn!(
                "{}.ico: rebuilding from {} of {} frame(s)",
                stem,
                resolved.len(),
                set.len()
            );
        }

        let icon = icon_dir.join(format!("{stem}.ico"));
        match codec.assemble(&resolved, &icon).await {
            Ok(()) => {
                reporter.report(&ProgressEvent::IconRebuilt {
                    icon: icon.clone(),
                    frames: resolved.len(),
                });
                outcome.rebuilt.push(icon);
            }
            Err(e) if e.is_external_operation() => skip(e.to_string(), &mut outcome),
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}
