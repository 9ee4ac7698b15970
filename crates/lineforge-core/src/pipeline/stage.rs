//! Runs one transform over a batch of files.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::{ImageRef, StageKind};

use super::discovery::FileDiscovery;
use super::layout::ensure_dir;
use super::report::{ProgressEvent, Reporter};

/// A single-file operation: read `input`, write `output`, or fail.
#[async_trait]
pub trait Transform: Send + Sync {
    /// Extension (no dot) of the files this transform writes.
    fn output_extension(&self) -> &'static str;

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()>;
}

/// Output path for `input` inside `stage_dir`: same stem, new extension.
pub fn output_path(input: &Path, stage_dir: &Path, extension: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or(input.as_os_str());
    let mut name = stem.to_os_string();
    name.push(".");
    name.push(extension);
    stage_dir.join(name)
}

/// Apply `transform` to every file, writing into `stage_dir`.
///
/// Fail-fast: the first per-file error aborts the stage and is returned
/// wrapped with the stage and the offending file. On success the next
/// stage's input list is produced by re-scanning `stage_dir`, so files
/// already in the directory are picked up too.
pub async fn run_stage(
    stage: StageKind,
    files: &[ImageRef],
    stage_dir: &Path,
    transform: &dyn Transform,
    workers: usize,
    reporter: &dyn Reporter,
) -> PipelineResult<Vec<ImageRef>> {
    ensure_dir(stage_dir)?;

    let total = files.len();
    reporter.report(&ProgressEvent::StageStarted {
        stage,
        directory: stage_dir.to_path_buf(),
        total,
    });
    tracing::debug!("{} writing {} file(s) into {}", stage, total, stage_dir.display());

    let extension = transform.output_extension();
    let mut seen = HashSet::new();
    let jobs: Vec<(usize, &ImageRef, PathBuf)> = files
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let output = output_path(&file.path, stage_dir, extension);
            if !seen.insert(output.clone()) {
                tracing::warn!(
                    "{}: {} maps onto an output already written in this stage; it will be overwritten",
                    stage,
                    file.path.display()
                );
            }
            (i + 1, file, output)
        })
        .collect();

    stream::iter(jobs)
        .map(|(index, file, output)| async move {
            reporter.report(&ProgressEvent::FileStarted {
                stage,
                index,
                total,
                file: file.file_name(),
            });
            tracing::debug!("  [{}/{}] {}", index, total, file.path.display());
            transform
                .apply(&file.path, &output)
                .await
                .map_err(|e| PipelineError::Stage {
                    stage,
                    path: file.path.clone(),
                    source: Box::new(e),
                })
        })
        .buffered(workers.max(1))
        .try_collect::<Vec<()>>()
        .await?;

    let outputs = if stage.emits_vectors() {
        FileDiscovery::resolve_vectors(stage_dir)?
    } else {
        FileDiscovery::new(false, false).resolve(stage_dir)?
    };

    reporter.report(&ProgressEvent::StageFinished {
        stage,
        outputs: outputs.len(),
    });
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::report::NoopReporter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Copies input bytes to the output, failing on stems listed in `fail_on`.
    struct CopyTransform {
        extension: &'static str,
        fail_on: Vec<&'static str>,
        calls: AtomicUsize,
    }

    impl CopyTransform {
        fn new(extension: &'static str) -> Self {
            Self {
                extension,
                fail_on: Vec::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Transform for CopyTransform {
        fn output_extension(&self) -> &'static str {
            self.extension
        }

        async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let stem = input.file_stem().unwrap().to_string_lossy();
            if self.fail_on.iter().any(|f| *f == stem) {
                return Err(PipelineError::ExternalOperation {
                    command: format!("copy {}", input.display()),
                    output: "simulated failure".into(),
                });
            }
            std::fs::copy(input, output).map_err(|e| PipelineError::io(output, e))?;
            Ok(())
        }
    }

    fn inputs(dir: &Path, names: &[&str]) -> Vec<ImageRef> {
        names
            .iter()
            .map(|n| {
                let p = dir.join(n);
                std::fs::write(&p, n.as_bytes()).unwrap();
                ImageRef::from_path(p).unwrap()
            })
            .collect()
    }

    #[test]
    fn test_output_path_replaces_extension() {
        assert_eq!(
            output_path(Path::new("in/photo.jpeg"), Path::new("out"), "png"),
            PathBuf::from("out/photo.png")
        );
        assert_eq!(
            output_path(Path::new("in/archive.tar.gz"), Path::new("out"), "svg"),
            PathBuf::from("out/archive.tar.svg")
        );
    }

    #[tokio::test]
    async fn test_stage_writes_and_rescans() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let stage_dir = out.path().join("01_preprocessed");
        // Leftover from an earlier run is included by the re-scan.
        std::fs::create_dir_all(&stage_dir).unwrap();
        std::fs::write(stage_dir.join("old.png"), b"old").unwrap();

        let files = inputs(src.path(), &["b.jpg", "a.webp"]);
        let transform = CopyTransform::new("png");
        let outputs = run_stage(
            StageKind::Preprocess,
            &files,
            &stage_dir,
            &transform,
            1,
            &NoopReporter,
        )
        .await
        .unwrap();

        let names: Vec<_> = outputs.iter().map(|f| f.file_name()).collect();
        assert_eq!(names, ["a.png", "b.png", "old.png"]);
        assert_eq!(transform.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stage_fails_fast_with_file_name() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let files = inputs(src.path(), &["a.png", "b.png", "c.png"]);
        let mut transform = CopyTransform::new("png");
        transform.fail_on = vec!["b"];

        let err = run_stage(
            StageKind::Pad,
            &files,
            out.path(),
            &transform,
            1,
            &NoopReporter,
        )
        .await
        .unwrap_err();

        match &err {
            PipelineError::Stage { stage, path, .. } => {
                assert_eq!(*stage, StageKind::Pad);
                assert!(path.ends_with("b.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("simulated failure"));
        // c was never attempted
        assert_eq!(transform.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_parallel_stage_still_fails_fast() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let files = inputs(
            src.path(),
            &["a.png", "b.png", "c.png", "d.png", "e.png", "f.png"],
        );
        let mut transform = CopyTransform::new("png");
        transform.fail_on = vec!["b"];

        let err = run_stage(
            StageKind::Pad,
            &files,
            out.path(),
            &transform,
            3,
            &NoopReporter,
        )
        .await
        .unwrap_err();

        match &err {
            PipelineError::Stage { stage, path, .. } => {
                assert_eq!(*stage, StageKind::Pad);
                assert!(path.ends_with("b.png"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // At most b plus the two files behind it in the window were started.
        assert!(transform.calls.load(Ordering::SeqCst) <= 4);
        assert!(!out.path().join("e.png").exists());
        assert!(!out.path().join("f.png").exists());
    }

    #[tokio::test]
    async fn test_trace_stage_rescans_svg_only() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("stray.png"), b"x").unwrap();
        let files = inputs(src.path(), &["logo.png"]);

        let outputs = run_stage(
            StageKind::Trace,
            &files,
            out.path(),
            &CopyTransform::new("svg"),
            1,
            &NoopReporter,
        )
        .await
        .unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].file_name(), "logo.svg");
    }

    #[tokio::test]
    async fn test_progress_positions_reported() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let files = inputs(src.path(), &["a.png", "b.png", "c.png"]);
        let seen = Mutex::new(Vec::new());
        let reporter = |e: &ProgressEvent| {
            if let ProgressEvent::FileStarted { index, total, .. } = e {
                seen.lock().unwrap().push((*index, *total));
            }
        };

        run_stage(
            StageKind::Export,
            &files,
            out.path(),
            &CopyTransform::new("png"),
            3,
            &reporter,
        )
        .await
        .unwrap();

        let mut seen = seen.into_inner().unwrap();
        seen.sort();
        assert_eq!(seen, [(1, 3), (2, 3), (3, 3)]);
    }
}
