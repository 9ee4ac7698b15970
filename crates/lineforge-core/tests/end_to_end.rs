//! Full runs against an in-process backend.
//!
//! Preprocess, trace and export are stood in for by small image-crate
//! transforms; pad is the real one.

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lineforge_core::pipeline::{Pad, ProgressEvent};
use lineforge_core::{
    Backend, Config, FrameSet, IconCodec, Pipeline, PipelineError, PipelineResult, RunPlan,
    StageKind, Transform,
};

fn image_err(path: &Path, e: impl ToString) -> PipelineError {
    PipelineError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Grayscale conversion in place of the ImageMagick filter.
struct Grayscale;

#[async_trait]
impl Transform for Grayscale {
    fn output_extension(&self) -> &'static str {
        "png"
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let img = image::open(input).map_err(|e| image_err(input, e))?;
        img.grayscale().save(output).map_err(|e| image_err(output, e))
    }
}

/// Writes an SVG sized like the source raster.
struct FakeTrace;

#[async_trait]
impl Transform for FakeTrace {
    fn output_extension(&self) -> &'static str {
        "svg"
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let (w, h) = image::image_dimensions(input).map_err(|e| image_err(input, e))?;
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}"><path d="M0 0L{w} {h}"/></svg>"#
        );
        std::fs::write(output, svg).map_err(|e| image_err(output, e))
    }
}

/// Renders a blank PNG of the requested width, square like the padded input.
struct FakeExport {
    width: u32,
}

#[async_trait]
impl Transform for FakeExport {
    fn output_extension(&self) -> &'static str {
        "png"
    }

    async fn apply(&self, _input: &Path, output: &Path) -> PipelineResult<()> {
        RgbImage::from_pixel(self.width, self.width, Rgb([255, 255, 255]))
            .save(output)
            .map_err(|e| image_err(output, e))
    }
}

/// Wraps a transform and silently drops outputs whose stem is listed.
struct Lossy {
    inner: Arc<dyn Transform>,
    drop_stems: Vec<String>,
}

#[async_trait]
impl Transform for Lossy {
    fn output_extension(&self) -> &'static str {
        self.inner.output_extension()
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
        if self.drop_stems.contains(&stem) {
            return Ok(());
        }
        self.inner.apply(input, output).await
    }
}

/// Icon containers are text files listing one `WxH` frame size per line;
/// assembled icons are text files listing the frame file names.
struct TextIcons;

#[async_trait]
impl IconCodec for TextIcons {
    async fn split(
        &self,
        container: &Path,
        out_dir: &Path,
        stem: &str,
    ) -> PipelineResult<Vec<PathBuf>> {
        let text = std::fs::read_to_string(container).map_err(|e| image_err(container, e))?;
        let mut frames = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let (w, h) = line.split_once('x').unwrap();
            let frame = out_dir.join(FrameSet::frame_file_name(stem, i));
            RgbImage::from_pixel(w.parse().unwrap(), h.parse().unwrap(), Rgb([0, 0, 0]))
                .save(&frame)
                .map_err(|e| image_err(&frame, e))?;
            frames.push(frame);
        }
        Ok(frames)
    }

    async fn assemble(&self, frames: &[PathBuf], dst: &Path) -> PipelineResult<()> {
        let names: Vec<String> = frames
            .iter()
            .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        std::fs::write(dst, names.join("\n")).map_err(|e| image_err(dst, e))
    }
}

#[derive(Default)]
struct InProcessBackend {
    drop_padded: Vec<String>,
}

impl Backend for InProcessBackend {
    fn transform(&self, stage: StageKind, plan: &RunPlan) -> PipelineResult<Arc<dyn Transform>> {
        Ok(match stage {
            StageKind::Preprocess => Arc::new(Grayscale),
            StageKind::Pad => Arc::new(Lossy {
                inner: Arc::new(Pad::new(plan.pad.unwrap())),
                drop_stems: self.drop_padded.clone(),
            }),
            StageKind::Trace => Arc::new(FakeTrace),
            StageKind::Export => Arc::new(FakeExport {
                width: plan.export.unwrap().width,
            }),
        })
    }

    fn icon_codec(&self) -> PipelineResult<Arc<dyn IconCodec>> {
        Ok(Arc::new(TextIcons))
    }
}

fn line_art_config() -> Config {
    let mut config = Config::default();
    config.preprocess.grayscale = true;
    config.preprocess.auto_level = true;
    config.pad.size = 512;
    config.pad.background = "white".into();
    config.pad.format = "png".into();
    config.trace.cutoff_percent = 45;
    config.export.width = 512;
    config.export.area_drawing = true;
    config
}

fn icon_config() -> Config {
    let mut config = line_art_config();
    config.input.icons = true;
    config.trace.enabled = false;
    config.export.enabled = false;
    config
}

#[tokio::test]
async fn logo_runs_through_all_four_stages() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    RgbImage::from_pixel(800, 400, Rgb([200, 30, 30]))
        .save(src.path().join("logo.png"))
        .unwrap();

    let summary = Pipeline::new(line_art_config())
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap();

    let root = out.path();
    let pre = image::open(root.join("01_preprocessed/logo.png")).unwrap();
    assert!(matches!(
        pre.color(),
        image::ColorType::L8 | image::ColorType::La8
    ));

    let padded = image::open(root.join("02_padded/logo.png")).unwrap().to_rgb8();
    assert_eq!(padded.dimensions(), (512, 512));
    // 512x256 content centered: 128px white bands above and below
    assert_eq!(padded.get_pixel(256, 64), &Rgb([255, 255, 255]));
    assert_eq!(padded.get_pixel(256, 127), &Rgb([255, 255, 255]));
    assert_ne!(padded.get_pixel(256, 256), &Rgb([255, 255, 255]));
    assert_eq!(padded.get_pixel(256, 447), &Rgb([255, 255, 255]));

    let svg = std::fs::metadata(root.join("03_svg/logo.svg")).unwrap();
    assert!(svg.len() > 0);

    let exported = image::open(root.join("04_export_png/logo.png")).unwrap();
    assert_eq!(exported.width(), 512);

    let stages: Vec<_> = summary.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, StageKind::ORDER);
    assert!(summary.icons_rebuilt.is_empty());
}

#[tokio::test]
async fn icon_frames_are_rebuilt_from_padded_output() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("app.ico"), "16x16\n32x32\n48x24\n").unwrap();
    RgbImage::from_pixel(40, 20, Rgb([0, 0, 0]))
        .save(src.path().join("photo.png"))
        .unwrap();

    let summary = Pipeline::new(icon_config())
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap();

    assert_eq!(summary.containers_expanded, 1);
    assert_eq!(summary.frames_extracted, 3);
    // 1 ordinary + 3 frames flowed through pad
    let pad = summary
        .stages
        .iter()
        .find(|s| s.stage == StageKind::Pad)
        .unwrap();
    assert_eq!(pad.outputs, 4);

    let icon = out.path().join("05_ico/app.ico");
    assert_eq!(summary.icons_rebuilt, [icon.clone()]);
    assert_eq!(
        std::fs::read_to_string(icon).unwrap(),
        "app_frame_000.png\napp_frame_001.png\napp_frame_002.png"
    );
    assert!(out.path().join("_ico_frames/app/app_frame_002.png").is_file());
}

#[tokio::test]
async fn missing_padded_frame_is_dropped_not_fatal() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("app.ico"), "16x16\n32x32\n48x48\n").unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let summary = Pipeline::new(icon_config())
        .with_backend(InProcessBackend {
            drop_padded: vec!["app_frame_001".into()],
        })
        .with_reporter(move |e: &ProgressEvent| {
            if let ProgressEvent::IconRebuilt { frames, .. } = e {
                sink.lock().unwrap().push(*frames);
            }
        })
        .run_all(src.path(), out.path())
        .await
        .unwrap();

    assert_eq!(*events.lock().unwrap(), [2]);
    assert_eq!(
        std::fs::read_to_string(&summary.icons_rebuilt[0]).unwrap(),
        "app_frame_000.png\napp_frame_002.png"
    );
}

#[tokio::test]
async fn jpg_padded_frames_are_found_by_probe() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("tray.ico"), "16x16\n24x24\n").unwrap();
    let mut config = icon_config();
    config.pad.format = "jpg".into();

    let summary = Pipeline::new(config)
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap();

    assert!(out.path().join("02_padded/tray_frame_000.jpg").is_file());
    assert_eq!(
        std::fs::read_to_string(&summary.icons_rebuilt[0]).unwrap(),
        "tray_frame_000.jpg\ntray_frame_001.jpg"
    );
}

#[tokio::test]
async fn icons_ignored_without_icon_handling() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("app.ico"), "16x16\n").unwrap();
    let mut config = icon_config();
    config.input.icons = false;

    let err = Pipeline::new(config)
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No supported images"));
}

#[tokio::test]
async fn unknown_finish_mode_fails_before_any_stage() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    RgbImage::new(4, 4).save(src.path().join("a.png")).unwrap();
    let mut config = line_art_config();
    config.preprocess.finish_mode = "sepia".into();

    let err = Pipeline::new(config)
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("preprocess.finish_mode"));
    assert!(!out.path().join("01_preprocessed").exists());
}

#[tokio::test]
async fn frameless_container_leaves_nothing_to_process() {
    let src = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    // No size lines: the split yields zero frames.
    std::fs::write(src.path().join("app.ico"), "").unwrap();

    let err = Pipeline::new(icon_config())
        .with_backend(InProcessBackend::default())
        .run_all(src.path(), out.path())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        lineforge_core::LineForgeError::Pipeline(PipelineError::NoInput { .. })
    ));
    assert!(!out.path().join("01_preprocessed").exists());
}
