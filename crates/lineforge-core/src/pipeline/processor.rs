//! Pipeline orchestration - sequences the stages over one input.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, RunPlan};
use crate::error::{PipelineError, Result};
use crate::types::{IconMap, RunSummary, StageKind, StageOutcome};

use super::backend::{Backend, IconCodec, ToolBackend};
use super::discovery::FileDiscovery;
use super::icon;
use super::layout::{ensure_dir, RunLayout};
use super::report::{NoopReporter, ProgressEvent, Reporter};
use super::stage::run_stage;

const RECURSIVE_HINT: &str = "enable recursive search (--recursive)";

/// Runs the preprocess → pad → trace → export chain, with optional icon
/// expansion before and reassembly after.
pub struct Pipeline {
    config: Config,
    backend: Arc<dyn Backend>,
    reporter: Arc<dyn Reporter>,
}

impl Pipeline {
    /// Pipeline using the external tools named in `config.tools`.
    pub fn new(config: Config) -> Self {
        let backend = ToolBackend::new(config.tools.clone());
        Self {
            config,
            backend: Arc::new(backend),
            reporter: Arc::new(NoopReporter),
        }
    }

    /// Replace the source of transforms and the icon codec.
    pub fn with_backend(mut self, backend: impl Backend + 'static) -> Self {
        self.backend = Arc::new(backend);
        self
    }

    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Process `input` (a file or directory) into stage directories under
    /// `output_root`.
    ///
    /// The config is snapshotted into a [`RunPlan`] first, so a bad value
    /// fails the run before any tool is invoked. Each stage's tools are
    /// resolved right before it runs.
    pub async fn run_all(&self, input: &Path, output_root: &Path) -> Result<RunSummary> {
        let start = Instant::now();
        let reporter = self.reporter.as_ref();
        let plan = RunPlan::from_config(&self.config)?;
        let layout = RunLayout::new(output_root);
        ensure_dir(layout.root())?;

        let found = FileDiscovery::new(plan.recursive, plan.icons).resolve(input)?;
        if found.is_empty() {
            return Err(PipelineError::NoInput {
                message: format!("No supported images found in {}", input.display()),
                hint: (!plan.recursive).then_some(RECURSIVE_HINT),
            }
            .into());
        }
        reporter.report(&ProgressEvent::RunStarted {
            input: input.to_path_buf(),
            files: found.len(),
        });
        tracing::debug!("Resolved {} input(s) from {}", found.len(), input.display());

        let mut summary = RunSummary {
            output_root: output_root.to_path_buf(),
            inputs: found.len(),
            ..Default::default()
        };

        let mut files = found;
        let mut icons: Option<(Arc<dyn IconCodec>, IconMap)> = None;

        if plan.icons {
            // Fail before any work if icons cannot be handled at all.
            let codec = self.backend.icon_codec()?;
            let (containers, ordinary): (Vec<_>, Vec<_>) =
                files.into_iter().partition(|f| f.is_icon_container());
            files = ordinary;

            let mut map = IconMap::new();
            if !containers.is_empty() {
                let expansion = icon::expand(&containers, &layout, codec.as_ref(), reporter).await?;
                summary.containers_expanded = expansion.map.len();
                summary.frames_extracted = expansion.frames.len();
                files.extend(expansion.frames);
                map = expansion.map;
            }

            if files.is_empty() {
                return Err(PipelineError::NoInput {
                    message: "No images left to process after icon extraction".to_string(),
                    hint: None,
                }
                .into());
            }
            icons = Some((codec, map));
        }

        for stage in StageKind::ORDER {
            if !plan.is_enabled(stage) {
                reporter.report(&ProgressEvent::StageSkipped { stage });
                continue;
            }

            let transform = self.backend.transform(stage, &plan)?;
            let directory = layout.stage_dir(stage);
            files = run_stage(
                stage,
                &files,
                &directory,
                transform.as_ref(),
                plan.workers,
                reporter,
            )
            .await?;
            summary.stages.push(StageOutcome {
                stage,
                directory,
                outputs: files.len(),
            });
        }

        if let Some((codec, map)) = icons.filter(|(_, map)| !map.is_empty()) {
            let reassembly = icon::rebuild(&map, &layout, &plan, codec.as_ref(), reporter).await?;
            summary.icons_rebuilt = reassembly.rebuilt;
            summary.icons_skipped = reassembly.skipped;
        }

        summary.elapsed = start.elapsed();
        tracing::debug!(
            "Run finished in {:?}: {} stage(s), {} icon(s)",
            summary.elapsed,
            summary.stages.len(),
            summary.icons_rebuilt.len()
        );
        reporter.report(&ProgressEvent::RunFinished(summary.clone()));
        Ok(summary)
    }
}
