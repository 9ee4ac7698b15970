//! Where the orchestrator gets its transforms and icon codec from.
//!
//! [`ToolBackend`] shells out to the external tools and resolves each one
//! only when asked, so a disabled stage never requires its tool.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{RunPlan, ToolsConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::tools::{ExternalCommand, Tool, ToolLocator};
use crate::types::StageKind;

use super::export::Export;
use super::icon::list_frames;
use super::pad::Pad;
use super::preprocess::Preprocess;
use super::stage::Transform;
use super::trace::Trace;

/// Splits icon containers into frames and packs frames back together.
#[async_trait]
pub trait IconCodec: Send + Sync {
    /// Write every frame of `container` into `out_dir` as
    /// `<stem>_frame_NNN.png` and return them in index order.
    async fn split(&self, container: &Path, out_dir: &Path, stem: &str)
        -> PipelineResult<Vec<PathBuf>>;

    /// Pack `frames` into a single multi-resolution icon at `dst`.
    async fn assemble(&self, frames: &[PathBuf], dst: &Path) -> PipelineResult<()>;
}

/// Source of stage transforms and the icon codec.
pub trait Backend: Send + Sync {
    /// Transform for an enabled `stage`, configured from `plan`.
    fn transform(&self, stage: StageKind, plan: &RunPlan) -> PipelineResult<Arc<dyn Transform>>;

    fn icon_codec(&self) -> PipelineResult<Arc<dyn IconCodec>>;
}

fn not_enabled(stage: StageKind) -> PipelineError {
    PipelineError::InvalidParameter {
        name: "stage",
        value: stage.to_string(),
        expected: "an enabled stage",
    }
}

/// Backend driving ImageMagick, potrace and Inkscape.
#[derive(Debug, Clone, Default)]
pub struct ToolBackend {
    locator: ToolLocator,
}

impl ToolBackend {
    pub fn new(tools: ToolsConfig) -> Self {
        Self {
            locator: ToolLocator::new(tools),
        }
    }
}

impl Backend for ToolBackend {
    fn transform(&self, stage: StageKind, plan: &RunPlan) -> PipelineResult<Arc<dyn Transform>> {
        let transform: Arc<dyn Transform> = match stage {
            StageKind::Preprocess => {
                let params = plan.preprocess.clone().ok_or_else(|| not_enabled(stage))?;
                let magick = self.locator.locate(Tool::Magick, "preprocessing")?;
                Arc::new(Preprocess::new(magick, params))
            }
            StageKind::Pad => {
                let params = plan.pad.ok_or_else(|| not_enabled(stage))?;
                Arc::new(Pad::new(params))
            }
            StageKind::Trace => {
                let params = plan.trace.ok_or_else(|| not_enabled(stage))?;
                let magick = self.locator.locate(Tool::Magick, "bitmap conversion before tracing")?;
                let potrace = self.locator.locate(Tool::Potrace, "tracing")?;
                Arc::new(Trace::new(magick, potrace, params))
            }
            StageKind::Export => {
                let params = plan.export.ok_or_else(|| not_enabled(stage))?;
                let inkscape = self.locator.locate(Tool::Inkscape, "SVG export")?;
                Arc::new(Export::new(inkscape, params))
            }
        };
        Ok(transform)
    }

    fn icon_codec(&self) -> PipelineResult<Arc<dyn IconCodec>> {
        let magick = self.locator.locate(Tool::Magick, "icon handling")?;
        Ok(Arc::new(MagickIcons::new(magick)))
    }
}

/// Icon codec backed by ImageMagick.
pub struct MagickIcons {
    magick: PathBuf,
}

impl MagickIcons {
    pub fn new(magick: PathBuf) -> Self {
        Self { magick }
    }

    pub fn split_command(&self, container: &Path, out_dir: &Path, stem: &str) -> ExternalCommand {
        ExternalCommand::new(&self.magick)
            .arg(container)
            .args(["-alpha", "on", "-strip"])
            .arg(out_dir.join(format!("{stem}_frame_%03d.png")))
    }

    pub fn assemble_command(&self, frames: &[PathBuf], dst: &Path) -> ExternalCommand {
        ExternalCommand::new(&self.magick)
            .args(frames)
            .args(["-colors", "256"])
            .arg(dst)
    }
}

#[async_trait]
impl IconCodec for MagickIcons {
    async fn split(
        &self,
        container: &Path,
        out_dir: &Path,
        stem: &str,
    ) -> PipelineResult<Vec<PathBuf>> {
        self.split_command(container, out_dir, stem).run().await?;
        list_frames(out_dir, stem)
    }

    async fn assemble(&self, frames: &[PathBuf], dst: &Path) -> PipelineResult<()> {
        self.assemble_command(frames, dst).run().await?;
        Ok(())
    }
}
