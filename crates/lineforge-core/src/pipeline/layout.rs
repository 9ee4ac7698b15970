//! Fixed directory layout under a run's output root.
//!
//! These names are a persisted contract: later runs and downstream tooling
//! locate intermediate artifacts by them.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};
use crate::types::StageKind;

/// Reassembled icons.
pub const ICON_DIR: &str = "05_ico";

/// Staging root for extracted icon frames.
pub const FRAMES_DIR: &str = "_ico_frames";

/// Directory layout of one run.
#[derive(Debug, Clone)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stage_dir(&self, stage: StageKind) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    pub fn frames_root(&self) -> PathBuf {
        self.root.join(FRAMES_DIR)
    }

    /// Per-container staging directory `_ico_frames/<stem>/`.
    pub fn frames_dir(&self, stem: &str) -> PathBuf {
        self.frames_root().join(stem)
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.root.join(ICON_DIR)
    }
}

/// Create `dir` and its parents if absent.
pub(crate) fn ensure_dir(dir: &Path) -> PipelineResult<()> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_names() {
        let layout = RunLayout::new("/out");
        assert_eq!(
            layout.stage_dir(StageKind::Pad),
            PathBuf::from("/out/02_padded")
        );
        assert_eq!(
            layout.frames_dir("app"),
            PathBuf::from("/out/_ico_frames/app")
        );
        assert_eq!(layout.icon_dir(), PathBuf::from("/out/05_ico"));
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
