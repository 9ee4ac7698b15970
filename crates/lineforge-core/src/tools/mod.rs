//! External tool discovery.
//!
//! Each capability is looked up only when a stage that needs it is about to
//! run, so a missing tool for a disabled stage never blocks the others.

mod command;

pub use command::{CommandOutput, ExternalCommand};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::{expand_tilde, ToolsConfig};
use crate::error::{PipelineError, PipelineResult};

/// An external capability the pipeline shells out to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// ImageMagick: raster filtering, PBM conversion, icon split/assemble
    Magick,
    /// Potrace: bitmap → SVG
    Potrace,
    /// Inkscape: SVG → PNG
    Inkscape,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Self::Magick, Self::Potrace, Self::Inkscape];

    /// Executable names tried on `PATH`, in order.
    pub fn executables(self) -> &'static [&'static str] {
        match self {
            Self::Magick => &["magick"],
            Self::Potrace => &["potrace", "potrace.exe"],
            Self::Inkscape => &["inkscape", "inkscape.exe"],
        }
    }

    /// Whether a bundled copy shipped next to the binary is honored.
    fn may_be_bundled(self) -> bool {
        matches!(self, Self::Potrace)
    }

    fn override_path(self, config: &ToolsConfig) -> Option<&Path> {
        match self {
            Self::Magick => config.magick.as_deref(),
            Self::Potrace => config.potrace.as_deref(),
            Self::Inkscape => config.inkscape.as_deref(),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Magick => "ImageMagick 'magick'",
            Self::Potrace => "potrace",
            Self::Inkscape => "Inkscape",
        };
        f.write_str(name)
    }
}

/// Resolves tools to executable paths.
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    config: ToolsConfig,
}

impl ToolLocator {
    pub fn new(config: ToolsConfig) -> Self {
        Self { config }
    }

    /// Locate `tool`, or fail with `ToolMissing` naming `purpose`.
    ///
    /// Order: explicit config override, bundled directory (potrace only),
    /// then `PATH`.
    pub fn locate(&self, tool: Tool, purpose: &str) -> PipelineResult<PathBuf> {
        match self.find(tool) {
            Some(path) => {
                tracing::debug!("Using {} at {}", tool, path.display());
                Ok(path)
            }
            None => Err(PipelineError::ToolMissing {
                tool,
                purpose: purpose.to_string(),
            }),
        }
    }

    /// Locate `tool` without producing an error.
    pub fn find(&self, tool: Tool) -> Option<PathBuf> {
        if let Some(path) = tool.override_path(&self.config) {
            let path = expand_tilde(path);
            if path.is_file() {
                return Some(path);
            }
            tracing::warn!(
                "Configured path for {} does not exist: {}",
                tool,
                path.display()
            );
        }

        if tool.may_be_bundled() {
            if let Some(dir) = self.bundled_dir() {
                let bundled = tool
                    .executables()
                    .iter()
                    .map(|exe| dir.join(exe))
                    .find(|p| p.is_file());
                if bundled.is_some() {
                    return bundled;
                }
            }
        }

        tool.executables()
            .iter()
            .find_map(|exe| which::which(exe).ok())
    }

    fn bundled_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config.bundled_dir {
            return Some(expand_tilde(dir));
        }
        let exe = std::env::current_exe().ok()?;
        Some(exe.parent()?.join("bin"))
    }
}
