//! Stage D: rasterize SVGs with Inkscape.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::config::ExportParams;
use crate::error::PipelineResult;
use crate::tools::ExternalCommand;

use super::stage::Transform;

pub struct Export {
    inkscape: PathBuf,
    params: ExportParams,
}

impl Export {
    pub fn new(inkscape: PathBuf, params: ExportParams) -> Self {
        Self { inkscape, params }
    }

    pub fn command(&self, svg: &Path, dst: &Path) -> ExternalCommand {
        let cmd = ExternalCommand::new(&self.inkscape)
            .arg(svg)
            .arg("--export-type=png")
            .prefixed_path("--export-filename=", dst)
            .arg(format!("--export-width={}", self.params.width));
        if self.params.area_drawing {
            cmd.arg("--export-area-drawing")
        } else {
            cmd
        }
    }
}

#[async_trait]
impl Transform for Export {
    fn output_extension(&self) -> &'static str {
        "png"
    }

    async fn apply(&self, input: &Path, output: &Path) -> PipelineResult<()> {
        self.command(input, output).run().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line() {
        let export = Export::new(
            "inkscape".into(),
            ExportParams {
                width: 1024,
                area_drawing: true,
            },
        );
        let cmd = export.command(Path::new("03_svg/logo.svg"), Path::new("04_export_png/logo.png"));
        assert_eq!(
            cmd.command_line(),
            "inkscape 03_svg/logo.svg --export-type=png \
             --export-filename=04_export_png/logo.png --export-width=1024 --export-area-drawing"
        );
    }

    #[test]
    fn test_page_area_when_drawing_area_off() {
        let export = Export::new(
            "inkscape".into(),
            ExportParams {
                width: 256,
                area_drawing: false,
            },
        );
        let cmd = export.command(Path::new("a.svg"), Path::new("a.png"));
        assert!(!cmd.command_line().contains("--export-area-drawing"));
        assert!(cmd.command_line().ends_with("--export-width=256"));
    }
}
